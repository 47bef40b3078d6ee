//! Reporteo CLI - process SMS/RCS campaign delivery report files
//!
//! # Main Command
//!
//! ```bash
//! reporteo procesar --variante devoluciones lote1.csv lote2.csv --export-dir salida/
//! reporteo procesar --variante simples enero.csv febrero.csv
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! reporteo detectar archivo.csv      # Show the detected separator
//! reporteo parse archivo.csv         # Parse a delimited file to JSON rows
//! reporteo validar --variante basic archivo.csv
//! ```

use clap::{Parser, Subcommand};
use reporteo::{
    detect_separator, export_campaigns, missing_columns, read_report_file, read_table,
    spawn_run, validate_messages, FileStats, ProcessOutcome, ReportVariant, RunEvent,
    RunOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "reporteo")]
#[command(about = "Procesa archivos de reportes de campañas SMS/RCS", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a batch of files
    Procesar {
        /// Report variant: devoluciones, simples, basic or directo
        #[arg(short, long)]
        variante: ReportVariant,

        /// Input files, processed in the order given
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Export per-campaign files here (devoluciones only)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Operator name for log attribution
        #[arg(long)]
        usuario: Option<String>,

        /// Output file for the JSON outcome (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the separator detection result for a file
    Detectar {
        /// Input file
        input: PathBuf,
    },

    /// Parse a delimited file and output its rows as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Separator (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a single file against a variant's structure and content rules
    Validar {
        /// Report variant: devoluciones, simples, basic or directo
        #[arg(short, long)]
        variante: ReportVariant,

        /// Input file
        input: PathBuf,
    },
}

fn main() {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Procesar {
            variante,
            files,
            export_dir,
            usuario,
            output,
        } => cmd_procesar(variante, files, export_dir.as_deref(), usuario, output.as_deref()),

        Commands::Detectar { input } => cmd_detectar(&input),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Validar { variante, input } => cmd_validar(variante, &input),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn cmd_procesar(
    variante: ReportVariant,
    files: Vec<PathBuf>,
    export_dir: Option<&Path>,
    usuario: Option<String>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Procesando {} archivo(s), variante {}", files.len(), variante);

    let handle = spawn_run(files, variante, RunOptions { operator: usuario });

    let mut outcome = None;
    for event in handle.events.iter() {
        match event {
            RunEvent::Progress(p) => eprintln!("   [{p:>3}%]"),
            RunEvent::Status(s) => eprintln!("   {s}"),
            RunEvent::Finished(o) => outcome = Some(*o),
            RunEvent::Failed(msg) => return Err(msg.into()),
        }
    }
    let outcome = outcome.ok_or("el procesamiento terminó sin resultado")?;

    print_summary(&outcome);

    if let Some(dir) = export_dir {
        if let ProcessOutcome::Devoluciones { campanas, .. } = &outcome {
            let written = export_campaigns(campanas, dir)?;
            eprintln!("\n📤 Exportados {} archivo(s) en {}:", written.len(), dir.display());
            for nombre in &written {
                eprintln!("   {nombre}");
            }
        } else {
            eprintln!("\n⚠️  --export-dir solo aplica a la variante devoluciones");
        }
    }

    let json = serde_json::to_string_pretty(&outcome)?;
    write_output(&json, output)?;

    Ok(())
}

fn print_summary(outcome: &ProcessOutcome) {
    match outcome {
        ProcessOutcome::Devoluciones { campanas, resumen } => {
            eprintln!("\n   Campaña | Registros");
            let mut total = 0u64;
            for row in resumen {
                eprintln!("   {} | {}", row.campana, row.registros);
                total += row.registros;
            }
            eprintln!(
                "\n📊 RESUMEN EJECUTIVO | Campañas: {} | Registros Totales: {}",
                campanas.len(),
                total
            );
        }
        ProcessOutcome::PorArchivo { variante, resumen } => {
            eprintln!("\n   {}", variante.summary_headers().join(" | "));
            for s in resumen {
                eprintln!("   {}", file_stats_line(s));
            }
            if resumen.len() > 1 {
                eprintln!("   {}", grand_total_line(resumen));
            }
        }
        ProcessOutcome::Directo { resumen } => match resumen {
            Some(s) => {
                eprintln!(
                    "\n   {}",
                    ReportVariant::Directo.summary_headers().join(" | ")
                );
                eprintln!(
                    "   {} | {} | {} | {} | {} | {}",
                    s.campana,
                    s.total_original,
                    s.total_generada,
                    s.excluidos,
                    s.enviados,
                    s.no_enviados
                );
            }
            None => eprintln!("\n⚠️  Sin datos: ningún archivo fue aceptado"),
        },
    }
}

fn file_stats_line(s: &FileStats) -> String {
    let mut cells = vec![s.campana.clone()];
    cells.extend(s.values().iter().map(u64::to_string));
    cells.join(" | ")
}

/// Display-only grand total over the per-file rows.
fn grand_total_line(resumen: &[FileStats]) -> String {
    let mut totals = [0u64; 9];
    for s in resumen {
        for (t, v) in totals.iter_mut().zip(s.values()) {
            *t += v;
        }
    }
    let mut cells = vec!["TOTAL".to_string()];
    cells.extend(totals.iter().map(u64::to_string));
    cells.join(" | ")
}

fn cmd_detectar(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let separator = detect_separator(input)?;
    println!("{}", separator as char);
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Analizando: {}", input.display());

    let separator = match delimiter {
        Some(c) => c as u8,
        None => detect_separator(input)?,
    };
    let table = read_table(input, separator)?;

    eprintln!(
        "   Separador: '{}'{}",
        separator as char,
        if delimiter.is_none() { " (detectado)" } else { "" }
    );
    eprintln!("   Columnas: {}", table.headers.join(", "));
    eprintln!("✅ {} registro(s)", table.len());

    let json = serde_json::to_string_pretty(&table.rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validar(variante: ReportVariant, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validando: {} ({})", input.display(), variante);

    let table = read_report_file(input, variante)?;
    let missing = missing_columns(&table, variante.required_columns());

    if !missing.is_empty() {
        eprintln!("❌ Faltan columnas requeridas: {}", missing.join(", "));
        std::process::exit(1);
    }
    eprintln!("   Estructura correcta ({} columnas)", table.headers.len());

    if variante.checks_content() {
        let report = validate_messages(&table);
        if !report.is_empty() {
            eprintln!("❌ Caracteres no permitidos:\n{report}");
            std::process::exit(1);
        }
        eprintln!("   Mensajes correctos");
    }

    eprintln!("✅ {} registro(s) válidos", table.len());
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Resultado escrito en: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
