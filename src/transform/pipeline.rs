//! Batch pipeline: the linear accept/reject gate sequence applied per file.
//!
//! ```text
//! read → validate structure → [validate content] → coerce types → fold into aggregate
//! ```
//!
//! Failure handling is deliberately asymmetric and must stay that way:
//! a file that cannot be read is logged and skipped, but a file that reads
//! and then fails structure or content validation aborts the whole batch —
//! downstream aggregation assumes every accepted file honors the variant's
//! schema.

use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::error::{ProcessResult, ValidationError};
use crate::models::{ProcessOutcome, ReportVariant};
use crate::parser::{file_label, read_report_file};
use crate::transform::aggregate::aggregator_for;
use crate::transform::coerce::{coerce_numeric_columns, fold_text_columns};
use crate::validation::{missing_columns, validate_messages};

/// Non-terminal notification emitted while a batch runs.
///
/// Display-only: progress is a 0-100 integer, status is free text. Neither
/// carries control-flow meaning for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Progress(u8),
    Status(String),
}

/// Run the whole pipeline over `file_paths` for one variant.
///
/// Files are processed strictly in the order given. `notify` receives
/// progress and status updates; the terminal result is the return value
/// (never reported through `notify`).
pub fn process_batch(
    file_paths: &[PathBuf],
    variant: ReportVariant,
    notify: &mut dyn FnMut(Notice),
) -> ProcessResult<ProcessOutcome> {
    info!(
        variante = variant.name(),
        archivos = file_paths.len(),
        "Inicio del procesamiento"
    );

    let mut aggregator = aggregator_for(variant);
    let total = file_paths.len();

    for (i, path) in file_paths.iter().enumerate() {
        let nombre = file_label(path);
        notify(Notice::Status(format!(
            "Procesando archivo {}/{}: {}",
            i + 1,
            total,
            nombre
        )));
        if variant == ReportVariant::Devoluciones {
            notify(Notice::Progress((i * 80 / total) as u8));
        }

        let mut table = match read_report_file(path, variant) {
            Ok(table) => table,
            Err(e) => {
                // Unreadable file: tolerated, the batch continues.
                error!(archivo = %nombre, "{e}");
                continue;
            }
        };
        debug!(archivo = %nombre, registros = table.len(), "Archivo leído");

        let missing = missing_columns(&table, variant.required_columns());
        if !missing.is_empty() {
            warn!(archivo = %nombre, faltan = ?missing, "Validación de estructura fallida");
            return Err(ValidationError::Structure {
                file: nombre,
                missing,
            }
            .into());
        }

        if variant.checks_content() {
            let report = validate_messages(&table);
            if !report.is_empty() {
                error!(archivo = %nombre, "Caracteres no permitidos en mensajes");
                return Err(ValidationError::Content {
                    file: nombre,
                    report,
                }
                .into());
            }
        }

        let sentinel = variant.coercion_sentinel();
        let fallbacks =
            coerce_numeric_columns(&mut table, variant.numeric_columns(), sentinel);
        if fallbacks > 0 {
            warn!(
                archivo = %nombre,
                celdas = fallbacks,
                "Valores no numéricos convertidos a {sentinel}"
            );
        }
        fold_text_columns(&mut table, variant.folded_text_columns());

        aggregator.accumulate_file(&nombre, table);

        match variant {
            ReportVariant::Simples | ReportVariant::Basic => {
                notify(Notice::Progress(((i + 1) * 95 / total) as u8));
            }
            ReportVariant::Directo => {
                notify(Notice::Progress(((i + 1) * 80 / total) as u8));
            }
            ReportVariant::Devoluciones => {}
        }
    }

    match variant {
        ReportVariant::Devoluciones => {
            info!("Consolidando registros por campaña");
            notify(Notice::Progress(100));
            notify(Notice::Status("Procesamiento completado".into()));
        }
        ReportVariant::Simples | ReportVariant::Basic => {
            notify(Notice::Progress(100));
            notify(Notice::Status("Procesamiento de reportes completado".into()));
        }
        ReportVariant::Directo => {
            if aggregator.files_accepted() == 0 {
                warn!("No se procesaron archivos válidos");
                notify(Notice::Status("⚠️ No se procesaron archivos válidos.".into()));
                return Ok(aggregator.finalize());
            }
            info!("Agregando resultados");
            notify(Notice::Status("Agregando resultados...".into()));
            notify(Notice::Progress(100));
            notify(Notice::Status("Procesamiento completado".into()));
        }
    }

    info!(
        variante = variant.name(),
        archivos = aggregator.files_accepted(),
        "Procesamiento completado exitosamente"
    );
    Ok(aggregator.finalize())
}
