//! Aggregation strategies for the four report variants.
//!
//! Every variant folds accepted tables through the same two-step contract
//! ([`Aggregator::accumulate_file`] per file, [`Aggregator::finalize`] once
//! at the end), but each keeps its own grouping key and predicates:
//!
//! ```text
//! devoluciones   rows grouped by campaign label  →  tables + count summary
//! simples/basic  one stats row per source file   →  per-file summary
//! directo        everything into one counter set →  single aggregate row
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    cell_i64, cell_str, CampaignCount, CampaignTable, DirectStats, FileStats, ProcessOutcome,
    RecordTable, ReportVariant, DIRECTO_CAMPAIGN_LABEL,
};

/// Common contract of the four aggregation strategies.
pub trait Aggregator {
    /// Fold one accepted (validated, coerced) table into the running
    /// aggregate. `file_name` labels per-file summary rows.
    fn accumulate_file(&mut self, file_name: &str, table: RecordTable);

    /// Number of files folded so far.
    fn files_accepted(&self) -> usize;

    /// Build the terminal outcome.
    fn finalize(self: Box<Self>) -> ProcessOutcome;
}

/// Strategy instance for a variant.
pub fn aggregator_for(variant: ReportVariant) -> Box<dyn Aggregator> {
    match variant {
        ReportVariant::Devoluciones => Box::new(DevolucionesAggregator::default()),
        ReportVariant::Simples | ReportVariant::Basic => Box::new(PerFileAggregator::new(variant)),
        ReportVariant::Directo => Box::new(DirectoAggregator::default()),
    }
}

// =============================================================================
// Devoluciones: group rows by campaign label
// =============================================================================

/// Groups all accepted rows by the `campana` column, keeping the full
/// row-set per campaign for later export. Campaign tables keep first-seen
/// campaign order with file-arrival row order inside each; the summary is
/// consolidated per campaign and sorted by label.
#[derive(Default)]
struct DevolucionesAggregator {
    groups: Vec<CampaignTable>,
    index: HashMap<String, usize>,
    counts: BTreeMap<String, u64>,
    files: usize,
}

const CAMPAIGN_COLUMN: &str = "campana";

impl Aggregator for DevolucionesAggregator {
    fn accumulate_file(&mut self, _file_name: &str, table: RecordTable) {
        let RecordTable { headers, rows } = table;

        for row in rows {
            let campana = row
                .get(CAMPAIGN_COLUMN)
                .map(RecordTable::cell_display)
                .unwrap_or_default();

            let slot = match self.index.get(&campana) {
                Some(&i) => i,
                None => {
                    self.groups.push(CampaignTable {
                        campana: campana.clone(),
                        tabla: RecordTable {
                            headers: headers.clone(),
                            rows: Vec::new(),
                        },
                    });
                    let i = self.groups.len() - 1;
                    self.index.insert(campana.clone(), i);
                    i
                }
            };
            self.groups[slot].tabla.rows.push(row);
            *self.counts.entry(campana).or_insert(0) += 1;
        }
        self.files += 1;
    }

    fn files_accepted(&self) -> usize {
        self.files
    }

    fn finalize(self: Box<Self>) -> ProcessOutcome {
        let this = *self;
        let resumen = this
            .counts
            .into_iter()
            .map(|(campana, registros)| CampaignCount { campana, registros })
            .collect();
        ProcessOutcome::Devoluciones {
            campanas: this.groups,
            resumen,
        }
    }
}

// =============================================================================
// Simples / basic: one statistics row per source file
// =============================================================================

/// Per-file send/click/read statistics. Simples counts clicks and compares
/// modality against `"simple"`; basic has no click column (always 0) and
/// compares against `"basic"`. Files are never merged.
struct PerFileAggregator {
    variant: ReportVariant,
    modality: &'static str,
    stats: Vec<FileStats>,
}

impl PerFileAggregator {
    fn new(variant: ReportVariant) -> Self {
        let modality = variant
            .modality_target()
            .unwrap_or("simple");
        Self {
            variant,
            modality,
            stats: Vec::new(),
        }
    }
}

impl Aggregator for PerFileAggregator {
    fn accumulate_file(&mut self, file_name: &str, table: RecordTable) {
        let mut enviados_rcs = 0;
        let mut enviados_sms = 0;
        let mut no_enviados = 0;
        let mut clics = 0;
        let mut leidos_unico = 0;
        let mut no_leidos = 0;

        for row in &table.rows {
            let estatus = cell_i64(row, "estatus");
            let leido = cell_i64(row, "leido");
            let modalidad = cell_str(row, "modalidad");

            if estatus == Some(1) && modalidad == Some(self.modality) {
                enviados_rcs += 1;
                if leido == Some(1) {
                    leidos_unico += 1;
                }
            }
            if estatus == Some(1) && modalidad == Some("sms") {
                enviados_sms += 1;
            }
            if estatus == Some(0) {
                no_enviados += 1;
            }
            if self.variant.counts_clicks() && cell_str(row, "clic") == Some("si") {
                clics += 1;
            }
            if leido == Some(0) {
                no_leidos += 1;
            }
        }

        let total = table.len() as u64;
        self.stats.push(FileStats {
            campana: file_name.to_string(),
            total_original: total,
            total_generada: total,
            excluidos: 0,
            enviados_rcs,
            enviados_sms,
            no_enviados,
            clics,
            leidos_unico,
            no_leidos,
        });
    }

    fn files_accepted(&self) -> usize {
        self.stats.len()
    }

    fn finalize(self: Box<Self>) -> ProcessOutcome {
        let this = *self;
        ProcessOutcome::PorArchivo {
            variante: this.variant,
            resumen: this.stats,
        }
    }
}

// =============================================================================
// Directo: single aggregate across all files
// =============================================================================

/// Sums every accepted file into one counter set. Status 1 counts as sent;
/// anything else (including the -1 coercion sentinel) as not sent. With no
/// accepted files the outcome carries no row at all.
#[derive(Default)]
struct DirectoAggregator {
    total: u64,
    enviados: u64,
    no_enviados: u64,
    files: usize,
}

impl Aggregator for DirectoAggregator {
    fn accumulate_file(&mut self, _file_name: &str, table: RecordTable) {
        for row in &table.rows {
            self.total += 1;
            if cell_i64(row, "status") == Some(1) {
                self.enviados += 1;
            } else {
                self.no_enviados += 1;
            }
        }
        self.files += 1;
    }

    fn files_accepted(&self) -> usize {
        self.files
    }

    fn finalize(self: Box<Self>) -> ProcessOutcome {
        let resumen = (self.files > 0).then(|| DirectStats {
            campana: DIRECTO_CAMPAIGN_LABEL.to_string(),
            total_original: self.total,
            total_generada: self.total,
            excluidos: 0,
            enviados: self.enviados,
            no_enviados: self.no_enviados,
        });
        ProcessOutcome::Directo { resumen }
    }
}
