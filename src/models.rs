//! Domain models for the report processing pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`RecordTable`] - an in-memory delimited file (headers + rows)
//! - [`ReportVariant`] - static descriptor of one of the four report pipelines
//! - [`CampaignCount`], [`FileStats`], [`DirectStats`] - aggregate summary rows
//! - [`ProcessOutcome`] - terminal payload of a successful batch run

use serde::Serialize;
use serde_json::{Map, Value};

// =============================================================================
// Record Table
// =============================================================================

/// An in-memory table loaded from one delimited file.
///
/// `headers` keeps the column order; each row maps normalized column name to
/// a cell value (`String`, `Number` after coercion, or `Null` for an empty
/// field). Column names are trimmed and lowercased at load time and stay
/// unique from then on.
#[derive(Debug, Clone, Serialize, Default)]
pub struct RecordTable {
    /// Normalized column names, in file order.
    pub headers: Vec<String>,
    /// Data rows, keyed by normalized column name.
    pub rows: Vec<Map<String, Value>>,
}

impl RecordTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column with this (already normalized) name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// Rename a column, moving every row value under the new key.
    /// Does nothing if `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if !self.has_column(from) {
            return;
        }
        for header in &mut self.headers {
            if header == from {
                *header = to.to_string();
            }
        }
        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
    }

    /// Render a cell for display or export. `Null` becomes the empty string.
    pub fn cell_display(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// String content of a cell, if it holds one.
pub fn cell_str<'a>(row: &'a Map<String, Value>, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

/// Integer content of a cell, if it holds one (set by type coercion).
pub fn cell_i64(row: &Map<String, Value>, column: &str) -> Option<i64> {
    row.get(column).and_then(Value::as_i64)
}

// =============================================================================
// Report Variant Descriptor
// =============================================================================

/// One of the four supported report pipelines.
///
/// The variant is a static descriptor: required columns, column aliases,
/// delimiter policy, content-check flag, coercion targets and sentinel.
/// Everything here is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    /// Returns files grouped per campaign, with message content check.
    Devoluciones,
    /// Per-file send/click/read statistics (RCS "simple" modality).
    Simples,
    /// Per-file send/read statistics ("basic" modality, no click column).
    Basic,
    /// Single cross-file aggregate, fixed `|` separator.
    Directo,
}

/// Fixed campaign label of the directo aggregate row.
pub const DIRECTO_CAMPAIGN_LABEL: &str = "# MX - DEVOLUCIONES";

impl ReportVariant {
    /// All variants, in menu order.
    pub const ALL: [ReportVariant; 4] = [
        ReportVariant::Devoluciones,
        ReportVariant::Simples,
        ReportVariant::Basic,
        ReportVariant::Directo,
    ];

    /// Lowercase name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ReportVariant::Devoluciones => "devoluciones",
            ReportVariant::Simples => "simples",
            ReportVariant::Basic => "basic",
            ReportVariant::Directo => "directo",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        ReportVariant::ALL
            .into_iter()
            .find(|v| v.name() == normalized)
    }

    /// Columns every accepted file must have (normalized names).
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            ReportVariant::Devoluciones => &[
                "clienteid",
                "nombre",
                "apellidopaterno",
                "apellidomaterno",
                "numtelefono",
                "mensaje",
                "variable1",
                "variable2",
                "variable3",
                "variable4",
                "variable5",
                "fechainsercion",
                "fechaaenviar",
                "horaaenviar",
                "campana",
            ],
            ReportVariant::Simples => &[
                "clienteid",
                "numtelefono",
                "identificador",
                "estatus",
                "clic",
                "rcs_entregable",
                "articulo_clic",
                "campaña",
                "modalidad",
                "leido",
            ],
            ReportVariant::Basic => &["clienteid", "telefono", "estatus", "modalidad", "leido"],
            ReportVariant::Directo => &["clienteid", "number", "status"],
        }
    }

    /// Column alias rewrites `(alias, canonical)`, applied after header
    /// normalization, each only when the canonical name is absent.
    pub fn aliases(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ReportVariant::Basic => &[("clientid", "clienteid"), ("number", "telefono")],
            _ => &[("clientid", "clienteid")],
        }
    }

    /// Fixed separator, if the variant does not use detection.
    pub fn fixed_delimiter(&self) -> Option<u8> {
        match self {
            ReportVariant::Directo => Some(b'|'),
            _ => None,
        }
    }

    /// Whether the message allow-list check applies.
    pub fn checks_content(&self) -> bool {
        matches!(self, ReportVariant::Devoluciones)
    }

    /// Columns coerced to integer status codes.
    pub fn numeric_columns(&self) -> &'static [&'static str] {
        match self {
            ReportVariant::Devoluciones => &[],
            ReportVariant::Simples | ReportVariant::Basic => &["estatus", "leido"],
            ReportVariant::Directo => &["status"],
        }
    }

    /// Sentinel substituted for values that fail numeric coercion.
    ///
    /// Simples/basic force-zero (counts as not sent / not read); directo
    /// force-excludes with -1 so the value can never match status 1.
    pub fn coercion_sentinel(&self) -> i64 {
        match self {
            ReportVariant::Directo => -1,
            _ => 0,
        }
    }

    /// Free-text columns folded to trimmed lowercase before comparison.
    pub fn folded_text_columns(&self) -> &'static [&'static str] {
        match self {
            ReportVariant::Simples => &["modalidad", "clic"],
            ReportVariant::Basic => &["modalidad"],
            _ => &[],
        }
    }

    /// Modality value counted as the RCS channel, for per-file variants.
    pub fn modality_target(&self) -> Option<&'static str> {
        match self {
            ReportVariant::Simples => Some("simple"),
            ReportVariant::Basic => Some("basic"),
            _ => None,
        }
    }

    /// Whether the variant has a click column to count.
    pub fn counts_clicks(&self) -> bool {
        matches!(self, ReportVariant::Simples)
    }

    /// Display labels of the summary table, in column order.
    pub fn summary_headers(&self) -> &'static [&'static str] {
        match self {
            ReportVariant::Devoluciones => &["Campaña", "Registros"],
            ReportVariant::Simples => &[
                "CAMPAÑA",
                "Total Original",
                "Total Generada",
                "Excluidos",
                "ENVIADOS RCS",
                "ENVIADOS SMS",
                "NO ENVIADOS",
                "CLICS",
                "LEIDOS UNICO",
                "NO LEIDOS",
            ],
            ReportVariant::Basic => &[
                "CAMPAÑA",
                "Total Original",
                "Total Generada",
                "Excluidos",
                "Enviados (RCS)",
                "Enviados (SMS)",
                "NO ENVIADOS",
                "CLICS",
                "LEIDOS UNICO",
                "NO LEIDOS",
            ],
            ReportVariant::Directo => &[
                "Campaña",
                "Total Original",
                "Total Generada",
                "Excluidos",
                "Enviados",
                "No enviados",
            ],
        }
    }
}

impl std::str::FromStr for ReportVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportVariant::from_name(s)
            .ok_or_else(|| format!("variante desconocida '{s}' (devoluciones, simples, basic, directo)"))
    }
}

impl std::fmt::Display for ReportVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Aggregate Summary Rows
// =============================================================================

/// Devoluciones summary row: record count for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignCount {
    #[serde(rename = "Campaña")]
    pub campana: String,
    #[serde(rename = "Registros")]
    pub registros: u64,
}

/// Per-file statistics row for the simples and basic variants.
///
/// `total_generada` always mirrors `total_original` and `excluidos` is
/// always 0; both columns exist because the operator-facing table has them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStats {
    /// Source file name (the table's campaign column).
    pub campana: String,
    pub total_original: u64,
    pub total_generada: u64,
    pub excluidos: u64,
    pub enviados_rcs: u64,
    pub enviados_sms: u64,
    pub no_enviados: u64,
    pub clics: u64,
    pub leidos_unico: u64,
    pub no_leidos: u64,
}

impl FileStats {
    /// Values in summary-table column order.
    pub fn values(&self) -> [u64; 9] {
        [
            self.total_original,
            self.total_generada,
            self.excluidos,
            self.enviados_rcs,
            self.enviados_sms,
            self.no_enviados,
            self.clics,
            self.leidos_unico,
            self.no_leidos,
        ]
    }
}

/// Single cross-file aggregate row for the directo variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectStats {
    pub campana: String,
    pub total_original: u64,
    pub total_generada: u64,
    pub excluidos: u64,
    pub enviados: u64,
    pub no_enviados: u64,
}

// =============================================================================
// Processing Outcome
// =============================================================================

/// One campaign's consolidated rows (devoluciones variant).
#[derive(Debug, Clone, Serialize)]
pub struct CampaignTable {
    pub campana: String,
    pub tabla: RecordTable,
}

/// Terminal payload of a successful batch run.
///
/// Owned exclusively by the caller once the worker hands it over; nothing
/// is persisted unless the caller exports it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// Per-campaign tables (first-seen campaign order, file-arrival row
    /// order) plus the summary, sorted by campaign label.
    Devoluciones {
        campanas: Vec<CampaignTable>,
        resumen: Vec<CampaignCount>,
    },
    /// One summary row per accepted source file, in input order.
    PorArchivo {
        variante: ReportVariant,
        resumen: Vec<FileStats>,
    },
    /// Cross-file aggregate; `None` when no file was accepted.
    Directo { resumen: Option<DirectStats> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_table() -> RecordTable {
        let mut row = Map::new();
        row.insert("clientid".to_string(), json!("77"));
        row.insert("mensaje".to_string(), json!("Hola"));
        RecordTable {
            headers: vec!["clientid".into(), "mensaje".into()],
            rows: vec![row],
        }
    }

    #[test]
    fn test_rename_column_moves_values() {
        let mut table = sample_table();
        table.rename_column("clientid", "clienteid");
        assert!(table.has_column("clienteid"));
        assert!(!table.has_column("clientid"));
        assert_eq!(cell_str(&table.rows[0], "clienteid"), Some("77"));
    }

    #[test]
    fn test_rename_absent_column_is_noop() {
        let mut table = sample_table();
        table.rename_column("number", "telefono");
        assert_eq!(table.headers, vec!["clientid", "mensaje"]);
    }

    #[test]
    fn test_required_column_counts() {
        assert_eq!(ReportVariant::Devoluciones.required_columns().len(), 15);
        assert_eq!(ReportVariant::Simples.required_columns().len(), 10);
        assert_eq!(ReportVariant::Basic.required_columns().len(), 5);
        assert_eq!(ReportVariant::Directo.required_columns().len(), 3);
    }

    #[test]
    fn test_variant_from_name() {
        assert_eq!(
            ReportVariant::from_name("Devoluciones"),
            Some(ReportVariant::Devoluciones)
        );
        assert_eq!(ReportVariant::from_name(" directo "), Some(ReportVariant::Directo));
        assert_eq!(ReportVariant::from_name("reporte5"), None);
    }

    #[test]
    fn test_sentinels_differ_by_variant() {
        assert_eq!(ReportVariant::Simples.coercion_sentinel(), 0);
        assert_eq!(ReportVariant::Basic.coercion_sentinel(), 0);
        assert_eq!(ReportVariant::Directo.coercion_sentinel(), -1);
    }

    #[test]
    fn test_only_directo_fixes_delimiter() {
        assert_eq!(ReportVariant::Directo.fixed_delimiter(), Some(b'|'));
        assert_eq!(ReportVariant::Devoluciones.fixed_delimiter(), None);
        assert_eq!(ReportVariant::Simples.fixed_delimiter(), None);
    }

    #[test]
    fn test_basic_aliases_include_number() {
        let aliases = ReportVariant::Basic.aliases();
        assert!(aliases.contains(&("number", "telefono")));
        assert!(aliases.contains(&("clientid", "clienteid")));
        assert!(!ReportVariant::Simples.aliases().contains(&("number", "telefono")));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(RecordTable::cell_display(&Value::Null), "");
        assert_eq!(RecordTable::cell_display(&json!("ok")), "ok");
        assert_eq!(RecordTable::cell_display(&json!(7)), "7");
    }
}
