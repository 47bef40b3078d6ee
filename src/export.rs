//! Per-campaign export of processed devoluciones tables.
//!
//! Each campaign becomes one `|`-delimited UTF-8 file named after the
//! campaign label, sanitized for common filesystems and capped at 100
//! characters before the `.csv` extension. Only the columns the send
//! platform re-ingests are written.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{ExportError, ExportResult};
use crate::models::{CampaignTable, RecordTable};

/// Columns written to campaign files, in order, when present.
pub const EXPORT_COLUMNS: [&str; 3] = ["clienteid", "numtelefono", "mensaje"];

/// Maximum file-name length before the extension.
pub const MAX_FILE_NAME_LEN: usize = 100;

static INVALID_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("invalid file-name pattern"));

/// Build a file-system-safe name from a campaign label: characters
/// disallowed on common filesystems become `_`, then the result is
/// truncated to [`MAX_FILE_NAME_LEN`] characters.
pub fn safe_file_name(nombre: &str) -> String {
    let replaced = INVALID_NAME_CHARS.replace_all(nombre, "_");
    replaced.chars().take(MAX_FILE_NAME_LEN).collect()
}

/// Keep only the export columns that exist in the table, in canonical
/// order. Missing columns are silently dropped; when none match, the
/// result is an empty table.
pub fn select_export_columns(table: &RecordTable) -> RecordTable {
    let headers: Vec<String> = EXPORT_COLUMNS
        .iter()
        .filter(|c| table.has_column(c))
        .map(|c| c.to_string())
        .collect();

    if headers.is_empty() {
        return RecordTable::default();
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| {
                    let value = row.get(h).cloned().unwrap_or(serde_json::Value::Null);
                    (h.clone(), value)
                })
                .collect()
        })
        .collect();

    RecordTable { headers, rows }
}

/// Write one file per campaign into `dir` and return the written file
/// names. Any write failure aborts the whole export; files already
/// written stay on disk and the caller decides what to tell the operator.
pub fn export_campaigns(campaigns: &[CampaignTable], dir: &Path) -> ExportResult<Vec<String>> {
    let mut written = Vec::with_capacity(campaigns.len());

    for campaign in campaigns {
        let nombre = format!("{}.csv", safe_file_name(&campaign.campana));
        let path = dir.join(&nombre);
        let selected = select_export_columns(&campaign.tabla);
        write_table(&selected, &path).map_err(|source| ExportError::Write {
            file: nombre.clone(),
            source,
        })?;
        debug!(archivo = %nombre, registros = selected.len(), "Campaña exportada");
        written.push(nombre);
    }

    info!(archivos = written.len(), destino = %dir.display(), "Exportación completada");
    Ok(written)
}

fn write_table(table: &RecordTable, path: &Path) -> std::io::Result<()> {
    if table.headers.is_empty() {
        // Nothing matched the export column set; leave an empty file so
        // the campaign is still visible in the output directory.
        return std::fs::write(path, "");
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .from_path(path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        let record: Vec<String> = table
            .headers
            .iter()
            .map(|h| {
                row.get(h)
                    .map(RecordTable::cell_display)
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
