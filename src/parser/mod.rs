//! Delimited file reading with separator detection and column normalization.
//!
//! Input files are UTF-8 delimited text (`,` or `|`) with a header row.
//! The separator is detected by majority count over the first lines, except
//! for variants that fix it. After parsing, every column name is trimmed and
//! lowercased, and per-variant alias rewrites are applied.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ReadError, ReadResult};
use crate::models::{RecordTable, ReportVariant};

/// Lines inspected by separator detection.
pub const DETECTION_LINES: usize = 5;

/// File name shown in logs and error messages.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn open_error(path: &Path, source: std::io::Error) -> ReadError {
    let file = file_label(path);
    if source.kind() == std::io::ErrorKind::NotFound {
        ReadError::NotFound { file }
    } else {
        ReadError::Io { file, source }
    }
}

// =============================================================================
// Separator detection
// =============================================================================

/// Detect the separator of a file by counting `|` and `,` over the first
/// [`DETECTION_LINES`] lines.
///
/// `|` wins only with a strictly greater count; ties and the
/// no-candidates case resolve to `,`. This is a heuristic, not a
/// validator: it never fails on content, only on I/O.
pub fn detect_separator(path: &Path) -> ReadResult<u8> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    let reader = BufReader::new(file);

    let mut pipes = 0usize;
    let mut commas = 0usize;
    for line in reader.lines().take(DETECTION_LINES) {
        let line = line.map_err(|e| ReadError::Io {
            file: file_label(path),
            source: e,
        })?;
        pipes += line.matches('|').count();
        commas += line.matches(',').count();
    }

    Ok(if pipes > commas { b'|' } else { b',' })
}

// =============================================================================
// Reading and normalization
// =============================================================================

/// Read a delimited file into a [`RecordTable`] with the given separator.
///
/// The first line is the header row; header names are trimmed and
/// lowercased. Empty cells become `Null`. Malformed content (inconsistent
/// field counts, invalid UTF-8, duplicate normalized headers, empty file)
/// is a [`ReadError::Format`] naming the file.
pub fn read_table(path: &Path, delimiter: u8) -> ReadResult<RecordTable> {
    let nombre = file_label(path);
    let file = File::open(path).map_err(|e| open_error(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(&nombre, e))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(ReadError::Format {
            file: nombre,
            detail: "archivo vacío o sin encabezados".into(),
        });
    }

    // Post-normalization uniqueness: duplicated names would silently
    // collapse into one map key.
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(ReadError::Format {
                file: nombre,
                detail: format!("columna duplicada '{header}'"),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(&nombre, e))?;
        let mut row = Map::with_capacity(headers.len());
        for (header, field) in headers.iter().zip(record.iter()) {
            let value = if field.is_empty() {
                Value::Null
            } else {
                Value::String(field.to_string())
            };
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }

    Ok(RecordTable { headers, rows })
}

fn csv_error(nombre: &str, error: csv::Error) -> ReadError {
    match error.into_kind() {
        csv::ErrorKind::Io(source) => ReadError::Io {
            file: nombre.to_string(),
            source,
        },
        other => ReadError::Format {
            file: nombre.to_string(),
            detail: format!("{other:?}"),
        },
    }
}

/// Apply `(alias, canonical)` rewrites, each only when the canonical
/// column is absent and the alias is present. An alias that coexists with
/// its canonical column is left untouched (it counts as an ignored extra).
pub fn apply_aliases(table: &mut RecordTable, aliases: &[(&str, &str)]) {
    for (alias, canonical) in aliases {
        if table.has_column(alias) && !table.has_column(canonical) {
            table.rename_column(alias, canonical);
        }
    }
}

/// Load one input file for a variant: pick the separator (fixed or
/// detected), read, and apply the variant's alias rewrites.
pub fn read_report_file(path: &Path, variant: ReportVariant) -> ReadResult<RecordTable> {
    let delimiter = match variant.fixed_delimiter() {
        Some(d) => d,
        None => detect_separator(path)?,
    };
    let mut table = read_table(path, delimiter)?;
    apply_aliases(&mut table, variant.aliases());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cell_str;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_detect_pipe_majority() {
        let f = write_file("a|b|c\n1|2|3\n4|5|6\n");
        assert_eq!(detect_separator(f.path()).unwrap(), b'|');
    }

    #[test]
    fn test_detect_comma_majority() {
        let f = write_file("a,b,c\n1,2,3\n");
        assert_eq!(detect_separator(f.path()).unwrap(), b',');
    }

    #[test]
    fn test_detect_tie_resolves_to_comma() {
        let f = write_file("a|b,c\n1|2,3\n");
        assert_eq!(detect_separator(f.path()).unwrap(), b',');
    }

    #[test]
    fn test_detect_no_candidates_defaults_to_comma() {
        let f = write_file("solo una columna\nvalor\n");
        assert_eq!(detect_separator(f.path()).unwrap(), b',');
    }

    #[test]
    fn test_detect_only_inspects_leading_lines() {
        // Pipes beyond the 5-line window must not count.
        let mut content = String::from("a,b\n1,2\n3,4\n5,6\n7,8\n");
        content.push_str("9|9|9|9|9|9|9|9\n");
        let f = write_file(&content);
        assert_eq!(detect_separator(f.path()).unwrap(), b',');
    }

    #[test]
    fn test_detect_empty_file() {
        let f = write_file("");
        assert_eq!(detect_separator(f.path()).unwrap(), b',');
    }

    #[test]
    fn test_detect_missing_file() {
        let err = detect_separator(Path::new("/no/existe/x.csv")).unwrap_err();
        assert!(matches!(err, ReadError::NotFound { .. }));
    }

    #[test]
    fn test_read_normalizes_headers() {
        let f = write_file("  ClienteID ,MENSAJE\n7,Hola\n");
        let table = read_table(f.path(), b',').unwrap();
        assert_eq!(table.headers, vec!["clienteid", "mensaje"]);
        assert_eq!(cell_str(&table.rows[0], "mensaje"), Some("Hola"));
    }

    #[test]
    fn test_read_empty_cell_is_null() {
        let f = write_file("a,b\n1,\n");
        let table = read_table(f.path(), b',').unwrap();
        assert!(table.rows[0].get("b").unwrap().is_null());
    }

    #[test]
    fn test_read_inconsistent_columns_is_format_error() {
        let f = write_file("a,b\n1,2,3\n");
        let err = read_table(f.path(), b',').unwrap_err();
        assert!(matches!(err, ReadError::Format { .. }));
    }

    #[test]
    fn test_read_duplicate_headers_is_format_error() {
        let f = write_file("Estatus,estatus\n1,2\n");
        let err = read_table(f.path(), b',').unwrap_err();
        assert!(matches!(err, ReadError::Format { .. }));
    }

    #[test]
    fn test_read_empty_file_is_format_error() {
        let f = write_file("");
        let err = read_table(f.path(), b',').unwrap_err();
        assert!(matches!(err, ReadError::Format { .. }));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let f = write_file("clienteid,mensaje\n7,Hola\n");
        let table = read_table(f.path(), b',').unwrap();
        let renormalized: Vec<String> = table
            .headers
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        assert_eq!(renormalized, table.headers);
    }

    #[test]
    fn test_alias_applied_when_canonical_absent() {
        let mut table = read_table(
            write_file("ClientID,number\n1,5551234\n").path(),
            b',',
        )
        .unwrap();
        apply_aliases(&mut table, ReportVariant::Basic.aliases());
        assert!(table.has_column("clienteid"));
        assert!(table.has_column("telefono"));
    }

    #[test]
    fn test_alias_skipped_when_canonical_present() {
        let mut table = read_table(
            write_file("clienteid,clientid\n1,2\n").path(),
            b',',
        )
        .unwrap();
        apply_aliases(&mut table, ReportVariant::Simples.aliases());
        assert!(table.has_column("clientid"));
        assert_eq!(cell_str(&table.rows[0], "clienteid"), Some("1"));
    }

    #[test]
    fn test_number_alias_only_in_basic() {
        let f = write_file("clienteid,number\n1,5551234\n");
        let mut table = read_table(f.path(), b',').unwrap();
        apply_aliases(&mut table, ReportVariant::Simples.aliases());
        assert!(table.has_column("number"));
        assert!(!table.has_column("telefono"));
    }

    #[test]
    fn test_read_report_file_fixed_pipe_for_directo() {
        let f = write_file("ClientID|Number|Status\n10|5551|1\n20|5552|0\n");
        let table = read_report_file(f.path(), ReportVariant::Directo).unwrap();
        assert_eq!(table.headers, vec!["clienteid", "number", "status"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_read_report_file_detects_separator() {
        let f = write_file("clienteid|mensaje\n7|Hola\n");
        let table = read_report_file(f.path(), ReportVariant::Devoluciones).unwrap();
        assert_eq!(cell_str(&table.rows[0], "mensaje"), Some("Hola"));
    }
}
