//! Structure and content validation for loaded tables.
//!
//! Two independent checks gate each file before aggregation:
//!
//! - **Structure**: the variant's required column set must be a subset of
//!   the table's columns. Extra columns are ignored, never flagged.
//! - **Content** (devoluciones only): every character of the `mensaje`
//!   column must belong to a fixed allow-list of characters the SMS/RCS
//!   gateway encoding supports. Violations are collected with row and
//!   position context, capped at [`MAX_VIOLATIONS`] plus one truncation
//!   marker.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::models::RecordTable;

/// Characters accepted in outbound message payloads.
pub const CARACTERES_PERMITIDOS: &str =
    " É_!\"#'¤%&()*+-./<=>?$@0ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.,:;'";

static ALLOWED: Lazy<HashSet<char>> = Lazy::new(|| CARACTERES_PERMITIDOS.chars().collect());

/// Column scanned by the content check.
pub const MESSAGE_COLUMN: &str = "mensaje";

/// Violations reported before the scan stops.
pub const MAX_VIOLATIONS: usize = 10;

/// Marker appended when the scan stopped early.
pub const TRUNCATION_MARKER: &str = "... (más errores encontrados)";

// =============================================================================
// Structure validation
// =============================================================================

/// Required columns absent from the table, in required-list order.
pub fn missing_columns(table: &RecordTable, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect()
}

/// Whether the required set is a subset of the table's columns.
pub fn is_valid_structure(table: &RecordTable, required: &[&str]) -> bool {
    missing_columns(table, required).is_empty()
}

// =============================================================================
// Content validation
// =============================================================================

/// One disallowed character found in a message cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// 1-based row number counting the header as row 1 (first data row is 2).
    pub fila: usize,
    /// The offending character.
    pub caracter: char,
    /// 0-based character position within the message.
    pub posicion: usize,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fila {}: Carácter '{}' (posición {}) no permitido en mensaje.",
            self.fila, self.caracter, self.posicion
        )
    }
}

/// Scan the message column for characters outside the allow-list.
///
/// Returns the empty string when every character of every non-missing
/// message is allowed (the success sentinel), else a newline-joined report
/// of at most [`MAX_VIOLATIONS`] violations plus the truncation marker.
pub fn validate_messages(table: &RecordTable) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let mensaje = match row.get(MESSAGE_COLUMN) {
            Some(Value::Null) | None => continue,
            Some(value) => RecordTable::cell_display(value),
        };

        for (posicion, caracter) in mensaje.chars().enumerate() {
            if ALLOWED.contains(&caracter) {
                continue;
            }
            let violation = Violation {
                fila: idx + 2,
                caracter,
                posicion,
            };
            lines.push(violation.to_string());
            if lines.len() >= MAX_VIOLATIONS {
                lines.push(TRUNCATION_MARKER.to_string());
                return lines.join("\n");
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn table_with(headers: &[&str]) -> RecordTable {
        RecordTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn message_table(messages: &[Option<&str>]) -> RecordTable {
        let rows = messages
            .iter()
            .map(|m| {
                let mut row = Map::new();
                row.insert(
                    MESSAGE_COLUMN.to_string(),
                    m.map_or(json!(null), |s| json!(s)),
                );
                row
            })
            .collect();
        RecordTable {
            headers: vec![MESSAGE_COLUMN.to_string()],
            rows,
        }
    }

    #[test]
    fn test_structure_subset_passes() {
        let table = table_with(&["clienteid", "number", "status", "extra"]);
        assert!(is_valid_structure(&table, &["clienteid", "number", "status"]));
        assert!(missing_columns(&table, &["clienteid", "number", "status"]).is_empty());
    }

    #[test]
    fn test_structure_missing_column_fails() {
        let table = table_with(&["clienteid", "number"]);
        assert!(!is_valid_structure(&table, &["clienteid", "number", "status"]));
        assert_eq!(
            missing_columns(&table, &["clienteid", "number", "status"]),
            vec!["status".to_string()]
        );
    }

    #[test]
    fn test_structure_monotonic_in_columns() {
        let required = ["a", "b"];
        let passing = table_with(&["a", "b"]);
        assert!(is_valid_structure(&passing, &required));

        // Adding unrelated columns keeps it passing.
        let wider = table_with(&["a", "b", "c", "d"]);
        assert!(is_valid_structure(&wider, &required));

        // Removing any required column makes it fail.
        let narrower = table_with(&["b"]);
        assert!(!is_valid_structure(&narrower, &required));
    }

    #[test]
    fn test_messages_all_allowed() {
        let table = message_table(&[Some("Hola"), Some("Hi!"), Some("PROMO 2x1: $99")]);
        assert_eq!(validate_messages(&table), "");
    }

    #[test]
    fn test_messages_null_cells_skipped() {
        let table = message_table(&[None, Some("Hola")]);
        assert_eq!(validate_messages(&table), "");
    }

    #[test]
    fn test_single_violation_format() {
        let table = message_table(&[Some("Hola"), Some("Ok™")]);
        let report = validate_messages(&table);
        assert_eq!(
            report,
            "Fila 3: Carácter '™' (posición 2) no permitido en mensaje."
        );
    }

    #[test]
    fn test_report_caps_at_ten_plus_marker() {
        // 15 disallowed characters in one message; only 10 reported.
        let table = message_table(&[Some("™™™™™™™™™™™™™™™")]);
        let report = validate_messages(&table);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), MAX_VIOLATIONS + 1);
        assert_eq!(lines[MAX_VIOLATIONS], TRUNCATION_MARKER);
        assert!(lines[0].contains("posición 0"));
        assert!(lines[9].contains("posición 9"));
    }

    #[test]
    fn test_cap_spans_rows() {
        let messages: Vec<Option<&str>> = (0..6).map(|_| Some("™™")).collect();
        let table = message_table(&messages);
        let report = validate_messages(&table);
        assert_eq!(report.lines().count(), MAX_VIOLATIONS + 1);
        // Fifth row (data row 6) is the last one reported.
        assert!(report.contains("Fila 6"));
        assert!(!report.contains("Fila 7"));
    }

    #[test]
    fn test_accented_lowercase_is_rejected() {
        // The allow-list carries É but no lowercase accented vowels.
        let table = message_table(&[Some("Héllo")]);
        let report = validate_messages(&table);
        assert!(report.contains("'é'"));
    }
}
