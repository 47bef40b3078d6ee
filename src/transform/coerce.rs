//! Lossy cell normalization applied before aggregation.
//!
//! Status-like columns are coerced to integers; values that cannot be
//! parsed become the variant's sentinel instead of failing the file, so
//! downstream counts still sum correctly while bad data stays
//! distinguishable from real status codes.

use serde_json::Value;

use crate::models::RecordTable;

/// Coerce every cell of the given columns to an integer.
///
/// Numeric strings parse normally (decimal strings truncate, so `"1.0"`
/// becomes 1); anything unparsable and every missing cell becomes
/// `sentinel`. Returns how many cells fell back to the sentinel, for the
/// caller's warning log.
pub fn coerce_numeric_columns(table: &mut RecordTable, columns: &[&str], sentinel: i64) -> usize {
    let mut fallbacks = 0usize;

    for row in &mut table.rows {
        for column in columns {
            let coerced = match row.get(*column) {
                Some(value) => match coerce_cell(value) {
                    Some(n) => n,
                    None => {
                        fallbacks += 1;
                        sentinel
                    }
                },
                None => {
                    fallbacks += 1;
                    sentinel
                }
            };
            row.insert((*column).to_string(), Value::from(coerced));
        }
    }

    fallbacks
}

fn coerce_cell(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// Fold free-text columns to trimmed lowercase so comparisons against
/// `"simple"`, `"sms"`, `"si"`, ... are exact. Missing cells stay missing.
pub fn fold_text_columns(table: &mut RecordTable, columns: &[&str]) {
    for row in &mut table.rows {
        for column in columns {
            if let Some(Value::String(s)) = row.get(*column) {
                let folded = s.trim().to_lowercase();
                row.insert((*column).to_string(), Value::String(folded));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{cell_i64, cell_str};
    use serde_json::{json, Map};

    fn table_of(column: &str, values: &[Value]) -> RecordTable {
        let rows = values
            .iter()
            .map(|v| {
                let mut row = Map::new();
                row.insert(column.to_string(), v.clone());
                row
            })
            .collect();
        RecordTable {
            headers: vec![column.to_string()],
            rows,
        }
    }

    #[test]
    fn test_numeric_strings_parse() {
        let mut table = table_of("estatus", &[json!("1"), json!(" 0 "), json!("2")]);
        let fallbacks = coerce_numeric_columns(&mut table, &["estatus"], 0);
        assert_eq!(fallbacks, 0);
        assert_eq!(cell_i64(&table.rows[0], "estatus"), Some(1));
        assert_eq!(cell_i64(&table.rows[1], "estatus"), Some(0));
        assert_eq!(cell_i64(&table.rows[2], "estatus"), Some(2));
    }

    #[test]
    fn test_decimal_strings_truncate() {
        let mut table = table_of("estatus", &[json!("1.0"), json!("0.9")]);
        coerce_numeric_columns(&mut table, &["estatus"], 0);
        assert_eq!(cell_i64(&table.rows[0], "estatus"), Some(1));
        assert_eq!(cell_i64(&table.rows[1], "estatus"), Some(0));
    }

    #[test]
    fn test_unparsable_becomes_sentinel() {
        let mut table = table_of("status", &[json!("x"), json!("1")]);
        let fallbacks = coerce_numeric_columns(&mut table, &["status"], -1);
        assert_eq!(fallbacks, 1);
        assert_eq!(cell_i64(&table.rows[0], "status"), Some(-1));
        assert_eq!(cell_i64(&table.rows[1], "status"), Some(1));
    }

    #[test]
    fn test_missing_becomes_sentinel() {
        let mut table = table_of("leido", &[json!(null)]);
        let fallbacks = coerce_numeric_columns(&mut table, &["leido"], 0);
        assert_eq!(fallbacks, 1);
        assert_eq!(cell_i64(&table.rows[0], "leido"), Some(0));
    }

    #[test]
    fn test_coercion_is_total() {
        // Every input shape maps to a defined integer.
        let mut table = table_of(
            "status",
            &[json!("7"), json!("x"), json!(null), json!(3), json!([1])],
        );
        coerce_numeric_columns(&mut table, &["status"], -1);
        for row in &table.rows {
            assert!(cell_i64(row, "status").is_some());
        }
    }

    #[test]
    fn test_fold_text_columns() {
        let mut table = table_of("modalidad", &[json!("  SIMPLE "), json!("Sms"), json!(null)]);
        fold_text_columns(&mut table, &["modalidad"]);
        assert_eq!(cell_str(&table.rows[0], "modalidad"), Some("simple"));
        assert_eq!(cell_str(&table.rows[1], "modalidad"), Some("sms"));
        assert!(table.rows[2].get("modalidad").unwrap().is_null());
    }
}
