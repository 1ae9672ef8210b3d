//! Console rendering for workflow results.

use std::io::{self, Write};

use prettytable::{Cell, Row as TableRow, Table};
use serde_json::Value;

use crate::clients::{Row, TransactionResult};

/// Divider printed around confirmations.
pub const SEPARATOR: &str = "------------------------------------------------";

pub fn write_separator<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", SEPARATOR)
}

/// Prints the outcome of a submitted transaction.
pub fn write_transaction<W: Write + ?Sized>(
    out: &mut W,
    result: &TransactionResult,
) -> io::Result<()> {
    write_separator(out)?;
    write_separator(out)?;
    writeln!(out, "TX: {} executed successfully", result.transaction_id)?;
    writeln!(out, "Block num: {}", result.block_num)?;
    writeln!(out, "Block time: {}", result.block_time)?;
    writeln!(out, "Receiver (SMC): {}", result.receiver)?;
    write_separator(out)
}

/// Text of a table cell: strings bare, everything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Builds a table with one column per field, in first-seen order.
pub fn rows_table(rows: &[Row]) -> Table {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut table = Table::new();
    table.set_titles(TableRow::new(columns.iter().map(|c| Cell::new(c)).collect()));
    for row in rows {
        table.add_row(TableRow::new(
            columns
                .iter()
                .map(|c| Cell::new(&row.get(*c).map(cell_text).unwrap_or_default()))
                .collect(),
        ));
    }
    table
}

/// Prints `rows` as a table, or `empty` when there are none.
pub fn write_rows<W: Write + ?Sized>(out: &mut W, rows: &[Row], empty: &str) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "{}", empty);
    }
    rows_table(rows).print(out)?;
    Ok(())
}

/// Splits a flat action vector into matrix rows of `width` entries.
///
/// Falls back to a single row when the width does not divide the vector.
pub fn matrix_rows(actions: &[Value], width: Option<usize>) -> Vec<String> {
    let render = |chunk: &[Value]| {
        format!(
            "[{}]",
            chunk.iter().map(cell_text).collect::<Vec<_>>().join(", ")
        )
    };
    match width {
        Some(w) if w > 0 && !actions.is_empty() && actions.len() % w == 0 => {
            actions.chunks(w).map(render).collect()
        }
        _ => vec![render(actions)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_separator_is_48_dashes() {
        assert_eq!(SEPARATOR.len(), 48);
        assert!(SEPARATOR.chars().all(|c| c == '-'));
    }

    #[test]
    fn test_transaction_confirmation_lines() {
        let result = TransactionResult {
            transaction_id: "abc123".into(),
            block_num: 42,
            block_time: "2024-05-01T12:00:00.500".into(),
            receiver: "hemerton".into(),
        };
        let mut out = Vec::new();
        write_transaction(&mut out, &result).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                SEPARATOR,
                SEPARATOR,
                "TX: abc123 executed successfully",
                "Block num: 42",
                "Block time: 2024-05-01T12:00:00.500",
                "Receiver (SMC): hemerton",
                SEPARATOR,
            ]
        );
    }

    #[test]
    fn test_rows_table_collects_all_columns() {
        let rows: Vec<Row> = vec![
            json!({"numlist": 1, "nTAT": [30, 60]}).as_object().unwrap().clone(),
            json!({"numlist": 2, "user": "eosio"}).as_object().unwrap().clone(),
        ];
        let table = rows_table(&rows);
        assert_eq!(table.len(), 2);
        let mut out = Vec::new();
        table.print(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("numlist"));
        assert!(text.contains("[30,60]"));
        assert!(text.contains("eosio"));
    }

    #[test]
    fn test_matrix_rows() {
        let actions = vec![json!(1), json!(2), json!(2), json!(2)];
        assert_eq!(matrix_rows(&actions, Some(2)), vec!["[1, 2]", "[2, 2]"]);
        assert_eq!(matrix_rows(&actions, Some(3)), vec!["[1, 2, 2, 2]"]);
        assert_eq!(matrix_rows(&actions, None), vec!["[1, 2, 2, 2]"]);
        assert_eq!(matrix_rows(&[], Some(2)), vec!["[]"]);
    }
}
