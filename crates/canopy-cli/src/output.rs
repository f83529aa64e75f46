//! Text rendering of compiled queries and reshaped rows.

use crate::cli::OutputFormat;
use canopy_query::{CompiledQuery, Row};
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::{json, Value};

/// Placeholder shown for SQL nulls in tables
const NULL: &str = "NULL";

fn table() -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

/// Native text followed by the output column list
pub fn translation(compiled: &CompiledQuery, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let mut columns = table();
            columns.set_header(vec!["#", "Label", "Full name", "Type"]);
            for (i, column) in compiled.columns.iter().enumerate() {
                columns.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(&column.label),
                    Cell::new(&column.full_name),
                    Cell::new(column.semantic_type),
                ]);
            }
            format!("{}\n\n{}", compiled.native, columns)
        }
        OutputFormat::Json => {
            let value = json!({
                "entity": compiled.root_entity,
                "native": compiled.native,
                "columns": compiled.columns,
            });
            pretty(&value)
        }
    }
}

/// Reshaped rows under the compiled column labels
pub fn rows(compiled: &CompiledQuery, rows: &[Row], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => {
            let mut out = table();
            out.set_header(compiled.columns.iter().map(|c| Cell::new(&c.label)));
            for row in rows {
                out.add_row(
                    compiled
                        .cells(row)
                        .map(|cell| Cell::new(cell.value().unwrap_or(NULL))),
                );
            }
            out.to_string()
        }
        OutputFormat::Json => {
            let labels: Vec<&str> = compiled.columns.iter().map(|c| c.label.as_str()).collect();
            let values: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| {
                    compiled
                        .cells(row)
                        .map(|cell| cell.value().map_or(Value::Null, Value::from))
                        .collect()
                })
                .collect();
            pretty(&json!({ "columns": labels, "rows": values }))
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
