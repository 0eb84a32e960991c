pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Result fields that hold one row per term or per month, in display order.
const ROW_SET_KEYS: [&str; 5] = [
    "options",
    "points",
    "financing_options",
    "lease_options",
    "lease_vs_buy",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// The `result` object inside the computation envelope, if there is one.
pub(crate) fn result_object(value: &Value) -> Option<&Map<String, Value>> {
    value.get("result").and_then(Value::as_object)
}

/// First row set in a result, as `(field, rows)`.
pub(crate) fn primary_rows(result: &Map<String, Value>) -> Option<(&str, &[Value])> {
    ROW_SET_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
            Some((*key, rows.as_slice()))
        }
        _ => None,
    })
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
