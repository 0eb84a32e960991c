use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, primary_rows, result_object};

/// Render the envelope as tables: scalar fields first, then the row set
/// (options or monthly points), then warnings and methodology.
pub fn print_table(value: &Value) {
    let Some(result) = result_object(value) else {
        print_fields(value.as_object().into_iter().flatten());
        return;
    };

    let rows = primary_rows(result);
    let row_key = rows.map(|(key, _)| key);
    print_fields(result.iter().filter(|(k, _)| Some(k.as_str()) != row_key));

    if let Some((key, rows)) = rows {
        println!("\n{}:", key);
        print_rows(rows);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(headers.iter().map(|h| cell(row, h)));
    }
    println!("{}", Table::from(builder));
}

fn cell(row: &Map<String, Value>, header: &str) -> String {
    row.get(header).map(format_cell).unwrap_or_default()
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object()) => {
            arr.iter().map(format_scalar).collect::<Vec<_>>().join(", ")
        }
        Value::Array(arr) => format!("[{} rows]", arr.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        _ => format_scalar(value),
    }
}
