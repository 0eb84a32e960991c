use serde_json::{Map, Value};
use std::io;

use super::{format_scalar, primary_rows, result_object};

/// Write output as CSV to stdout.
///
/// Results with a row set (term options, monthly points) are written one
/// row per entry; anything else becomes two-column `field,value` CSV.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result_object(value) {
        Some(result) => match primary_rows(result) {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => write_fields(&mut wtr, result),
        },
        None => match value {
            Value::Object(map) => write_fields(&mut wtr, map),
            other => {
                let _ = wtr.write_record([format_scalar(other)]);
            }
        },
    }

    let _ = wtr.flush();
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    let _ = wtr.write_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_scalar).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        let result = result_object(value).unwrap();
        match primary_rows(result) {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => write_fields(&mut wtr, result),
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_options_written_as_rows() {
        let value = json!({
            "result": {
                "apr": "0.055",
                "options": [
                    { "term_months": 36, "monthly_payment": "815.27" },
                    { "term_months": 48, "monthly_payment": "627.93" }
                ]
            }
        });
        let csv = render(&value);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("term_months,monthly_payment"));
        assert_eq!(lines.next(), Some("36,815.27"));
        assert_eq!(lines.next(), Some("48,627.93"));
    }

    #[test]
    fn test_scalar_result_written_as_fields() {
        let value = json!({ "result": { "score": 78, "rating": "Good Fit" } });
        let csv = render(&value);
        assert!(csv.starts_with("field,value\n"));
        assert!(csv.contains("rating,Good Fit"));
    }
}
