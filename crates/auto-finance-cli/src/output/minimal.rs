use serde_json::{Map, Value};

use super::{format_scalar, primary_rows, result_object};

/// Key answer fields, checked in order.
const PRIORITY_KEYS: [&str; 8] = [
    "apr",
    "score",
    "lower_cost_path",
    "excess_fees",
    "financial_health",
    "breakeven_month",
    "total_interest",
    "monthly_payment",
];

/// Print just the key answer from the output.
///
/// Quotes print one `term: monthly_payment` line per option; other results
/// print the first non-null priority field, then fall back to the first
/// field in the result.
pub fn print_minimal(value: &Value) {
    let Some(result) = result_object(value) else {
        println!("{}", format_scalar(value));
        return;
    };

    if let Some(("options", rows)) = primary_rows(result) {
        for row in rows.iter().filter_map(Value::as_object) {
            println!("{}", quote_line(row));
        }
        return;
    }

    let answer = PRIORITY_KEYS
        .iter()
        .filter_map(|key| result.get(*key))
        .find(|val| !val.is_null());
    match answer {
        Some(val) => println!("{}", format_scalar(val)),
        None => {
            if let Some((key, val)) = result.iter().next() {
                println!("{}: {}", key, format_scalar(val));
            }
        }
    }
}

fn quote_line(row: &Map<String, Value>) -> String {
    let field = |key: &str| row.get(key).map(format_scalar).unwrap_or_default();
    format!("{}: {}", field("term_months"), field("monthly_payment"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quote_line() {
        let row = json!({ "term_months": 48, "monthly_payment": "627.93" });
        assert_eq!(quote_line(row.as_object().unwrap()), "48: 627.93");
    }
}
