use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// A result carrying a list of rows (a schedule, a yearly breakdown) is
/// written as that list; other results become two-column field/value CSV.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

pub fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    match value {
        Value::Object(map) => {
            let body = match map.get("result") {
                Some(result) => result,
                None => value,
            };
            match body {
                Value::Object(fields) => {
                    if let Some(rows) = fields.values().find_map(row_list) {
                        write_array_csv(wtr, rows);
                    } else {
                        let _ = wtr.write_record(["field", "value"]);
                        for (key, val) in fields {
                            let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                        }
                    }
                }
                Value::Array(arr) => write_array_csv(wtr, arr),
                other => {
                    let _ = wtr.write_record([&format_csv_value(other)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }
}

fn row_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) if items.first().is_some_and(Value::is_object) => Some(items),
        _ => None,
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    // Extract headers from first object
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_csv(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_schedule_rows_preferred() {
        let text = to_csv(&json!({
            "result": {
                "scenario_id": 1,
                "entries": [{"month_number": 1, "interest_portion": "500.00"}]
            }
        }));
        // serde_json maps iterate in key order
        assert_eq!(text, "interest_portion,month_number\n500.00,1\n");
    }

    #[test]
    fn test_scalar_result_is_field_value() {
        let text = to_csv(&json!({"result": {"months_saved": 42}}));
        assert_eq!(text, "field,value\nmonths_saved,42\n");
    }
}
