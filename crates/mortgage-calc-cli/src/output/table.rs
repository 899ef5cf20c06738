use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    print!("{}", render_table(value));
}

/// Render any command output as text tables.
///
/// Envelope outputs (`result` + `warnings` + `methodology`) show scalar
/// result fields as a Field/Value table and every list of rows (schedules,
/// yearly breakdowns) as its own table underneath.
pub fn render_table(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                render_result(&mut out, result, map);
            } else {
                render_object(&mut out, map);
            }
        }
        Value::Array(arr) => render_array(&mut out, arr),
        _ => out.push_str(&format!("{}\n", format_value(value))),
    }
    out
}

fn render_result(out: &mut String, result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => render_object(out, res_map),
        Value::Array(arr) => render_array(out, arr),
        other => out.push_str(&format!("{}\n", format_value(other))),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings {
                if let Value::String(s) = w {
                    out.push_str(&format!("  - {}\n", s));
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\nMethodology: {}\n", meth));
    }
}

fn render_object(out: &mut String, map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut row_lists = Vec::new();

    for (key, val) in map {
        match val {
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                row_lists.push((key, items));
            }
            _ => builder.push_record([key.as_str(), &format_value(val)]),
        }
    }

    out.push_str(&format!("{}\n", Table::from(builder)));
    for (key, items) in row_lists {
        out.push_str(&format!("\n{}:\n", key));
        render_array(out, items);
    }
}

fn render_array(out: &mut String, arr: &[Value]) {
    if arr.is_empty() {
        out.push_str("(empty)\n");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        out.push_str(&format!("{}\n", Table::from(builder)));
    } else {
        for item in arr {
            out.push_str(&format!("{}\n", format_value(item)));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
