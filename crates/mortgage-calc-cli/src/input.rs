use mortgage_calc_core::LoanTerms;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Loan terms to import, from `path` when given, otherwise from piped stdin.
///
/// Accepts either a single `{principal, apr, term_years}` object or an
/// array of them. Every entry is validated while parsing.
pub fn read_loan_terms(path: Option<&str>) -> Result<Vec<LoanTerms>, Box<dyn std::error::Error>> {
    let value = match path {
        Some(p) => read_json_value(p)?,
        None => read_stdin()?.ok_or("--input <file.json> or piped stdin required for import")?,
    };
    match value {
        Value::Array(_) => from_value(value),
        single => Ok(vec![from_value(single)?]),
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Box<dyn std::error::Error>> {
    serde_json::from_value(value).map_err(|e| format!("Invalid loan terms: {}", e).into())
}

/// Read a JSON file as a generic serde_json::Value.
fn read_json_value(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.is_file() {
        return Err(format!("File not found: {}", p.display()).into());
    }
    let contents = fs::read_to_string(p)
        .map_err(|e| format!("Failed to read '{}': {}", p.display(), e))?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", p.display(), e))?;
    Ok(value)
}

/// Attempt to read JSON from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive).
fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}
