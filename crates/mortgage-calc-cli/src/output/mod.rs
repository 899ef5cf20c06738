pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use colored::Colorize;
use serde_json::Value;

use crate::OutputFormat;

/// Write a command result to stdout in the requested format.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Failures go to stderr whatever the output format, so piped CSV or JSON
/// stays parseable.
pub fn print_error(e: &dyn std::error::Error) {
    tracing::error!(error = %e, "command failed");
    eprintln!("{}: {}", "error".red().bold(), e);
}
