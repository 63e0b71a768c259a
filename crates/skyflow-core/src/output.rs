//! Structured output pipeline.
//!
//! Serializes heterogeneous record sequences into one of four formats. The
//! format is chosen once per invocation; rendering is a pure function of the
//! record sequence and the format, with no terminal styling, so every format
//! is safe to pipe.

use crate::error::{DomainError, ErrorKind};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One output row: field name → loosely-typed value, in insertion order.
/// Field sets may vary across records in one collection.
pub type Record = serde_json::Map<String, Value>;

/// Closed set of output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            OutputFormat::Table => "table",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        };
        f.write_str(token)
    }
}

impl FromStr for OutputFormat {
    type Err = DomainError;

    /// An unrecognized token fails eagerly, before any record is consumed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "jsonl" => Ok(OutputFormat::Jsonl),
            other => Err(DomainError::new(
                ErrorKind::Configuration,
                "parse-output-format",
                format!("unknown output format '{other}' (expected table, csv, json or jsonl)"),
            )),
        }
    }
}

/// Render `records` in `format`. `empty_message` is emitted instead of a
/// zero-row table grid. No trailing newline; the caller prints the result.
pub fn render(records: &[Record], format: OutputFormat, empty_message: &str) -> String {
    match format {
        OutputFormat::Table => render_table(records, empty_message),
        OutputFormat::Csv => render_csv(records),
        OutputFormat::Json => render_json(records),
        OutputFormat::Jsonl => render_jsonl(records),
    }
}

/// Union of field names across all records, in first-encounter order.
fn columns(records: &[Record]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !seen.iter().any(|s| s == key) {
                seen.push(key.clone());
            }
        }
    }
    seen
}

/// Cell text for a loosely-typed value: strings render bare, null and missing
/// fields render empty, everything else falls back to its compact JSON form.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Pretty-printed JSON array, 2-space indentation. Requires the full record
/// sequence up front; this format is not streamable.
fn render_json(records: &[Record]) -> String {
    serde_json::to_string_pretty(records).expect("JSON maps always serialize")
}

/// One compact JSON object per line; zero records yield zero lines.
fn render_jsonl(records: &[Record]) -> String {
    records
        .iter()
        .map(|record| serde_json::to_string(record).expect("JSON maps always serialize"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_csv(records: &[Record]) -> String {
    let header = columns(records);
    if header.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        header
            .iter()
            .map(|name| csv_field(name))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        lines.push(
            header
                .iter()
                .map(|key| csv_field(&cell(record.get(key))))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Quote a CSV field: embedded quotes doubled, fields containing a comma,
/// quote or newline wrapped in quotes. Empty fields (including padding for
/// missing columns) render as `""`.
fn csv_field(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn render_table(records: &[Record], empty_message: &str) -> String {
    if records.is_empty() {
        return empty_message.to_string();
    }

    let header = columns(records);
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| header.iter().map(|key| cell(record.get(key))).collect())
        .collect();

    let labels: Vec<String> = header.iter().map(|h| h.to_ascii_uppercase()).collect();
    let widths: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain([label.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(grid_row(&labels, &widths));
    lines.push("─".repeat(total));
    for row in &rows {
        lines.push(grid_row(row, &widths));
    }
    lines.join("\n")
}

fn grid_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(text, width)| format!("{text:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
