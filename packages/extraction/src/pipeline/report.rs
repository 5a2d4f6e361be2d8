//! Human-readable run summary.

use std::io::{self, Write};

use serde_json::Value;

use crate::types::result::Record;
use crate::use_case::PreviewStyle;

/// Records shown in the preview.
pub const PREVIEW_LIMIT: usize = 3;

/// Print the record count and a preview of the first records.
///
/// `label` is the plural noun used in the headings, e.g. `courses`.
pub fn write_summary<W: Write>(
    out: &mut W,
    records: &[Record],
    label: &str,
    style: PreviewStyle,
) -> io::Result<()> {
    writeln!(out, "\nTotal {label}: {}", records.len())?;
    if records.is_empty() {
        return Ok(());
    }

    writeln!(out, "\nExample {label}:")?;
    let preview = &records[..records.len().min(PREVIEW_LIMIT)];
    match style {
        PreviewStyle::CourseLines => {
            for record in preview {
                writeln!(out, "{}", course_line(record))?;
            }
        }
        PreviewStyle::RawJson => {
            let json = serde_json::to_string_pretty(preview).map_err(io::Error::other)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}

/// `- {name} ({code}) {credits} ECTS [Mandatory]`
pub fn course_line(record: &Record) -> String {
    let mut line = format!(
        "- {} ({}) {} ECTS",
        display_value(record.get("name")),
        display_value(record.get("code")),
        display_value(record.get("credits")),
    );
    if record.get("mandatory").and_then(Value::as_bool) == Some(true) {
        line.push_str(" [Mandatory]");
    }
    line
}

pub fn write_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "Error: {message}")
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "?".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            // 5.0 prints as 5
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Some(other) => other.to_string(),
    }
}
