//! Table rendering and export helpers shared by the commands.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Renders a box-drawn table with left-aligned cells.
///
/// Column widths follow the widest cell, header included.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = rule(&widths, "┌", "┬", "┐");
    out.push_str(&table_line(&widths, headers.iter().copied()));
    out.push_str(&rule(&widths, "├", "┼", "┤"));
    for row in rows {
        out.push_str(&table_line(&widths, row.iter().map(String::as_str)));
    }
    out.push_str(&rule(&widths, "└", "┴", "┘"));
    out
}

fn rule(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{}{}{}\n", left, segments.join(mid), right)
}

fn table_line<'a>(widths: &[usize], mut cells: impl Iterator<Item = &'a str>) -> String {
    let padded: Vec<String> = widths
        .iter()
        .map(|&w| format!(" {:<w$} ", cells.next().unwrap_or(""), w = w))
        .collect();
    format!("│{}│\n", padded.join("│"))
}

/// Writes `records` as CSV with a header row.
pub fn write_csv<W: Write, R: Serialize>(writer: W, records: &[R]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes `records` as CSV to `path`, creating parent directories.
pub fn write_csv_file<R: Serialize>(path: &Path, records: &[R]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(File::create(path)?, records)
}

/// Pretty-prints `value` as JSON to `path`, or stdout when `path` is `None`.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, text + "\n")?;
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Formats a relative error in scientific notation.
pub fn format_error(value: f64) -> String {
    format!("{:.3e}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Record {
        name: &'static str,
        value: f64,
    }

    #[test]
    fn test_render_table_layout() {
        let table = render_table(
            &["Method", "Error"],
            &[
                vec!["Fast".to_string(), "1.0e-3".to_string()],
                vec!["Two-pass".to_string(), "0".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "┌──────────┬────────┐");
        assert_eq!(lines[1], "│ Method   │ Error  │");
        assert_eq!(lines[3], "│ Fast     │ 1.0e-3 │");
        assert_eq!(lines[5], "└──────────┴────────┘");
        assert!(lines.iter().all(|l| l.chars().count() == 21));
    }

    #[test]
    fn test_write_csv() {
        let mut buffer = Vec::new();
        write_csv(
            &mut buffer,
            &[
                Record { name: "a", value: 1.5 },
                Record { name: "b", value: 0.25 },
            ],
        )
        .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "name,value\na,1.5\nb,0.25\n");
    }

    #[test]
    fn test_format_error() {
        assert_eq!(format_error(0.00123), "1.230e-3");
        assert_eq!(format_error(0.0), "0.000e0");
    }
}
