//! Command output: tables for people, JSON for scripts.
//!
//! In JSON mode stdout carries only the document; status lines go to stderr.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use datasync_core::error::AppError;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Renders rows in `format`. `empty` is the table-mode text when there are no rows.
pub fn render_list<T: Serialize + Tabled>(
    rows: &[T],
    format: OutputFormat,
    empty: &str,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Table if rows.is_empty() => Ok(empty.to_string()),
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            Ok(table.to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
    }
}

/// Prints rows to stdout.
pub fn print_list<T: Serialize + Tabled>(
    rows: &[T],
    format: OutputFormat,
    empty: &str,
) -> Result<(), AppError> {
    println!("{}", render_list(rows, format, empty)?);
    Ok(())
}

/// Print a success message
pub fn print_success(msg: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("✓ {msg}"),
        OutputFormat::Json => eprintln!("✓ {msg}"),
    }
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Tabled)]
    struct Row {
        plugin: String,
        records: u64,
    }

    fn rows() -> Vec<Row> {
        vec![Row {
            plugin: "reader.streamreader".to_string(),
            records: 5,
        }]
    }

    #[test]
    fn test_json_is_an_array_of_rows() {
        let rendered = render_list(&rows(), OutputFormat::Json, "none").unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "plugin": "reader.streamreader", "records": 5 }])
        );
    }

    #[test]
    fn test_table_has_headers_and_values() {
        let rendered = render_list(&rows(), OutputFormat::Table, "none").unwrap();
        assert!(rendered.contains("plugin"));
        assert!(rendered.contains("reader.streamreader"));
    }

    #[test]
    fn test_empty_table_uses_placeholder() {
        let rendered =
            render_list::<Row>(&[], OutputFormat::Table, "No plugins declared").unwrap();
        assert_eq!(rendered, "No plugins declared");

        let rendered = render_list::<Row>(&[], OutputFormat::Json, "ignored").unwrap();
        assert_eq!(rendered, "[]");
    }
}
