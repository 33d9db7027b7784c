//! Command output: aligned text tables or JSON.

use std::io::{self, Write};

use serde::Serialize;

use crate::commands::CliError;

/// Where and how results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON in `--json` mode, otherwise the lines built by
    /// `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is closed or the value cannot be encoded.
    pub fn emit<T, F>(&self, value: &T, text: F) -> Result<(), CliError>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> Vec<String>,
    {
        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        } else {
            for line in text() {
                writeln!(stdout, "{line}")?;
            }
        }
        Ok(())
    }

    /// Print a single status line (text mode) or `{"message": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is closed.
    pub fn message(&self, message: &str) -> Result<(), CliError> {
        self.emit(&serde_json::json!({ "message": message }), || {
            vec![message.to_string()]
        })
    }
}

/// Lay out rows under headers with every column padded to its widest cell.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render(headers.to_vec()));
    lines.extend(
        rows.iter()
            .map(|row| render(row.iter().map(String::as_str).collect())),
    );
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "Elden Ring".to_string(), "$59.99".to_string()],
            vec!["12".to_string(), "Mouse".to_string(), "$19.00".to_string()],
        ];
        let lines = table(&["ID", "NAME", "PRICE"], &rows);

        assert_eq!(
            lines,
            vec![
                "ID  NAME        PRICE",
                "1   Elden Ring  $59.99",
                "12  Mouse       $19.00",
            ]
        );
    }

    #[test]
    fn test_table_without_rows() {
        assert_eq!(table(&["ID", "NAME"], &[]), vec!["ID  NAME"]);
    }
}
