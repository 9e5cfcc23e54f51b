use time::macros::format_description;
use trackiton_core::UtcDateTime;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

/// Column-aligned text view of a command result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub footer: Vec<String>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    pub fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn footer(mut self, line: impl Into<String>) -> Self {
        self.footer.push(line.into());
        self
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if !self.headers.is_empty() {
            let widths = self.column_widths();
            let header: Vec<String> = self.headers.iter().map(|h| (*h).to_owned()).collect();
            lines.push(format_row(&header, &widths));
            lines.push(
                widths
                    .iter()
                    .map(|width| "-".repeat(*width))
                    .collect::<Vec<_>>()
                    .join("  "),
            );
            for row in &self.rows {
                lines.push(format_row(row, &widths));
            }
        }

        if !self.footer.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(self.footer.iter().cloned());
        }

        lines
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|header| header.len()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(index) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            println!("{payload}");
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
        }
        OutputFormat::Table => {
            for line in result.table.lines() {
                println!("{line}");
            }
            if !result.warnings.is_empty() {
                println!("warnings:");
                for warning in &result.warnings {
                    println!("  - {warning}");
                }
            }
        }
    }

    Ok(())
}

/// `2024-01-10 21:00 UTC`
pub fn format_instant(instant: UtcDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    instant
        .into_inner()
        .format(&format)
        .unwrap_or_else(|_| instant.format_rfc3339())
}

pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}

pub fn format_change(change: f64, change_percent: f64) -> String {
    format!("{change:+.2} ({change_percent:+.2}%)")
}
