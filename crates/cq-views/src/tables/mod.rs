//! Result table shaping

use std::fmt;
use serde::Serialize;
use tracing::debug;

use cq_core::config::PAGE_SIZE;
use cq_core::{Row, Value};
use crate::format::{format_count, format_elapsed_ms};

/// Configuration for result tables
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub max_rows_displayed: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_rows_displayed: PAGE_SIZE,
        }
    }
}

/// A rendered cell. `Null` is the marker for a database null and never
/// equals any text, including `"NULL"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayCell {
    Null,
    Text(String),
}

impl DisplayCell {
    pub fn is_null(&self) -> bool {
        matches!(self, DisplayCell::Null)
    }
}

impl From<&Value> for DisplayCell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => DisplayCell::Null,
            other => DisplayCell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for DisplayCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayCell::Null => f.write_str("NULL"),
            DisplayCell::Text(s) => f.write_str(s),
        }
    }
}

/// Bounded, render-ready projection of a query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayResult {
    pub columns: Vec<String>,
    /// Cells in `columns` order
    pub rows: Vec<Vec<DisplayCell>>,
    pub total_count: usize,
    pub displayed_count: usize,
    pub elapsed_ms: f64,
    pub summary: String,
}

impl DisplayResult {
    pub fn is_truncated(&self) -> bool {
        self.displayed_count < self.total_count
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Turns engine rows into a [`DisplayResult`]
#[derive(Debug, Clone, Default)]
pub struct ResultShaper {
    pub config: TableConfig,
}

impl ResultShaper {
    pub fn new(max_rows_displayed: usize) -> Self {
        Self {
            config: TableConfig { max_rows_displayed },
        }
    }

    /// Keep the first page of `rows`, recording the true total
    pub fn shape(&self, rows: &[Row], elapsed_ms: f64) -> DisplayResult {
        let total_count = rows.len();

        let columns: Vec<String> = match rows.first() {
            Some(first) => first.keys().cloned().collect(),
            None => Vec::new(),
        };

        let shown = &rows[..total_count.min(self.config.max_rows_displayed)];
        let display_rows: Vec<Vec<DisplayCell>> = shown
            .iter()
            .map(|row| {
                columns.iter()
                    .map(|col| row.get(col).map(DisplayCell::from).unwrap_or(DisplayCell::Null))
                    .collect()
            })
            .collect();

        let displayed_count = display_rows.len();
        let summary = if displayed_count < total_count {
            format!(
                "{} of {} rows | {}",
                format_count(displayed_count),
                format_count(total_count),
                format_elapsed_ms(elapsed_ms)
            )
        } else {
            format!("{} rows | {}", format_count(total_count), format_elapsed_ms(elapsed_ms))
        };

        debug!("Shaped {} of {} rows", displayed_count, total_count);

        DisplayResult {
            columns,
            rows: display_rows,
            total_count,
            displayed_count,
            elapsed_ms,
            summary,
        }
    }
}
