//! Result rendering.
//!
//! Rows results become an ASCII table:
//!
//! ```text
//! +----+-------+
//! | id | name  |
//! +----+-------+
//! | 1  | alice |
//! | 2  | NULL  |
//! +----+-------+
//! Query returned 2 rows
//! ```
//!
//! Column widths are the widest of the header and every formatted cell, so
//! all cells are formatted before the first line is written.

use super::format::format_column;
use crate::db::{ColumnSpec, ResultSet, Row};
use std::io::{self, Write};
use thiserror::Error;

/// Errors that can occur while rendering a result.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The output sink failed.
    #[error("failed to write result: {0}")]
    Io(#[from] io::Error),

    /// A row does not have one value per column.
    #[error("row {row} has {actual} values but the result has {expected} columns")]
    RowShape {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Writes one result to `out`.
///
/// A malformed rows result is rejected before anything is written.
pub fn render<W: Write>(result: &ResultSet, out: &mut W) -> Result<(), RenderError> {
    match result {
        ResultSet::Void => {}
        ResultSet::Rows { metadata, rows } => {
            if !rows.is_empty() {
                let table = TableFormatter::new(metadata, rows)?;
                table.write_to(out)?;
            }
            writeln!(out, "Query returned {} rows", rows.len())?;
        }
        ResultSet::SetKeyspace { name } => {
            writeln!(out, "Set keyspace to {name}")?;
        }
        ResultSet::SchemaChange {
            change,
            keyspace,
            table,
        } => {
            writeln!(out, "Schema change: {change} on {keyspace}.{table}")?;
        }
    }
    Ok(())
}

/// Renders a result into a string.
pub fn render_to_string(result: &ResultSet) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    render(result, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// A fully formatted table, ready to print.
struct TableFormatter<'a> {
    headers: Vec<&'a str>,
    widths: Vec<usize>,
    cells: Vec<Vec<String>>,
}

impl<'a> TableFormatter<'a> {
    /// Formats every cell and computes the final column widths.
    fn new(metadata: &'a [ColumnSpec], rows: &[Row]) -> Result<Self, RenderError> {
        let headers: Vec<&str> = metadata.iter().map(|c| c.name.as_str()).collect();
        let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
        let mut cells = Vec::with_capacity(rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != metadata.len() {
                return Err(RenderError::RowShape {
                    row: row_index,
                    expected: metadata.len(),
                    actual: row.len(),
                });
            }

            let formatted: Vec<String> = row
                .iter()
                .zip(metadata)
                .map(|(value, column)| format_column(value, column.column_type))
                .collect();

            for (width, cell) in widths.iter_mut().zip(&formatted) {
                *width = (*width).max(display_width(cell));
            }
            cells.push(formatted);
        }

        Ok(Self {
            headers,
            widths,
            cells,
        })
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_separator(out)?;
        self.write_line(out, &self.headers)?;
        self.write_separator(out)?;
        for row in &self.cells {
            self.write_line(out, row)?;
        }
        self.write_separator(out)
    }

    fn write_separator<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut line = String::new();
        for &width in &self.widths {
            line.push('+');
            line.push_str(&"-".repeat(width + 2));
        }
        line.push('+');
        writeln!(out, "{line}")
    }

    fn write_line<W: Write, S: AsRef<str>>(&self, out: &mut W, values: &[S]) -> io::Result<()> {
        let mut line = String::new();
        for (value, &width) in values.iter().zip(&self.widths) {
            let value = value.as_ref();
            line.push_str("| ");
            line.push_str(value);
            line.push_str(&" ".repeat(width + 1 - display_width(value)));
        }
        line.push('|');
        writeln!(out, "{line}")
    }
}

/// Width of a cell in characters.
fn display_width(s: &str) -> usize {
    s.chars().count()
}
