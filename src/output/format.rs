//! Cell formatting.

use crate::db::{ColumnType, ColumnValue};

/// Text shown for an absent value, whatever the column type.
pub const NULL_MARKER: &str = "NULL";

/// Formats one cell according to its declared column type.
///
/// Integers print in decimal and text prints verbatim. Every other
/// combination falls back to `0x` followed by the lowercase hex of the raw
/// bytes, so a zero-length value renders as just `0x`.
pub fn format_column(value: &ColumnValue, column_type: ColumnType) -> String {
    match (column_type, value) {
        (_, ColumnValue::Null) => NULL_MARKER.to_string(),
        (ColumnType::Int, ColumnValue::Int(i)) => i.to_string(),
        (ColumnType::Text | ColumnType::Varchar, ColumnValue::Text(s)) => s.clone(),
        _ => hex_literal(&value.raw_bytes().unwrap_or_default()),
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
