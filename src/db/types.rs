//! Decoded result types for cqlpipe.
//!
//! These are what a backend hands to the renderer. Nothing here knows about
//! the wire format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one successfully executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// The statement produced no result body (INSERT, UPDATE, ...).
    Void,

    /// A row grid with its column metadata.
    Rows {
        metadata: Vec<ColumnSpec>,
        rows: Vec<Row>,
    },

    /// A `USE` statement switched keyspace.
    SetKeyspace { name: String },

    /// A DDL statement changed the schema.
    SchemaChange {
        change: String,
        keyspace: String,
        table: String,
    },
}

impl ResultSet {
    /// Creates a rows result.
    pub fn rows(metadata: Vec<ColumnSpec>, rows: Vec<Row>) -> Self {
        Self::Rows { metadata, rows }
    }

    /// Creates a set-keyspace result.
    pub fn set_keyspace(name: impl Into<String>) -> Self {
        Self::SetKeyspace { name: name.into() }
    }

    /// Creates a schema-change result.
    pub fn schema_change(
        change: impl Into<String>,
        keyspace: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self::SchemaChange {
            change: change.into(),
            keyspace: keyspace.into(),
            table: table.into(),
        }
    }
}

/// Name and declared type of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSpec {
    /// Creates a new column spec.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Column types the renderer distinguishes.
///
/// Anything not listed is `Other`, which renders as hex. The payload is the
/// native protocol type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Text,
    Varchar,
    Other(u16),
}

/// A row of values, one per column.
pub type Row = Vec<ColumnValue>;

/// A single decoded cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnValue {
    /// Absent value.
    #[default]
    Null,

    /// 32-bit signed integer.
    Int(i32),

    /// Text value. An empty string is present, not null.
    Text(String),

    /// Raw bytes for types without a dedicated rendering.
    Bytes(Vec<u8>),
}

impl ColumnValue {
    /// Returns the byte representation of a present value.
    pub fn raw_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Null => None,
            Self::Int(i) => Some(i.to_be_bytes().to_vec()),
            Self::Text(s) => Some(s.as_bytes().to_vec()),
            Self::Bytes(b) => Some(b.clone()),
        }
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl<T> From<Option<T>> for ColumnValue
where
    T: Into<ColumnValue>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Self::Null,
        }
    }
}

/// Consistency level sent with each query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    Any,
    #[default]
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    LocalOne,
}

impl Consistency {
    /// Returns the native protocol code for this level.
    pub fn code(&self) -> u16 {
        match self {
            Self::Any => 0x0000,
            Self::One => 0x0001,
            Self::Two => 0x0002,
            Self::Three => 0x0003,
            Self::Quorum => 0x0004,
            Self::All => 0x0005,
            Self::LocalQuorum => 0x0006,
            Self::EachQuorum => 0x0007,
            Self::LocalOne => 0x000A,
        }
    }

    /// Returns the level as written in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::One => "one",
            Self::Two => "two",
            Self::Three => "three",
            Self::Quorum => "quorum",
            Self::All => "all",
            Self::LocalQuorum => "local_quorum",
            Self::EachQuorum => "each_quorum",
            Self::LocalOne => "local_one",
        }
    }
}

impl std::str::FromStr for Consistency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "any" => Ok(Self::Any),
            "one" => Ok(Self::One),
            "two" => Ok(Self::Two),
            "three" => Ok(Self::Three),
            "quorum" => Ok(Self::Quorum),
            "all" => Ok(Self::All),
            "local_quorum" => Ok(Self::LocalQuorum),
            "each_quorum" => Ok(Self::EachQuorum),
            "local_one" => Ok(Self::LocalOne),
            _ => Err(format!("Invalid consistency level: {s}")),
        }
    }
}

impl fmt::Display for Consistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
