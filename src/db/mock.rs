//! Mock backend for testing.
//!
//! Provides an in-memory backend for tests and `--mock` runs. Responses can
//! be scripted per statement; anything unscripted gets a canned answer based
//! on the leading keyword.

use super::{Backend, ColumnSpec, ColumnType, ColumnValue, Consistency, ResultSet};
use crate::error::{QueryError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

type MockResponse = std::result::Result<ResultSet, QueryError>;

/// A mock backend that returns predefined results.
#[derive(Default)]
pub struct MockBackend {
    scripted: HashMap<String, MockResponse>,
    executed: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Creates a new mock backend with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for a statement.
    ///
    /// Matching ignores surrounding whitespace and the terminating `;`.
    pub fn with_response(mut self, statement: &str, response: MockResponse) -> Self {
        self.scripted.insert(normalize(statement).to_string(), response);
        self
    }

    /// Returns the statements executed so far, normalized, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|executed| executed.clone())
            .unwrap_or_default()
    }

    fn canned_response(statement: &str) -> ResultSet {
        let words: Vec<&str> = statement.split_whitespace().collect();
        let keyword = words.first().map(|w| w.to_uppercase()).unwrap_or_default();

        match keyword.as_str() {
            "SELECT" => ResultSet::rows(
                vec![ColumnSpec::new("result", ColumnType::Text)],
                vec![vec![ColumnValue::Text(format!(
                    "Mock result for: {statement}"
                ))]],
            ),
            "USE" => ResultSet::set_keyspace(words.get(1).copied().unwrap_or_default()),
            "CREATE" | "ALTER" | "DROP" => {
                let change = match keyword.as_str() {
                    "CREATE" => "CREATED",
                    "ALTER" => "UPDATED",
                    _ => "DROPPED",
                };
                let target = words
                    .iter()
                    .skip(2)
                    .find(|w| !matches!(w.to_uppercase().as_str(), "IF" | "NOT" | "EXISTS"))
                    .map(|w| w.trim_end_matches('('))
                    .unwrap_or_default();
                let (keyspace, table) = target.split_once('.').unwrap_or(("mock", target));
                ResultSet::schema_change(change, keyspace, table)
            }
            _ => ResultSet::Void,
        }
    }
}

/// Strips whitespace and the statement terminator.
fn normalize(statement: &str) -> &str {
    statement.trim().trim_end_matches(';').trim_end()
}

#[async_trait]
impl Backend for MockBackend {
    async fn execute(&self, statement: &str, _consistency: Consistency) -> MockResponse {
        let statement = normalize(statement);
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(statement.to_string());
        }

        match self.scripted.get(statement) {
            Some(response) => response.clone(),
            None => Ok(Self::canned_response(statement)),
        }
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
