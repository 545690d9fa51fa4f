//! Statement execution.
//!
//! Runs one statement against the backend, renders whatever comes back and
//! reports how long the backend call took. Per-statement failures are
//! printed and never abort the caller.

use std::io::Write;
use std::time::{Duration, Instant};

use crate::db::{Backend, Consistency};
use crate::error::{QueryError, Result};
use crate::output::{self, RenderError};
use tracing::{debug, warn};

/// Runs statements against a backend and prints their results.
pub struct QueryExecutor {
    backend: Box<dyn Backend>,
    consistency: Consistency,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(backend: Box<dyn Backend>, consistency: Consistency) -> Self {
        Self {
            backend,
            consistency,
        }
    }

    /// Executes one statement.
    ///
    /// Results and client errors go to `out`, server errors to `err`, and a
    /// timing line to `out` in every case. Only a failure to write is
    /// returned as an error.
    pub async fn run<W: Write, E: Write>(
        &self,
        statement: &str,
        out: &mut W,
        err: &mut E,
    ) -> Result<StatementOutcome> {
        let start = Instant::now();
        let result = self.backend.execute(statement, self.consistency).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(result_set) => match output::render(&result_set, out) {
                Ok(()) => StatementOutcome::Succeeded,
                Err(RenderError::Io(e)) => return Err(e.into()),
                Err(shape @ RenderError::RowShape { .. }) => {
                    warn!("Backend returned a malformed result: {}", shape);
                    writeln!(out, "{}", QueryError::client(shape.to_string()))?;
                    StatementOutcome::Failed
                }
            },
            Err(e @ QueryError::Server { .. }) => {
                debug!("Statement rejected: {}", e);
                writeln!(err, "{e}")?;
                StatementOutcome::Failed
            }
            Err(e @ QueryError::Client(_)) => {
                debug!("Statement failed: {}", e);
                writeln!(out, "{e}")?;
                StatementOutcome::Failed
            }
        };

        write_timing(out, elapsed)?;
        Ok(outcome)
    }

    /// Closes the backend connection.
    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }
}

/// Whether a statement produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementOutcome {
    Succeeded,
    Failed,
}

fn write_timing<W: Write>(out: &mut W, elapsed: Duration) -> std::io::Result<()> {
    writeln!(out, "Query executed in {:.2} secs", elapsed.as_secs_f64())?;
    writeln!(out)?;
    out.flush()
}
