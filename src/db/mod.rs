//! Backend abstraction for cqlpipe.
//!
//! Provides a trait-based interface for running statements, so the native
//! protocol client and the in-memory mock can be used interchangeably.

mod frame;
mod mock;
mod native;
mod types;

pub use mock::MockBackend;
pub use native::NativeBackend;
pub use types::{ColumnSpec, ColumnType, ColumnValue, Consistency, ResultSet, Row};

use crate::config::ConnectionConfig;
use crate::error::{CqlError, QueryError, Result};
use async_trait::async_trait;
use tracing::{info, warn};

/// Trait defining the interface for query backends.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Executes one statement and returns its decoded result.
    async fn execute(
        &self,
        statement: &str,
        consistency: Consistency,
    ) -> std::result::Result<ResultSet, QueryError>;

    /// Closes the connection.
    async fn close(&self) -> Result<()>;
}

/// Connects to the first reachable contact point.
///
/// Contact points are tried in order. Failing all of them is a setup error.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn Backend>> {
    let mut failures = Vec::new();

    for addr in config.contact_points()? {
        match NativeBackend::connect(&addr).await {
            Ok(backend) => {
                info!("Connected to {}", addr);
                return Ok(Box::new(backend));
            }
            Err(e) => {
                warn!("Could not connect to {}: {}", addr, e);
                failures.push(format!("{addr}: {e}"));
            }
        }
    }

    Err(CqlError::setup(format!(
        "no contact point reachable ({})",
        failures.join("; ")
    )))
}

/// Switches the session to `keyspace`.
///
/// Used right after connecting; any failure is a setup error.
pub async fn use_keyspace(backend: &dyn Backend, keyspace: &str) -> Result<()> {
    let statement = format!("USE {keyspace}");
    backend
        .execute(&statement, Consistency::Any)
        .await
        .map(|_| ())
        .map_err(|e| CqlError::setup(format!("{statement} failed: {e}")))
}
