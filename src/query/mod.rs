//! Statement splitting and execution for cqlpipe.
//!
//! The splitter and the executor know nothing about each other; `stream`
//! wires them together for one input source.

pub mod executor;
pub mod splitter;
pub mod stream;

pub use executor::{QueryExecutor, StatementOutcome};
pub use splitter::{split_all, StatementSplitter, TrailingPolicy};
pub use stream::{run_interactive, run_piped, RunSummary};
