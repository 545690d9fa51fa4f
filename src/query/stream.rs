//! Input driver.
//!
//! Feeds input through a `StatementSplitter` and executes each completed
//! statement before reading further, so statements run strictly in order.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt};
use tracing::debug;

use super::executor::{QueryExecutor, StatementOutcome};
use super::splitter::StatementSplitter;
use crate::config::InputConfig;
use crate::error::Result;

/// Prompt shown when no statement is pending.
pub const PROMPT: &str = "cql> ";

/// Prompt shown while a statement is waiting for its `;`.
pub const CONTINUATION_PROMPT: &str = "  ...> ";

/// Counts of statements run during one input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: StatementOutcome) {
        self.executed += 1;
        if outcome == StatementOutcome::Failed {
            self.failed += 1;
        }
    }
}

fn splitter_for(options: &InputConfig) -> StatementSplitter {
    StatementSplitter::new()
        .with_trailing_policy(options.trailing_policy())
        .with_quote_awareness(options.quote_aware)
}

/// True for statements with nothing but whitespace before the terminator.
fn is_blank(statement: &str) -> bool {
    statement.trim().trim_end_matches(';').trim().is_empty()
}

async fn execute_all<W: Write, E: Write>(
    executor: &QueryExecutor,
    statements: Vec<String>,
    summary: &mut RunSummary,
    out: &mut W,
    err: &mut E,
) -> Result<()> {
    for statement in statements {
        if is_blank(&statement) {
            debug!("Skipping empty statement");
            continue;
        }
        let outcome = executor.run(&statement, out, err).await?;
        summary.record(outcome);
    }
    Ok(())
}

/// Runs every statement read from a non-interactive source.
///
/// Input is read `options.chunk_size` bytes at a time until a zero-length
/// read.
pub async fn run_piped<R, W, E>(
    executor: &QueryExecutor,
    mut input: R,
    options: &InputConfig,
    out: &mut W,
    err: &mut E,
) -> Result<RunSummary>
where
    R: AsyncRead + Unpin,
    W: Write,
    E: Write,
{
    options.validate()?;
    let mut splitter = splitter_for(options);
    let mut summary = RunSummary::default();
    let mut chunk = vec![0u8; options.chunk_size];

    loop {
        let read = input.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        let statements = splitter.feed(&chunk[..read]);
        execute_all(executor, statements, &mut summary, out, err).await?;
    }

    let trailing: Vec<String> = splitter.finish().into_iter().collect();
    execute_all(executor, trailing, &mut summary, out, err).await?;

    Ok(summary)
}

/// Runs statements typed at a terminal, one line at a time.
///
/// The prompt is written to `out` before each line is read.
pub async fn run_interactive<R, W, E>(
    executor: &QueryExecutor,
    mut input: R,
    options: &InputConfig,
    out: &mut W,
    err: &mut E,
) -> Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    E: Write,
{
    let mut splitter = splitter_for(options);
    let mut summary = RunSummary::default();
    let mut line = String::new();

    loop {
        let prompt = if splitter.has_pending() {
            CONTINUATION_PROMPT
        } else {
            PROMPT
        };
        write!(out, "{prompt}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            writeln!(out)?;
            break;
        }

        let statements = splitter.feed(line.as_bytes());
        execute_all(executor, statements, &mut summary, out, err).await?;
    }

    let trailing: Vec<String> = splitter.finish().into_iter().collect();
    execute_all(executor, trailing, &mut summary, out, err).await?;

    Ok(summary)
}
