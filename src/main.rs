//! cqlpipe - run semicolon-terminated CQL statements and print result tables.

mod cli;

use cli::Cli;
use cqlpipe::config::{Config, ConnectionConfig};
use cqlpipe::db::{self, Backend, MockBackend};
use cqlpipe::error::{CqlError, Result};
use cqlpipe::logging;
use cqlpipe::query::{self, QueryExecutor};
use std::io::IsTerminal;
use tokio::io::BufReader;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = resolve_connection(&cli, &config)?;
    let mut input = config.input.clone();
    cli.apply_input_overrides(&mut input);
    input.validate()?;

    let backend: Box<dyn Backend> = if cli.mock {
        info!("Using mock backend");
        Box::new(MockBackend::new())
    } else {
        info!("Connecting to {}", connection.display_string());
        db::connect(&connection).await?
    };

    if let Some(keyspace) = &connection.keyspace {
        db::use_keyspace(backend.as_ref(), keyspace).await?;
    }

    let executor = QueryExecutor::new(backend, connection.consistency());
    let mut out = std::io::stdout();
    let mut err = std::io::stderr();

    let summary = if std::io::stdin().is_terminal() {
        let stdin = BufReader::new(tokio::io::stdin());
        query::run_interactive(&executor, stdin, &input, &mut out, &mut err).await?
    } else {
        query::run_piped(&executor, tokio::io::stdin(), &input, &mut out, &mut err).await?
    };

    info!(
        "Executed {} statements, {} failed",
        summary.executed, summary.failed
    );
    executor.close().await
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
///
/// Precedence: CLI arguments, then the named (or default) connection from
/// the config file, then environment variables.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<ConnectionConfig> {
    let mut connection = match cli.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            CqlError::config(format!("Connection '{}' not found in config file", name))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    connection.merge(&cli.to_connection_config()?);
    connection.apply_env_defaults();

    // Fail on a bad host list before any connection attempt.
    connection.contact_points()?;

    Ok(connection)
}
