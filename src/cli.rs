//! Command-line argument parsing for cqlpipe.

use clap::Parser;
use cqlpipe::config::{ConnectionConfig, InputConfig};
use cqlpipe::db::Consistency;
use cqlpipe::error::Result;
use std::path::PathBuf;

/// Run semicolon-terminated CQL statements from stdin and print the results.
#[derive(Parser, Debug)]
#[command(name = "cqlpipe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Keyspace to use after connecting
    #[arg(value_name = "KEYSPACE")]
    pub keyspace: Option<String>,

    /// Contact point; repeat or comma-separate for several (default localhost:9042)
    #[arg(
        short = 'H',
        long = "host",
        value_name = "HOST[:PORT]",
        value_delimiter = ','
    )]
    pub hosts: Vec<String>,

    /// Connection string (e.g., cql://host:9042/keyspace)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Consistency level for every statement (e.g., one, quorum, local_quorum)
    #[arg(long, value_name = "LEVEL")]
    pub consistency: Option<Consistency>,

    /// Bytes read at a time from piped input
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<usize>,

    /// Execute a final statement even if it lacks a terminating ';'
    #[arg(long)]
    pub flush_trailing: bool,

    /// Ignore ';' inside single-quoted string literals
    #[arg(long)]
    pub quote_aware: bool,

    /// Use the in-memory mock backend instead of a cluster
    #[arg(long)]
    pub mock: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Converts CLI arguments to a ConnectionConfig.
    ///
    /// Unset fields stay empty so that the config file can fill them.
    pub fn to_connection_config(&self) -> Result<ConnectionConfig> {
        let mut config = match &self.url {
            Some(url) => ConnectionConfig::from_connection_string(url)?,
            None => ConnectionConfig::default(),
        };

        if !self.hosts.is_empty() {
            config.hosts = self.hosts.clone();
        }
        if self.keyspace.is_some() {
            config.keyspace = self.keyspace.clone();
        }
        if self.consistency.is_some() {
            config.consistency = self.consistency;
        }

        Ok(config)
    }

    /// Applies input flags on top of the configured input options.
    pub fn apply_input_overrides(&self, input: &mut InputConfig) {
        if let Some(chunk_size) = self.chunk_size {
            input.chunk_size = chunk_size;
        }
        if self.flush_trailing {
            input.flush_trailing = true;
        }
        if self.quote_aware {
            input.quote_aware = true;
        }
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(cqlpipe::config::Config::default_path)
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}
