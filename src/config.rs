//! Configuration management for cqlpipe.
//!
//! Handles loading configuration from TOML files and environment variables,
//! with support for named cluster connections and input-splitting options.

use crate::db::Consistency;
use crate::error::{CqlError, Result};
use crate::query::TrailingPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Default native protocol port.
pub const DEFAULT_PORT: u16 = 9042;

/// Contact point used when nothing else is configured.
pub const DEFAULT_HOST: &str = "localhost:9042";

/// Default read size for piped input.
///
/// One byte short of a power of two, the size the original client used.
pub const DEFAULT_CHUNK_SIZE: usize = 1023;

/// Main configuration structure for cqlpipe.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// How statements are read from input.
    #[serde(default)]
    pub input: InputConfig,

    /// Named cluster connections.
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Input splitting options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Bytes requested per read of piped input.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Execute a trailing statement that has no terminating semicolon.
    #[serde(default)]
    pub flush_trailing: bool,

    /// Ignore semicolons inside single-quoted literals.
    #[serde(default)]
    pub quote_aware: bool,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            flush_trailing: false,
            quote_aware: false,
        }
    }
}

impl InputConfig {
    /// Checks that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(CqlError::config("chunk_size must be at least 1"));
        }
        Ok(())
    }

    /// Returns the end-of-stream policy these options select.
    pub fn trailing_policy(&self) -> TrailingPolicy {
        if self.flush_trailing {
            TrailingPolicy::Emit
        } else {
            TrailingPolicy::Drop
        }
    }
}

/// Cluster connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConnectionConfig {
    /// Contact points as `host` or `host:port`.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Keyspace to `USE` right after connecting.
    pub keyspace: Option<String>,

    /// Consistency level for every statement.
    pub consistency: Option<Consistency>,
}

impl ConnectionConfig {
    /// Creates a connection config from a connection string.
    ///
    /// Format: `cql://host:port/keyspace`
    pub fn from_connection_string(conn_str: &str) -> Result<Self> {
        let url = Url::parse(conn_str)
            .map_err(|e| CqlError::config(format!("Invalid connection string: {e}")))?;

        if url.scheme() != "cql" && url.scheme() != "cassandra" {
            return Err(CqlError::config(format!(
                "Invalid scheme '{}'. Expected 'cql' or 'cassandra'",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| CqlError::config("Connection string has no host"))?;
        let port = url.port().unwrap_or(DEFAULT_PORT);
        let keyspace = url
            .path()
            .strip_prefix('/')
            .filter(|ks| !ks.is_empty())
            .map(String::from);

        Ok(Self {
            hosts: vec![format!("{host}:{port}")],
            keyspace,
            consistency: None,
        })
    }

    /// Merges another config into this one, with the other taking precedence.
    pub fn merge(&mut self, other: &ConnectionConfig) {
        if !other.hosts.is_empty() {
            self.hosts = other.hosts.clone();
        }
        if other.keyspace.is_some() {
            self.keyspace = other.keyspace.clone();
        }
        if other.consistency.is_some() {
            self.consistency = other.consistency;
        }
    }

    /// Applies environment variables (CQLPIPE_HOSTS, CQLPIPE_KEYSPACE) as defaults.
    pub fn apply_env_defaults(&mut self) {
        if self.hosts.is_empty() {
            if let Ok(hosts) = std::env::var("CQLPIPE_HOSTS") {
                self.hosts = split_host_list(&hosts);
            }
        }
        if self.keyspace.is_none() {
            self.keyspace = std::env::var("CQLPIPE_KEYSPACE").ok();
        }
    }

    /// Returns the contact points, each with an explicit port.
    ///
    /// Falls back to `localhost:9042` when no host is configured.
    pub fn contact_points(&self) -> Result<Vec<String>> {
        if self.hosts.is_empty() {
            return Ok(vec![DEFAULT_HOST.to_string()]);
        }
        self.hosts.iter().map(|h| normalize_host(h)).collect()
    }

    /// Returns the consistency level, defaulting to ONE.
    pub fn consistency(&self) -> Consistency {
        self.consistency.unwrap_or_default()
    }

    /// Returns a display string for logs.
    pub fn display_string(&self) -> String {
        let hosts = if self.hosts.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            self.hosts.join(",")
        };
        match &self.keyspace {
            Some(ks) => format!("{ks} @ {hosts}"),
            None => hosts,
        }
    }
}

/// Splits a comma-separated host list, dropping empty entries.
pub fn split_host_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}

/// Adds the default port to a host entry that lacks one.
fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim();
    if host.is_empty() {
        return Err(CqlError::config("Empty host entry"));
    }

    // Bracketed IPv6, with or without port.
    if let Some(rest) = host.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((_, "")) => Ok(format!("{host}:{DEFAULT_PORT}")),
            Some((_, port)) => {
                let port = port.strip_prefix(':').unwrap_or(port);
                parse_port(host, port)?;
                Ok(host.to_string())
            }
            None => Err(CqlError::config(format!("Invalid host '{host}'"))),
        };
    }

    match host.matches(':').count() {
        0 => Ok(format!("{host}:{DEFAULT_PORT}")),
        1 => {
            let (name, port) = host.split_once(':').unwrap_or((host, ""));
            if name.is_empty() {
                return Err(CqlError::config(format!("Invalid host '{host}'")));
            }
            parse_port(host, port)?;
            Ok(host.to_string())
        }
        // Bare IPv6 address.
        _ => Ok(format!("[{host}]:{DEFAULT_PORT}")),
    }
}

fn parse_port(host: &str, port: &str) -> Result<u16> {
    port.parse::<u16>()
        .map_err(|_| CqlError::config(format!("Invalid port in host '{host}'")))
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cqlpipe")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CqlError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            CqlError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })?;
        config.input.validate()?;
        Ok(config)
    }

    /// Gets a named connection, or the default connection if name is None.
    pub fn get_connection(&self, name: Option<&str>) -> Option<&ConnectionConfig> {
        let key = name.unwrap_or("default");
        self.connections.get(key)
    }
}
