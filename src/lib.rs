//! cqlpipe - run semicolon-terminated CQL statements and print result tables.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
