//! Integration tests for cqlpipe.

pub mod cluster_test;
pub mod pipeline_test;
pub mod render_test;
