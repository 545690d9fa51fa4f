//! Result rendering for cqlpipe.

mod format;
mod table;

pub use format::{format_column, NULL_MARKER};
pub use table::{render, render_to_string, RenderError};
