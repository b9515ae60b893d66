//! Result presentation for the CSV query console

pub mod format;
pub mod render;
mod tables;

pub use format::{format_bytes, format_count, format_elapsed_ms};
pub use render::render_table;
pub use tables::{DisplayCell, DisplayResult, ResultShaper, TableConfig};
