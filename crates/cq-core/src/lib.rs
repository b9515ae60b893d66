//! Core of the CSV query console
//!
//! This crate holds the query admission and execution pipeline: the
//! validation gate for uploads and queries, the engine capability and the
//! adapter that drives it, error translation and the session that owns the
//! single loaded dataset.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod session;
pub mod translate;
pub mod validate;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{ConsoleConfig, CsvOptions, NullConfig};
pub use dataset::{Dataset, FileContent, UploadedFile};
pub use engine::{Engine, EngineAdapter, QueryOutcome};
pub use error::{ConsoleError, EngineError, ErrorCategory, ErrorDescriptor};
pub use session::{Session, SessionStatus};
pub use translate::{ErrorTranslator, TranslationRule};
pub use validate::{validate_file, validate_file_with_limit, validate_query};
pub use value::{ColumnInfo, Row, RowSet, TableInfo, Value};
