//! Embedded engine for the CSV query console

pub mod schema;
pub mod sources;

use std::sync::Arc;
use tokio::task::JoinError;
use thiserror::Error;
use tracing::error;

use cq_core::{ConsoleConfig, ConsoleError, EngineError, Session};

// Re-exports
pub use schema::SchemaDetector;
pub use sources::SqliteEngine;

/// Errors that can occur in engine operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema detection error: {0}")]
    SchemaDetection(String),

    #[error("No file registered as {0}")]
    NotRegistered(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<DataError> for EngineError {
    fn from(error: DataError) -> Self {
        EngineError::new(error.to_string())
    }
}

/// Start a session backed by a fresh SQLite engine
pub fn open_session(config: ConsoleConfig) -> Result<Session, ConsoleError> {
    let engine = SqliteEngine::open(&config).map_err(|e| {
        error!("Engine initialization failed: {}", e);
        ConsoleError::EngineInitFailure { message: e.to_string() }
    })?;

    Ok(Session::new(Arc::new(engine), config))
}
