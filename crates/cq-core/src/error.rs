//! Error taxonomy for the admission and execution pipeline

use std::fmt;
use serde::Serialize;
use thiserror::Error;

/// Error reported by the engine as free text
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Errors surfaced to the user. Every variant is terminal for the action
/// that triggered it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsoleError {
    #[error("Only CSV files are allowed")]
    InvalidFileType { name: String },

    #[error("File is empty")]
    EmptyFile,

    #[error("File too large ({size_mb}MB). Maximum size: {max_mb}MB")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    #[error("Query must contain SELECT statement")]
    NotASelect,

    #[error("Operation \"{keyword}\" not allowed. Only SELECT queries permitted.")]
    ForbiddenOperation { keyword: String },

    #[error("Please upload a CSV file first")]
    NoDatasetLoaded,

    #[error("SQL syntax error: {message}")]
    SqlSyntaxError { message: String },

    #[error("Table \"{table}\" not found. Make sure you uploaded a CSV file.")]
    DatasetNotFound { table: String },

    #[error("Invalid column reference in query")]
    InvalidColumnReference,

    #[error("Query exceeded memory limit. Try a simpler query or smaller file.")]
    MemoryLimitExceeded,

    #[error("{message}")]
    UnknownEngineError { message: String },

    #[error("Initialization failed: {message}")]
    EngineInitFailure { message: String },
}

/// Error kind, as handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    InvalidFileType,
    EmptyFile,
    FileTooLarge,
    NotASelect,
    ForbiddenOperation,
    NoDatasetLoaded,
    SqlSyntaxError,
    DatasetNotFound,
    InvalidColumnReference,
    MemoryLimitExceeded,
    UnknownEngineError,
    EngineInitFailure,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::InvalidFileType => "InvalidFileType",
            ErrorCategory::EmptyFile => "EmptyFile",
            ErrorCategory::FileTooLarge => "FileTooLarge",
            ErrorCategory::NotASelect => "NotASelect",
            ErrorCategory::ForbiddenOperation => "ForbiddenOperation",
            ErrorCategory::NoDatasetLoaded => "NoDatasetLoaded",
            ErrorCategory::SqlSyntaxError => "SqlSyntaxError",
            ErrorCategory::DatasetNotFound => "DatasetNotFound",
            ErrorCategory::InvalidColumnReference => "InvalidColumnReference",
            ErrorCategory::MemoryLimitExceeded => "MemoryLimitExceeded",
            ErrorCategory::UnknownEngineError => "UnknownEngineError",
            ErrorCategory::EngineInitFailure => "EngineInitFailure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{category, message}` pair shown instead of a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDescriptor {
    pub category: ErrorCategory,
    pub message: String,
}

impl ConsoleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::InvalidFileType { .. } => ErrorCategory::InvalidFileType,
            ConsoleError::EmptyFile => ErrorCategory::EmptyFile,
            ConsoleError::FileTooLarge { .. } => ErrorCategory::FileTooLarge,
            ConsoleError::NotASelect => ErrorCategory::NotASelect,
            ConsoleError::ForbiddenOperation { .. } => ErrorCategory::ForbiddenOperation,
            ConsoleError::NoDatasetLoaded => ErrorCategory::NoDatasetLoaded,
            ConsoleError::SqlSyntaxError { .. } => ErrorCategory::SqlSyntaxError,
            ConsoleError::DatasetNotFound { .. } => ErrorCategory::DatasetNotFound,
            ConsoleError::InvalidColumnReference => ErrorCategory::InvalidColumnReference,
            ConsoleError::MemoryLimitExceeded => ErrorCategory::MemoryLimitExceeded,
            ConsoleError::UnknownEngineError { .. } => ErrorCategory::UnknownEngineError,
            ConsoleError::EngineInitFailure { .. } => ErrorCategory::EngineInitFailure,
        }
    }

    /// True for rejections made before the engine was involved
    pub fn is_admission(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::InvalidFileType
                | ErrorCategory::EmptyFile
                | ErrorCategory::FileTooLarge
                | ErrorCategory::NotASelect
                | ErrorCategory::ForbiddenOperation
                | ErrorCategory::NoDatasetLoaded
        )
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor {
            category: self.category(),
            message: self.to_string(),
        }
    }
}
