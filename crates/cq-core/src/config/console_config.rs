//! Session-wide settings

use std::path::Path;
use serde::{Serialize, Deserialize};

use super::null_handling::NullConfig;

/// Logical name of the single dataset table
pub const DATASET_TABLE: &str = "tablename";

/// Resource name uploaded files are registered under
pub const REGISTRATION_NAME: &str = "upload.csv";

/// Engine memory ceiling (4 GB)
pub const MEMORY_LIMIT_BYTES: u64 = 4_000_000_000;

/// Largest accepted upload (1024 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// Rows shown per result page
pub const PAGE_SIZE: usize = 1000;

/// Rows sampled for CSV type inference
pub const DEFAULT_SAMPLE_ROWS: usize = 20_480;

/// CSV ingestion options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,

    /// Records sampled for type inference
    pub sample_size: usize,

    /// Null handling configuration
    pub null_config: NullConfig,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            sample_size: DEFAULT_SAMPLE_ROWS,
            null_config: NullConfig::default(),
        }
    }
}

/// Configuration for a console session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Table the uploaded file is loaded into
    pub dataset_table: String,

    /// Resource name for file registration
    pub registration_name: String,

    /// Engine memory ceiling in bytes
    pub memory_limit_bytes: u64,

    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,

    /// Rows shown per result
    pub page_size: usize,

    /// CSV ingestion options
    pub csv: CsvOptions,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            dataset_table: DATASET_TABLE.to_string(),
            registration_name: REGISTRATION_NAME.to_string(),
            memory_limit_bytes: MEMORY_LIMIT_BYTES,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            page_size: PAGE_SIZE,
            csv: CsvOptions::default(),
        }
    }
}

impl ConsoleConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a JSON configuration file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
