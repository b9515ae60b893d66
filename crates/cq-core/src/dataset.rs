//! Uploaded files and the loaded dataset

use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::{DateTime, Utc};

use crate::value::{ColumnInfo, TableInfo};

/// Where the bytes of an uploaded file live
#[derive(Debug, Clone)]
pub enum FileContent {
    /// Bytes already held in memory
    Bytes(Arc<[u8]>),
    /// A file on disk, read when the engine ingests it
    Path(PathBuf),
}

impl FileContent {
    /// Open a fresh reader over the content
    pub fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        match self {
            FileContent::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            FileContent::Path(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }
}

/// A candidate upload: metadata plus a handle to its content
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as chosen by the user
    pub name: String,
    /// Size in bytes
    pub size: u64,
    pub content: FileContent,
}

impl UploadedFile {
    /// Wrap in-memory bytes
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content: FileContent::Bytes(bytes),
        }
    }

    /// Describe a file on disk without reading it
    pub fn from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let size = std::fs::metadata(&path)?.len();
        let name = path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            name,
            size,
            content: FileContent::Path(path),
        })
    }
}

/// The single table currently loaded from an upload
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Table name inside the engine
    pub name: String,
    /// Name of the file it was loaded from
    pub source_name: String,
    /// Size of that file in bytes
    pub size_bytes: u64,
    /// Rows ingested, if the engine reported them
    pub row_count: Option<usize>,
    /// Inferred columns, empty if unknown
    pub columns: Vec<ColumnInfo>,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Describe a freshly loaded table
    pub fn new(table: &str, file: &UploadedFile, info: TableInfo) -> Self {
        Self {
            name: table.to_string(),
            source_name: file.name.clone(),
            size_bytes: file.size,
            row_count: Some(info.row_count),
            columns: info.columns,
            loaded_at: Utc::now(),
        }
    }

    pub fn column_count(&self) -> Option<usize> {
        if self.columns.is_empty() {
            None
        } else {
            Some(self.columns.len())
        }
    }
}
