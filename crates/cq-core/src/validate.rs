//! Admission checks run before a file or query reaches the engine
//!
//! The query gate is textual. It does not parse SQL, so keywords hidden in
//! comments or string literals are still matched and read-only execution is
//! not guaranteed. Treat it as a best-effort filter.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::MAX_UPLOAD_BYTES;
use crate::dataset::UploadedFile;
use crate::error::ConsoleError;

/// Keywords that reject a query, checked in this order
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "DROP", "DELETE", "INSERT", "UPDATE", "CREATE", "ALTER", "TRUNCATE", "EXEC", "EXECUTE",
];

static FORBIDDEN_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    FORBIDDEN_KEYWORDS
        .iter()
        .map(|keyword| Regex::new(&format!(r"(?i)\b{}\b", keyword)).expect("static keyword pattern"))
        .collect()
});

/// Check an upload against the default size ceiling
pub fn validate_file(file: &UploadedFile) -> Result<(), ConsoleError> {
    validate_file_with_limit(file, MAX_UPLOAD_BYTES)
}

/// Check an upload: `.csv` name, non-empty, at most `max_bytes`
pub fn validate_file_with_limit(file: &UploadedFile, max_bytes: u64) -> Result<(), ConsoleError> {
    if !file.name.to_lowercase().ends_with(".csv") {
        return Err(ConsoleError::InvalidFileType { name: file.name.clone() });
    }

    if file.size == 0 {
        return Err(ConsoleError::EmptyFile);
    }

    if file.size > max_bytes {
        return Err(ConsoleError::FileTooLarge {
            size_mb: bytes_to_mb(file.size),
            max_mb: bytes_to_mb(max_bytes),
        });
    }

    Ok(())
}

/// Check a query: it must mention SELECT and contain no denylisted keyword.
pub fn validate_query(sql: &str) -> Result<(), ConsoleError> {
    if !sql.to_uppercase().contains("SELECT") {
        return Err(ConsoleError::NotASelect);
    }

    for pattern in FORBIDDEN_PATTERNS.iter() {
        if let Some(found) = pattern.find(sql) {
            return Err(ConsoleError::ForbiddenOperation {
                keyword: found.as_str().to_string(),
            });
        }
    }

    Ok(())
}

fn bytes_to_mb(bytes: u64) -> u64 {
    (bytes as f64 / 1024.0 / 1024.0).round() as u64
}
