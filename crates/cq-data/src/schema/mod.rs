//! Column type inference for CSV uploads

use ahash::AHashSet;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cq_core::NullConfig;
use csv::StringRecord;

/// Timestamp layouts accepted without a zone
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Schema detector for analyzing sampled records and choosing column types
pub struct SchemaDetector {
    null_config: NullConfig,
}

/// Information about a detected schema
#[derive(Debug, Clone)]
pub struct SchemaInfo {
    pub schema: Schema,
    pub column_stats: Vec<ColumnStats>,
}

/// Statistics about a sampled column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStats {
    pub null_count: usize,
    pub sample_count: usize,
}

impl SchemaDetector {
    /// Create a new schema detector
    pub fn new(null_config: NullConfig) -> Self {
        Self { null_config }
    }

    /// Detect schema from sample records
    pub fn detect_from_samples(&self, headers: &[String], samples: &[StringRecord]) -> SchemaInfo {
        let mut fields = Vec::with_capacity(headers.len());
        let mut column_stats = Vec::with_capacity(headers.len());

        for (col_idx, header) in headers.iter().enumerate() {
            let (data_type, stats) = self.analyze_column(samples, col_idx);
            fields.push(Field::new(header, data_type, true));
            column_stats.push(stats);
        }

        SchemaInfo {
            schema: Schema::new(fields),
            column_stats,
        }
    }

    /// Analyze a single column
    fn analyze_column(&self, samples: &[StringRecord], col_idx: usize) -> (DataType, ColumnStats) {
        let mut stats = ColumnStats::default();
        let mut is_bool = true;
        let mut is_int = true;
        let mut is_float = true;
        let mut is_date = true;
        let mut is_timestamp = true;

        for record in samples {
            stats.sample_count += 1;
            let value = match record.get(col_idx) {
                Some(value) if !self.null_config.is_null(value) => value.trim(),
                _ => {
                    stats.null_count += 1;
                    continue;
                }
            };

            if is_bool && parse_bool(value).is_none() {
                is_bool = false;
            }
            if is_int && value.parse::<i64>().is_err() {
                is_int = false;
            }
            if is_float && parse_float(value).is_none() {
                is_float = false;
            }
            if is_date && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                is_date = false;
            }
            if is_timestamp && !looks_like_timestamp(value) {
                is_timestamp = false;
            }
        }

        let data_type = if stats.null_count == stats.sample_count {
            // Nothing to go on
            DataType::Utf8
        } else if is_bool {
            DataType::Boolean
        } else if is_int {
            DataType::Int64
        } else if is_float {
            DataType::Float64
        } else if is_date {
            DataType::Date32
        } else if is_timestamp {
            DataType::Timestamp(TimeUnit::Microsecond, None)
        } else {
            DataType::Utf8
        };

        (data_type, stats)
    }
}

/// Parse `true`/`false` in any case
pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse a decimal number. Words such as `inf` or `NaN` stay text.
pub fn parse_float(value: &str) -> Option<f64> {
    if !value.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Check for an ISO-8601 date-time
fn looks_like_timestamp(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || TIMESTAMP_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

/// Column names for a header record. Blank cells become `column<N>` and
/// repeats (compared case-insensitively) get a `_<k>` suffix.
pub fn normalize_headers(headers: &StringRecord) -> Vec<String> {
    let mut used = AHashSet::new();

    headers.iter().enumerate().map(|(idx, raw)| {
        let base = match raw.trim() {
            "" => format!("column{}", idx),
            trimmed => trimmed.to_string(),
        };

        let mut name = base.clone();
        let mut suffix = 0;
        while used.contains(&name.to_lowercase()) {
            suffix += 1;
            name = format!("{}_{}", base, suffix);
        }
        used.insert(name.to_lowercase());
        name
    }).collect()
}

/// SQLite column type declared for an inferred Arrow type
pub fn sqlite_decl_type(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::Boolean => "BOOLEAN",
        DataType::Int64 => "BIGINT",
        DataType::Float64 => "DOUBLE",
        DataType::Date32 => "DATE",
        DataType::Timestamp(_, _) => "TIMESTAMP",
        _ => "VARCHAR",
    }
}
