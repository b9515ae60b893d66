//! Building a SQLite table from CSV content

use arrow::datatypes::DataType;
use csv::{ReaderBuilder, StringRecord};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Statement};
use tracing::debug;

use cq_core::{ColumnInfo, CsvOptions, FileContent, NullConfig, TableInfo};
use crate::schema::{normalize_headers, parse_bool, parse_float, sqlite_decl_type, SchemaDetector};
use crate::DataError;

/// Quote an identifier for SQLite
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Create `table` from CSV content, inferring column types from the first
/// `sample_size` records. Creation and inserts share one transaction, so a
/// failure leaves no partial table behind.
pub fn load_csv_table(
    conn: &mut Connection,
    table: &str,
    content: &FileContent,
    options: &CsvOptions,
) -> Result<TableInfo, DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(content.open()?);

    let headers = csv_reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) && headers.len() <= 1 {
        return Err(DataError::SchemaDetection("CSV file has no header row".to_string()));
    }
    let column_names = normalize_headers(&headers);

    // Sample rows for type detection
    let mut records = csv_reader.into_records();
    let mut sample = Vec::new();
    while sample.len() < options.sample_size.max(1) {
        match records.next() {
            Some(record) => sample.push(record?),
            None => break,
        }
    }

    let schema_info = SchemaDetector::new(options.null_config.clone())
        .detect_from_samples(&column_names, &sample);
    let types: Vec<DataType> = schema_info.schema.fields()
        .iter()
        .map(|f| f.data_type().clone())
        .collect();

    debug!("Inferred {} columns from {} sampled rows", types.len(), sample.len());

    let column_defs = column_names.iter()
        .zip(&types)
        .map(|(name, data_type)| format!("{} {}", quote_identifier(name), sqlite_decl_type(data_type)))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; column_names.len()].join(", ");
    let table_ident = quote_identifier(table);

    let tx = conn.transaction()?;
    tx.execute(&format!("CREATE TABLE {} ({})", table_ident, column_defs), [])?;

    let mut row_count = 0;
    {
        let mut insert = tx.prepare(&format!("INSERT INTO {} VALUES ({})", table_ident, placeholders))?;
        for record in &sample {
            insert_record(&mut insert, record, &types, &options.null_config)?;
            row_count += 1;
        }
        for record in records {
            insert_record(&mut insert, &record?, &types, &options.null_config)?;
            row_count += 1;
        }
    }
    tx.commit()?;

    let columns = column_names.into_iter()
        .zip(types)
        .map(|(name, data_type)| ColumnInfo { name, data_type })
        .collect();

    Ok(TableInfo { columns, row_count })
}

/// Insert one record, padding short records with NULL and dropping extra fields
fn insert_record(
    insert: &mut Statement<'_>,
    record: &StringRecord,
    types: &[DataType],
    null_config: &NullConfig,
) -> Result<(), DataError> {
    let values: Vec<SqlValue> = types.iter()
        .enumerate()
        .map(|(idx, data_type)| match record.get(idx) {
            Some(raw) => cell_value(raw, data_type, null_config),
            None => SqlValue::Null,
        })
        .collect();

    insert.execute(params_from_iter(values.iter()))?;
    Ok(())
}

/// Convert a CSV field. Fields that do not parse as the column type are kept
/// as text.
fn cell_value(raw: &str, data_type: &DataType, null_config: &NullConfig) -> SqlValue {
    if null_config.is_null(raw) {
        return SqlValue::Null;
    }

    let trimmed = raw.trim();
    let parsed = match data_type {
        DataType::Boolean => parse_bool(trimmed).map(|b| SqlValue::Integer(b as i64)),
        DataType::Int64 => trimmed.parse::<i64>().ok().map(SqlValue::Integer),
        DataType::Float64 => parse_float(trimmed).map(SqlValue::Real),
        _ => None,
    };

    parsed.unwrap_or_else(|| SqlValue::Text(raw.to_string()))
}
