//! SQLite engine implementation

use std::sync::Arc;
use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rusqlite::{types::ValueRef, Connection};
use tracing::{debug, info};

use cq_core::{
    ConsoleConfig, CsvOptions, Engine, EngineError, ErrorCategory, FileContent, RowSet,
    TableInfo, TranslationRule, Value,
};
use super::csv_table::load_csv_table;
use crate::DataError;

/// In-memory SQLite database behind the [`Engine`] capability
pub struct SqliteEngine {
    conn: Arc<Mutex<Connection>>,
    /// Registered files by resource name
    files: Arc<RwLock<AHashMap<String, FileContent>>>,
    csv_options: CsvOptions,
}

impl SqliteEngine {
    /// Open the database and apply the memory ceiling
    pub fn open(config: &ConsoleConfig) -> Result<Self, DataError> {
        let conn = Connection::open_in_memory()?;
        let applied = Self::apply_memory_limit(&conn, config.memory_limit_bytes)?;

        info!(
            "Opened SQLite {} (heap limit {} bytes)",
            rusqlite::version(),
            applied.unwrap_or(config.memory_limit_bytes as i64)
        );

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            files: Arc::new(RwLock::new(AHashMap::new())),
            csv_options: config.csv.clone(),
        })
    }

    /// Set the hard heap limit, returning the value SQLite reports
    fn apply_memory_limit(conn: &Connection, bytes: u64) -> Result<Option<i64>, DataError> {
        let mut stmt = conn.prepare(&format!("PRAGMA hard_heap_limit = {}", bytes))?;
        let mut rows = stmt.query([])?;
        let applied = match rows.next()? {
            Some(row) => row.get::<_, i64>(0).ok(),
            None => None,
        };
        Ok(applied)
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_connection<F, T>(&self, f: F) -> Result<T, DataError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DataError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            f(&mut *conn)
        }).await?
    }
}

/// Execute one statement and collect its rows
pub fn execute_query(conn: &Connection, sql: &str) -> Result<RowSet, DataError> {
    let mut stmt = conn.prepare(sql)?;

    let columns: Vec<(String, Option<String>)> = stmt.columns()
        .iter()
        .map(|c| (c.name().to_string(), c.decl_type().map(|t| t.to_uppercase())))
        .collect();

    let mut values = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut record = Vec::with_capacity(columns.len());
        for (idx, (_, decl_type)) in columns.iter().enumerate() {
            record.push(convert_value(row.get_ref(idx)?, decl_type.as_deref()));
        }
        values.push(record);
    }

    let names = columns.into_iter().map(|(name, _)| name).collect();
    Ok(RowSet::from_values(names, values))
}

fn convert_value(value: ValueRef<'_>, decl_type: Option<&str>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if decl_type == Some("BOOLEAN") => Value::Boolean(i != 0),
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Text(format!("<blob {} bytes>", bytes.len())),
    }
}

#[async_trait]
impl Engine for SqliteEngine {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn register_file(&self, name: &str, content: &FileContent) -> Result<(), EngineError> {
        self.files.write().insert(name.to_string(), content.clone());
        Ok(())
    }

    async fn create_table_from_csv(&self, table: &str, resource: &str) -> Result<TableInfo, EngineError> {
        let content = self.files.read()
            .get(resource)
            .cloned()
            .ok_or_else(|| DataError::NotRegistered(resource.to_string()))?;

        let table = table.to_string();
        let options = self.csv_options.clone();
        let info = self.with_connection(move |conn| load_csv_table(conn, &table, &content, &options)).await?;
        Ok(info)
    }

    async fn query(&self, sql: &str) -> Result<RowSet, EngineError> {
        debug!("Executing: {}", sql);
        let sql = sql.to_string();
        let rows = self.with_connection(move |conn| execute_query(conn, &sql)).await?;
        Ok(rows)
    }

    fn error_rules(&self, table: &str) -> Vec<TranslationRule> {
        vec![
            TranslationRule::new(ErrorCategory::SqlSyntaxError, ["syntax error"]),
            TranslationRule::new(ErrorCategory::SqlSyntaxError, ["incomplete input"]),
            TranslationRule::new(ErrorCategory::DatasetNotFound, ["no such table", table]),
            TranslationRule::new(ErrorCategory::InvalidColumnReference, ["no such column"]),
            TranslationRule::new(ErrorCategory::InvalidColumnReference, ["ambiguous column name"]),
            TranslationRule::new(ErrorCategory::MemoryLimitExceeded, ["out of memory"]),
        ]
    }
}
