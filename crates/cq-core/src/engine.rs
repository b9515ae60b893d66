//! Engine capability and the adapter driving it

use std::sync::Arc;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ConsoleConfig;
use crate::dataset::{FileContent, UploadedFile};
use crate::error::EngineError;
use crate::translate::TranslationRule;
use crate::value::{RowSet, TableInfo};

/// Trait for embedded analytical engines.
///
/// An implementation owns one connection. Calls never overlap: the session
/// serializes them.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Make file content readable under a resource name
    async fn register_file(&self, name: &str, content: &FileContent) -> Result<(), EngineError>;

    /// Create `table` from a registered CSV resource, inferring its schema
    async fn create_table_from_csv(&self, table: &str, resource: &str) -> Result<TableInfo, EngineError>;

    /// Execute a statement and return every row it produces
    async fn query(&self, sql: &str) -> Result<RowSet, EngineError>;

    /// Extra classification rules for this engine's error phrasing
    fn error_rules(&self, _table: &str) -> Vec<TranslationRule> {
        Vec::new()
    }
}

/// Rows of a finished query and how long the engine took
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub rows: RowSet,
    pub elapsed: Duration,
}

impl QueryOutcome {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Drives the engine for the two operations the console needs
pub struct EngineAdapter {
    engine: Arc<dyn Engine>,
    table: String,
    registration_name: String,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn Engine>, config: &ConsoleConfig) -> Self {
        Self {
            engine,
            table: config.dataset_table.clone(),
            registration_name: config.registration_name.clone(),
        }
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Replace the dataset table with the content of `file`
    pub async fn load_csv(&self, file: &UploadedFile) -> Result<TableInfo, EngineError> {
        self.engine.register_file(&self.registration_name, &file.content).await?;
        debug!("Registered {} as {}", file.name, self.registration_name);

        let drop_sql = format!("DROP TABLE IF EXISTS {}", self.table);
        if let Err(e) = self.engine.query(&drop_sql).await {
            // The table might not exist
            debug!("Ignoring failed drop of {}: {}", self.table, e);
        }

        let info = self.engine
            .create_table_from_csv(&self.table, &self.registration_name)
            .await?;

        info!(
            "{} loaded {} into {} ({} rows, {} columns)",
            self.engine.name(),
            file.name,
            self.table,
            info.row_count,
            info.columns.len()
        );

        Ok(info)
    }

    /// Run a statement and time it
    pub async fn run_query(&self, sql: &str) -> Result<QueryOutcome, EngineError> {
        let start = Instant::now();
        let rows = self.engine.query(sql).await?;
        let elapsed = start.elapsed();

        debug!(
            "{} returned {} rows in {}",
            self.engine.name(),
            rows.len(),
            humantime::format_duration(elapsed)
        );

        Ok(QueryOutcome { rows, elapsed })
    }
}
