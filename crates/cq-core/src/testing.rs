//! Recording engine for unit tests

use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::dataset::FileContent;
use crate::engine::Engine;
use crate::error::{EngineError, ErrorCategory};
use crate::translate::TranslationRule;
use crate::value::{RowSet, TableInfo};

/// Parks the next engine call until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// Engine that records every call and answers from canned state
#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<String>>,
    rows: Mutex<RowSet>,
    query_error: Mutex<Option<EngineError>>,
    load_error: Mutex<Option<EngineError>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn set_rows(&self, rows: RowSet) {
        *self.rows.lock() = rows;
    }

    pub fn fail_queries_with(&self, message: &str) {
        *self.query_error.lock() = Some(EngineError::new(message));
    }

    pub fn fail_loads_with(&self, message: &str) {
        *self.load_error.lock() = Some(EngineError::new(message));
    }

    /// Block the next `query` or `create_table_from_csv` call on a gate
    pub fn hold(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl Engine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    async fn register_file(&self, name: &str, _content: &FileContent) -> Result<(), EngineError> {
        self.calls.lock().push(format!("register {}", name));
        Ok(())
    }

    async fn create_table_from_csv(&self, table: &str, resource: &str) -> Result<TableInfo, EngineError> {
        self.calls.lock().push(format!("create {} from {}", table, resource));
        self.pass_gate().await;
        match self.load_error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(TableInfo::default()),
        }
    }

    async fn query(&self, sql: &str) -> Result<RowSet, EngineError> {
        self.calls.lock().push(format!("query {}", sql));
        self.pass_gate().await;
        match self.query_error.lock().clone() {
            Some(e) => Err(e),
            None => Ok(self.rows.lock().clone()),
        }
    }

    fn error_rules(&self, _table: &str) -> Vec<TranslationRule> {
        vec![TranslationRule::new(ErrorCategory::InvalidColumnReference, ["fake:", "missing column"])]
    }
}
