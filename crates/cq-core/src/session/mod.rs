//! Session state: the single loaded dataset and the pipeline around it

use std::sync::Arc;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::ConsoleConfig;
use crate::dataset::{Dataset, UploadedFile};
use crate::engine::{Engine, EngineAdapter, QueryOutcome};
use crate::error::ConsoleError;
use crate::translate::ErrorTranslator;
use crate::validate::{validate_file_with_limit, validate_query};

/// What the session is busy with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Loading { file: String },
    Querying,
}

/// One user session over one engine connection.
///
/// Holds at most one [`Dataset`]. Loads and queries are serialized; the
/// activity status returns to [`SessionStatus::Idle`] however they end.
pub struct Session {
    adapter: EngineAdapter,
    translator: ErrorTranslator,
    config: ConsoleConfig,

    /// The currently loaded dataset
    dataset: Arc<RwLock<Option<Arc<Dataset>>>>,

    status: Arc<RwLock<SessionStatus>>,

    /// Held for the whole of a load or query
    op_lock: tokio::sync::Mutex<()>,
}

/// Resets the status when an operation finishes
struct Activity<'a> {
    status: &'a RwLock<SessionStatus>,
}

impl<'a> Activity<'a> {
    fn begin(status: &'a RwLock<SessionStatus>, state: SessionStatus) -> Self {
        *status.write() = state;
        Self { status }
    }
}

impl Drop for Activity<'_> {
    fn drop(&mut self) {
        *self.status.write() = SessionStatus::Idle;
    }
}

impl Session {
    /// Create a session with no dataset loaded
    pub fn new(engine: Arc<dyn Engine>, config: ConsoleConfig) -> Self {
        let translator = ErrorTranslator::new(&config.dataset_table)
            .with_rules(engine.error_rules(&config.dataset_table));
        let adapter = EngineAdapter::new(engine, &config);

        Self {
            adapter,
            translator,
            config,
            dataset: Arc::new(RwLock::new(None)),
            status: Arc::new(RwLock::new(SessionStatus::Idle)),
            op_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn translator(&self) -> &ErrorTranslator {
        &self.translator
    }

    /// The active dataset, if any
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.dataset.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.read().is_some()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.read().clone()
    }

    /// Validate and load an upload, replacing any previous dataset.
    ///
    /// On failure the previous dataset descriptor stays in place.
    pub async fn load_csv(&self, file: UploadedFile) -> Result<Arc<Dataset>, ConsoleError> {
        if let Err(e) = validate_file_with_limit(&file, self.config.max_upload_bytes) {
            warn!("Rejected upload {}: {}", file.name, e);
            return Err(e);
        }

        let _op = self.op_lock.lock().await;
        let _activity = Activity::begin(&self.status, SessionStatus::Loading { file: file.name.clone() });

        match self.adapter.load_csv(&file).await {
            Ok(table_info) => {
                let dataset = Arc::new(Dataset::new(self.adapter.table(), &file, table_info));
                *self.dataset.write() = Some(dataset.clone());
                info!("Dataset {} now backed by {}", dataset.name, dataset.source_name);
                Ok(dataset)
            }
            Err(e) => {
                let err = self.translator.translate(&e);
                warn!("File load failed for {}: {}", file.name, e);
                Err(err)
            }
        }
    }

    /// Admit and execute a query against the loaded dataset
    pub async fn run_query(&self, sql: &str) -> Result<QueryOutcome, ConsoleError> {
        let sql = sql.trim();
        if let Err(e) = validate_query(sql) {
            warn!("Rejected query: {}", e);
            return Err(e);
        }

        let _op = self.op_lock.lock().await;
        if !self.is_loaded() {
            return Err(ConsoleError::NoDatasetLoaded);
        }

        let _activity = Activity::begin(&self.status, SessionStatus::Querying);
        self.adapter.run_query(sql).await.map_err(|e| {
            let err = self.translator.translate(&e);
            warn!("Query failed ({}): {}", err.category(), e);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::testing::FakeEngine;
    use crate::value::{RowSet, Value};

    fn session(engine: &Arc<FakeEngine>) -> Session {
        Session::new(engine.clone(), ConsoleConfig::default())
    }

    fn csv(name: &str) -> UploadedFile {
        UploadedFile::from_bytes(name, b"a,b\n1,2\n".to_vec())
    }

    #[tokio::test]
    async fn test_load_drives_engine_in_order() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);

        let dataset = session.load_csv(csv("data.csv")).await.unwrap();
        assert_eq!(dataset.name, "tablename");
        assert_eq!(dataset.source_name, "data.csv");
        assert_eq!(dataset.size_bytes, 8);
        assert!(session.is_loaded());
        assert_eq!(
            engine.calls(),
            vec![
                "register upload.csv",
                "query DROP TABLE IF EXISTS tablename",
                "create tablename from upload.csv",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_drop_is_ignored() {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_queries_with("Catalog Error: Table with name tablename does not exist!");
        let session = session(&engine);

        assert!(session.load_csv(csv("data.csv")).await.is_ok());
    }

    #[tokio::test]
    async fn test_second_load_replaces_dataset() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);

        session.load_csv(csv("first.csv")).await.unwrap();
        session.load_csv(UploadedFile::from_bytes("second.csv", b"x\n1\n2\n".to_vec())).await.unwrap();

        let dataset = session.dataset().unwrap();
        assert_eq!(dataset.source_name, "second.csv");
        assert_eq!(dataset.size_bytes, 6);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_dataset() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);
        session.load_csv(csv("first.csv")).await.unwrap();

        engine.fail_loads_with("Invalid Input Error: CSV Error on Line: 3");
        let err = session.load_csv(csv("broken.csv")).await.unwrap_err();

        assert!(matches!(err, ConsoleError::UnknownEngineError { .. }));
        assert_eq!(session.dataset().unwrap().source_name, "first.csv");
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_invalid_upload_never_reaches_engine() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);

        let err = session.load_csv(UploadedFile::from_bytes("data.json", b"{}".to_vec())).await.unwrap_err();
        assert_eq!(err, ConsoleError::InvalidFileType { name: "data.json".to_string() });

        let err = session.load_csv(UploadedFile::from_bytes("empty.csv", Vec::new())).await.unwrap_err();
        assert_eq!(err, ConsoleError::EmptyFile);

        assert!(engine.calls().is_empty());
        assert!(!session.is_loaded());
    }

    #[tokio::test]
    async fn test_forbidden_query_before_upload() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);

        let err = session.run_query("DROP TABLE tablename").await.unwrap_err();
        assert_eq!(err, ConsoleError::NotASelect);

        let err = session.run_query("SELECT 1; DROP TABLE tablename").await.unwrap_err();
        assert_eq!(err, ConsoleError::ForbiddenOperation { keyword: "DROP".to_string() });

        assert!(engine.calls().is_empty());
        assert!(!session.is_loaded());
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_query_without_dataset() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);

        let err = session.run_query("SELECT * FROM tablename").await.unwrap_err();
        assert_eq!(err, ConsoleError::NoDatasetLoaded);
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn test_query_returns_rows() {
        let engine = Arc::new(FakeEngine::new());
        engine.set_rows(RowSet::from_values(
            vec!["n".to_string()],
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
        ));
        let session = session(&engine);
        session.load_csv(csv("data.csv")).await.unwrap();

        let outcome = session.run_query("  SELECT n FROM tablename  ").await.unwrap();
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(engine.calls().last().unwrap(), "query SELECT n FROM tablename");
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_engine_errors_are_translated() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);
        session.load_csv(csv("data.csv")).await.unwrap();

        engine.fail_queries_with("Binder Error: column 'x' not found");
        let err = session.run_query("SELECT x FROM tablename").await.unwrap_err();
        assert_eq!(err, ConsoleError::InvalidColumnReference);
        assert_eq!(err.to_string(), "Invalid column reference in query");
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_status_while_loading() {
        let engine = Arc::new(FakeEngine::new());
        let session = Arc::new(session(&engine));
        let gate = engine.hold();

        let load = tokio::spawn({
            let session = session.clone();
            async move { session.load_csv(csv("data.csv")).await }
        });

        gate.entered.notified().await;
        assert_eq!(session.status(), SessionStatus::Loading { file: "data.csv".to_string() });

        gate.release.notify_one();
        load.await.unwrap().unwrap();
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_status_while_load_fails() {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_loads_with("Invalid Input Error: CSV Error on Line: 2");
        let session = Arc::new(session(&engine));
        let gate = engine.hold();

        let load = tokio::spawn({
            let session = session.clone();
            async move { session.load_csv(csv("data.csv")).await }
        });

        gate.entered.notified().await;
        assert_eq!(session.status(), SessionStatus::Loading { file: "data.csv".to_string() });

        gate.release.notify_one();
        assert!(load.await.unwrap().is_err());
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(!session.is_loaded());
    }

    #[tokio::test]
    async fn test_status_while_querying() {
        let engine = Arc::new(FakeEngine::new());
        let session = Arc::new(session(&engine));
        session.load_csv(csv("data.csv")).await.unwrap();
        let gate = engine.hold();

        let query = tokio::spawn({
            let session = session.clone();
            async move { session.run_query("SELECT * FROM tablename").await }
        });

        gate.entered.notified().await;
        assert_eq!(session.status(), SessionStatus::Querying);

        gate.release.notify_one();
        query.await.unwrap().unwrap();
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_status_while_query_fails() {
        let engine = Arc::new(FakeEngine::new());
        let session = Arc::new(session(&engine));
        session.load_csv(csv("data.csv")).await.unwrap();
        engine.fail_queries_with("Binder Error: column 'x' not found");
        let gate = engine.hold();

        let query = tokio::spawn({
            let session = session.clone();
            async move { session.run_query("SELECT x FROM tablename").await }
        });

        gate.entered.notified().await;
        assert_eq!(session.status(), SessionStatus::Querying);

        gate.release.notify_one();
        let err = query.await.unwrap().unwrap_err();
        assert_eq!(err, ConsoleError::InvalidColumnReference);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_engine_rules_extend_translator() {
        let engine = Arc::new(FakeEngine::new());
        let session = session(&engine);

        let err = session.translator().translate(&EngineError::new("fake: missing column q"));
        assert_eq!(err, ConsoleError::InvalidColumnReference);
    }
}
