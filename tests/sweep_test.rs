//! Integration tests for the sweep driver
//!
//! Covers selection limits, exclusion of terminal statuses, and the
//! abort-on-first-failure behavior within a sweep.

use async_trait::async_trait;
use caseflow::adapters::ingest::MemoryResultIngestion;
use caseflow::adapters::registry::RegistryClient;
use caseflow::adapters::store::{CaseStore, MemoryCaseStore};
use caseflow::config::{secret_string, PollingConfig, RegistryConfig};
use caseflow::core::engine::{CasePollingEngine, PollingPolicy};
use caseflow::domain::case::{CaseLogEntry, CaseRecord, CaseStatus};
use caseflow::domain::{CaseflowError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

fn registry_config() -> RegistryConfig {
    RegistryConfig {
        username: "caseflow".to_string(),
        password: secret_string("secret"),
        job_package: "syphilis-registry".to_string(),
        timeout_seconds: 5,
        tls_verify: true,
    }
}

fn engine_with_limit(store: Arc<dyn CaseStore>, limit: i64) -> CasePollingEngine {
    CasePollingEngine::new(
        store,
        Arc::new(MemoryResultIngestion::new()),
        RegistryClient::new(&registry_config()).unwrap(),
        "syphilis-registry",
        PollingPolicy::from_config(&PollingConfig::default()),
        limit,
    )
}

async fn seed_pending(store: &MemoryCaseStore, host: &str, trigger_offset_secs: i64) -> CaseRecord {
    let mut case = CaseRecord::new("MRN|12345", 1, host, "/Job", 3);
    case.trigger_at = Utc::now() + Duration::seconds(trigger_offset_secs);
    store.create(&case).await.unwrap()
}

#[tokio::test]
async fn test_sweep_respects_outstanding_request_limit() {
    let mut server = mockito::Server::new_async().await;
    // Submissions fail server-side so each processed case just decrements
    let mock = server
        .mock("POST", "/Job")
        .with_status(500)
        .with_body("down")
        .expect(3)
        .create_async()
        .await;

    let store = Arc::new(MemoryCaseStore::new());
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(seed_pending(&store, &server.url(), -100 + i).await.id);
    }

    engine_with_limit(store.clone(), 3).run_sweep().await;

    mock.assert_async().await;
    let mut touched = 0;
    for id in &ids {
        let case = store.find_by_id(*id).await.unwrap().unwrap();
        if case.tries_left < 3 {
            touched += 1;
        }
    }
    assert_eq!(touched, 3);
}

#[tokio::test]
async fn test_non_positive_limit_falls_back_to_default() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/Job")
        .with_status(500)
        .with_body("down")
        .expect(3)
        .create_async()
        .await;

    let store = Arc::new(MemoryCaseStore::new());
    for i in 0..5 {
        seed_pending(&store, &server.url(), -100 + i).await;
    }

    engine_with_limit(store.clone(), 0).run_sweep().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_terminal_and_manual_statuses_are_never_swept() {
    let store = Arc::new(MemoryCaseStore::new());
    // Unroutable registry; any processed case would mutate
    let excluded = [
        CaseStatus::End,
        CaseStatus::TimedOut,
        CaseStatus::Paused,
        CaseStatus::ErrorInClient,
        CaseStatus::ResultParseError,
        CaseStatus::ErrorUnknown,
        CaseStatus::Invalid,
    ];

    let mut ids = Vec::new();
    for status in excluded {
        let mut case = seed_pending(&store, "http://127.0.0.1:1", -100).await;
        case.status = status;
        store.update(&case).await.unwrap();
        ids.push((case.id, status));
    }

    engine_with_limit(store.clone(), 10).run_sweep().await;

    for (id, status) in ids {
        let case = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(case.status, status);
        assert_eq!(case.tries_left, 3);
    }
}

/// Store wrapper that fails `update` for one poisoned case id
struct PoisonedStore {
    inner: Arc<MemoryCaseStore>,
    poisoned_id: i64,
}

#[async_trait]
impl CaseStore for PoisonedStore {
    async fn search_due(
        &self,
        due_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CaseRecord>> {
        self.inner.search_due(due_before, limit).await
    }

    async fn create(&self, case: &CaseRecord) -> Result<CaseRecord> {
        self.inner.create(case).await
    }

    async fn update(&self, case: &CaseRecord) -> Result<()> {
        if case.id == self.poisoned_id {
            return Err(CaseflowError::Store("write failed".to_string()));
        }
        self.inner.update(case).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CaseRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn append_log(&self, case_id: i64, text: &str) -> Result<()> {
        self.inner.append_log(case_id, text).await
    }

    async fn logs(&self, case_id: i64) -> Result<Vec<CaseLogEntry>> {
        self.inner.logs(case_id).await
    }
}

#[tokio::test]
async fn test_case_failure_aborts_remainder_of_sweep() {
    let mut server = mockito::Server::new_async().await;
    // Two submissions reach the registry; the third case is never processed
    let mock = server
        .mock("POST", "/Job")
        .with_status(500)
        .with_body("down")
        .expect(2)
        .create_async()
        .await;

    let memory = Arc::new(MemoryCaseStore::new());
    let first = seed_pending(&memory, &server.url(), -300).await;
    let second = seed_pending(&memory, &server.url(), -200).await;
    let third = seed_pending(&memory, &server.url(), -100).await;

    let store = Arc::new(PoisonedStore {
        inner: memory.clone(),
        poisoned_id: second.id,
    });

    engine_with_limit(store, 10).run_sweep().await;

    mock.assert_async().await;
    let first_after = memory.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(first_after.tries_left, 2);

    // The failing case's write never landed
    let second_after = memory.find_by_id(second.id).await.unwrap().unwrap();
    assert_eq!(second_after.tries_left, 3);

    // And the case behind it was never touched at all
    let third_after = memory.find_by_id(third.id).await.unwrap().unwrap();
    assert_eq!(third_after.tries_left, 3);
    assert!(memory.logs(third.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_selection_failure_skips_sweep() {
    struct BrokenStore;

    #[async_trait]
    impl CaseStore for BrokenStore {
        async fn search_due(&self, _: DateTime<Utc>, _: i64) -> Result<Vec<CaseRecord>> {
            Err(CaseflowError::Store("connection lost".to_string()))
        }
        async fn create(&self, _: &CaseRecord) -> Result<CaseRecord> {
            unreachable!()
        }
        async fn update(&self, _: &CaseRecord) -> Result<()> {
            unreachable!()
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<CaseRecord>> {
            unreachable!()
        }
        async fn append_log(&self, _: i64, _: &str) -> Result<()> {
            unreachable!()
        }
        async fn logs(&self, _: i64) -> Result<Vec<CaseLogEntry>> {
            unreachable!()
        }
    }

    // The sweep must swallow the selection failure and return
    engine_with_limit(Arc::new(BrokenStore), 3).run_sweep().await;
}
