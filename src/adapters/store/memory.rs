//! In-memory case store
//!
//! Backs tests and `store_target = "memory"` smoke runs. Applies the same
//! selection contract as the PostgreSQL store so engine behavior is
//! identical across backends.

use super::traits::CaseStore;
use crate::domain::case::{CaseLogEntry, CaseRecord};
use crate::domain::{CaseflowError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    cases: BTreeMap<i64, CaseRecord>,
    logs: Vec<CaseLogEntry>,
    next_case_id: i64,
    next_log_id: i64,
}

/// In-memory [`CaseStore`] implementation
#[derive(Default)]
pub struct MemoryCaseStore {
    inner: Mutex<Inner>,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| CaseflowError::Store("case store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn search_due(
        &self,
        due_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CaseRecord>> {
        let inner = self.lock()?;

        let mut due: Vec<CaseRecord> = inner
            .cases
            .values()
            .filter(|c| c.status.is_pollable() && c.trigger_at <= due_before)
            .cloned()
            .collect();

        // status DESC, trigger_at ASC, matching the SQL ordering on the
        // stored status string
        due.sort_by(|a, b| {
            b.status
                .as_str()
                .cmp(a.status.as_str())
                .then(a.trigger_at.cmp(&b.trigger_at))
        });

        if limit > 0 {
            due.truncate(limit as usize);
        }

        Ok(due)
    }

    async fn create(&self, case: &CaseRecord) -> Result<CaseRecord> {
        let mut inner = self.lock()?;

        inner.next_case_id += 1;
        let mut created = case.clone();
        created.id = inner.next_case_id;
        inner.cases.insert(created.id, created.clone());

        Ok(created)
    }

    async fn update(&self, case: &CaseRecord) -> Result<()> {
        let mut inner = self.lock()?;

        if !inner.cases.contains_key(&case.id) {
            return Err(CaseflowError::Store(format!(
                "case {} does not exist",
                case.id
            )));
        }

        let mut updated = case.clone();
        updated.last_updated_at = Some(Utc::now());
        inner.cases.insert(updated.id, updated);

        Ok(())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<CaseRecord>> {
        Ok(self.lock()?.cases.get(&id).cloned())
    }

    async fn append_log(&self, case_id: i64, text: &str) -> Result<()> {
        let mut inner = self.lock()?;

        inner.next_log_id += 1;
        let entry = CaseLogEntry {
            id: inner.next_log_id,
            case_id,
            logged_at: Utc::now(),
            text: text.to_string(),
        };
        inner.logs.push(entry);

        Ok(())
    }

    async fn logs(&self, case_id: i64) -> Result<Vec<CaseLogEntry>> {
        Ok(self
            .lock()?
            .logs
            .iter()
            .filter(|l| l.case_id == case_id)
            .cloned()
            .collect())
    }
}
