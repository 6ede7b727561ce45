//! Case store abstraction

use crate::domain::case::{CaseLogEntry, CaseRecord};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable storage for case records and their audit trail
///
/// The polling engine is the sole mutator of a case once created; the store
/// only needs filtered selection, whole-record update, and append-only
/// logging. Implementations must apply the selection contract exactly:
/// `trigger_at <= due_before`, status in the pollable set, ordered by
/// `status DESC, trigger_at ASC`, at most `limit` rows.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Select due cases eligible for the next sweep
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; the engine treats this as a
    /// skipped sweep.
    async fn search_due(
        &self,
        due_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<CaseRecord>>;

    /// Insert a new case record, returning it with its assigned id
    async fn create(&self, case: &CaseRecord) -> Result<CaseRecord>;

    /// Persist a changed case record
    ///
    /// Implementations stamp `last_updated_at` at write time.
    async fn update(&self, case: &CaseRecord) -> Result<()>;

    /// Fetch one case by id
    async fn find_by_id(&self, id: i64) -> Result<Option<CaseRecord>>;

    /// Append an audit trail entry for a case
    ///
    /// Entries are write-once; nothing in the engine mutates or deletes
    /// them.
    async fn append_log(&self, case_id: i64, text: &str) -> Result<()>;

    /// Read the audit trail for a case, oldest first
    async fn logs(&self, case_id: i64) -> Result<Vec<CaseLogEntry>>;

    /// Case-completion side-effect hook, invoked after a successful
    /// ingestion cycle. Opaque to the engine; the default is a no-op.
    async fn run_algorithms(&self, case: &CaseRecord) -> Result<()> {
        tracing::debug!(case_id = case.id, "No completion algorithms configured");
        Ok(())
    }
}
