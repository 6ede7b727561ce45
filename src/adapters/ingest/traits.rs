//! Result ingestion abstraction

use crate::domain::case::CaseRecord;
use crate::domain::errors::IngestionError;
use crate::domain::fhir::BundleEntry;
use async_trait::async_trait;
use serde_json::Value;

/// Per-entry ingestion outcome
///
/// `status` mirrors a FHIR bundle response status: an HTTP status code
/// optionally followed by a reason phrase, e.g. "201 Created" or
/// "400 Bad Request".
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub status: String,
    pub resource: Option<Value>,
}

impl EntryOutcome {
    pub fn created(resource: Option<Value>) -> Self {
        Self {
            status: "201 Created".to_string(),
            resource,
        }
    }

    pub fn failed(status: impl Into<String>, resource: Option<Value>) -> Self {
        Self {
            status: status.into(),
            resource,
        }
    }

    /// Whether this entry was stored successfully (200 or 201)
    pub fn is_success(&self) -> bool {
        self.status.starts_with("201") || self.status.starts_with("200")
    }
}

/// Persists result bundle entries into the local data store
#[async_trait]
pub trait ResultIngestion: Send + Sync {
    /// Persist the given bundle entries for a case
    ///
    /// Returns one outcome per input entry, in order.
    ///
    /// # Errors
    ///
    /// An `Err` means the ingestion as a whole failed (e.g. the store is
    /// unreachable); per-entry failures are reported through the outcome
    /// statuses instead. [`IngestionError::Timeout`] is retried by the
    /// engine with a randomized backoff; anything else halts the case.
    async fn create_entries(
        &self,
        entries: &[BundleEntry],
        case: &CaseRecord,
    ) -> Result<Vec<EntryOutcome>, IngestionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_success_detection() {
        assert!(EntryOutcome::created(None).is_success());
        assert!(EntryOutcome::failed("200 OK", None).is_success());
        assert!(!EntryOutcome::failed("400 Bad Request", None).is_success());
        assert!(!EntryOutcome::failed("500 Internal Server Error", None).is_success());
    }
}
