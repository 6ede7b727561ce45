//! In-memory result ingestion
//!
//! Records ingested resources in memory and reports every entry as created.
//! Used by tests and `store_target = "memory"` smoke runs.

use super::traits::{EntryOutcome, ResultIngestion};
use crate::domain::case::CaseRecord;
use crate::domain::errors::IngestionError;
use crate::domain::fhir::BundleEntry;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// In-memory [`ResultIngestion`] implementation
#[derive(Default)]
pub struct MemoryResultIngestion {
    resources: Mutex<Vec<(i64, Value)>>,
}

impl MemoryResultIngestion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources ingested for a case, in arrival order
    pub fn resources_for(&self, case_id: i64) -> Vec<Value> {
        self.resources
            .lock()
            .map(|r| {
                r.iter()
                    .filter(|(id, _)| *id == case_id)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultIngestion for MemoryResultIngestion {
    async fn create_entries(
        &self,
        entries: &[BundleEntry],
        case: &CaseRecord,
    ) -> Result<Vec<EntryOutcome>, IngestionError> {
        let mut outcomes = Vec::with_capacity(entries.len());
        let mut stored = self
            .resources
            .lock()
            .map_err(|_| IngestionError::Failed("ingestion mutex poisoned".to_string()))?;

        for entry in entries {
            match &entry.resource {
                Some(resource) => {
                    stored.push((case.id, resource.clone()));
                    outcomes.push(EntryOutcome::created(Some(resource.clone())));
                }
                None => outcomes.push(EntryOutcome::failed("400 Bad Request", None)),
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_entries_recorded_per_case() {
        let ingestion = MemoryResultIngestion::new();
        let mut case = CaseRecord::new("MRN|1", 1, "https://host", "/Job", 3);
        case.id = 42;

        let entries = vec![
            BundleEntry {
                resource: Some(json!({"resourceType": "Observation", "id": "o1"})),
                ..Default::default()
            },
            BundleEntry {
                resource: Some(json!({"resourceType": "Condition", "id": "c1"})),
                ..Default::default()
            },
        ];

        let outcomes = ingestion.create_entries(&entries, &case).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(EntryOutcome::is_success));
        assert_eq!(ingestion.resources_for(42).len(), 2);
        assert!(ingestion.resources_for(7).is_empty());
    }

    #[tokio::test]
    async fn test_entry_without_resource_fails() {
        let ingestion = MemoryResultIngestion::new();
        let case = CaseRecord::new("MRN|1", 1, "https://host", "/Job", 3);

        let entries = vec![BundleEntry::default()];
        let outcomes = ingestion.create_entries(&entries, &case).await.unwrap();
        assert!(!outcomes[0].is_success());
    }
}
