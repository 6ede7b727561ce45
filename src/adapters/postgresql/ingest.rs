//! PostgreSQL result ingestion
//!
//! Stores result bundle entries as JSONB rows keyed by case. A statement
//! timeout during ingestion surfaces as [`IngestionError::Timeout`] so the
//! engine reschedules the case instead of halting it.

use super::client::{is_timeout_error, PostgreSQLClient};
use crate::adapters::ingest::{EntryOutcome, ResultIngestion};
use crate::domain::case::CaseRecord;
use crate::domain::errors::IngestionError;
use crate::domain::fhir::BundleEntry;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// Persists result bundle entries into the `result_resource` table
pub struct PostgresResultIngestion {
    client: Arc<PostgreSQLClient>,
}

impl PostgresResultIngestion {
    pub fn new(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResultIngestion for PostgresResultIngestion {
    async fn create_entries(
        &self,
        entries: &[BundleEntry],
        case: &CaseRecord,
    ) -> Result<Vec<EntryOutcome>, IngestionError> {
        let mut outcomes = Vec::with_capacity(entries.len());

        for entry in entries {
            let resource = match &entry.resource {
                Some(resource) => resource,
                None => {
                    outcomes.push(EntryOutcome::failed("400 Bad Request", None));
                    continue;
                }
            };

            let resource_type = entry.resource_type();
            let result = self
                .client
                .execute(
                    "INSERT INTO result_resource (case_info_id, resource_type, resource, created) \
                     VALUES ($1, $2, $3, $4)",
                    &[&case.id, &resource_type, &resource, &Utc::now()],
                )
                .await;

            match result {
                Ok(_) => outcomes.push(EntryOutcome::created(Some(resource.clone()))),
                Err(e) => {
                    let message = e.to_string();
                    if is_timeout_error(&message) {
                        return Err(IngestionError::Timeout(message));
                    }
                    return Err(IngestionError::Failed(message));
                }
            }
        }

        Ok(outcomes)
    }
}
