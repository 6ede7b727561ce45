//! Ingestion-and-reschedule step for completed jobs

use super::{CasePollingEngine, ScheduleDecision};
use crate::domain::case::{CaseRecord, CaseStatus};
use crate::domain::errors::IngestionError;
use crate::domain::fhir::Bundle;
use crate::domain::Result;
use chrono::{Duration, Utc};
use rand::Rng;

impl CasePollingEngine {
    /// Persist a completed job's result bundle and schedule the next cycle.
    ///
    /// A wholesale ingestion failure halts the case unless it was a store
    /// timeout, which is retried with a randomized backoff. Per-entry
    /// failures halt the case for operator review; ingestion is not
    /// idempotent enough to replay automatically.
    pub(crate) async fn ingest_and_reschedule(
        &self,
        case: &mut CaseRecord,
        bundle: Bundle,
    ) -> Result<()> {
        let now = Utc::now();

        let outcomes = match self.ingestion.create_entries(&bundle.entry, case).await {
            Ok(outcomes) => outcomes,
            Err(IngestionError::Timeout(message)) => {
                // Spread retries over 2-12 hours so stuck cases don't all
                // come back at once.
                let hours = rand::thread_rng().gen_range(2..=12);
                case.trigger_at = now + Duration::hours(hours);
                case.status = CaseStatus::RequestPending;
                self.log_case(
                    case,
                    &format!(
                        "Store timed out while creating result entries: {message}\n Next State ({})",
                        case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
            Err(IngestionError::Failed(message)) => {
                case.status = CaseStatus::ErrorInClient;
                self.log_case(
                    case,
                    &format!(
                        "Error occurred while creating result entries: {message}\n Next State ({})",
                        case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        let mut failure_message = String::new();
        for outcome in &outcomes {
            if !outcome.is_success() {
                let resource = outcome
                    .resource
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                failure_message.push_str(&format!("Failed to create/add {resource}"));
            }
        }

        if !failure_message.is_empty() {
            tracing::error!(case_id = case.id, "{}", failure_message);
            self.log_case(case, &failure_message).await?;
            case.status = CaseStatus::ErrorUnknown;
            self.store.update(case).await?;
            return Ok(());
        }

        // All entries stored; clear retry debt and schedule the next cycle.
        case.last_successful_at = Some(now);
        case.status = CaseStatus::RequestPending;

        match self.policy.next_trigger(now, case.activated_at) {
            ScheduleDecision::NextTrigger(trigger_at) => {
                case.trigger_at = trigger_at;
            }
            ScheduleDecision::MonitoringExhausted => {
                case.status = CaseStatus::End;
                self.log_case(
                    case,
                    &format!("case info ({}) changed status to {}", case.id, case.status),
                )
                .await?;
            }
        }

        if case.status == CaseStatus::End {
            self.log_case(
                case,
                &format!("case info ({}) query successful. And case becomes END", case.id),
            )
            .await?;
        } else {
            self.log_case(
                case,
                &format!(
                    "case info ({}) query successful. Next trigger at {}",
                    case.id, case.trigger_at
                ),
            )
            .await?;
        }

        case.tries_left = self.policy.max_tries;

        self.store.run_algorithms(case).await?;
        self.store.update(case).await?;
        Ok(())
    }
}
