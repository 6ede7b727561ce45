//! Submit-request transition for REQUEST_PENDING and ERROR_IN_SERVER cases

use super::{truncate_for_log, CasePollingEngine};
use crate::adapters::registry::join_endpoint;
use crate::domain::case::{CaseRecord, CaseStatus};
use crate::domain::fhir::{OperationOutcome, Parameters};
use crate::domain::Result;
use chrono::Utc;

impl CasePollingEngine {
    /// Submit a new remote job for a case and record the job handle.
    pub(crate) async fn submit_request(&self, case: &mut CaseRecord) -> Result<()> {
        let now = Utc::now();

        let patient_identifier = match case.patient_identifier.clone() {
            Some(id) if !id.is_empty() => id,
            _ => {
                // Patient identifier is required at case creation; a case
                // without one cannot ever be submitted.
                case.status = CaseStatus::ErrorInClient;
                self.log_case(
                    case,
                    &format!(
                        "case info ({}) without patient identifier. Next State ({})",
                        case.id, case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        let payload = Parameters::new()
            .add_string("patientIdentifier", patient_identifier)
            .add_string("jobPackage", &self.job_package);

        let endpoint = if case.server_url.starts_with("http") {
            case.server_url.clone()
        } else {
            if case.server_host.is_empty() {
                case.status = CaseStatus::ErrorUnknown;
                self.log_case(
                    case,
                    &format!(
                        "server endpoint error: {}{}",
                        case.server_host, case.server_url
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
            join_endpoint(&case.server_host, &case.server_url)
        };

        let response = match self.registry.submit_job(&endpoint, &payload).await {
            Ok(response) => response,
            Err(e) => {
                case.status = CaseStatus::RequestPending;
                case.trigger_at = now + self.policy.retry_backoff;
                self.retry_count_update(case).await?;
                self.log_case(
                    case,
                    &format!(
                        "case info ({}) REQUEST FAILED: {}\n Next State ({})",
                        case.id, e, case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        if response.status.as_u16() == 201 || response.status.as_u16() == 200 {
            let job_id = if response.body.is_empty() {
                None
            } else {
                Parameters::from_json(&response.body)
                    .ok()
                    .and_then(|p| p.string_value("jobId").map(String::from))
            };

            let job_id = match job_id {
                Some(job_id) => job_id,
                None => {
                    case.status = CaseStatus::RequestPending;
                    case.trigger_at = now + self.policy.retry_backoff;
                    self.log_case(
                        case,
                        &format!(
                            "case info ({}) failed to get jobId. Next State ({})",
                            case.id, case.status
                        ),
                    )
                    .await?;
                    self.retry_count_update(case).await?;
                    self.store.update(case).await?;
                    return Ok(());
                }
            };

            match response.location.clone() {
                Some(status_url) => {
                    // We have everything for a running job; poll on the
                    // very next sweep.
                    case.status_url = Some(status_url);
                    case.job_id = Some(job_id);
                    case.case_started_running_at = Some(now);
                    case.status = CaseStatus::Running;
                    case.trigger_at = now;
                    self.log_case(
                        case,
                        &format!("case info ({}) is updated to {}", case.id, case.status),
                    )
                    .await?;
                }
                None => {
                    case.status = CaseStatus::RequestPending;
                    case.trigger_at = now + self.policy.retry_backoff;
                    self.log_case(
                        case,
                        &format!("case info ({}) failed to get status URL", case.id),
                    )
                    .await?;
                    self.retry_count_update(case).await?;
                }
            }

            self.store.update(case).await?;
            return Ok(());
        }

        // Non 2xx. Log any OperationOutcome diagnostics, then classify by
        // status family.
        match OperationOutcome::from_json(&response.body) {
            Ok(oo) if !oo.is_empty() => {
                self.log_case(
                    case,
                    &format!("case info ({}) error response ({})", case.id, oo.issue_codes()),
                )
                .await?;
            }
            _ => {
                self.log_case(
                    case,
                    &format!(
                        "case info ({}) error response ({})\n{}",
                        case.id,
                        response.status,
                        truncate_for_log(&response.body)
                    ),
                )
                .await?;
            }
        }

        if response.is_client_error() {
            case.status = CaseStatus::ErrorInClient;
        } else if response.is_server_error() {
            case.status = CaseStatus::RequestPending;
            case.trigger_at = now + self.policy.retry_backoff;
        } else {
            case.status = CaseStatus::ErrorUnknown;
        }

        self.retry_count_update(case).await?;
        self.store.update(case).await?;
        Ok(())
    }
}
