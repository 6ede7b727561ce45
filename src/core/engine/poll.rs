//! Status-poll transition for RUNNING cases

use super::{truncate_for_log, CasePollingEngine, RESUBMIT_HINT};
use crate::adapters::registry::join_endpoint;
use crate::domain::case::{CaseRecord, CaseStatus};
use crate::domain::fhir::{OperationOutcome, Parameters};
use crate::domain::Result;
use chrono::Utc;

impl CasePollingEngine {
    /// Poll the remote job for a RUNNING case and advance it accordingly.
    ///
    /// HTTP error statuses are classified into case transitions here; the
    /// registry client only fails on transport-level problems.
    pub(crate) async fn poll_running_case(&self, case: &mut CaseRecord) -> Result<()> {
        let now = Utc::now();

        let status_url = match case.status_url.clone() {
            Some(url) => url,
            None => {
                // A RUNNING case always has a status URL from its
                // submission; without one the poll cannot be resolved.
                case.status = CaseStatus::ErrorUnknown;
                self.log_case(
                    case,
                    &format!(
                        "case info ({}) has no status URL. Next State ({})",
                        case.id, case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        let endpoint = if status_url.starts_with("http") {
            status_url
        } else {
            join_endpoint(&case.server_host, &status_url)
        };

        let response = match self.registry.poll_job_status(&endpoint).await {
            Ok(response) => response,
            Err(e) => {
                case.status = CaseStatus::ErrorUnknown;
                self.log_case(
                    case,
                    &format!(
                        "case info ({}) STATUS GET FAILED: {}\n Next State ({})",
                        case.id, e, case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        if response.is_client_error() {
            // A 404 with a code-invalid error issue, or the remote's
            // resubmit hint, means the job id expired; restart the case.
            let job_id_invalid = OperationOutcome::from_json(&response.body)
                .map(|oo| oo.has_issue("error", "code-invalid"))
                .unwrap_or(false);

            if (response.status.as_u16() == 404 && job_id_invalid)
                || response.body.contains(RESUBMIT_HINT)
            {
                case.status = CaseStatus::RequestPending;
            } else {
                case.status = CaseStatus::ErrorInClient;
            }

            self.log_case(
                case,
                &format!(
                    "case info ({}) STATUS GET FAILED: {}\n{}\n Next State ({})",
                    case.id,
                    response.status,
                    truncate_for_log(&response.body),
                    case.status
                ),
            )
            .await?;
            self.retry_count_update(case).await?;
            self.store.update(case).await?;
            return Ok(());
        }

        if response.is_server_error() {
            case.status = CaseStatus::ErrorInServer;
            case.trigger_at = now + self.policy.retry_backoff;
            self.log_case(
                case,
                &format!(
                    "case info ({}) SERVER ERROR: {}\n{}\n Next State ({})",
                    case.id,
                    response.status,
                    truncate_for_log(&response.body),
                    case.status
                ),
            )
            .await?;
            self.retry_count_update(case).await?;
            self.store.update(case).await?;
            return Ok(());
        }

        if !response.is_success() {
            case.status = CaseStatus::ErrorUnknown;
            self.log_case(
                case,
                &format!(
                    "case info ({}) STATUS GET FAILED with unrecognized status {}\n{}\n Next State ({})",
                    case.id,
                    response.status,
                    truncate_for_log(&response.body),
                    case.status
                ),
            )
            .await?;
            self.store.update(case).await?;
            return Ok(());
        }

        // 2xx: the body is a Parameters resource carrying jobStatus and,
        // once complete, the result bundle.
        let parameters = match Parameters::from_json(&response.body) {
            Ok(parameters) if !parameters.is_empty() => parameters,
            Ok(_) | Err(_) => {
                case.status = CaseStatus::ResultParseError;
                self.log_case(
                    case,
                    &format!(
                        "case info ({}) Response Parameter Parse Error\n Next State ({}). {}",
                        case.id,
                        case.status,
                        truncate_for_log(&response.body)
                    ),
                )
                .await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        let job_status = match parameters.string_value("jobStatus") {
            Some(value) => value.to_string(),
            None => {
                self.log_case(case, "Remote jobStatus is null or empty").await?;
                case.status = CaseStatus::ErrorInServer;
                case.trigger_at = now + self.policy.retry_backoff;
                self.retry_count_update(case).await?;
                self.store.update(case).await?;
                return Ok(());
            }
        };

        if job_status.eq_ignore_ascii_case("inProgress") {
            if self.policy.is_stalled(now, case.case_started_running_at) {
                case.status = CaseStatus::Paused;
                self.log_case(
                    case,
                    &format!(
                        "Remote jobStatus: {job_status}. Will pause, took too long. Next State: {}",
                        case.status
                    ),
                )
                .await?;
                self.store.update(case).await?;
            } else {
                // Fresh job still running; leave status and trigger alone
                // and let the next sweep poll again.
                self.log_case(
                    case,
                    &format!(
                        "Remote jobStatus: {job_status}. Will try again. Next State: {}",
                        case.status
                    ),
                )
                .await?;
            }
            return Ok(());
        }

        if !job_status.eq_ignore_ascii_case("complete") {
            self.log_case(
                case,
                &format!("Remote jobStatus: {job_status} is not recognized"),
            )
            .await?;
            case.status = CaseStatus::ErrorInServer;
            case.trigger_at = now + self.policy.retry_backoff;
            self.retry_count_update(case).await?;
            self.store.update(case).await?;
            return Ok(());
        }

        // complete: hand the embedded result bundle to ingestion. A missing
        // result parameter means nothing to ingest this cycle.
        match parameters.bundle_resource("result") {
            Some(bundle) => self.ingest_and_reschedule(case, bundle).await,
            None => Ok(()),
        }
    }
}
