//! Periodic sweep driver

use super::CasePollingEngine;
use crate::domain::case::{CaseRecord, CaseStatus};
use crate::domain::Result;
use chrono::Utc;

impl CasePollingEngine {
    /// Run one sweep over all due cases.
    ///
    /// Selects at most the configured number of due cases and drives each
    /// one by status. A store failure on selection skips the sweep until
    /// the next tick. A failure while processing an individual case aborts
    /// the remainder of the sweep; the failing case's partial state stays
    /// persisted and the untouched cases are picked up next tick.
    pub async fn run_sweep(&self) {
        let now = Utc::now();
        let limit = self.sweep_limit();

        let cases = match self.store.search_due(now, limit).await {
            Ok(cases) => cases,
            Err(e) => {
                tracing::warn!(error = %e, "Case selection failed, skipping sweep");
                return;
            }
        };

        if cases.is_empty() {
            tracing::debug!("No due cases");
            return;
        }

        tracing::info!(count = cases.len(), "Sweeping due cases");

        for mut case in cases {
            if let Err(e) = self.process_case(&mut case).await {
                tracing::error!(
                    case_id = case.id,
                    error = %e,
                    "Case processing failed, aborting sweep"
                );
                return;
            }
        }
    }

    /// Dispatch one case to its transition by status.
    pub(crate) async fn process_case(&self, case: &mut CaseRecord) -> Result<()> {
        tracing::debug!(case_id = case.id, status = %case.status, "Processing case");
        let previous = case.status;

        let result = match case.status {
            CaseStatus::Running => self.poll_running_case(case).await,
            CaseStatus::RequestPending | CaseStatus::ErrorInServer => {
                self.submit_request(case).await
            }
            // The selection filter excludes everything else; a case slipping
            // through is left untouched.
            _ => {
                tracing::warn!(
                    case_id = case.id,
                    status = %case.status,
                    "Case with non-actionable status selected, ignoring"
                );
                Ok(())
            }
        };

        if result.is_ok() && case.status != previous {
            crate::log_case_transition!(case.id, previous, case.status);
        }

        result
    }
}
