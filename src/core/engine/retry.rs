//! Retry budget bookkeeping

use super::CasePollingEngine;
use crate::domain::case::{CaseRecord, CaseStatus};
use crate::domain::Result;

impl CasePollingEngine {
    /// Decrement the retry budget after a failure.
    ///
    /// Called at the end of every failure path, after the caller has set its
    /// own proposed next status. If the budget before decrementing was
    /// already down to its last try, the case is forced to TIMED_OUT,
    /// overriding whatever status the caller assigned. Exhausting retries
    /// always wins over any other non-terminal classification.
    ///
    /// Returns the remaining count, which never goes below zero.
    pub(crate) async fn retry_count_update(&self, case: &mut CaseRecord) -> Result<i32> {
        let before = case.tries_left;
        case.tries_left = (before - 1).max(0);

        if before <= 1 {
            self.log_case(case, &format!("case info ({}) Request Timed Out", case.id))
                .await?;
            case.status = CaseStatus::TimedOut;
        } else {
            crate::log_retry_attempt!(case.id, case.tries_left, case.status.as_str());
        }

        Ok(case.tries_left)
    }
}
