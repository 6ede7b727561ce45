//! Case polling engine
//!
//! The engine drives each case through its reporting lifecycle: a periodic
//! sweep loads due cases and, depending on status, either polls the remote
//! job or submits a new one. All timing policy (retry backoff, stall window,
//! trigger-interval escalation) is injected at construction; the engine
//! never reads the environment or the clock policy from globals.

mod ingest;
mod poll;
mod retry;
mod scheduler;
mod submit;
mod sweep;

pub use scheduler::run_scheduler;

use crate::adapters::ingest::ResultIngestion;
use crate::adapters::registry::RegistryClient;
use crate::adapters::store::CaseStore;
use crate::config::PollingConfig;
use crate::domain::case::CaseRecord;
use crate::domain::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Remote hint that the job id expired and the package must be resubmitted
const RESUBMIT_HINT: &str = "jobPackage again with a new job id";

/// Cap on response bodies copied into the audit trail
const MAX_LOGGED_BODY: usize = 65_535;

/// Default sweep batch size when the configured limit is not positive
const DEFAULT_OUTSTANDING_REQUESTS: i64 = 3;

/// Immutable timing policy derived from [`PollingConfig`]
///
/// Thresholds are anchored at the case's activation time and compared with
/// strict less-than; the matching period is added to the current time to
/// produce the next trigger.
#[derive(Debug, Clone)]
pub struct PollingPolicy {
    pub max_tries: i32,
    pub stall_window: Duration,
    pub retry_backoff: Duration,
    pub thresholds: [Duration; 3],
    pub periods: [Duration; 3],
}

impl PollingPolicy {
    pub fn from_config(config: &PollingConfig) -> Self {
        Self {
            max_tries: config.max_tries,
            stall_window: Duration::seconds(config.stall_window_seconds as i64),
            retry_backoff: Duration::seconds(config.retry_backoff_seconds as i64),
            thresholds: [
                Duration::seconds(config.threshold1_seconds as i64),
                Duration::seconds(config.threshold2_seconds as i64),
                Duration::seconds(config.threshold3_seconds as i64),
            ],
            periods: [
                Duration::seconds(config.period1_seconds as i64),
                Duration::seconds(config.period2_seconds as i64),
                Duration::seconds(config.period3_seconds as i64),
            ],
        }
    }

    /// Decide the next trigger time after a successful ingestion cycle.
    ///
    /// Compares `now` against the three escalating thresholds anchored at
    /// `activated_at`, in ascending order with strict less-than. When all
    /// thresholds are exceeded the monitoring window is exhausted.
    pub fn next_trigger(
        &self,
        now: DateTime<Utc>,
        activated_at: DateTime<Utc>,
    ) -> ScheduleDecision {
        for (threshold, period) in self.thresholds.iter().zip(self.periods.iter()) {
            if now < activated_at + *threshold {
                return ScheduleDecision::NextTrigger(now + *period);
            }
        }
        ScheduleDecision::MonitoringExhausted
    }

    /// Whether a RUNNING case has stalled past the stall window.
    ///
    /// A case with no recorded start time counts as stalled; there is
    /// nothing to anchor the window on, so polling it forever would never
    /// terminate.
    pub fn is_stalled(&self, now: DateTime<Utc>, started_at: Option<DateTime<Utc>>) -> bool {
        match started_at {
            Some(started) => now >= started + self.stall_window,
            None => true,
        }
    }
}

/// Outcome of the trigger-escalation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// Keep monitoring; act again at this time
    NextTrigger(DateTime<Utc>),
    /// All thresholds exceeded; the case is done
    MonitoringExhausted,
}

/// The periodic case polling engine
///
/// Owns all case mutations after creation. Collaborators are injected so
/// tests can run against the in-memory store and a mock HTTP server.
pub struct CasePollingEngine {
    store: Arc<dyn CaseStore>,
    ingestion: Arc<dyn ResultIngestion>,
    registry: RegistryClient,
    job_package: String,
    policy: PollingPolicy,
    max_outstanding_requests: i64,
}

impl CasePollingEngine {
    pub fn new(
        store: Arc<dyn CaseStore>,
        ingestion: Arc<dyn ResultIngestion>,
        registry: RegistryClient,
        job_package: impl Into<String>,
        policy: PollingPolicy,
        max_outstanding_requests: i64,
    ) -> Self {
        Self {
            store,
            ingestion,
            registry,
            job_package: job_package.into(),
            policy,
            max_outstanding_requests,
        }
    }

    /// Sweep batch size, with non-positive configured values falling back
    /// to the default of 3
    pub(crate) fn sweep_limit(&self) -> i64 {
        if self.max_outstanding_requests <= 0 {
            DEFAULT_OUTSTANDING_REQUESTS
        } else {
            self.max_outstanding_requests
        }
    }

    /// Append an audit trail entry for a case
    pub(crate) async fn log_case(&self, case: &CaseRecord, text: &str) -> Result<()> {
        tracing::debug!(case_id = case.id, status = %case.status, "{}", text);
        self.store.append_log(case.id, text).await
    }
}

/// Clip a response body for inclusion in an audit log entry
pub(crate) fn truncate_for_log(body: &str) -> &str {
    if body.len() <= MAX_LOGGED_BODY {
        return body;
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
