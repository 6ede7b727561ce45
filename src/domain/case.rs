//! Case lifecycle model
//!
//! A [`CaseRecord`] tracks one registry case across its reporting lifecycle.
//! The polling engine is the sole mutator of a case once it has been created;
//! every transition appends a [`CaseLogEntry`] so the full history can be
//! reconstructed from the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a registry case
///
/// This is a closed set: status strings coming from storage that don't match
/// a known variant decode to [`CaseStatus::Invalid`], which is excluded from
/// polling and requires an operator to re-trigger the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    /// A remote job exists and is being polled for results
    Running,
    /// Active monitoring period exhausted; terminal
    End,
    /// A new remote job submission is due
    RequestPending,
    /// Retry budget exhausted; terminal until manually reset
    TimedOut,
    /// Remote job stalled past the stall window; polling suspended
    Paused,
    /// Client-side error; halted until operator action
    ErrorInClient,
    /// Server-side error; eligible for resubmission
    ErrorInServer,
    /// Response body could not be parsed; terminal
    ResultParseError,
    /// Unclassified error (e.g. partial ingestion failure); terminal
    ErrorUnknown,
    /// Unrecognized stored status; requires re-trigger with a valid status
    Invalid,
}

impl CaseStatus {
    /// Statuses excluded from the periodic polling sweep.
    ///
    /// Terminal states plus states requiring manual intervention. Everything
    /// else (RUNNING, REQUEST_PENDING, ERROR_IN_SERVER) is actively driven
    /// by the engine.
    pub const EXCLUDED_FROM_POLLING: [CaseStatus; 7] = [
        CaseStatus::End,
        CaseStatus::TimedOut,
        CaseStatus::Paused,
        CaseStatus::ErrorInClient,
        CaseStatus::ResultParseError,
        CaseStatus::ErrorUnknown,
        CaseStatus::Invalid,
    ];

    /// Storage/wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Running => "RUNNING",
            CaseStatus::End => "END",
            CaseStatus::RequestPending => "REQUEST_PENDING",
            CaseStatus::TimedOut => "TIMED_OUT",
            CaseStatus::Paused => "PAUSED",
            CaseStatus::ErrorInClient => "ERROR_IN_CLIENT",
            CaseStatus::ErrorInServer => "ERROR_IN_SERVER",
            CaseStatus::ResultParseError => "RESULT_PARSE_ERROR",
            CaseStatus::ErrorUnknown => "ERROR_UNKNOWN",
            CaseStatus::Invalid => "INVALID",
        }
    }

    /// Decode a stored status string; unknown values become `Invalid`
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "RUNNING" => CaseStatus::Running,
            "END" => CaseStatus::End,
            "REQUEST_PENDING" => CaseStatus::RequestPending,
            "TIMED_OUT" => CaseStatus::TimedOut,
            "PAUSED" => CaseStatus::Paused,
            "ERROR_IN_CLIENT" => CaseStatus::ErrorInClient,
            "ERROR_IN_SERVER" => CaseStatus::ErrorInServer,
            "RESULT_PARSE_ERROR" => CaseStatus::ResultParseError,
            "ERROR_UNKNOWN" => CaseStatus::ErrorUnknown,
            _ => CaseStatus::Invalid,
        }
    }

    /// Whether the periodic sweep may act on a case in this status
    pub fn is_pollable(&self) -> bool {
        !Self::EXCLUDED_FROM_POLLING.contains(self)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registry case tracked through the external reporting workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Durable store key
    pub id: i64,

    /// Identifier used to query the remote registry for this patient.
    /// Required in practice; kept optional so a corrupt record degrades to
    /// ERROR_IN_CLIENT instead of panicking the sweep.
    pub patient_identifier: Option<String>,

    /// Reference to the local person record this case belongs to
    pub person_id: i64,

    /// Remote job identifier; set once a submission succeeds
    pub job_id: Option<String>,

    /// Current lifecycle status
    pub status: CaseStatus,

    /// Base host of the remote registry server
    pub server_host: String,

    /// Submission endpoint (absolute, or relative to `server_host`)
    pub server_url: String,

    /// Job status endpoint returned by the last successful submission
    pub status_url: Option<String>,

    /// Earliest time the engine may act on this case again
    pub trigger_at: DateTime<Utc>,

    /// Time the case record was created
    pub created_at: DateTime<Utc>,

    /// Time the case entered active monitoring; anchor for the
    /// threshold-based trigger-interval escalation
    pub activated_at: DateTime<Utc>,

    /// Last time the engine persisted a change to this case
    pub last_updated_at: Option<DateTime<Utc>>,

    /// Last time a result bundle was ingested successfully
    pub last_successful_at: Option<DateTime<Utc>>,

    /// Remaining retry budget; decremented on failure, reset on success
    pub tries_left: i32,

    /// When the current RUNNING attempt began; used for stall detection
    pub case_started_running_at: Option<DateTime<Utc>>,
}

impl CaseRecord {
    /// Create a new case in REQUEST_PENDING status, due immediately.
    ///
    /// The store assigns the durable id on insert; until then the id is 0.
    pub fn new(
        patient_identifier: impl Into<String>,
        person_id: i64,
        server_host: impl Into<String>,
        server_url: impl Into<String>,
        tries_left: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            patient_identifier: Some(patient_identifier.into()),
            person_id,
            job_id: None,
            status: CaseStatus::RequestPending,
            server_host: server_host.into(),
            server_url: server_url.into(),
            status_url: None,
            trigger_at: now,
            created_at: now,
            activated_at: now,
            last_updated_at: None,
            last_successful_at: None,
            tries_left,
            case_started_running_at: None,
        }
    }
}

/// Append-only audit trail entry for a case
///
/// Created by the engine on every state transition and error; never mutated
/// or deleted. This is the only operator-visible failure surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseLogEntry {
    pub id: i64,
    pub case_id: i64,
    pub logged_at: DateTime<Utc>,
    pub text: String,
}
