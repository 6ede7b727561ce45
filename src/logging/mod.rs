//! Logging and observability
//!
//! Structured logging with JSON-formatted file output, configurable log
//! levels, and local file rotation.
//!
//! # Example
//!
//! ```no_run
//! use caseflow::logging::init_logging;
//! use caseflow::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a case state transition
///
/// # Example
///
/// ```no_run
/// use caseflow::log_case_transition;
///
/// log_case_transition!(42, "RUNNING", "PAUSED");
/// ```
#[macro_export]
macro_rules! log_case_transition {
    ($case_id:expr, $from:expr, $to:expr) => {
        tracing::info!(
            case_id = $case_id,
            from = %$from,
            to = %$to,
            "Case transition"
        );
    };
}

/// Log a retry attempt with the remaining budget
///
/// # Example
///
/// ```no_run
/// use caseflow::log_retry_attempt;
///
/// log_retry_attempt!(42, 2, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($case_id:expr, $tries_left:expr, $reason:expr) => {
        tracing::warn!(
            case_id = $case_id,
            tries_left = $tries_left,
            reason = $reason,
            "Retrying case"
        );
    };
}
