//! Result type alias for caseflow

use super::errors::CaseflowError;

/// Standard result type used throughout the crate
pub type Result<T> = std::result::Result<T, CaseflowError>;
