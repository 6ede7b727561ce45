//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types, so the
//! HTTP client or the database driver can change without touching callers.

use thiserror::Error;

/// Main caseflow error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CaseflowError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote registry API errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Result ingestion errors
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    /// Case store / database errors
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Remote registry API errors
///
/// Errors raised by the HTTP client talking to the remote registry. Only
/// transport-level failures surface here; HTTP error statuses are returned
/// as ordinary responses so the polling engine can classify them.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Network-level failure (connect, timeout, TLS, body read)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The request could not be constructed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result ingestion errors
///
/// Raised when the ingestion collaborator fails outright, as opposed to
/// returning per-entry failure outcomes. Timeouts are distinguished because
/// the engine reschedules them instead of halting the case.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The backing store timed out; the case will be rescheduled
    #[error("Ingestion timed out: {0}")]
    Timeout(String),

    /// Any other ingestion failure; the case is halted for operator review
    #[error("Ingestion failed: {0}")]
    Failed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for CaseflowError {
    fn from(err: std::io::Error) -> Self {
        CaseflowError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CaseflowError {
    fn from(err: serde_json::Error) -> Self {
        CaseflowError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CaseflowError {
    fn from(err: toml::de::Error) -> Self {
        CaseflowError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caseflow_error_display() {
        let err = CaseflowError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_registry_error_conversion() {
        let reg_err = RegistryError::Transport("connection refused".to_string());
        let err: CaseflowError = reg_err.into();
        assert!(matches!(err, CaseflowError::Registry(_)));
    }

    #[test]
    fn test_ingestion_error_conversion() {
        let ing_err = IngestionError::Timeout("statement timeout".to_string());
        let err: CaseflowError = ing_err.into();
        assert!(matches!(err, CaseflowError::Ingestion(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CaseflowError = io_err.into();
        assert!(matches!(err, CaseflowError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CaseflowError = json_err.into();
        assert!(matches!(err, CaseflowError::Serialization(_)));
    }

    #[test]
    fn test_caseflow_error_implements_std_error() {
        let err = CaseflowError::Store("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
