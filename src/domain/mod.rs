//! Domain models and types for caseflow.
//!
//! This module contains the case lifecycle model, the minimal FHIR R4 wire
//! models used by the remote registry protocol, and the error hierarchy.

pub mod case;
pub mod errors;
pub mod fhir;
pub mod result;

pub use case::{CaseLogEntry, CaseRecord, CaseStatus};
pub use errors::{CaseflowError, IngestionError, RegistryError};
pub use result::Result;
