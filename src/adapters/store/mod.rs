//! Case record store
//!
//! Durable storage for case records and their append-only audit trail.
//! The polling engine consumes the [`CaseStore`] trait; backends live in
//! [`crate::adapters::postgresql`] (durable) and [`memory`] (tests and
//! smoke runs).

pub mod memory;
pub mod traits;

pub use memory::MemoryCaseStore;
pub use traits::CaseStore;
