//! Result ingestion
//!
//! When a remote job completes, its result Bundle is handed to a
//! [`ResultIngestion`] implementation for local persistence. Each input
//! entry produces one [`EntryOutcome`] with an HTTP-like status string; the
//! polling engine inspects those statuses to decide whether the cycle
//! succeeded. Mapping resource contents into the clinical data model is the
//! implementation's concern, not the engine's.

pub mod memory;
pub mod traits;

pub use memory::MemoryResultIngestion;
pub use traits::{EntryOutcome, ResultIngestion};
