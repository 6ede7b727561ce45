//! External system adapters
//!
//! Each submodule isolates one outside dependency behind a small trait or
//! client type: the remote registry HTTP API, the case store, result
//! ingestion, and the PostgreSQL backend implementing the latter two.

pub mod ingest;
pub mod postgresql;
pub mod registry;
pub mod store;
