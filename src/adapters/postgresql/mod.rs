//! PostgreSQL adapter
//!
//! Durable backend for the case store and result ingestion, built on
//! tokio-postgres with deadpool connection pooling. The schema lives in
//! `migrations/` and is bootstrapped on startup.

pub mod client;
pub mod ingest;
pub mod store;

pub use client::PostgreSQLClient;
pub use ingest::PostgresResultIngestion;
pub use store::PostgresCaseStore;
