// Caseflow - Clinical Registry Case Polling Service
// Copyright (c) 2026 Caseflow Contributors
// Licensed under the MIT License

//! # Caseflow - Clinical Registry Case Polling Service
//!
//! Caseflow drives disease-registry cases through an asynchronous reporting
//! workflow against a remote FHIR job-processing API: it submits query jobs,
//! polls their status, ingests completed result bundles into a local store,
//! and schedules each case's next cycle with an escalating trigger interval.
//!
//! ## Architecture
//!
//! Caseflow follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The case polling engine and sweep scheduler
//! - [`adapters`] - External integrations (remote registry, case store, ingestion)
//! - [`domain`] - Core domain types: case lifecycle, FHIR wire models, errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Case lifecycle
//!
//! A case is created in `REQUEST_PENDING` and thereafter owned by the
//! engine. Each periodic sweep selects due cases and advances them:
//!
//! - `REQUEST_PENDING` / `ERROR_IN_SERVER`: submit a new remote job; on
//!   success the case becomes `RUNNING` with a job id and status URL.
//! - `RUNNING`: poll the job. `inProgress` is retried until a stall window
//!   elapses (then `PAUSED`); `complete` hands the result bundle to
//!   ingestion, resets the retry budget, and schedules the next cycle.
//! - Failures decrement a retry budget; exhausting it forces `TIMED_OUT`.
//!   When the monitoring window anchored at activation runs out, the case
//!   ends (`END`).
//!
//! Every transition appends an audit log entry, so a case's history can be
//! reconstructed from its log alone.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use caseflow::adapters::ingest::MemoryResultIngestion;
//! use caseflow::adapters::registry::RegistryClient;
//! use caseflow::adapters::store::MemoryCaseStore;
//! use caseflow::config::load_config;
//! use caseflow::core::engine::{CasePollingEngine, PollingPolicy};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("caseflow.toml")?;
//!
//!     let engine = CasePollingEngine::new(
//!         Arc::new(MemoryCaseStore::new()),
//!         Arc::new(MemoryResultIngestion::new()),
//!         RegistryClient::new(&config.registry)?,
//!         config.registry.job_package.clone(),
//!         PollingPolicy::from_config(&config.polling),
//!         config.scheduler.max_outstanding_requests,
//!     );
//!
//!     engine.run_sweep().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Caseflow uses the [`domain::CaseflowError`] type for all errors:
//!
//! ```rust,no_run
//! use caseflow::domain::CaseflowError;
//!
//! fn example() -> Result<(), CaseflowError> {
//!     let config = caseflow::config::load_config("caseflow.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
