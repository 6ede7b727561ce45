//! Remote registry HTTP adapter
//!
//! This module provides the client for the remote registry job-processing
//! API: a submission POST that creates an asynchronous query job and a
//! status-check GET that reports job progress and, on completion, carries
//! the result bundle.

pub mod client;

pub use client::{join_endpoint, RegistryClient, RegistryResponse};
