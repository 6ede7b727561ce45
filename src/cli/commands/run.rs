//! Run command implementation
//!
//! This module implements the `run` command: the long-running case polling
//! service that periodically sweeps due cases against the remote registry.

use crate::adapters::ingest::{MemoryResultIngestion, ResultIngestion};
use crate::adapters::postgresql::{PostgreSQLClient, PostgresCaseStore, PostgresResultIngestion};
use crate::adapters::registry::RegistryClient;
use crate::adapters::store::{CaseStore, MemoryCaseStore};
use crate::config::{load_config, StoreTarget};
use crate::core::engine::{run_scheduler, CasePollingEngine, PollingPolicy};
use crate::logging::init_logging;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Skip the initial startup delay and sweep immediately
    #[arg(long)]
    pub no_initial_delay: bool,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        log_level: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = load_config(config_path)?;

        let level = log_level.unwrap_or(&config.application.log_level).to_string();
        let _guard = init_logging(&level, &config.logging)?;

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            config_path = %config_path,
            "Caseflow - clinical registry case polling service"
        );

        if self.no_initial_delay {
            config.scheduler.initial_delay_seconds = 0;
        }

        let (store, ingestion): (Arc<dyn CaseStore>, Arc<dyn ResultIngestion>) =
            match config.store_target {
                StoreTarget::PostgreSQL => {
                    let pg_config = config.postgresql.clone().ok_or_else(|| {
                        anyhow::anyhow!("postgresql configuration missing")
                    })?;
                    let client = Arc::new(PostgreSQLClient::new(pg_config)?);

                    tracing::info!(
                        connection = %client.connection_string_safe(),
                        "Connecting to PostgreSQL"
                    );
                    client.test_connection().await?;
                    client.ensure_schema().await?;

                    (
                        Arc::new(PostgresCaseStore::new(client.clone())),
                        Arc::new(PostgresResultIngestion::new(client)),
                    )
                }
                StoreTarget::Memory => {
                    tracing::warn!("Using the in-memory store; cases will not survive a restart");
                    (
                        Arc::new(MemoryCaseStore::new()),
                        Arc::new(MemoryResultIngestion::new()),
                    )
                }
            };

        let registry = RegistryClient::new(&config.registry)?;
        let policy = PollingPolicy::from_config(&config.polling);

        let engine = Arc::new(CasePollingEngine::new(
            store,
            ingestion,
            registry,
            config.registry.job_package.clone(),
            policy,
            config.scheduler.max_outstanding_requests,
        ));

        run_scheduler(engine, &config.scheduler, shutdown_signal).await;

        tracing::info!("Caseflow stopped");
        Ok(0)
    }
}
