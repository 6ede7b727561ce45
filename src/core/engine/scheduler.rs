//! Sweep scheduling loop

use super::CasePollingEngine;
use crate::config::SchedulerConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Run the periodic sweep until shutdown is signalled.
///
/// Sweeps never overlap: each tick awaits the sweep to completion before
/// the next can fire, and a tick missed while a sweep was still running is
/// delayed rather than bursted.
pub async fn run_scheduler(
    engine: Arc<CasePollingEngine>,
    config: &SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let start = Instant::now() + Duration::from_secs(config.initial_delay_seconds);
    let mut ticker = interval_at(start, Duration::from_secs(config.sweep_interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        initial_delay_seconds = config.initial_delay_seconds,
        sweep_interval_seconds = config.sweep_interval_seconds,
        "Polling scheduler started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.run_sweep().await;
            }
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    tracing::info!("Polling scheduler stopped");
}
