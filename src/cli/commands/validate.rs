//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the caseflow configuration file.

use crate::config::{load_config, StoreTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config substitutes env vars and validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Registry Username: {}", config.registry.username);
        println!("  Job Package: {}", config.registry.job_package);
        println!("  Request Timeout: {}s", config.registry.timeout_seconds);
        println!("  Initial Delay: {}s", config.scheduler.initial_delay_seconds);
        println!("  Sweep Interval: {}s", config.scheduler.sweep_interval_seconds);
        println!(
            "  Max Outstanding Requests: {}",
            config.scheduler.max_outstanding_requests
        );
        println!("  Max Tries: {}", config.polling.max_tries);
        println!(
            "  Escalation Thresholds: {}s / {}s / {}s",
            config.polling.threshold1_seconds,
            config.polling.threshold2_seconds,
            config.polling.threshold3_seconds
        );
        println!(
            "  Trigger Periods: {}s / {}s / {}s",
            config.polling.period1_seconds,
            config.polling.period2_seconds,
            config.polling.period3_seconds
        );

        match config.store_target {
            StoreTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    println!("  Store Target: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        pg_config
                            .connection_string
                            .split('@')
                            .next_back()
                            .unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
            StoreTarget::Memory => {
                println!("  Store Target: Memory (non-durable)");
            }
        }

        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
