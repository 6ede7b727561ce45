//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for caseflow using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Caseflow - clinical registry case polling service
#[derive(Parser, Debug)]
#[command(name = "caseflow")]
#[command(version, about, long_about = None)]
#[command(author = "Caseflow Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "caseflow.toml", env = "CASEFLOW_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CASEFLOW_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the periodic case polling service
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["caseflow", "run"]);
        assert_eq!(cli.config, "caseflow.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["caseflow", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["caseflow", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["caseflow", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["caseflow", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
