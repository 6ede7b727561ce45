//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CaseflowConfig;
use crate::domain::errors::CaseflowError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CaseflowConfig
/// 4. Applies environment variable overrides (CASEFLOW_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use caseflow::config::loader::load_config;
///
/// let config = load_config("caseflow.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CaseflowConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CaseflowError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CaseflowError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: CaseflowConfig = toml::from_str(&contents)
        .map_err(|e| CaseflowError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config);

    // Validate configuration
    config.validate().map_err(|e| {
        CaseflowError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Don't process env vars in comment lines
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CaseflowError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the CASEFLOW_* prefix
///
/// Environment variables follow the pattern: CASEFLOW_<SECTION>_<KEY>
/// For example: CASEFLOW_REGISTRY_USERNAME, CASEFLOW_SCHEDULER_SWEEP_INTERVAL_SECONDS
fn apply_env_overrides(config: &mut CaseflowConfig) {
    use crate::config::secret::secret_string;

    // Application overrides
    if let Ok(val) = std::env::var("CASEFLOW_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Registry overrides
    if let Ok(val) = std::env::var("CASEFLOW_REGISTRY_USERNAME") {
        config.registry.username = val;
    }
    if let Ok(val) = std::env::var("CASEFLOW_REGISTRY_PASSWORD") {
        config.registry.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("CASEFLOW_REGISTRY_JOB_PACKAGE") {
        config.registry.job_package = val;
    }
    if let Ok(val) = std::env::var("CASEFLOW_REGISTRY_TLS_VERIFY") {
        config.registry.tls_verify = val.parse().unwrap_or(true);
    }

    // Scheduler overrides
    if let Ok(val) = std::env::var("CASEFLOW_SCHEDULER_INITIAL_DELAY_SECONDS") {
        if let Ok(delay) = val.parse() {
            config.scheduler.initial_delay_seconds = delay;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_SCHEDULER_SWEEP_INTERVAL_SECONDS") {
        if let Ok(interval) = val.parse() {
            config.scheduler.sweep_interval_seconds = interval;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_SCHEDULER_MAX_OUTSTANDING_REQUESTS") {
        if let Ok(limit) = val.parse() {
            config.scheduler.max_outstanding_requests = limit;
        }
    }

    // Polling overrides
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_MAX_TRIES") {
        if let Ok(tries) = val.parse() {
            config.polling.max_tries = tries;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_STALL_WINDOW_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.stall_window_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_RETRY_BACKOFF_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.retry_backoff_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_THRESHOLD1_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.threshold1_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_THRESHOLD2_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.threshold2_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_THRESHOLD3_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.threshold3_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_PERIOD1_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.period1_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_PERIOD2_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.period2_seconds = secs;
        }
    }
    if let Ok(val) = std::env::var("CASEFLOW_POLLING_PERIOD3_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.polling.period3_seconds = secs;
        }
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("CASEFLOW_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = val;
        }
        if let Ok(val) = std::env::var("CASEFLOW_POSTGRESQL_MAX_CONNECTIONS") {
            if let Ok(max) = val.parse() {
                pg_config.max_connections = max;
            }
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CASEFLOW_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("CASEFLOW_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
store_target = "memory"

[registry]
username = "caseflow"
password = "pass"
job_package = "syphilis-registry"
"#;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("CASEFLOW_TEST_VAR", "test_value");
        let input = "password = \"${CASEFLOW_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("CASEFLOW_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("CASEFLOW_MISSING_VAR");
        let input = "password = \"${CASEFLOW_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${CASEFLOW_NOT_SET_ANYWHERE}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${CASEFLOW_NOT_SET_ANYWHERE}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_minimal() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL_TOML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.registry.username, "caseflow");
        assert_eq!(config.scheduler.sweep_interval_seconds, 60);
        assert_eq!(config.scheduler.initial_delay_seconds, 30);
        assert_eq!(config.scheduler.max_outstanding_requests, 3);
        assert_eq!(config.polling.max_tries, 3);
    }

    #[test]
    fn test_polling_env_overrides() {
        std::env::set_var("CASEFLOW_POLLING_STALL_WINDOW_SECONDS", "900");
        std::env::set_var("CASEFLOW_POLLING_RETRY_BACKOFF_SECONDS", "3600");

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL_TOML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.polling.stall_window_seconds, 900);
        assert_eq!(config.polling.retry_backoff_seconds, 3600);

        std::env::remove_var("CASEFLOW_POLLING_STALL_WINDOW_SECONDS");
        std::env::remove_var("CASEFLOW_POLLING_RETRY_BACKOFF_SECONDS");
    }

    #[test]
    fn test_load_config_rejects_invalid_policy() {
        let toml_content = format!("{MINIMAL_TOML}\n[polling]\nthreshold1_seconds = 999999999\n");
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }
}
