use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("DROPWATCH_ENV", "development"));
    let log_level = or_default("DROPWATCH_LOG_LEVEL", "info");
    let monitors_path = PathBuf::from(or_default(
        "DROPWATCH_MONITORS_PATH",
        "./config/monitors.yaml",
    ));
    let targets_path = lookup("DROPWATCH_TARGETS_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    let request_timeout_secs = parse_u64("DROPWATCH_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "DROPWATCH_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let max_concurrent_polls = parse_usize("DROPWATCH_MAX_CONCURRENT_POLLS", "10")?;
    if max_concurrent_polls == 0 {
        return Err(invalid(
            "DROPWATCH_MAX_CONCURRENT_POLLS",
            "must be greater than zero".to_string(),
        ));
    }

    let event_log_capacity = parse_usize("DROPWATCH_EVENT_LOG_CAPACITY", "1000")?;
    if event_log_capacity == 0 {
        return Err(invalid(
            "DROPWATCH_EVENT_LOG_CAPACITY",
            "must be greater than zero".to_string(),
        ));
    }

    let page_delay_ms = parse_u64("DROPWATCH_PAGE_DELAY_MS", "100")?;
    let keyword_delay_ms = parse_u64("DROPWATCH_KEYWORD_DELAY_MS", "500")?;

    let high_profit_threshold = or_default("DROPWATCH_HIGH_PROFIT_THRESHOLD", "100")
        .parse::<f64>()
        .map_err(|e| invalid("DROPWATCH_HIGH_PROFIT_THRESHOLD", e.to_string()))?;

    Ok(AppConfig {
        env,
        log_level,
        monitors_path,
        targets_path,
        request_timeout_secs,
        max_concurrent_polls,
        event_log_capacity,
        page_delay_ms,
        keyword_delay_ms,
        high_profit_threshold,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
