use crate::app_config::{AppConfig, Environment, IdentityConfig};
use crate::ConfigError;

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://sidebar.stract.to/api";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the process environment, so
/// tests can drive it with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let upstream_token = require("ADCSV_UPSTREAM_TOKEN")?;
    let env = parse_environment(&or_default("ADCSV_ENV", "development"))?;

    let bind_addr = parse_addr("ADCSV_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("ADCSV_LOG_LEVEL", "info");

    let upstream_base_url = or_default("ADCSV_UPSTREAM_BASE_URL", DEFAULT_UPSTREAM_BASE_URL);
    if !(upstream_base_url.starts_with("http://") || upstream_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADCSV_UPSTREAM_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got \"{upstream_base_url}\""),
        });
    }

    let upstream_timeout_secs = parse_u64("ADCSV_UPSTREAM_TIMEOUT_SECS", "30")?;
    if upstream_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADCSV_UPSTREAM_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let upstream_user_agent = or_default("ADCSV_UPSTREAM_USER_AGENT", "adcsv/0.1 (insights-export)");
    let upstream_max_pages = parse_u64("ADCSV_UPSTREAM_MAX_PAGES", "500")?;
    if upstream_max_pages == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADCSV_UPSTREAM_MAX_PAGES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let identity = IdentityConfig {
        name: or_default("ADCSV_IDENTITY_NAME", ""),
        email: or_default("ADCSV_IDENTITY_EMAIL", ""),
        linkedin: or_default("ADCSV_IDENTITY_LINKEDIN", ""),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        upstream_base_url,
        upstream_token,
        upstream_timeout_secs,
        upstream_user_agent,
        upstream_max_pages,
        identity,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADCSV_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
