use crate::app_config::{AppConfig, RetryBackoff};
use crate::ConfigError;

pub const DEFAULT_CATALOG_BASE_URL: &str = "https://tcgcsv.com/tcgplayer/3";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let catalog_base_url = or_default("POKEBINDER_CATALOG_BASE_URL", DEFAULT_CATALOG_BASE_URL);
    if !(catalog_base_url.starts_with("http://") || catalog_base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "POKEBINDER_CATALOG_BASE_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{catalog_base_url}'"),
        });
    }

    let output_dir = PathBuf::from(or_default("POKEBINDER_OUTPUT_DIR", "./data/sets"));
    let aggregate_path = PathBuf::from(or_default(
        "POKEBINDER_AGGREGATE_PATH",
        "./data/all-cards.json",
    ));
    let log_level = or_default("POKEBINDER_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("POKEBINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("POKEBINDER_USER_AGENT", "pokebinder-sync/0.1 (catalog-sync)");
    let max_retries = parse_u32("POKEBINDER_MAX_RETRIES", "3")?;
    let retry_delay_ms = parse_u64("POKEBINDER_RETRY_DELAY_MS", "1000")?;
    let retry_backoff = match or_default("POKEBINDER_RETRY_BACKOFF", "fixed")
        .to_ascii_lowercase()
        .as_str()
    {
        "fixed" => RetryBackoff::Fixed,
        "exponential" => RetryBackoff::Exponential,
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "POKEBINDER_RETRY_BACKOFF".to_string(),
                reason: format!("expected 'fixed' or 'exponential', got '{other}'"),
            })
        }
    };
    let retry_max_delay_ms = parse_u64("POKEBINDER_RETRY_MAX_DELAY_MS", "30000")?;
    let inter_group_delay_ms = parse_u64("POKEBINDER_INTER_GROUP_DELAY_MS", "300")?;

    let firestore_collection = or_default("POKEBINDER_FIRESTORE_COLLECTION", "cards");
    if firestore_collection.is_empty() || firestore_collection.contains('/') {
        return Err(ConfigError::InvalidEnvVar {
            var: "POKEBINDER_FIRESTORE_COLLECTION".to_string(),
            reason: "collection id must be non-empty and contain no '/'".to_string(),
        });
    }
    let firestore_credentials_path = PathBuf::from(or_default(
        "POKEBINDER_FIRESTORE_CREDENTIALS",
        "./serviceAccountKey.json",
    ));
    let firestore_base_url = lookup("POKEBINDER_FIRESTORE_BASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        catalog_base_url,
        output_dir,
        aggregate_path,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_delay_ms,
        retry_backoff,
        retry_max_delay_ms,
        inter_group_delay_ms,
        firestore_collection,
        firestore_credentials_path,
        firestore_base_url,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
