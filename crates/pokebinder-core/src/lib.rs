pub mod app_config;
pub mod catalog;
pub mod config;

pub use app_config::{AppConfig, RetryBackoff};
pub use catalog::{
    group_file_name, merge_prices, sanitize_group_name, Group, MergedRecord, PriceEntry, Product,
};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

/// Errors raised while assembling [`AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
