use std::path::PathBuf;

/// Wait strategy between retries of a failed catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryBackoff {
    /// `retry_delay_ms` before every retry.
    Fixed,
    /// `retry_delay_ms` doubled per retry, capped at `retry_max_delay_ms`, with jitter.
    Exponential,
}

/// Runtime settings for a catalog sync run.
///
/// Every delay, retry budget and destination is injected from here rather
/// than hard-coded, so tests can point the pipeline at mock servers and
/// temporary directories with zero delays.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_base_url: String,
    pub output_dir: PathBuf,
    pub aggregate_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub retry_backoff: RetryBackoff,
    /// Ceiling for [`RetryBackoff::Exponential`]; ignored by the fixed strategy.
    pub retry_max_delay_ms: u64,
    pub inter_group_delay_ms: u64,
    pub firestore_collection: String,
    pub firestore_credentials_path: PathBuf,
    /// Overrides the Firestore REST root, e.g. `http://localhost:8080/v1` for the emulator.
    pub firestore_base_url: Option<String>,
}
