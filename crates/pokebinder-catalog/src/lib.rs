pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::CatalogClient;
pub use error::CatalogError;
pub use retry::{Backoff, RetryPolicy};
