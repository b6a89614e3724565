//! Catalog API response envelope.
//!
//! Every endpoint wraps its payload as `{ "success": true, "errors": [], "results": [...] }`.
//! Only `results` is consumed; a missing `results` key reads as an empty list.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}
