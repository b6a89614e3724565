use std::path::Path;

use serde::Deserialize;

use crate::error::FirestoreError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

/// The subset of a Google service-account JSON key the sync needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field(
                "private_key_id",
                &self.private_key_id.as_ref().map(|_| "[redacted]"),
            )
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Reads and parses a service-account key file.
    ///
    /// # Errors
    ///
    /// Returns [`FirestoreError::Credentials`] if the file does not exist,
    /// cannot be read, or is not a service-account key.
    pub fn from_file(path: &Path) -> Result<Self, FirestoreError> {
        let credentials_err = |reason: String| FirestoreError::Credentials {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| credentials_err(e.to_string()))?;
        let key: Self = serde_json::from_str(&raw)
            .map_err(|e| credentials_err(format!("not a service account key: {e}")))?;
        if key.project_id.trim().is_empty() {
            return Err(credentials_err("project_id is empty".to_owned()));
        }
        Ok(key)
    }
}
