use thiserror::Error;

/// Errors returned by the document store layer.
#[derive(Debug, Error)]
pub enum FirestoreError {
    /// The service-account key file is missing, unreadable or malformed.
    #[error("service account credentials at {path}: {reason}")]
    Credentials { path: String, reason: String },

    /// Signing the token assertion failed (usually a bad private key).
    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The OAuth token endpoint refused the assertion.
    #[error("token exchange failed with HTTP {status}: {body}")]
    TokenExchange { status: u16, body: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Firestore answered a write with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Firestore URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
