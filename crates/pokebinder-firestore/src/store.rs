use async_trait::async_trait;

use crate::error::FirestoreError;

/// A document body: a JSON object whose top-level keys become document fields.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Write-only access to a keyed document collection.
///
/// `upsert` creates the document when absent and otherwise replaces it
/// entirely: fields missing from `document` do not survive the write.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`FirestoreError`] if the write is rejected or cannot be sent.
    async fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        document: &Document,
    ) -> Result<(), FirestoreError>;
}
