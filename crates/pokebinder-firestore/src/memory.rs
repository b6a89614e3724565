use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::FirestoreError;
use crate::store::{Document, DocumentStore};

/// In-process [`DocumentStore`] keyed by `(collection, document_id)`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<(String, String), Document>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored document, if any.
    #[must_use]
    pub fn get(&self, collection: &str, document_id: &str) -> Option<Document> {
        self.lock()
            .get(&(collection.to_owned(), document_id.to_owned()))
            .cloned()
    }

    /// Number of documents across all collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), Document>> {
        // A poisoned map is still structurally valid; keep serving it.
        self.documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(
        &self,
        collection: &str,
        document_id: &str,
        document: &Document,
    ) -> Result<(), FirestoreError> {
        self.lock().insert(
            (collection.to_owned(), document_id.to_owned()),
            document.clone(),
        );
        Ok(())
    }
}
