//! Destinations for merged records.
//!
//! Both sinks are write-only: they never read back or reconcile against what
//! a previous run stored. Re-running with unchanged upstream data produces
//! byte-identical files and identical documents.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use pokebinder_core::{group_file_name, Group, MergedRecord};
use pokebinder_firestore::{Document, DocumentStore};

/// Receives the merged record set of one group at a time.
#[async_trait]
pub(crate) trait RecordSink: Send {
    /// Short label for log lines, e.g. `"file"`.
    fn kind(&self) -> &'static str;

    /// Persists one group's records and returns how many were written.
    async fn write_group(
        &mut self,
        group: &Group,
        records: &[MergedRecord],
    ) -> anyhow::Result<usize>;
}

/// Writes one pretty-printed JSON array per group under `output_dir`.
///
/// Existing files are overwritten in place; a crash mid-write can leave a
/// truncated file, which the next full run replaces.
pub(crate) struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub(crate) fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub(crate) fn path_for(&self, group: &Group) -> PathBuf {
        self.output_dir.join(group_file_name(group))
    }

    pub(crate) fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl RecordSink for FileSink {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn write_group(
        &mut self,
        group: &Group,
        records: &[MergedRecord],
    ) -> anyhow::Result<usize> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("failed to create {}", self.output_dir.display()))?;

        let path = self.path_for(group);
        let mut bytes = serde_json::to_vec_pretty(records)
            .with_context(|| format!("failed to serialize group {}", group.group_id))?;
        bytes.push(b'\n');

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote group file");
        Ok(records.len())
    }
}

/// Upserts one document per product, keyed by the stringified product id.
pub(crate) struct DocumentStoreSink<'a> {
    store: &'a dyn DocumentStore,
    collection: String,
}

impl<'a> DocumentStoreSink<'a> {
    pub(crate) fn new(store: &'a dyn DocumentStore, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

/// Converts a merged record to a document body: product fields plus `prices`.
pub(crate) fn record_document(record: &MergedRecord) -> anyhow::Result<Document> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!(
            "product {} serialized to a non-object: {other}",
            record.product_id()
        ),
    }
}

#[async_trait]
impl RecordSink for DocumentStoreSink<'_> {
    fn kind(&self) -> &'static str {
        "firestore"
    }

    /// Attempts every record even after a failure; the group is reported as
    /// failed if any upsert was rejected.
    async fn write_group(
        &mut self,
        group: &Group,
        records: &[MergedRecord],
    ) -> anyhow::Result<usize> {
        let mut written = 0usize;
        let mut failed = 0usize;

        for record in records {
            let document_id = record.document_id();
            let result = match record_document(record) {
                Ok(document) => self
                    .store
                    .upsert(&self.collection, &document_id, &document)
                    .await
                    .map_err(anyhow::Error::from),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        group_id = group.group_id,
                        document_id = %document_id,
                        error = %e,
                        "document upsert failed"
                    );
                }
            }
        }

        if failed > 0 {
            anyhow::bail!(
                "{failed} of {} documents failed to upsert for group {}",
                records.len(),
                group.group_id
            );
        }
        Ok(written)
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;
