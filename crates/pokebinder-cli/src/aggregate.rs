//! Local aggregation of per-group files into one catalog file.
//!
//! Files are read in file-name order so the aggregate is stable across runs.
//! A file that cannot be read or parsed is logged and left out; the rest of
//! the aggregate is still written.

use std::path::{Path, PathBuf};

use anyhow::Context;

use pokebinder_core::MergedRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AggregateSummary {
    pub files_read: usize,
    pub files_skipped: usize,
    pub records: usize,
}

/// Lists `*.json` files directly under `input_dir`, sorted by name,
/// excluding `exclude` (the aggregate file itself when it lives there).
async fn list_group_files(
    input_dir: &Path,
    exclude: Option<&Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(input_dir)
        .await
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if !is_json || !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(exclude) = exclude {
            if tokio::fs::canonicalize(&path).await.ok().as_deref() == Some(exclude) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

async fn read_group_file(path: &Path) -> anyhow::Result<Vec<MergedRecord>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Concatenates every group file in `input_dir` into `output_path`.
///
/// # Errors
///
/// Returns an error if `input_dir` cannot be listed or the aggregate cannot
/// be written. Individual bad files are skipped, not propagated.
pub(crate) async fn run_aggregate(
    input_dir: &Path,
    output_path: &Path,
) -> anyhow::Result<AggregateSummary> {
    let exclude = tokio::fs::canonicalize(output_path).await.ok();
    let files = list_group_files(input_dir, exclude.as_deref()).await?;

    let mut summary = AggregateSummary::default();
    let mut all_records: Vec<MergedRecord> = Vec::new();

    for path in &files {
        match read_group_file(path).await {
            Ok(records) => {
                summary.files_read += 1;
                summary.records += records.len();
                all_records.extend(records);
            }
            Err(e) => {
                summary.files_skipped += 1;
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{e:#}"),
                    "skipping unreadable group file"
                );
            }
        }
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut bytes =
        serde_json::to_vec_pretty(&all_records).context("failed to serialize aggregate")?;
    bytes.push(b'\n');
    tokio::fs::write(output_path, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    tracing::info!(
        files_read = summary.files_read,
        files_skipped = summary.files_skipped,
        records = summary.records,
        path = %output_path.display(),
        "aggregate written"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
