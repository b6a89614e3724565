//! Catalog sync: enumerate groups, then fetch, merge and write each group in turn.
//!
//! Groups are processed strictly one after another in the order the catalog
//! lists them, with a fixed courtesy delay after every group. A failed or
//! empty group is logged and skipped; only failure to enumerate the groups
//! aborts the run.

pub(crate) mod sink;

use std::time::Duration;

use anyhow::Context;

use pokebinder_catalog::CatalogClient;
use pokebinder_core::{merge_prices, Group};

use sink::RecordSink;

/// Per-run knobs that are not part of the catalog client itself.
#[derive(Debug, Clone)]
pub(crate) struct SyncOptions {
    /// Restrict the run to one group id.
    pub group_filter: Option<u64>,
    /// Sleep after each group, whatever its outcome.
    pub inter_group_delay: Duration,
}

/// What happened to one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GroupOutcome {
    Written { records: usize },
    /// The products endpoint returned an empty list.
    Empty,
    /// A fetch exhausted its retries or the sink rejected the write.
    Failed { stage: &'static str, error: String },
}

/// Totals for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SyncSummary {
    pub groups_written: usize,
    pub groups_empty: usize,
    pub groups_failed: usize,
    pub records_written: usize,
}

impl SyncSummary {
    fn record(&mut self, outcome: &GroupOutcome) {
        match outcome {
            GroupOutcome::Written { records } => {
                self.groups_written += 1;
                self.records_written += records;
            }
            GroupOutcome::Empty => self.groups_empty += 1,
            GroupOutcome::Failed { .. } => self.groups_failed += 1,
        }
    }

    pub(crate) fn groups_total(&self) -> usize {
        self.groups_written + self.groups_empty + self.groups_failed
    }
}

/// Enumerates the catalog's groups and applies the optional group filter.
///
/// # Errors
///
/// Returns an error if the group list cannot be fetched (after retries) or if
/// `group_filter` names a group the catalog does not list.
pub(crate) async fn load_groups(
    client: &CatalogClient,
    group_filter: Option<u64>,
) -> anyhow::Result<Vec<Group>> {
    let groups = client
        .fetch_groups()
        .await
        .with_context(|| format!("failed to enumerate groups from {}", client.base_url()))?;
    tracing::info!(count = groups.len(), "enumerated catalog groups");

    match group_filter {
        Some(group_id) => {
            let group = groups
                .into_iter()
                .find(|g| g.group_id == group_id)
                .ok_or_else(|| anyhow::anyhow!("group {group_id} is not listed by the catalog"))?;
            Ok(vec![group])
        }
        None => Ok(groups),
    }
}

/// Runs the full sync into `sink`.
///
/// # Errors
///
/// Only enumeration failures are returned; per-group failures are logged and
/// counted in the summary.
pub(crate) async fn run_sync(
    client: &CatalogClient,
    sink: &mut dyn RecordSink,
    options: &SyncOptions,
) -> anyhow::Result<SyncSummary> {
    let groups = load_groups(client, options.group_filter).await?;
    let mut summary = SyncSummary::default();

    for group in &groups {
        let outcome = sync_group(client, sink, group).await;
        match &outcome {
            GroupOutcome::Written { records } => tracing::info!(
                group_id = group.group_id,
                name = %group.name,
                records,
                sink = sink.kind(),
                "group written"
            ),
            GroupOutcome::Empty => tracing::warn!(
                group_id = group.group_id,
                name = %group.name,
                "no products returned, skipping group"
            ),
            GroupOutcome::Failed { stage, error } => tracing::error!(
                group_id = group.group_id,
                name = %group.name,
                stage,
                error = %error,
                "group failed, skipping"
            ),
        }
        summary.record(&outcome);

        if !options.inter_group_delay.is_zero() {
            tokio::time::sleep(options.inter_group_delay).await;
        }
    }

    tracing::info!(
        groups = summary.groups_total(),
        written = summary.groups_written,
        empty = summary.groups_empty,
        failed = summary.groups_failed,
        records = summary.records_written,
        "sync finished"
    );
    Ok(summary)
}

/// Fetch → merge → write for a single group. Never returns an error: every
/// failure is folded into [`GroupOutcome::Failed`].
pub(crate) async fn sync_group(
    client: &CatalogClient,
    sink: &mut dyn RecordSink,
    group: &Group,
) -> GroupOutcome {
    let products = match client.fetch_products(group.group_id).await {
        Ok(products) => products,
        Err(e) => {
            return GroupOutcome::Failed {
                stage: "products",
                error: e.to_string(),
            }
        }
    };
    if products.is_empty() {
        return GroupOutcome::Empty;
    }

    let prices = match client.fetch_prices(group.group_id).await {
        Ok(prices) => prices,
        Err(e) => {
            return GroupOutcome::Failed {
                stage: "prices",
                error: e.to_string(),
            }
        }
    };

    let records = merge_prices(products, &prices);
    match sink.write_group(group, &records).await {
        Ok(records) => GroupOutcome::Written { records },
        Err(e) => GroupOutcome::Failed {
            stage: "write",
            error: format!("{e:#}"),
        },
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
