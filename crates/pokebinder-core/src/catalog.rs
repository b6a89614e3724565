//! Catalog entities shared by the fetcher, the sinks and the aggregator.
//!
//! Upstream product payloads are passed through verbatim: only `productId` is
//! typed, every other field rides along in [`Product::fields`]. Price entries
//! are fully typed because the merge keys on `productId` and the five price
//! points are the only fields the upstream API returns for them.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid group name regex"));

/// A product group (one card-set expansion) as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: u64,
    pub name: String,
}

/// A single catalog item (trading card).
///
/// Serializes `productId` first, then the remaining upstream keys in the
/// order the catalog sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "productId")]
    pub product_id: u64,
    /// All remaining upstream fields, untouched.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// One price observation for a product, optionally scoped to a finish
/// (`"Normal"`, `"Holofoil"`, `"Reverse Holofoil"`, ...).
///
/// Unlike [`Product`] this is a fixed shape: an absent price key is written
/// back as an explicit `null`, and keys other than these seven are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub product_id: u64,
    pub low_price: Option<f64>,
    pub mid_price: Option<f64>,
    pub high_price: Option<f64>,
    pub market_price: Option<f64>,
    pub direct_low_price: Option<f64>,
    pub sub_type_name: Option<String>,
}

/// A product with every price entry that references it attached.
///
/// Serializes as the product's own fields plus a `prices` array, which is
/// the shape written to both the file sink and the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    #[serde(flatten)]
    pub product: Product,
    pub prices: Vec<PriceEntry>,
}

impl MergedRecord {
    #[must_use]
    pub fn product_id(&self) -> u64 {
        self.product.product_id
    }

    /// Document key used by the document store: the stringified product id.
    #[must_use]
    pub fn document_id(&self) -> String {
        self.product.product_id.to_string()
    }
}

/// Attach to each product the price entries whose `product_id` matches.
///
/// Products keep their source order and so do the prices within each
/// product. Nothing is deduplicated: two products sharing an id both receive
/// the full matching subsequence, and prices referencing unknown products are
/// simply not attached anywhere.
#[must_use]
pub fn merge_prices(products: Vec<Product>, prices: &[PriceEntry]) -> Vec<MergedRecord> {
    let mut by_product: HashMap<u64, Vec<PriceEntry>> = HashMap::new();
    for entry in prices {
        by_product
            .entry(entry.product_id)
            .or_default()
            .push(entry.clone());
    }

    products
        .into_iter()
        .map(|product| {
            let prices = by_product
                .get(&product.product_id)
                .cloned()
                .unwrap_or_default();
            MergedRecord { product, prices }
        })
        .collect()
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// Distinct names may collapse to the same string (`"Base Set"` and
/// `"Base-Set"`); file names stay unique because they are prefixed with the
/// group id.
#[must_use]
pub fn sanitize_group_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "_").into_owned()
}

/// File name used by the file sink for one group: `{groupId}-{sanitizedName}.json`.
#[must_use]
pub fn group_file_name(group: &Group) -> String {
    format!(
        "{}-{}.json",
        group.group_id,
        sanitize_group_name(&group.name)
    )
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
