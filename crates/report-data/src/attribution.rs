//! Index attribution and rolling-series rollups.
//!
//! Attributes the on-disk footprint of each index to the nodes hosting its
//! shards, and groups indices sharing a `<prefix>-<number>` naming scheme into
//! rolling series.

use std::collections::BTreeMap;

use report_core::fields::{f64_at, object_at};
use report_core::formatting::{bytes_to_mb, round2};
use report_core::models::{IndexEntry, IndexSummary, OtherIndices, RollingSeriesRegistry};
use report_core::settings::PipelineConfig;
use serde_json::{Map, Value};
use tracing::trace;

use crate::shards::{store_size_bytes, ShardCopies};

// ── Rolling series keys ───────────────────────────────────────────────────────

/// Series key of an index name: the name without its trailing `-<digits>`
/// segment.
///
/// Returns `None` when the name has no `-` or its last segment is not made
/// entirely of ASCII digits.
///
/// # Examples
///
/// ```
/// use report_data::attribution::derive_rolling_key;
///
/// assert_eq!(derive_rolling_key("logs-2024-01-05").as_deref(), Some("logs-2024-01"));
/// assert_eq!(derive_rolling_key(".ds-metrics-000042").as_deref(), Some(".ds-metrics"));
/// assert_eq!(derive_rolling_key("metrics"), None);
/// assert_eq!(derive_rolling_key("logs-v2"), None);
/// ```
pub fn derive_rolling_key(index_name: &str) -> Option<String> {
    let (prefix, last) = index_name.rsplit_once('-')?;
    if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
        Some(prefix.to_string())
    } else {
        None
    }
}

/// Derive the series key of `index_name` and record its membership.
pub fn register_rolling_index(
    index_name: &str,
    registry: &mut RollingSeriesRegistry,
) -> Option<String> {
    let key = derive_rolling_key(index_name)?;
    registry.register(&key, index_name);
    Some(key)
}

/// Add every index's total store size (all shards and replicas) to its
/// series bucket and round the buckets to 2 decimals.
///
/// Unlike per-node attribution this applies neither the size floor nor the
/// per-node cap, so indices folded into "Other Indices" still count here.
pub fn compute_rolling_series_sizes<'r>(
    indices: Option<&Map<String, Value>>,
    registry: &'r mut RollingSeriesRegistry,
) -> &'r BTreeMap<String, f64> {
    for (index_name, index_stats) in indices.into_iter().flatten() {
        if let Some(key) = register_rolling_index(index_name, registry) {
            let size_mb = bytes_to_mb(f64_at(index_stats, &["total", "store", "size_in_bytes"]));
            registry.add_size(&key, size_mb);
        }
    }
    registry.round_sizes();
    registry.sizes()
}

// ── IndexAttributor ───────────────────────────────────────────────────────────

/// Builds the index listing of a single node.
#[derive(Debug, Clone, Default)]
pub struct IndexAttributor {
    config: PipelineConfig,
}

impl IndexAttributor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Index entries for `node_id`, in index-document order.
    ///
    /// For each index only the first shard copy hosted on the node is sampled.
    /// An index gets its own entry when that copy is at least
    /// `min_index_size_mb` and fewer than `max_indices_per_node` entries have
    /// been emitted so far; otherwise it is folded into a single trailing
    /// "Other Indices" entry. Indices with their own entry are registered in
    /// `registry`.
    pub fn attribute_indices_to_node(
        &self,
        node_id: &str,
        indices: Option<&Map<String, Value>>,
        registry: &mut RollingSeriesRegistry,
    ) -> Vec<IndexEntry> {
        let mut entries: Vec<IndexEntry> = Vec::new();
        let mut other = OtherIndices::default();

        for (index_name, index_stats) in indices.into_iter().flatten() {
            let Some(size_mb) = Self::hosted_shard_size_mb(index_name, index_stats, node_id) else {
                continue;
            };

            if size_mb >= self.config.min_index_size_mb
                && entries.len() < self.config.max_indices_per_node
            {
                entries.push(IndexEntry::Index(IndexSummary {
                    name: index_name.clone(),
                    size_mb: round2(size_mb),
                    rolling_series_key: register_rolling_index(index_name, registry),
                }));
            } else {
                other.size_mb += size_mb;
                other.count += 1;
            }
        }

        if other.count > 0 {
            trace!(
                "Node {}: {} indices folded into '{}'",
                node_id,
                other.count,
                other.name
            );
            other.size_mb = round2(other.size_mb);
            entries.push(IndexEntry::Other(other));
        }

        entries
    }

    /// Size in MB of the first shard copy of `index_stats` hosted on `node_id`.
    fn hosted_shard_size_mb(index_name: &str, index_stats: &Value, node_id: &str) -> Option<f64> {
        for (shard_id, shard) in object_at(index_stats, &["shards"]).into_iter().flatten() {
            let Some(copies) = ShardCopies::from_value(shard) else {
                trace!(
                    "Skipping shard {} of {}: neither an object nor a list",
                    shard_id,
                    index_name
                );
                continue;
            };
            if let Some(copy) = copies.hosted_on(node_id) {
                return Some(bytes_to_mb(store_size_bytes(copy)));
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
