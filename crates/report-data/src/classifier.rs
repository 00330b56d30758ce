//! Node classification and cluster tree assembly.
//!
//! Turns the node-info and node-stats documents into [`NodeRecord`]s grouped
//! by storage tier. Index children are supplied by [`IndexAttributor`].

use report_core::fields::{i64_at, str_at, string_list_at, u64_at};
use report_core::formatting::percentage;
use report_core::models::{
    ClusterTree, IndexEntry, MemoryBreakdown, NodeRecord, RollingSeriesRegistry, Tier, TierGroup,
};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::attribution::IndexAttributor;

/// Fallback display name for nodes without a `name`.
pub const UNKNOWN_NODE_NAME: &str = "Unknown";

static EMPTY_STATS: Value = Value::Null;

// ── NodeClassifier ────────────────────────────────────────────────────────────

/// Stateless per-node classification and metric derivation.
pub struct NodeClassifier;

impl NodeClassifier {
    /// Storage tier of a node.
    ///
    /// Tiers are tested in order hot, warm, cold, frozen; a tier matches when
    /// its `data_<tier>` role is listed or the node's `attr.data` setting
    /// equals the tier name. Nodes matching nothing (dedicated master or
    /// coordinating nodes, for example) are reported as hot.
    pub fn classify_node(node_info: &Value) -> Tier {
        let roles = string_list_at(node_info, &["roles"]);
        let attr = Self::data_attribute(node_info);

        Tier::ALL
            .into_iter()
            .find(|tier| roles.contains(&tier.data_role()) || attr == Some(tier.as_str()))
            .unwrap_or(Tier::Hot)
    }

    /// Memory accounting from a node's stats.
    ///
    /// `used` sums JVM heap, fielddata cache, query cache and segment memory;
    /// `percentage` is `used / os.mem.total * 100`, or `0` when the total is
    /// unknown.
    pub fn compute_memory_breakdown(node_stats: &Value) -> MemoryBreakdown {
        let total = u64_at(node_stats, &["os", "mem", "total_in_bytes"]);
        let jvm_heap = u64_at(node_stats, &["jvm", "mem", "heap_used_in_bytes"]);
        let field_data_cache = u64_at(
            node_stats,
            &["indices", "fielddata", "memory_size_in_bytes"],
        );
        let query_cache = u64_at(
            node_stats,
            &["indices", "query_cache", "memory_size_in_bytes"],
        );
        let segment_memory = u64_at(node_stats, &["indices", "segments", "memory_in_bytes"]);

        let used = jvm_heap
            .saturating_add(field_data_cache)
            .saturating_add(query_cache)
            .saturating_add(segment_memory);

        MemoryBreakdown {
            total,
            jvm_heap,
            field_data_cache,
            query_cache,
            segment_memory,
            used,
            percentage: percentage(used as f64, total as f64),
        }
    }

    /// Percentage of the node's filesystem in use, or `0` when the total is
    /// unknown.
    pub fn compute_disk_used_percent(node_stats: &Value) -> f64 {
        let total = u64_at(node_stats, &["fs", "total", "total_in_bytes"]) as f64;
        let free = u64_at(node_stats, &["fs", "total", "free_in_bytes"]) as f64;
        percentage(total - free, total)
    }

    /// `os.cpu.percent`, or `0`.
    pub fn cpu_used_percent(node_stats: &Value) -> i64 {
        i64_at(node_stats, &["os", "cpu", "percent"])
    }

    /// Assemble the record for one node.
    pub fn build_node_record(
        node_info: &Value,
        node_stats: &Value,
        children: Vec<IndexEntry>,
    ) -> NodeRecord {
        let memory = Self::compute_memory_breakdown(node_stats);
        let cpu_used = Self::cpu_used_percent(node_stats);

        NodeRecord {
            name: str_at(node_info, &["name"])
                .unwrap_or(UNKNOWN_NODE_NAME)
                .to_string(),
            tier: Self::classify_node(node_info),
            disk_used_percent: Self::compute_disk_used_percent(node_stats),
            disk_total_bytes: u64_at(node_stats, &["fs", "total", "total_in_bytes"]),
            memory_used_percent: memory.percentage,
            memory_total_bytes: memory.total,
            memory_breakdown: memory,
            cpu_used_percent: cpu_used,
            cpu_free_percent: 100 - cpu_used,
            children,
        }
    }

    /// The `attr.data` node setting, as either a flattened or nested key.
    /// The top-level `attributes` map is not consulted.
    fn data_attribute(node_info: &Value) -> Option<&str> {
        str_at(node_info, &["settings", "node", "attr.data"])
            .or_else(|| str_at(node_info, &["settings", "node", "attr", "data"]))
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Build the cluster tree.
///
/// Every node id of `nodes_info` becomes a [`NodeRecord`] (in document order);
/// nodes absent from `nodes_stats` get zeroed metrics. Records are grouped by
/// tier in hot, warm, cold, frozen order and empty tiers are omitted.
pub fn assemble_cluster_tree(
    nodes_info: Option<&Map<String, Value>>,
    nodes_stats: Option<&Map<String, Value>>,
    indices: Option<&Map<String, Value>>,
    attributor: &IndexAttributor,
    registry: &mut RollingSeriesRegistry,
) -> ClusterTree {
    let mut by_tier: Vec<(Tier, Vec<NodeRecord>)> =
        Tier::ALL.into_iter().map(|tier| (tier, Vec::new())).collect();

    for (node_id, node_info) in nodes_info.into_iter().flatten() {
        let node_stats = match nodes_stats.and_then(|stats| stats.get(node_id)) {
            Some(stats) => stats,
            None => {
                debug!("No stats for node {}; metrics default to zero", node_id);
                &EMPTY_STATS
            }
        };

        let children = attributor.attribute_indices_to_node(node_id, indices, registry);
        let record = NodeClassifier::build_node_record(node_info, node_stats, children);
        trace!(
            "Node {} ({}) classified as {}",
            node_id,
            record.name,
            record.tier
        );

        if let Some((_, records)) = by_tier.iter_mut().find(|(tier, _)| *tier == record.tier) {
            records.push(record);
        }
    }

    let groups = by_tier
        .into_iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|(tier, records)| TierGroup::new(tier, records))
        .collect();

    ClusterTree::new(groups)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
