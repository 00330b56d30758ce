//! Report pipeline.
//!
//! Runs node classification, per-node index attribution and the global
//! rolling-series rollup over one diagnostics snapshot, returning a
//! [`ProcessedReport`] ready for the renderer.

use std::collections::BTreeMap;

use chrono::Utc;
use report_core::error::Result;
use report_core::models::{ProcessedReport, ReportMetadata, RollingSeriesRegistry};
use report_core::settings::PipelineConfig;
use tracing::{debug, info};

use crate::attribution::{compute_rolling_series_sizes, IndexAttributor};
use crate::classifier::assemble_cluster_tree;
use crate::raw::{DocumentKind, RawDiagnostics};

/// Run the full pipeline.
///
/// 1. Require all three documents (the only fatal condition).
/// 2. Classify nodes and attribute indices to each node.
/// 3. Sum total index sizes into their rolling series.
/// 4. Return the tree, the rollups and a run summary.
pub fn process_diagnostics(
    raw: &RawDiagnostics,
    config: &PipelineConfig,
) -> Result<ProcessedReport> {
    let start = std::time::Instant::now();

    // ── Step 1: Documents ─────────────────────────────────────────────────────
    raw.ensure_complete()?;
    let nodes_stats = raw.entries(DocumentKind::NodesStats)?;
    let nodes_info = raw.entries(DocumentKind::NodesInfo)?;
    let indices = raw.entries(DocumentKind::IndicesStats)?;

    debug!(
        "Processing {} nodes ({} with stats) and {} indices",
        nodes_info.map_or(0, |m| m.len()),
        nodes_stats.map_or(0, |m| m.len()),
        indices.map_or(0, |m| m.len())
    );

    // ── Step 2: Tree ──────────────────────────────────────────────────────────
    let attributor = IndexAttributor::new(config.clone());
    let mut registry = RollingSeriesRegistry::new();
    let cluster = assemble_cluster_tree(
        nodes_info,
        nodes_stats,
        indices,
        &attributor,
        &mut registry,
    );

    // ── Step 3: Rollups ───────────────────────────────────────────────────────
    compute_rolling_series_sizes(indices, &mut registry);

    // ── Step 4: Result ────────────────────────────────────────────────────────
    let tier_counts: BTreeMap<_, _> = cluster
        .children
        .iter()
        .map(|group| (group.tier, group.children.len()))
        .collect();

    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        node_count: cluster.node_count(),
        index_count: indices.map_or(0, |m| m.len()),
        tier_counts,
        rolling_series_count: registry.len(),
        processing_time_seconds: start.elapsed().as_secs_f64(),
    };

    info!(
        "Processed {} nodes in {} tiers, {} indices, {} rolling series",
        metadata.node_count,
        cluster.children.len(),
        metadata.index_count,
        metadata.rolling_series_count
    );

    Ok(ProcessedReport::new(cluster, registry, metadata))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::error::ReportError;
    use report_core::models::{IndexEntry, IndexSummary, Tier};
    use serde_json::json;
    use std::collections::HashMap;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_process_end_to_end() {
        let raw = RawDiagnostics::from_parts(
            json!({"n1": {
                "os": {"mem": {"total_in_bytes": 1000}},
                "jvm": {"mem": {"heap_used_in_bytes": 100}},
                "fs": {"total": {"total_in_bytes": 500, "free_in_bytes": 250}}
            }}),
            json!({"n1": {"name": "node-a", "roles": ["data_hot"]}}),
            json!({"logs-2024-01-05": {
                "shards": {"0": {"routing": {"node": "n1"}, "store": {"size_in_bytes": 2097152}}},
                "total": {"store": {"size_in_bytes": 2097152}}
            }}),
        );

        let report = process_diagnostics(&raw, &PipelineConfig::default()).expect("process");

        let tree = &report.cluster_data;
        assert_eq!(tree.name, "Cluster");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "Hot Nodes");

        let node = &tree.children[0].children[0];
        assert_eq!(node.name, "node-a");
        assert_eq!(node.disk_used_percent, 50.0);
        assert_eq!(node.memory_used_percent, 10.0);
        assert_eq!(node.cpu_used_percent + node.cpu_free_percent, 100);
        assert_eq!(
            node.children,
            vec![IndexEntry::Index(IndexSummary {
                name: "logs-2024-01-05".to_string(),
                size_mb: 2.0,
                rolling_series_key: Some("logs-2024-01".to_string()),
            })]
        );

        assert_eq!(
            report.rolling_indices_size,
            BTreeMap::from([("logs-2024-01".to_string(), 2.0)])
        );
        assert_eq!(
            report.rolling_indices["logs-2024-01"],
            vec!["logs-2024-01-05".to_string()]
        );

        assert_eq!(report.metadata.node_count, 1);
        assert_eq!(report.metadata.index_count, 1);
        assert_eq!(report.metadata.rolling_series_count, 1);
        assert_eq!(report.metadata.tier_counts.get(&Tier::Hot), Some(&1));
    }

    #[test]
    fn test_process_with_envelopes() {
        let raw = RawDiagnostics::from_parts(
            json!({"_nodes": {"total": 2}, "nodes": {"a": {}, "b": {}}}),
            json!({"nodes": {
                "a": {"name": "hot-a", "roles": ["data_hot"]},
                "b": {"name": "warm-b", "roles": ["data_warm"]}
            }}),
            json!({"_all": {}, "indices": {
                "events-000001": {
                    "shards": {"0": [
                        {"routing": {"node": "a"}, "store": {"size_in_bytes": 4 * MB}},
                        {"routing": {"node": "b"}, "store": {"size_in_bytes": 4 * MB}}
                    ]},
                    "total": {"store": {"size_in_bytes": 8 * MB}}
                }
            }}),
        );

        let report = process_diagnostics(&raw, &PipelineConfig::default()).expect("process");

        assert_eq!(report.cluster_data.children.len(), 2);
        for node in report.cluster_data.nodes() {
            assert_eq!(node.children.len(), 1);
            assert_eq!(node.children[0].size_mb(), 4.0);
        }
        // The rollup uses the index total, not the per-node shard sizes.
        assert_eq!(report.rolling_indices_size["events"], 8.0);
        assert_eq!(report.rolling_indices["events"], vec!["events-000001".to_string()]);
    }

    #[test]
    fn test_process_rollup_includes_folded_indices() {
        let raw = RawDiagnostics::from_parts(
            json!({}),
            json!({"n1": {"name": "node-a"}}),
            json!({
                "audit-1": {
                    "shards": {"0": {"routing": {"node": "n1"}, "store": {"size_in_bytes": 1024}}},
                    "total": {"store": {"size_in_bytes": 3 * MB}}
                },
                "audit-2": {
                    "shards": {"0": {"routing": {"node": "n1"}, "store": {"size_in_bytes": 2 * MB}}},
                    "total": {"store": {"size_in_bytes": 2 * MB}}
                }
            }),
        );

        let report = process_diagnostics(&raw, &PipelineConfig::default()).expect("process");

        let node = report.cluster_data.nodes().next().unwrap();
        assert_eq!(node.children.len(), 2);
        assert!(node.children[1].is_aggregate());
        assert_eq!(report.rolling_indices_size["audit"], 5.0);
        assert_eq!(
            report.rolling_indices["audit"],
            vec!["audit-2".to_string(), "audit-1".to_string()]
        );
    }

    #[test]
    fn test_process_empty_documents() {
        let raw = RawDiagnostics::from_parts(json!({}), json!({}), json!({}));
        let report = process_diagnostics(&raw, &PipelineConfig::default()).expect("process");

        assert_eq!(report.cluster_data.name, "Cluster");
        assert!(report.cluster_data.children.is_empty());
        assert!(report.rolling_indices.is_empty());
        assert!(report.rolling_indices_size.is_empty());
        assert_eq!(report.metadata.node_count, 0);
    }

    #[test]
    fn test_process_non_object_documents_degrade() {
        let raw = RawDiagnostics::from_parts(json!(null), json!([1, 2]), json!("x"));
        let report = process_diagnostics(&raw, &PipelineConfig::default()).expect("process");
        assert!(report.cluster_data.children.is_empty());
    }

    #[test]
    fn test_process_missing_document_fails() {
        let raw = RawDiagnostics::new(HashMap::from([
            ("nodes_stats.json".to_string(), json!({})),
            ("nodes_info.json".to_string(), json!({})),
        ]));
        let err = process_diagnostics(&raw, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingInput(ref doc) if doc == "indices_stats.json"));
    }

    #[test]
    fn test_process_runs_are_independent() {
        let raw = RawDiagnostics::from_parts(
            json!({}),
            json!({"n1": {}}),
            json!({"logs-1": {"total": {"store": {"size_in_bytes": MB}}}}),
        );
        let first = process_diagnostics(&raw, &PipelineConfig::default()).expect("first");
        let second = process_diagnostics(&raw, &PipelineConfig::default()).expect("second");

        assert_eq!(first.rolling_indices_size["logs"], 1.0);
        assert_eq!(second.rolling_indices_size["logs"], 1.0);
        assert_eq!(second.rolling_indices["logs"].len(), 1);
    }
}
