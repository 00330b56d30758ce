//! View filters over a processed report.
//!
//! Filters never touch the rollup tables; they only prune the cluster tree.

use crate::models::{ClusterTree, IndexEntry, ProcessedReport};

/// How the cluster tree should be narrowed before rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TreeFilter {
    /// Keep the tree as produced by the pipeline.
    #[default]
    None,
    /// Strip every node's index entries, keeping tiers and nodes.
    HideIndices,
    /// Keep only entries that are members of the given rolling series.
    RollingSeries(String),
    /// Keep only entries with exactly this index name.
    Index(String),
}

impl TreeFilter {
    /// Build a filter from the mutually exclusive CLI options.
    pub fn from_options(
        hide_indices: bool,
        rolling: Option<&str>,
        index: Option<&str>,
    ) -> Self {
        if hide_indices {
            TreeFilter::HideIndices
        } else if let Some(key) = rolling {
            TreeFilter::RollingSeries(key.to_string())
        } else if let Some(name) = index {
            TreeFilter::Index(name.to_string())
        } else {
            TreeFilter::None
        }
    }

    /// Apply the filter to the report's tree, returning a new tree.
    ///
    /// For the rolling-series and index filters, nodes left without entries
    /// and tier groups left without nodes are dropped. An unknown rolling
    /// series therefore yields a tree without tier groups.
    pub fn apply(&self, report: &ProcessedReport) -> ClusterTree {
        let mut tree = report.cluster_data.clone();
        match self {
            TreeFilter::None => {}
            TreeFilter::HideIndices => {
                for node in tree.children.iter_mut().flat_map(|g| g.children.iter_mut()) {
                    node.children.clear();
                }
            }
            TreeFilter::RollingSeries(key) => {
                let members: &[String] = report
                    .rolling_indices
                    .get(key)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                retain_entries(&mut tree, |entry| {
                    members.iter().any(|m| m == entry.name())
                });
            }
            TreeFilter::Index(name) => {
                retain_entries(&mut tree, |entry| entry.name() == name);
            }
        }
        tree
    }
}

fn retain_entries(tree: &mut ClusterTree, keep: impl Fn(&IndexEntry) -> bool) {
    for group in tree.children.iter_mut() {
        for node in group.children.iter_mut() {
            node.children.retain(|entry| keep(entry));
        }
        group.children.retain(|node| !node.children.is_empty());
    }
    tree.children.retain(|group| !group.children.is_empty());
}

// ── Tests ──────────────────────────────────────────────────────────────────────
