use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Name of the cluster tree root.
pub const CLUSTER_ROOT_NAME: &str = "Cluster";

/// Name of the per-node aggregate entry that collects folded indices.
pub const OTHER_INDICES_NAME: &str = "Other Indices";

/// Storage-temperature classification of a data node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hot,
    Warm,
    Cold,
    Frozen,
}

impl Tier {
    /// All tiers in output order.
    pub const ALL: [Tier; 4] = [Tier::Hot, Tier::Warm, Tier::Cold, Tier::Frozen];

    /// Lowercase tier name, also the value of the `attr.data` node setting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "hot",
            Tier::Warm => "warm",
            Tier::Cold => "cold",
            Tier::Frozen => "frozen",
        }
    }

    /// Node role that marks membership of this tier.
    pub fn data_role(&self) -> &'static str {
        match self {
            Tier::Hot => "data_hot",
            Tier::Warm => "data_warm",
            Tier::Cold => "data_cold",
            Tier::Frozen => "data_frozen",
        }
    }

    /// Display title of the tier group, e.g. `"Hot Nodes"`.
    pub fn group_name(&self) -> &'static str {
        match self {
            Tier::Hot => "Hot Nodes",
            Tier::Warm => "Warm Nodes",
            Tier::Cold => "Cold Nodes",
            Tier::Frozen => "Frozen Nodes",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memory accounting for a single node. All fields are byte counts except
/// `percentage`.
///
/// `used` is the sum of the four tracked consumers, not `total - free`, so it
/// may exceed `total` and push `percentage` above 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryBreakdown {
    pub total: u64,
    pub jvm_heap: u64,
    pub field_data_cache: u64,
    pub query_cache: u64,
    pub segment_memory: u64,
    pub used: u64,
    pub percentage: f64,
}

/// An index shown individually under a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    pub name: String,
    /// Size of the shard hosted on the node, in MB rounded to 2 decimals.
    pub size_mb: f64,
    pub rolling_series_key: Option<String>,
}

/// Aggregate of every index folded on a node because it was too small or
/// beyond the per-node cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherIndices {
    pub name: String,
    pub size_mb: f64,
    pub count: u32,
}

impl Default for OtherIndices {
    fn default() -> Self {
        Self {
            name: OTHER_INDICES_NAME.to_string(),
            size_mb: 0.0,
            count: 0,
        }
    }
}

/// A child of a [`NodeRecord`].
///
/// `Other` is listed first so that untagged deserialization only picks it
/// when a `count` field is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexEntry {
    Other(OtherIndices),
    Index(IndexSummary),
}

impl IndexEntry {
    pub fn name(&self) -> &str {
        match self {
            IndexEntry::Other(other) => &other.name,
            IndexEntry::Index(index) => &index.name,
        }
    }

    pub fn size_mb(&self) -> f64 {
        match self {
            IndexEntry::Other(other) => other.size_mb,
            IndexEntry::Index(index) => index.size_mb,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, IndexEntry::Other(_))
    }
}

/// Derived per-node resource summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub name: String,
    pub tier: Tier,
    pub disk_used_percent: f64,
    pub disk_total_bytes: u64,
    pub memory_used_percent: f64,
    pub memory_total_bytes: u64,
    pub memory_breakdown: MemoryBreakdown,
    pub cpu_used_percent: i64,
    /// `100 - cpu_used_percent`, deliberately unclamped.
    pub cpu_free_percent: i64,
    #[serde(default)]
    pub children: Vec<IndexEntry>,
}

/// All nodes of one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierGroup {
    pub name: String,
    pub tier: Tier,
    pub children: Vec<NodeRecord>,
}

impl TierGroup {
    pub fn new(tier: Tier, children: Vec<NodeRecord>) -> Self {
        Self {
            name: tier.group_name().to_string(),
            tier,
            children,
        }
    }
}

/// Root of the report hierarchy: cluster → tier groups → nodes → indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterTree {
    pub name: String,
    pub children: Vec<TierGroup>,
}

impl Default for ClusterTree {
    fn default() -> Self {
        Self {
            name: CLUSTER_ROOT_NAME.to_string(),
            children: Vec::new(),
        }
    }
}

impl ClusterTree {
    pub fn new(children: Vec<TierGroup>) -> Self {
        Self {
            name: CLUSTER_ROOT_NAME.to_string(),
            children,
        }
    }

    /// Iterate every node across all tier groups.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.children.iter().flat_map(|group| group.children.iter())
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Sorted, de-duplicated names of every real index entry in the tree.
    pub fn all_index_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .nodes()
            .flat_map(|node| node.children.iter())
            .filter(|entry| !entry.is_aggregate())
            .map(IndexEntry::name)
            .collect();
        names.into_iter().map(str::to_string).collect()
    }
}

// ── RollingSeriesRegistry ──────────────────────────────────────────────────────

/// Membership and cumulative size of each rolling index series observed in
/// one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingSeriesRegistry {
    members: BTreeMap<String, Vec<String>>,
    sizes: BTreeMap<String, f64>,
}

impl RollingSeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `index_name` belongs to series `key`.
    ///
    /// An unseen key starts with an empty member list and a zero size. A name
    /// already listed under the key is not appended again.
    pub fn register(&mut self, key: &str, index_name: &str) {
        let members = self.members.entry(key.to_string()).or_default();
        if !members.iter().any(|m| m == index_name) {
            members.push(index_name.to_string());
        }
        self.sizes.entry(key.to_string()).or_insert(0.0);
    }

    /// Add `size_mb` to the running size of `key`.
    pub fn add_size(&mut self, key: &str, size_mb: f64) {
        *self.sizes.entry(key.to_string()).or_insert(0.0) += size_mb;
    }

    /// Round every cumulative size to 2 decimals.
    pub fn round_sizes(&mut self) {
        for size in self.sizes.values_mut() {
            *size = crate::formatting::round2(*size);
        }
    }

    pub fn members(&self, key: &str) -> Option<&[String]> {
        self.members.get(key).map(Vec::as_slice)
    }

    pub fn size_mb(&self, key: &str) -> Option<f64> {
        self.sizes.get(key).copied()
    }

    pub fn sizes(&self) -> &BTreeMap<String, f64> {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Split into `(memberships, sizes)`.
    pub fn into_parts(self) -> (BTreeMap<String, Vec<String>>, BTreeMap<String, f64>) {
        (self.members, self.sizes)
    }
}

// ── Processed report ───────────────────────────────────────────────────────────

/// Summary of a pipeline run, carried alongside the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// When this report was generated; serialized as RFC 3339.
    pub generated_at: DateTime<Utc>,
    /// Number of nodes present in the node-info document.
    pub node_count: usize,
    /// Number of indices present in the index-statistics document.
    pub index_count: usize,
    /// Node count per non-empty tier.
    pub tier_counts: BTreeMap<Tier, usize>,
    /// Number of distinct rolling series.
    pub rolling_series_count: usize,
    /// Wall-clock seconds spent in the pipeline.
    pub processing_time_seconds: f64,
}

/// Everything the renderer needs: the tree plus the two rollup tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedReport {
    pub cluster_data: ClusterTree,
    pub rolling_indices: BTreeMap<String, Vec<String>>,
    pub rolling_indices_size: BTreeMap<String, f64>,
    #[serde(default)]
    pub metadata: ReportMetadata,
}

impl ProcessedReport {
    pub fn new(
        cluster_data: ClusterTree,
        registry: RollingSeriesRegistry,
        metadata: ReportMetadata,
    ) -> Self {
        let (rolling_indices, rolling_indices_size) = registry.into_parts();
        Self {
            cluster_data,
            rolling_indices,
            rolling_indices_size,
            metadata,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
