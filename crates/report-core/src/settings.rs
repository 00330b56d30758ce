use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ReportError, Result};

/// Default cap on individually listed indices per node.
pub const DEFAULT_MAX_INDICES_PER_NODE: usize = 1000;

/// Default size floor (MB) below which an index is folded into "Other Indices".
pub const DEFAULT_MIN_INDEX_SIZE_MB: f64 = 1.0;

/// Default report output path.
pub const DEFAULT_OUTPUT: &str = "elasticsearch_cluster_visualization.html";

// ── PipelineConfig ─────────────────────────────────────────────────────────────

/// Tunables for index attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of individually listed indices per node.
    pub max_indices_per_node: usize,
    /// Minimum shard size (MB) for an index to be listed individually.
    pub min_index_size_mb: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_indices_per_node: DEFAULT_MAX_INDICES_PER_NODE,
            min_index_size_mb: DEFAULT_MIN_INDEX_SIZE_MB,
        }
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Build a resource-usage report from an Elasticsearch diagnostics bundle
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cluster-report",
    about = "Build a resource-usage report from an Elasticsearch diagnostics bundle",
    version
)]
pub struct Settings {
    /// Diagnostics directory containing nodes/ and indices/ dumps
    pub diagnostics_dir: PathBuf,

    /// What to produce
    #[arg(long, default_value = "report", value_parser = ["report", "groups", "roles"])]
    pub mode: String,

    /// Report output path
    #[arg(long, short, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Report output format
    #[arg(long, default_value = "html", value_parser = ["html", "json"])]
    pub format: String,

    /// Maximum number of indices listed individually per node
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_indices_per_node: u32,

    /// Minimum shard size in MB for an index to be listed individually
    #[arg(long, default_value = "1.0")]
    pub min_index_size_mb: f64,

    /// Only keep indices belonging to this rolling series
    #[arg(long, conflicts_with_all = ["filter_index", "hide_indices"])]
    pub filter_rolling: Option<String>,

    /// Only keep this index
    #[arg(long, conflicts_with = "hide_indices")]
    pub filter_index: Option<String>,

    /// Drop index entries and keep only tiers and nodes
    #[arg(long)]
    pub hide_indices: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    fn resolve(mut settings: Settings) -> Self {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Validated attribution tunables.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        if !self.min_index_size_mb.is_finite() || self.min_index_size_mb < 0.0 {
            return Err(ReportError::Config(format!(
                "minimum index size must be a non-negative number, got {}",
                self.min_index_size_mb
            )));
        }
        Ok(PipelineConfig {
            max_indices_per_node: self.max_indices_per_node as usize,
            min_index_size_mb: self.min_index_size_mb,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
