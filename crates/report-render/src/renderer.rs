//! Report rendering.
//!
//! The processed report is serialized once, validated, and then either
//! substituted into the embedded HTML template or written out as JSON.

use std::path::Path;

use report_core::error::{ReportError, Result};
use report_core::models::ProcessedReport;
use serde_json::Value;
use tracing::{debug, error, info};

const TEMPLATE: &str = include_str!("../templates/report.html");

const CLUSTER_DATA: &str = "{{ CLUSTER_DATA }}";
const ROLLING_INDICES: &str = "{{ ROLLING_INDICES }}";
const ROLLING_INDICES_SIZE: &str = "{{ ROLLING_INDICES_SIZE }}";
const ALL_INDICES: &str = "{{ ALL_INDICES }}";
const METADATA: &str = "{{ METADATA }}";

// ── OutputFormat ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            other => Err(ReportError::Config(format!("unknown output format '{}'", other))),
        }
    }
}

// ── ReportRenderer ────────────────────────────────────────────────────────────

/// Renders a validated report.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    payload: Value,
    all_indices: Vec<String>,
}

impl ReportRenderer {
    /// Serialize and validate `report`.
    pub fn new(report: &ProcessedReport) -> Result<Self> {
        let payload = serde_json::to_value(report)?;
        Self::validate(&payload)?;
        Ok(Self {
            payload,
            all_indices: report.cluster_data.all_index_names(),
        })
    }

    /// Check the serialized shape the template relies on.
    ///
    /// The tree needs `name` and `children`, and both rollups must be JSON
    /// objects.
    pub fn validate(payload: &Value) -> Result<()> {
        let cluster = payload
            .get("cluster_data")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid("cluster_data is not an object"))?;
        for field in ["name", "children"] {
            if !cluster.contains_key(field) {
                return Err(invalid(&format!("cluster_data is missing '{}'", field)));
            }
        }
        for rollup in ["rolling_indices", "rolling_indices_size"] {
            if !payload.get(rollup).is_some_and(Value::is_object) {
                return Err(invalid(&format!("{} is not an object", rollup)));
            }
        }
        Ok(())
    }

    /// Sorted names of every index shown in the tree.
    pub fn all_indices(&self) -> &[String] {
        &self.all_indices
    }

    pub fn render_html(&self) -> Result<String> {
        debug!("Template size: {} characters", TEMPLATE.len());

        let section = |key: &str| serde_json::to_string(&self.payload[key]).map(script_safe);
        let cluster_data = section("cluster_data")?;
        let rolling_indices = section("rolling_indices")?;
        let rolling_indices_size = section("rolling_indices_size")?;
        let metadata = section("metadata")?;
        let all_indices = serde_json::to_string(&self.all_indices).map(script_safe)?;

        debug!(
            "Cluster data: {} characters, rolling series: {} characters",
            cluster_data.len(),
            rolling_indices.len()
        );

        Ok(fill_template(
            TEMPLATE,
            &[
                (CLUSTER_DATA, cluster_data.as_str()),
                (ROLLING_INDICES, rolling_indices.as_str()),
                (ROLLING_INDICES_SIZE, rolling_indices_size.as_str()),
                (ALL_INDICES, all_indices.as_str()),
                (METADATA, metadata.as_str()),
            ],
        ))
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.payload)?)
    }

    /// Render in `format` and write to `path`, creating parent directories.
    pub fn write(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let body = match format {
            OutputFormat::Html => self.render_html()?,
            OutputFormat::Json => self.render_json()?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, body).map_err(|e| {
            error!("Failed to write report {}: {}", path.display(), e);
            ReportError::Io(e)
        })?;

        info!("Report generated: {}", path.display());
        Ok(())
    }
}

/// Substitute every placeholder in a single left-to-right pass, so text
/// inserted for one placeholder is never scanned for another.
fn fill_template(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((at, placeholder, value)) = substitutions
        .iter()
        .filter_map(|(placeholder, value)| {
            rest.find(placeholder).map(|at| (at, *placeholder, *value))
        })
        .min_by_key(|(at, _, _)| *at)
    {
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }

    out.push_str(rest);
    out
}

/// JSON embedded in a `<script>` block must not contain `</script>`.
fn script_safe(json: String) -> String {
    json.replace('<', "\\u003c")
}

fn invalid(message: &str) -> ReportError {
    error!("Invalid report structure: {}", message);
    ReportError::InvalidReport(message.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
