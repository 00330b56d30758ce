mod bootstrap;

use std::time::Instant;

use anyhow::{Context, Result};
use report_core::filter::TreeFilter;
use report_core::formatting::{format_bytes, format_percent};
use report_core::settings::Settings;
use report_data::grouping::{group_nodes, summarize_roles};
use report_data::loader::DiagnosticsLoader;
use report_data::pipeline::process_diagnostics;
use report_data::raw::RawDiagnostics;
use report_render::renderer::{OutputFormat, ReportRenderer};
use serde::Serialize;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("cluster-report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Diagnostics: {}, Mode: {}",
        settings.diagnostics_dir.display(),
        settings.mode
    );

    let start = Instant::now();
    let loader = DiagnosticsLoader::new(&settings.diagnostics_dir);
    let raw = loader.load().with_context(|| {
        format!(
            "failed to load diagnostics from {}",
            loader.diagnostics_dir().display()
        )
    })?;

    match settings.mode.as_str() {
        "report" => run_report(&settings, &raw)?,
        "groups" => print_json(&group_nodes(&raw)?)?,
        "roles" => print_json(&summarize_roles(&raw)?)?,
        unknown => anyhow::bail!("Unknown mode: {}", unknown),
    }

    tracing::info!("Finished in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Process the diagnostics, apply the view filter and write the report.
fn run_report(settings: &Settings, raw: &RawDiagnostics) -> Result<()> {
    let config = settings.pipeline_config()?;
    let mut report = process_diagnostics(raw, &config)?;

    let disk_total: u64 = report
        .cluster_data
        .nodes()
        .map(|node| node.disk_total_bytes)
        .sum();
    let node_count = report.cluster_data.node_count();
    if node_count > 0 {
        let mean_disk_used = report
            .cluster_data
            .nodes()
            .map(|node| node.disk_used_percent)
            .sum::<f64>()
            / node_count as f64;
        tracing::info!(
            "Cluster disk: {} across {} nodes, {} used on average",
            format_bytes(disk_total),
            node_count,
            format_percent(mean_disk_used)
        );
    }

    let filter = TreeFilter::from_options(
        settings.hide_indices,
        settings.filter_rolling.as_deref(),
        settings.filter_index.as_deref(),
    );
    if filter != TreeFilter::None {
        tracing::info!("Applying view filter: {:?}", filter);
        report.cluster_data = filter.apply(&report);
    }

    let format = OutputFormat::from_name(&settings.format)?;
    ReportRenderer::new(&report)?.write(&settings.output, format)?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::error::ReportError;
    use serde_json::{json, Value};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_bundle(dir: &Path) {
        std::fs::create_dir_all(dir.join("nodes")).unwrap();
        std::fs::create_dir_all(dir.join("indices")).unwrap();
        std::fs::write(
            dir.join("nodes/nodes_stats.json"),
            json!({"nodes": {"n1": {"fs": {"total": {"total_in_bytes": 100, "free_in_bytes": 40}}}}})
                .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.join("nodes/nodes_info.json"),
            json!({"nodes": {"n1": {"name": "warm-1", "roles": ["data_warm"]}}}).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.join("indices/indices_stats.json"),
            json!({"indices": {
                "metrics-7": {
                    "shards": {"0": {"routing": {"node": "n1"}, "store": {"size_in_bytes": 3145728}}},
                    "total": {"store": {"size_in_bytes": 3145728}}
                },
                "users": {
                    "shards": {"0": {"routing": {"node": "n1"}, "store": {"size_in_bytes": 2097152}}},
                    "total": {"store": {"size_in_bytes": 2097152}}
                }
            }})
            .to_string(),
        )
        .unwrap();
    }

    fn settings_for(dir: &Path, extra: &[&str]) -> Settings {
        let mut args = vec![
            "cluster-report".to_string(),
            dir.display().to_string(),
            "--output".to_string(),
            dir.join("out/report.json").display().to_string(),
            "--format".to_string(),
            "json".to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        Settings::load_from_args(args)
    }

    fn read_output(dir: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(dir.join("out/report.json")).unwrap())
            .unwrap()
    }

    #[test]
    fn test_run_report_writes_json() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path());
        let settings = settings_for(tmp.path(), &[]);
        let raw = DiagnosticsLoader::new(tmp.path()).load().unwrap();

        run_report(&settings, &raw).expect("report");

        let out = read_output(tmp.path());
        let group = &out["cluster_data"]["children"][0];
        assert_eq!(group["name"], "Warm Nodes");
        assert_eq!(group["children"][0]["diskUsedPercent"], 60.0);
        assert_eq!(group["children"][0]["children"].as_array().unwrap().len(), 2);
        assert_eq!(out["rolling_indices_size"]["metrics"], 3.0);
    }

    #[test]
    fn test_run_report_applies_index_filter() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path());
        let settings = settings_for(tmp.path(), &["--filter-index", "users"]);
        let raw = DiagnosticsLoader::new(tmp.path()).load().unwrap();

        run_report(&settings, &raw).expect("report");

        let out = read_output(tmp.path());
        let entries = &out["cluster_data"]["children"][0]["children"][0]["children"];
        assert_eq!(entries.as_array().unwrap().len(), 1);
        assert_eq!(entries[0]["name"], "users");
        // Rollups are left untouched by view filters.
        assert_eq!(out["rolling_indices"]["metrics"][0], "metrics-7");
    }

    #[test]
    fn test_run_report_rejects_negative_floor() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path());
        let settings = settings_for(tmp.path(), &["--min-index-size-mb=-1"]);
        let raw = DiagnosticsLoader::new(tmp.path()).load().unwrap();

        assert!(run_report(&settings, &raw).is_err());
        assert!(!tmp.path().join("out/report.json").exists());
    }

    #[test]
    fn test_run_report_error_keeps_report_error_type() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path());
        let settings = settings_for(tmp.path(), &["--min-index-size-mb=-1"]);
        let raw = DiagnosticsLoader::new(tmp.path()).load().unwrap();

        let err = run_report(&settings, &raw).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::Config(_))
        ));
    }
}
