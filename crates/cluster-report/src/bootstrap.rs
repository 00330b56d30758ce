use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a Python-style level name to a [`tracing_subscriber::EnvFilter`]
/// directive. Unknown names pass through unchanged.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Open `path` for appending, creating it and any missing parents.
pub fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Build the `tracing` subscriber for `log_level`.
///
/// Events go to `log_file` (appended, no ANSI colours) when one is given and
/// to stderr otherwise. Falls back to `"info"` if the level is not recognised.
pub fn build_subscriber(
    log_level: &str,
    log_file: Option<&Path>,
) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => (
            None,
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(open_log_file(path)?))
                    .with_ansi(false)
                    .with_target(false),
            ),
        ),
        None => (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false),
            ),
            None,
        ),
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer))
}

/// Initialise the global `tracing` subscriber.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    build_subscriber(log_level, log_file)?.init();
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_level_directive_maps_python_names() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("CRITICAL"), "error");
    }

    #[test]
    fn test_level_directive_passes_unknown_through() {
        assert_eq!(level_directive("Trace"), "trace");
    }

    #[test]
    fn test_open_log_file_creates_parents() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("logs").join("report.log");

        open_log_file(&path).expect("open");

        assert!(path.is_file());
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("report.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_log_file_receives_events_at_level() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("logs").join("report.log");

        let subscriber = build_subscriber("WARNING", Some(&path)).expect("subscriber");
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("filtered out");
            tracing::warn!("disk nearly full");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("disk nearly full"));
        assert!(!content.contains("filtered out"));
        assert!(!content.contains('\u{1b}'));
    }
}
