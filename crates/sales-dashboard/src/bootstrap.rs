use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name used when the TUI logs to the default location.
pub const DEFAULT_LOG_NAME: &str = "sales-dashboard.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `<home>/.sales-dashboard/logs/` exists and return the logs
/// directory.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<PathBuf> {
    let logs = home.join(".sales-dashboard").join("logs");
    std::fs::create_dir_all(&logs)?;
    Ok(logs)
}

/// [`ensure_directories_in`] rooted at the user's home directory.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

/// Where log output should go.
///
/// An explicit `--log-file` always wins. Otherwise the TUI logs into
/// `logs_dir` so records don't land on the alternate screen, and batch
/// output (`--format json`, `--export`) logs to stderr.
pub fn resolve_log_file(explicit: Option<&Path>, interactive: bool, logs_dir: &Path) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None if interactive => Some(logs_dir.join(DEFAULT_LOG_NAME)),
        None => None,
    }
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name onto a tracing filter directive.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Falls back to `info` if the level is not recognised. With `log_file` set,
/// records are appended to that file without ANSI colours; otherwise they go
/// to stderr.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => (
            None,
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories_creates_logs_dir() {
        let tmp = TempDir::new().expect("tempdir");

        let logs = ensure_directories_in(tmp.path()).expect("ensure_directories should succeed");

        assert_eq!(logs, tmp.path().join(".sales-dashboard").join("logs"));
        assert!(logs.is_dir(), "logs dir must exist");
    }

    #[test]
    fn test_ensure_directories_is_idempotent() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories_in(tmp.path()).unwrap();
        assert!(ensure_directories_in(tmp.path()).is_ok());
    }

    #[test]
    fn test_filter_directive_maps_level_names() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("INFO"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("CRITICAL"), "error");
        assert_eq!(filter_directive("trace"), "trace");
    }

    #[test]
    fn test_resolve_log_file() {
        let logs = Path::new("/var/tmp/logs");
        let explicit = Path::new("/tmp/run.log");

        assert_eq!(
            resolve_log_file(Some(explicit), true, logs),
            Some(explicit.to_path_buf())
        );
        assert_eq!(
            resolve_log_file(None, true, logs),
            Some(logs.join(DEFAULT_LOG_NAME))
        );
        assert_eq!(resolve_log_file(None, false, logs), None);
    }

    #[test]
    fn test_setup_logging_writes_to_file() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("nested").join("dashboard.log");

        // Only one global subscriber per process; this is the sole test that
        // installs one.
        setup_logging("INFO", Some(&path)).expect("setup_logging should succeed");
        tracing::info!("dashboard log line");

        let content = std::fs::read_to_string(&path).expect("log file");
        assert!(content.contains("dashboard log line"));
    }
}
