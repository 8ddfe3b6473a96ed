use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashboard_core::error::DashboardError;
use dashboard_core::settings::Settings;
use dashboard_runtime::data_manager::FALLBACK_FILE_NAME;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application directory under the user's home.
pub const APP_DIR: &str = ".bird-dashboard";

/// Log file used by the interactive view when `--log-file` is not given.
const DEFAULT_LOG_FILE: &str = "bird-dashboard.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// The user's home directory, or `.` when it cannot be determined.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Ensure the `~/.bird-dashboard/` hierarchy exists under `home`.
///
/// Creates, including any missing parents:
/// - `~/.bird-dashboard/`
/// - `~/.bird-dashboard/logs/`
/// - `~/.bird-dashboard/data/`
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<()> {
    let app_dir = home.join(APP_DIR);
    std::fs::create_dir_all(app_dir.join("logs"))?;
    std::fs::create_dir_all(app_dir.join("data"))?;
    Ok(())
}

/// `~/.bird-dashboard/data/observations.csv`.
pub fn default_fallback_path_in(home: &Path) -> PathBuf {
    home.join(APP_DIR).join("data").join(FALLBACK_FILE_NAME)
}

/// Where logs go: the explicit `--log-file`, else a file under
/// `~/.bird-dashboard/logs/` for the interactive view (which owns the
/// terminal), else `None` for stderr.
pub fn log_file_for(settings: &Settings, home: &Path) -> Option<PathBuf> {
    if let Some(path) = &settings.log_file {
        return Some(path.clone());
    }
    (settings.view == "dashboard").then(|| home.join(APP_DIR).join("logs").join(DEFAULT_LOG_FILE))
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name to a tracing filter directive.
///
/// Unrecognised names pass through unchanged so `EnvFilter` syntax such as
/// `dashboard_data=debug` still works.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Writes to `log_file` (appending, without ANSI colours) when given,
/// otherwise to stderr. Falls back to `info` if the level is not a valid
/// filter.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    Ok(())
}

// ── Source errors ──────────────────────────────────────────────────────────────

/// Message shown instead of any view when the source cannot be used.
pub fn blocking_message(err: &DashboardError, fallback: &Path) -> String {
    let hint = match err {
        DashboardError::SourceNotFound(_) => format!(
            "Pass an observation log with --file, or place one at {}.",
            fallback.display()
        ),
        DashboardError::EmptySource => {
            "The file has a header but no observation rows.".to_string()
        }
        DashboardError::MalformedSource(_) => {
            "Expected a semicolon-delimited UTF-8 file with a header row.".to_string()
        }
        _ => "Check the path passed with --file.".to_string(),
    };
    format!("Cannot show the dashboard: {err}\n{hint}")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
