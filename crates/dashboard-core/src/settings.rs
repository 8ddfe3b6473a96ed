use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chart identifiers accepted by `--hide`.
pub const CHART_NAMES: [&str; 8] = [
    "species-per-year",
    "species-trend",
    "top-species",
    "species-share",
    "monthly",
    "density",
    "markers",
    "table",
];

/// Output modes accepted by `--view`.
pub const VIEW_NAMES: [&str; 3] = ["dashboard", "report", "json"];

/// Colour themes accepted by `--theme`.
pub const THEME_NAMES: [&str; 4] = ["light", "dark", "classic", "auto"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Interactive dashboard for semicolon-delimited bird observation logs
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bird-dashboard",
    about = "Interactive dashboard for semicolon-delimited bird observation logs",
    version
)]
pub struct Settings {
    /// Observation log to load (uses the fallback source when omitted)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Fallback observation log used when no file is given
    #[arg(long, env = "BIRD_DASHBOARD_DATA")]
    pub fallback: Option<PathBuf>,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = VIEW_NAMES)]
    pub view: String,

    /// Species filter: an exact label, "all" or "none"
    #[arg(long, default_value = "all")]
    pub species: String,

    /// Year filter: a calendar year or "custom" to use --date-from/--date-to
    #[arg(long, default_value = "custom")]
    pub year: String,

    /// Inclusive lower date bound (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub date_from: Option<NaiveDate>,

    /// Inclusive upper date bound (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub date_to: Option<NaiveDate>,

    /// Number of species in the top-N chart (1-100)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub top: u32,

    /// Hide a chart (repeatable)
    #[arg(long, value_parser = CHART_NAMES)]
    pub hide: Vec<String>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = THEME_NAMES)]
    pub theme: String,

    /// Timezone for timestamps (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

/// Strict `YYYY-MM-DD` parser for date arguments.
fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::time_utils::parse_iso_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got \"{s}\""))
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.bird-dashboard/last_used.json`.
///
/// The source file and filter selections are absent; they belong to one
/// run, and a run without `--file` always uses the fallback source.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".bird-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to a temp file then rename.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Raw ArgMatches are needed to query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. clap stores the arg id using the field name.
        // Persisted names are re-checked against the clap value lists since
        // the file may have been edited by hand.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view.filter(|v| VIEW_NAMES.contains(&v.as_str())) {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme.filter(|v| THEME_NAMES.contains(&v.as_str())) {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top.filter(|n| (1..=100).contains(n)) {
                settings.top = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist last-used parameters");
        }

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            top: Some(s.top),
            view: Some(s.view.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
