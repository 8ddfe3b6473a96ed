use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Uses the `iana-time-zone` crate directly – no subprocess calls.
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Parse an IANA timezone name, falling back to UTC with a warning.
pub fn resolve_timezone(tz_name: &str) -> Tz {
    tz_name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("unrecognised timezone \"{}\", falling back to UTC", tz_name);
        Tz::UTC
    })
}

/// Format a UTC instant as `YYYY-MM-DD HH:MM` in the named timezone.
pub fn format_local_timestamp(dt: &DateTime<Utc>, tz_name: &str) -> String {
    dt.with_timezone(&resolve_timezone(tz_name))
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

// ── Observation dates ─────────────────────────────────────────────────────────

fn iso_date_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"))
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Surrounding whitespace is ignored. Anything else (single-digit months,
/// times, other separators, impossible days such as `2023-02-30`) yields
/// `None`.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if !iso_date_shape().is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
