use chrono::NaiveDate;

/// Label shown for records whose date could not be parsed.
pub const UNKNOWN_DATE: &str = "unknown";

/// Format an integer tally with thousands separators.
///
/// ```
/// use dashboard_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(12_345), "12,345");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Render an optional observation date, using [`UNKNOWN_DATE`] for `None`.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}

/// Render a coordinate pair with five decimals (roughly one metre).
///
/// ```
/// use dashboard_core::formatting::format_coordinates;
///
/// assert_eq!(format_coordinates(49.8175, 15.473), "49.81750, 15.47300");
/// ```
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{:.5}, {:.5}", latitude, longitude)
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = s.len() % 3;
    for (i, c) in s.chars().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
