//! Loading and normalization of semicolon-delimited observation logs.
//!
//! Maps the source header onto canonical fields, drops unknown columns and
//! converts every row into an [`Observation`]. Bad field values are replaced
//! by their documented defaults; only a source that cannot be read as
//! delimited text at all, or one without data rows, is an error.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{Observation, RecordSet};
use dashboard_core::time_utils::parse_iso_date;
use tracing::debug;

/// Field delimiter of the observation log.
pub const DELIMITER: u8 = b';';

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ── Column mapping ────────────────────────────────────────────────────────────

/// Canonical field a source column is mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Species,
    Count,
    Site,
    Latitude,
    Longitude,
    Link,
}

impl Column {
    /// Resolve a source header name. Unknown names are dropped.
    pub fn from_header(name: &str) -> Option<Self> {
        match name.trim() {
            "Date" => Some(Column::Date),
            "SpeciesName" => Some(Column::Species),
            "CountMin" => Some(Column::Count),
            "SiteName" => Some(Column::Site),
            "Latitude" => Some(Column::Latitude),
            "Longitude" => Some(Column::Longitude),
            "ItemLink" => Some(Column::Link),
            _ => None,
        }
    }
}

/// Positions of the canonical columns inside one source layout.
#[derive(Debug, Default)]
struct ColumnIndex {
    date: Option<usize>,
    species: Option<usize>,
    count: Option<usize>,
    site: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    link: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut index = Self::default();
        for (pos, name) in headers.iter().enumerate() {
            let slot = match Column::from_header(name) {
                Some(Column::Date) => &mut index.date,
                Some(Column::Species) => &mut index.species,
                Some(Column::Count) => &mut index.count,
                Some(Column::Site) => &mut index.site,
                Some(Column::Latitude) => &mut index.latitude,
                Some(Column::Longitude) => &mut index.longitude,
                Some(Column::Link) => &mut index.link,
                None => {
                    debug!("dropping unmapped column \"{}\"", name);
                    continue;
                }
            };
            // First occurrence wins for duplicated headers.
            slot.get_or_insert(pos);
        }
        index
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read and normalize an observation log from any byte stream.
///
/// Fails with [`DashboardError::EmptySource`] when there are no data rows and
/// with [`DashboardError::MalformedSource`] when the stream is not valid
/// UTF-8 delimited text.
pub fn load<R: Read>(mut source: R) -> Result<RecordSet> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    load_bytes(&bytes)
}

/// Read and normalize an observation log from a file on disk.
pub fn load_file(path: &Path) -> Result<RecordSet> {
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    load_bytes(&bytes)
}

/// Read and normalize an observation log held in memory.
pub fn load_bytes(bytes: &[u8]) -> Result<RecordSet> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(DashboardError::EmptySource);
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .trim(Trim::All)
        // Short rows are padded with missing values; long rows are rejected below.
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::MalformedSource(format!("unreadable header: {e}")))?
        .clone();
    let index = ColumnIndex::from_headers(&headers);

    let mut observations = Vec::new();
    let mut stats = NormalizeStats::default();

    for (row, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| DashboardError::MalformedSource(format!("row {}: {e}", row + 1)))?;
        if record.len() > headers.len() {
            return Err(DashboardError::MalformedSource(format!(
                "row {} has {} fields but the header has {}",
                row + 1,
                record.len(),
                headers.len()
            )));
        }
        observations.push(normalize_record(&record, &index, &mut stats));
    }

    if observations.is_empty() {
        return Err(DashboardError::EmptySource);
    }

    debug!(
        rows = observations.len(),
        undated = stats.undated,
        defaulted_counts = stats.defaulted_counts,
        without_coordinates = stats.without_coordinates,
        "observation log normalized"
    );

    Ok(RecordSet::new(observations))
}

// ── Field normalization ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct NormalizeStats {
    undated: usize,
    defaulted_counts: usize,
    without_coordinates: usize,
}

fn normalize_record(
    record: &StringRecord,
    index: &ColumnIndex,
    stats: &mut NormalizeStats,
) -> Observation {
    let field = move |pos: Option<usize>| {
        pos.and_then(|p| record.get(p))
            .filter(|v| !v.is_empty())
    };

    let date = field(index.date).and_then(parse_iso_date);
    if date.is_none() {
        stats.undated += 1;
    }

    let count = match field(index.count).map(parse_count) {
        Some(Some(n)) => n,
        _ => {
            stats.defaulted_counts += 1;
            1
        }
    };

    let latitude = field(index.latitude).and_then(|v| parse_coordinate(v, 90.0));
    let longitude = field(index.longitude).and_then(|v| parse_coordinate(v, 180.0));
    if latitude.is_none() || longitude.is_none() {
        stats.without_coordinates += 1;
    }

    Observation {
        date,
        species: field(index.species).map(str::to_string),
        count,
        site: field(index.site).unwrap_or_default().to_string(),
        latitude,
        longitude,
        link: field(index.link).map(str::to_string),
    }
}

/// Largest individual count accepted for a single row.
pub const MAX_COUNT: u64 = 1_000_000_000;

/// Coerce a count cell to a non-negative integer.
///
/// Integers are taken as-is. Fractional values are truncated toward zero
/// (`2.9` → `2`), and a decimal comma is accepted (`2,5` → `2`). Negative,
/// non-finite, non-numeric or values above [`MAX_COUNT`] return `None` so
/// the caller substitutes the default of 1.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let count = match raw.parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            let value: f64 = raw.replace(',', ".").parse().ok()?;
            if !value.is_finite() || value < 0.0 || value > MAX_COUNT as f64 {
                debug!("count \"{}\" is not a usable non-negative number", raw);
                return None;
            }
            value.trunc() as u64
        }
    };
    if count > MAX_COUNT {
        debug!("count {} exceeds the maximum of {}", count, MAX_COUNT);
        return None;
    }
    Some(count)
}

/// Parse a decimal-degree coordinate, rejecting values beyond `limit`.
fn parse_coordinate(raw: &str, limit: f64) -> Option<f64> {
    let value: f64 = raw.trim().replace(',', ".").parse().ok()?;
    (value.is_finite() && value.abs() <= limit).then_some(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const HEADER: &str = "Date;SiteName;CountMin;ItemLink;Latitude;Longitude;SpeciesName";

    fn csv(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    // ── load_bytes ────────────────────────────────────────────────────────────

    #[test]
    fn test_load_maps_all_columns() {
        let text = csv(&[
            "2023-01-03;Střecha;4;https://example.org/obs/1;49.19;16.61;Vrabec domácí",
        ]);
        let set = load_bytes(text.as_bytes()).unwrap();

        assert_eq!(set.len(), 1);
        let obs = &set.records()[0];
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2023, 1, 3));
        assert_eq!(obs.species.as_deref(), Some("Vrabec domácí"));
        assert_eq!(obs.count, 4);
        assert_eq!(obs.site, "Střecha");
        assert_eq!(obs.latitude, Some(49.19));
        assert_eq!(obs.longitude, Some(16.61));
        assert_eq!(obs.link.as_deref(), Some("https://example.org/obs/1"));
    }

    #[test]
    fn test_load_column_order_irrelevant_and_extras_dropped() {
        let text = "SpeciesName;Observer;Date;CountMin\nKos;Jana;2023-05-01;3\n";
        let set = load_bytes(text.as_bytes()).unwrap();

        let obs = &set.records()[0];
        assert_eq!(obs.species.as_deref(), Some("Kos"));
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2023, 5, 1));
        assert_eq!(obs.count, 3);
        assert_eq!(obs.site, "");
        assert!(obs.link.is_none());
        assert!(obs.coordinates().is_none());
    }

    #[test]
    fn test_load_strips_byte_order_mark() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(csv(&["2023-01-01;Park;1;;;;Kos"]).as_bytes());
        let set = load_bytes(&bytes).unwrap();

        // The BOM must not leak into the first header name.
        assert_eq!(set.records()[0].date, NaiveDate::from_ymd_opt(2023, 1, 1));
    }

    #[test]
    fn test_load_bad_date_becomes_absent() {
        let text = csv(&[
            "2023-1-5;Park;1;;;;Kos",
            "05.01.2023;Park;1;;;;Kos",
            ";Park;1;;;;Kos",
        ]);
        let set = load_bytes(text.as_bytes()).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.iter().all(|o| o.date.is_none()));
    }

    #[test]
    fn test_load_missing_count_defaults_to_one() {
        let text = csv(&["2023-01-01;Park;;;;;Kos", "2023-01-01;Park;many;;;;Kos"]);
        let set = load_bytes(text.as_bytes()).unwrap();
        assert!(set.iter().all(|o| o.count == 1));
    }

    #[test]
    fn test_load_missing_count_column_defaults_to_one() {
        let text = "Date;SpeciesName\n2023-01-01;Kos\n";
        let set = load_bytes(text.as_bytes()).unwrap();
        assert_eq!(set.records()[0].count, 1);
    }

    #[test]
    fn test_load_short_rows_are_padded() {
        let text = csv(&["2023-01-01;Park"]);
        let set = load_bytes(text.as_bytes()).unwrap();
        let obs = &set.records()[0];
        assert_eq!(obs.site, "Park");
        assert_eq!(obs.count, 1);
        assert!(obs.species.is_none());
    }

    #[test]
    fn test_load_header_only_is_empty_source() {
        let text = format!("{HEADER}\n");
        let err = load_bytes(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::EmptySource));
    }

    #[test]
    fn test_load_nothing_is_empty_source() {
        assert!(matches!(
            load_bytes(b"").unwrap_err(),
            DashboardError::EmptySource
        ));
        assert!(matches!(
            load_bytes(UTF8_BOM).unwrap_err(),
            DashboardError::EmptySource
        ));
    }

    #[test]
    fn test_load_invalid_utf8_is_malformed() {
        let mut bytes = csv(&[]).into_bytes();
        bytes.extend_from_slice(b"2023-01-01;\xFF\xFE;1;;;;Kos\n");
        let err = load_bytes(&bytes).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedSource(_)), "{err}");
    }

    #[test]
    fn test_load_row_longer_than_header_is_malformed() {
        let text = "Date;SpeciesName\n2023-01-01;Kos;extra;fields\n";
        let err = load_bytes(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::MalformedSource(_)), "{err}");
    }

    #[test]
    fn test_load_out_of_range_coordinates_dropped() {
        let text = csv(&["2023-01-01;Park;1;;95.0;16.6;Kos", "2023-01-01;Park;1;;49,5;16,25;Kos"]);
        let set = load_bytes(text.as_bytes()).unwrap();
        assert!(set.records()[0].latitude.is_none());
        assert_eq!(set.records()[0].longitude, Some(16.6));
        assert_eq!(set.records()[1].coordinates(), Some((49.5, 16.25)));
    }

    #[test]
    fn test_load_independent_calls_do_not_share_state() {
        let first = load_bytes(csv(&["2023-01-01;Park;1;;;;Kos"]).as_bytes()).unwrap();
        let second = load_bytes(csv(&["2024-02-02;Les;2;;;;Straka"]).as_bytes()).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second.records()[0].species.as_deref(), Some("Straka"));
    }

    #[test]
    fn test_load_from_reader() {
        let text = csv(&["2023-01-01;Park;1;;;;Kos", "2023-01-02;Les;2;;;;Straka"]);
        let set = load(std::io::Cursor::new(text)).unwrap();
        assert_eq!(set.len(), 2);
    }

    // ── load_file ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_file_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("birds.csv");
        std::fs::write(&path, csv(&["2023-01-01;Park;1;;;;Kos"])).unwrap();

        let set = load_file(&path).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_load_file_missing_is_file_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::FileRead { .. }));
    }

    // ── parse_count ───────────────────────────────────────────────────────────

    #[test]
    fn test_parse_count_integers() {
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("12"), Some(12));
    }

    #[test]
    fn test_parse_count_fractions_truncate() {
        assert_eq!(parse_count("2.9"), Some(2));
        assert_eq!(parse_count("0.5"), Some(0));
        assert_eq!(parse_count("2,5"), Some(2));
        assert_eq!(parse_count("3.0"), Some(3));
    }

    #[test]
    fn test_parse_count_rejects_invalid() {
        assert_eq!(parse_count("-2"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("inf"), None);
    }

    #[test]
    fn test_parse_count_rejects_values_above_max() {
        assert_eq!(parse_count("1000000000"), Some(MAX_COUNT));
        assert_eq!(parse_count("1000000001"), None);
        assert_eq!(parse_count("1e30"), None);
        assert_eq!(parse_count("18446744073709551615"), None);
    }

    #[test]
    fn test_load_huge_count_defaults_to_one() {
        let records =
            load_bytes(b"Date;SpeciesName;CountMin\n2023-01-01;Kos;1e30\n2023-01-02;Kos;5\n")
                .unwrap();
        let counts: Vec<u64> = records.iter().map(|o| o.count).collect();
        assert_eq!(counts, vec![1, 5]);
    }

    // ── Column::from_header ───────────────────────────────────────────────────

    #[test]
    fn test_column_from_header() {
        assert_eq!(Column::from_header("Date"), Some(Column::Date));
        assert_eq!(Column::from_header(" CountMin "), Some(Column::Count));
        assert_eq!(Column::from_header("ItemLink"), Some(Column::Link));
        assert_eq!(Column::from_header("Observer"), None);
        // Header names are case sensitive.
        assert_eq!(Column::from_header("date"), None);
    }
}
