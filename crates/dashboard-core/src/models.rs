use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One normalized row of an observation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar date of the sighting; `None` when the source value did not
    /// match `YYYY-MM-DD` exactly.
    pub date: Option<NaiveDate>,
    /// Species label; `None` when the column is missing or blank.
    #[serde(default)]
    pub species: Option<String>,
    /// Number of individuals seen. Never fractional, defaults to 1.
    pub count: u64,
    /// Free-text location label, empty when missing.
    #[serde(default)]
    pub site: String,
    /// Latitude in decimal degrees.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Raw URL of the source entry.
    #[serde(default)]
    pub link: Option<String>,
}

impl Observation {
    /// Convenience constructor used by tests and fixtures.
    pub fn new(date: Option<NaiveDate>, species: &str, count: u64) -> Self {
        Self {
            date,
            species: Some(species.to_string()).filter(|s| !s.trim().is_empty()),
            count,
            site: String::new(),
            latitude: None,
            longitude: None,
            link: None,
        }
    }

    /// Species label, if one is present.
    pub fn species_label(&self) -> Option<&str> {
        self.species.as_deref()
    }

    /// Calendar year of the sighting.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Calendar month (1–12) of the sighting.
    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    /// `(latitude, longitude)` when both coordinates are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

// ── RecordSet ─────────────────────────────────────────────────────────────────

/// Immutable collection of observations for one loaded source.
///
/// There is no way to mutate the rows once the set is built; filtering
/// produces a new set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Observation>,
}

impl RecordSet {
    pub fn new(records: Vec<Observation>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Observation] {
        &self.records
    }
}

impl FromIterator<Observation> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Filter parameters ─────────────────────────────────────────────────────────

/// Species criterion accepted by the filter engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesFilter {
    /// Keep every species, including rows without a label.
    #[default]
    All,
    /// Keep only rows whose label equals this one exactly.
    Exact(String),
}

impl SpeciesFilter {
    pub fn matches(&self, observation: &Observation) -> bool {
        match self {
            SpeciesFilter::All => true,
            SpeciesFilter::Exact(label) => observation.species_label() == Some(label.as_str()),
        }
    }
}

/// Inclusive date range. Open bounds extend indefinitely.
///
/// A range with at least one bound excludes undated records; the fully
/// open range keeps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Both ends given.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self::new(Some(from), Some(to))
    }

    /// No bounds at all; every record passes, dated or not.
    pub fn full() -> Self {
        Self::default()
    }

    /// January 1st through December 31st of `year`.
    ///
    /// Returns `None` for years chrono cannot represent.
    pub fn calendar_year(year: i32) -> Option<Self> {
        let from = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let to = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self::between(from, to))
    }

    pub fn is_bounded(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_bounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}
