//! Dashboard view assembly.
//!
//! Takes the full record set plus a [`DashboardRequest`], derives the
//! filtered subset and runs every enabled aggregation over it, returning a
//! serialisable [`DashboardView`]. Nothing is cached between calls.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use dashboard_core::models::{Observation, RecordSet};
use serde::Serialize;
use tracing::debug;

use crate::aggregator::{
    DensityPoint, MonthlyTotal, ObservationAggregator, SpeciesCount, SpeciesShare, SubsetStats,
    YearCount, YearSpeciesCount, DEFAULT_TOP_N,
};
use crate::filter::FilterCriteria;

/// Sentinel shown first in the species picker.
pub const ALL_SPECIES: &str = "all";

/// Geographic centre of Czechia, used when no record carries coordinates.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (49.8175, 15.4730);

// ── Charts ────────────────────────────────────────────────────────────────────

/// Every toggleable dashboard section, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chart {
    SpeciesPerYear,
    SpeciesTrend,
    TopSpecies,
    SpeciesShare,
    Monthly,
    Density,
    Markers,
    Table,
}

impl Chart {
    pub const ALL: [Chart; 8] = [
        Chart::SpeciesPerYear,
        Chart::SpeciesTrend,
        Chart::TopSpecies,
        Chart::SpeciesShare,
        Chart::Monthly,
        Chart::Density,
        Chart::Markers,
        Chart::Table,
    ];

    /// Command-line name, as accepted by `--hide`.
    pub fn name(self) -> &'static str {
        match self {
            Chart::SpeciesPerYear => "species-per-year",
            Chart::SpeciesTrend => "species-trend",
            Chart::TopSpecies => "top-species",
            Chart::SpeciesShare => "species-share",
            Chart::Monthly => "monthly",
            Chart::Density => "density",
            Chart::Markers => "markers",
            Chart::Table => "table",
        }
    }

    /// Human-readable title used by the terminal and text views.
    pub fn title(self) -> &'static str {
        match self {
            Chart::SpeciesPerYear => "Species per year",
            Chart::SpeciesTrend => "Observations per year",
            Chart::TopSpecies => "Top species",
            Chart::SpeciesShare => "Species share",
            Chart::Monthly => "Monthly totals",
            Chart::Density => "Observation density",
            Chart::Markers => "Observation sites",
            Chart::Table => "Observations",
        }
    }

    pub fn from_name(name: &str) -> Option<Chart> {
        Chart::ALL.into_iter().find(|c| c.name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One visibility flag per [`Chart`]; everything is visible by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartToggles {
    enabled: [bool; 8],
}

impl Default for ChartToggles {
    fn default() -> Self {
        Self { enabled: [true; 8] }
    }
}

impl ChartToggles {
    /// Start with every chart on, then switch off the named ones.
    ///
    /// Unknown names are ignored.
    pub fn with_hidden<S: AsRef<str>>(hidden: &[S]) -> Self {
        let mut toggles = Self::default();
        for chart in hidden.iter().filter_map(|n| Chart::from_name(n.as_ref())) {
            toggles.set(chart, false);
        }
        toggles
    }

    pub fn is_enabled(&self, chart: Chart) -> bool {
        self.enabled[chart.index()]
    }

    pub fn set(&mut self, chart: Chart, enabled: bool) {
        self.enabled[chart.index()] = enabled;
    }

    /// Flip one chart and return its new state.
    pub fn toggle(&mut self, chart: Chart) -> bool {
        let slot = &mut self.enabled[chart.index()];
        *slot = !*slot;
        *slot
    }
}

// ── Map helpers ───────────────────────────────────────────────────────────────

/// A single located sighting for the map layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub site: String,
    pub count: u64,
    pub species: Option<String>,
    pub date: Option<NaiveDate>,
}

/// One marker per record carrying both coordinates, in input order.
pub fn markers(records: &RecordSet) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|obs| {
            let (latitude, longitude) = obs.coordinates()?;
            Some(Marker {
                latitude,
                longitude,
                site: obs.site.clone(),
                count: obs.count,
                species: obs.species.clone(),
                date: obs.date,
            })
        })
        .collect()
}

/// Mean of all available coordinates, or [`DEFAULT_MAP_CENTER`].
pub fn map_center(records: &RecordSet) -> (f64, f64) {
    let (mut lat_sum, mut lon_sum, mut n) = (0.0, 0.0, 0usize);
    for (lat, lon) in records.iter().filter_map(Observation::coordinates) {
        lat_sum += lat;
        lon_sum += lon;
        n += 1;
    }
    if n == 0 {
        return DEFAULT_MAP_CENTER;
    }
    (lat_sum / n as f64, lon_sum / n as f64)
}

// ── Picker helpers ────────────────────────────────────────────────────────────

/// `"all"` followed by every distinct species label, sorted.
pub fn species_options(records: &RecordSet) -> Vec<String> {
    let labels: BTreeSet<&str> = records.iter().filter_map(Observation::species_label).collect();
    std::iter::once(ALL_SPECIES.to_string())
        .chain(labels.into_iter().map(str::to_string))
        .collect()
}

/// Earliest and latest dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

/// `None` when no record has a valid date.
pub fn date_span(records: &RecordSet) -> Option<DateSpan> {
    let mut dates = records.iter().filter_map(|o| o.date);
    let first = dates.next()?;
    let (first, last) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateSpan { first, last })
}

// ── View assembly ─────────────────────────────────────────────────────────────

/// Inputs for one dashboard computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    /// Subset selection.
    pub criteria: FilterCriteria,
    /// Species whose yearly trend is charted; `None` omits the trend.
    pub trend_species: Option<String>,
    pub charts: ChartToggles,
    /// Size of the top-species ranking and share breakdown.
    pub top_n: usize,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            trend_species: None,
            charts: ChartToggles::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Yearly observation counts for one species.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesTrend {
    pub species: String,
    pub years: Vec<YearCount>,
}

/// Located sightings together with the map's centre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLayer {
    pub center: (f64, f64),
    pub markers: Vec<Marker>,
}

/// Every derived view for one request. Hidden charts are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub summary: SubsetStats,
    /// Species picker entries, from the full record set.
    pub species_options: Vec<String>,
    /// Year domain, from the full record set.
    pub years: Vec<i32>,
    /// Dated extent of the full record set.
    pub date_span: Option<DateSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_per_year: Option<Vec<YearSpeciesCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_trend: Option<SpeciesTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_species: Option<Vec<SpeciesCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_share: Option<Vec<SpeciesShare>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly: Option<Vec<MonthlyTotal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<Vec<DensityPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markers: Option<MarkerLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<RecordSet>,
}

/// Filter `records` and compute every chart enabled in `request`.
pub fn build_dashboard(records: &RecordSet, request: &DashboardRequest) -> DashboardView {
    let subset = request.criteria.apply(records);
    let charts = &request.charts;
    let years = ObservationAggregator::years(records);

    debug!(
        total = records.len(),
        subset = subset.len(),
        species = ?request.criteria.species,
        "building dashboard"
    );

    let enabled = |chart: Chart| charts.is_enabled(chart);

    let species_trend = match &request.trend_species {
        Some(species) if enabled(Chart::SpeciesTrend) => Some(SpeciesTrend {
            species: species.clone(),
            years: ObservationAggregator::observations_per_year_for_species(
                &subset, species, &years,
            ),
        }),
        _ => None,
    };

    DashboardView {
        summary: ObservationAggregator::summarize(&subset),
        species_options: species_options(records),
        date_span: date_span(records),
        species_per_year: enabled(Chart::SpeciesPerYear)
            .then(|| ObservationAggregator::species_per_year(&subset)),
        species_trend,
        top_species: enabled(Chart::TopSpecies)
            .then(|| ObservationAggregator::top_species(&subset, request.top_n)),
        species_share: enabled(Chart::SpeciesShare)
            .then(|| ObservationAggregator::species_share(&subset, request.top_n)),
        monthly: enabled(Chart::Monthly).then(|| ObservationAggregator::monthly_totals(&subset)),
        density: enabled(Chart::Density)
            .then(|| ObservationAggregator::coordinate_density(&subset)),
        markers: enabled(Chart::Markers).then(|| MarkerLayer {
            center: map_center(&subset),
            markers: markers(&subset),
        }),
        table: enabled(Chart::Table).then(|| subset.clone()),
        years,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
