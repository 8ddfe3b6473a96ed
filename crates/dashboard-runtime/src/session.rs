//! Per-session filter and chart selections.
//!
//! A [`SessionContext`] is owned by whoever drives the dashboard (the
//! terminal app or a one-shot report). Selection changes are plain methods
//! on the context and never leak into another session.

use chrono::NaiveDate;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{DateRange, SpeciesFilter};
use dashboard_core::settings::Settings;
use dashboard_data::analysis::{Chart, ChartToggles, DashboardRequest, ALL_SPECIES};
use dashboard_data::filter::FilterCriteria;

use crate::data_manager::SourceIdentity;

/// Keyword accepted by `--species` for "no species chosen".
pub const NO_SPECIES: &str = "none";

/// Keyword accepted by `--year` for an explicit date range.
pub const CUSTOM_YEAR: &str = "custom";

// ── Selections ────────────────────────────────────────────────────────────────

/// Species picker state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SpeciesSelection {
    #[default]
    All,
    /// Nothing picked: the subset is unfiltered but no trend is charted.
    NoneSelected,
    Exact(String),
}

impl SpeciesSelection {
    /// `"all"` and `"none"` are keywords, anything else is an exact label.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            ALL_SPECIES => SpeciesSelection::All,
            NO_SPECIES | "" => SpeciesSelection::NoneSelected,
            label => SpeciesSelection::Exact(label.to_string()),
        }
    }

    pub fn filter(&self) -> SpeciesFilter {
        match self {
            SpeciesSelection::Exact(label) => SpeciesFilter::Exact(label.clone()),
            SpeciesSelection::All | SpeciesSelection::NoneSelected => SpeciesFilter::All,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SpeciesSelection::All => ALL_SPECIES,
            SpeciesSelection::NoneSelected => NO_SPECIES,
            SpeciesSelection::Exact(label) => label,
        }
    }
}

/// Year picker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearSelection {
    Year(i32),
    #[default]
    CustomRange,
}

impl YearSelection {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(CUSTOM_YEAR) {
            return Ok(YearSelection::CustomRange);
        }
        value
            .parse::<i32>()
            .ok()
            .filter(|y| DateRange::calendar_year(*y).is_some())
            .map(YearSelection::Year)
            .ok_or_else(|| {
                DashboardError::Config(format!("year must be a number or \"custom\", got \"{value}\""))
            })
    }
}

// ── SessionContext ────────────────────────────────────────────────────────────

/// Everything one viewer has selected for the loaded source.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub source: SourceIdentity,
    pub species: SpeciesSelection,
    pub year: YearSelection,
    /// Lower bound used while `year` is [`YearSelection::CustomRange`].
    pub date_from: Option<NaiveDate>,
    /// Upper bound used while `year` is [`YearSelection::CustomRange`].
    pub date_to: Option<NaiveDate>,
    pub charts: ChartToggles,
    pub top_n: usize,
}

impl SessionContext {
    /// Fresh context: all species, open range, every chart visible.
    pub fn new(source: SourceIdentity) -> Self {
        Self {
            source,
            species: SpeciesSelection::All,
            year: YearSelection::CustomRange,
            date_from: None,
            date_to: None,
            charts: ChartToggles::default(),
            top_n: dashboard_data::aggregator::DEFAULT_TOP_N,
        }
    }

    /// Seed the initial selections from command-line settings.
    pub fn from_settings(source: SourceIdentity, settings: &Settings) -> Result<Self> {
        Ok(Self {
            species: SpeciesSelection::parse(&settings.species),
            year: YearSelection::parse(&settings.year)?,
            date_from: settings.date_from,
            date_to: settings.date_to,
            charts: ChartToggles::with_hidden(&settings.hide),
            top_n: settings.top as usize,
            ..Self::new(source)
        })
    }

    // ── Selection changes ─────────────────────────────────────────────────

    pub fn select_species(&mut self, species: SpeciesSelection) {
        tracing::debug!(species = species.label(), "species selected");
        self.species = species;
    }

    pub fn select_year(&mut self, year: YearSelection) {
        tracing::debug!(?year, "year selected");
        self.year = year;
    }

    /// Switch to an explicit range. Either bound may stay open.
    pub fn set_custom_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.year = YearSelection::CustomRange;
        self.date_from = from;
        self.date_to = to;
    }

    /// Flip one chart's visibility and return the new state.
    pub fn toggle_chart(&mut self, chart: Chart) -> bool {
        self.charts.toggle(chart)
    }

    /// Step through `all`, each species in `options`, then `none`.
    ///
    /// `options` is the picker list as returned by
    /// [`species_options`](dashboard_data::analysis::species_options).
    pub fn cycle_species(&mut self, options: &[String], forward: bool) {
        let mut ring: Vec<SpeciesSelection> = vec![SpeciesSelection::All];
        ring.extend(
            options
                .iter()
                .filter(|o| o.as_str() != ALL_SPECIES)
                .map(|o| SpeciesSelection::Exact(o.clone())),
        );
        ring.push(SpeciesSelection::NoneSelected);

        let next = step(&ring, &self.species, forward);
        self.select_species(next);
    }

    /// Step through the custom range, then each year in `years`.
    pub fn cycle_year(&mut self, years: &[i32], forward: bool) {
        let mut ring = vec![YearSelection::CustomRange];
        ring.extend(years.iter().copied().map(YearSelection::Year));

        let next = step(&ring, &self.year, forward);
        self.select_year(next);
    }

    // ── Derived values ────────────────────────────────────────────────────

    /// Inclusive range implied by the current year selection.
    ///
    /// A year covers Jan 1 to Dec 31; a custom range uses the stored bounds,
    /// leaving missing ones open.
    pub fn effective_range(&self) -> DateRange {
        match self.year {
            YearSelection::Year(year) => {
                DateRange::calendar_year(year).unwrap_or_else(DateRange::full)
            }
            YearSelection::CustomRange => DateRange::new(self.date_from, self.date_to),
        }
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(self.species.filter(), self.effective_range())
    }

    /// The request handed to the view builder.
    pub fn request(&self) -> DashboardRequest {
        let trend_species = match &self.species {
            SpeciesSelection::Exact(label) => Some(label.clone()),
            SpeciesSelection::All | SpeciesSelection::NoneSelected => None,
        };
        DashboardRequest {
            criteria: self.criteria(),
            trend_species,
            charts: self.charts,
            top_n: self.top_n,
        }
    }

    /// Short description of the active range for headers and reports.
    pub fn range_label(&self) -> String {
        match self.year {
            YearSelection::Year(year) => year.to_string(),
            YearSelection::CustomRange => {
                let bound = |d: Option<NaiveDate>| {
                    d.map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "…".to_string())
                };
                if self.date_from.is_none() && self.date_to.is_none() {
                    "all dates".to_string()
                } else {
                    format!("{} to {}", bound(self.date_from), bound(self.date_to))
                }
            }
        }
    }
}

/// Element after (or before) `current` in `ring`, wrapping around. Unknown
/// values restart from the first element.
fn step<T: Clone + PartialEq>(ring: &[T], current: &T, forward: bool) -> T {
    let len = ring.len();
    let next = match ring.iter().position(|v| v == current) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    ring[next].clone()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
