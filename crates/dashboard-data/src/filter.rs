//! Species and date-range filtering over a [`RecordSet`].

use dashboard_core::models::{DateRange, RecordSet, SpeciesFilter};
use serde::{Deserialize, Serialize};

/// Everything the filter engine needs to derive a subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub species: SpeciesFilter,
    pub range: DateRange,
}

impl FilterCriteria {
    pub fn new(species: SpeciesFilter, range: DateRange) -> Self {
        Self { species, range }
    }

    /// Derive the matching subset. The input set is left untouched.
    pub fn apply(&self, records: &RecordSet) -> RecordSet {
        filter_records(records, &self.species, self.range)
    }
}

/// Keep the observations matching `species` whose date lies in `range`.
///
/// An unknown species label or an inverted range (`from > to`) simply yields
/// an empty set. Undated observations only survive a fully open range.
pub fn filter_records(records: &RecordSet, species: &SpeciesFilter, range: DateRange) -> RecordSet {
    records
        .iter()
        .filter(|obs| species.matches(obs) && range.contains(obs.date))
        .cloned()
        .collect()
}
