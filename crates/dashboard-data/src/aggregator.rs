//! Pure aggregations over observation record sets.
//!
//! Every function is deterministic and tolerates an empty input, returning
//! either an empty series or a zero-filled one as documented per function.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use dashboard_core::models::{Observation, RecordSet};
use serde::Serialize;

/// Default size of the top-species ranking.
pub const DEFAULT_TOP_N: usize = 10;

// ── Row types ─────────────────────────────────────────────────────────────────

/// Distinct species seen in one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSpeciesCount {
    pub year: i32,
    pub species: usize,
}

/// Number of observation rows in one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub observations: u64,
}

/// Number of observation rows for one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesCount {
    pub species: String,
    pub observations: u64,
}

/// A species' slice of all observations in a subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesShare {
    pub species: String,
    pub observations: u64,
    /// Percentage of all observation rows, one decimal.
    pub percent: f64,
}

/// Totals for one calendar month (1–12), summed over all years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub month: u32,
    pub observations: u64,
    pub individuals: u64,
}

/// Summed individual count at one exact coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub count: u64,
}

// ── SubsetStats ───────────────────────────────────────────────────────────────

/// Headline totals for a record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubsetStats {
    /// Number of observation rows.
    pub observations: u64,
    /// Summed individual counts.
    pub individuals: u64,
    /// Distinct non-blank species labels.
    pub species: usize,
    /// Distinct non-empty site labels.
    pub sites: usize,
}

// ── ObservationAggregator ─────────────────────────────────────────────────────

/// Stateless helper grouping observations for the dashboard charts.
pub struct ObservationAggregator;

impl ObservationAggregator {
    /// Distinct calendar years present in `records`, ascending.
    pub fn years(records: &RecordSet) -> Vec<i32> {
        records
            .iter()
            .filter_map(Observation::year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct species per year, one row per dated year, ascending.
    ///
    /// A year whose rows carry no species label still appears with `0`.
    pub fn species_per_year(records: &RecordSet) -> Vec<YearSpeciesCount> {
        let mut by_year: BTreeMap<i32, HashSet<&str>> = BTreeMap::new();

        for obs in records {
            let Some(year) = obs.year() else {
                continue;
            };
            let seen = by_year.entry(year).or_default();
            if let Some(species) = obs.species_label() {
                seen.insert(species);
            }
        }

        by_year
            .into_iter()
            .map(|(year, species)| YearSpeciesCount {
                year,
                species: species.len(),
            })
            .collect()
    }

    /// Observation rows of `species` for every year in `all_years`.
    ///
    /// Years are emitted ascending without duplicates and zero-filled where
    /// the species was not seen. Occurrences in years outside `all_years`
    /// are ignored.
    pub fn observations_per_year_for_species(
        records: &RecordSet,
        species: &str,
        all_years: &[i32],
    ) -> Vec<YearCount> {
        let mut by_year: BTreeMap<i32, u64> = all_years.iter().map(|&y| (y, 0)).collect();

        for obs in records {
            if obs.species_label() != Some(species) {
                continue;
            }
            if let Some(slot) = obs.year().and_then(|y| by_year.get_mut(&y)) {
                *slot = slot.saturating_add(1);
            }
        }

        by_year
            .into_iter()
            .map(|(year, observations)| YearCount { year, observations })
            .collect()
    }

    /// The `n` most observed species, by number of rows, descending.
    ///
    /// Ties go to the species that reached its tally first while scanning
    /// the input in order. Rows without a species label are not ranked.
    pub fn top_species(records: &RecordSet, n: usize) -> Vec<SpeciesCount> {
        // (label, observations, index of the row that completed the tally)
        let mut tallies: Vec<(&str, u64, usize)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for (row, obs) in records.iter().enumerate() {
            let Some(species) = obs.species_label() else {
                continue;
            };
            let slot = *positions.entry(species).or_insert_with(|| {
                tallies.push((species, 0, row));
                tallies.len() - 1
            });
            let tally = &mut tallies[slot];
            tally.1 = tally.1.saturating_add(1);
            tally.2 = row;
        }

        tallies.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        tallies.truncate(n);

        tallies
            .into_iter()
            .map(|(species, observations, _)| SpeciesCount {
                species: species.to_string(),
                observations,
            })
            .collect()
    }

    /// Top-`n` species with their percentage of all observation rows.
    ///
    /// Unlabelled rows count toward the whole, so the shares may sum to
    /// less than 100.
    pub fn species_share(records: &RecordSet, n: usize) -> Vec<SpeciesShare> {
        let total = records.len() as f64;

        Self::top_species(records, n)
            .into_iter()
            .map(|row| SpeciesShare {
                percent: dashboard_core::formatting::percentage(
                    row.observations as f64,
                    total,
                    1,
                ),
                species: row.species,
                observations: row.observations,
            })
            .collect()
    }

    /// Exactly twelve rows, January first, zero-filled for empty months.
    ///
    /// Undated rows are not attributed to any month.
    pub fn monthly_totals(records: &RecordSet) -> Vec<MonthlyTotal> {
        let mut months: Vec<MonthlyTotal> = (1..=12)
            .map(|month| MonthlyTotal {
                month,
                observations: 0,
                individuals: 0,
            })
            .collect();

        for obs in records {
            if let Some(month) = obs.month() {
                let slot = &mut months[(month - 1) as usize];
                slot.observations = slot.observations.saturating_add(1);
                slot.individuals = slot.individuals.saturating_add(obs.count);
            }
        }

        months
    }

    /// Summed counts per exact coordinate pair, in first-seen order.
    ///
    /// Rows missing either coordinate are skipped.
    pub fn coordinate_density(records: &RecordSet) -> Vec<DensityPoint> {
        let mut points: Vec<DensityPoint> = Vec::new();
        let mut positions: HashMap<(u64, u64), usize> = HashMap::new();

        for obs in records {
            let Some((lat, lon)) = obs.coordinates() else {
                continue;
            };
            // `+ 0.0` folds -0.0 into 0.0 so both share a key.
            let key = ((lat + 0.0).to_bits(), (lon + 0.0).to_bits());
            match positions.get(&key) {
                Some(&i) => points[i].count = points[i].count.saturating_add(obs.count),
                None => {
                    positions.insert(key, points.len());
                    points.push(DensityPoint {
                        latitude: lat,
                        longitude: lon,
                        count: obs.count,
                    });
                }
            }
        }

        points
    }

    /// Headline totals for `records`.
    pub fn summarize(records: &RecordSet) -> SubsetStats {
        let mut species: HashSet<&str> = HashSet::new();
        let mut sites: HashSet<&str> = HashSet::new();
        let mut stats = SubsetStats::default();

        for obs in records {
            stats.observations = stats.observations.saturating_add(1);
            stats.individuals = stats.individuals.saturating_add(obs.count);
            if let Some(label) = obs.species_label() {
                species.insert(label);
            }
            if !obs.site.is_empty() {
                sites.insert(obs.site.as_str());
            }
        }

        stats.species = species.len();
        stats.sites = sites.len();
        stats
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(s: &str) -> Option<NaiveDate> {
        Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    fn located(date: &str, species: &str, count: u64, lat: f64, lon: f64) -> Observation {
        let mut obs = Observation::new(d(date), species, count);
        obs.latitude = Some(lat);
        obs.longitude = Some(lon);
        obs
    }

    /// The five-row fixture used throughout: Kos, Vrabec ×2, Straka, Kos.
    fn garden() -> RecordSet {
        RecordSet::new(vec![
            Observation::new(d("2023-01-01"), "Kos", 1),
            Observation::new(d("2023-01-03"), "Vrabec", 2),
            Observation::new(d("2023-01-03"), "Vrabec", 4),
            Observation::new(d("2023-01-04"), "Straka", 3),
            Observation::new(d("2023-01-05"), "Kos", 2),
        ])
    }

    fn multi_year() -> RecordSet {
        RecordSet::new(vec![
            Observation::new(d("2021-05-01"), "Kos", 1),
            Observation::new(d("2023-06-01"), "Kos", 1),
            Observation::new(d("2021-05-02"), "Sýkora", 1),
            Observation::new(d("2022-07-01"), "Straka", 1),
            Observation::new(d("2023-06-02"), "Kos", 1),
            Observation::new(None, "Kos", 1),
        ])
    }

    // ── years / species_per_year ──────────────────────────────────────────────

    #[test]
    fn test_years_ascending_distinct() {
        assert_eq!(ObservationAggregator::years(&multi_year()), vec![2021, 2022, 2023]);
        assert!(ObservationAggregator::years(&RecordSet::default()).is_empty());
    }

    #[test]
    fn test_species_per_year_garden() {
        let rows = ObservationAggregator::species_per_year(&garden());
        assert_eq!(
            rows,
            vec![YearSpeciesCount {
                year: 2023,
                species: 3
            }]
        );
    }

    #[test]
    fn test_species_per_year_strictly_ascending() {
        let rows = ObservationAggregator::species_per_year(&multi_year());
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
        assert!(years.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(rows[0].species, 2);
        assert_eq!(rows[1].species, 1);
        assert_eq!(rows[2].species, 1);
    }

    #[test]
    fn test_species_per_year_unlabelled_year_counts_zero() {
        let records = RecordSet::new(vec![Observation::new(d("2020-01-01"), "", 1)]);
        let rows = ObservationAggregator::species_per_year(&records);
        assert_eq!(rows, vec![YearSpeciesCount { year: 2020, species: 0 }]);
    }

    #[test]
    fn test_species_per_year_empty() {
        assert!(ObservationAggregator::species_per_year(&RecordSet::default()).is_empty());
    }

    // ── observations_per_year_for_species ─────────────────────────────────────

    #[test]
    fn test_observations_per_year_zero_fills_full_domain() {
        let records = multi_year();
        let years = ObservationAggregator::years(&records);
        let rows = ObservationAggregator::observations_per_year_for_species(&records, "Kos", &years);

        assert_eq!(rows.len(), years.len());
        assert_eq!(
            rows,
            vec![
                YearCount { year: 2021, observations: 1 },
                YearCount { year: 2022, observations: 0 },
                YearCount { year: 2023, observations: 2 },
            ]
        );
    }

    #[test]
    fn test_observations_per_year_for_absent_species_all_zero() {
        let records = multi_year();
        let years = ObservationAggregator::years(&records);
        let rows =
            ObservationAggregator::observations_per_year_for_species(&records, "Orel", &years);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.observations == 0));
    }

    #[test]
    fn test_observations_per_year_uses_given_domain() {
        // The subset only has 2023 rows, but the domain comes from the full set.
        let subset = RecordSet::new(vec![Observation::new(d("2023-06-01"), "Kos", 1)]);
        let rows = ObservationAggregator::observations_per_year_for_species(
            &subset,
            "Kos",
            &[2023, 2021, 2022, 2021],
        );
        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023]);
    }

    // ── top_species ───────────────────────────────────────────────────────────

    #[test]
    fn test_top_species_garden_ties_by_first_completed_tally() {
        let rows = ObservationAggregator::top_species(&garden(), DEFAULT_TOP_N);
        let pairs: Vec<(&str, u64)> = rows
            .iter()
            .map(|r| (r.species.as_str(), r.observations))
            .collect();
        assert_eq!(pairs, vec![("Vrabec", 2), ("Kos", 2), ("Straka", 1)]);
    }

    #[test]
    fn test_top_species_truncates_and_sorts_descending() {
        let records: RecordSet = (0..15)
            .flat_map(|i| {
                let name = format!("Druh {i:02}");
                (0..=i).map(move |_| Observation::new(d("2023-01-01"), &name, 1))
            })
            .collect();

        let rows = ObservationAggregator::top_species(&records, 10);
        assert_eq!(rows.len(), 10);
        assert!(rows.windows(2).all(|w| w[0].observations >= w[1].observations));
        assert_eq!(rows[0].species, "Druh 14");
    }

    #[test]
    fn test_top_species_skips_unlabelled_and_handles_zero_n() {
        let mut records = garden().records().to_vec();
        records.push(Observation::new(d("2023-01-06"), "", 9));
        let records = RecordSet::new(records);

        assert_eq!(ObservationAggregator::top_species(&records, 10).len(), 3);
        assert!(ObservationAggregator::top_species(&records, 0).is_empty());
        assert!(ObservationAggregator::top_species(&RecordSet::default(), 10).is_empty());
    }

    #[test]
    fn test_top_species_tie_follows_completed_tally_not_first_row() {
        // A is seen first, but B reaches two rows before A does.
        let records = RecordSet::new(vec![
            Observation::new(d("2023-01-01"), "A", 1),
            Observation::new(d("2023-01-02"), "B", 1),
            Observation::new(d("2023-01-03"), "B", 1),
            Observation::new(d("2023-01-04"), "A", 1),
        ]);
        let names: Vec<String> = ObservationAggregator::top_species(&records, 10)
            .into_iter()
            .map(|r| r.species)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    // ── species_share ─────────────────────────────────────────────────────────

    #[test]
    fn test_species_share_percentages() {
        let rows = ObservationAggregator::species_share(&garden(), 10);
        assert_eq!(rows[0].species, "Vrabec");
        assert!((rows[0].percent - 40.0).abs() < 1e-9);
        assert!((rows[2].percent - 20.0).abs() < 1e-9);
        let total: f64 = rows.iter().map(|r| r.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_species_share_counts_unlabelled_rows_in_total() {
        let mut rows = garden().records().to_vec();
        rows.push(Observation::new(d("2023-01-06"), "", 1));
        rows.push(Observation::new(d("2023-01-07"), "", 1));
        rows.push(Observation::new(d("2023-01-08"), "", 1));
        rows.push(Observation::new(d("2023-01-09"), "", 1));
        rows.push(Observation::new(d("2023-01-10"), "", 1));
        let shares = ObservationAggregator::species_share(&RecordSet::new(rows), 10);

        // Vrabec: 2 of 10 rows.
        assert_eq!(shares[0].species, "Vrabec");
        assert!((shares[0].percent - 20.0).abs() < 1e-9);
        let total: f64 = shares.iter().map(|r| r.percent).sum();
        assert!((total - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_species_share_empty() {
        assert!(ObservationAggregator::species_share(&RecordSet::default(), 10).is_empty());
    }

    // ── monthly_totals ────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_totals_garden_all_mass_in_january() {
        let rows = ObservationAggregator::monthly_totals(&garden());
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].observations, 5);
        assert_eq!(rows[0].individuals, 12);
        assert!(rows[1..]
            .iter()
            .all(|r| r.observations == 0 && r.individuals == 0));
    }

    #[test]
    fn test_monthly_totals_empty_is_twelve_zero_rows() {
        let rows = ObservationAggregator::monthly_totals(&RecordSet::default());
        assert_eq!(rows.len(), 12);
        let months: Vec<u32> = rows.iter().map(|r| r.month).collect();
        assert_eq!(months, (1..=12).collect::<Vec<_>>());
        assert!(rows.iter().all(|r| r.observations == 0));
    }

    #[test]
    fn test_monthly_totals_ignores_undated() {
        let rows = ObservationAggregator::monthly_totals(&multi_year());
        let total: u64 = rows.iter().map(|r| r.observations).sum();
        assert_eq!(total, 5);
    }

    // ── coordinate_density ────────────────────────────────────────────────────

    #[test]
    fn test_coordinate_density_collapses_duplicates() {
        let mut unlocated = Observation::new(d("2023-01-02"), "Kos", 7);
        unlocated.latitude = Some(49.0);
        let records = RecordSet::new(vec![
            located("2023-01-01", "Kos", 2, 49.19, 16.61),
            located("2023-01-02", "Straka", 3, 50.08, 14.42),
            located("2023-01-03", "Vrabec", 4, 49.19, 16.61),
            unlocated,
        ]);

        let points = ObservationAggregator::coordinate_density(&records);
        assert_eq!(
            points,
            vec![
                DensityPoint { latitude: 49.19, longitude: 16.61, count: 6 },
                DensityPoint { latitude: 50.08, longitude: 14.42, count: 3 },
            ]
        );
    }

    #[test]
    fn test_coordinate_density_negative_zero_shares_key() {
        let records = RecordSet::new(vec![
            located("2023-01-01", "Kos", 1, 0.0, 10.0),
            located("2023-01-01", "Kos", 1, -0.0, 10.0),
        ]);
        let points = ObservationAggregator::coordinate_density(&records);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].count, 2);
    }

    #[test]
    fn test_coordinate_density_empty() {
        assert!(ObservationAggregator::coordinate_density(&garden()).is_empty());
    }

    // ── summarize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summarize_totals() {
        let mut rows = garden().records().to_vec();
        rows[0].site = "Park".to_string();
        rows[4].site = "Park".to_string();
        rows[3].site = "Les".to_string();
        let stats = ObservationAggregator::summarize(&RecordSet::new(rows));

        assert_eq!(stats.observations, 5);
        assert_eq!(stats.individuals, 12);
        assert_eq!(stats.species, 3);
        assert_eq!(stats.sites, 2);
        assert_eq!(
            ObservationAggregator::summarize(&RecordSet::default()),
            SubsetStats::default()
        );
    }

    // ── overflow ──────────────────────────────────────────────────────────────

    #[test]
    fn test_summing_aggregators_saturate_instead_of_overflowing() {
        let records = RecordSet::new(vec![
            located("2023-01-01", "Kos", u64::MAX, 49.19, 16.61),
            located("2023-01-02", "Kos", 5, 49.19, 16.61),
        ]);

        let monthly = ObservationAggregator::monthly_totals(&records);
        assert_eq!(monthly[0].observations, 2);
        assert_eq!(monthly[0].individuals, u64::MAX);

        let density = ObservationAggregator::coordinate_density(&records);
        assert_eq!(density.len(), 1);
        assert_eq!(density[0].count, u64::MAX);

        let stats = ObservationAggregator::summarize(&records);
        assert_eq!(stats.individuals, u64::MAX);
    }
}
