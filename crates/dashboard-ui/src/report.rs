//! Plain-text rendering of a [`DashboardView`] for `--view report`.

use std::fmt::Write as _;

use dashboard_core::formatting::{format_coordinates, format_count, format_date};
use dashboard_data::analysis::{Chart, DashboardView};
use dashboard_runtime::session::SessionContext;

use crate::chart_view::{monthly_bars, EMPTY_MESSAGE};

/// Render every visible section of `view` as text.
pub fn render_report(view: &DashboardView, session: &SessionContext) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "Bird observation report: {}", session.source.display_name());
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "species: {} | range: {}",
        session.species.label(),
        session.range_label()
    );
    let s = &view.summary;
    let _ = writeln!(
        out,
        "{} observations, {} individuals, {} species, {} sites",
        format_count(s.observations),
        format_count(s.individuals),
        format_count(s.species as u64),
        format_count(s.sites as u64)
    );

    if let Some(rows) = &view.species_per_year {
        section(&mut out, Chart::SpeciesPerYear, rows.is_empty());
        for r in rows {
            let _ = writeln!(out, "  {:<6} {:>8}", r.year, r.species);
        }
    }

    if let Some(trend) = &view.species_trend {
        section(&mut out, Chart::SpeciesTrend, trend.years.is_empty());
        let _ = writeln!(out, "  {}", trend.species);
        for r in &trend.years {
            let _ = writeln!(out, "  {:<6} {:>8}", r.year, format_count(r.observations));
        }
    }

    if let Some(rows) = &view.top_species {
        section(&mut out, Chart::TopSpecies, rows.is_empty());
        for (rank, r) in rows.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:>3}. {:<28} {:>8}",
                rank + 1,
                r.species,
                format_count(r.observations)
            );
        }
    }

    if let Some(rows) = &view.species_share {
        section(&mut out, Chart::SpeciesShare, rows.is_empty());
        for r in rows {
            let _ = writeln!(out, "  {:<28} {:>6.1}%", r.species, r.percent);
        }
    }

    if let Some(rows) = &view.monthly {
        section(&mut out, Chart::Monthly, rows.iter().all(|r| r.observations == 0));
        for ((name, individuals), r) in monthly_bars(rows).into_iter().zip(rows) {
            let _ = writeln!(
                out,
                "  {:<4} {:>8} obs {:>10} ind",
                name,
                format_count(r.observations),
                format_count(individuals)
            );
        }
    }

    if let Some(points) = &view.density {
        section(&mut out, Chart::Density, points.is_empty());
        for p in points {
            let _ = writeln!(
                out,
                "  {}  {:>8}",
                format_coordinates(p.latitude, p.longitude),
                format_count(p.count)
            );
        }
    }

    if let Some(layer) = &view.markers {
        section(&mut out, Chart::Markers, layer.markers.is_empty());
        let (lat, lon) = layer.center;
        let _ = writeln!(out, "  centre {}", format_coordinates(lat, lon));
        let located = format_count(layer.markers.len() as u64);
        let _ = writeln!(out, "  {located} located observations");
    }

    if let Some(records) = &view.table {
        section(&mut out, Chart::Table, records.is_empty());
        for obs in records {
            let _ = writeln!(
                out,
                "  {:<10} {:<28} {:>5}  {:<28} {}",
                format_date(obs.date),
                obs.species_label().unwrap_or("?"),
                format_count(obs.count),
                obs.site,
                obs.link.as_deref().unwrap_or("")
            );
        }
    }

    out
}

fn section(out: &mut String, chart: Chart, empty: bool) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", chart.title());
    let _ = writeln!(out, "{}", "-".repeat(chart.title().len()));
    if empty {
        let _ = writeln!(out, "  {EMPTY_MESSAGE}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
