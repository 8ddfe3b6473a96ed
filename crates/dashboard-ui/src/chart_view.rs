//! Chart panels for the dashboard TUI.
//!
//! Each derived series is converted to labelled bar values and drawn with a
//! ratatui [`BarChart`]; line-based panels (share bars, density grid, marker
//! list) go into a bordered [`Paragraph`]. Empty series render a placeholder.

use ratatui::{
    layout::{Direction, Rect},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use dashboard_core::formatting::{format_coordinates, format_count, format_date};
use dashboard_data::aggregator::{MonthlyTotal, SpeciesCount, YearCount, YearSpeciesCount};
use dashboard_data::analysis::MarkerLayer;

use crate::themes::Theme;

/// Placeholder shown in place of an empty chart.
pub const EMPTY_MESSAGE: &str = "No observations match the current filters";

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ── Series conversion ─────────────────────────────────────────────────────────

pub fn species_per_year_bars(rows: &[YearSpeciesCount]) -> Vec<(String, u64)> {
    rows.iter()
        .map(|r| (r.year.to_string(), r.species as u64))
        .collect()
}

pub fn trend_bars(rows: &[YearCount]) -> Vec<(String, u64)> {
    rows.iter()
        .map(|r| (r.year.to_string(), r.observations))
        .collect()
}

pub fn top_species_bars(rows: &[SpeciesCount]) -> Vec<(String, u64)> {
    rows.iter()
        .map(|r| (r.species.clone(), r.observations))
        .collect()
}

/// Individuals per month, labelled `Jan`..`Dec`.
pub fn monthly_bars(rows: &[MonthlyTotal]) -> Vec<(String, u64)> {
    rows.iter()
        .map(|r| {
            let name = MONTH_NAMES
                .get((r.month as usize).wrapping_sub(1))
                .copied()
                .unwrap_or("?");
            (name.to_string(), r.individuals)
        })
        .collect()
}

/// One line per marker: coordinates, species with count, site and date.
pub fn marker_lines<'a>(layer: &MarkerLayer, theme: &Theme) -> Vec<Line<'a>> {
    let (lat, lon) = layer.center;
    let mut lines = vec![Line::from(vec![
        Span::styled("centre ", theme.label),
        Span::styled(format_coordinates(lat, lon), theme.value),
    ])];

    lines.extend(layer.markers.iter().map(|m| {
        Line::from(vec![
            Span::styled(format_coordinates(m.latitude, m.longitude), theme.dim),
            Span::raw("  "),
            Span::styled(
                m.species.clone().unwrap_or_else(|| "?".to_string()),
                theme.text,
            ),
            Span::styled(format!(" ×{}", format_count(m.count)), theme.value),
            Span::raw("  "),
            Span::styled(m.site.clone(), theme.label),
            Span::raw("  "),
            Span::styled(format_date(m.date), theme.dim),
        ])
    }));
    lines
}

// ── Rendering ─────────────────────────────────────────────────────────────────

fn panel<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(Span::styled(format!(" {title} "), theme.chart_title))
}

/// Draw a vertical bar chart, or the placeholder when every value is zero.
pub fn render_bar_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    bars: &[(String, u64)],
    theme: &Theme,
) {
    render_bars(frame, area, title, bars, Direction::Vertical, theme);
}

/// Draw a horizontal bar chart; suits long labels such as species names.
pub fn render_horizontal_bar_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    bars: &[(String, u64)],
    theme: &Theme,
) {
    render_bars(frame, area, title, bars, Direction::Horizontal, theme);
}

fn render_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    bars: &[(String, u64)],
    direction: Direction,
    theme: &Theme,
) {
    if bars.iter().all(|(_, v)| *v == 0) {
        render_empty_chart(frame, area, title, theme);
        return;
    }

    let data: Vec<Bar> = bars
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(label.clone()))
                .text_value(format_count(*value))
        })
        .collect();

    let bar_width = match direction {
        Direction::Horizontal => 1,
        Direction::Vertical => {
            // Spread bars over the inner width, keeping a one-column gap.
            let inner = area.width.saturating_sub(2) as usize;
            let per_bar = inner / bars.len().max(1);
            per_bar.saturating_sub(1).clamp(1, 9) as u16
        }
    };

    let chart = BarChart::default()
        .block(panel(title, theme))
        .direction(direction)
        .data(BarGroup::default().bars(&data))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(theme.bar)
        .value_style(theme.bar_value)
        .label_style(theme.bar_label);

    frame.render_widget(chart, area);
}

/// Draw pre-built lines inside a titled panel.
pub fn render_lines_panel(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<Line>,
    theme: &Theme,
) {
    if lines.is_empty() {
        render_empty_chart(frame, area, title, theme);
        return;
    }
    frame.render_widget(Paragraph::new(Text::from(lines)).block(panel(title, theme)), area);
}

/// Placeholder panel for a chart with nothing to show.
pub fn render_empty_chart(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(EMPTY_MESSAGE, theme.dim)),
    ];
    frame.render_widget(Paragraph::new(Text::from(text)).block(panel(title, theme)), area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_data::analysis::Marker;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Conversion ────────────────────────────────────────────────────────────

    #[test]
    fn test_monthly_bars_use_month_names() {
        let rows: Vec<MonthlyTotal> = (1..=12)
            .map(|month| MonthlyTotal {
                month,
                observations: 1,
                individuals: month as u64 * 2,
            })
            .collect();
        let bars = monthly_bars(&rows);
        assert_eq!(bars.len(), 12);
        assert_eq!(bars[0], ("Jan".to_string(), 2));
        assert_eq!(bars[11], ("Dec".to_string(), 24));
    }

    #[test]
    fn test_series_conversion() {
        let per_year = species_per_year_bars(&[YearSpeciesCount { year: 2023, species: 3 }]);
        assert_eq!(per_year, vec![("2023".to_string(), 3)]);

        let top = top_species_bars(&[SpeciesCount {
            species: "Vrabec".to_string(),
            observations: 2,
        }]);
        assert_eq!(top, vec![("Vrabec".to_string(), 2)]);
    }

    #[test]
    fn test_marker_lines_start_with_centre() {
        let theme = Theme::dark();
        let layer = MarkerLayer {
            center: (49.8175, 15.473),
            markers: vec![Marker {
                latitude: 49.19,
                longitude: 16.61,
                site: "Park".to_string(),
                count: 2,
                species: Some("Kos".to_string()),
                date: None,
            }],
        };
        let lines = marker_lines(&layer, &theme);
        assert_eq!(lines.len(), 2);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "centre 49.81750, 15.47300");
        let second: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(second.contains("Kos ×2"));
        assert!(second.contains("unknown"));
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_bar_chart_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let theme = Theme::dark();
        let bars = vec![("2022".to_string(), 4), ("2023".to_string(), 7)];
        terminal
            .draw(|frame| render_bar_chart(frame, frame.area(), "Species per year", &bars, &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Species per year"));
    }

    #[test]
    fn test_render_horizontal_bar_chart_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let theme = Theme::light();
        let bars = vec![("Vrabec".to_string(), 2), ("Kos".to_string(), 2)];
        terminal
            .draw(|frame| {
                render_horizontal_bar_chart(frame, frame.area(), "Top species", &bars, &theme)
            })
            .unwrap();
    }

    #[test]
    fn test_all_zero_series_renders_placeholder() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let theme = Theme::dark();
        let bars = monthly_bars(&[MonthlyTotal {
            month: 1,
            observations: 0,
            individuals: 0,
        }]);
        terminal
            .draw(|frame| render_bar_chart(frame, frame.area(), "Monthly", &bars, &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains(EMPTY_MESSAGE));
    }

    #[test]
    fn test_render_lines_panel_empty_uses_placeholder() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_lines_panel(frame, frame.area(), "Sites", Vec::new(), &theme))
            .unwrap();
        assert!(buffer_text(&terminal).contains(EMPTY_MESSAGE));
    }
}
