//! Observation table for the dashboard TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per filtered
//! observation (date, species, count, site, link) and alternating row styles.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use dashboard_core::formatting::{self, format_count};
use dashboard_core::models::{Observation, RecordSet};

use crate::components::progress_bar::fit_to_width;
use crate::themes::Theme;

const SPECIES_WIDTH: usize = 24;
const SITE_WIDTH: usize = 28;

/// Display values for one table row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRowData {
    pub date: String,
    pub species: String,
    pub count: String,
    pub site: String,
    pub link: String,
}

impl From<&Observation> for TableRowData {
    fn from(obs: &Observation) -> Self {
        Self {
            date: formatting::format_date(obs.date),
            species: fit_to_width(obs.species_label().unwrap_or("?"), SPECIES_WIDTH)
                .trim_end()
                .to_string(),
            count: format_count(obs.count),
            site: fit_to_width(&obs.site, SITE_WIDTH).trim_end().to_string(),
            link: obs.link.clone().unwrap_or_default(),
        }
    }
}

/// Render `records` starting at row `offset` into `area`.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    records: &RecordSet,
    offset: usize,
    theme: &Theme,
) {
    let header_cells = ["Date", "Species", "Count", "Site", "Link"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, obs)| {
            let data = TableRowData::from(obs);
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(data.date),
                Cell::from(data.species),
                Cell::from(data.count),
                Cell::from(data.site),
                Cell::from(Span::styled(data.link, theme.table_link)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(SPECIES_WIDTH as u16),
        Constraint::Length(7),
        Constraint::Length(SITE_WIDTH as u16),
        Constraint::Min(10),
    ];

    let shown_to = (offset + visible).min(records.len());
    let title = format!(
        " Observations {}–{} of {} ",
        (offset + 1).min(shown_to),
        shown_to,
        format_count(records.len() as u64)
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(title, theme.chart_title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a placeholder when the filtered subset is empty.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No observations match the current filters", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Press 's' or 'y' to change the selection.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Observations "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
