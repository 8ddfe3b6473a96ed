//! Main application state and TUI event loop for the bird dashboard.
//!
//! [`DashboardApp`] owns the theme, the session selections and the loaded
//! record set. Every selection change rebuilds the [`DashboardView`] from
//! scratch before the next frame is drawn.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};

use dashboard_core::formatting::format_count;
use dashboard_core::models::RecordSet;
use dashboard_data::analysis::{build_dashboard, Chart, DashboardView};
use dashboard_runtime::session::SessionContext;

use crate::chart_view;
use crate::components::density_grid::DensityGrid;
use crate::components::header::Header;
use crate::components::progress_bar::share_lines;
use crate::table_view;
use crate::themes::Theme;

/// Rows moved by PageUp / PageDown in the table.
const PAGE_SCROLL: usize = 20;

// ── Page ──────────────────────────────────────────────────────────────────────

/// Which group of charts is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Yearly, trend, top-species and monthly bar charts.
    Overview,
    /// Species share, density grid and site markers.
    Breakdown,
    /// The filtered observation table.
    Table,
}

impl Page {
    const ALL: [Page; 3] = [Page::Overview, Page::Breakdown, Page::Table];

    pub fn title(self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Breakdown => "Breakdown",
            Page::Table => "Table",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }

    fn charts(self) -> &'static [Chart] {
        match self {
            Page::Overview => &[
                Chart::SpeciesPerYear,
                Chart::SpeciesTrend,
                Chart::TopSpecies,
                Chart::Monthly,
            ],
            Page::Breakdown => &[Chart::SpeciesShare, Chart::Density, Chart::Markers],
            Page::Table => &[Chart::Table],
        }
    }
}

// ── DashboardApp ──────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct DashboardApp {
    pub theme: Theme,
    /// IANA timezone for the load timestamp in the header.
    pub timezone: String,
    pub session: SessionContext,
    pub page: Page,
    /// First table row on screen.
    pub table_offset: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    records: RecordSet,
    view: DashboardView,
}

impl DashboardApp {
    pub fn new(
        theme_name: &str,
        timezone: String,
        session: SessionContext,
        records: RecordSet,
    ) -> Self {
        let view = build_dashboard(&records, &session.request());
        Self {
            theme: Theme::from_name(theme_name),
            timezone,
            session,
            page: Page::Overview,
            table_offset: 0,
            should_quit: false,
            records,
            view,
        }
    }

    /// The view for the current selections.
    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Recompute the view after a selection change.
    pub fn refresh(&mut self) {
        self.view = build_dashboard(&self.records, &self.session.request());
        let rows = self.view.table.as_ref().map_or(0, RecordSet::len);
        self.table_offset = self.table_offset.min(rows.saturating_sub(1));
        tracing::debug!(
            observations = self.view.summary.observations,
            species = self.session.species.label(),
            range = %self.session.range_label(),
            "dashboard refreshed"
        );
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Keyboard input is polled synchronously with a 250 ms timeout; the
    /// loop yields to the runtime between polls so an outer `select!` on a
    /// shutdown signal stays responsive.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key)
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
            tokio::task::yield_now().await;
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Apply one key press to the session and page state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let options = self.view.species_options.clone();
                self.session.cycle_species(&options, key.code == KeyCode::Char('s'));
                self.table_offset = 0;
                self.refresh();
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let years = self.view.years.clone();
                self.session.cycle_year(&years, key.code == KeyCode::Char('y'));
                self.table_offset = 0;
                self.refresh();
            }
            KeyCode::Char(c @ '1'..='8') => {
                let chart = Chart::ALL[(c as u8 - b'1') as usize];
                let visible = self.session.toggle_chart(chart);
                tracing::debug!(chart = chart.name(), visible, "chart toggled");
                self.refresh();
            }
            KeyCode::Tab => self.page = self.page.next(),
            KeyCode::BackTab => self.page = self.page.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1, true),
            KeyCode::Up | KeyCode::Char('k') => self.scroll(1, false),
            KeyCode::PageDown => self.scroll(PAGE_SCROLL, true),
            KeyCode::PageUp => self.scroll(PAGE_SCROLL, false),
            _ => {}
        }
    }

    fn scroll(&mut self, by: usize, down: bool) {
        if self.page != Page::Table {
            return;
        }
        let rows = self.view.table.as_ref().map_or(0, RecordSet::len);
        self.table_offset = if down {
            (self.table_offset + by).min(rows.saturating_sub(1))
        } else {
            self.table_offset.saturating_sub(by)
        };
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let range = self.session.range_label();
        let header = Header::new(
            &self.session.source,
            self.session.species.label(),
            &range,
            &self.timezone,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);
        frame.render_widget(Paragraph::new(self.summary_line()), chunks[1]);

        let tabs = Tabs::new(Page::ALL.iter().map(|p| p.title()))
            .select(self.page.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(Span::styled("|", self.theme.separator));
        frame.render_widget(tabs, chunks[2]);

        self.render_page(frame, chunks[3]);

        let help = Line::from(Span::styled(
            "s/S species  y/Y year  1-8 charts  Tab page  ↑/↓ scroll  q quit",
            self.theme.dim,
        ));
        frame.render_widget(Paragraph::new(help), chunks[4]);
    }

    fn summary_line(&self) -> Line<'static> {
        let s = &self.view.summary;
        let item = |value: String, label: &'static str| {
            vec![
                Span::styled(value, self.theme.value),
                Span::styled(label, self.theme.label),
            ]
        };
        let mut spans = Vec::new();
        spans.extend(item(format_count(s.observations), " observations  "));
        spans.extend(item(format_count(s.individuals), " individuals  "));
        spans.extend(item(format_count(s.species as u64), " species  "));
        spans.extend(item(format_count(s.sites as u64), " sites"));
        Line::from(spans)
    }

    fn render_page(&self, frame: &mut Frame, area: Rect) {
        let panels: Vec<Chart> = self
            .page
            .charts()
            .iter()
            .copied()
            .filter(|c| self.has_panel(*c))
            .collect();

        if panels.is_empty() {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Every chart on this page is hidden. Press 1-8 to show one.",
                    self.theme.warning,
                )),
            ];
            frame.render_widget(Paragraph::new(Text::from(text)), area);
            return;
        }

        // Two panels per row.
        let row_count = panels.len().div_ceil(2);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, row_count as u32); row_count])
            .split(area);

        for (row_area, pair) in rows.iter().zip(panels.chunks(2)) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, pair.len() as u32); pair.len()])
                .split(*row_area);
            for (cell, chart) in cells.iter().zip(pair) {
                self.render_panel(frame, *cell, *chart);
            }
        }
    }

    /// Whether the view carries data for `chart`. Hidden charts and the
    /// trend without an exact species have none.
    fn has_panel(&self, chart: Chart) -> bool {
        let v = &self.view;
        match chart {
            Chart::SpeciesPerYear => v.species_per_year.is_some(),
            Chart::SpeciesTrend => v.species_trend.is_some(),
            Chart::TopSpecies => v.top_species.is_some(),
            Chart::SpeciesShare => v.species_share.is_some(),
            Chart::Monthly => v.monthly.is_some(),
            Chart::Density => v.density.is_some(),
            Chart::Markers => v.markers.is_some(),
            Chart::Table => v.table.is_some(),
        }
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, chart: Chart) {
        let theme = &self.theme;
        let title = chart.title();
        let v = &self.view;

        match chart {
            Chart::SpeciesPerYear => {
                let rows = v.species_per_year.as_deref().unwrap_or(&[]);
                let bars = chart_view::species_per_year_bars(rows);
                chart_view::render_bar_chart(frame, area, title, &bars, theme);
            }
            Chart::SpeciesTrend => {
                if let Some(trend) = &v.species_trend {
                    let title = format!("{title}: {}", trend.species);
                    let bars = chart_view::trend_bars(&trend.years);
                    chart_view::render_bar_chart(frame, area, &title, &bars, theme);
                }
            }
            Chart::TopSpecies => {
                let bars = chart_view::top_species_bars(v.top_species.as_deref().unwrap_or(&[]));
                chart_view::render_horizontal_bar_chart(frame, area, title, &bars, theme);
            }
            Chart::SpeciesShare => {
                let lines = share_lines(v.species_share.as_deref().unwrap_or(&[]), theme);
                chart_view::render_lines_panel(frame, area, title, lines, theme);
            }
            Chart::Monthly => {
                let bars = chart_view::monthly_bars(v.monthly.as_deref().unwrap_or(&[]));
                chart_view::render_bar_chart(frame, area, title, &bars, theme);
            }
            Chart::Density => {
                let points = v.density.as_deref().unwrap_or(&[]);
                let lines = if points.is_empty() {
                    Vec::new()
                } else {
                    let cols = area.width.saturating_sub(2) as usize;
                    let rows = area.height.saturating_sub(2) as usize;
                    DensityGrid::new(points, cols, rows, theme).to_lines()
                };
                chart_view::render_lines_panel(frame, area, title, lines, theme);
            }
            Chart::Markers => {
                let lines = match &v.markers {
                    Some(layer) if !layer.markers.is_empty() => {
                        chart_view::marker_lines(layer, theme)
                    }
                    _ => Vec::new(),
                };
                chart_view::render_lines_panel(frame, area, title, lines, theme);
            }
            Chart::Table => match &v.table {
                Some(records) if !records.is_empty() => {
                    table_view::render_table_view(frame, area, records, self.table_offset, theme);
                }
                _ => table_view::render_no_data(frame, area, theme),
            },
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
