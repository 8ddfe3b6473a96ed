use crate::themes::Theme;
use dashboard_core::formatting::format_count;
use dashboard_core::time_utils::format_local_timestamp;
use dashboard_runtime::data_manager::SourceIdentity;
use ratatui::text::{Line, Span};

/// Decoration either side of the application title.
pub const FLOURISH: &str = "~ ~ ~";

/// Dashboard header rendering four lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Source identity: `[ file | N observations | loaded at ]`.
/// 4. Active filters: `[ species: … | range: … ]`.
pub struct Header<'a> {
    pub source: &'a SourceIdentity,
    /// Label of the species selection (`all`, `none` or a species).
    pub species: &'a str,
    /// Description of the active date range.
    pub range: &'a str,
    /// IANA timezone used for the load timestamp.
    pub timezone: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        source: &'a SourceIdentity,
        species: &'a str,
        range: &'a str,
        timezone: &'a str,
        theme: &'a Theme,
    ) -> Self {
        Self {
            source,
            species,
            range,
            timezone,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);
        let mut name = self.source.display_name();
        if self.source.is_fallback {
            name.push_str(" (fallback)");
        }
        let loaded = format_local_timestamp(&self.source.loaded_at, self.timezone);

        vec![
            Line::from(vec![
                Span::styled(FLOURISH, self.theme.header_accent),
                Span::styled(" BIRD OBSERVATION DASHBOARD ", self.theme.header),
                Span::styled(FLOURISH, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(name, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(
                    format!("{} observations", format_count(self.source.record_count as u64)),
                    self.theme.value,
                ),
                Span::styled(" | ", self.theme.label),
                Span::styled(loaded, self.theme.dim),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(vec![
                Span::styled("[ species: ", self.theme.label),
                Span::styled(self.species.to_string(), self.theme.value),
                Span::styled(" | range: ", self.theme.label),
                Span::styled(self.range.to_string(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
