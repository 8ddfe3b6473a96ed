use crate::themes::Theme;
use dashboard_core::formatting::format_count;
use dashboard_data::aggregator::SpeciesShare;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// Configuration controlling visual appearance of a share bar.
pub struct ShareBarConfig {
    /// Width in terminal columns of the bar portion.
    pub width: u16,
    /// Column width reserved for the species label.
    pub label_width: usize,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for ShareBarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            label_width: 20,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── ShareBar ─────────────────────────────────────────────────────────────────

/// One species' share of the subset as a horizontal bar.
///
/// Renders as `label  ███░░░ 40.0% (2)`, the label padded or truncated to a
/// fixed display width so bars line up.
pub struct ShareBar<'a> {
    pub share: &'a SpeciesShare,
    /// Fill style, normally taken from the theme palette.
    pub style: Style,
    pub theme: &'a Theme,
    pub config: ShareBarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(share: &'a SpeciesShare, style: Style, theme: &'a Theme) -> Self {
        Self {
            share,
            style,
            theme,
            config: ShareBarConfig::default(),
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let pct = self.share.percent.clamp(0.0, 100.0);
        let filled = ((pct / 100.0) * self.config.width as f64).round() as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let label = fit_to_width(&self.share.species, self.config.label_width);
        let figure = format!(
            " {:.1}% ({})",
            self.share.percent,
            format_count(self.share.observations)
        );

        Line::from(vec![
            Span::styled(format!("{label} "), self.theme.bar_label),
            Span::styled(filled_str, self.style),
            Span::styled(empty_str, self.theme.density_empty),
            Span::styled(figure, self.theme.label),
        ])
    }
}

/// One [`ShareBar`] line per share, coloured through the theme palette.
pub fn share_lines<'a>(shares: &'a [SpeciesShare], theme: &'a Theme) -> Vec<Line<'a>> {
    shares
        .iter()
        .enumerate()
        .map(|(i, share)| ShareBar::new(share, theme.share_style(i), theme).to_line())
        .collect()
}

/// Pad or cut `text` so it occupies exactly `width` terminal columns.
///
/// Truncated text ends with `…`.
pub fn fit_to_width(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current <= width {
        return format!("{text}{}", " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
