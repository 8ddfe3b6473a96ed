use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 light. Anything else yields `Unknown`.
pub fn detect_background() -> BackgroundType {
    let Ok(val) = std::env::var("COLORFGBG") else {
        return BackgroundType::Unknown;
    };
    match val.split(';').next_back().and_then(|bg| bg.parse::<u8>().ok()) {
        Some(bg) if bg <= 6 => BackgroundType::Dark,
        Some(_) => BackgroundType::Light,
        None => BackgroundType::Unknown,
    }
}

/// Every style used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub warning: Style,

    // ── Tabs ─────────────────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_title: Style,
    pub bar: Style,
    /// Value printed inside or above each bar.
    pub bar_value: Style,
    pub bar_label: Style,
    /// Cycled through for share bars, one colour per species.
    pub share_palette: Vec<Color>,

    // ── Density grid ─────────────────────────────────────────────────────────
    pub density_empty: Style,
    /// Cells below a third of the busiest cell.
    pub density_low: Style,
    pub density_medium: Style,
    /// Cells at or above two thirds of the busiest cell.
    pub density_high: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    pub table_link: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            warning: Style::default().fg(Color::Yellow),

            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            chart_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            bar: Style::default().fg(Color::Green),
            bar_value: Style::default().fg(Color::Black).bg(Color::Green),
            bar_label: Style::default().fg(Color::Gray),
            share_palette: vec![
                Color::Green,
                Color::Cyan,
                Color::Yellow,
                Color::Magenta,
                Color::Blue,
                Color::Red,
            ],

            density_empty: Style::default().fg(Color::DarkGray),
            density_low: Style::default().fg(Color::Green),
            density_medium: Style::default().fg(Color::Yellow),
            density_high: Style::default().fg(Color::Red),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            warning: Style::default().fg(Color::Magenta),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            chart_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            bar: Style::default().fg(Color::Blue),
            bar_value: Style::default().fg(Color::White).bg(Color::Blue),
            bar_label: Style::default().fg(Color::DarkGray),
            share_palette: vec![
                Color::Blue,
                Color::Magenta,
                Color::Green,
                Color::Red,
                Color::Cyan,
                Color::DarkGray,
            ],

            density_empty: Style::default().fg(Color::Gray),
            density_low: Style::default().fg(Color::Blue),
            density_medium: Style::default().fg(Color::Magenta),
            density_high: Style::default().fg(Color::Red),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            table_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        }
    }

    /// Basic 8-colour ANSI palette without bold or underline modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Green),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            warning: Style::default().fg(Color::Yellow),

            tab_active: Style::default().fg(Color::Black).bg(Color::White),
            tab_inactive: Style::default().fg(Color::Gray),

            chart_title: Style::default().fg(Color::Cyan),
            bar: Style::default().fg(Color::White),
            bar_value: Style::default().fg(Color::Black).bg(Color::White),
            bar_label: Style::default().fg(Color::Gray),
            share_palette: vec![Color::White, Color::Cyan, Color::Green, Color::Yellow],

            density_empty: Style::default().fg(Color::DarkGray),
            density_low: Style::default().fg(Color::Green),
            density_medium: Style::default().fg(Color::Yellow),
            density_high: Style::default().fg(Color::Red),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            table_link: Style::default().fg(Color::Cyan),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark | BackgroundType::Unknown => Self::dark(),
        }
    }

    /// Construct a theme by name. Unknown names fall back to `auto_detect`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Style for a density cell holding `value` out of a grid maximum `max`.
    pub fn density_style(&self, value: u64, max: u64) -> Style {
        if value == 0 || max == 0 {
            return self.density_empty;
        }
        let ratio = value as f64 / max as f64;
        if ratio >= 2.0 / 3.0 {
            self.density_high
        } else if ratio >= 1.0 / 3.0 {
            self.density_medium
        } else {
            self.density_low
        }
    }

    /// Colour for the `index`-th share bar, wrapping around the palette.
    pub fn share_style(&self, index: usize) -> Style {
        match self.share_palette.len() {
            0 => self.bar,
            n => Style::default().fg(self.share_palette[index % n]),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Theme construction ───────────────────────────────────────────────────

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Green));
        assert_eq!(t.bar.fg, Some(Color::Green));
        assert_eq!(t.warning.fg, Some(Color::Yellow));
        assert!(!t.share_palette.is_empty());
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.table_row.fg, Some(Color::Black));
    }

    #[test]
    fn test_classic_theme_has_no_modifiers() {
        let t = Theme::classic();
        assert!(!t.value.add_modifier.contains(Modifier::BOLD));
        assert!(!t.header.add_modifier.contains(Modifier::BOLD));
        assert!(!t.table_link.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Green));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        assert_eq!(Theme::from_name("classic").tab_active.bg, Some(Color::White));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    // ── density_style ────────────────────────────────────────────────────────

    #[test]
    fn test_density_style_thresholds() {
        let t = Theme::dark();
        assert_eq!(t.density_style(0, 9), t.density_empty);
        assert_eq!(t.density_style(5, 0), t.density_empty);
        assert_eq!(t.density_style(2, 9), t.density_low);
        assert_eq!(t.density_style(3, 9), t.density_medium);
        assert_eq!(t.density_style(6, 9), t.density_high);
        assert_eq!(t.density_style(9, 9), t.density_high);
    }

    // ── share_style ──────────────────────────────────────────────────────────

    #[test]
    fn test_share_style_wraps_palette() {
        let t = Theme::classic();
        let n = t.share_palette.len();
        assert_eq!(t.share_style(0), t.share_style(n));
        assert_ne!(t.share_style(0), t.share_style(1));
    }

    #[test]
    fn test_share_style_empty_palette_uses_bar() {
        let mut t = Theme::dark();
        t.share_palette.clear();
        assert_eq!(t.share_style(3), t.bar);
    }
}
