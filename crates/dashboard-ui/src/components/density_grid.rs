use crate::themes::Theme;
use dashboard_data::aggregator::DensityPoint;
use ratatui::text::{Line, Span};

/// Character-cell heat map of observation density.
///
/// The bounding box of all points is divided into `cols × rows` cells with
/// north at the top; each cell shows the summed individual count of the
/// points falling into it, shaded relative to the busiest cell.
pub struct DensityGrid<'a> {
    pub points: &'a [DensityPoint],
    pub cols: usize,
    pub rows: usize,
    pub theme: &'a Theme,
}

impl<'a> DensityGrid<'a> {
    pub fn new(points: &'a [DensityPoint], cols: usize, rows: usize, theme: &'a Theme) -> Self {
        Self {
            points,
            cols: cols.max(1),
            rows: rows.max(1),
            theme,
        }
    }

    /// Summed counts per cell, row-major, top row first.
    pub fn cells(&self) -> Vec<Vec<u64>> {
        let mut grid = vec![vec![0u64; self.cols]; self.rows];
        if self.points.is_empty() {
            return grid;
        }

        let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in self.points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lon = min_lon.min(p.longitude);
            max_lon = max_lon.max(p.longitude);
        }

        for p in self.points {
            let col = bucket(p.longitude - min_lon, max_lon - min_lon, self.cols);
            let row = bucket(max_lat - p.latitude, max_lat - min_lat, self.rows);
            grid[row][col] += p.count;
        }
        grid
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let grid = self.cells();
        let max = grid.iter().flatten().copied().max().unwrap_or(0);

        grid.into_iter()
            .map(|row| {
                let spans: Vec<Span<'a>> = row
                    .into_iter()
                    .map(|value| {
                        Span::styled(
                            glyph(value, max).to_string(),
                            self.theme.density_style(value, max),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

/// Index of `offset` within `span` split into `n` buckets.
fn bucket(offset: f64, span: f64, n: usize) -> usize {
    if span <= 0.0 || n <= 1 {
        return 0;
    }
    let idx = ((offset / span) * (n - 1) as f64).round() as usize;
    idx.min(n - 1)
}

fn glyph(value: u64, max: u64) -> char {
    if value == 0 || max == 0 {
        return '·';
    }
    let ratio = value as f64 / max as f64;
    if ratio >= 2.0 / 3.0 {
        '█'
    } else if ratio >= 1.0 / 3.0 {
        '▓'
    } else {
        '░'
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64, count: u64) -> DensityPoint {
        DensityPoint {
            latitude,
            longitude,
            count,
        }
    }

    #[test]
    fn test_cells_corners_north_up() {
        let theme = Theme::dark();
        let points = vec![point(50.0, 14.0, 3), point(49.0, 16.0, 5)];
        let grid = DensityGrid::new(&points, 5, 3, &theme).cells();

        // North-west point lands top-left, south-east bottom-right.
        assert_eq!(grid[0][0], 3);
        assert_eq!(grid[2][4], 5);
        assert_eq!(grid.iter().flatten().sum::<u64>(), 8);
    }

    #[test]
    fn test_cells_single_point_goes_to_origin() {
        let theme = Theme::dark();
        let points = vec![point(49.5, 15.5, 7)];
        let grid = DensityGrid::new(&points, 4, 4, &theme).cells();
        assert_eq!(grid[0][0], 7);
    }

    #[test]
    fn test_to_lines_dimensions_and_glyphs() {
        let theme = Theme::dark();
        let points = vec![point(50.0, 14.0, 1), point(49.0, 16.0, 9)];
        let lines = DensityGrid::new(&points, 6, 2, &theme).to_lines();

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.spans.len() == 6));
        assert_eq!(lines[0].spans[0].content, "░");
        assert_eq!(lines[1].spans[5].content, "█");
        assert_eq!(lines[0].spans[3].content, "·");
    }

    #[test]
    fn test_empty_points_render_blank_grid() {
        let theme = Theme::dark();
        let lines = DensityGrid::new(&[], 3, 2, &theme).to_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .all(|s| s.content == "·"));
    }

    #[test]
    fn test_zero_dimensions_are_clamped() {
        let theme = Theme::dark();
        let points = vec![point(1.0, 1.0, 1)];
        assert_eq!(DensityGrid::new(&points, 0, 0, &theme).cells(), vec![vec![1]]);
    }
}
