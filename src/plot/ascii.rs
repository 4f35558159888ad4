//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Time-series plot elements:
//! - daily counts: `o`
//! - moving average: `-` line
//!
//! Bar plot: one row per category, bar length proportional to count.

use chrono::Datelike;

use crate::domain::{CategoryShare, SeriesPoint};

/// Render a daily series with its moving average.
pub fn render_ascii_series(series: &[SeriesPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return "Plot: (empty series)\n".to_string();
    };

    let x_min = first.date.num_days_from_ce() as f64;
    let mut x_max = last.date.num_days_from_ce() as f64;
    if x_max <= x_min {
        x_max = x_min + 1.0;
    }

    let (y_min, y_max) = y_range(series).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Moving average first so counts overlay it.
    let curve: Vec<(usize, usize)> = series
        .iter()
        .map(|p| {
            (
                map_x(p.date.num_days_from_ce() as f64, x_min, x_max, width),
                map_y(p.moving_average, y_min, y_max, height),
            )
        })
        .collect();
    draw_curve(&mut grid, &curve);

    for p in series {
        let x = map_x(p.date.num_days_from_ce() as f64, x_min, x_max, width);
        let y = map_y(p.count as f64, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{}, {}] | y=[{y_min:.2}, {y_max:.2}]\n",
        first.date.format("%d/%m/%Y"),
        last.date.format("%d/%m/%Y"),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Render a category distribution as horizontal bars, one row per category.
///
/// Rows keep the input order, top to bottom.
pub fn render_ascii_bars(shares: &[CategoryShare], width: usize) -> String {
    if shares.is_empty() {
        return "(no categories)\n".to_string();
    }

    let width = width.max(1);
    let label_width = shares.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    let max_count = shares.iter().map(|s| s.count).max().unwrap_or(0).max(1);

    let mut out = String::new();
    for s in shares {
        let len = ((s.count as f64 / max_count as f64) * width as f64).round() as usize;
        let pad = label_width - s.label.chars().count();
        out.push_str(&s.label);
        out.push_str(&" ".repeat(pad));
        out.push_str(" |");
        out.push_str(&"#".repeat(len));
        out.push_str(&format!(" {} ({:.1}%)\n", s.count, s.proportion * 100.0));
    }
    out
}

fn y_range(series: &[SeriesPoint]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for p in series {
        min_y = min_y.min(p.count as f64).min(p.moving_average);
        max_y = max_y.max(p.count as f64).max(p.moving_average);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], cells: &[(usize, usize)]) {
    let mut prev = None;
    for &(x, y) in cells {
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, '-');
        } else {
            grid[y][x] = '-';
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn point(day: u32, count: usize, moving_average: f64) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            count,
            moving_average,
        }
    }

    #[test]
    fn series_golden_snapshot_small() {
        let series = vec![point(1, 3, 3.0), point(10, 1, 3.0)];
        let txt = render_ascii_series(&series, 10, 5);
        // Both MA values sit on the top row; the second count drops to the bottom.
        let expected = concat!(
            "Plot: date=[01/01/2020, 10/01/2020] | y=[0.90, 3.10]\n",
            "o---------\n",
            "          \n",
            "          \n",
            "          \n",
            "         o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_renders_placeholder() {
        assert_eq!(render_ascii_series(&[], 20, 5), "Plot: (empty series)\n");
    }

    #[test]
    fn bars_scale_to_widest_category() {
        let shares = vec![
            CategoryShare {
                label: "Veto".to_string(),
                count: 1,
                proportion: 0.2,
            },
            CategoryShare {
                label: "Requerimento".to_string(),
                count: 4,
                proportion: 0.8,
            },
        ];
        let txt = render_ascii_bars(&shares, 8);
        assert_eq!(
            txt,
            concat!(
                "Veto         |## 1 (20.0%)\n",
                "Requerimento |######## 4 (80.0%)\n",
            )
        );
    }
}
