//! Plotters-powered trend chart widget for Ratatui.
//!
//! Plotters output is drawn into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::format_day_number;

/// A render-only description of the trend chart.
///
/// All series and bounds are computed outside the render call so `render()`
/// only draws.
pub struct TrendPlottersChart<'a> {
    /// Daily counts, x = day number.
    pub counts: &'a [(f64, f64)],
    /// Moving average, x = day number.
    pub moving_average: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> TrendPlottersChart<'a> {
    /// Bounds that fit both series, with a little headroom on y.
    pub fn bounds_for(counts: &[(f64, f64)], moving_average: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
        let mut x0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = 0.0_f64;
        for &(x, y) in counts.iter().chain(moving_average) {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        if !(x0.is_finite() && x1.is_finite()) {
            return None;
        }
        if x1 <= x0 {
            x1 = x0 + 1.0;
        }
        Some(([x0, x1], [0.0, (y1 * 1.05).max(1.0)]))
    }
}

impl<'a> Widget for TrendPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a tiny area; show a hint instead
        // of panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(4)
                .y_labels(5)
                .x_label_formatter(&|v| format_day_number(*v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let count_color = RGBColor(0, 255, 255); // cyan
            let ma_color = RGBColor(255, 0, 0); // red

            // Counts as dots; `Circle` radii are mis-scaled by the backend.
            chart.draw_series(self.counts.iter().map(|&(x, y)| Pixel::new((x, y), count_color)))?;

            chart.draw_series(LineSeries::new(self.moving_average.iter().copied(), &ma_color))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_both_series() {
        let counts = [(10.0, 3.0), (12.0, 1.0)];
        let ma = [(10.0, 3.0), (12.0, 2.0)];
        let (x, y) = TrendPlottersChart::bounds_for(&counts, &ma).unwrap();
        assert_eq!(x, [10.0, 12.0]);
        assert!((y[1] - 3.15).abs() < 1e-12);
        assert_eq!(y[0], 0.0);
    }

    #[test]
    fn bounds_widen_single_day() {
        let (x, _) = TrendPlottersChart::bounds_for(&[(5.0, 1.0)], &[]).unwrap();
        assert_eq!(x, [5.0, 6.0]);
        assert!(TrendPlottersChart::bounds_for(&[], &[]).is_none());
    }
}
