//! Horizontal bar chart for category distributions.
//!
//! Bars are drawn bottom-up in input order, so an ascending distribution puts
//! the largest category on top.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::chart_err;
use crate::domain::CategoryShare;
use crate::error::AppError;

/// Where the value label sits relative to its bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPosition {
    Inside,
    Outside,
}

/// Cosmetic options for the bar chart.
#[derive(Debug, Clone)]
pub struct BarChartStyle {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub bar_color: RGBColor,
    /// Append the share (`12 (3.4%)`) to each value label.
    pub show_percentages: bool,
    pub text_position: TextPosition,
}

impl Default for BarChartStyle {
    fn default() -> Self {
        Self {
            title: "Horizontal Bar Chart".to_string(),
            width: 900,
            height: 400,
            bar_color: RGBColor(173, 216, 230), // lightblue
            show_percentages: true,
            text_position: TextPosition::Inside,
        }
    }
}

/// Text drawn next to a bar.
pub fn bar_label(share: &CategoryShare, show_percentages: bool) -> String {
    if show_percentages {
        format!("{} ({:.1}%)", share.count, share.proportion * 100.0)
    } else {
        share.count.to_string()
    }
}

/// Draw `shares` onto `root`.
pub fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    shares: &[CategoryShare],
    style: &BarChartStyle,
) -> Result<(), AppError> {
    if shares.is_empty() {
        return Err(AppError::new(3, "Nothing to chart: the distribution is empty."));
    }

    let n = shares.len() as i32;
    let max_count = shares.iter().map(|s| s.count).max().unwrap_or(0) as f64;
    // Leave room on the right for outside labels.
    let x1 = (max_count * 1.2).max(1.0);

    let longest_label = shares.iter().map(|s| s.label.chars().count()).max().unwrap_or(0) as u32;

    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&style.title, ("sans-serif", 16).into_font())
        .margin(10)
        .x_label_area_size(20)
        .y_label_area_size((longest_label * 7).clamp(40, 300))
        .build_cartesian_2d(0.0..x1, (0..n).into_segmented())
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .y_labels(shares.len())
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => shares
                .get(*i as usize)
                .map(|s| s.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(chart_err)?;

    let bar_style = style.bar_color.filled();
    chart
        .draw_series(shares.iter().enumerate().map(|(i, s)| {
            let i = i as i32;
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(i)), (s.count as f64, SegmentValue::Exact(i + 1))],
                bar_style,
            );
            bar.set_margin(3, 3, 0, 0);
            bar
        }))
        .map_err(chart_err)?;

    let font = ("sans-serif", 12).into_font().color(&BLACK);
    chart
        .draw_series(shares.iter().enumerate().map(|(i, s)| {
            let x = match style.text_position {
                TextPosition::Inside => 0.0,
                TextPosition::Outside => s.count as f64,
            };
            EmptyElement::at((x, SegmentValue::CenterOf(i as i32)))
                + Text::new(bar_label(s, style.show_percentages), (4, -6), font.clone())
        }))
        .map_err(chart_err)?;

    Ok(())
}
