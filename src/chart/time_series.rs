//! Daily counts with a moving-average overlay.

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{add_months, chart_err, day_number, format_day_number};
use crate::domain::SeriesPoint;
use crate::error::AppError;

/// Cosmetic options for the time-series chart.
#[derive(Debug, Clone)]
pub struct TimeSeriesStyle {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub count_color: RGBColor,
    pub ma_color: RGBColor,
    /// Draw a dot at every daily count.
    pub show_markers: bool,
    /// Stroke width of the moving-average line.
    pub ma_width: u32,
    /// Empty months appended after the last date on the x axis.
    pub extra_months: u32,
    pub count_label: String,
    pub ma_label: String,
}

impl Default for TimeSeriesStyle {
    fn default() -> Self {
        Self {
            title: "Time Series Chart".to_string(),
            width: 1000,
            height: 500,
            count_color: BLUE,
            ma_color: RED,
            show_markers: true,
            ma_width: 3,
            extra_months: 1,
            count_label: "Contagem".to_string(),
            ma_label: "Média Móvel".to_string(),
        }
    }
}

/// Draw `series` onto `root`.
pub fn draw_time_series<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[SeriesPoint],
    style: &TimeSeriesStyle,
) -> Result<(), AppError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(AppError::new(3, "Nothing to chart: the series is empty."));
    };

    let x0 = day_number(first.date);
    let x1 = day_number(add_months(last.date, style.extra_months)).max(x0 + 1.0);

    let y_top = series
        .iter()
        .map(|p| (p.count as f64).max(p.moving_average))
        .fold(0.0_f64, f64::max);
    let y1 = (y_top * 1.05).max(1.0);

    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&style.title, ("sans-serif", 16).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(x0..x1, 0.0..y1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| format_day_number(*v))
        .draw()
        .map_err(chart_err)?;

    let count_color = style.count_color;
    let ma_color = style.ma_color;

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|p| (day_number(p.date), p.count as f64)),
            count_color.mix(0.7).stroke_width(1),
        ))
        .map_err(chart_err)?
        .label(style.count_label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], count_color.stroke_width(2)));

    if style.show_markers {
        chart
            .draw_series(
                series
                    .iter()
                    .map(|p| Circle::new((day_number(p.date), p.count as f64), 2, count_color.filled())),
            )
            .map_err(chart_err)?;
    }

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|p| (day_number(p.date), p.moving_average)),
            ma_color.stroke_width(style.ma_width),
        ))
        .map_err(chart_err)?
        .label(style.ma_label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ma_color.stroke_width(3)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.5))
        .draw()
        .map_err(chart_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::chart::time_series_svg_string;

    fn series() -> Vec<SeriesPoint> {
        vec![
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                count: 3,
                moving_average: 3.0,
            },
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                count: 1,
                moving_average: 2.0,
            },
            SeriesPoint {
                date: NaiveDate::from_ymd_opt(2020, 1, 5).unwrap(),
                count: 2,
                moving_average: 2.0,
            },
        ]
    }

    #[test]
    fn svg_contains_title_and_legend() {
        let style = TimeSeriesStyle {
            title: "Proposições Diárias".to_string(),
            ..TimeSeriesStyle::default()
        };
        let svg = time_series_svg_string(&series(), &style).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Proposições Diárias"));
        assert!(svg.contains("Contagem"));
        assert!(svg.contains("Média Móvel"));
    }

    #[test]
    fn markers_toggle_leaves_plain_lines() {
        let with = time_series_svg_string(&series(), &TimeSeriesStyle::default()).unwrap();
        assert_eq!(with.matches("<circle").count(), 3);

        let style = TimeSeriesStyle {
            show_markers: false,
            ..TimeSeriesStyle::default()
        };
        let without = time_series_svg_string(&series(), &style).unwrap();
        assert_eq!(without.matches("<circle").count(), 0);
        assert!(without.contains("<polyline"));
        assert!(without.contains("Contagem"));
        assert!(without.contains("Média Móvel"));
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = time_series_svg_string(&[], &TimeSeriesStyle::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
