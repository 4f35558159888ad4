//! Ratatui-based terminal viewer.
//!
//! Shows the daily publication trend (counts + moving average) and the
//! distribution by proposition type for whatever is in the local database.
//! `Tab` switches view, `+`/`-` change the window, `r` reloads, `q` quits.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::aggregate::{category_distribution, daily_series, rewindow};
use crate::chart::day_number;
use crate::domain::{CategoryShare, DistributionConfig, Proposition, SeriesConfig, SeriesPoint};
use crate::error::AppError;
use crate::plot::render_ascii_bars;
use crate::store::Store;

mod plotters_chart;

use plotters_chart::TrendPlottersChart;

/// Start the viewer on the database at `db_path`.
pub fn run(db_path: PathBuf, series_config: SeriesConfig, dist_config: DistributionConfig) -> Result<(), AppError> {
    let store = Store::open(&db_path)?;
    let mut app = App::new(store, series_config, dist_config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Trend,
    Types,
}

struct App {
    store: Store,
    series_config: SeriesConfig,
    dist_config: DistributionConfig,
    view: View,
    propositions: Vec<Proposition>,
    series: Vec<SeriesPoint>,
    shares: Vec<CategoryShare>,
    status: String,
}

impl App {
    fn new(store: Store, series_config: SeriesConfig, dist_config: DistributionConfig) -> Result<Self, AppError> {
        let mut app = Self {
            store,
            series_config,
            dist_config,
            view: View::Trend,
            propositions: Vec::new(),
            series: Vec::new(),
            shares: Vec::new(),
            status: String::new(),
        };
        app.reload()?;
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Trend => View::Types,
                    View::Types => View::Trend,
                };
            }
            KeyCode::Char('+') | KeyCode::Right => self.set_window(self.series_config.window.saturating_add(1)),
            KeyCode::Char('-') | KeyCode::Left => self.set_window(self.series_config.window.saturating_sub(1).max(1)),
            KeyCode::Char('r') => self.reload()?,
            _ => {}
        }
        Ok(false)
    }

    fn set_window(&mut self, window: usize) {
        match rewindow(&self.series, window) {
            Ok(series) => {
                self.series = series;
                self.series_config.window = window;
                self.status = format!("window: {window}");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn reload(&mut self) -> Result<(), AppError> {
        self.propositions = self.store.load_propositions(None)?;

        // A bad date rejects the whole series; show why instead of exiting.
        match daily_series(&self.propositions, &self.series_config) {
            Ok(series) => {
                self.series = series;
                self.status = format!("Loaded {} propositions.", self.propositions.len());
            }
            Err(e) => {
                self.series.clear();
                self.status = e.to_string();
            }
        }

        match category_distribution(&self.propositions, &self.dist_config) {
            Ok(shares) => self.shares = shares,
            Err(e) => {
                self.shares.clear();
                self.status = e.to_string();
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Trend => self.draw_trend(frame, chunks[1]),
            View::Types => self.draw_types(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let range = match (self.series.first(), self.series.last()) {
            (Some(a), Some(b)) => format!("{} .. {}", a.date.format("%d/%m/%Y"), b.date.format("%d/%m/%Y")),
            _ => "-".to_string(),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("propstat", Style::default().fg(Color::Cyan)),
                Span::raw(" - proposições"),
            ]),
            Line::from(Span::styled(
                format!(
                    "records: {} | days: {} | range: {range} | window: {}",
                    self.propositions.len(),
                    self.series.len(),
                    self.series_config.window,
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Proposições diárias (média móvel)");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let counts: Vec<(f64, f64)> = self.series.iter().map(|p| (day_number(p.date), p.count as f64)).collect();
        let moving_average: Vec<(f64, f64)> = self
            .series
            .iter()
            .map(|p| (day_number(p.date), p.moving_average))
            .collect();

        let Some((x_bounds, y_bounds)) = TrendPlottersChart::bounds_for(&counts, &moving_average) else {
            frame.render_widget(Paragraph::new("No data. Run `propstat ingest` first."), inner);
            return;
        };

        frame.render_widget(
            TrendPlottersChart {
                counts: &counts,
                moving_average: &moving_average,
                x_bounds,
                y_bounds,
            },
            inner,
        );
    }

    fn draw_types(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Distribuição por {}", self.dist_config.field));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Largest category on top.
        let mut shares = self.shares.clone();
        shares.reverse();
        let label_width = shares.iter().map(|s| s.label.chars().count()).max().unwrap_or(0) as u16;
        let bar_width = inner.width.saturating_sub(label_width + 20).max(1) as usize;
        let text = render_ascii_bars(&shares, bar_width);
        frame.render_widget(Paragraph::new(text), inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Tab: switch view | +/-: window | r: reload | q: quit",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::raw(self.status.clone())),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(codigo: &str, tipo: &str, date: &str) -> Proposition {
        Proposition {
            codigo: codigo.to_string(),
            tipo_proposicao: Some(tipo.to_string()),
            data_publicacao: Some(date.to_string()),
            ano_arquivo: 2020,
            ..Default::default()
        }
    }

    fn app_with(rows: &[Proposition], window: usize) -> App {
        let mut store = Store::open_in_memory().unwrap();
        store.upsert_propositions(rows).unwrap();
        let config = SeriesConfig {
            window,
            ..SeriesConfig::default()
        };
        App::new(store, config, DistributionConfig::default()).unwrap()
    }

    fn sample() -> Vec<Proposition> {
        vec![
            prop("A", "Requerimento", "01/01/2020"),
            prop("B", "Requerimento", "01/01/2020"),
            prop("C", "Veto", "02/01/2020"),
            prop("D", "Requerimento", "03/01/2020"),
        ]
    }

    #[test]
    fn loads_series_and_distribution_on_start() {
        let app = app_with(&sample(), 2);
        assert_eq!(app.view, View::Trend);
        assert_eq!(app.propositions.len(), 4);
        let counts: Vec<usize> = app.series.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![2, 1, 1]);
        assert_eq!(app.series[1].moving_average, 1.5);
        assert_eq!(app.shares.len(), 2);
        assert_eq!(app.status, "Loaded 4 propositions.");
    }

    #[test]
    fn plus_and_minus_change_the_window() {
        let mut app = app_with(&sample(), 2);

        assert!(!app.handle_key(KeyCode::Char('+')).unwrap());
        assert_eq!(app.series_config.window, 3);
        // (2 + 1 + 1) / 3
        assert!((app.series[2].moving_average - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(app.status, "window: 3");

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.series_config.window, 1);
        for p in &app.series {
            assert_eq!(p.moving_average, p.count as f64);
        }
    }

    #[test]
    fn minus_stops_at_one() {
        let mut app = app_with(&sample(), 1);
        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('-')).unwrap();
        assert_eq!(app.series_config.window, 1);
        assert_eq!(app.series.len(), 3);
    }

    #[test]
    fn tab_switches_views_and_q_quits() {
        let mut app = app_with(&sample(), 2);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.view, View::Types);
        app.handle_key(KeyCode::Tab).unwrap();
        assert_eq!(app.view, View::Trend);

        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }

    #[test]
    fn bad_date_clears_series_and_reports_in_status() {
        let mut rows = sample();
        rows.push(prop("E", "Veto", "2020-01-04"));
        let app = app_with(&rows, 2);

        assert!(app.series.is_empty());
        assert!(app.status.contains("'2020-01-04'"), "{}", app.status);
        // The distribution does not depend on dates.
        assert_eq!(app.shares.iter().map(|s| s.count).sum::<usize>(), 5);
    }

    #[test]
    fn reload_picks_up_new_rows() {
        let mut app = app_with(&sample(), 2);
        app.store.upsert_propositions(&[prop("Z", "Veto", "09/01/2020")]).unwrap();
        app.handle_key(KeyCode::Char('r')).unwrap();
        assert_eq!(app.propositions.len(), 5);
        assert_eq!(app.series.len(), 4);
    }
}
