//! Interactive terminal chart using ratatui.

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tickwatch_core::types::{IndicatorFrame, PriceSeries, Signal, SignalType};

const MS_PER_DAY: i64 = 86_400_000;
const VOLUME_SCALE_FALLBACK: f64 = 0.0001;
const MIN_VISIBLE_BARS: usize = 10;

/// Factor that maps volume onto the price axis: max(close) / max(volume).
///
/// Falls back to 0.0001 when the ratio is undefined.
pub fn volume_scale(closes: &[f64], volumes: &[f64]) -> f64 {
    let max_close = closes.iter().copied().fold(f64::NAN, f64::max);
    let max_volume = volumes.iter().copied().fold(f64::NAN, f64::max);
    let scale = max_close / max_volume;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        VOLUME_SCALE_FALLBACK
    }
}

/// Everything the chart draws, cut down to the display window.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub close: Vec<f64>,
    pub sma: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    /// Volume multiplied by `volume_scale`
    pub volume: Vec<f64>,
    pub volume_scale: f64,
    pub signal: Option<Signal>,
}

impl ChartData {
    /// Keep the bars from the last `display_days` days before the final bar.
    ///
    /// Indicators come from `frame`, which must be computed over the whole
    /// series so the window starts with warmed-up values. The volume scale is
    /// also taken from the whole series.
    pub fn prepare(
        series: &PriceSeries,
        frame: &IndicatorFrame,
        display_days: u32,
        signal: Option<Signal>,
    ) -> Self {
        let scale = volume_scale(&series.closes(), &series.volumes());
        let start = series
            .last()
            .map(|b| series.position_from(b.timestamp - i64::from(display_days) * MS_PER_DAY))
            .unwrap_or(0);

        let bars = &series.bars()[start..];
        let entries = frame.entries().get(start..).unwrap_or(&[]);

        Self {
            symbol: series.symbol().to_string(),
            dates: bars.iter().map(|b| b.date()).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            sma: entries.iter().map(|e| e.sma).collect(),
            upper: entries.iter().map(|e| e.upper_band).collect(),
            lower: entries.iter().map(|e| e.lower_band).collect(),
            volume: bars.iter().map(|b| b.volume * scale).collect(),
            volume_scale: scale,
            signal,
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Lowest and highest price or band value over `range`, padded by 2%.
    pub fn price_bounds(&self, range: std::ops::Range<usize>) -> (f64, f64) {
        let values = self.close[range.clone()].iter().copied().chain(
            [&self.sma, &self.upper, &self.lower]
                .into_iter()
                .flat_map(|s| s[range.clone()].iter().flatten().copied()),
        );
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !lo.is_finite() || !hi.is_finite() {
            return (0.0, 1.0);
        }
        let pad = ((hi - lo) * 0.02).max(0.01);
        (lo - pad, hi + pad)
    }
}

/// Visible slice of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub start: usize,
    pub width: usize,
    total: usize,
}

impl Viewport {
    /// Show all `total` bars.
    pub fn new(total: usize) -> Self {
        Self {
            start: 0,
            width: total,
            total,
        }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..(self.start + self.width).min(self.total)
    }

    fn step(&self) -> usize {
        (self.width / 10).max(1)
    }

    pub fn pan_left(&mut self) {
        self.start = self.start.saturating_sub(self.step());
    }

    pub fn pan_right(&mut self) {
        let max_start = self.total.saturating_sub(self.width);
        self.start = (self.start + self.step()).min(max_start);
    }

    /// Halve the visible width, keeping the right edge.
    pub fn zoom_in(&mut self) {
        let end = self.range().end;
        self.width = (self.width / 2).max(MIN_VISIBLE_BARS.min(self.total));
        self.start = end.saturating_sub(self.width);
    }

    /// Double the visible width, keeping the right edge where possible.
    pub fn zoom_out(&mut self) {
        let end = self.range().end;
        self.width = (self.width * 2).min(self.total);
        self.start = end.saturating_sub(self.width).min(self.total - self.width);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.total);
    }
}

/// Terminal chart of one analysis.
pub struct ChartView {
    refresh_ms: u64,
}

impl ChartView {
    pub fn new(refresh_ms: u64) -> Self {
        Self { refresh_ms }
    }

    /// Show the chart until the user presses `q` or Esc.
    pub fn run(&self, data: &ChartData) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_loop(&mut terminal, data);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    fn run_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        data: &ChartData,
    ) -> io::Result<()> {
        let mut viewport = Viewport::new(data.len());
        loop {
            terminal.draw(|f| self.ui(f, data, &viewport))?;

            if !event::poll(Duration::from_millis(self.refresh_ms))? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Left | KeyCode::Char('h') => viewport.pan_left(),
                    KeyCode::Right | KeyCode::Char('l') => viewport.pan_right(),
                    KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => viewport.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Down => viewport.zoom_out(),
                    KeyCode::Char('r') | KeyCode::Home => viewport.reset(),
                    _ => {}
                }
            }
        }
    }

    fn ui(&self, frame: &mut Frame, data: &ChartData, viewport: &Viewport) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3),      // Header
                Constraint::Percentage(70), // Price
                Constraint::Min(5),         // Volume
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0], data);
        if data.is_empty() {
            let empty = Paragraph::new("No bars in the display window")
                .block(Block::default().borders(Borders::ALL).title("Price"));
            frame.render_widget(empty, chunks[1]);
            return;
        }
        self.render_price(frame, chunks[1], data, viewport);
        self.render_volume(frame, chunks[2], data, viewport);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, data: &ChartData) {
        let mut spans = vec![
            Span::styled(
                format!("{} Technical Analysis", data.symbol),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
        ];
        if let Some(signal) = &data.signal {
            let color = match signal.signal_type {
                SignalType::Buy => Color::Green,
                SignalType::Sell => Color::Red,
                SignalType::Hold => Color::Yellow,
            };
            spans.push(Span::raw("Signal: "));
            spans.push(Span::styled(
                signal.signal_type.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!(" ({}) | ", signal.reason)));
        }
        spans.push(Span::raw("←/→ pan  +/- zoom  r reset  q quit"));

        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL).title("tickwatch"));
        frame.render_widget(header, area);
    }

    fn render_price(&self, frame: &mut Frame, area: Rect, data: &ChartData, viewport: &Viewport) {
        let range = viewport.range();
        let close = points(range.clone(), data.close.iter().map(|v| Some(*v)));
        let sma = points(range.clone(), data.sma.iter().copied());
        let upper = points(range.clone(), data.upper.iter().copied());
        let lower = points(range.clone(), data.lower.iter().copied());

        let datasets = vec![
            Dataset::default()
                .name("Price")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Blue))
                .data(&close),
            Dataset::default()
                .name("20 SMA")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Rgb(255, 165, 0)))
                .data(&sma),
            Dataset::default()
                .name("Upper Band")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&upper),
            Dataset::default()
                .name("Lower Band")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Red))
                .data(&lower),
        ];

        let (lo, hi) = data.price_bounds(range.clone());
        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title("Price"))
            .x_axis(self.date_axis(data, &range))
            .y_axis(
                Axis::default()
                    .bounds([lo, hi])
                    .labels(value_labels(lo, hi))
                    .style(Style::default().fg(Color::Gray)),
            );
        frame.render_widget(chart, area);
    }

    fn render_volume(&self, frame: &mut Frame, area: Rect, data: &ChartData, viewport: &Viewport) {
        let range = viewport.range();
        let volume = points(range.clone(), data.volume.iter().map(|v| Some(*v)));
        let hi = data.volume[range.clone()]
            .iter()
            .copied()
            .fold(0.0_f64, f64::max)
            .max(f64::EPSILON);

        let chart = Chart::new(vec![Dataset::default()
            .name("Volume")
            .marker(symbols::Marker::HalfBlock)
            .graph_type(GraphType::Bar)
            .style(Style::default().fg(Color::DarkGray))
            .data(&volume)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Volume (x{:.3e})", data.volume_scale)),
        )
        .x_axis(self.date_axis(data, &range))
        .y_axis(Axis::default().bounds([0.0, hi]).labels(value_labels(0.0, hi)));
        frame.render_widget(chart, area);
    }

    fn date_axis<'a>(&self, data: &ChartData, range: &std::ops::Range<usize>) -> Axis<'a> {
        let first = range.start;
        let last = range.end.saturating_sub(1).max(first);
        let mid = first + (last - first) / 2;
        let labels: Vec<String> = [first, mid, last]
            .iter()
            .map(|&i| data.dates.get(i).map(|d| d.to_string()).unwrap_or_default())
            .collect();
        Axis::default()
            .bounds([first as f64, last.max(first + 1) as f64])
            .labels(labels)
            .style(Style::default().fg(Color::Gray))
    }
}

/// `(index, value)` pairs for the defined values inside `range`.
fn points(
    range: std::ops::Range<usize>,
    values: impl Iterator<Item = Option<f64>>,
) -> Vec<(f64, f64)> {
    values
        .enumerate()
        .skip(range.start)
        .take(range.end - range.start)
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect()
}

fn value_labels(lo: f64, hi: f64) -> Vec<String> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|v| format!("{v:.2}"))
        .collect()
}
