//! Chart rendering for individual dashboard views.
//!
//! Each [`ViewOutcome`] is drawn into its own bordered panel: rankings as bar
//! lists, monthly series as line charts, the price distribution as a bar
//! chart, quantity as a text box plot and the weekday/hour grid as a coloured
//! table. Omitted views render a warning in place of the chart.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    symbols,
    text::{Line, Span, Text},
    widgets::{Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};

use sales_core::formatting::{format_month, format_number};
use sales_core::models::Column;
use sales_data::aggregator::{HeatmapGrid, MonthlyPoint, RankedEntry, HEATMAP_HOURS};
use sales_data::distribution::{BoxStats, Histogram};
use sales_data::views::{View, ViewOutcome, ViewResult};

use crate::components::bar_list::{BarList, BarListConfig, ValueFormat};
use crate::table_view;
use crate::themes::Theme;

pub const STOCK_UNAVAILABLE: &str = "Stock data not available";
pub const NO_DATA_IN_RANGE: &str = "No data in the selected range";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Number format used for a view's values.
pub fn value_format(view: View) -> ValueFormat {
    match view {
        View::RevenueByProduct | View::RevenueTrend | View::AveragePriceByProduct => {
            ValueFormat::Currency
        }
        _ => ValueFormat::Count,
    }
}

fn panel<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.table_border)
        .title(Span::styled(format!(" {} ", title), theme.header))
}

/// Draw one view outcome into `area`.
pub fn render_outcome(frame: &mut Frame, area: Rect, outcome: &ViewOutcome, theme: &Theme) {
    let view = outcome.view();
    let title = view.title();

    let result = match outcome {
        ViewOutcome::Omitted { missing, .. } => {
            render_message(frame, area, title, &omitted_message(missing), theme.warning, theme);
            return;
        }
        ViewOutcome::Ready { result, .. } => result,
    };
    if result.is_empty() {
        render_message(frame, area, title, NO_DATA_IN_RANGE, theme.dim, theme);
        return;
    }

    match result {
        ViewResult::Ranking(entries) => {
            render_ranking(frame, area, title, entries, value_format(view), theme)
        }
        ViewResult::Monthly(points) => {
            render_monthly(frame, area, title, points, value_format(view), theme)
        }
        ViewResult::Histogram(hist) => render_histogram(frame, area, title, hist, theme),
        ViewResult::BoxStats(Some(stats)) => render_box_stats(frame, area, title, stats, theme),
        ViewResult::BoxStats(None) => {
            render_message(frame, area, title, NO_DATA_IN_RANGE, theme.dim, theme)
        }
        ViewResult::Stock(entries) => {
            table_view::render_stock_table(frame, area, title, entries, theme)
        }
        ViewResult::Heatmap(grid) => render_heatmap(frame, area, title, grid, theme),
    }
}

/// Warning shown in place of a view that lacks columns.
pub fn omitted_message(missing: &[Column]) -> String {
    if missing.contains(&Column::Stock) {
        return STOCK_UNAVAILABLE.to_string();
    }
    let names: Vec<&str> = missing.iter().map(|c| c.header()).collect();
    format!("Missing columns: {}", names.join(", "))
}

fn render_message(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    style: Style,
    theme: &Theme,
) {
    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled(format!("⚠ {}", message), style)),
    ]);
    frame.render_widget(Paragraph::new(text).block(panel(title, theme)), area);
}

// ── Rankings ──────────────────────────────────────────────────────────────────

pub fn render_ranking(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[RankedEntry],
    format: ValueFormat,
    theme: &Theme,
) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let value_width = entries
        .iter()
        .map(|e| format.format(e.value).chars().count() + 1)
        .max()
        .unwrap_or(0);
    let label_width = (inner_width * 2 / 5).clamp(8, 32);
    let bar_width = inner_width
        .saturating_sub(label_width + value_width + 1)
        .max(1);

    let lines = BarList::new(entries, format, theme)
        .with_config(BarListConfig {
            label_width,
            bar_width,
            ..BarListConfig::default()
        })
        .to_lines();

    frame.render_widget(Paragraph::new(Text::from(lines)).block(panel(title, theme)), area);
}

// ── Monthly series ────────────────────────────────────────────────────────────

/// Y-axis bounds with some headroom; always includes zero.
pub fn y_bounds(points: &[MonthlyPoint]) -> [f64; 2] {
    let min = points.iter().map(|p| p.value).fold(0.0_f64, f64::min);
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    if max == min {
        return [min, min + 1.0];
    }
    let pad = (max - min) * 0.05;
    [if min < 0.0 { min - pad } else { 0.0 }, max + pad]
}

pub fn render_monthly(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    points: &[MonthlyPoint],
    format: ValueFormat,
    theme: &Theme,
) {
    let data: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.value))
        .collect();
    let x_max = (points.len().saturating_sub(1) as f64).max(1.0);
    let [y_min, y_max] = y_bounds(points);

    let x_labels: Vec<String> = match points {
        [] => Vec::new(),
        [only] => vec![format_month(only.month_end)],
        [first, .., last] => vec![
            format_month(first.month_end),
            format_month(points[points.len() / 2].month_end),
            format_month(last.month_end),
        ],
    };
    let y_labels = vec![
        format.format(y_min),
        format.format((y_min + y_max) / 2.0),
        format.format(y_max),
    ];

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.chart_primary)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(panel(title, theme))
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([y_min, y_max])
                .labels(y_labels),
        );

    frame.render_widget(chart, area);
}

// ── Distributions ─────────────────────────────────────────────────────────────

pub fn render_histogram(frame: &mut Frame, area: Rect, title: &str, hist: &Histogram, theme: &Theme) {
    let bars: Vec<(&str, u64)> = hist.bins.iter().map(|b| ("", b.count)).collect();
    let inner_width = area.width.saturating_sub(2) as usize;
    let bar_width = (inner_width / bars.len().max(1)).max(1) as u16;

    let title = format!(
        "{} (${} – ${})",
        title,
        format_number(hist.lower, 2),
        format_number(hist.upper, 2)
    );
    let chart = BarChart::default()
        .block(panel(&title, theme))
        .data(bars.as_slice())
        .bar_width(bar_width)
        .bar_gap(0)
        .bar_style(theme.chart_primary)
        .value_style(theme.dim);

    frame.render_widget(chart, area);
}

/// One-line text box plot over the clip range:
/// `├──███┃███───┤` where the block spans q1..q3 and `┃` marks the median.
pub fn box_plot_line(stats: &BoxStats, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let span = stats.clip_upper - stats.clip_lower;
    let pos = |v: f64| -> usize {
        if span <= 0.0 {
            width / 2
        } else {
            let p = ((v - stats.clip_lower) / span * (width - 1) as f64).round();
            (p.max(0.0) as usize).min(width - 1)
        }
    };

    let lw = pos(stats.lower_whisker);
    let q1 = pos(stats.q1);
    let med = pos(stats.median);
    let q3 = pos(stats.q3);
    let uw = pos(stats.upper_whisker);

    let mut cells = vec![' '; width];
    for c in &mut cells[lw..=uw] {
        *c = '─';
    }
    for c in &mut cells[q1..=q3] {
        *c = '█';
    }
    cells[lw] = '├';
    cells[uw] = '┤';
    cells[med] = '┃';
    cells.into_iter().collect()
}

pub fn render_box_stats(frame: &mut Frame, area: Rect, title: &str, stats: &BoxStats, theme: &Theme) {
    let width = area.width.saturating_sub(4) as usize;
    let row = |label: &str, value: f64| {
        Line::from(vec![
            Span::styled(format!("{:<16}", label), theme.label),
            Span::styled(format_number(value, 0), theme.value),
        ])
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(box_plot_line(stats, width), theme.chart_primary)),
        Line::from(vec![
            Span::styled(format_number(stats.clip_lower, 0), theme.axis),
            Span::raw(" … "),
            Span::styled(format_number(stats.clip_upper, 0), theme.axis),
        ]),
        Line::from(""),
        row("Lower whisker", stats.lower_whisker),
        row("Q1", stats.q1),
        row("Median", stats.median),
        row("Q3", stats.q3),
        row("Upper whisker", stats.upper_whisker),
        Line::from(Span::styled(
            format!("{} rows, clipped to 1st–99th percentile", stats.count),
            theme.dim,
        )),
    ];

    frame.render_widget(Paragraph::new(Text::from(lines)).block(panel(title, theme)), area);
}

// ── Heatmap ───────────────────────────────────────────────────────────────────

/// Short cell label: `950`, `1.2k`, `34k`, `1.5M`.
pub fn compact_count(value: i64) -> String {
    let abs = value.unsigned_abs() as f64;
    let sign = if value < 0 { "-" } else { "" };
    if abs < 1_000.0 {
        format!("{}", value)
    } else if abs < 10_000.0 {
        format!("{}{:.1}k", sign, abs / 1_000.0)
    } else if abs < 1_000_000.0 {
        format!("{}{:.0}k", sign, abs / 1_000.0)
    } else {
        format!("{}{:.1}M", sign, abs / 1_000_000.0)
    }
}

pub fn render_heatmap(frame: &mut Frame, area: Rect, title: &str, grid: &HeatmapGrid, theme: &Theme) {
    let max_abs = grid.max_abs();

    let header = Row::new(
        std::iter::once(Cell::from("Day"))
            .chain((0..HEATMAP_HOURS).map(|h| Cell::from(format!("{:02}", h))))
            .map(|c| c.style(theme.table_header)),
    );

    let rows: Vec<Row> = WEEKDAYS
        .iter()
        .enumerate()
        .map(|(day, name)| {
            Row::new(
                std::iter::once(Cell::from(*name).style(theme.label)).chain(
                    (0..HEATMAP_HOURS).map(|hour| {
                        let v = grid.get(day, hour);
                        Cell::from(compact_count(v)).style(theme.heat_style(v, max_abs))
                    }),
                ),
            )
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(4))
        .chain(std::iter::repeat(Constraint::Length(5)).take(HEATMAP_HOURS));
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(0)
        .block(panel(title, theme));

    frame.render_widget(table, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
