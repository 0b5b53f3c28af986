//! Tabular views for the sales dashboard.
//!
//! Renders bordered [`ratatui::widgets::Table`]s with a highlighted totals
//! row at the bottom: stock levels next to sales volume, and a preview of the
//! filtered rows that an export would contain.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use sales_core::formatting;
use sales_core::models::{Column, ColumnSlot, SalesTable, Transaction};
use sales_data::aggregator::StockEntry;

use crate::components::bar_list::fit_width;
use crate::themes::Theme;

/// Rows shown by [`render_preview_table`].
pub const PREVIEW_ROWS: usize = 15;

const PREVIEW_COLUMN_WIDTH: usize = 14;

fn alternating(theme: &Theme, i: usize) -> ratatui::style::Style {
    if i % 2 == 0 {
        theme.table_row
    } else {
        theme.table_row_alt
    }
}

/// Render products by sales volume next to their last known stock level.
pub fn render_stock_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[StockEntry],
    theme: &Theme,
) {
    let header = Row::new(
        ["Product", "Units Sold", "Stock"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    )
    .height(1);

    let mut rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Row::new(vec![
                Cell::from(e.label.clone()),
                Cell::from(formatting::format_number(e.quantity, 0)),
                Cell::from(
                    e.stock
                        .map(formatting::format_count)
                        .unwrap_or_else(|| "—".to_string()),
                ),
            ])
            .style(alternating(theme, i))
        })
        .collect();

    let total_units: f64 = entries.iter().map(|e| e.quantity).sum();
    let total_stock: i64 = entries.iter().filter_map(|e| e.stock).sum();
    rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(formatting::format_number(total_units, 0)),
            Cell::from(formatting::format_count(total_stock)),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render the first [`PREVIEW_ROWS`] rows of `table` with the source columns
/// plus `Revenue`, and a totals row covering the whole table.
pub fn render_preview_table(frame: &mut Frame, area: Rect, table: &SalesTable, theme: &Theme) {
    let headers: Vec<Cell> = table
        .headers()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once("Revenue"))
        .map(|h| Cell::from(fit_width(h, PREVIEW_COLUMN_WIDTH)).style(theme.table_header))
        .collect();
    let column_count = headers.len();

    let mut rows: Vec<Row> = table
        .records()
        .iter()
        .take(PREVIEW_ROWS)
        .enumerate()
        .map(|(i, record)| {
            Row::new(
                preview_cells(table, record)
                    .into_iter()
                    .map(|c| Cell::from(fit_width(&c, PREVIEW_COLUMN_WIDTH))),
            )
            .style(alternating(theme, i))
        })
        .collect();

    let revenue: f64 = table.records().iter().map(|r| r.revenue).sum();
    let mut totals = vec![String::new(); column_count];
    totals[0] = "TOTAL".to_string();
    if column_count >= 3 {
        totals[column_count - 2] = format!("{} rows", formatting::format_count(table.len() as i64));
    }
    totals[column_count - 1] = formatting::format_currency(revenue);
    let total_cells: Vec<Cell> = totals.into_iter().map(Cell::from).collect();
    rows.push(Row::new(total_cells).style(theme.table_total));

    let widths = vec![Constraint::Length(PREVIEW_COLUMN_WIDTH as u16); column_count];
    let widget = Table::new(rows, widths)
        .header(Row::new(headers).height(1))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(" Filtered Data Preview "),
        )
        .style(theme.text);

    frame.render_widget(widget, area);
}

/// Display strings for one record, in the table's header order plus revenue.
pub fn preview_cells(table: &SalesTable, record: &Transaction) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let mut cells: Vec<String> = table
        .layout()
        .iter()
        .map(|slot| match slot {
            ColumnSlot::Known(Column::InvoiceNo) => record.invoice_no.clone(),
            ColumnSlot::Known(Column::Description) => opt(&record.description),
            ColumnSlot::Known(Column::Quantity) => record.quantity.to_string(),
            ColumnSlot::Known(Column::UnitPrice) => formatting::format_number(record.unit_price, 2),
            ColumnSlot::Known(Column::InvoiceDate) => {
                record.invoice_date.format("%Y-%m-%d %H:%M").to_string()
            }
            ColumnSlot::Known(Column::CustomerId) => opt(&record.customer_id),
            ColumnSlot::Known(Column::Country) => opt(&record.country),
            ColumnSlot::Known(Column::Stock) => {
                record.stock.map(|s| s.to_string()).unwrap_or_default()
            }
            ColumnSlot::Extra(i) => record.extras.get(*i).cloned().unwrap_or_default(),
        })
        .collect();
    cells.push(formatting::format_currency(record.revenue));
    cells
}

/// Render a placeholder when there is nothing to show.
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Widen the date range with --from / --to.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Sales Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    fn buffer_text(buffer: &Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn tx(invoice: &str, qty: i64, price: f64) -> Transaction {
        Transaction::new(
            invoice.to_string(),
            Some("WHITE METAL LANTERN".to_string()),
            qty,
            price,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
                .unwrap(),
            Some("17850".to_string()),
            Some("United Kingdom".to_string()),
        )
    }

    fn stock_entries() -> Vec<StockEntry> {
        vec![
            StockEntry {
                label: "WHITE METAL LANTERN".to_string(),
                quantity: 1_200.0,
                stock: Some(40),
            },
            StockEntry {
                label: "HAND WARMER UNION JACK".to_string(),
                quantity: 800.0,
                stock: None,
            },
        ]
    }

    // ── preview_cells ─────────────────────────────────────────────────────────

    #[test]
    fn test_preview_cells_follow_header_order() {
        let table = SalesTable::from_records(vec![tx("536365", 6, 3.39)]);
        let cells = preview_cells(&table, &table.records()[0]);

        assert_eq!(cells.len(), table.headers().len() + 1);
        assert_eq!(cells[0], "536365");
        assert_eq!(cells[2], "6");
        assert_eq!(cells[3], "3.39");
        assert_eq!(cells[4], "2010-12-01 08:26");
        assert_eq!(cells.last().unwrap(), "$20.34");
    }

    #[test]
    fn test_preview_cells_blank_optional_values() {
        let mut record = tx("536365", 1, 1.0);
        record.customer_id = None;
        let table = SalesTable::from_records(vec![record]);
        let cells = preview_cells(&table, &table.records()[0]);
        assert_eq!(cells[5], "");
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_stock_table_shows_totals() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let theme = Theme::dark();
        let entries = stock_entries();

        terminal
            .draw(|frame| {
                render_stock_table(frame, frame.area(), "Stock Levels vs Sales", &entries, &theme)
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Stock Levels vs Sales"));
        assert!(text.contains("WHITE METAL LANTERN"));
        assert!(text.contains("2,000"));
        assert!(text.contains("TOTAL"));
    }

    #[test]
    fn test_render_stock_table_empty_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        let theme = Theme::light();
        terminal
            .draw(|frame| render_stock_table(frame, frame.area(), "Stock", &[], &theme))
            .unwrap();
    }

    #[test]
    fn test_render_preview_table_limits_rows() {
        let records = (0..40).map(|i| tx(&format!("INV{i:03}"), 1, 2.0)).collect();
        let table = SalesTable::from_records(records);
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| render_preview_table(frame, frame.area(), &table, &theme))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("INV000"));
        assert!(text.contains(&format!("INV{:03}", PREVIEW_ROWS - 1)));
        assert!(!text.contains(&format!("INV{:03}", PREVIEW_ROWS)));
        assert!(text.contains("40 rows"));
        assert!(text.contains("$80.00"));
    }

    #[test]
    fn test_render_preview_table_empty_table() {
        let table = SalesTable::from_records(Vec::new());
        let mut terminal = Terminal::new(TestBackend::new(140, 10)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| render_preview_table(frame, frame.area(), &table, &theme))
            .unwrap();

        assert!(buffer_text(terminal.backend().buffer()).contains("0 rows"));
    }

    #[test]
    fn test_render_no_data_shows_message() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| render_no_data(frame, frame.area(), "No sales in range", &theme))
            .unwrap();

        assert!(buffer_text(terminal.backend().buffer()).contains("No sales in range"));
    }
}
