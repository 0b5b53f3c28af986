//! Main application state and TUI event loop for the sales dashboard.
//!
//! [`App`] owns the theme, the loaded data, the active [`Section`] and the
//! report computed for it. Switching section recomputes that report from the
//! in-memory table; nothing else is cached.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use sales_core::formatting::format_count;
use sales_data::analysis::{build_section, DashboardData, Section, SectionReport};
use sales_data::export::{export_to_path, EXCEL_MIME};

use crate::chart_view;
use crate::components::header::Header;
use crate::components::metric_card::overview_cards;
use crate::table_view;
use crate::themes::Theme;

// ── StatusMessage ─────────────────────────────────────────────────────────────

/// One-line feedback shown in the footer after an action.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub section: Section,
    pub data: DashboardData,
    /// Report for [`section`](Self::section), rebuilt on every switch.
    pub report: SectionReport,
    /// Where the `e` key writes the workbook.
    pub export_path: PathBuf,
    pub status: Option<StatusMessage>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, section: Section, data: DashboardData, export_path: PathBuf) -> Self {
        let report = build_section(&data.table, section);
        Self {
            theme: Theme::from_name(theme_name),
            section,
            data,
            report,
            export_path,
            status: None,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q` / `Ctrl+C`.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── State transitions ─────────────────────────────────────────────────────

    /// Apply a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Right | KeyCode::Tab => self.set_section(self.section.next()),
            KeyCode::Left | KeyCode::BackTab => self.set_section(self.section.previous()),
            KeyCode::Char(c @ '1'..='5') => {
                let idx = c as usize - '1' as usize;
                self.set_section(Section::ALL[idx]);
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            _ => {}
        }
    }

    pub fn set_section(&mut self, section: Section) {
        if section == self.section {
            return;
        }
        tracing::debug!(from = ?self.section, to = ?section, "switching section");
        self.section = section;
        self.report = build_section(&self.data.table, section);
        self.status = None;
    }

    /// Write the filtered table to [`export_path`](Self::export_path).
    /// Only available from the Download section.
    pub fn export(&mut self) {
        if self.section != Section::Download {
            self.status = Some(StatusMessage::info("Open Download (5) to export"));
            return;
        }
        self.status = Some(match export_to_path(&self.data.table, &self.export_path) {
            Ok(()) => StatusMessage::info(format!(
                "Saved {} rows to {}",
                format_count(self.data.table.len() as i64),
                self.export_path.display()
            )),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                StatusMessage::error(e.to_string())
            }
        });
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let source = self
            .data
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.data.source.display().to_string());
        let header = Header::new(
            &source,
            self.data.range,
            self.data.table.len(),
            self.section,
            &self.theme,
        );
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        match self.section {
            Section::Overview => self.render_overview(frame, body_area),
            Section::Download => self.render_download(frame, body_area),
            Section::Products | Section::Customers | Section::Time => {
                if self.data.table.is_empty() {
                    table_view::render_no_data(
                        frame,
                        body_area,
                        chart_view::NO_DATA_IN_RANGE,
                        &self.theme,
                    );
                } else {
                    self.render_views(frame, body_area);
                }
            }
        }

        frame.render_widget(Paragraph::new(self.footer_line()), footer_area);
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let [cards_area, summary_area] =
            Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(area);

        let cards: Vec<Line> = match &self.report.overview {
            Some(metrics) => overview_cards(metrics)
                .iter()
                .map(|c| c.to_line(&self.theme))
                .collect(),
            None => Vec::new(),
        };
        frame.render_widget(
            Paragraph::new(Text::from(cards)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.table_border)
                    .title(" Key Metrics "),
            ),
            cards_area,
        );

        let report = &self.data.report;
        let mut summary = vec![
            self.summary_line("Rows read", format_count(report.rows_read as i64)),
            self.summary_line("Rows in range", format_count(self.data.table.len() as i64)),
            self.summary_line("Rows skipped", format_count(report.skipped.len() as i64)),
        ];
        if let Some(bounds) = self.data.data_bounds {
            summary.push(self.summary_line(
                "Data covers",
                format!(
                    "{} → {}",
                    bounds.start.format("%Y-%m-%d"),
                    bounds.end.format("%Y-%m-%d")
                ),
            ));
        }
        summary.push(self.summary_line(
            "Load time",
            format!("{:.2}s", self.data.load_time_seconds),
        ));
        frame.render_widget(
            Paragraph::new(Text::from(summary)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.table_border)
                    .title(" Data "),
            ),
            summary_area,
        );
    }

    fn render_views(&self, frame: &mut Frame, area: Rect) {
        for (outcome, panel) in self.report.views.iter().zip(view_grid(area, self.report.views.len())) {
            chart_view::render_outcome(frame, panel, outcome, &self.theme);
        }
    }

    fn render_download(&self, frame: &mut Frame, area: Rect) {
        let [info_area, preview_area] =
            Layout::vertical([Constraint::Length(6), Constraint::Min(0)]).areas(area);

        let info = vec![
            self.summary_line("Target", self.export_path.display().to_string()),
            self.summary_line("Format", format!("Excel workbook ({})", EXCEL_MIME)),
            self.summary_line("Rows", format_count(self.data.table.len() as i64)),
            Line::from(Span::styled(
                "Press 'e' to export the filtered data",
                self.theme.info,
            )),
        ];
        frame.render_widget(
            Paragraph::new(Text::from(info)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.table_border)
                    .title(" Download Report "),
            ),
            info_area,
        );
        table_view::render_preview_table(frame, preview_area, &self.data.table, &self.theme);
    }

    fn summary_line<'a>(&self, label: &str, value: String) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{:<16}", format!("{}:", label)), self.theme.label),
            Span::styled(value, self.theme.value),
        ])
    }

    fn footer_line(&self) -> Line<'static> {
        match &self.status {
            Some(status) => Line::from(Span::styled(
                status.text.clone(),
                if status.is_error {
                    self.theme.error
                } else {
                    self.theme.success
                },
            )),
            None => Line::from(Span::styled(
                "←/→ Tab switch section · 1-5 jump · e export · q quit",
                self.theme.dim,
            )),
        }
    }
}

/// Split `area` into panels for `count` views: rows of two, with an odd
/// last view spanning the full width.
pub fn view_grid(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let row_count = count.div_ceil(2);
    let rows = Layout::vertical(vec![Constraint::Ratio(1, row_count as u32); row_count]).split(area);

    let mut panels = Vec::with_capacity(count);
    for (i, row) in rows.iter().enumerate() {
        let remaining = count - i * 2;
        if remaining >= 2 {
            let cols =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(*row);
            panels.extend(cols.iter().copied());
        } else {
            panels.push(*row);
        }
    }
    panels
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use sales_data::analysis::{analyze_file, AnalysisOptions};
    use sales_data::views::View;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const CSV: &str = "\
InvoiceNo,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
536365,WHITE METAL LANTERN,6,2010-12-01 08:26:00,3.39,17850,United Kingdom
536366,HAND WARMER UNION JACK,6,2011-01-15 09:00:00,1.85,17850,United Kingdom
536367,ASSORTED COLOUR BIRD ORNAMENT,32,2011-03-31 23:59:00,1.69,13047,France
";

    fn load_data() -> DashboardData {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(CSV.as_bytes()).unwrap();
        analyze_file(f.path(), &AnalysisOptions::default()).unwrap()
    }

    fn make_app(section: Section, export_path: PathBuf) -> App {
        App::new("dark", section, load_data(), export_path)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn render_text(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── App::new ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        assert_eq!(app.section, Section::Overview);
        assert!(app.report.overview.is_some());
        assert!(!app.should_quit);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_app_creation_builds_initial_section() {
        let app = make_app(Section::Time, PathBuf::from("out.xlsx"));
        let views: Vec<View> = app.report.views.iter().map(|o| o.view()).collect();
        assert_eq!(views, Section::Time.views());
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        let mut app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_plain_c_does_not_quit() {
        let mut app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_arrow_and_tab_navigation() {
        let mut app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.section, Section::Products);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.section, Section::Customers);
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.section, Section::Download);
    }

    #[test]
    fn test_number_keys_jump_and_rebuild_report() {
        let mut app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.section, Section::Customers);
        assert_eq!(app.report.section, Section::Customers);
        assert_eq!(app.report.views.len(), Section::Customers.views().len());
        assert!(app.report.overview.is_none());
    }

    #[test]
    fn test_export_outside_download_only_hints() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let mut app = make_app(Section::Products, path.clone());

        app.handle_key(key(KeyCode::Char('e')));

        assert!(!path.exists());
        let status = app.status.unwrap();
        assert!(!status.is_error);
        assert!(status.text.contains("Download"));
    }

    #[test]
    fn test_export_from_download_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        let mut app = make_app(Section::Download, path.clone());

        app.handle_key(key(KeyCode::Char('e')));

        assert!(path.exists());
        let status = app.status.as_ref().unwrap();
        assert!(!status.is_error);
        assert!(status.text.contains("Saved 3 rows"));
    }

    #[test]
    fn test_export_failure_reports_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.xlsx");
        let mut app = make_app(Section::Download, path);

        app.export();

        assert!(app.status.unwrap().is_error);
    }

    #[test]
    fn test_switching_section_clears_status() {
        let mut app = make_app(Section::Products, PathBuf::from("out.xlsx"));
        app.export();
        assert!(app.status.is_some());
        app.handle_key(key(KeyCode::Right));
        assert!(app.status.is_none());
    }

    // ── view_grid ─────────────────────────────────────────────────────────────

    #[test]
    fn test_view_grid_pairs_and_full_width_tail() {
        let area = Rect::new(0, 0, 100, 30);
        let panels = view_grid(area, 3);

        assert_eq!(panels.len(), 3);
        assert_eq!(panels[0].width, 50);
        assert_eq!(panels[1].x, 50);
        assert_eq!(panels[2].width, 100);
        assert!(view_grid(area, 0).is_empty());
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_overview() {
        let app = make_app(Section::Overview, PathBuf::from("out.xlsx"));
        let text = render_text(&app, 120, 30);
        assert!(text.contains("SALES DASHBOARD"));
        assert!(text.contains("Total Revenue"));
        assert!(text.contains("Rows in range"));
    }

    #[test]
    fn test_render_products_shows_stock_warning() {
        let app = make_app(Section::Products, PathBuf::from("out.xlsx"));
        let text = render_text(&app, 160, 50);
        assert!(text.contains("Top 10 Products"));
        assert!(text.contains(chart_view::STOCK_UNAVAILABLE));
    }

    #[test]
    fn test_render_time_and_customers_do_not_panic() {
        let mut app = make_app(Section::Time, PathBuf::from("out.xlsx"));
        render_text(&app, 160, 50);
        app.set_section(Section::Customers);
        render_text(&app, 160, 50);
    }

    #[test]
    fn test_render_download_shows_target() {
        let app = make_app(Section::Download, PathBuf::from("sales_report.xlsx"));
        let text = render_text(&app, 140, 40);
        assert!(text.contains("sales_report.xlsx"));
        assert!(text.contains("Press 'e' to export"));
    }

    #[test]
    fn test_render_small_terminal_does_not_panic() {
        let app = make_app(Section::Time, PathBuf::from("out.xlsx"));
        render_text(&app, 20, 6);
    }
}
