use crate::themes::Theme;
use ratatui::text::{Line, Span};
use sales_core::formatting::format_count;
use sales_core::models::DateRange;
use sales_data::analysis::Section;

/// Decorative marks placed either side of the application title.
pub const SPARKLES: &str = "✦ ✧ ✦ ✧";

const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering four lines:
///
/// 1. Application title with sparkle decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Source file, active date range and row count in `[ a | b | c ]` format.
/// 4. Section tabs, the active one highlighted.
pub struct Header<'a> {
    /// File name shown in the info line.
    pub source: &'a str,
    /// Active date filter, `None` when the file holds no rows.
    pub range: Option<DateRange>,
    /// Rows inside the filter.
    pub rows: usize,
    pub section: Section,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        source: &'a str,
        range: Option<DateRange>,
        rows: usize,
        section: Section,
        theme: &'a Theme,
    ) -> Self {
        Self {
            source,
            range,
            rows,
            section,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let range = match self.range {
            Some(r) => format!(
                "{} → {}",
                r.start.format("%Y-%m-%d"),
                r.end.format("%Y-%m-%d")
            ),
            None => "no data".to_string(),
        };

        vec![
            Line::from(vec![
                Span::styled(SPARKLES, self.theme.header),
                Span::styled(" SALES DASHBOARD ", self.theme.header),
                Span::styled(SPARKLES, self.theme.header),
            ]),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.source.to_string(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(range, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} rows", format_count(self.rows as i64)), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            self.tabs_line(),
        ]
    }

    fn tabs_line(&self) -> Line<'a> {
        let mut spans = Vec::with_capacity(Section::ALL.len() * 2);
        for (i, section) in Section::ALL.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", self.theme.separator));
            }
            let style = if section == self.section {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, section.title()), style));
        }
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
