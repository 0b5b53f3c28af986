use crate::themes::Theme;
use ratatui::text::{Line, Span};
use sales_core::formatting::{format_currency, format_number};
use sales_data::aggregator::RankedEntry;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// How the numeric column of a bar list is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Whole numbers with thousands separators.
    Count,
    /// Dollar amounts with two decimals.
    Currency,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            ValueFormat::Count => format_number(value, 0),
            ValueFormat::Currency => format_currency(value),
        }
    }
}

/// Configuration controlling the visual appearance of a bar list.
pub struct BarListConfig {
    /// Display columns reserved for the label.
    pub label_width: usize,
    /// Display columns of the bar portion.
    pub bar_width: usize,
    pub filled_char: char,
    pub empty_char: char,
}

impl Default for BarListConfig {
    fn default() -> Self {
        Self {
            label_width: 28,
            bar_width: 30,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── BarList ───────────────────────────────────────────────────────────────────

/// Horizontal bar chart of a ranking, one line per entry:
/// `label ███████░░░ value`.
///
/// Bar length is proportional to the entry's magnitude relative to the
/// largest magnitude in the list, so negative totals (net returns) still get
/// a bar, drawn in the negative style.
pub struct BarList<'a> {
    pub entries: &'a [RankedEntry],
    pub format: ValueFormat,
    pub theme: &'a Theme,
    pub config: BarListConfig,
}

impl<'a> BarList<'a> {
    pub fn new(entries: &'a [RankedEntry], format: ValueFormat, theme: &'a Theme) -> Self {
        Self {
            entries,
            format,
            theme,
            config: BarListConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BarListConfig) -> Self {
        self.config = config;
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let max_abs = self
            .entries
            .iter()
            .map(|e| e.value.abs())
            .fold(0.0_f64, f64::max);

        self.entries
            .iter()
            .map(|entry| {
                let ratio = if max_abs > 0.0 {
                    entry.value.abs() / max_abs
                } else {
                    0.0
                };
                let filled = ((ratio * self.config.bar_width as f64).round() as usize)
                    .min(self.config.bar_width);
                let empty = self.config.bar_width - filled;

                Line::from(vec![
                    Span::styled(
                        fit_width(&entry.label, self.config.label_width),
                        self.theme.label,
                    ),
                    Span::raw(" "),
                    Span::styled(
                        std::iter::repeat(self.config.filled_char).take(filled).collect::<String>(),
                        self.theme.bar_style(entry.value),
                    ),
                    Span::styled(
                        std::iter::repeat(self.config.empty_char).take(empty).collect::<String>(),
                        self.theme.dim,
                    ),
                    Span::styled(format!(" {}", self.format.format(entry.value)), self.theme.value),
                ])
            })
            .collect()
    }
}

/// Truncate or pad `s` to exactly `width` display columns, ending truncated
/// labels with `…`.
pub fn fit_width(s: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(s);
    if current <= width {
        return format!("{}{}", s, " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
