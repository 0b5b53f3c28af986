use crate::themes::Theme;
use ratatui::text::{Line, Span};
use sales_core::formatting::{format_count, format_currency};
use sales_data::aggregator::OverviewMetrics;

/// A single `label: value` headline figure.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCard {
    pub icon: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl MetricCard {
    pub fn to_line<'a>(&self, theme: &Theme) -> Line<'a> {
        Line::from(vec![
            Span::raw(format!("{} ", self.icon)),
            Span::styled(format!("{:<20}", format!("{}:", self.label)), theme.label),
            Span::styled(self.value.clone(), theme.value),
        ])
    }
}

/// Cards for the overview section, in display order.
pub fn overview_cards(metrics: &OverviewMetrics) -> Vec<MetricCard> {
    vec![
        MetricCard {
            icon: "💰",
            label: "Total Revenue",
            value: format_currency(metrics.total_revenue),
        },
        MetricCard {
            icon: "🧾",
            label: "Total Orders",
            value: format_count(metrics.total_orders as i64),
        },
        MetricCard {
            icon: "👥",
            label: "Unique Customers",
            value: format_count(metrics.unique_customers as i64),
        },
        MetricCard {
            icon: "🌍",
            label: "Countries",
            value: format_count(metrics.unique_countries as i64),
        },
        MetricCard {
            icon: "🏷",
            label: "Average Unit Price",
            value: metrics
                .average_unit_price
                .map(format_currency)
                .unwrap_or_else(|| "—".to_string()),
        },
        MetricCard {
            icon: "📦",
            label: "Units Sold",
            value: format_count(metrics.total_quantity),
        },
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
