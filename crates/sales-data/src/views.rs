//! The catalogue of dashboard views and the column checks that gate them.
//!
//! A view whose columns are absent from the loaded table is omitted with a
//! warning instead of failing the whole dashboard.

use sales_core::models::{Column, SalesTable};
use serde::Serialize;

use crate::aggregator::{HeatmapGrid, MonthlyPoint, RankedEntry, SalesAggregator, StockEntry};
use crate::distribution::{quantity_box_stats, unit_price_histogram, BoxStats, Histogram};

// ── View ──────────────────────────────────────────────────────────────────────

/// Every chart or ranking the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    TopProducts,
    TopCountries,
    SalesTrend,
    PriceDistribution,
    TopCustomers,
    RevenueByProduct,
    RevenueTrend,
    QuantityDistribution,
    StockVsSales,
    AveragePriceByProduct,
    SalesHeatmap,
}

impl View {
    pub const ALL: [View; 11] = [
        View::TopProducts,
        View::TopCountries,
        View::SalesTrend,
        View::PriceDistribution,
        View::TopCustomers,
        View::RevenueByProduct,
        View::RevenueTrend,
        View::QuantityDistribution,
        View::StockVsSales,
        View::AveragePriceByProduct,
        View::SalesHeatmap,
    ];

    pub fn title(self) -> &'static str {
        match self {
            View::TopProducts => "Top 10 Products",
            View::TopCountries => "Top 10 Countries",
            View::SalesTrend => "Sales Trend Over Time",
            View::PriceDistribution => "Unit Price Distribution",
            View::TopCustomers => "Top 10 Customers by Quantity",
            View::RevenueByProduct => "Top 10 Products by Revenue",
            View::RevenueTrend => "Revenue Trend Over Time",
            View::QuantityDistribution => "Quantity Distribution",
            View::StockVsSales => "Stock Levels vs Sales",
            View::AveragePriceByProduct => "Average Price by Product",
            View::SalesHeatmap => "Sales by Weekday and Hour",
        }
    }

    /// Columns the view reads. `Revenue` is derived from Quantity and
    /// UnitPrice, so revenue views list those two.
    pub fn requirements(self) -> &'static [Column] {
        match self {
            View::TopProducts => &[Column::Description],
            View::TopCountries => &[Column::Country],
            View::SalesTrend => &[Column::InvoiceDate, Column::Quantity],
            View::PriceDistribution => &[Column::UnitPrice],
            View::TopCustomers => &[Column::CustomerId, Column::Quantity],
            View::RevenueByProduct => &[Column::Description, Column::Quantity, Column::UnitPrice],
            View::RevenueTrend => &[Column::InvoiceDate, Column::Quantity, Column::UnitPrice],
            View::QuantityDistribution => &[Column::Quantity],
            View::StockVsSales => &[Column::Description, Column::Quantity, Column::Stock],
            View::AveragePriceByProduct => &[Column::Description, Column::UnitPrice],
            View::SalesHeatmap => &[Column::InvoiceDate, Column::Quantity],
        }
    }

    /// Required columns missing from `table`.
    pub fn missing_columns(self, table: &SalesTable) -> Vec<Column> {
        self.requirements()
            .iter()
            .copied()
            .filter(|c| !table.has_column(*c))
            .collect()
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// Computed data for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ViewResult {
    Ranking(Vec<RankedEntry>),
    Monthly(Vec<MonthlyPoint>),
    Histogram(Histogram),
    BoxStats(Option<BoxStats>),
    Stock(Vec<StockEntry>),
    Heatmap(HeatmapGrid),
}

impl ViewResult {
    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        match self {
            ViewResult::Ranking(v) => v.is_empty(),
            ViewResult::Monthly(v) => v.is_empty(),
            ViewResult::Histogram(h) => h.is_empty(),
            ViewResult::BoxStats(b) => b.is_none(),
            ViewResult::Stock(v) => v.is_empty(),
            ViewResult::Heatmap(g) => g.total() == 0 && g.max_abs() == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewOutcome {
    Ready { view: View, result: ViewResult },
    Omitted { view: View, missing: Vec<Column> },
}

impl ViewOutcome {
    pub fn view(&self) -> View {
        match self {
            ViewOutcome::Ready { view, .. } | ViewOutcome::Omitted { view, .. } => *view,
        }
    }

    pub fn result(&self) -> Option<&ViewResult> {
        match self {
            ViewOutcome::Ready { result, .. } => Some(result),
            ViewOutcome::Omitted { .. } => None,
        }
    }
}

/// Compute `view` over `table`, or report which columns it lacks.
pub fn run_view(table: &SalesTable, view: View) -> ViewOutcome {
    let missing = view.missing_columns(table);
    if !missing.is_empty() {
        tracing::warn!(view = ?view, missing = ?missing, "view omitted: required columns absent");
        return ViewOutcome::Omitted { view, missing };
    }

    let result = match view {
        View::TopProducts => ViewResult::Ranking(SalesAggregator::top_products(table)),
        View::TopCountries => ViewResult::Ranking(SalesAggregator::top_countries(table)),
        View::SalesTrend => ViewResult::Monthly(SalesAggregator::monthly_quantity(table)),
        View::PriceDistribution => ViewResult::Histogram(unit_price_histogram(table)),
        View::TopCustomers => ViewResult::Ranking(SalesAggregator::top_customers(table)),
        View::RevenueByProduct => ViewResult::Ranking(SalesAggregator::revenue_by_product(table)),
        View::RevenueTrend => ViewResult::Monthly(SalesAggregator::monthly_revenue(table)),
        View::QuantityDistribution => ViewResult::BoxStats(quantity_box_stats(table)),
        View::StockVsSales => ViewResult::Stock(SalesAggregator::stock_vs_sales(table)),
        View::AveragePriceByProduct => {
            ViewResult::Ranking(SalesAggregator::average_price_by_product(table))
        }
        View::SalesHeatmap => ViewResult::Heatmap(SalesAggregator::sales_heatmap(table)),
    };
    tracing::debug!(view = ?view, rows = table.len(), "view computed");
    ViewOutcome::Ready { view, result }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
