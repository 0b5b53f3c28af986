//! Group-by aggregations over a [`SalesTable`]: top-N rankings, calendar
//! month resampling, the weekday/hour heatmap and the overview metrics.
//!
//! Every function is pure; an empty table yields an empty result.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Timelike};
use sales_core::models::{SalesTable, Transaction};
use sales_core::time_utils::{month_end, month_start, next_month_start};
use serde::Serialize;

/// Number of entries kept by every ranking view.
pub const TOP_N: usize = 10;

pub const HEATMAP_DAYS: usize = 7;
pub const HEATMAP_HOURS: usize = 24;

// ── Result types ──────────────────────────────────────────────────────────────

/// One `(label, value)` pair of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub label: String,
    pub value: f64,
}

impl RankedEntry {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One calendar month of a resampled series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `"%Y-%m"` key.
    pub month: String,
    /// Last day of the month; the series is labelled by month end.
    pub month_end: NaiveDate,
    pub value: f64,
}

/// A product's sales volume next to its last recorded stock level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockEntry {
    pub label: String,
    pub quantity: f64,
    pub stock: Option<i64>,
}

/// Quantity summed by weekday (rows, Monday = 0) and hour (columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapGrid {
    pub cells: [[i64; HEATMAP_HOURS]; HEATMAP_DAYS],
}

impl Default for HeatmapGrid {
    fn default() -> Self {
        Self {
            cells: [[0; HEATMAP_HOURS]; HEATMAP_DAYS],
        }
    }
}

impl HeatmapGrid {
    pub fn get(&self, day: usize, hour: usize) -> i64 {
        self.cells[day][hour]
    }

    pub fn total(&self) -> i64 {
        self.cells.iter().flatten().sum()
    }

    /// Largest absolute cell value, used to scale colours.
    pub fn max_abs(&self) -> i64 {
        self.cells
            .iter()
            .flatten()
            .map(|v| v.abs())
            .max()
            .unwrap_or(0)
    }
}

/// Headline numbers shown on the overview section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub total_revenue: f64,
    /// Distinct invoice numbers.
    pub total_orders: usize,
    pub unique_customers: usize,
    pub unique_countries: usize,
    /// `None` for an empty table.
    pub average_unit_price: Option<f64>,
    pub total_quantity: i64,
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless helper grouping transactions for each report.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Row count per Description, 10 largest; ties keep first-seen order.
    pub fn top_products(table: &SalesTable) -> Vec<RankedEntry> {
        value_counts(table.records(), |r| r.description.as_deref())
    }

    /// Row count per Country, 10 largest; ties keep first-seen order.
    pub fn top_countries(table: &SalesTable) -> Vec<RankedEntry> {
        value_counts(table.records(), |r| r.country.as_deref())
    }

    /// Quantity summed per CustomerID, 10 largest.
    pub fn top_customers(table: &SalesTable) -> Vec<RankedEntry> {
        nlargest(group_sum(table.records(), |r| r.customer_id.as_deref(), |r| {
            r.quantity as f64
        }))
    }

    /// Revenue summed per Description, 10 largest.
    pub fn revenue_by_product(table: &SalesTable) -> Vec<RankedEntry> {
        nlargest(group_sum(table.records(), |r| r.description.as_deref(), |r| {
            r.revenue
        }))
    }

    /// Mean UnitPrice per Description, 10 largest.
    pub fn average_price_by_product(table: &SalesTable) -> Vec<RankedEntry> {
        let mut acc: HashMap<&str, (f64, u64)> = HashMap::new();
        for r in table.records() {
            if let Some(desc) = r.description.as_deref() {
                let e = acc.entry(desc).or_insert((0.0, 0));
                e.0 += r.unit_price;
                e.1 += 1;
            }
        }
        let mut groups: Vec<RankedEntry> = acc
            .into_iter()
            .map(|(label, (sum, n))| RankedEntry::new(label, sum / n as f64))
            .collect();
        groups.sort_by(|a, b| compare_group_keys(&a.label, &b.label));
        nlargest(groups)
    }

    /// Quantity summed per Description, 10 largest, with the stock level of
    /// the last row seen for each product.
    pub fn stock_vs_sales(table: &SalesTable) -> Vec<StockEntry> {
        let mut acc: HashMap<&str, (f64, Option<i64>)> = HashMap::new();
        for r in table.records() {
            if let Some(desc) = r.description.as_deref() {
                let e = acc.entry(desc).or_insert((0.0, None));
                e.0 += r.quantity as f64;
                if r.stock.is_some() {
                    e.1 = r.stock;
                }
            }
        }
        let mut entries: Vec<StockEntry> = acc
            .into_iter()
            .map(|(label, (quantity, stock))| StockEntry {
                label: label.to_string(),
                quantity,
                stock,
            })
            .collect();
        entries.sort_by(|a, b| compare_group_keys(&a.label, &b.label));
        entries.sort_by(|a, b| b.quantity.total_cmp(&a.quantity));
        entries.truncate(TOP_N);
        entries
    }

    /// Quantity summed per calendar month.
    pub fn monthly_quantity(table: &SalesTable) -> Vec<MonthlyPoint> {
        resample_monthly(table.records(), |r| r.quantity as f64)
    }

    /// Revenue summed per calendar month.
    pub fn monthly_revenue(table: &SalesTable) -> Vec<MonthlyPoint> {
        resample_monthly(table.records(), |r| r.revenue)
    }

    /// Quantity summed by weekday and hour of the invoice timestamp.
    pub fn sales_heatmap(table: &SalesTable) -> HeatmapGrid {
        let mut grid = HeatmapGrid::default();
        for r in table.records() {
            let day = r.invoice_date.weekday().num_days_from_monday() as usize;
            let hour = r.invoice_date.hour() as usize;
            grid.cells[day][hour] += r.quantity;
        }
        grid
    }

    /// Headline metrics for the overview section.
    pub fn overview(table: &SalesTable) -> OverviewMetrics {
        let records = table.records();
        let distinct = |key: fn(&Transaction) -> Option<&str>| {
            records.iter().filter_map(key).collect::<HashSet<_>>().len()
        };

        OverviewMetrics {
            total_revenue: records.iter().map(|r| r.revenue).sum(),
            total_orders: distinct(|r| Some(r.invoice_no.as_str())),
            unique_customers: distinct(|r| r.customer_id.as_deref()),
            unique_countries: distinct(|r| r.country.as_deref()),
            average_unit_price: if records.is_empty() {
                None
            } else {
                Some(records.iter().map(|r| r.unit_price).sum::<f64>() / records.len() as f64)
            },
            total_quantity: records.iter().map(|r| r.quantity).sum(),
        }
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

/// Count rows per key in first-seen order, then keep the [`TOP_N`] largest.
fn value_counts<'a>(
    records: &'a [Transaction],
    key_fn: impl Fn(&'a Transaction) -> Option<&'a str>,
) -> Vec<RankedEntry> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u64)> = Vec::new();

    for key in records.iter().filter_map(key_fn) {
        match positions.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    // `sort_by` is stable, so equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(TOP_N)
        .map(|(label, n)| RankedEntry::new(label, n as f64))
        .collect()
}

/// Sum `value_fn` per key; the groups come back in ascending key order.
fn group_sum<'a>(
    records: &'a [Transaction],
    key_fn: impl Fn(&'a Transaction) -> Option<&'a str>,
    value_fn: impl Fn(&Transaction) -> f64,
) -> Vec<RankedEntry> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for r in records {
        if let Some(key) = key_fn(r) {
            *sums.entry(key).or_insert(0.0) += value_fn(r);
        }
    }
    let mut groups: Vec<RankedEntry> = sums
        .into_iter()
        .map(|(label, value)| RankedEntry::new(label, value))
        .collect();
    groups.sort_by(|a, b| compare_group_keys(&a.label, &b.label));
    groups
}

/// Stable descending sort of key-ordered groups, keeping [`TOP_N`].
fn nlargest(mut groups: Vec<RankedEntry>) -> Vec<RankedEntry> {
    groups.sort_by(|a, b| b.value.total_cmp(&a.value));
    groups.truncate(TOP_N);
    groups
}

/// Group key order: numeric keys (customer ids) compare by value, everything
/// else lexicographically.
fn compare_group_keys(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Sum `value_fn` per calendar month, emitting every month between the first
/// and last one present (empty months are `0.0`).
fn resample_monthly(
    records: &[Transaction],
    value_fn: impl Fn(&Transaction) -> f64,
) -> Vec<MonthlyPoint> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        *sums
            .entry(month_start(r.invoice_date.date()))
            .or_insert(0.0) += value_fn(r);
    }

    let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut month = first;
    while month <= last {
        points.push(MonthlyPoint {
            month: month.format("%Y-%m").to_string(),
            month_end: month_end(month),
            value: sums.get(&month).copied().unwrap_or(0.0),
        });
        month = next_month_start(month);
    }
    points
}

// ── Tests ─────────────────────────────────────────────────────────────────────
