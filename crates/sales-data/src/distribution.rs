//! Distribution summaries: the unit price histogram and the quantity box plot.
//!
//! Both views clip to percentile bounds so a handful of outliers (bulk
//! returns, manual price adjustments) don't flatten the rest of the data.

use sales_core::models::SalesTable;
use sales_core::percentile::{percentile, sorted_finite, PercentileBounds};
use serde::Serialize;

pub const HISTOGRAM_BINS: usize = 50;
/// Upper clip for the unit price histogram.
pub const PRICE_UPPER_PERCENTILE: f64 = 99.0;
/// Clip range for the quantity box plot.
pub const QUANTITY_LOWER_PERCENTILE: f64 = 1.0;
pub const QUANTITY_UPPER_PERCENTILE: f64 = 99.0;

// ── Histogram ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Equal-width histogram over `[lower, upper]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub lower: f64,
    pub upper: f64,
    pub bins: Vec<HistogramBin>,
    /// Values left out for lying above `upper`.
    pub excluded: usize,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// 50-bin histogram of UnitPrice between the column minimum and its 99th
/// percentile. Values above the percentile are excluded, not folded into the
/// last bin.
pub fn unit_price_histogram(table: &SalesTable) -> Histogram {
    let sorted = sorted_finite(table.records().iter().map(|r| r.unit_price));
    let Some(upper) = percentile(&sorted, PRICE_UPPER_PERCENTILE) else {
        return Histogram::default();
    };
    let lower = sorted[0];
    histogram(&sorted, lower, upper, HISTOGRAM_BINS)
}

/// Bin `sorted` into `bins` equal-width buckets over `[lower, upper]`.
///
/// Every bucket is half-open except the last, which includes `upper`. A
/// zero-width range is widened by half a unit on each side.
fn histogram(sorted: &[f64], lower: f64, upper: f64, bins: usize) -> Histogram {
    let (lo, hi) = if upper > lower {
        (lower, upper)
    } else {
        (lower - 0.5, upper + 0.5)
    };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    let mut excluded = 0;
    for &v in sorted {
        if v < lo || v > hi {
            excluded += 1;
            continue;
        }
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    Histogram {
        lower: lo,
        upper: hi,
        bins: out,
        excluded,
    }
}

// ── Box statistics ────────────────────────────────────────────────────────────

/// Five-number summary of Quantity plus Tukey whiskers, every value clamped
/// to the `[p1, p99]` display range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub max: f64,
    /// Display range the other fields are clamped to.
    pub clip_lower: f64,
    pub clip_upper: f64,
    /// Rows summarised.
    pub count: usize,
}

/// Box plot statistics for Quantity; `None` for an empty table.
pub fn quantity_box_stats(table: &SalesTable) -> Option<BoxStats> {
    let sorted = sorted_finite(table.records().iter().map(|r| r.quantity as f64));
    let bounds = PercentileBounds::of(
        &sorted,
        QUANTITY_LOWER_PERCENTILE,
        QUANTITY_UPPER_PERCENTILE,
    )?;

    let q1 = percentile(&sorted, 25.0)?;
    let median = percentile(&sorted, 50.0)?;
    let q3 = percentile(&sorted, 75.0)?;
    let iqr = q3 - q1;

    // Whiskers reach the most extreme observations within 1.5 IQR, and never
    // start inside the box.
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;
    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= lower_fence)
        .map_or(q1, |v| v.min(q1));
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= upper_fence)
        .map_or(q3, |v| v.max(q3));

    Some(BoxStats {
        min: bounds.clamp(sorted[0]),
        lower_whisker: bounds.clamp(lower_whisker),
        q1: bounds.clamp(q1),
        median: bounds.clamp(median),
        q3: bounds.clamp(q3),
        upper_whisker: bounds.clamp(upper_whisker),
        max: bounds.clamp(sorted[sorted.len() - 1]),
        clip_lower: bounds.lower,
        clip_upper: bounds.upper,
        count: sorted.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sales_core::models::Transaction;

    fn tx(quantity: i64, unit_price: f64) -> Transaction {
        Transaction::new(
            "536365".to_string(),
            Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
            quantity,
            unit_price,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
                .unwrap(),
            Some("17850".to_string()),
            Some("United Kingdom".to_string()),
        )
    }

    fn table_with_prices(prices: &[f64]) -> SalesTable {
        SalesTable::from_records(prices.iter().map(|&p| tx(1, p)).collect())
    }

    fn table_with_quantities(quantities: impl IntoIterator<Item = i64>) -> SalesTable {
        SalesTable::from_records(quantities.into_iter().map(|q| tx(q, 1.0)).collect())
    }

    // ── histogram ─────────────────────────────────────────────────────────────

    #[test]
    fn test_histogram_has_fifty_bins_spanning_min_to_p99() {
        let prices: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let h = unit_price_histogram(&table_with_prices(&prices));

        assert_eq!(h.bins.len(), HISTOGRAM_BINS);
        assert_eq!(h.lower, 1.0);
        assert!((h.upper - 99.01).abs() < 1e-9);
        assert_eq!(h.bins[0].start, h.lower);
        assert_eq!(h.bins[HISTOGRAM_BINS - 1].end, h.upper);
    }

    #[test]
    fn test_histogram_excludes_values_above_p99() {
        let prices: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let h = unit_price_histogram(&table_with_prices(&prices));

        // Only 100.0 lies above 99.01.
        assert_eq!(h.excluded, 1);
        assert_eq!(h.total(), 99);
    }

    #[test]
    fn test_histogram_outlier_does_not_stretch_range() {
        let mut prices = vec![2.0; 200];
        prices.push(38_970.0);
        let h = unit_price_histogram(&table_with_prices(&prices));

        assert!(h.upper < 38_970.0);
        assert_eq!(h.excluded, 1);
        assert_eq!(h.total(), 200);
    }

    #[test]
    fn test_histogram_constant_prices_widen_range() {
        let h = unit_price_histogram(&table_with_prices(&[2.5, 2.5, 2.5]));
        assert_eq!(h.lower, 2.0);
        assert_eq!(h.upper, 3.0);
        assert_eq!(h.total(), 3);
        assert_eq!(h.excluded, 0);
    }

    #[test]
    fn test_histogram_bins_are_contiguous() {
        let h = unit_price_histogram(&table_with_prices(&[0.5, 1.0, 4.25, 7.0, 12.0]));
        assert!(h.bins.windows(2).all(|w| (w[0].end - w[1].start).abs() < 1e-9));
    }

    #[test]
    fn test_histogram_empty_table() {
        let h = unit_price_histogram(&SalesTable::default());
        assert!(h.is_empty());
        assert_eq!(h.max_count(), 0);
    }

    // ── box stats ─────────────────────────────────────────────────────────────

    #[test]
    fn test_box_stats_within_clip_bounds() {
        let mut quantities: Vec<i64> = (1..=98).collect();
        quantities.push(80_995);
        quantities.push(-80_995);
        let stats = quantity_box_stats(&table_with_quantities(quantities)).unwrap();

        for v in [
            stats.min,
            stats.lower_whisker,
            stats.q1,
            stats.median,
            stats.q3,
            stats.upper_whisker,
            stats.max,
        ] {
            assert!(v >= stats.clip_lower && v <= stats.clip_upper, "{v} out of range");
        }
        assert!(stats.clip_upper < 80_995.0);
        assert!(stats.clip_lower > -80_995.0);
        assert_eq!(stats.count, 100);
    }

    #[test]
    fn test_box_stats_quartiles() {
        let stats = quantity_box_stats(&table_with_quantities(1..=5)).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert!(stats.min <= stats.q1 && stats.q3 <= stats.max);
    }

    #[test]
    fn test_box_stats_whiskers_bracket_the_box() {
        // q1 interpolates to 7.5 while the lowest point inside the fence is 10.
        let stats = quantity_box_stats(&table_with_quantities([0, 10, 10, 10])).unwrap();
        assert!(stats.lower_whisker <= stats.q1);
        assert!(stats.q3 <= stats.upper_whisker);
    }

    #[test]
    fn test_box_stats_empty_is_none() {
        assert!(quantity_box_stats(&SalesTable::default()).is_none());
    }
}
