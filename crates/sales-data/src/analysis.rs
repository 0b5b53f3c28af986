//! Top-level pipeline: load a CSV, apply the date filter and assemble the
//! per-section reports consumed by the TUI and the JSON output.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDateTime;
use sales_core::models::{DateRange, SalesTable};
use serde::Serialize;

use crate::aggregator::{OverviewMetrics, SalesAggregator};
use crate::reader::{load_file, LoadOptions, LoadReport};
use crate::views::{run_view, View, ViewOutcome};
use sales_core::error::Result;

// ── Section ───────────────────────────────────────────────────────────────────

/// Navigation sections of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Overview,
    Products,
    Customers,
    Time,
    Download,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Overview,
        Section::Products,
        Section::Customers,
        Section::Time,
        Section::Download,
    ];

    /// Lower-case name used on the command line and in the last-used file.
    pub fn name(self) -> &'static str {
        match self {
            Section::Overview => "overview",
            Section::Products => "products",
            Section::Customers => "customers",
            Section::Time => "time",
            Section::Download => "download",
        }
    }

    pub fn from_name(name: &str) -> Option<Section> {
        Section::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Products => "Product Analysis",
            Section::Customers => "Customer Analysis",
            Section::Time => "Time Analysis",
            Section::Download => "Download",
        }
    }

    pub fn views(self) -> &'static [View] {
        match self {
            Section::Overview | Section::Download => &[],
            Section::Products => &[
                View::TopProducts,
                View::RevenueByProduct,
                View::AveragePriceByProduct,
                View::StockVsSales,
                View::PriceDistribution,
            ],
            Section::Customers => &[
                View::TopCustomers,
                View::TopCountries,
                View::QuantityDistribution,
            ],
            Section::Time => &[View::SalesTrend, View::RevenueTrend, View::SalesHeatmap],
        }
    }

    pub fn index(self) -> usize {
        Section::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn next(self) -> Section {
        Section::ALL[(self.index() + 1) % Section::ALL.len()]
    }

    pub fn previous(self) -> Section {
        let n = Section::ALL.len();
        Section::ALL[(self.index() + n - 1) % n]
    }
}

// ── Public types ──────────────────────────────────────────────────────────────

/// Inputs for [`analyze_file`].
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub load: LoadOptions,
    /// Inclusive lower bound; defaults to the earliest invoice.
    pub from: Option<NaiveDateTime>,
    /// Inclusive upper bound; defaults to the latest invoice.
    pub to: Option<NaiveDateTime>,
}

/// A loaded, filtered table ready for the presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub source: PathBuf,
    /// Rows inside [`range`](Self::range).
    pub table: SalesTable,
    pub report: LoadReport,
    /// Effective filter; `None` when the file holds no rows.
    pub range: Option<DateRange>,
    /// Full span of the unfiltered data.
    pub data_bounds: Option<DateRange>,
    pub load_time_seconds: f64,
}

/// Computed content of one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub section: Section,
    pub overview: Option<OverviewMetrics>,
    pub views: Vec<ViewOutcome>,
}

/// Every section at once, for `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: String,
    pub source: String,
    pub rows_read: usize,
    pub rows_in_range: usize,
    pub skipped_rows: usize,
    pub range: Option<DateRange>,
    pub overview: OverviewMetrics,
    pub views: Vec<ViewOutcome>,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Load `path` and restrict it to the requested date range.
///
/// Missing bounds fall back to the data's own min/max so the default view
/// covers every row.
pub fn analyze_file(path: &Path, options: &AnalysisOptions) -> Result<DashboardData> {
    let started = Instant::now();
    let loaded = load_file(path, &options.load)?;
    let load_time_seconds = started.elapsed().as_secs_f64();

    let data_bounds = loaded
        .table
        .date_bounds()
        .map(|(min, max)| DateRange::new(min, max));
    let range = resolve_range(data_bounds, options.from, options.to);

    let table = match &range {
        Some(r) => loaded.table.filter_by_date(r),
        None => loaded.table,
    };

    tracing::info!(
        path = %path.display(),
        rows_read = loaded.report.rows_read,
        rows_in_range = table.len(),
        skipped = loaded.report.skipped.len(),
        load_time_seconds,
        "analysis ready"
    );

    Ok(DashboardData {
        source: path.to_path_buf(),
        table,
        report: loaded.report,
        range,
        data_bounds,
        load_time_seconds,
    })
}

/// Run the views belonging to `section`; the overview section carries the
/// headline metrics instead.
pub fn build_section(table: &SalesTable, section: Section) -> SectionReport {
    let overview = (section == Section::Overview).then(|| SalesAggregator::overview(table));
    let views = section
        .views()
        .iter()
        .map(|view| run_view(table, *view))
        .collect();
    SectionReport {
        section,
        overview,
        views,
    }
}

/// Overview plus every view, in catalogue order.
pub fn build_report(data: &DashboardData) -> DashboardReport {
    DashboardReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        source: data.source.display().to_string(),
        rows_read: data.report.rows_read,
        rows_in_range: data.table.len(),
        skipped_rows: data.report.skipped.len(),
        range: data.range,
        overview: SalesAggregator::overview(&data.table),
        views: View::ALL
            .into_iter()
            .map(|view| run_view(&data.table, view))
            .collect(),
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

fn resolve_range(
    bounds: Option<DateRange>,
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
) -> Option<DateRange> {
    let bounds = bounds?;
    Some(DateRange::new(
        from.unwrap_or(bounds.start),
        to.unwrap_or(bounds.end),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DateParsePolicy;
    use chrono::NaiveDate;
    use sales_core::error::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CSV: &str = "\
InvoiceNo,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
536365,WHITE METAL LANTERN,6,2010-12-01 08:26:00,3.39,17850,United Kingdom
536366,HAND WARMER UNION JACK,6,2011-01-15 09:00:00,1.85,17850,United Kingdom
536367,ASSORTED COLOUR BIRD ORNAMENT,32,2011-03-31 23:59:00,1.69,13047,France
";

    fn csv_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // ── Section ───────────────────────────────────────────────────────────────

    #[test]
    fn test_section_names_round_trip() {
        for s in Section::ALL {
            assert_eq!(Section::from_name(s.name()), Some(s));
        }
        assert_eq!(Section::from_name("TIME"), Some(Section::Time));
        assert_eq!(Section::from_name("stock"), None);
    }

    #[test]
    fn test_section_navigation_wraps() {
        assert_eq!(Section::Overview.next(), Section::Products);
        assert_eq!(Section::Download.next(), Section::Overview);
        assert_eq!(Section::Overview.previous(), Section::Download);
    }

    #[test]
    fn test_every_view_belongs_to_exactly_one_section() {
        for view in View::ALL {
            let owners = Section::ALL
                .iter()
                .filter(|s| s.views().contains(&view))
                .count();
            assert_eq!(owners, 1, "{view:?}");
        }
    }

    // ── analyze_file ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_file_defaults_to_full_range() {
        let f = csv_file(CSV);
        let data = analyze_file(f.path(), &AnalysisOptions::default()).unwrap();

        assert_eq!(data.table.len(), 3);
        assert_eq!(data.report.rows_read, 3);
        let range = data.range.unwrap();
        assert_eq!(range.start, at(2010, 12, 1, 8, 26));
        assert_eq!(range.end, at(2011, 3, 31, 23, 59));
        assert_eq!(data.range, data.data_bounds);
    }

    #[test]
    fn test_analyze_file_filter_is_inclusive() {
        let f = csv_file(CSV);
        let options = AnalysisOptions {
            from: Some(at(2011, 1, 15, 9, 0)),
            to: Some(at(2011, 3, 31, 23, 59)),
            ..Default::default()
        };
        let data = analyze_file(f.path(), &options).unwrap();

        assert_eq!(data.table.len(), 2);
        assert_eq!(data.report.rows_read, 3);
        assert_eq!(data.table.records()[0].invoice_no, "536366");
    }

    #[test]
    fn test_analyze_file_range_outside_data_is_empty() {
        let f = csv_file(CSV);
        let options = AnalysisOptions {
            from: Some(at(2012, 1, 1, 0, 0)),
            ..Default::default()
        };
        let data = analyze_file(f.path(), &options).unwrap();
        assert!(data.table.is_empty());

        let products = build_section(&data.table, Section::Products);
        assert!(products.views[0].result().unwrap().is_empty());
    }

    #[test]
    fn test_analyze_file_propagates_parse_error() {
        let f = csv_file(&format!("{CSV}536368,X,1,not a date,1.0,1,UK\n"));
        let err = analyze_file(f.path(), &AnalysisOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_analyze_file_skip_policy_reports_rows() {
        let f = csv_file(&format!("{CSV}536368,X,1,not a date,1.0,1,UK\n"));
        let options = AnalysisOptions {
            load: LoadOptions {
                date_policy: DateParsePolicy::SkipRow,
            },
            ..Default::default()
        };
        let data = analyze_file(f.path(), &options).unwrap();
        assert_eq!(data.table.len(), 3);
        assert_eq!(data.report.skipped.len(), 1);
    }

    // ── build_section / build_report ──────────────────────────────────────────

    #[test]
    fn test_build_section_overview_has_metrics_only() {
        let f = csv_file(CSV);
        let data = analyze_file(f.path(), &AnalysisOptions::default()).unwrap();
        let report = build_section(&data.table, Section::Overview);

        let overview = report.overview.unwrap();
        assert_eq!(overview.total_orders, 3);
        assert_eq!(overview.unique_countries, 2);
        assert!(report.views.is_empty());
    }

    #[test]
    fn test_build_section_products_omits_stock_view() {
        let f = csv_file(CSV);
        let data = analyze_file(f.path(), &AnalysisOptions::default()).unwrap();
        let report = build_section(&data.table, Section::Products);

        assert_eq!(report.views.len(), 5);
        assert!(report.overview.is_none());
        let omitted: Vec<View> = report
            .views
            .iter()
            .filter(|o| o.result().is_none())
            .map(|o| o.view())
            .collect();
        assert_eq!(omitted, vec![View::StockVsSales]);
    }

    #[test]
    fn test_build_report_serializes_every_view() {
        let f = csv_file(CSV);
        let data = analyze_file(f.path(), &AnalysisOptions::default()).unwrap();
        let report = build_report(&data);

        assert_eq!(report.views.len(), View::ALL.len());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows_in_range"], 3);
        assert_eq!(json["views"].as_array().unwrap().len(), View::ALL.len());
        assert_eq!(json["overview"]["total_quantity"], 44);
    }
}
