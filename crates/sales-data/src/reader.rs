//! CSV ingestion for uploaded transaction files.
//!
//! Decodes latin-1 bytes, resolves columns by header name, parses every row
//! into a [`Transaction`] (deriving revenue on the way) and returns an
//! immutable [`SalesTable`].

use std::collections::HashMap;
use std::path::Path;

use csv::ByteRecord;
use sales_core::error::{DashboardError, Result};
use sales_core::models::{Column, ColumnSlot, SalesTable, Transaction};
use sales_core::time_utils::parse_invoice_date;
use serde::Serialize;
use tracing::{debug, warn};

// ── Options & report ──────────────────────────────────────────────────────────

/// What to do with a row whose `InvoiceDate` cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateParsePolicy {
    /// Fail the whole load on the first bad date.
    #[default]
    Strict,
    /// Drop the row and record it in [`LoadReport::skipped`].
    SkipRow,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub date_policy: DateParsePolicy,
}

/// A row left out of the table: an unparseable date under
/// [`DateParsePolicy::SkipRow`], or an empty Quantity / UnitPrice cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line number in the source file.
    pub line: u64,
    /// Column that could not be read.
    pub column: Column,
    pub value: String,
}

/// Row counts gathered while loading.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: SalesTable,
    pub report: LoadReport,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read `path` from disk and load it with [`load`].
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<LoadedTable> {
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    load(&bytes, options)
}

/// Parse raw latin-1 CSV bytes into a derived [`SalesTable`].
///
/// Errors:
/// * [`DashboardError::EmptyInput`] – no bytes or no header row.
/// * [`DashboardError::MissingColumn`] – a required header is absent.
/// * [`DashboardError::DateParse`] – bad `InvoiceDate` under the strict policy.
/// * [`DashboardError::FieldParse`] – non-empty `Quantity`, `UnitPrice` or
///   `Stock` that is not a number. Rows with an empty `Quantity` or
///   `UnitPrice` are skipped and listed in [`LoadReport::skipped`].
/// * [`DashboardError::Csv`] – the CSV structure itself is malformed.
pub fn load(raw: &[u8], options: &LoadOptions) -> Result<LoadedTable> {
    if raw.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(DashboardError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(raw);

    let header_record = reader.byte_headers()?.clone();
    if header_record.is_empty() {
        return Err(DashboardError::EmptyInput);
    }

    let headers: Vec<String> = header_record
        .iter()
        .map(|h| normalize_header_name(&decode_latin1(h)).to_string())
        .collect();
    let schema = Schema::resolve(&headers)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for result in reader.byte_records() {
        let record = result?;
        report.rows_read += 1;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(report.rows_read as u64 + 1);

        match schema.parse_row(&record, line) {
            Ok(ParsedRow::Record(tx)) => records.push(tx),
            Ok(ParsedRow::MissingValue(column)) => {
                warn!("Skipping line {}: empty {}", line, column.header());
                report.skipped.push(SkippedRow {
                    line,
                    column,
                    value: String::new(),
                });
            }
            Err(DashboardError::DateParse { line, value })
                if options.date_policy == DateParsePolicy::SkipRow =>
            {
                warn!("Skipping line {}: unparseable InvoiceDate {:?}", line, value);
                report.skipped.push(SkippedRow {
                    line,
                    column: Column::InvoiceDate,
                    value,
                });
            }
            Err(e) => return Err(e),
        }
    }

    report.rows_kept = records.len();
    debug!(
        "Loaded {} rows ({} read, {} skipped, {} columns)",
        report.rows_kept,
        report.rows_read,
        report.skipped.len(),
        headers.len()
    );

    Ok(LoadedTable {
        table: SalesTable::new(headers, schema.layout, records),
        report,
    })
}

/// Decode ISO-8859-1 bytes: every byte maps to the code point of equal value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

// ── Schema resolution ─────────────────────────────────────────────────────────

enum ParsedRow {
    Record(Transaction),
    /// A numeric cell the row cannot do without was empty.
    MissingValue(Column),
}

/// Column positions resolved from the header row.
struct Schema {
    index: HashMap<Column, usize>,
    layout: Vec<ColumnSlot>,
    extra_positions: Vec<usize>,
}

impl Schema {
    fn resolve(headers: &[String]) -> Result<Self> {
        let mut index = HashMap::new();
        let mut layout = Vec::with_capacity(headers.len());
        let mut extra_positions = Vec::new();

        for (pos, name) in headers.iter().enumerate() {
            match Column::from_header(name) {
                // First occurrence wins; duplicates are carried as extras.
                Some(col) if !index.contains_key(&col) => {
                    index.insert(col, pos);
                    layout.push(ColumnSlot::Known(col));
                }
                _ => {
                    layout.push(ColumnSlot::Extra(extra_positions.len()));
                    extra_positions.push(pos);
                }
            }
        }

        if let Some(missing) = Column::REQUIRED.iter().find(|c| !index.contains_key(*c)) {
            return Err(DashboardError::MissingColumn(missing.header().to_string()));
        }

        Ok(Self {
            index,
            layout,
            extra_positions,
        })
    }

    fn field(&self, record: &ByteRecord, column: Column) -> String {
        self.index
            .get(&column)
            .and_then(|&pos| record.get(pos))
            .map(decode_latin1)
            .unwrap_or_default()
    }

    fn parse_row(&self, record: &ByteRecord, line: u64) -> Result<ParsedRow> {
        let raw_date = self.field(record, Column::InvoiceDate);
        let invoice_date = match parse_invoice_date(&raw_date) {
            Some(ts) => ts,
            None => {
                return Err(DashboardError::DateParse {
                    line,
                    value: raw_date,
                })
            }
        };

        let raw_qty = self.field(record, Column::Quantity);
        if raw_qty.trim().is_empty() {
            return Ok(ParsedRow::MissingValue(Column::Quantity));
        }
        let quantity =
            parse_integral(&raw_qty).ok_or_else(|| field_error(line, Column::Quantity, &raw_qty))?;

        let raw_price = self.field(record, Column::UnitPrice);
        if raw_price.trim().is_empty() {
            return Ok(ParsedRow::MissingValue(Column::UnitPrice));
        }
        let unit_price = raw_price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| field_error(line, Column::UnitPrice, &raw_price))?;

        let stock = if self.index.contains_key(&Column::Stock) {
            let raw_stock = self.field(record, Column::Stock);
            if raw_stock.trim().is_empty() {
                None
            } else {
                Some(
                    parse_integral(&raw_stock)
                        .ok_or_else(|| field_error(line, Column::Stock, &raw_stock))?,
                )
            }
        } else {
            None
        };

        let extras = self
            .extra_positions
            .iter()
            .map(|&pos| record.get(pos).map(decode_latin1).unwrap_or_default())
            .collect();

        Ok(ParsedRow::Record(Transaction::new(
            self.field(record, Column::InvoiceNo),
            non_empty(self.field(record, Column::Description)),
            quantity,
            unit_price,
            invoice_date,
            non_empty(self.field(record, Column::CustomerId)),
            non_empty(self.field(record, Column::Country)),
        )
        .with_stock(stock)
        .with_extras(extras)))
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Strip whitespace and a UTF-8 BOM (raw or as decoded from latin-1) from a
/// header cell.
fn normalize_header_name(name: &str) -> &str {
    name.trim()
        .trim_start_matches('\u{feff}')
        .trim_start_matches("\u{ef}\u{bb}\u{bf}")
        .trim()
}

/// Accept integers and integral floats such as `"6.0"`.
fn parse_integral(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn field_error(line: u64, column: Column, value: &str) -> DashboardError {
    DashboardError::FieldParse {
        line,
        column: column.header().to_string(),
        value: value.to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
