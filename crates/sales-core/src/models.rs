use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ── Column ────────────────────────────────────────────────────────────────────

/// A source column the dashboard understands by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    InvoiceNo,
    Description,
    Quantity,
    UnitPrice,
    InvoiceDate,
    CustomerId,
    Country,
    Stock,
}

impl Column {
    /// Columns every upload must carry.
    pub const REQUIRED: [Column; 7] = [
        Column::InvoiceNo,
        Column::Description,
        Column::Quantity,
        Column::UnitPrice,
        Column::InvoiceDate,
        Column::CustomerId,
        Column::Country,
    ];

    /// Header name as it appears in the CSV.
    pub fn header(self) -> &'static str {
        match self {
            Column::InvoiceNo => "InvoiceNo",
            Column::Description => "Description",
            Column::Quantity => "Quantity",
            Column::UnitPrice => "UnitPrice",
            Column::InvoiceDate => "InvoiceDate",
            Column::CustomerId => "CustomerID",
            Column::Country => "Country",
            Column::Stock => "Stock",
        }
    }

    /// Resolve a header cell to a known column (exact, case-sensitive match).
    pub fn from_header(name: &str) -> Option<Column> {
        [Column::Stock]
            .into_iter()
            .chain(Column::REQUIRED)
            .find(|c| c.header() == name)
    }
}

/// Where each position of the source header row ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    /// A column parsed into a typed [`Transaction`] field.
    Known(Column),
    /// An unrecognised column, kept verbatim at this index of
    /// [`Transaction::extras`].
    Extra(usize),
}

// ── Transaction ───────────────────────────────────────────────────────────────

/// One row of the uploaded sales table, with its derived revenue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub invoice_no: String,
    /// `None` when the cell is empty.
    pub description: Option<String>,
    /// Negative for returns.
    pub quantity: i64,
    pub unit_price: f64,
    pub invoice_date: NaiveDateTime,
    pub customer_id: Option<String>,
    pub country: Option<String>,
    /// Only populated when the upload carries a `Stock` column.
    pub stock: Option<i64>,
    /// `quantity * unit_price`, computed at construction.
    pub revenue: f64,
    /// Unrecognised columns in source order.
    #[serde(default)]
    pub extras: Vec<String>,
}

impl Transaction {
    /// Build a record, deriving `revenue` from quantity and unit price.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        invoice_no: impl Into<String>,
        description: Option<String>,
        quantity: i64,
        unit_price: f64,
        invoice_date: NaiveDateTime,
        customer_id: Option<String>,
        country: Option<String>,
    ) -> Self {
        Self {
            invoice_no: invoice_no.into(),
            description,
            quantity,
            unit_price,
            invoice_date,
            customer_id,
            country,
            stock: None,
            revenue: quantity as f64 * unit_price,
            extras: Vec::new(),
        }
    }

    pub fn with_stock(mut self, stock: Option<i64>) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive timestamp range used to filter a [`SalesTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Range covering whole calendar days, `start` at midnight through the
    /// last nanosecond of `end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(chrono::NaiveTime::MIN),
            end: crate::time_utils::end_of_day(end),
        }
    }

    /// `true` when `ts` lies within the range, bounds included.
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

// ── SalesTable ────────────────────────────────────────────────────────────────

/// The derived in-memory table for one uploaded file.
///
/// Never mutated after ingestion; filtering produces a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    headers: Vec<String>,
    layout: Vec<ColumnSlot>,
    records: Vec<Transaction>,
}

impl SalesTable {
    /// Assemble a table from the source header row and its parsed records.
    ///
    /// `layout` must have one slot per header.
    pub fn new(headers: Vec<String>, layout: Vec<ColumnSlot>, records: Vec<Transaction>) -> Self {
        debug_assert_eq!(headers.len(), layout.len());
        Self {
            headers,
            layout,
            records,
        }
    }

    /// Table with the standard required columns only, in canonical order.
    pub fn from_records(records: Vec<Transaction>) -> Self {
        let headers = Column::REQUIRED
            .iter()
            .map(|c| c.header().to_string())
            .collect();
        let layout = Column::REQUIRED.iter().map(|c| ColumnSlot::Known(*c)).collect();
        Self::new(headers, layout, records)
    }

    /// Same as [`from_records`](Self::from_records) with a trailing `Stock`
    /// column.
    pub fn from_records_with_stock(records: Vec<Transaction>) -> Self {
        let mut table = Self::from_records(records);
        table.headers.push(Column::Stock.header().to_string());
        table.layout.push(ColumnSlot::Known(Column::Stock));
        table
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn layout(&self) -> &[ColumnSlot] {
        &self.layout
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source file carried `column`.
    pub fn has_column(&self, column: Column) -> bool {
        self.layout.contains(&ColumnSlot::Known(column))
    }

    /// Earliest and latest invoice timestamps, `None` for an empty table.
    pub fn date_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let min = self.records.iter().map(|r| r.invoice_date).min()?;
        let max = self.records.iter().map(|r| r.invoice_date).max()?;
        Some((min, max))
    }

    /// New table holding only the records inside `range`.
    pub fn filter_by_date(&self, range: &DateRange) -> SalesTable {
        SalesTable {
            headers: self.headers.clone(),
            layout: self.layout.clone(),
            records: self
                .records
                .iter()
                .filter(|r| range.contains(&r.invoice_date))
                .cloned()
                .collect(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
