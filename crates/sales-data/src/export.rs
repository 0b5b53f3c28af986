//! Excel export of the (filtered) sales table.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use sales_core::error::{DashboardError, Result};
use sales_core::models::{Column, ColumnSlot, SalesTable, Transaction};
use umya_spreadsheet::Worksheet;

pub const SHEET_NAME: &str = "Sales Report";
pub const REVENUE_HEADER: &str = "Revenue";
pub const EXCEL_MIME: &str = "application/vnd.ms-excel";
pub const DEFAULT_EXPORT_NAME: &str = "sales_report.xlsx";

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell as it will be written.
#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

/// Serialise `table` into an in-memory `.xlsx` workbook.
///
/// The sheet repeats the source columns in their original order, followed
/// by the derived `Revenue` column.
pub fn export_workbook(table: &SalesTable) -> Result<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let ws = book
        .new_sheet(SHEET_NAME)
        .map_err(|e| DashboardError::Export(format!("cannot create sheet: {e}")))?;

    for (i, header) in table
        .headers()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(REVENUE_HEADER))
        .enumerate()
    {
        set_cell(ws, i, 0, CellValue::Text(header.to_string()));
    }

    for (row_idx, record) in table.records().iter().enumerate() {
        let row = row_idx + 1;
        for (col, slot) in table.layout().iter().enumerate() {
            set_cell(ws, col, row, cell_for(record, *slot));
        }
        set_cell(ws, table.layout().len(), row, CellValue::Number(record.revenue));
    }

    let mut out = Cursor::new(Vec::<u8>::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| DashboardError::Export(e.to_string()))?;

    tracing::debug!(rows = table.len(), "workbook serialised");
    Ok(out.into_inner())
}

/// Write the workbook to `path`.
///
/// The bytes land in a temporary sibling first and are renamed into place, so
/// a failed export never leaves a truncated file behind.
pub fn export_to_path(table: &SalesTable, path: &Path) -> Result<()> {
    let bytes = export_workbook(table)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DashboardError::Export(format!("not a file path: {}", path.display())))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let result = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(DashboardError::Export(format!(
            "cannot write {}: {e}",
            path.display()
        )));
    }

    tracing::info!(path = %path.display(), rows = table.len(), "exported sales report");
    Ok(())
}

// ── Private ───────────────────────────────────────────────────────────────────

fn cell_for(record: &Transaction, slot: ColumnSlot) -> CellValue {
    let text = |v: &Option<String>| match v {
        Some(s) => CellValue::Text(s.clone()),
        None => CellValue::Blank,
    };

    match slot {
        ColumnSlot::Known(Column::InvoiceNo) => CellValue::Text(record.invoice_no.clone()),
        ColumnSlot::Known(Column::Description) => text(&record.description),
        ColumnSlot::Known(Column::Quantity) => CellValue::Number(record.quantity as f64),
        ColumnSlot::Known(Column::UnitPrice) => CellValue::Number(record.unit_price),
        ColumnSlot::Known(Column::InvoiceDate) => {
            CellValue::Text(record.invoice_date.format(TIMESTAMP_FMT).to_string())
        }
        // Customer ids are numeric in practice; keep anything else as text.
        ColumnSlot::Known(Column::CustomerId) => match record.customer_id.as_deref() {
            Some(id) => match id.parse::<f64>() {
                Ok(n) if n.is_finite() => CellValue::Number(n),
                _ => CellValue::Text(id.to_string()),
            },
            None => CellValue::Blank,
        },
        ColumnSlot::Known(Column::Country) => text(&record.country),
        ColumnSlot::Known(Column::Stock) => match record.stock {
            Some(n) => CellValue::Number(n as f64),
            None => CellValue::Blank,
        },
        ColumnSlot::Extra(i) => match record.extras.get(i) {
            Some(s) if !s.is_empty() => CellValue::Text(s.clone()),
            _ => CellValue::Blank,
        },
    }
}

/// Write one cell; `col` and `row` are zero-based.
fn set_cell(ws: &mut Worksheet, col: usize, row: usize, value: CellValue) {
    let coord = ((col + 1) as u32, (row + 1) as u32);
    match value {
        CellValue::Text(s) => {
            ws.get_cell_mut(coord).set_value(s);
        }
        CellValue::Number(n) => {
            ws.get_cell_mut(coord).set_value_number(n);
        }
        CellValue::Blank => {}
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
