// Expense Tracker - Report Export
// Spreadsheet export over a date range: header, one row per record, total row.

use rust_xlsxwriter::Workbook;

use crate::error::StoreResult;
use crate::record::ExpenseRecord;

pub const REPORT_FILENAME: &str = "expenses_report.xlsx";
pub const REPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const REPORT_SHEET: &str = "Expenses Report";

const HEADER: [&str; 4] = ["ID", "Name", "Date", "Amount"];

/// Derived, non-persisted view of the records selected for a report
#[derive(Debug, Clone)]
pub struct ExpenseReport {
    records: Vec<ExpenseRecord>,
    total: f64,
}

impl ExpenseReport {
    pub fn new(records: Vec<ExpenseRecord>) -> Self {
        let total = records.iter().map(|r| r.amount).sum();
        Self { records, total }
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// Sum of `amount` across every included record
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Render the report as an XLSX workbook with a single sheet
    pub fn to_xlsx(&self) -> StoreResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(REPORT_SHEET)?;

        for (col, title) in (0u16..).zip(HEADER) {
            sheet.write_string(0, col, title)?;
        }

        let mut row = 1u32;
        for record in &self.records {
            sheet.write_number(row, 0, record.id as f64)?;
            sheet.write_string(row, 1, &record.name)?;
            sheet.write_string(row, 2, record.date_text())?;
            sheet.write_number(row, 3, record.amount)?;
            row += 1;
        }

        // Total row: first two cells left blank
        sheet.write_string(row, 2, "Total")?;
        sheet.write_number(row, 3, self.total)?;

        Ok(workbook.save_to_buffer()?)
    }
}

/// Cells of the first sheet as text, for assertions on rendered reports
#[cfg(test)]
pub(crate) fn read_rows(bytes: &[u8]) -> Vec<Vec<String>> {
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

    let mut workbook: Xlsx<_> = open_workbook_from_rs(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let range = workbook.worksheet_range(REPORT_SHEET).unwrap();
    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
