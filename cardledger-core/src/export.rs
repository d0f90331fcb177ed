//! Import-ready CSV export (Mint-like column layout).
//!
//! Date,Description,Original Description,Amount,Transaction Type,Category,
//! Account Name,Labels,Notes

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::normalize::format_us_date;
use crate::statement::{Statement, TransactionRecord};

pub const IMPORT_HEADER: [&str; 9] = [
    "Date",
    "Description",
    "Original Description",
    "Amount",
    "Transaction Type",
    "Category",
    "Account Name",
    "Labels",
    "Notes",
];

/// One output row, already in import conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub transaction_type: &'static str,
    pub notes: String,
}

impl ImportRow {
    pub fn from_record(record: &TransactionRecord) -> Self {
        let transaction_type = if record.is_debit() { "debit" } else { "credit" };
        Self {
            date: format_us_date(record.date),
            description: record.description.clone(),
            amount: record.import_amount().to_string(),
            transaction_type,
            notes: record.description.clone(),
        }
    }

    fn fields(&self) -> [&str; 9] {
        [
            self.date.as_str(),
            self.description.as_str(),
            "",
            self.amount.as_str(),
            self.transaction_type,
            "",
            "",
            "",
            self.notes.as_str(),
        ]
    }
}

/// Rows in collection order (no chronological re-sort).
pub fn import_rows(statement: &Statement) -> Vec<ImportRow> {
    statement
        .transactions
        .iter()
        .map(ImportRow::from_record)
        .collect()
}

/// Write the header plus one row per transaction. The header is written even
/// when the statement has no transactions.
pub fn write_import_csv<W: Write>(writer: W, statement: &Statement) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(IMPORT_HEADER)?;
    for row in import_rows(statement) {
        wtr.write_record(row.fields())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the import file to `path`, replacing any existing file.
pub fn write_import_file(path: &Path, statement: &Statement) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    write_import_csv(file, statement).map_err(|source| Error::Csv {
        path: path.to_path_buf(),
        source,
    })
}

/// Render the import file into a String (used by `inspect` and tests).
pub fn render_import_csv(statement: &Statement) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_import_csv(&mut buf, statement)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    const HEADER_LINE: &str =
        "Date,Description,Original Description,Amount,Transaction Type,Category,Account Name,Labels,Notes\n";

    fn record(desc: &str, cents: i64) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            desc,
            Decimal::new(cents, 2),
        )
    }

    #[test]
    fn test_empty_statement_is_header_only() {
        let out = render_import_csv(&Statement::default()).unwrap();
        assert_eq!(out, HEADER_LINE);
    }

    #[test]
    fn test_charge_row() {
        let mut s = Statement::default();
        s.transactions.push(record("Coffee Shop", 523));
        let out = render_import_csv(&s).unwrap();
        assert_eq!(
            out,
            format!("{HEADER_LINE}01/15/2023,Coffee Shop,,-5.23,debit,,,,Coffee Shop\n")
        );
    }

    #[test]
    fn test_payment_row_is_credit() {
        let mut s = Statement::default();
        s.transactions.push(record("ACH Deposit", -120000));
        let rows = import_rows(&s);
        assert_eq!(rows[0].amount, "1200.00");
        assert_eq!(rows[0].transaction_type, "credit");
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut s = Statement::default();
        s.transactions.push(record("ACME, INC", 100));
        let out = render_import_csv(&s).unwrap();
        assert!(out.ends_with("01/15/2023,\"ACME, INC\",,-1.00,debit,,,,\"ACME, INC\"\n"));
    }

    #[test]
    fn test_rows_keep_collection_order() {
        let mut s = Statement::default();
        s.transactions.push(TransactionRecord::new(
            NaiveDate::from_ymd_opt(2023, 1, 20).unwrap(),
            "Later",
            Decimal::ONE,
        ));
        s.transactions.push(record("Earlier", 100));
        let rows = import_rows(&s);
        assert_eq!(rows[0].description, "Later");
        assert_eq!(rows[1].description, "Earlier");
    }

    #[test]
    fn test_write_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut s = Statement::default();
        s.transactions.push(record("Coffee Shop", 523));
        write_import_file(&path, &s).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn test_write_import_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = write_import_file(&path, &Statement::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
