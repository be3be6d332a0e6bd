// 📥 CSV Import - bring historical expenses in through the same validation
// as the form. Expected headers: amount,date,note,category

use crate::expense::{Category, NewExpense};
use crate::validation::{validate, FieldErrors, FormInput};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ImportRow {
    amount: String,
    date: String,
    #[serde(default)]
    note: String,
    #[serde(default)]
    category: String,
}

impl ImportRow {
    fn into_input(self) -> FormInput {
        FormInput {
            amount: self.amount,
            date: self.date,
            note: self.note,
            // Unknown names count as "no category selected"
            category: self.category.trim().parse::<Category>().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: u64,
    pub errors: FieldErrors,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub accepted: Vec<NewExpense>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

pub fn import_csv(path: &Path) -> Result<ImportReport> {
    let rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    read_rows(rdr)
}

pub fn import_csv_reader<R: Read>(reader: R) -> Result<ImportReport> {
    read_rows(csv::Reader::from_reader(reader))
}

fn read_rows<R: Read>(mut rdr: csv::Reader<R>) -> Result<ImportReport> {
    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();
    let mut report = ImportReport::default();

    for result in rdr.records() {
        let record = result.context("Failed to read CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let row: ImportRow = record
            .deserialize(Some(&headers))
            .with_context(|| format!("Failed to deserialize CSV line {}", line))?;

        match validate(&row.into_input()) {
            Ok(expense) => report.accepted.push(expense),
            Err(errors) => {
                log::warn!("Rejected CSV line {}: {}", line, errors);
                report.rejected.push(RejectedRow { line, errors });
            }
        }
    }

    log::info!(
        "CSV import: {} accepted, {} rejected",
        report.accepted.len(),
        report.rejected.len()
    );
    Ok(report)
}
