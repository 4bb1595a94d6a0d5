use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::info;

use super::domain::{OverdueRecord, ReportArtifact};
use super::store::{BlobStore, StoreError};

pub const REPORT_PREFIX: &str = "OverDueReport_";
pub const REPORT_EXTENSION: &str = "xlsx";
pub const REPORT_SHEET_NAME: &str = "Overdue Companies";
pub const REPORT_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EMPTY_REPORT_PLACEHOLDER: &str = "No overdue companies found";

#[derive(Debug, thiserror::Error)]
pub enum ReportWriteError {
    #[error("failed to build report workbook: {0}")]
    Workbook(#[from] XlsxError),
    #[error("report has more rows than a worksheet holds")]
    TooManyRows,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Renders overdue rows into a one-sheet workbook and persists it.
pub struct ReportWriter<S> {
    store: Arc<S>,
}

impl<S> ReportWriter<S>
where
    S: BlobStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn filename_for(timestamp: NaiveDateTime) -> String {
        format!(
            "{REPORT_PREFIX}{}.{REPORT_EXTENSION}",
            timestamp.format("%Y-%m-%d_%H-%M-%S")
        )
    }

    pub fn write(
        &self,
        records: Vec<OverdueRecord>,
        timestamp: NaiveDateTime,
    ) -> Result<ReportArtifact, ReportWriteError> {
        let filename = Self::filename_for(timestamp);
        let bytes = render_workbook(&records)?;
        self.store.put(&filename, &bytes)?;

        info!(%filename, rows = records.len(), "report written");
        Ok(ReportArtifact {
            filename,
            rows: records,
        })
    }
}

/// Header plus one row per record, or a lone placeholder row when empty.
pub fn render_workbook(records: &[OverdueRecord]) -> Result<Vec<u8>, ReportWriteError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_SHEET_NAME)?;

    if records.is_empty() {
        sheet.write_string(0, 0, EMPTY_REPORT_PLACEHOLDER)?;
    } else {
        write_row(sheet, 0, &OverdueRecord::COLUMNS)?;
        for (index, record) in records.iter().enumerate() {
            let row = u32::try_from(index + 1).map_err(|_| ReportWriteError::TooManyRows)?;
            write_row(sheet, row, &record.cells())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_row(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    cells: &[&str],
) -> Result<(), XlsxError> {
    for (col, value) in (0u16..).zip(cells) {
        sheet.write_string(row, col, *value)?;
    }
    Ok(())
}
