//! Spreadsheet export of the channel x period pivot.

use crate::error::Result;
use crate::pivot::PivotTable;
use log::info;
use rust_xlsxwriter::{Format, Workbook};

pub const PIVOT_FILE_NAME: &str = "거래처_월_피벗.xlsx";
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PIVOT_SHEET_NAME: &str = "Pivot";

/// An in-memory workbook ready to be offered as a download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

/// Renders the pivot as a single-sheet workbook.
///
/// Row order, column order and zero-filled cells are written exactly as they are in
/// `pivot`. Top-K cells are bolded.
pub fn export_pivot(pivot: &PivotTable) -> Result<ExportArtifact> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let number_format = Format::new().set_num_format("#,##0");
    let top_format = Format::new().set_num_format("#,##0").set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(PIVOT_SHEET_NAME)?;

    worksheet.write_string_with_format(0, 0, &pivot.row_header, &header_format)?;
    for (idx, period) in pivot.periods.iter().enumerate() {
        worksheet.write_string_with_format(0, (idx + 1) as u16, period, &header_format)?;
    }

    for (row_idx, row) in pivot.rows.iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        worksheet.write_string(sheet_row, 0, &row.channel)?;
        for (col_idx, (value, is_top)) in row.values.iter().zip(&row.top_flags).enumerate() {
            let format = if *is_top { &top_format } else { &number_format };
            worksheet.write_number_with_format(sheet_row, (col_idx + 1) as u16, *value, format)?;
        }
    }

    worksheet.set_column_width(0, 16)?;
    worksheet.set_freeze_panes(1, 1)?;

    let bytes = workbook.save_to_buffer()?;
    info!(
        "Exported pivot with {} rows x {} periods ({} bytes)",
        pivot.rows.len(),
        pivot.periods.len(),
        bytes.len()
    );

    Ok(ExportArtifact {
        bytes,
        file_name: PIVOT_FILE_NAME.to_string(),
        mime_type: XLSX_MIME_TYPE.to_string(),
    })
}
