// src/excel.rs

use std::path::Path;

use polars::prelude::*;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use crate::error::{Error, Result};
use crate::tables::Sheet;

/// Cell text for missing values.
const NA_REP: &str = "NaN";

/// Excel refuses wider columns.
const MAX_COLUMN_WIDTH: usize = 255;

/// Write every sheet to a new workbook at `path`. Each column is sized to
/// its longest non-missing value (or its header) plus `extra_width`.
pub fn write_sheets(sheets: &[Sheet], path: &Path, extra_width: usize) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_table(worksheet, &sheet.table, &header_format, extra_width)?;
        debug!("Sheet {}: {} rows", sheet.name, sheet.table.height());
    }

    workbook.save(path)?;
    Ok(())
}

/// Worksheet coordinates of a table cell; the header takes row 0.
fn cell_index(row: usize, col: usize) -> Result<(u32, u16)> {
    let too_large = || Error::SheetTooLarge { row, col };
    let cell_row = row
        .checked_add(1)
        .and_then(|r| u32::try_from(r).ok())
        .ok_or_else(too_large)?;
    let cell_col = u16::try_from(col).map_err(|_| too_large())?;
    Ok((cell_row, cell_col))
}

fn write_table(
    worksheet: &mut Worksheet,
    table: &DataFrame,
    header_format: &Format,
    extra_width: usize,
) -> Result<()> {
    for (col_idx, column) in table.get_columns().iter().enumerate() {
        let (_, col) = cell_index(0, col_idx)?;
        let header = column.name().as_str();
        worksheet.write_string_with_format(0, col, header, header_format)?;

        let mut width = header.chars().count();
        let series = column.as_materialized_series();
        for row in 0..table.height() {
            let (cell_row, _) = cell_index(row, col_idx)?;
            match series.get(row)? {
                AnyValue::Null => {
                    worksheet.write_string(cell_row, col, NA_REP)?;
                }
                AnyValue::String(s) => {
                    width = width.max(s.chars().count());
                    worksheet.write_string(cell_row, col, s)?;
                }
                AnyValue::Int64(v) => {
                    width = width.max(v.to_string().len());
                    worksheet.write_number(cell_row, col, v as f64)?;
                }
                other => {
                    let text = other.to_string();
                    width = width.max(text.chars().count());
                    worksheet.write_string(cell_row, col, text)?;
                }
            }
        }

        let width = (width + extra_width).min(MAX_COLUMN_WIDTH);
        worksheet.set_column_width(col, width as f64)?;
    }
    Ok(())
}
