//! Excel workbook datasets. Only the first worksheet is read, and saving
//! writes that one sheet back under its original name.

use anyhow::{Context, Result};
use calamine::{Reader, Xlsx};
use rust_xlsxwriter::{ColNum, RowNum, Workbook};
use std::io::Cursor;
use tracing::warn;

/// Characters Excel accepts in a single cell
pub const MAX_CELL_CHARS: usize = 32_767;

/// Name of the first worksheet and its rows as text, header first
pub fn read_rows(bytes: &[u8]) -> Result<(String, Vec<Vec<String>>)> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).context("Not an .xlsx workbook")?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("Workbook has no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    Ok((sheet, rows))
}

/// Encode rows as a single-sheet workbook. Empty cells are left blank.
pub fn write_rows<'a, I>(sheet: &str, rows: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (r, row) in rows.into_iter().enumerate() {
        let r = RowNum::try_from(r).context("Too many rows for a worksheet")?;
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let c = ColNum::try_from(c).context("Too many columns for a worksheet")?;
            worksheet.write_string(r, c, fit_cell(cell))?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn fit_cell(cell: &str) -> &str {
    match cell.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(
                "Cell of {} characters truncated to the {} Excel allows",
                cell.chars().count(),
                MAX_CELL_CHARS
            );
            &cell[..end]
        }
        None => cell,
    }
}
