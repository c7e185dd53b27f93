use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};

use crate::boarding::invoice::error::Result;
use crate::boarding::invoice::model::{CanonicalField, RoomRecord};

/// Worksheet name used for exported room tables.
pub const ROOMS_SHEET: &str = "Rooms";

/// Writes the room table to `path`, one row per record under the sheet's own
/// Vietnamese headers. Values are written as text, exactly as fetched.
pub fn write_rooms(path: &Path, records: &[RoomRecord]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(ROOMS_SHEET)?;

    for (col_idx, field) in CanonicalField::ALL.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, field.header())?;
    }

    for (row_idx, record) in records.iter().enumerate() {
        for (col_idx, (_, value)) in record.iter().enumerate() {
            worksheet.write_string((row_idx + 1) as u32, col_idx as u16, value)?;
        }
    }

    let col_end = (CanonicalField::COUNT as u16).saturating_sub(1);
    let row_end = records.len() as u32;
    if row_end > 0 {
        let columns: Vec<TableColumn> = CanonicalField::ALL
            .iter()
            .map(|field| TableColumn::new().set_header(field.header()))
            .collect();
        let mut table = Table::new();
        table.set_autofilter(true).set_columns(&columns);
        worksheet.add_table(0, 0, row_end, col_end, &table)?;
    }
    worksheet.autofit();

    workbook.save(path)?;
    Ok(())
}
