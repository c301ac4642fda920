// Excel import (xlsx, xls, xlsb, ods) and XLSX export, all in memory

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

use crate::table::{Cell, Table};

/// Name of the single sheet written on export.
pub const SHEET_NAME: &str = "Sheet1";

const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Import the first sheet of a workbook. The first row is the header.
///
/// Blank header cells are named `Unnamed: <col>`; fully empty data rows are skipped.
pub fn import_from_bytes(bytes: &[u8]) -> Result<Table, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "Excel file contains no sheets".to_string())?
        .map_err(|e| format!("Failed to read first sheet: {}", e))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Err("first sheet is empty".to_string());
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(col, data)| match convert(data).to_display() {
            Some(name) if !name.is_empty() => name,
            _ => format!("Unnamed: {col}"),
        })
        .collect();

    let rows = rows_iter
        .map(|row| row.iter().map(convert).collect::<Vec<Cell>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();

    Ok(Table::new(headers, rows))
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // calamine exposes the raw serial; 1900 date system assumed
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}

/// Export a table as a single-sheet XLSX workbook and return the file bytes.
pub fn export_to_bytes(table: &Table) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SHEET_NAME, e))?;

    write_sheet(table, worksheet)?;

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Failed to build XLSX file: {}", e))
}

fn write_sheet(table: &Table, worksheet: &mut Worksheet) -> Result<(), String> {
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for (col, name) in table.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_index(col)?, name, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row32 = row_index(row_idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            let col16 = col_index(col)?;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(s) => worksheet.write_string(row32, col16, s),
                Cell::Number(n) => worksheet.write_number(row32, col16, *n),
                Cell::Bool(b) => worksheet.write_boolean(row32, col16, *b),
                Cell::DateTime(serial) => worksheet.write_number_with_format(row32, col16, *serial, &date_format),
            };
            written.map_err(|e| {
                format!("Failed to write cell ({}, {}) '{}': {}", row32, col, cell.to_display().unwrap_or_default(), e)
            })?;
        }
    }

    Ok(())
}

// Worksheet limits: 1,048,576 rows by 16,384 columns.
const MAX_ROWS: u32 = 1_048_576;
const MAX_COLS: u16 = 16_384;

fn row_index(row: usize) -> Result<u32, String> {
    u32::try_from(row)
        .ok()
        .filter(|r| *r < MAX_ROWS)
        .ok_or_else(|| format!("too many rows for a worksheet: row {} exceeds {}", row + 1, MAX_ROWS))
}

fn col_index(col: usize) -> Result<u16, String> {
    u16::try_from(col)
        .ok()
        .filter(|c| *c < MAX_COLS)
        .ok_or_else(|| format!("too many columns for a worksheet: column {} exceeds {}", col + 1, MAX_COLS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["Nome".into(), "Data de Nascimento".into(), "CPF".into(), "Ativo".into()],
            vec![
                vec![
                    Cell::text("Maria Silva"),
                    Cell::DateTime(33604.0),
                    Cell::Number(12345678901.0),
                    Cell::Bool(true),
                ],
                vec![Cell::text("João Souza"), Cell::Empty, Cell::text("000.111.222-33"), Cell::Bool(false)],
            ],
        )
    }

    #[test]
    fn export_produces_zip_container() {
        let bytes = export_to_bytes(&sample()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn exported_workbook_reads_back() {
        let bytes = export_to_bytes(&sample()).unwrap();
        let table = import_from_bytes(&bytes).unwrap();

        assert_eq!(table.headers(), ["Nome", "Data de Nascimento", "CPF", "Ativo"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), &Cell::text("Maria Silva"));
        assert_eq!(table.cell(0, 2), &Cell::Number(12345678901.0));
        assert_eq!(table.cell(1, 1), &Cell::Empty);
        assert_eq!(table.cell(1, 2), &Cell::text("000.111.222-33"));
        assert_eq!(table.cell(1, 3), &Cell::Bool(false));
        match table.cell(0, 1) {
            Cell::DateTime(serial) | Cell::Number(serial) => assert_eq!(*serial, 33604.0),
            other => panic!("expected a date serial, got {other:?}"),
        }
    }

    #[test]
    fn too_many_columns_is_an_error() {
        let width = MAX_COLS as usize + 1;
        let headers = (0..width).map(|c| format!("c{c}")).collect();
        let table = Table::new(headers, Vec::new());
        let err = export_to_bytes(&table).unwrap_err();
        assert!(err.contains("too many columns"), "{err}");
    }

    #[test]
    fn index_limits() {
        assert_eq!(col_index(16_383), Ok(16_383));
        assert!(col_index(65_536).is_err());
        assert_eq!(row_index(1_048_575), Ok(1_048_575));
        assert!(row_index(1_048_576).is_err());
    }

    #[test]
    fn csv_bytes_are_not_a_workbook() {
        assert!(import_from_bytes(b"Nome,Sexo\nAna,F\n").is_err());
    }
}
