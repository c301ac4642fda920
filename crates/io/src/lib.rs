// Table I/O: spreadsheet and CSV import, XLSX export

pub mod csv;
pub mod import;
pub mod table;
pub mod xlsx;

pub use import::{import_table, SourceFormat};
pub use table::{Cell, Table};

/// MIME type of the exported workbook.
pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
