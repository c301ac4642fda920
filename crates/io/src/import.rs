// Format detection by fallback: spreadsheet, then comma/UTF-8, then semicolon/Latin-1

use std::fmt;

use crate::csv::{self as delimited, TextEncoding};
use crate::table::Table;
use crate::xlsx;

/// Which reader accepted the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    CommaUtf8,
    SemicolonLatin1,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spreadsheet => write!(f, "spreadsheet"),
            Self::CommaUtf8 => write!(f, "csv (comma, utf-8)"),
            Self::SemicolonLatin1 => write!(f, "csv (semicolon, latin-1)"),
        }
    }
}

/// Read an uploaded table. The first reader that succeeds wins; results are never merged.
///
/// On failure the error carries the last reader's message.
pub fn import_table(bytes: &[u8]) -> Result<(Table, SourceFormat), String> {
    if let Ok(table) = xlsx::import_from_bytes(bytes) {
        return Ok((table, SourceFormat::Spreadsheet));
    }
    if let Ok(table) = delimited::import_from_bytes(bytes, b',', TextEncoding::Utf8) {
        return Ok((table, SourceFormat::CommaUtf8));
    }
    delimited::import_from_bytes(bytes, b';', TextEncoding::Latin1)
        .map(|table| (table, SourceFormat::SemicolonLatin1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn comma_csv_wins_over_semicolon() {
        let (table, format) = import_table("Nome,Sexo\nAna;x,F\n".as_bytes()).unwrap();
        assert_eq!(format, SourceFormat::CommaUtf8);
        assert_eq!(table.cell(0, 0), &Cell::text("Ana;x"));
    }

    #[test]
    fn latin1_semicolon_fallback() {
        let (table, format) = import_table(b"Nome;Sexo\nJo\xE3o Souza;M\n").unwrap();
        assert_eq!(format, SourceFormat::SemicolonLatin1);
        assert_eq!(table.headers(), ["Nome", "Sexo"]);
        assert_eq!(table.cell(0, 0), &Cell::text("João Souza"));
    }

    #[test]
    fn ragged_comma_csv_falls_through() {
        let (table, format) = import_table("Nome;Sexo\nSilva, Ana;F\n".as_bytes()).unwrap();
        assert_eq!(format, SourceFormat::SemicolonLatin1);
        assert_eq!(table.cell(0, 0), &Cell::text("Silva, Ana"));
    }

    #[test]
    fn spreadsheet_first() {
        let source = Table::new(vec!["Nome".into()], vec![vec![Cell::text("Ana")]]);
        let bytes = xlsx::export_to_bytes(&source).unwrap();
        let (table, format) = import_table(&bytes).unwrap();
        assert_eq!(format, SourceFormat::Spreadsheet);
        assert_eq!(table, source);
    }

    #[test]
    fn nothing_parses() {
        assert!(import_table(b"").is_err());
    }
}
