// CSV import from raw bytes

use crate::table::{Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1 (Latin-1).
    Latin1,
}

/// Decode bytes in the given encoding. UTF-8 input must be valid; a leading BOM is dropped.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<String, String> {
    match encoding {
        TextEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| format!("invalid UTF-8: {e}"))
        }
        // ISO-8859-1 proper: every byte maps to the code point of the same value, so this never fails.
        TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes).into_owned()),
    }
}

/// Parse delimited text with a header row.
///
/// Records with fewer fields than the header are padded with empty cells;
/// a record with more fields than the header is an error.
pub fn import_from_bytes(bytes: &[u8], delimiter: u8, encoding: TextEncoding) -> Result<Table, String> {
    let content = decode(bytes, encoding)?;
    import_from_string(&content, delimiter)
}

pub fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err("no columns to parse".to_string());
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        if record.len() > headers.len() {
            // +2: one for the header, one for 1-based line numbers
            return Err(format!(
                "line {}: expected {} fields, saw {}",
                idx + 2,
                headers.len(),
                record.len()
            ));
        }
        let row = record
            .iter()
            .map(|field| if field.is_empty() { Cell::Empty } else { Cell::text(field) })
            .collect();
        rows.push(row);
    }

    Ok(Table::new(headers, rows))
}
