//! CSV reading and writing for pharmacy exports.
//!
//! Reading decodes the raw bytes (encoding auto-detection), then splits them
//! into positional records. The export's first line is consumed as the
//! reader's label row and kept aside as the banner; everything else becomes a
//! [`RawTable`] row. Blank lines are skipped and never counted.
//!
//! Writing serializes a [`CleanTable`] to UTF-8 CSV with a header row.

use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::{CsvError, CsvResult};
use crate::models::{CleanTable, RawTable};

/// Exports are always comma-separated.
pub const DELIMITER: u8 = b',';

/// Result of reading an export, with decoding metadata.
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub table: RawTable,
    /// Detected or used encoding
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Labels encoding_rs does not know, and UTF-8 input with invalid sequences,
/// fall back to lossy UTF-8 decoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

/// Split decoded text into a banner and positional rows.
pub fn read_raw_str(content: &str) -> CsvResult<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(DELIMITER)
        .from_reader(content.as_bytes());

    let banner: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if banner.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(RawTable::new(banner, rows))
}

/// Read export bytes with encoding auto-detection.
pub fn read_raw_bytes(bytes: &[u8]) -> CsvResult<ReadResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let table = read_raw_str(&content)?;

    Ok(ReadResult { table, encoding })
}

/// Read an export from disk with encoding auto-detection.
pub fn read_raw_file<P: AsRef<Path>>(path: P) -> CsvResult<ReadResult> {
    let bytes = std::fs::read(path.as_ref())?;
    read_raw_bytes(&bytes)
}

/// Serialize a table to UTF-8 CSV bytes, header row first.
pub fn write_csv(table: &CleanTable) -> CsvResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(Vec::new());

    writer.write_record(table.column_names())?;
    for row in 0..table.row_count() {
        writer.write_record(table.row(row).iter().map(|cell| cell.render()))?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvError::WriteError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use std::io::Write;

    #[test]
    fn test_banner_is_consumed() {
        let raw = read_raw_str("Order Report,,\na,b,c\n1,2,3").unwrap();
        assert_eq!(raw.banner, vec!["Order Report", "", ""]);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows[0], vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ragged_rows_allowed() {
        let raw = read_raw_str("Report\nrun date,2024-01-05\na,b,c,d\n").unwrap();
        assert_eq!(raw.rows[0].len(), 2);
        assert_eq!(raw.rows[1].len(), 4);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let raw = read_raw_str("Report\n\nfirst\n\n\nsecond\n").unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.rows[1], vec!["second"]);
    }

    #[test]
    fn test_quoted_values() {
        let raw = read_raw_str("Report\n\"Dexamethasone Inj (Decadron, Dexa)\",x").unwrap();
        assert_eq!(raw.rows[0][0], "Dexamethasone Inj (Decadron, Dexa)");
        assert_eq!(raw.rows[0][1], "x");
    }

    #[test]
    fn test_bom_stripped() {
        let raw = read_raw_str("\u{feff}Report\nrow").unwrap();
        assert_eq!(raw.banner, vec!["Report"]);
    }

    #[test]
    fn test_empty_input_error() {
        assert!(matches!(read_raw_bytes(b""), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        assert_eq!(decode_content("Carboplatin".as_bytes(), "no-such-charset"), "Carboplatin");
        assert_eq!(decode_content(&[0x93, 0x41, 0x94], "windows-1252"), "\u{201c}A\u{201d}");
    }

    #[test]
    fn test_read_raw_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Report\nrow one\nrow two\n").unwrap();

        let result = read_raw_file(file.path()).unwrap();
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.len(), 2);
    }

    #[test]
    fn test_write_csv_renders_cells() {
        let table = CleanTable::from_rows(
            vec!["name".into(), "weeks".into(), "note".into()],
            vec![
                vec![Cell::Text("Doe, Jane".into()), Cell::Float(2.0), Cell::Null],
                vec![Cell::Text("Roe".into()), Cell::Float(0.5), Cell::Text("x".into())],
            ],
        );

        let bytes = write_csv(&table).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "name,weeks,note\n\"Doe, Jane\",2.0,\nRoe,0.5,x\n");
    }
}
