//! Byte decoding and CSV reader construction.
//!
//! Bodies are always read as raw bytes and decoded with an explicit
//! `encoding_rs` decoder (UTF-8 unless overridden) before parsing, so
//! non-ASCII headers and values survive intact.

use std::io::Read;

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

use crate::dataset::RawRow;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Builds a positional reader: no header detection, rows of any width.
pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Decodes `bytes` with `encoding`, dropping a leading BOM. Returns `None`
/// when the input contains sequences that are invalid for the encoding.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        None
    } else {
        Some(text.into_owned())
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: u64 },
}

/// Splits decoded text into raw rows. Empty lines never produce a row.
///
/// A quote inside an unquoted field is kept as a literal character, but a
/// field that opens with a quote and runs to the end of the text is
/// rejected instead of swallowing the remaining lines.
pub fn parse_rows(text: &str, delimiter: u8) -> Result<Vec<RawRow>, ParseError> {
    if let Some(line) = unterminated_quote_line(text, delimiter) {
        return Err(ParseError::UnterminatedQuote { line });
    }
    let mut reader = open_csv_reader(text.as_bytes(), delimiter);
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Returns the 1-based line of a quoted field left open at end of input.
/// Quotes only open a field at its first byte, as the csv reader treats them.
fn unterminated_quote_line(text: &str, delimiter: u8) -> Option<u64> {
    let mut bytes = text.bytes().peekable();
    let mut line = 1u64;
    let mut field_start = true;
    let mut opened_on: Option<u64> = None;
    while let Some(byte) = bytes.next() {
        if byte == b'\n' {
            line += 1;
        }
        if opened_on.is_some() {
            if byte == b'"' {
                if bytes.peek() == Some(&b'"') {
                    bytes.next();
                } else {
                    opened_on = None;
                }
            }
            continue;
        }
        match byte {
            b'"' if field_start => opened_on = Some(line),
            b'\n' | b'\r' => field_start = true,
            other if other == delimiter => field_start = true,
            _ => field_start = false,
        }
    }
    opened_on
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn decode_bytes_keeps_persian_text() {
        let source = "متقاضی,تاریخ\n";
        let decoded = decode_bytes(source.as_bytes(), UTF_8).expect("valid utf-8");
        assert_eq!(decoded, source);
    }

    #[test]
    fn decode_bytes_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Applicant\n");
        assert_eq!(decode_bytes(&bytes, UTF_8).as_deref(), Some("Applicant\n"));
    }

    #[test]
    fn decode_bytes_rejects_invalid_utf8() {
        assert!(decode_bytes(&[0x66, 0xFF, 0xFE, 0x6F], UTF_8).is_none());
    }

    #[test]
    fn decode_bytes_honours_legacy_encoding() {
        let decoded = decode_bytes(&[0x63, 0x61, 0x66, 0xE9], WINDOWS_1252).expect("decode");
        assert_eq!(decoded, "café");
    }

    #[test]
    fn parse_rows_skips_empty_lines_and_keeps_ragged_rows() {
        let rows = parse_rows("a,b,c\n\n1,2\n\"x, y\",z,w,extra\n", b',').expect("parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["1", "2"]);
        assert_eq!(rows[2], vec!["x, y", "z", "w", "extra"]);
    }

    #[test]
    fn parse_rows_rejects_quote_left_open() {
        let err = parse_rows("a,b\n\"open,1\n", b',').expect_err("open quote");
        assert!(matches!(err, ParseError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn parse_rows_keeps_mid_field_quote_literal() {
        let rows = parse_rows("a,b\nx\"y,1\n", b',').expect("parse");
        assert_eq!(rows[1], vec!["x\"y", "1"]);
    }

    #[test]
    fn parse_rows_accepts_escaped_quotes_and_multiline_fields() {
        let text = "a,b\n\"say \"\"hi\"\"\",\"two\nlines\"\n";
        let rows = parse_rows(text, b',').expect("parse");
        assert_eq!(rows[1], vec!["say \"hi\"", "two\nlines"]);
    }

    #[test]
    fn parse_rows_keeps_quoted_empty_cell_row() {
        let rows = parse_rows("Applicant\n\"\"\n", b',').expect("parse");
        assert_eq!(rows, vec![vec!["Applicant".to_string()], vec![String::new()]]);
    }

    #[test]
    fn resolve_encoding_rejects_unknown_label() {
        assert!(resolve_encoding(Some("not-an-encoding")).is_err());
        assert_eq!(resolve_encoding(None).expect("default"), UTF_8);
    }
}
