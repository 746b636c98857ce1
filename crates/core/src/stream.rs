//! Report stream parser
//!
//! `RetrieveReport` returns the report as text in which special characters
//! are backslash-escaped (`\n`, `\t`, `\xHH`, `\uXXXX`, ...). Decoding
//! happens in two steps: resolve the escapes, then split the text into rows
//! at CRLF and read each row's cells with the `csv` reader. The first row
//! holds the headers; every following non-blank row becomes a
//! [`RowRecord`] keyed by header position.

use csv::{ReaderBuilder, StringRecord, Terminator, Trim};
use tracing::debug;
use ultipro_domain::{Result, RowRecord, UltiProError};

/// Resolve backslash escapes.
///
/// Recognised: `\\ \' \" \a \b \f \n \r \t \v`, octal `\N`..`\NNN`,
/// `\xHH`, `\uXXXX`, `\UXXXXXXXX` and a backslash before a line break
/// (line continuation, dropped). Anything else, including malformed or
/// out-of-range numeric escapes, is kept verbatim.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            out.push('\\');
            break;
        };
        let simple = match next {
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0B}'),
            _ => None,
        };
        if let Some(resolved) = simple {
            chars.next();
            out.push(resolved);
            continue;
        }
        match next {
            '\n' => {
                chars.next();
            }
            '0'..='7' => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 3 {
                    match chars.peek() {
                        Some(&(_, d @ '0'..='7')) => {
                            value = value * 8 + d.to_digit(8).unwrap_or(0);
                            digits += 1;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match char::from_u32(value) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&input[start..start + 1 + digits]),
                }
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let hex_start = start + 2;
                let decoded = input
                    .get(hex_start..hex_start + width)
                    .filter(|h| h.chars().all(|h| h.is_ascii_hexdigit()))
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        // escape letter plus the hex digits, all ASCII
                        for _ in 0..=width {
                            chars.next();
                        }
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Decode raw `ReportStream` bytes into report text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decode_report_stream(bytes: &[u8]) -> String {
    unescape(&String::from_utf8_lossy(bytes))
}

/// The delimiter as a single byte, as required by the `csv` reader and
/// writer.
///
/// # Errors
/// `UltiProError::InvalidInput` for non-ASCII characters, quotes and line
/// breaks.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    if delimiter.is_ascii() && delimiter != '"' && delimiter != '\r' && delimiter != '\n' {
        Ok(delimiter as u8)
    } else {
        Err(UltiProError::InvalidInput(format!(
            "report delimiter must be a single ASCII character other than a quote or line break, got {delimiter:?}"
        )))
    }
}

/// A byte absent from `text` that the reader can treat as the record
/// terminator, so each line is read as exactly one record.
fn unused_terminator(text: &str, delimiter: u8) -> Result<u8> {
    let mut seen = [false; 128];
    for byte in text.bytes().filter(u8::is_ascii) {
        seen[usize::from(byte)] = true;
    }
    (1u8..0x80)
        .rev()
        .find(|&byte| byte != delimiter && byte != b'"' && !seen[usize::from(byte)])
        .ok_or_else(|| {
            UltiProError::InvalidResponse(
                "report stream uses every ASCII character, cannot separate cells".into(),
            )
        })
}

/// Parse decoded report text into rows.
///
/// Rows end at CRLF only, so a lone `\n` or `\r` stays inside its cell.
/// Lines that are empty or whitespace-only are skipped; a line of empty
/// cells is still a row. Quoting never spans lines. Rows with fewer cells
/// than headers map only the cells present; cells beyond the header count
/// are dropped. A duplicate header keeps the later cell.
///
/// # Errors
/// `UltiProError::InvalidInput` for an unusable delimiter,
/// `UltiProError::InvalidResponse` when the text is not readable as
/// delimited rows.
pub fn parse_report(text: &str, delimiter: char) -> Result<Vec<RowRecord>> {
    let delimiter = delimiter_byte(delimiter)?;
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .terminator(Terminator::Any(unused_terminator(text, delimiter)?))
        .trim(Trim::None);

    let mut headers: Option<StringRecord> = None;
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    for line in text.split("\r\n").filter(|line| !line.trim().is_empty()) {
        let mut reader = builder.from_reader(line.as_bytes());
        let found = reader
            .read_record(&mut record)
            .map_err(|e| UltiProError::InvalidResponse(format!("unreadable report stream: {e}")))?;
        if !found {
            continue;
        }
        match &headers {
            None => headers = Some(record.clone()),
            Some(headers) => {
                rows.push(headers.iter().zip(record.iter()).collect::<RowRecord>());
            }
        }
    }

    debug!(
        columns = headers.as_ref().map_or(0, StringRecord::len),
        rows = rows.len(),
        "Parsed report stream"
    );
    Ok(rows)
}

/// Decode and parse raw `ReportStream` bytes.
///
/// # Errors
/// See [`parse_report`].
pub fn parse_report_stream(bytes: &[u8], delimiter: char) -> Result<Vec<RowRecord>> {
    parse_report(&decode_report_stream(bytes), delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_crlf_rows_against_headers() {
        let rows = parse_report("A,B\r\n1,2\r\n3,4\r\n", ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("A"), Some("1"));
        assert_eq!(rows[0].get("B"), Some("2"));
        assert_eq!(rows[1].get("A"), Some("3"));
        assert_eq!(rows[1].get("B"), Some("4"));
    }

    #[test]
    fn skips_blank_lines() {
        let rows = parse_report("A,B\r\n\r\n1,2\r\n   \r\n\r\n3,4", ',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("B"), Some("4"));
    }

    #[test]
    fn row_of_empty_cells_is_kept() {
        let rows = parse_report("A,B\r\n1,2\r\n,\r\n3,4\r\n", ',').unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get("A"), Some(""));
        assert_eq!(rows[1].get("B"), Some(""));
        assert_eq!(rows[2].get("A"), Some("3"));
    }

    #[test]
    fn escaped_line_feed_stays_inside_its_cell() {
        let rows = parse_report_stream(br"A,B\r\nline1\nline2,2\r\n", ',').unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("A"), Some("line1\nline2"));
        assert_eq!(rows[0].get("B"), Some("2"));
    }

    #[test]
    fn lone_carriage_return_stays_inside_its_cell() {
        let rows = parse_report("A,B\r\nx\ry,2\r\n", ',').unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("A"), Some("x\ry"));
        assert_eq!(rows[0].get("B"), Some("2"));
    }

    #[test]
    fn unclosed_quote_is_confined_to_its_line() {
        let rows = parse_report("A,B\r\n\"x,1\r\n3,4\r\n5,6\r\n", ',').unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("A"), Some("x,1"));
        assert_eq!(rows[0].get("B"), None);
        assert_eq!(rows[1].get("A"), Some("3"));
        assert_eq!(rows[2].get("B"), Some("6"));
    }

    #[test]
    fn honours_custom_delimiter() {
        let rows = parse_report("Name;City\r\nDoe, Jane;Miami\r\n", ';').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some("Doe, Jane"));
        assert_eq!(rows[0].get("City"), Some("Miami"));
    }

    #[test]
    fn short_rows_map_available_cells_and_extra_cells_are_dropped() {
        let rows = parse_report("A,B,C\r\n1\r\n1,2,3,4\r\n", ',').unwrap();

        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[0].get("A"), Some("1"));
        assert_eq!(rows[0].get("B"), None);
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1].headers().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn quoted_fields_may_contain_the_delimiter() {
        let rows = parse_report("Name,Dept\r\n\"Doe, Jane\",HR\r\n", ',').unwrap();
        assert_eq!(rows[0].get("Name"), Some("Doe, Jane"));
    }

    #[test]
    fn header_only_and_empty_streams_have_no_rows() {
        assert!(parse_report("A,B\r\n", ',').unwrap().is_empty());
        assert!(parse_report("", ',').unwrap().is_empty());
    }

    #[test]
    fn rejects_multi_byte_and_reserved_delimiters() {
        assert!(matches!(parse_report("A", '§'), Err(UltiProError::InvalidInput(_))));
        assert!(matches!(parse_report("A", '"'), Err(UltiProError::InvalidInput(_))));
        assert!(matches!(parse_report("A", '\n'), Err(UltiProError::InvalidInput(_))));
        assert!(parse_report("A", '\t').is_ok());
    }

    #[test]
    fn unescapes_common_sequences() {
        assert_eq!(unescape(r"A,B\r\n1,2"), "A,B\r\n1,2");
        assert_eq!(unescape(r"tab\there"), "tab\there");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
        assert_eq!(unescape(r#"\'q\""#), "'q\"");
        assert_eq!(unescape(r"\a\b\f\v"), "\u{07}\u{08}\u{0C}\u{0B}");
    }

    #[test]
    fn unescapes_numeric_sequences() {
        assert_eq!(unescape(r"caf\xe9"), "café");
        assert_eq!(unescape(r"\u00e9t\u00e9"), "été");
        assert_eq!(unescape(r"\U0001F600"), "\u{1F600}");
        assert_eq!(unescape(r"\101\0"), "A\0");
    }

    #[test]
    fn keeps_unknown_and_malformed_escapes_verbatim() {
        assert_eq!(unescape(r"C:\path"), r"C:\path");
        assert_eq!(unescape(r"\xZZ"), r"\xZZ");
        assert_eq!(unescape(r"\u12"), r"\u12");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn backslash_newline_is_a_line_continuation() {
        assert_eq!(unescape("a\\\nb"), "ab");
    }

    #[test]
    fn decodes_escaped_stream_bytes_end_to_end() {
        let raw = br"Name,City\r\nJos\xe9,S\xe3o Paulo\r\n";
        let rows = parse_report_stream(raw, ',').unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some("José"));
        assert_eq!(rows[0].get("City"), Some("São Paulo"));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let rows = parse_report_stream(b"A\r\nx\xffy\r\n", ',').unwrap();
        assert_eq!(rows[0].get("A"), Some("x\u{FFFD}y"));
    }
}
