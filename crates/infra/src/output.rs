//! Report file output
//!
//! Persists parsed rows as a delimited file with a header row, or the
//! decoded report text verbatim.

use std::path::Path;

use csv::{Terminator, WriterBuilder};
use tracing::info;
use ultipro_core::delimiter_byte;
use ultipro_domain::{Result, RowRecord, UltiProError};

use crate::errors::InfraError;

/// Union of the row headers in first-seen order.
fn collect_headers(rows: &[RowRecord]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for header in rows.iter().flat_map(RowRecord::headers) {
        if !headers.iter().any(|h| h == header) {
            headers.push(header.to_string());
        }
    }
    headers
}

/// Write `rows` to `path` as a delimited file.
///
/// The header row is the union of all row headers in first-seen order;
/// cells a row lacks are written empty. Rows end with CRLF, matching the
/// report stream. An empty `rows` slice produces an empty file.
///
/// # Errors
/// `UltiProError::InvalidInput` for an unusable delimiter,
/// `UltiProError::Io` when the file cannot be written.
pub fn write_report(path: &Path, rows: &[RowRecord], delimiter: char) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_byte(delimiter)?)
        .terminator(Terminator::CRLF)
        .from_path(path)
        .map_err(InfraError::from)?;

    let headers = collect_headers(rows);
    if !headers.is_empty() {
        writer.write_record(&headers).map_err(InfraError::from)?;
    }
    for row in rows {
        writer
            .write_record(headers.iter().map(|h| row.get(h).unwrap_or_default()))
            .map_err(InfraError::from)?;
    }
    writer.flush().map_err(InfraError::from)?;

    info!(path = %path.display(), rows = rows.len(), columns = headers.len(), "Wrote report file");
    Ok(())
}

/// Write decoded report text to `path` unchanged.
///
/// # Errors
/// `UltiProError::Io` when the file cannot be written.
pub fn write_raw_report(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|e| {
        UltiProError::Io(format!("failed to write {}: {e}", path.display()))
    })?;
    info!(path = %path.display(), bytes = text.len(), "Wrote raw report file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use ultipro_core::parse_report;

    use super::*;

    fn row(cells: &[(&str, &str)]) -> RowRecord {
        cells.iter().copied().collect()
    }

    #[test]
    fn writes_header_row_and_cells_in_header_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let rows = vec![row(&[("Name", "Doe, Jane"), ("City", "Miami")]), row(&[("Name", "Roe")])];

        write_report(&path, &rows, ',').unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Name,City\r\n\"Doe, Jane\",Miami\r\nRoe,\r\n");
    }

    #[test]
    fn written_file_parses_back_with_same_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let rows = vec![row(&[("A", "1"), ("B", "x;y")]), row(&[("A", "2"), ("B", "line1\nline2")])];

        write_report(&path, &rows, ';').unwrap();

        let parsed = parse_report(&std::fs::read_to_string(&path).unwrap(), ';').unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn empty_rows_produce_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_report(&path, &[], ',').unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn rejects_unusable_delimiter_before_touching_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.csv");

        let err = write_report(&path, &[row(&[("A", "1")])], '§').unwrap_err();

        assert!(matches!(err, UltiProError::InvalidInput(_)));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("report.csv");

        assert!(matches!(write_report(&path, &[], ','), Err(UltiProError::Io(_))));
        assert!(matches!(write_raw_report(&path, "A"), Err(UltiProError::Io(_))));
    }

    #[test]
    fn raw_report_is_written_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.txt");

        write_raw_report(&path, "A,B\r\n1,2\r\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A,B\r\n1,2\r\n");
    }
}
