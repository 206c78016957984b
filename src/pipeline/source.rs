//! Record source: read the input CSV into `(identifier, payload)` records.
//!
//! The whole file is read into memory before parsing starts. Rows are then
//! pulled one at a time through [`RecordSource::next_record`] (or the
//! `Iterator` impl). There is no header row; blank lines are skipped and
//! every remaining row must have exactly two fields.

use crate::error::Csv2ImgError;
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// One parsed input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// 1-indexed line number the row started on.
    pub line: u64,
    /// Output file stem.
    pub id: String,
    /// Base64 image payload, exactly as it appeared in the file.
    pub payload: String,
}

impl Record {
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            line: 0,
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Whether `id` can be used as a single file-name component.
    ///
    /// Rejects empty names, `.`/`..`, and anything containing a path
    /// separator or NUL, any of which would let a row write outside the
    /// output directory.
    pub fn has_safe_id(&self) -> bool {
        let id = self.id.as_str();
        !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\', '\0'])
    }
}

/// Pull-based reader over an in-memory CSV buffer.
pub struct RecordSource {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    row: csv::StringRecord,
}

impl RecordSource {
    /// Read the file at `path` fully into memory and prepare to parse it.
    pub fn open(path: &Path) -> Result<Self, Csv2ImgError> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Csv2ImgError::InputNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Csv2ImgError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Csv2ImgError::InputRead {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(bytes))
    }

    /// Parse records from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(Cursor::new(bytes.into()));
        Self {
            reader,
            row: csv::StringRecord::new(),
        }
    }

    /// Return the next record, `Ok(None)` once the input is exhausted.
    pub fn next_record(&mut self) -> Result<Option<Record>, Csv2ImgError> {
        if !self.reader.read_record(&mut self.row)? {
            return Ok(None);
        }

        let line = self.row.position().map(|p| p.line()).unwrap_or(0);
        if self.row.len() != 2 {
            return Err(Csv2ImgError::MalformedRow {
                line,
                fields: self.row.len(),
            });
        }

        Ok(Some(Record {
            line,
            id: self.row[0].to_string(),
            payload: self.row[1].to_string(),
        }))
    }

    /// Drain the source, stopping at the first error.
    pub fn read_all(self) -> Result<Vec<Record>, Csv2ImgError> {
        self.collect()
    }
}

impl Iterator for RecordSource {
    type Item = Result<Record, Csv2ImgError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_two_field_rows() {
        let records = RecordSource::from_bytes("a,QUJD\nb,REVG\n")
            .read_all()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].payload, "QUJD");
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].id, "b");
        assert_eq!(records[1].line, 2);
    }

    #[test]
    fn first_row_is_data_not_header() {
        let records = RecordSource::from_bytes("id,payload\n").read_all().unwrap();
        assert_eq!(records, vec![Record { line: 1, ..Record::new("id", "payload") }]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let records = RecordSource::from_bytes("a,QUJD\n\n\nb,REVG").read_all().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn quoted_fields_are_unwrapped() {
        let records = RecordSource::from_bytes("\"x,y\",\"QUJD\"\n").read_all().unwrap();
        assert_eq!(records[0].id, "x,y");
        assert_eq!(records[0].payload, "QUJD");
    }

    #[test]
    fn three_fields_is_malformed() {
        let mut src = RecordSource::from_bytes("a,QUJD\nb,REVG,extra\n");
        assert!(src.next_record().unwrap().is_some());
        match src.next_record() {
            Err(Csv2ImgError::MalformedRow { line, fields }) => {
                assert_eq!(line, 2);
                assert_eq!(fields, 3);
            }
            other => panic!("expected MalformedRow, got {other:?}"),
        }
    }

    #[test]
    fn one_field_is_malformed() {
        let err = RecordSource::from_bytes("lonely\n").read_all().unwrap_err();
        assert!(matches!(err, Csv2ImgError::MalformedRow { fields: 1, .. }));
    }

    #[test]
    fn invalid_utf8_is_malformed_csv() {
        let err = RecordSource::from_bytes(b"a,\xff\xfe\n".to_vec())
            .read_all()
            .unwrap_err();
        assert!(matches!(err, Csv2ImgError::MalformedCsv { .. }), "got {err:?}");
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut src = RecordSource::from_bytes("");
        assert!(src.next_record().unwrap().is_none());
        assert!(src.next_record().unwrap().is_none());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = RecordSource::open(Path::new("/definitely/not/here.csv"))
            .err()
            .expect("open should fail");
        assert!(matches!(err, Csv2ImgError::InputNotFound { .. }));
    }

    #[test]
    fn safe_ids() {
        assert!(Record::new("img1", "").has_safe_id());
        assert!(Record::new("a.b-c_d", "").has_safe_id());
        assert!(!Record::new("", "").has_safe_id());
        assert!(!Record::new("..", "").has_safe_id());
        assert!(!Record::new("../etc/passwd", "").has_safe_id());
        assert!(!Record::new("a\\b", "").has_safe_id());
    }
}
