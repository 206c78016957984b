//! Fallback dump: write a failed record's raw payload to `<id>.txt`.

use crate::error::RecordError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path the dump for `id` is written to.
pub fn dump_path(output_dir: &Path, id: &str) -> PathBuf {
    output_dir.join(format!("{id}.txt"))
}

/// Write `payload` plus a trailing newline to `<output_dir>/<id>.txt`.
///
/// There is no fallback behind this one: an error here abandons the record.
pub fn dump_payload(output_dir: &Path, id: &str, payload: &str) -> Result<PathBuf, RecordError> {
    std::fs::create_dir_all(output_dir).map_err(|e| RecordError::output_write(output_dir, &e))?;

    let path = dump_path(output_dir, id);
    let mut contents = String::with_capacity(payload.len() + 1);
    contents.push_str(payload);
    contents.push('\n');

    std::fs::write(&path, contents).map_err(|e| RecordError::output_write(&path, &e))?;
    debug!("Dumped {} bytes → {}", payload.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_payload_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dump_payload(dir.path(), "bad1", "not-valid-base64!!").unwrap();
        assert_eq!(path, dir.path().join("bad1.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not-valid-base64!!\n");
    }

    #[test]
    fn overwrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        dump_payload(dir.path(), "x", "a much longer first payload").unwrap();
        let path = dump_payload(dir.path(), "x", "short").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "short\n");
    }

    #[test]
    fn creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        dump_payload(&out, "x", "").unwrap();
        assert_eq!(std::fs::read_to_string(out.join("x.txt")).unwrap(), "\n");
    }
}
