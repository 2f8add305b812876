use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{IngestError, Result};

const JSON_INDENT: &[u8] = b"    ";

/// Serialize `value` as pretty-printed JSON (4-space indent) into `path`.
///
/// The parent directory is created if it doesn't exist. An existing file is
/// overwritten.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    // Ensure the parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::io(parent, e))?;
    }

    let mut json = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut json, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| IngestError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    json.push(b'\n');

    let mut file = fs::File::create(path).map_err(|e| IngestError::io(path, e))?;
    file.write_all(&json).map_err(|e| IngestError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("report.json");

        write_json_pretty(&path, &json!({"total_images": 3})).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"total_images\": 3"));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_images"], 3);
    }

    #[test]
    fn overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        write_json_pretty(&path, &json!({"run": 1, "extra": true})).unwrap();
        write_json_pretty(&path, &json!({"run": 2})).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, json!({"run": 2}));
    }

    #[test]
    fn write_failure_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();

        let err = write_json_pretty(&blocker.join("report.json"), &json!({})).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
