//! Read-only access to the JSON sample files.

use crate::{CareError, CareResult};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a JSON data file.
///
/// An absent file is reported as [`CareError::DataFileMissing`] so callers can choose between a
/// fallback, a 404 and a 500. Parse failures carry the JSON path of the offending value.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CareResult<T> {
    if !path.is_file() {
        return Err(CareError::DataFileMissing(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(CareError::FileRead)?;
    let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);
    serde_path_to_error::deserialize(deserializer).map_err(|err| CareError::FileParse {
        path: path.to_path_buf(),
        location: err.path().to_string(),
        source: err.into_inner(),
    })
}

/// Like [`read_json`], but an absent file yields `None`.
pub fn read_optional_json<T: DeserializeOwned>(path: &Path) -> CareResult<Option<T>> {
    match read_json(path) {
        Ok(value) => Ok(Some(value)),
        Err(CareError::DataFileMissing(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_distinguished() {
        let dir = TempDir::new().expect("tempdir");
        let err = read_json::<serde_json::Value>(&dir.path().join("absent.json"))
            .expect_err("file is absent");
        assert!(err.is_missing_data());

        let none = read_optional_json::<serde_json::Value>(&dir.path().join("absent.json"))
            .expect("absent is not an error");
        assert!(none.is_none());
    }

    #[test]
    fn parse_error_reports_location() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"[{"n": 1}, {"n": "two"}]"#).expect("write");

        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Row {
            n: u32,
        }

        let err = read_json::<Vec<Row>>(&path).expect_err("second row is invalid");
        match err {
            CareError::FileParse { location, .. } => assert_eq!(location, "[1].n"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
