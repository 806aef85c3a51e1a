use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CareError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid orchestration request at {path}: {source}")]
    InvalidRequest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("data file not found: {}", .0.display())]
    DataFileMissing(PathBuf),
    #[error("failed to read data file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to parse data file {} at {location}: {source}", .path.display())]
    FileParse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing section in data file: {0}")]
    MissingSection(&'static str),
}

impl CareError {
    /// True when the failure means "no data" rather than a system error.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, CareError::DataFileMissing(_))
    }
}

pub type CareResult<T> = std::result::Result<T, CareError>;
