use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading the static corpus. Fatal at startup.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// A required corpus file does not exist
    #[error("corpus file not found: {}", .path.display())]
    Missing { path: PathBuf },
    /// The file exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON or does not have the expected shape
    #[error("malformed corpus file {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DataLoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            DataLoadError::Missing { path }
            | DataLoadError::Io { path, .. }
            | DataLoadError::Malformed { path, .. } => path,
        }
    }
}
