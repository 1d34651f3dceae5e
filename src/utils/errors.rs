use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single counter sync call. Never shown to the user.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("sync worker unavailable")]
    Unavailable,
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Timeout
        } else if e.is_decode() {
            SyncError::Decode(e.to_string())
        } else {
            SyncError::Transport(e.to_string())
        }
    }
}

/// Failure while fetching or unpacking a bootstrap resource
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("download of {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    Checksum {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("archive {path} could not be extracted: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BootstrapError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Required image asset missing or undecodable. Fatal at startup.
#[derive(Debug, Error)]
#[error("failed to load asset {path}: {reason}")]
pub struct AssetError {
    pub path: PathBuf,
    pub reason: String,
}
