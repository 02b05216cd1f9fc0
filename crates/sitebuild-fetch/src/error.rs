//! Error types for sitebuild-fetch.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no candidates configured")]
    NoCandidates,

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("body ended after {received} of {expected} bytes")]
    Truncated { received: u64, expected: u64 },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to write {path}: {source}")]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("destination has no file name: {0}")]
    InvalidDestination(PathBuf),

    #[error("all {attempted} candidates failed")]
    Exhausted { attempted: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
