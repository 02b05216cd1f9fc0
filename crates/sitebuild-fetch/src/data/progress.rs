use std::path::PathBuf;

use crate::data::options::FetchPhase;

/// Snapshot passed to the progress callback.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Index of the candidate being worked on.
    pub candidate: usize,

    pub phase: FetchPhase,

    /// Bytes written to the staging file so far.
    pub bytes_downloaded: u64,

    /// Total expected bytes, if the server sent Content-Length.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Percentage of completion, `None` if the total is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        self.total_bytes.map(|total| {
            if total == 0 {
                if self.is_completed() { 100.0 } else { 0.0 }
            } else {
                (self.bytes_downloaded as f64 / total as f64) * 100.0
            }
        })
    }

    /// Bytes downloaded expressed in MiB.
    #[must_use]
    pub fn megabytes(&self) -> f64 { self.bytes_downloaded as f64 / 1024.0 / 1024.0 }

    #[must_use]
    pub fn is_completed(&self) -> bool { self.phase == FetchPhase::Completed }
}

/// The candidate that was selected and written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub index: usize,
    pub url:   String,
    pub path:  PathBuf,
    pub bytes: u64,
}
