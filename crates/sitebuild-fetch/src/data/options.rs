use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::progress::Progress;

/// Phases a single candidate moves through.
///
/// Probing → Downloading → Committing → Completed. A failure in any phase
/// sends the fetcher back to Probing for the next candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Existence check (HEAD) in flight.
    #[default]
    Probing,

    /// Body is streaming into the staging file.
    Downloading,

    /// Staging file is being synced and renamed over the destination.
    Committing,

    /// Destination holds the complete asset.
    Completed,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPhase::Probing => write!(f, "Probing"),
            FetchPhase::Downloading => write!(f, "Downloading"),
            FetchPhase::Committing => write!(f, "Committing"),
            FetchPhase::Completed => write!(f, "Completed"),
        }
    }
}

/// Configuration for a candidate fetch.
///
/// # Examples
///
/// ```
/// use sitebuild_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .probe_timeout(Some(Duration::from_secs(5)))
///     .transfer_timeout(None);
/// ```
#[derive(Clone)]
pub struct FetchOptions {
    /// Upper bound for the probe request of one candidate.
    ///
    /// An elapsed probe counts as "unavailable". `None` waits forever.
    ///
    /// Default: 15s
    pub probe_timeout: Option<Duration>,

    /// Upper bound for the whole retrieval of one candidate, from sending
    /// the request to the last body chunk.
    ///
    /// An elapsed transfer is discarded like any mid-stream failure.
    /// `None` waits forever.
    ///
    /// Default: 600s
    pub transfer_timeout: Option<Duration>,

    /// Invoked on phase transitions and after every chunk written.
    ///
    /// Default: None
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("probe_timeout", &self.probe_timeout)
            .field("transfer_timeout", &self.transfer_timeout)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            probe_timeout:    Some(Duration::from_secs(15)),
            transfer_timeout: Some(Duration::from_secs(600)),
            on_progress:      None,
        }
    }
}

impl FetchOptions {
    /// Build both limits from whole seconds, where zero or `None` means no
    /// limit.
    #[must_use]
    pub fn timeouts_from_secs(self, probe: Option<u64>, transfer: Option<u64>) -> Self {
        self.probe_timeout(secs(probe)).transfer_timeout(secs(transfer))
    }

    #[must_use]
    pub fn probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }

    #[must_use]
    pub fn transfer_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    /// Set the progress callback.
    ///
    /// # Examples
    ///
    /// ```
    /// use sitebuild_fetch::{FetchOptions, FetchPhase, Progress};
    /// use std::sync::Arc;
    ///
    /// let options = FetchOptions::default()
    ///     .on_progress(Arc::new(|progress: &Progress| {
    ///         if progress.phase == FetchPhase::Downloading {
    ///             if let Some(pct) = progress.percentage() {
    ///                 eprint!("\rReceived {:.1}%", pct);
    ///             }
    ///         }
    ///     }));
    /// ```
    #[must_use]
    pub fn on_progress(mut self, on_progress: Arc<dyn Fn(&Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }
}

fn secs(value: Option<u64>) -> Option<Duration> { value.filter(|s| *s > 0).map(Duration::from_secs) }
