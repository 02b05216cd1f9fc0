use std::path::Path;

use futures_util::StreamExt;

use crate::data::{FetchOptions, FetchPhase, Fetched, Progress};
use crate::effects::http::HttpClient;
use crate::effects::staging::{StagedFile, discard, staging_path};
use crate::error::{Error, Result};

/// Downloads the first usable candidate out of an ordered list.
///
/// Candidates are tried strictly in list order, one request at a time. Each
/// is probed first; a candidate that passes is downloaded into a staging
/// file and renamed over the destination only once the body is complete.
pub struct Fetcher<C: HttpClient> {
    client:  C,
    options: FetchOptions,
}

/// A body that has been fully written to staging but not yet committed.
struct Transfer {
    staged:   StagedFile,
    received: u64,
    total:    Option<u64>,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: FetchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &C { &self.client }

    /// Fetch the first candidate that probes with HTTP 200 and downloads
    /// completely, writing it to `destination`.
    ///
    /// Probe failures of any kind only mark that candidate unavailable. A
    /// candidate that fails after probing is discarded along with any file
    /// at `destination`; if that removal fails the next candidate is still
    /// tried. When every candidate fails the destination and its staging
    /// file are removed and [`Error::Exhausted`] is returned, so neither
    /// holds partial content on return.
    pub async fn fetch<S: AsRef<str>>(&self, candidates: &[S], destination: &Path) -> Result<Fetched> {
        if candidates.is_empty() {
            return Err(Error::NoCandidates);
        }

        for (index, url) in candidates.iter().map(AsRef::as_ref).enumerate() {
            tracing::info!(candidate = index, url, "checking");
            self.report(Progress {
                candidate:        index,
                phase:            FetchPhase::Probing,
                bytes_downloaded: 0,
                total_bytes:      None,
            });

            if !self.probe(url).await {
                tracing::info!(candidate = index, url, "not available");
                continue;
            }
            tracing::info!(candidate = index, url, "available, downloading");

            match self.download(index, url, destination).await {
                Ok(bytes) => {
                    tracing::info!(path = %destination.display(), bytes, "saved");
                    return Ok(Fetched {
                        index,
                        url: url.to_string(),
                        path: destination.to_path_buf(),
                        bytes,
                    });
                }
                Err(e) => {
                    tracing::warn!(candidate = index, url, error = %e, "download failed");
                    if let Err(e) = discard(destination).await {
                        tracing::warn!(candidate = index, error = %e, "could not discard destination");
                    }
                }
            }
        }

        discard(destination).await?;
        discard(&staging_path(destination)?).await?;
        Err(Error::Exhausted {
            attempted: candidates.len(),
        })
    }

    /// Lightweight existence check. Only an exact 200 counts as available.
    pub async fn probe(&self, url: &str) -> bool {
        let outcome = match self.options.probe_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.client.head(url)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::debug!(url, ?limit, "probe timed out");
                    return false;
                }
            },
            None => self.client.head(url).await,
        };

        match outcome {
            Ok(200) => true,
            Ok(status) => {
                tracing::debug!(url, status, "probe rejected");
                false
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "probe failed");
                false
            }
        }
    }

    async fn download(&self, index: usize, url: &str, destination: &Path) -> Result<u64> {
        let transfer = match self.options.transfer_timeout {
            Some(limit) => tokio::time::timeout(limit, self.transfer(index, url, destination))
                .await
                .map_err(|_| Error::Timeout(limit))??,
            None => self.transfer(index, url, destination).await?,
        };

        self.report(Progress {
            candidate:        index,
            phase:            FetchPhase::Committing,
            bytes_downloaded: transfer.received,
            total_bytes:      transfer.total,
        });
        transfer.staged.commit().await?;

        self.report(Progress {
            candidate:        index,
            phase:            FetchPhase::Completed,
            bytes_downloaded: transfer.received,
            total_bytes:      transfer.total,
        });
        Ok(transfer.received)
    }

    async fn transfer(&self, index: usize, url: &str, destination: &Path) -> Result<Transfer> {
        let response = self.client.get(url).await.map_err(Self::map_error)?;
        if response.status != 200 {
            return Err(Error::Status {
                url:    url.to_string(),
                status: response.status,
            });
        }

        let total = response.content_length;
        let mut body = response.body;
        let mut staged = StagedFile::create(destination).await?;
        let mut received = 0u64;
        tracing::debug!(staging = %staged.path().display(), ?total, "streaming body");

        self.report(Progress {
            candidate:        index,
            phase:            FetchPhase::Downloading,
            bytes_downloaded: 0,
            total_bytes:      total,
        });

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(Self::map_error)?;
            staged.write(&chunk).await?;
            received += chunk.len() as u64;

            self.report(Progress {
                candidate:        index,
                phase:            FetchPhase::Downloading,
                bytes_downloaded: received,
                total_bytes:      total,
            });
        }

        if let Some(expected) = total
            && received != expected
        {
            return Err(Error::Truncated { received, expected });
        }

        Ok(Transfer {
            staged,
            received,
            total,
        })
    }

    fn map_error<E: std::error::Error>(e: E) -> Error { Error::Network(e.to_string()) }

    fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.options.on_progress {
            callback(&progress);
        }
    }
}
