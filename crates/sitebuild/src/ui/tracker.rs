use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use sitebuild_fetch::{FetchPhase, Progress};

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const SPINNER_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

static SPINNER_TEMPLATE: Lazy<Option<ProgressStyle>> =
    Lazy::new(|| ProgressStyle::with_template(SPINNER_STYLE).ok().map(|s| s.tick_chars(TICK)));

/// Terminal rendering of fetch progress.
///
/// The bar restarts whenever a new candidate begins downloading, so a
/// candidate that fails halfway does not leave its count behind. When the
/// bar is not drawn (stderr is not a terminal, or built `hidden`) progress
/// goes to the log instead, once per 10% step or per megabyte when the
/// length is unknown.
#[derive(Clone)]
pub struct ProgressTracker {
    pb:     ProgressBar,
    /// Last step written to the log, plus one; zero before the first.
    logged: Arc<AtomicU64>,
}

impl ProgressTracker {
    pub fn observe(&self, progress: &Progress) {
        match progress.phase {
            FetchPhase::Probing => {
                self.pb.set_message(format!("checking candidate {}", progress.candidate + 1));
                self.pb.tick();
            }
            FetchPhase::Downloading if progress.bytes_downloaded == 0 => self.restart(progress.total_bytes),
            FetchPhase::Downloading => {
                self.pb.set_position(progress.bytes_downloaded);
                if self.pb.is_hidden() {
                    self.log_step(progress);
                }
                match progress.percentage() {
                    Some(pct) => self.pb.set_message(format!("{pct:.1}% ({:.2} MB)", progress.megabytes())),
                    None => self.pb.set_message(format!("{:.2} MB", progress.megabytes())),
                }
            }
            FetchPhase::Committing => self.pb.set_message("finalizing"),
            FetchPhase::Completed => self.pb.finish_with_message(format!("{:.2} MB", progress.megabytes())),
        }
    }

    /// Callback for [`sitebuild_fetch::FetchOptions::on_progress`].
    pub fn callback(&self) -> Arc<dyn Fn(&Progress) + Send + Sync> {
        let tracker = self.clone();
        Arc::new(move |progress: &Progress| tracker.observe(progress))
    }

    /// Leave the bar on screen in its current state.
    pub fn abandon(&self) { self.pb.abandon(); }

    /// Log `progress` if it has reached a step not logged yet.
    fn log_step(&self, progress: &Progress) -> bool {
        let step = match progress.percentage() {
            Some(pct) => pct as u64 / 10,
            None => progress.megabytes() as u64,
        };
        if self.logged.fetch_max(step + 1, Ordering::Relaxed) > step {
            return false;
        }
        match progress.percentage() {
            Some(pct) => tracing::info!("Received {pct:.1}% ({:.2} MB)", progress.megabytes()),
            None => tracing::info!("Received {:.2} MB", progress.megabytes()),
        }
        true
    }

    fn restart(&self, total: Option<u64>) {
        self.pb.reset();
        self.logged.store(0, Ordering::Relaxed);
        let style = match total {
            Some(len) => {
                self.pb.set_length(len);
                PB_TEMPLATE.as_ref()
            }
            None => SPINNER_TEMPLATE.as_ref(),
        };
        if let Some(style) = style {
            self.pb.set_style(style.clone());
        }
        self.pb.set_message("downloading");
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerBuilder {
    prefix: Option<String>,
    hidden: bool,
}

impl ProgressTrackerBuilder {
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Track without drawing anything.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn build(self) -> ProgressTracker {
        let pb = if self.hidden { ProgressBar::hidden() } else { ProgressBar::no_length() };
        let pb = if let Some(style) = SPINNER_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };

        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        ProgressTracker {
            pb,
            logged: Arc::default(),
        }
    }
}
