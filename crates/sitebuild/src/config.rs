//! Paths and candidate URLs for both utilities.
//!
//! Values are layered: built-in defaults, then `sitebuild.toml` in the
//! project root, then `SITEBUILD_*` environment variables. Relative paths
//! are resolved against the project root after extraction.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sitebuild_fetch::FetchOptions;
use sitebuild_fs::{SymlinkPolicy, SyncOptions};

pub const CONFIG_FILE: &str = "sitebuild.toml";
pub const ENV_PREFIX: &str = "SITEBUILD_";

const DEFAULT_CANDIDATES: [&str; 3] = [
    "https://cdn.pixabay.com/video/2017/11/06/188121-881834196_large.mp4",
    "https://cdn.pixabay.com/video/2021/11/11/95462-645084454_large.mp4",
    "https://cdn.pixabay.com/video/2025/04/22/273567_large.mp4",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trees mirrored into the output, in layering order.
    pub source_dirs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Remote locations for the fetched asset, in priority order.
    pub candidates: Vec<String>,
    pub destination: PathBuf,
    pub symlinks: SymlinkPolicy,
    /// Zero disables the limit.
    pub probe_timeout_secs: Option<u64>,
    /// Zero disables the limit.
    pub transfer_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dirs:           vec![PathBuf::from("views"), PathBuf::from("public")],
            output_dir:            PathBuf::from("dist"),
            candidates:            DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            destination:           PathBuf::from("public").join("bg.mp4"),
            symlinks:              SymlinkPolicy::Skip,
            probe_timeout_secs:    Some(15),
            transfer_timeout_secs: Some(600),
        }
    }
}

impl Config {
    /// Extract the layered configuration and resolve it against `root`.
    ///
    /// A missing config file is not an error.
    pub fn load(root: &Path, file: Option<&Path>) -> figment::Result<Self> {
        let file = file.map_or_else(|| root.join(CONFIG_FILE), Path::to_path_buf);
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        Ok(config.resolve(root))
    }

    pub fn resolve(mut self, root: &Path) -> Self {
        for dir in &mut self.source_dirs {
            *dir = root.join(&*dir);
        }
        self.output_dir = root.join(&self.output_dir);
        self.destination = root.join(&self.destination);
        self
    }

    pub fn sync_options(&self) -> SyncOptions { SyncOptions::new().symlinks(self.symlinks) }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions::default().timeouts_from_secs(self.probe_timeout_secs, self.transfer_timeout_secs)
    }
}

/// The repository root, two levels above this crate's manifest.
pub fn default_root() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.ancestors().nth(2).unwrap_or(manifest).to_path_buf()
}
