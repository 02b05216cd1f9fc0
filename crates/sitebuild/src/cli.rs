use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, Config};

/// Both utilities run without arguments; these only relocate the project.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Project root that relative paths are resolved against
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file [default: <root>/sitebuild.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn root(&self) -> PathBuf { self.root.clone().unwrap_or_else(config::default_root) }

    pub fn load_config(&self) -> figment::Result<Config> {
        Config::load(&self.root(), self.config.as_deref())
    }
}
