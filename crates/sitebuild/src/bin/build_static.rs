//! Rebuild the output tree from the views and public asset trees.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use sitebuild::{Args, logging};
use sitebuild_fs::synchronize;

fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("failed to initialise logging: {e}");
    }
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Build failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.load_config().context("failed to load configuration")?;

    tracing::info!("Building static site into {}", config.output_dir.display());
    let report = synchronize(config.source_dirs.as_slice(), &config.output_dir, config.sync_options())?;

    let total = report.total();
    if total.skipped > 0 {
        tracing::warn!(skipped = total.skipped, "some entries were not copied");
    }
    tracing::info!("Done. Static site ready in {}", report.output.display());
    Ok(())
}
