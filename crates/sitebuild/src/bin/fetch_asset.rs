//! Download the background asset from the first working candidate.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use sitebuild::ui::tracker::ProgressTrackerBuilder;
use sitebuild::{Args, logging};
use sitebuild_fetch::{Error, Fetcher, ReqwestClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("failed to initialise logging: {e}");
    }
    let args = Args::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.load_config().context("failed to load configuration")?;
    let options = config.fetch_options();

    let client = match options.probe_timeout {
        Some(limit) => ReqwestClient::with_connect_timeout(limit)?,
        None => ReqwestClient::new()?,
    };

    let name = config
        .destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "asset".to_string());
    let tracker = ProgressTrackerBuilder::default().with_prefix(&name).build();
    let fetcher = Fetcher::new(client).with_options(options.on_progress(tracker.callback()));

    match fetcher.fetch(config.candidates.as_slice(), &config.destination).await {
        Ok(fetched) => {
            tracing::info!(url = %fetched.url, bytes = fetched.bytes, "Saved to {}", fetched.path.display());
            Ok(())
        }
        Err(e @ Error::Exhausted { .. }) => {
            tracker.abandon();
            Err(e).context("All candidates failed. Please check network or provide a direct URL.")
        }
        Err(e) => {
            tracker.abandon();
            Err(e.into())
        }
    }
}
