//! freqplot: rolling per-core CPU clock frequency view in the terminal.
//!
//! Run with:  `RUST_LOG=info freqplot --cores 0,1,2,3`

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use freq_core::Renderer;
use freq_renderer::TerminalRenderer;
use freq_system::{source, spawn_sampler, SampleController};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("freqplot v{} starting", env!("CARGO_PKG_VERSION"));

    let args = cli::Args::parse();
    let path = args.config.clone().unwrap_or_else(freq_config::default_path);
    let mut config = freq_config::load(&path)?;
    args.apply(&mut config);
    config.validate()?;

    let sampling = &config.sampling;
    let mut frequency_source = source::open(sampling.strategy);
    let cores = match &sampling.cores {
        Some(cores) => cores.clone(),
        None => frequency_source
            .cores()
            .context("cannot discover CPU cores")?,
    };

    let mut controller = SampleController::new(sampling.history);
    controller
        .initialize(cores, frequency_source)
        .with_context(|| format!("cannot start {} sampling", sampling.strategy))?;

    let (sampler, mut snapshots) =
        spawn_sampler(controller, Duration::from_millis(sampling.interval_ms))?;
    let mut renderer = TerminalRenderer::from_config(&config.display, std::io::stdout());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut stopping = false;

    loop {
        tokio::select! {
            snapshot = snapshots.recv() => match snapshot {
                Some(snapshot) => renderer.render(&snapshot)?,
                None => break,
            },
            _ = &mut ctrl_c, if !stopping => {
                tracing::info!("Interrupted; finishing current tick");
                sampler.stop();
                stopping = true;
            }
        }
    }

    let controller = sampler.join().await?;
    tracing::info!("Stopped ({})", controller.state());
    Ok(())
}
