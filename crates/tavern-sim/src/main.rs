#![doc = include_str!("../README.md")]

mod sim;

use anyhow::bail;
use clap::Parser;
use sim::config::{CliArgs, RunConfig};
use sim::output::{Summary, Vocabulary};
use sim::telemetry::init_telemetry;

// mimalloc for lower allocator contention across worker threads.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let RunConfig { simulation, stop } = config;
    let report = simulation.run_until(|coordinator| stop.wait(coordinator))?;

    print!(
        "{}",
        Summary {
            report: &report,
            words: Vocabulary::for_layout(&simulation.layout),
        }
    );

    if !report.is_conserved() {
        bail!("resource uses do not add up to the number of successes");
    }
    Ok(())
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting simulation with full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting {} workers over {:?}",
            config.simulation.workers,
            config.simulation.layout
        );
    }
}
