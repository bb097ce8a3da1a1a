//! Scout - Bayesian market scout simulation
//!
//! Usage:
//!   cargo run --bin scout -- [run|compare|curves] [CONFIG] [--log] [--runs N] [--out PATH]

use anyhow::{Context, Result};
use log::info;
use scout_runner::{
    Args, Command, ComparisonReport, CurvesReport, RunReport, load_config, load_default_config,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_or_exit();

    let config = match &args.config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_default_config().context("Failed to load embedded config")?,
    };

    info!(
        "Scout: {} markets, {} periods, {} participants/period, seed {:?}",
        config.markets.len(),
        config.periods,
        config.participants_per_period,
        config.seed
    );

    let json = match args.command {
        Command::Run => {
            let report = RunReport::build(&config, args.log)?;
            serde_json::to_string_pretty(&report)?
        }
        Command::Compare => {
            let report = ComparisonReport::build(&config)?;
            for outcome in &report.comparison.outcomes {
                info!("{} visit shares (%): {:?}", outcome.name, outcome.visit_shares);
            }
            serde_json::to_string_pretty(&report)?
        }
        Command::Curves => {
            let report = CurvesReport::build(&config, args.runs, args.sequential)?;
            serde_json::to_string_pretty(&report)?
        }
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
