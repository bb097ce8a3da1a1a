//! Simulation Framework
//!
//! Drives the scout against the market environment and aggregates results.
//!
//! # Runners
//!
//! - [`SimulationRunner`]: One run, period by period (choose, sample, observe, log)
//! - [`run_batch`]: Many independent runs for choice-probability curves
//! - [`compare_policies`]: One run per policy under identical configuration

mod batch;
mod runner;

pub use batch::{
    BatchResults, PolicyComparison, PolicyOutcome, compare_policies, run_batch, run_choice_series,
};
pub use runner::{PeriodLog, SimulationConfig, SimulationResults, SimulationRunner};
