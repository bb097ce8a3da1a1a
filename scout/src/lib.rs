//! Bayesian market scout
//!
//! A single scout repeatedly picks one of several markets of unknown quality,
//! observes noisy signals from sampled participants and updates a conjugate
//! Normal-Normal belief over each market's mean quality. Greedy,
//! epsilon-greedy and Thompson sampling policies can be compared under the
//! same generative assumptions.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-export key types at crate root
pub use application::simulation::{
    BatchResults, PeriodLog, PolicyComparison, PolicyOutcome, SimulationConfig,
    SimulationResults, SimulationRunner, compare_policies, run_batch, run_choice_series,
};
pub use application::{PeriodRecord, Policy, Scout};
pub use domain::{MarketId, NormalBelief, Participant, PosteriorSummary, PriorSpec};
pub use error::{Result, ScoutError};
pub use infrastructure::{Environment, Market, MarketEnvironment, MarketSpec};
