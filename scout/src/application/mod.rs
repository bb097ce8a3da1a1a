//! Application layer: decision making and orchestration
//!
//! Contains:
//! - **policy**: Greedy, epsilon-greedy and Thompson sampling selection
//! - **scout**: The Bayesian agent owning per-market beliefs
//! - **simulation**: Period loop, batch runs and policy comparison

mod policy;
mod scout;
pub mod simulation;

pub use policy::Policy;
pub use scout::{PeriodRecord, Scout};
