//! Infrastructure layer: simulated market environment
//!
//! Contains:
//! - **market**: Seeded market generators and the `Environment` seam used by the driver

mod market;

pub use market::{Environment, Market, MarketEnvironment, MarketSpec};
