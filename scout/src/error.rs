//! Scout errors

use crate::domain::MarketId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoutError {
    #[error("Simulation config: periods must be positive")]
    ZeroPeriods,

    #[error("Simulation config: participants per period must be positive")]
    ZeroParticipants,

    #[error("Batch: number of runs must be positive")]
    ZeroRuns,

    #[error("Environment: at least one market is required")]
    EmptyMarkets,

    #[error("Environment: duplicate market id {0}")]
    DuplicateMarket(MarketId),

    #[error("Unknown market: {0}")]
    UnknownMarket(MarketId),

    #[error("Belief: {field} must be strictly positive and finite, got {value}")]
    InvalidVariance { field: &'static str, value: f64 },

    #[error("Belief: {field} must be finite, got {value}")]
    InvalidMean { field: &'static str, value: f64 },

    #[error("Market {market}: {field} must be non-negative and finite, got {value}")]
    InvalidStdDev {
        market: MarketId,
        field: &'static str,
        value: f64,
    },

    #[error("Policy: epsilon must lie in [0, 1], got {0}")]
    InvalidEpsilon(f64),

    #[error("Belief: observed signal must be finite, got {0}")]
    NonFiniteSignal(f64),

    #[error("Belief: posterior precision {precision} leaves no positive finite variance")]
    DegeneratePosterior { precision: f64 },

    #[error("Simulation: horizon of {0} periods already reached")]
    HorizonReached(u64),
}

pub type Result<T> = std::result::Result<T, ScoutError>;
