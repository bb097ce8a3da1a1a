//! Domain layer: beliefs, identifiers and participants

mod belief;
mod market_id;
mod participant;

pub use belief::{NormalBelief, PosteriorSummary, PriorSpec};
pub use market_id::MarketId;
pub use participant::Participant;
