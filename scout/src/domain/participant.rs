//! Participant
//!
//! Ephemeral entity drawn from a market each period. Carries a latent
//! quality and, once observed, a noisy signal of it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Participant {
    /// Latent quality, never shown to the scout
    pub quality: f64,
    /// Observed signal (quality + noise), set by the market
    pub signal: Option<f64>,
}

impl Participant {
    pub fn new(quality: f64) -> Self {
        Self {
            quality,
            signal: None,
        }
    }

    pub fn set_signal(&mut self, value: f64) {
        self.signal = Some(value);
    }

    pub fn is_observed(&self) -> bool {
        self.signal.is_some()
    }
}
