//! Market Environment
//!
//! Stochastic generators standing in for the real markets. Each market has
//! true parameters the scout never sees directly, only through noisy
//! participant signals.

use crate::domain::{MarketId, Participant};
use crate::error::{Result, ScoutError};
use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// True parameters of a market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSpec {
    #[serde(alias = "market_id")]
    pub id: MarketId,
    /// Mean participant quality
    #[serde(alias = "mu_true")]
    pub true_mean: f64,
    /// Standard deviation of participant quality
    #[serde(alias = "sigma_true")]
    pub true_sd: f64,
    /// Standard deviation of the noise added to each signal
    pub signal_noise_sd: f64,
}

impl MarketSpec {
    pub fn new(id: u32, true_mean: f64, true_sd: f64, signal_noise_sd: f64) -> Self {
        Self {
            id: MarketId(id),
            true_mean,
            true_sd,
            signal_noise_sd,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.true_mean.is_finite() {
            return Err(ScoutError::InvalidMean {
                field: "true mean",
                value: self.true_mean,
            });
        }
        check_sd(self.id, "true sd", self.true_sd)?;
        check_sd(self.id, "signal noise sd", self.signal_noise_sd)?;
        Ok(())
    }
}

fn check_sd(market: MarketId, field: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ScoutError::InvalidStdDev {
            market,
            field,
            value,
        })
    }
}

/// A single market with its own random stream
#[derive(Debug)]
pub struct Market {
    spec: MarketSpec,
    quality: Normal<f64>,
    noise: Normal<f64>,
    rng: StdRng,
}

impl Market {
    /// Create a market; `None` seeds from entropy
    pub fn new(spec: MarketSpec, seed: Option<u64>) -> Result<Self> {
        spec.validate()?;

        let quality = Normal::new(spec.true_mean, spec.true_sd).map_err(|_| {
            ScoutError::InvalidStdDev {
                market: spec.id,
                field: "true sd",
                value: spec.true_sd,
            }
        })?;
        let noise = Normal::new(0.0, spec.signal_noise_sd).map_err(|_| {
            ScoutError::InvalidStdDev {
                market: spec.id,
                field: "signal noise sd",
                value: spec.signal_noise_sd,
            }
        })?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            spec,
            quality,
            noise,
            rng,
        })
    }

    pub fn id(&self) -> MarketId {
        self.spec.id
    }

    pub fn spec(&self) -> &MarketSpec {
        &self.spec
    }

    /// Draw `count` participants with quality ~ N(true_mean, true_sd^2)
    pub fn sample_participants(&mut self, count: usize) -> Vec<Participant> {
        (0..count)
            .map(|_| Participant::new(self.quality.sample(&mut self.rng)))
            .collect()
    }

    /// Attach a noisy signal to each participant and return the signals in order
    pub fn observe_signals(&mut self, participants: &mut [Participant]) -> Vec<f64> {
        participants
            .iter_mut()
            .map(|p| {
                let signal = p.quality + self.noise.sample(&mut self.rng);
                p.set_signal(signal);
                signal
            })
            .collect()
    }
}

/// Source of signals for the simulation driver
pub trait Environment {
    /// Market identifiers, ascending
    fn market_ids(&self) -> Vec<MarketId>;

    /// Sample `count` participants from a market and return their signals
    fn signals(&mut self, market_id: MarketId, count: usize) -> Result<Vec<f64>>;
}

/// Environment backed by simulated markets
#[derive(Debug)]
pub struct MarketEnvironment {
    markets: BTreeMap<MarketId, Market>,
}

impl MarketEnvironment {
    /// Build from already constructed markets
    pub fn new(markets: Vec<Market>) -> Result<Self> {
        if markets.is_empty() {
            return Err(ScoutError::EmptyMarkets);
        }

        let mut map = BTreeMap::new();
        for market in markets {
            let id = market.id();
            if map.insert(id, market).is_some() {
                return Err(ScoutError::DuplicateMarket(id));
            }
        }
        Ok(Self { markets: map })
    }

    /// Build from specs, drawing one child seed per market (ascending id)
    pub fn seeded<R: RngCore + ?Sized>(specs: &[MarketSpec], seeds: &mut R) -> Result<Self> {
        let mut sorted = specs.to_vec();
        sorted.sort_by_key(|s| s.id);

        let markets = sorted
            .into_iter()
            .map(|spec| Market::new(spec, Some(seeds.next_u64())))
            .collect::<Result<Vec<_>>>()?;

        Self::new(markets)
    }

    pub fn market(&self, market_id: MarketId) -> Option<&Market> {
        self.markets.get(&market_id)
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl Environment for MarketEnvironment {
    fn market_ids(&self) -> Vec<MarketId> {
        self.markets.keys().copied().collect()
    }

    fn signals(&mut self, market_id: MarketId, count: usize) -> Result<Vec<f64>> {
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or(ScoutError::UnknownMarket(market_id))?;

        let mut participants = market.sample_participants(count);
        Ok(market.observe_signals(&mut participants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: u32, mean: f64) -> MarketSpec {
        MarketSpec::new(id, mean, 1.0, 0.5)
    }

    #[test]
    fn test_sample_participants_count() {
        let mut market = Market::new(spec(0, 1.0), Some(42)).unwrap();
        let players = market.sample_participants(10);
        assert_eq!(players.len(), 10);
        assert!(players.iter().all(|p| p.signal.is_none()));
    }

    #[test]
    fn test_signals_attached_in_order() {
        let mut market = Market::new(spec(0, 1.0), Some(42)).unwrap();
        let mut players = market.sample_participants(5);
        let signals = market.observe_signals(&mut players);

        assert_eq!(signals.len(), 5);
        for (p, s) in players.iter().zip(&signals) {
            assert_eq!(p.signal, Some(*s));
        }
    }

    #[test]
    fn test_zero_noise_signal_equals_quality() {
        let mut market = Market::new(MarketSpec::new(1, 2.0, 1.0, 0.0), Some(1)).unwrap();
        let mut players = market.sample_participants(20);
        let signals = market.observe_signals(&mut players);

        for (p, s) in players.iter().zip(signals) {
            assert_eq!(p.quality, s);
        }
    }

    #[test]
    fn test_empirical_mean_near_truth() {
        let mut market = Market::new(spec(0, 3.0), Some(7)).unwrap();
        let mut players = market.sample_participants(20_000);
        let signals = market.observe_signals(&mut players);

        let mean = signals.iter().sum::<f64>() / signals.len() as f64;
        let var = signals.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / signals.len() as f64;

        assert!((mean - 3.0).abs() < 0.05, "signal mean {mean}");
        // quality variance 1.0 + noise variance 0.25
        assert!((var - 1.25).abs() < 0.08, "signal variance {var}");
    }

    #[test]
    fn test_deterministic_with_seed() {
        let mut m1 = Market::new(spec(0, 1.0), Some(99)).unwrap();
        let mut m2 = Market::new(spec(0, 1.0), Some(99)).unwrap();

        let mut p1 = m1.sample_participants(8);
        let mut p2 = m2.sample_participants(8);
        assert_eq!(m1.observe_signals(&mut p1), m2.observe_signals(&mut p2));
    }

    #[test]
    fn test_spec_validation() {
        assert!(MarketSpec::new(0, 1.0, -1.0, 0.5).validate().is_err());
        assert!(MarketSpec::new(0, 1.0, 1.0, f64::NAN).validate().is_err());
        assert!(MarketSpec::new(0, f64::INFINITY, 1.0, 0.5).validate().is_err());
        assert!(MarketSpec::new(0, 1.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_environment_rejects_empty_and_duplicates() {
        assert!(matches!(
            MarketEnvironment::new(Vec::new()),
            Err(ScoutError::EmptyMarkets)
        ));

        let markets = vec![
            Market::new(spec(1, 1.0), Some(1)).unwrap(),
            Market::new(spec(1, 2.0), Some(2)).unwrap(),
        ];
        assert!(matches!(
            MarketEnvironment::new(markets),
            Err(ScoutError::DuplicateMarket(MarketId(1)))
        ));
    }

    #[test]
    fn test_environment_signals() {
        let mut seeds = StdRng::seed_from_u64(5);
        let specs = [spec(2, 3.0), spec(0, 1.0), spec(1, 2.0)];
        let mut env = MarketEnvironment::seeded(&specs, &mut seeds).unwrap();

        assert_eq!(env.market_ids(), vec![MarketId(0), MarketId(1), MarketId(2)]);
        assert_eq!(env.signals(MarketId(1), 10).unwrap().len(), 10);
        assert!(matches!(
            env.signals(MarketId(9), 10),
            Err(ScoutError::UnknownMarket(MarketId(9)))
        ));
    }

    #[test]
    fn test_spec_deserializes_legacy_field_names() {
        let json = r#"{"market_id": 3, "mu_true": 1.5, "sigma_true": 1.0, "signal_noise_sd": 0.5}"#;
        let spec: MarketSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.id, MarketId(3));
        assert_eq!(spec.true_mean, 1.5);
    }
}
