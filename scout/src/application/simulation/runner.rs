//! Simulation Runner
//!
//! The period loop that coordinates the scout and the market environment.

use crate::application::{Policy, Scout};
use crate::domain::{MarketId, PosteriorSummary, PriorSpec};
use crate::error::{Result, ScoutError};
use crate::infrastructure::{Environment, MarketEnvironment, MarketSpec};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of periods (T)
    pub periods: u64,
    /// Participants observed per period in the chosen market (X)
    pub participants_per_period: usize,
    /// True market parameters
    pub markets: Vec<MarketSpec>,
    /// Shared prior for every market's latent mean
    pub prior: PriorSpec,
    /// Selection policy
    pub policy: Policy,
    /// Master seed; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    /// Three markets with true means 1, 2 and 3
    fn default() -> Self {
        Self {
            periods: 2000,
            participants_per_period: 10,
            markets: vec![
                MarketSpec::new(0, 1.0, 1.0, 0.5),
                MarketSpec::new(1, 2.0, 1.0, 0.5),
                MarketSpec::new(2, 3.0, 1.0, 0.5),
            ],
            prior: PriorSpec::default(),
            policy: Policy::default(),
            seed: Some(42),
        }
    }
}

impl SimulationConfig {
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_periods(mut self, periods: u64) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_participants(mut self, participants_per_period: usize) -> Self {
        self.participants_per_period = participants_per_period;
        self
    }

    /// Validate everything except the market list
    fn validate_schedule(&self) -> Result<()> {
        if self.periods == 0 {
            return Err(ScoutError::ZeroPeriods);
        }
        if self.participants_per_period == 0 {
            return Err(ScoutError::ZeroParticipants);
        }
        self.prior.validate()?;
        self.policy.validate()
    }

    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        self.validate_schedule()?;

        if self.markets.is_empty() {
            return Err(ScoutError::EmptyMarkets);
        }
        let mut seen = BTreeSet::new();
        for spec in &self.markets {
            spec.validate()?;
            if !seen.insert(spec.id) {
                return Err(ScoutError::DuplicateMarket(spec.id));
            }
        }
        Ok(())
    }

    /// Market ids in ascending order
    pub fn market_ids(&self) -> Vec<MarketId> {
        let ids: BTreeSet<MarketId> = self.markets.iter().map(|m| m.id).collect();
        ids.into_iter().collect()
    }
}

/// Driver-level log entry for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodLog {
    pub period: u64,
    pub market_id: MarketId,
    pub signals: Vec<f64>,
    pub best_signal_seen: Option<f64>,
}

/// Summary of a completed (or partial) run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResults {
    /// Policy used for the run
    pub policy: Policy,
    /// Periods simulated so far
    pub periods: u64,
    /// Number of periods each market was chosen (every market listed)
    pub choices_per_market: BTreeMap<MarketId, u64>,
    /// Best signal observed over the run
    pub best_signal_seen: Option<f64>,
    /// Final posterior per market
    pub posteriors: BTreeMap<MarketId, PosteriorSummary>,
}

/// The simulation runner coordinates the scout and the environment
pub struct SimulationRunner<E: Environment = MarketEnvironment> {
    config: SimulationConfig,
    environment: E,
    scout: Scout,
    logs: Vec<PeriodLog>,
    period: u64,
}

impl SimulationRunner<MarketEnvironment> {
    /// Create a runner with simulated markets built from the config
    ///
    /// One master RNG seeded from `config.seed` hands out child seeds: first
    /// to the scout, then to each market in ascending id order.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut master = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scout_seed = master.next_u64();
        let environment = MarketEnvironment::seeded(&config.markets, &mut master)?;

        Self::build(config, environment, Some(scout_seed))
    }
}

impl<E: Environment> SimulationRunner<E> {
    /// Create a runner over a caller-supplied environment
    ///
    /// The scout tracks the environment's markets; `config.markets` is not used.
    pub fn with_environment(config: SimulationConfig, environment: E) -> Result<Self> {
        config.validate_schedule()?;
        let seed = config.seed;
        Self::build(config, environment, seed)
    }

    fn build(config: SimulationConfig, environment: E, scout_seed: Option<u64>) -> Result<Self> {
        let scout = Scout::new(
            environment.market_ids(),
            config.prior,
            config.policy,
            scout_seed,
        )?;

        let periods = config.periods as usize;
        Ok(Self {
            config,
            environment,
            scout,
            logs: Vec::with_capacity(periods),
            period: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn scout(&self) -> &Scout {
        &self.scout
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Periods completed so far
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn is_finished(&self) -> bool {
        self.period >= self.config.periods
    }

    pub fn logs(&self) -> &[PeriodLog] {
        &self.logs
    }

    /// Run the remaining periods up to the horizon
    pub fn run(&mut self) -> Result<SimulationResults> {
        while !self.is_finished() {
            self.step()?;
        }

        let results = self.results();
        log::info!(
            "[sim] {} finished after {} periods: visits={:?} best_signal={:?}",
            self.config.policy,
            results.periods,
            results.choices_per_market,
            results.best_signal_seen
        );
        Ok(results)
    }

    /// Run a single period: choose, sample, observe, log
    pub fn step(&mut self) -> Result<&PeriodLog> {
        if self.is_finished() {
            return Err(ScoutError::HorizonReached(self.config.periods));
        }
        let period = self.period + 1;

        let market_id = self.scout.choose()?;
        let signals = self
            .environment
            .signals(market_id, self.config.participants_per_period)?;
        let best_signal_seen = self
            .scout
            .observe(period, market_id, &signals)?
            .best_signal_seen;

        log::debug!(
            "[sim] period {}: market={} signals={} best={:?}",
            period,
            market_id,
            signals.len(),
            best_signal_seen
        );

        let idx = self.logs.len();
        self.logs.push(PeriodLog {
            period,
            market_id,
            signals,
            best_signal_seen,
        });
        self.period = period;
        Ok(&self.logs[idx])
    }

    /// Summary of the periods run so far
    pub fn results(&self) -> SimulationResults {
        let mut choices_per_market: BTreeMap<MarketId, u64> =
            self.scout.market_ids().map(|id| (id, 0)).collect();
        for log in &self.logs {
            *choices_per_market.entry(log.market_id).or_insert(0) += 1;
        }

        SimulationResults {
            policy: self.config.policy,
            periods: self.period,
            choices_per_market,
            best_signal_seen: self.scout.best_signal_seen(),
            posteriors: self.scout.posterior_summaries(),
        }
    }
}
