//! Scout Agent
//!
//! Bayesian learner over markets. Each period the driver calls `choose`,
//! fetches signals for the chosen market, then hands them back through
//! `observe`. The scout exclusively owns its beliefs: only `observe`
//! mutates them, everything else gets read-only views.

use crate::application::Policy;
use crate::domain::{MarketId, NormalBelief, PosteriorSummary, PriorSpec};
use crate::error::{Result, ScoutError};
use rand::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Immutable record of one observed period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodRecord {
    /// Period index (1-based)
    pub period: u64,
    /// Market visited
    pub market_id: MarketId,
    /// Signals observed this period
    pub signals: Vec<f64>,
    /// Best signal seen so far, after this period
    pub best_signal_seen: Option<f64>,
    /// Posterior means of all markets after the update
    pub posterior_means: BTreeMap<MarketId, f64>,
}

/// Scout agent
#[derive(Debug)]
pub struct Scout {
    beliefs: BTreeMap<MarketId, NormalBelief>,
    policy: Policy,
    rng: StdRng,
    best_signal_seen: Option<f64>,
    history: Vec<PeriodRecord>,
}

impl Scout {
    /// Create a scout with one prior belief per market
    pub fn new(
        market_ids: impl IntoIterator<Item = MarketId>,
        prior: PriorSpec,
        policy: Policy,
        seed: Option<u64>,
    ) -> Result<Self> {
        policy.validate()?;

        let mut beliefs = BTreeMap::new();
        for id in market_ids {
            if beliefs.insert(id, prior.belief()?).is_some() {
                return Err(ScoutError::DuplicateMarket(id));
            }
        }
        if beliefs.is_empty() {
            return Err(ScoutError::EmptyMarkets);
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            beliefs,
            policy,
            rng,
            best_signal_seen: None,
            history: Vec::new(),
        })
    }

    /// Pick the next market to visit; beliefs are left untouched
    pub fn choose(&mut self) -> Result<MarketId> {
        self.policy.select(&self.beliefs, &mut self.rng)
    }

    /// Ingest the signals observed in `market_id` during `period`
    pub fn observe(
        &mut self,
        period: u64,
        market_id: MarketId,
        signals: &[f64],
    ) -> Result<&PeriodRecord> {
        let belief = self
            .beliefs
            .get_mut(&market_id)
            .ok_or(ScoutError::UnknownMarket(market_id))?;
        belief.update(signals)?;

        self.record_payoff(signals);

        let record = PeriodRecord {
            period,
            market_id,
            signals: signals.to_vec(),
            best_signal_seen: self.best_signal_seen,
            posterior_means: self.posterior_means(),
        };
        log::trace!(
            "[scout] period {} posterior means {:?}",
            period,
            record.posterior_means
        );

        let idx = self.history.len();
        self.history.push(record);
        Ok(&self.history[idx])
    }

    fn record_payoff(&mut self, signals: &[f64]) {
        let Some(local_best) = signals.iter().copied().reduce(f64::max) else {
            return;
        };
        self.best_signal_seen = Some(match self.best_signal_seen {
            Some(best) => best.max(local_best),
            None => local_best,
        });
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn beliefs(&self) -> &BTreeMap<MarketId, NormalBelief> {
        &self.beliefs
    }

    pub fn belief(&self, market_id: MarketId) -> Option<&NormalBelief> {
        self.beliefs.get(&market_id)
    }

    pub fn market_ids(&self) -> impl Iterator<Item = MarketId> + '_ {
        self.beliefs.keys().copied()
    }

    /// Best single signal observed so far (`None` before any signal)
    pub fn best_signal_seen(&self) -> Option<f64> {
        self.best_signal_seen
    }

    pub fn history(&self) -> &[PeriodRecord] {
        &self.history
    }

    pub fn posterior_means(&self) -> BTreeMap<MarketId, f64> {
        self.beliefs.iter().map(|(id, b)| (*id, b.mean())).collect()
    }

    pub fn posterior_summary(&self, market_id: MarketId) -> Result<PosteriorSummary> {
        self.belief(market_id)
            .map(NormalBelief::summary)
            .ok_or(ScoutError::UnknownMarket(market_id))
    }

    pub fn posterior_summaries(&self) -> BTreeMap<MarketId, PosteriorSummary> {
        self.beliefs
            .iter()
            .map(|(id, b)| (*id, b.summary()))
            .collect()
    }
}
