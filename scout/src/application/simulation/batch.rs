//! Batch Runs
//!
//! Repeated independent simulations for choice-probability curves and
//! side-by-side policy comparison.
//!
//! Every run builds its own scout, markets and RNGs from its own seed, so
//! runs share no mutable state. Results are aggregated only after all runs
//! have returned. With the `parallel` feature runs execute on rayon's pool
//! unless `force_sequential` is set; output order always follows run order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::runner::{SimulationConfig, SimulationRunner};
use crate::application::Policy;
use crate::domain::MarketId;
use crate::error::{Result, ScoutError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-run outcome kept by a batch
struct RunOutcome {
    series: Vec<MarketId>,
    counts: BTreeMap<MarketId, u64>,
}

/// Results of many independent runs under one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResults {
    pub policy: Policy,
    pub runs: usize,
    pub periods: u64,
    pub markets: Vec<MarketId>,
    /// `choice_series[run][t]` is the market chosen at period t + 1
    pub choice_series: Vec<Vec<MarketId>>,
    /// Final visit counts per run
    pub final_counts: Vec<BTreeMap<MarketId, u64>>,
}

impl BatchResults {
    /// Fraction of runs choosing each market at each period
    pub fn choice_probabilities(&self) -> BTreeMap<MarketId, Vec<f64>> {
        let periods = self.periods as usize;
        let mut counts: BTreeMap<MarketId, Vec<u64>> = self
            .markets
            .iter()
            .map(|id| (*id, vec![0; periods]))
            .collect();

        for series in &self.choice_series {
            for (t, id) in series.iter().enumerate() {
                if let Some(slot) = counts.get_mut(id).and_then(|c| c.get_mut(t)) {
                    *slot += 1;
                }
            }
        }

        let runs = self.runs as f64;
        counts
            .into_iter()
            .map(|(id, c)| (id, c.into_iter().map(|n| n as f64 / runs).collect()))
            .collect()
    }

    /// Visit share per market, averaged over runs
    pub fn mean_visit_shares(&self) -> BTreeMap<MarketId, f64> {
        let mut shares: BTreeMap<MarketId, f64> =
            self.markets.iter().map(|id| (*id, 0.0)).collect();
        let denom = self.runs as f64 * self.periods as f64;

        for counts in &self.final_counts {
            for (id, n) in counts {
                *shares.entry(*id).or_insert(0.0) += *n as f64 / denom;
            }
        }
        shares
    }
}

/// Outcome of one policy in a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyOutcome {
    pub policy: Policy,
    pub name: &'static str,
    pub visit_counts: BTreeMap<MarketId, u64>,
    /// Percentage of periods spent in each market
    pub visit_shares: BTreeMap<MarketId, f64>,
    pub best_signal_seen: Option<f64>,
}

/// Side-by-side comparison of policies under one configuration and seed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyComparison {
    pub periods: u64,
    pub outcomes: Vec<PolicyOutcome>,
}

impl PolicyComparison {
    pub fn outcome(&self, name: &str) -> Option<&PolicyOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Run one simulation and return the market chosen at each period
pub fn run_choice_series(config: &SimulationConfig) -> Result<Vec<MarketId>> {
    run_single(config).map(|outcome| outcome.series)
}

/// Run `runs` independent simulations; run `i` uses seed `base + i`
pub fn run_batch(
    config: &SimulationConfig,
    runs: usize,
    force_sequential: bool,
) -> Result<BatchResults> {
    if runs == 0 {
        return Err(ScoutError::ZeroRuns);
    }
    config.validate()?;

    let base = config.seed.unwrap_or_else(rand::random);
    let seeds: Vec<u64> = (0..runs as u64).map(|i| base.wrapping_add(i)).collect();

    log::info!(
        "[batch] {} x {} periods with {} (base seed {})",
        runs,
        config.periods,
        config.policy,
        base
    );

    let outcomes = map_seeds(
        &seeds,
        |&seed| run_single(&config.clone().with_seed(seed)),
        force_sequential,
    )
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    let (choice_series, final_counts): (Vec<_>, Vec<_>) = outcomes
        .into_iter()
        .map(|o| (o.series, o.counts))
        .unzip();

    Ok(BatchResults {
        policy: config.policy,
        runs,
        periods: config.periods,
        markets: config.market_ids(),
        choice_series,
        final_counts,
    })
}

/// Run one simulation per policy with otherwise identical configuration
pub fn compare_policies(
    config: &SimulationConfig,
    policies: &[Policy],
) -> Result<PolicyComparison> {
    let mut outcomes = Vec::with_capacity(policies.len());

    for policy in policies {
        let mut runner = SimulationRunner::new(config.clone().with_policy(*policy))?;
        let results = runner.run()?;

        let periods = results.periods as f64;
        let visit_shares = results
            .choices_per_market
            .iter()
            .map(|(id, n)| (*id, *n as f64 / periods * 100.0))
            .collect();

        outcomes.push(PolicyOutcome {
            policy: *policy,
            name: policy.name(),
            visit_counts: results.choices_per_market,
            visit_shares,
            best_signal_seen: results.best_signal_seen,
        });
    }

    Ok(PolicyComparison {
        periods: config.periods,
        outcomes,
    })
}

fn run_single(config: &SimulationConfig) -> Result<RunOutcome> {
    let mut runner = SimulationRunner::new(config.clone())?;
    let results = runner.run()?;

    Ok(RunOutcome {
        series: runner.logs().iter().map(|l| l.market_id).collect(),
        counts: results.choices_per_market,
    })
}

fn map_seeds<F, R>(seeds: &[u64], f: F, force_sequential: bool) -> Vec<R>
where
    F: Fn(&u64) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        if force_sequential {
            seeds.iter().map(f).collect()
        } else {
            seeds.par_iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = force_sequential;
        seeds.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_config(policy: Policy) -> SimulationConfig {
        SimulationConfig::default()
            .with_policy(policy)
            .with_periods(60)
            .with_seed(7)
    }

    #[test]
    fn test_zero_runs_rejected() {
        let err = run_batch(&small_config(Policy::Greedy), 0, true).unwrap_err();
        assert_eq!(err, ScoutError::ZeroRuns);
    }

    #[test]
    fn test_batch_shapes() {
        let batch = run_batch(&small_config(Policy::Thompson), 8, true).unwrap();

        assert_eq!(batch.runs, 8);
        assert_eq!(batch.choice_series.len(), 8);
        assert!(batch.choice_series.iter().all(|s| s.len() == 60));
        assert_eq!(batch.markets, vec![MarketId(0), MarketId(1), MarketId(2)]);
        for counts in &batch.final_counts {
            assert_eq!(counts.values().sum::<u64>(), 60);
        }
    }

    #[test]
    fn test_choice_probabilities_sum_to_one() {
        let config = small_config(Policy::EpsilonGreedy { epsilon: 0.5 });
        let batch = run_batch(&config, 12, true).unwrap();
        let probs = batch.choice_probabilities();

        assert_eq!(probs.len(), 3);
        for t in 0..60 {
            let total: f64 = probs.values().map(|p| p[t]).sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        }

        let shares: f64 = batch.mean_visit_shares().values().sum();
        assert_abs_diff_eq!(shares, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_runs_use_distinct_seeds() {
        let config = small_config(Policy::EpsilonGreedy { epsilon: 1.0 });
        let batch = run_batch(&config, 4, true).unwrap();
        assert_ne!(batch.choice_series[0], batch.choice_series[1]);

        // Run i matches a standalone run with seed base + i
        let standalone = run_choice_series(&config.clone().with_seed(9)).unwrap();
        assert_eq!(batch.choice_series[2], standalone);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = small_config(Policy::Thompson);
        let sequential = run_batch(&config, 6, true).unwrap();
        let maybe_parallel = run_batch(&config, 6, false).unwrap();
        assert_eq!(sequential, maybe_parallel);
    }

    #[test]
    fn test_compare_policies() {
        let config = small_config(Policy::Greedy);
        let comparison = compare_policies(&config, &Policy::standard_set(0.1)).unwrap();

        assert_eq!(comparison.outcomes.len(), 3);
        assert_eq!(comparison.outcomes[0].name, "greedy");
        assert_eq!(comparison.outcomes[2].name, "thompson");

        for outcome in &comparison.outcomes {
            assert_eq!(outcome.visit_counts.values().sum::<u64>(), 60);
            let pct: f64 = outcome.visit_shares.values().sum();
            assert_abs_diff_eq!(pct, 100.0, epsilon = 1e-9);
        }
        assert!(comparison.outcome("epsilon_greedy").is_some());
        assert!(comparison.outcome("ucb").is_none());
    }
}
