//! Reports
//!
//! Serializable wrappers around simulation output, printed as JSON by the
//! `scout` binary.

use scout::{
    BatchResults, MarketId, PeriodLog, Policy, PolicyComparison, Result, SimulationConfig,
    SimulationResults, SimulationRunner, compare_policies, run_batch,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Epsilon used for the epsilon-greedy entry when the config names another policy
pub const DEFAULT_EPSILON: f64 = 0.1;

/// Single run of the configured policy
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub config: SimulationConfig,
    pub results: SimulationResults,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<PeriodLog>>,
}

impl RunReport {
    pub fn build(config: &SimulationConfig, include_logs: bool) -> Result<Self> {
        let mut runner = SimulationRunner::new(config.clone())?;
        let results = runner.run()?;
        let logs = include_logs.then(|| runner.logs().to_vec());

        Ok(Self {
            config: config.clone(),
            results,
            logs,
        })
    }
}

/// One run per policy under the same configuration and seed
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub config: SimulationConfig,
    pub comparison: PolicyComparison,
}

impl ComparisonReport {
    pub fn build(config: &SimulationConfig) -> Result<Self> {
        let comparison = compare_policies(config, &policy_set(config))?;
        Ok(Self {
            config: config.clone(),
            comparison,
        })
    }
}

/// Choice-probability curve of one policy
#[derive(Debug, Clone, Serialize)]
pub struct PolicyCurves {
    pub policy: Policy,
    pub name: &'static str,
    pub runs: usize,
    /// Fraction of runs choosing each market at each period
    pub choice_probabilities: BTreeMap<MarketId, Vec<f64>>,
    pub mean_visit_shares: BTreeMap<MarketId, f64>,
}

impl PolicyCurves {
    fn from_batch(batch: &BatchResults) -> Self {
        Self {
            policy: batch.policy,
            name: batch.policy.name(),
            runs: batch.runs,
            choice_probabilities: batch.choice_probabilities(),
            mean_visit_shares: batch.mean_visit_shares(),
        }
    }
}

/// Choice-probability curves for every policy
#[derive(Debug, Clone, Serialize)]
pub struct CurvesReport {
    pub config: SimulationConfig,
    pub runs: usize,
    pub curves: Vec<PolicyCurves>,
}

impl CurvesReport {
    pub fn build(config: &SimulationConfig, runs: usize, force_sequential: bool) -> Result<Self> {
        let mut curves = Vec::new();
        for policy in policy_set(config) {
            let batch = run_batch(&config.clone().with_policy(policy), runs, force_sequential)?;
            log::info!(
                "[curves] {} done, mean visit shares {:?}",
                policy,
                batch.mean_visit_shares()
            );
            curves.push(PolicyCurves::from_batch(&batch));
        }

        Ok(Self {
            config: config.clone(),
            runs,
            curves,
        })
    }
}

/// Greedy, epsilon-greedy and Thompson, reusing the configured epsilon if any
pub fn policy_set(config: &SimulationConfig) -> [Policy; 3] {
    let epsilon = match config.policy {
        Policy::EpsilonGreedy { epsilon } => epsilon,
        _ => DEFAULT_EPSILON,
    };
    Policy::standard_set(epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_set_uses_configured_epsilon() {
        let config = SimulationConfig::default().with_policy(Policy::EpsilonGreedy { epsilon: 0.25 });
        let set = policy_set(&config);
        assert_eq!(set[1], Policy::EpsilonGreedy { epsilon: 0.25 });

        let config = SimulationConfig::default().with_policy(Policy::Thompson);
        assert_eq!(
            policy_set(&config)[1],
            Policy::EpsilonGreedy {
                epsilon: DEFAULT_EPSILON
            }
        );
    }

    #[test]
    fn test_run_report_logs_optional() {
        let config = SimulationConfig::default().with_periods(20);

        let report = RunReport::build(&config, false).unwrap();
        assert!(report.logs.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("logs").is_none());

        let report = RunReport::build(&config, true).unwrap();
        assert_eq!(report.logs.map(|l| l.len()), Some(20));
    }
}
