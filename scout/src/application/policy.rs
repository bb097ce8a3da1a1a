//! Selection Policies
//!
//! Map the scout's current beliefs to the market to visit next.
//!
//! - **Greedy**: highest posterior mean (pure exploitation)
//! - **EpsilonGreedy**: uniform random market with probability epsilon, greedy otherwise
//! - **Thompson**: one posterior draw per market, highest draw wins
//!
//! Every policy receives the full posteriors through the same call; the
//! mean-based policies only read the means. Ties always go to the lowest
//! market id.

use crate::domain::{MarketId, NormalBelief};
use crate::error::{Result, ScoutError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Policy {
    Greedy,
    EpsilonGreedy {
        /// Exploration probability in [0, 1]
        epsilon: f64,
    },
    Thompson,
}

impl Default for Policy {
    fn default() -> Self {
        Self::EpsilonGreedy { epsilon: 0.1 }
    }
}

impl Policy {
    /// Stable label used in reports and logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::EpsilonGreedy { .. } => "epsilon_greedy",
            Self::Thompson => "thompson",
        }
    }

    /// The three policies compared by default
    pub fn standard_set(epsilon: f64) -> [Policy; 3] {
        [Self::Greedy, Self::EpsilonGreedy { epsilon }, Self::Thompson]
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::EpsilonGreedy { epsilon } if !(0.0..=1.0).contains(&epsilon) => {
                Err(ScoutError::InvalidEpsilon(epsilon))
            }
            _ => Ok(()),
        }
    }

    /// Select a market given the current beliefs
    pub fn select<R: Rng + ?Sized>(
        &self,
        beliefs: &BTreeMap<MarketId, NormalBelief>,
        rng: &mut R,
    ) -> Result<MarketId> {
        if beliefs.is_empty() {
            return Err(ScoutError::EmptyMarkets);
        }
        self.validate()?;

        let choice = match *self {
            Self::Greedy => greedy(beliefs),
            Self::EpsilonGreedy { epsilon } => {
                if rng.r#gen::<f64>() < epsilon {
                    uniform(beliefs, rng)
                } else {
                    greedy(beliefs)
                }
            }
            Self::Thompson => argmax(beliefs.iter().map(|(id, b)| (*id, b.sample(rng)))),
        };

        choice.ok_or(ScoutError::EmptyMarkets)
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EpsilonGreedy { epsilon } => write!(f, "epsilon_greedy(epsilon={epsilon})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

fn greedy(beliefs: &BTreeMap<MarketId, NormalBelief>) -> Option<MarketId> {
    argmax(beliefs.iter().map(|(id, b)| (*id, b.mean())))
}

fn uniform<R: Rng + ?Sized>(
    beliefs: &BTreeMap<MarketId, NormalBelief>,
    rng: &mut R,
) -> Option<MarketId> {
    let idx = rng.gen_range(0..beliefs.len());
    beliefs.keys().nth(idx).copied()
}

/// Highest value wins; input arrives in ascending id order and only a
/// strictly larger value replaces the incumbent, so ties keep the lowest id.
fn argmax(values: impl Iterator<Item = (MarketId, f64)>) -> Option<MarketId> {
    let mut best: Option<(MarketId, f64)> = None;
    for (id, value) in values {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((id, value)),
        }
    }
    best.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn beliefs(means: &[(u32, f64)], variance: f64) -> BTreeMap<MarketId, NormalBelief> {
        means
            .iter()
            .map(|&(id, m)| (MarketId(id), NormalBelief::new(m, variance, 1.0).unwrap()))
            .collect()
    }

    #[test]
    fn test_greedy_picks_highest_mean() {
        let b = beliefs(&[(0, 1.0), (1, 3.0), (2, 2.0)], 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Policy::Greedy.select(&b, &mut rng).unwrap(), MarketId(1));
    }

    #[test]
    fn test_greedy_tie_goes_to_lowest_id() {
        let b = beliefs(&[(5, 2.0), (3, 2.0), (9, 1.0), (7, 2.0)], 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(Policy::Greedy.select(&b, &mut rng).unwrap(), MarketId(3));
        }
    }

    #[test]
    fn test_epsilon_zero_equals_greedy() {
        let b = beliefs(&[(0, 0.5), (1, 0.4), (2, 0.7)], 1.0);
        let policy = Policy::EpsilonGreedy { epsilon: 0.0 };

        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..50 {
                assert_eq!(policy.select(&b, &mut rng).unwrap(), MarketId(2));
            }
        }
    }

    #[test]
    fn test_epsilon_one_is_uniform() {
        let b = beliefs(&[(0, 0.0), (1, 10.0), (2, -5.0)], 1.0);
        let policy = Policy::EpsilonGreedy { epsilon: 1.0 };
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = BTreeMap::new();
        for _ in 0..10_000 {
            *counts
                .entry(policy.select(&b, &mut rng).unwrap())
                .or_insert(0u32) += 1;
        }

        assert_eq!(counts.len(), 3);
        for (id, count) in counts {
            // expected 3333, sd ~47
            assert!(
                (3_100..=3_570).contains(&count),
                "market {id} chosen {count} times"
            );
        }
    }

    #[test]
    fn test_epsilon_validation() {
        let b = beliefs(&[(0, 0.0)], 1.0);
        let mut rng = StdRng::seed_from_u64(1);
        for eps in [-0.1, 1.5, f64::NAN] {
            let policy = Policy::EpsilonGreedy { epsilon: eps };
            assert!(policy.validate().is_err());
            assert!(policy.select(&b, &mut rng).is_err());
        }
    }

    #[test]
    fn test_thompson_prefers_dominant_posterior() {
        let b = beliefs(&[(0, 0.0), (1, 1.0), (2, 10.0)], 0.01);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(Policy::Thompson.select(&b, &mut rng).unwrap(), MarketId(2));
        }
    }

    #[test]
    fn test_thompson_redraws_each_call() {
        // Identical posteriors: every market should win sometimes
        let b = beliefs(&[(0, 0.0), (1, 0.0), (2, 0.0)], 1.0);
        let mut rng = StdRng::seed_from_u64(11);

        let mut seen = BTreeMap::new();
        for _ in 0..300 {
            *seen
                .entry(Policy::Thompson.select(&b, &mut rng).unwrap())
                .or_insert(0u32) += 1;
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_empty_beliefs_rejected() {
        let b = BTreeMap::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            Policy::Thompson.select(&b, &mut rng),
            Err(ScoutError::EmptyMarkets)
        ));
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&Policy::EpsilonGreedy { epsilon: 0.1 }).unwrap();
        assert_eq!(json, r#"{"kind":"epsilon_greedy","epsilon":0.1}"#);

        let parsed: Policy = serde_json::from_str(r#"{"kind":"thompson"}"#).unwrap();
        assert_eq!(parsed, Policy::Thompson);
    }
}
