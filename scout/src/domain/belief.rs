//! Conjugate Normal-Normal belief over a market's latent mean
//!
//! Model:
//!   mu ~ Normal(m, tau^2)
//!   y | mu ~ Normal(mu, sigma^2)   (sigma^2 known)
//!
//! After observing a batch y_1..y_n with mean y_bar the posterior is again
//! Normal. The update is done in precision form, which is exact:
//!   prec_post = 1/tau^2 + n/sigma^2
//!   m_post    = (m/tau^2 + n*y_bar/sigma^2) / prec_post

use crate::error::{Result, ScoutError};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Shared prior used to build one belief per market
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorSpec {
    /// Prior mean of the latent market mean (m0)
    pub mean: f64,
    /// Prior variance of the latent market mean (tau0^2)
    pub variance: f64,
    /// Assumed known variance of a single observation (sigma^2)
    pub obs_variance: f64,
}

impl Default for PriorSpec {
    /// Fairly diffuse prior
    fn default() -> Self {
        Self {
            mean: 0.0,
            variance: 4.0,
            obs_variance: 1.0,
        }
    }
}

impl PriorSpec {
    /// Check the prior without building a belief
    pub fn validate(&self) -> Result<()> {
        self.belief().map(|_| ())
    }

    /// Build a fresh belief from this prior
    pub fn belief(&self) -> Result<NormalBelief> {
        NormalBelief::new(self.mean, self.variance, self.obs_variance)
    }
}

/// Snapshot of a posterior, safe to hand to reporting code
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSummary {
    pub mean: f64,
    pub variance: f64,
}

/// Normal posterior over one market's latent mean quality
#[derive(Debug, Clone, PartialEq)]
pub struct NormalBelief {
    mean: f64,
    variance: f64,
    obs_variance: f64,
}

impl NormalBelief {
    /// Create a belief from prior mean, prior variance and known observation variance
    ///
    /// Both variances must be strictly positive and finite: a zero variance
    /// would mean exact knowledge and turn the precision update into infinities.
    pub fn new(mean: f64, variance: f64, obs_variance: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(ScoutError::InvalidMean {
                field: "prior mean",
                value: mean,
            });
        }
        check_variance("prior variance", variance)?;
        check_variance("observation variance", obs_variance)?;

        Ok(Self {
            mean,
            variance,
            obs_variance,
        })
    }

    /// Posterior mean
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Posterior variance (always > 0)
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Known observation variance (fixed for the belief's lifetime)
    pub fn obs_variance(&self) -> f64 {
        self.obs_variance
    }

    /// Posterior precision (1 / variance)
    pub fn precision(&self) -> f64 {
        1.0 / self.variance
    }

    /// Posterior standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn summary(&self) -> PosteriorSummary {
        PosteriorSummary {
            mean: self.mean,
            variance: self.variance,
        }
    }

    /// Incorporate a batch of i.i.d. signals
    ///
    /// An empty batch leaves the belief untouched. On error the belief is
    /// not modified.
    pub fn update(&mut self, signals: &[f64]) -> Result<()> {
        if signals.is_empty() {
            return Ok(());
        }
        if let Some(&bad) = signals.iter().find(|s| !s.is_finite()) {
            return Err(ScoutError::NonFiniteSignal(bad));
        }

        let n = signals.len() as f64;
        let y_bar = signals.iter().sum::<f64>() / n;

        let prior_prec = 1.0 / self.variance;
        let like_prec = n / self.obs_variance;
        let post_prec = prior_prec + like_prec;
        let post_var = 1.0 / post_prec;

        if !(post_var > 0.0 && post_var.is_finite()) {
            return Err(ScoutError::DegeneratePosterior {
                precision: post_prec,
            });
        }

        let post_mean = (prior_prec * self.mean + like_prec * y_bar) * post_var;
        if !post_mean.is_finite() {
            return Err(ScoutError::DegeneratePosterior {
                precision: post_prec,
            });
        }

        self.variance = post_var;
        self.mean = post_mean;
        Ok(())
    }

    /// Draw one value of the latent mean from the posterior
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        self.mean + self.std_dev() * z
    }
}

fn check_variance(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ScoutError::InvalidVariance { field, value })
    }
}
