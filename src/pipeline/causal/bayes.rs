//! Bayesian logistic estimator.
//!
//! Two-parameter outcome model P(Y=1) = sigmoid(alpha + tau * W) with
//! Normal(0, 5) priors, sampled by seeded random-walk Metropolis chains.
//! The step size adapts during the tuning draws only, so the retained
//! draws come from a fixed kernel. This estimator is optional end to end:
//! when disabled, or when sampling degenerates, it reports `None` and the
//! rest of the pipeline is unaffected.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::BayesConfig;
use crate::pipeline::causal::bootstrap::percentile;

/// Prior standard deviation for both coefficients.
const PRIOR_SD: f64 = 5.0;
/// Initial random-walk step size.
const INITIAL_STEP: f64 = 0.1;
/// Adaptation window during tuning.
const ADAPT_WINDOW: usize = 50;

/// Posterior summary of the treatment coefficient tau (log-odds scale).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BayesEstimate {
    /// Posterior mean of tau
    pub mean: f64,
    /// 2.5th percentile of the posterior draws
    pub lower: f64,
    /// 97.5th percentile of the posterior draws
    pub upper: f64,
}

/// Sufficient statistics of the binary outcome per arm; the likelihood
/// depends on the data only through these four counts.
struct ArmCounts {
    exposed_total: f64,
    exposed_positive: f64,
    control_total: f64,
    control_positive: f64,
}

impl ArmCounts {
    fn from_rows(w: &[f64], y: &[f64]) -> Self {
        let mut counts = Self {
            exposed_total: 0.0,
            exposed_positive: 0.0,
            control_total: 0.0,
            control_positive: 0.0,
        };
        for (wi, yi) in w.iter().zip(y.iter()) {
            if *wi > 0.5 {
                counts.exposed_total += 1.0;
                counts.exposed_positive += yi;
            } else {
                counts.control_total += 1.0;
                counts.control_positive += yi;
            }
        }
        counts
    }
}

/// Fit the Bayesian estimator. Returns `None` when disabled or when
/// sampling fails; never aborts the caller.
pub fn fit_bayes(w: &[f64], y: &[f64], config: &BayesConfig, seed: u64) -> Option<BayesEstimate> {
    if !config.enabled {
        debug!("Bayesian estimator disabled; reporting unavailable");
        return None;
    }
    if w.is_empty() {
        warn!("Bayesian estimator skipped: no rows");
        return None;
    }

    let counts = ArmCounts::from_rows(w, y);
    let mut draws: Vec<f64> = Vec::with_capacity(config.chains * config.draws);
    for chain in 0..config.chains {
        let chain_seed = (seed ^ 0x9e37_79b9_7f4a_7c15).wrapping_add(chain as u64);
        match run_chain(&counts, config, chain_seed) {
            Some(chain_draws) => draws.extend(chain_draws),
            None => {
                warn!("Bayesian chain {} failed; reporting unavailable", chain);
                return None;
            }
        }
    }

    if draws.is_empty() || draws.iter().any(|d| !d.is_finite()) {
        warn!("Bayesian sampling produced degenerate draws; reporting unavailable");
        return None;
    }

    let mean = draws.iter().sum::<f64>() / draws.len() as f64;
    draws.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Some(BayesEstimate {
        mean,
        lower: percentile(&draws, 2.5),
        upper: percentile(&draws, 97.5),
    })
}

/// One Metropolis chain: tuning draws with step adaptation, then the
/// retained draws of tau.
fn run_chain(counts: &ArmCounts, config: &BayesConfig, seed: u64) -> Option<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut step = INITIAL_STEP;

    let mut alpha = 0.0;
    let mut tau = 0.0;
    let mut current_lp = log_posterior(alpha, tau, counts);
    if !current_lp.is_finite() {
        return None;
    }

    let mut draws = Vec::with_capacity(config.draws);
    let mut accepted_in_window = 0usize;
    let total = config.tune + config.draws;
    for iteration in 0..total {
        let tuning = iteration < config.tune;
        let proposal = Normal::new(0.0, step).ok()?;

        let alpha_next = alpha + proposal.sample(&mut rng);
        let tau_next = tau + proposal.sample(&mut rng);
        let next_lp = log_posterior(alpha_next, tau_next, counts);

        if next_lp.is_finite() && rng.gen::<f64>().ln() < next_lp - current_lp {
            alpha = alpha_next;
            tau = tau_next;
            current_lp = next_lp;
            accepted_in_window += 1;
        }

        if tuning && (iteration + 1) % ADAPT_WINDOW == 0 {
            let rate = accepted_in_window as f64 / ADAPT_WINDOW as f64;
            if rate < 0.2 {
                step *= 0.8;
            } else if rate > 0.5 {
                step *= 1.2;
            }
            accepted_in_window = 0;
        }

        if !tuning {
            draws.push(tau);
        }
    }

    Some(draws)
}

/// Unnormalized log posterior of (alpha, tau).
fn log_posterior(alpha: f64, tau: f64, counts: &ArmCounts) -> f64 {
    let exposed_logit = alpha + tau;
    let control_logit = alpha;

    let likelihood = counts.exposed_positive * log_sigmoid(exposed_logit)
        + (counts.exposed_total - counts.exposed_positive) * log_sigmoid(-exposed_logit)
        + counts.control_positive * log_sigmoid(control_logit)
        + (counts.control_total - counts.control_positive) * log_sigmoid(-control_logit);

    let prior = -(alpha * alpha + tau * tau) / (2.0 * PRIOR_SD * PRIOR_SD);
    likelihood + prior
}

/// Numerically stable ln(sigmoid(z)) = -ln(1 + exp(-z)).
fn log_sigmoid(z: f64) -> f64 {
    if z < -33.0 {
        z
    } else {
        -(-z).exp().ln_1p()
    }
}
