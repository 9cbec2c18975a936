//! Weibull parameter estimation.
//!
//! Maximum-likelihood fit of the two-parameter Weibull distribution,
//! used by the probability-plot engine to compute theoretical quantiles.
//! The shape parameter solves the profile likelihood equation by
//! Newton-Raphson; the scale parameter then follows analytically.

use serde::{Deserialize, Serialize};

/// Fitted Weibull parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeibullFit {
    /// Shape parameter (often written beta or k).
    pub shape: f64,
    /// Scale parameter (often written eta or lambda).
    pub scale: f64,
}

impl WeibullFit {
    /// Quantile at lower-tail probability `p` in (0, 1):
    /// `scale * (-ln(1 - p))^(1/shape)`.
    pub fn quantile(&self, p: f64) -> f64 {
        self.scale * (-(1.0 - p).ln()).powf(1.0 / self.shape)
    }

    /// Probability density at `x > 0`.
    pub fn density(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        let ratio = x / self.scale;
        (self.shape / self.scale) * ratio.powf(self.shape - 1.0)
            * (-ratio.powf(self.shape)).exp()
    }
}

const MAX_ITER: usize = 100;
const TOL: f64 = 1e-10;

/// Fit a Weibull distribution by maximum likelihood.
///
/// Solves the profile likelihood equation for the shape parameter,
///
/// ```text
/// n/beta + sum(ln t_i) - n * sum(t_i^beta ln t_i) / sum(t_i^beta) = 0
/// ```
///
/// by Newton-Raphson from the starting value 1.2, then recovers the
/// scale as `(sum(t_i^beta) / n)^(1/beta)`.
///
/// Returns `None` if there are fewer than 2 values, any value is
/// non-positive or non-finite, or the iteration fails to converge
/// (e.g. all values identical).
pub fn weibull_mle(data: &[f64]) -> Option<WeibullFit> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    if !data.iter().all(|&t| t.is_finite() && t > 0.0) {
        return None;
    }

    let n_f = n as f64;
    let ln_t: Vec<f64> = data.iter().map(|t| t.ln()).collect();
    let sum_ln_t: f64 = ln_t.iter().sum();

    let mut shape = 1.2_f64;
    let mut converged = false;

    for _ in 0..MAX_ITER {
        // S0 = sum t^b, S1 = sum t^b ln t, S2 = sum t^b (ln t)^2
        let mut s0 = 0.0;
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for (&t, &lt) in data.iter().zip(ln_t.iter()) {
            let tb = t.powf(shape);
            s0 += tb;
            s1 += tb * lt;
            s2 += tb * lt * lt;
        }
        if s0 == 0.0 {
            return None;
        }

        let f = n_f / shape + sum_ln_t - n_f * s1 / s0;
        let f_prime = -n_f / (shape * shape) - n_f * (s2 * s0 - s1 * s1) / (s0 * s0);
        if f_prime.abs() < 1e-30 {
            return None;
        }

        let step = f / f_prime;
        shape -= step;
        if shape <= 0.0 {
            shape = 0.01;
        }
        if step.abs() < TOL {
            converged = true;
            break;
        }
    }
    if !converged {
        return None;
    }

    let s0: f64 = data.iter().map(|t| t.powf(shape)).sum();
    let scale = (s0 / n_f).powf(1.0 / shape);
    if !scale.is_finite() || scale <= 0.0 || !shape.is_finite() {
        return None;
    }

    Some(WeibullFit { shape, scale })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mle_recovers_known_parameters() {
        // Quantiles of Weibull(shape=2, scale=50) at median ranks
        let data: Vec<f64> = (1..=20)
            .map(|i| {
                let p = (i as f64 - 0.5) / 20.0;
                50.0 * (-(1.0 - p).ln()).powf(0.5)
            })
            .collect();

        let fit = weibull_mle(&data).expect("fit should converge");
        assert!((fit.shape - 2.0).abs() < 0.4, "shape = {}", fit.shape);
        assert!((fit.scale - 50.0).abs() < 10.0, "scale = {}", fit.scale);
    }

    #[test]
    fn test_mle_near_exponential_data() {
        let data = [5.0, 10.0, 15.0, 25.0, 35.0, 50.0, 75.0, 100.0];
        let fit = weibull_mle(&data).expect("fit should converge");
        assert!(fit.shape > 0.5 && fit.shape < 2.0, "shape = {}", fit.shape);
    }

    #[test]
    fn test_mle_rejects_bad_input() {
        assert!(weibull_mle(&[]).is_none());
        assert!(weibull_mle(&[10.0]).is_none());
        assert!(weibull_mle(&[0.0, 10.0, 20.0]).is_none());
        assert!(weibull_mle(&[-5.0, 10.0, 20.0]).is_none());
        assert!(weibull_mle(&[f64::NAN, 10.0, 20.0]).is_none());
    }

    #[test]
    fn test_quantile_median() {
        let fit = WeibullFit {
            shape: 1.0,
            scale: 10.0,
        };
        // Exponential with scale 10: median = 10 ln 2
        let median = fit.quantile(0.5);
        assert!((median - 10.0 * 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_density_integrates_roughly_to_one() {
        let fit = WeibullFit {
            shape: 2.0,
            scale: 5.0,
        };
        let dx = 0.01;
        let total: f64 = (1..4000).map(|i| fit.density(i as f64 * dx) * dx).sum();
        assert!((total - 1.0).abs() < 1e-3, "integral = {total}");
    }
}
