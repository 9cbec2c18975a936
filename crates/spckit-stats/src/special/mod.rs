//! Distribution special functions behind a pluggable provider.
//!
//! The engines need a small set of distribution primitives: the standard
//! normal CDF and inverse CDF, the F-distribution upper tail, and the
//! log-gamma function. Everything else (normal survival, the studentized
//! range distribution used by Tukey post-hoc comparisons) is derived from
//! those primitives here, so the derivations are shared by construction.
//!
//! Two providers implement the trait:
//!
//! - [`StatrsFunctions`] (cargo feature `statrs`, on by default) delegates
//!   to the statrs distribution types.
//! - [`PortableFunctions`] is dependency-free: rational approximations and
//!   continued fractions only.
//!
//! Both must agree within the tolerances exercised by the shared contract
//! tests; callers can treat them as interchangeable.

use std::f64::consts::PI;

mod portable;
pub use portable::PortableFunctions;

#[cfg(feature = "statrs")]
mod native;
#[cfg(feature = "statrs")]
pub use native::StatrsFunctions;

/// Distribution primitives required by the analysis engines.
///
/// Implementations must be pure: no state, no randomness, identical
/// output for identical input.
pub trait SpecialFunctions {
    /// Standard normal CDF Φ(x).
    fn normal_cdf(&self, x: f64) -> f64;

    /// Standard normal inverse CDF (quantile function).
    ///
    /// Returns `-inf` for p <= 0 and `+inf` for p >= 1.
    fn normal_inv_cdf(&self, p: f64) -> f64;

    /// Upper tail P(F > f) of the F-distribution with `df1`/`df2`
    /// degrees of freedom. Returns 1.0 for f <= 0.
    fn f_survival(&self, f: f64, df1: f64, df2: f64) -> f64;

    /// Natural log of the gamma function, for x > 0.
    fn ln_gamma(&self, x: f64) -> f64;

    /// Standard normal survival function P(Z > x).
    fn normal_survival(&self, x: f64) -> f64 {
        self.normal_cdf(-x)
    }
}

/// Standard normal density φ(z).
pub fn standard_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Returns the default special-function provider: statrs-backed when the
/// `statrs` feature is enabled, the portable fallback otherwise.
#[cfg(feature = "statrs")]
pub fn default_functions() -> StatrsFunctions {
    StatrsFunctions
}

/// Returns the default special-function provider: statrs-backed when the
/// `statrs` feature is enabled, the portable fallback otherwise.
#[cfg(not(feature = "statrs"))]
pub fn default_functions() -> PortableFunctions {
    PortableFunctions
}

// ---------------------------------------------------------------------------
// Studentized range distribution
// ---------------------------------------------------------------------------

/// CDF of the range of `k` independent standard normals.
///
/// P(W < w) = k ∫ φ(z) [Φ(z) - Φ(z - w)]^(k-1) dz, evaluated by
/// Simpson's rule. This is the infinite-degrees-of-freedom limit of the
/// studentized range.
fn range_cdf_known_sigma(fns: &dyn SpecialFunctions, w: f64, k: usize) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    const LO: f64 = -8.0;
    const HI: f64 = 8.0;
    const STEPS: usize = 128; // even, for Simpson's rule

    let h = (HI - LO) / STEPS as f64;
    let integrand = |z: f64| {
        let inner = fns.normal_cdf(z) - fns.normal_cdf(z - w);
        standard_normal_pdf(z) * inner.powi(k as i32 - 1)
    };

    let mut sum = integrand(LO) + integrand(HI);
    for i in 1..STEPS {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * integrand(LO + i as f64 * h);
    }
    (k as f64 * sum * h / 3.0).clamp(0.0, 1.0)
}

/// CDF of the studentized range Q = W / S with `k` groups and `df`
/// error degrees of freedom.
///
/// Integrates the known-sigma range CDF over the density of the
/// pooled-standard-deviation factor S, where S² ~ χ²(df)/df:
///
/// ```text
/// f(s) = 2 (df/2)^(df/2) / Γ(df/2) · s^(df-1) · exp(-df s²/2)
/// ```
///
/// For very large `df` the S factor degenerates to 1 and the
/// known-sigma CDF is returned directly.
pub fn studentized_range_cdf(fns: &dyn SpecialFunctions, q: f64, k: usize, df: f64) -> f64 {
    if q <= 0.0 || k < 2 {
        return 0.0;
    }
    if df > 5000.0 {
        return range_cdf_known_sigma(fns, q, k);
    }

    let half = df / 2.0;
    let ln_norm = std::f64::consts::LN_2 + half * half.ln() - fns.ln_gamma(half);

    let spread = 10.0 / df.sqrt();
    let lo = (1.0 - spread).max(1e-9);
    let hi = 1.0 + spread;
    const STEPS: usize = 120; // even, for Simpson's rule
    let h = (hi - lo) / STEPS as f64;

    let integrand = |s: f64| {
        let ln_density = ln_norm + (df - 1.0) * s.ln() - half * s * s;
        ln_density.exp() * range_cdf_known_sigma(fns, q * s, k)
    };

    let mut sum = integrand(lo) + integrand(hi);
    for i in 1..STEPS {
        let weight = if i % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * integrand(lo + i as f64 * h);
    }
    (sum * h / 3.0).clamp(0.0, 1.0)
}

/// Upper tail P(Q > q) of the studentized range distribution.
pub fn studentized_range_survival(fns: &dyn SpecialFunctions, q: f64, k: usize, df: f64) -> f64 {
    1.0 - studentized_range_cdf(fns, q, k, df)
}

/// Quantile of the studentized range distribution, by bisection.
///
/// `p` is the lower-tail probability; the Tukey critical value at level
/// α is `studentized_range_quantile(fns, 1 - α, k, df)`. Returns NaN for
/// p outside (0, 1) or k < 2.
pub fn studentized_range_quantile(fns: &dyn SpecialFunctions, p: f64, k: usize, df: f64) -> f64 {
    if !(0.0..1.0).contains(&p) || p == 0.0 || k < 2 {
        return f64::NAN;
    }

    let mut hi = 2.0;
    while studentized_range_cdf(fns, hi, k, df) < p {
        hi *= 2.0;
        if hi > 1024.0 {
            return f64::NAN;
        }
    }
    let mut lo = 0.0;
    while hi - lo > 1e-4 {
        let mid = 0.5 * (lo + hi);
        if studentized_range_cdf(fns, mid, k, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

// ---------------------------------------------------------------------------
// Shared provider contract
// ---------------------------------------------------------------------------
