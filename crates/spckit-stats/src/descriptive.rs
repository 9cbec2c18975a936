//! Descriptive statistics for measurement series.
//!
//! These primitives are shared by every analysis engine. Conventions:
//!
//! - `sample_std` uses the Bessel-corrected divisor n-1
//! - `population_std` uses the divisor n
//! - `percentile` interpolates linearly on the (n-1)p rank
//!
//! All functions return `None` for inputs too short to carry the
//! statistic rather than producing NaN.

use serde::{Deserialize, Serialize};

/// Arithmetic mean.
///
/// Returns `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sample variance (divisor n-1).
///
/// Returns `None` for fewer than 2 values.
pub fn variance(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Some(ss / (n - 1) as f64)
}

/// Sample standard deviation (Bessel-corrected, divisor n-1).
pub fn sample_std(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Population standard deviation (divisor n).
///
/// Returns `None` for an empty slice.
pub fn population_std(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / data.len() as f64).sqrt())
}

/// Mean of the absolute differences between consecutive observations.
///
/// The moving range of span 2 is the standard short-term variation
/// estimator for individuals charts. Returns `None` for fewer than
/// 2 values.
pub fn moving_range_mean(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let sum: f64 = data.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Some(sum / (data.len() - 1) as f64)
}

/// Copy of the data sorted ascending.
pub fn sorted_values(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sorted
}

/// Percentile by linear interpolation on the (n-1)p rank.
///
/// `sorted` must already be in ascending order; `p` is in [0, 1].
/// Returns `None` for an empty slice or `p` outside [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let rank = (sorted.len() - 1) as f64 * p;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Pearson correlation coefficient between two equal-length slices.
///
/// Returns `None` for fewer than 2 pairs, mismatched lengths, or zero
/// variance in either slice.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Least-squares line fit of y on x.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Predicted y at a given x.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Simple linear regression of y on x.
///
/// Returns `None` for fewer than 2 pairs, mismatched lengths, or zero
/// variance in x.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&a, &b) in x.iter().zip(y.iter()) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

/// Five number summary (min, Q1, median, Q3, max).
///
/// The quartiles use the same linear interpolation as [`percentile`],
/// so box plots drawn from this summary agree with every other
/// percentile-derived number in the crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Compute the five number summary of a dataset.
///
/// Returns `None` for an empty slice.
pub fn five_number_summary(data: &[f64]) -> Option<FiveNumberSummary> {
    if data.is_empty() {
        return None;
    }
    let sorted = sorted_values(data);
    Some(FiveNumberSummary {
        min: sorted[0],
        q1: percentile(&sorted, 0.25)?,
        median: percentile(&sorted, 0.5)?,
        q3: percentile(&sorted, 0.75)?,
        max: sorted[sorted.len() - 1],
    })
}
