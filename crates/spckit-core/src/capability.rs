//! Process capability engine.
//!
//! Short-term (within) sigma comes from the span-2 moving range with the
//! same d2 constant as the individuals chart, so Cp/Cpk here agree with
//! the control limits there. Long-term (overall) sigma is the sample
//! standard deviation and feeds Pp/Ppk. One-sided specifications are
//! supported: Cp, Pp, and Cpm need both limits and are reported as null
//! otherwise, while Cpk/Ppk reduce to the single one-sided term.

use serde::Serialize;

use spckit_stats::{mean, sample_std, SpecialFunctions};

use crate::control::sigma_from_moving_range;
use crate::error::{AnalysisError, Result};
use crate::result::{
    insert_opt_stat, insert_stat, AnalysisKind, AnalysisResult, ChartPayload, Classification,
    Statistics,
};
use crate::types::{MeasurementSeries, SpecLimits};

/// Rating bands on Cpk used for interpretation.
///
/// The cutover values are fixed: below 1.0, from 1.0, from 1.33, and
/// above 1.67.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRating {
    NotCapable,
    Marginal,
    Capable,
    Excellent,
}

impl CapabilityRating {
    /// Band for a given Cpk.
    pub fn from_cpk(cpk: f64) -> Self {
        if cpk > 1.67 {
            CapabilityRating::Excellent
        } else if cpk >= 1.33 {
            CapabilityRating::Capable
        } else if cpk >= 1.0 {
            CapabilityRating::Marginal
        } else {
            CapabilityRating::NotCapable
        }
    }

    /// Human-readable band label.
    pub fn label(&self) -> &'static str {
        match self {
            CapabilityRating::NotCapable => "not capable",
            CapabilityRating::Marginal => "marginal",
            CapabilityRating::Capable => "capable",
            CapabilityRating::Excellent => "excellent",
        }
    }
}

/// Classification section of a capability result.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityClassification {
    pub rating: CapabilityRating,
    /// False when an explicit target lies outside the limits.
    pub target_within_limits: bool,
}

/// Renderer payload: raw values plus every reference line a capability
/// histogram needs.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityChart {
    pub values: Vec<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub target: Option<f64>,
    pub mean: f64,
    pub sigma_within: f64,
    pub sigma_overall: f64,
}

/// Minimum of two optional one-sided indices.
fn one_or_both(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    }
}

/// Compute capability and performance indices against spec limits.
///
/// `limits` must already have passed [`crate::validate::validate_spec_limits`].
pub fn capability(
    series: &MeasurementSeries,
    limits: &SpecLimits,
    fns: &dyn SpecialFunctions,
) -> Result<AnalysisResult> {
    let values = series.values();
    let x_bar = mean(values).ok_or_else(|| {
        AnalysisError::CalculationError("cannot compute the mean of an empty series".to_string())
    })?;
    let sigma_within = sigma_from_moving_range(values).ok_or_else(|| {
        AnalysisError::CalculationError(
            "within-subgroup sigma needs at least 2 observations".to_string(),
        )
    })?;
    let sigma_overall = sample_std(values).ok_or_else(|| {
        AnalysisError::CalculationError(
            "overall sigma needs at least 2 observations".to_string(),
        )
    })?;
    if sigma_within <= 0.0 || sigma_overall <= 0.0 {
        return Err(AnalysisError::CalculationError(
            "process variation is zero; capability indices are undefined".to_string(),
        ));
    }

    let width = limits.width();
    let target = limits.effective_target();

    // Short-term indices
    let cpu = limits.upper.map(|u| (u - x_bar) / (3.0 * sigma_within));
    let cpl = limits.lower.map(|l| (x_bar - l) / (3.0 * sigma_within));
    let cp = width.map(|w| w / (6.0 * sigma_within));
    let cpk = one_or_both(cpu, cpl).ok_or_else(|| {
        AnalysisError::InvalidSpecLimits(
            "at least one specification limit (lower or upper) is required".to_string(),
        )
    })?;

    // Long-term indices
    let ppu = limits.upper.map(|u| (u - x_bar) / (3.0 * sigma_overall));
    let ppl = limits.lower.map(|l| (x_bar - l) / (3.0 * sigma_overall));
    let pp = width.map(|w| w / (6.0 * sigma_overall));
    let ppk = one_or_both(ppu, ppl);

    // Taguchi index: penalizes distance from target
    let cpm = match (width, target) {
        (Some(w), Some(t)) => {
            let denom = (sigma_within * sigma_within + (x_bar - t).powi(2)).sqrt();
            Some(w / (6.0 * denom))
        }
        _ => None,
    };

    let sigma_level = 3.0 * cpk;

    // Normal-tail defect estimates against the within sigma, so the
    // nearer-limit tail equals Phi(-3 Cpk)
    let ppm_lower = limits
        .lower
        .map(|l| 1.0e6 * fns.normal_cdf(-(x_bar - l) / sigma_within));
    let ppm_upper = limits
        .upper
        .map(|u| 1.0e6 * fns.normal_survival((u - x_bar) / sigma_within));
    let ppm_total = ppm_lower.unwrap_or(0.0) + ppm_upper.unwrap_or(0.0);

    let rating = CapabilityRating::from_cpk(cpk);
    let target_within_limits = limits.target_within_limits();

    let mut statistics = Statistics::new();
    insert_stat(&mut statistics, "sample_size", values.len() as f64);
    insert_stat(&mut statistics, "mean", x_bar);
    insert_stat(&mut statistics, "sigma_within", sigma_within);
    insert_stat(&mut statistics, "sigma_overall", sigma_overall);
    insert_opt_stat(&mut statistics, "lsl", limits.lower);
    insert_opt_stat(&mut statistics, "usl", limits.upper);
    insert_opt_stat(&mut statistics, "target", target);
    insert_opt_stat(&mut statistics, "cp", cp);
    insert_opt_stat(&mut statistics, "cpu", cpu);
    insert_opt_stat(&mut statistics, "cpl", cpl);
    insert_stat(&mut statistics, "cpk", cpk);
    insert_opt_stat(&mut statistics, "pp", pp);
    insert_opt_stat(&mut statistics, "ppu", ppu);
    insert_opt_stat(&mut statistics, "ppl", ppl);
    insert_opt_stat(&mut statistics, "ppk", ppk);
    insert_opt_stat(&mut statistics, "cpm", cpm);
    insert_stat(&mut statistics, "sigma_level", sigma_level);
    insert_opt_stat(&mut statistics, "ppm_lower", ppm_lower);
    insert_opt_stat(&mut statistics, "ppm_upper", ppm_upper);
    insert_stat(&mut statistics, "ppm_total", ppm_total);

    let mut interpretation = format!(
        "Process capability is {} (Cpk = {cpk:.3}). Expected defect rate: {ppm_total:.0} PPM \
         ({sigma_level:.1} sigma level).",
        rating.label()
    );
    if !target_within_limits {
        interpretation.push_str(" Note: the target value lies outside the specification limits.");
    }
    interpretation.push_str(&series.dropped_note());

    Ok(AnalysisResult {
        analysis: AnalysisKind::Capability,
        statistics,
        classification: Classification::Capability(CapabilityClassification {
            rating,
            target_within_limits,
        }),
        chart: ChartPayload::Capability(CapabilityChart {
            values: values.to_vec(),
            lower: limits.lower,
            upper: limits.upper,
            target,
            mean: x_bar,
            sigma_within,
            sigma_overall,
        }),
        interpretation,
    })
}
