//! Individual control chart (I-Chart) engine.
//!
//! Control limits come from the span-2 moving range: the short-term
//! sigma estimate is the average moving range divided by the d2 bias
//! constant for subgroups of two. Limits sit three sigma either side of
//! the mean; the lower limit is reported as computed, even when
//! negative. Western Electric run rules are scanned over sliding
//! windows and every violating window is reported, including overlaps.

use serde::Serialize;

use spckit_stats::{mean, moving_range_mean};

use crate::error::{AnalysisError, Result};
use crate::result::{
    insert_stat, AnalysisKind, AnalysisResult, ChartPayload, Classification, Statistics,
};
use crate::types::MeasurementSeries;

/// d2 bias-correction constant for a moving range of span 2.
pub const D2_SUBGROUP_2: f64 = 1.128;

/// Minimum cleaned points for an individuals chart.
pub const MIN_POINTS: usize = 3;

/// Short-term sigma estimate from the span-2 moving range.
///
/// Returns `None` for fewer than 2 values.
pub fn sigma_from_moving_range(values: &[f64]) -> Option<f64> {
    moving_range_mean(values).map(|mr| mr / D2_SUBGROUP_2)
}

/// Western Electric run rules scanned by this engine.
///
/// Rule 1 (a point beyond the control limits) is reported separately as
/// the out-of-control classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunRule {
    /// 2 of 3 consecutive points beyond 2 sigma, same side of center.
    TwoOfThreeBeyondTwoSigma,
    /// 4 of 5 consecutive points beyond 1 sigma, same side of center.
    FourOfFiveBeyondOneSigma,
    /// 8 consecutive points on one side of the center line.
    EightOnOneSide,
}

impl RunRule {
    /// Human-readable rule description.
    pub fn description(&self) -> &'static str {
        match self {
            RunRule::TwoOfThreeBeyondTwoSigma => {
                "2 of 3 consecutive points beyond 2 sigma on the same side"
            }
            RunRule::FourOfFiveBeyondOneSigma => {
                "4 of 5 consecutive points beyond 1 sigma on the same side"
            }
            RunRule::EightOnOneSide => "8 consecutive points on one side of the center line",
        }
    }
}

/// A violating window, as an inclusive index range.
///
/// Overlapping windows that each satisfy a rule are all reported; no
/// deduplication is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub rule: RunRule,
    pub start: usize,
    pub end: usize,
}

/// Classification section of an I-Chart result.
#[derive(Debug, Clone, Serialize)]
pub struct ControlClassification {
    /// Indices of points outside the control limits.
    pub out_of_control_indices: Vec<usize>,
    /// Run-rule violations as window ranges.
    pub rule_violations: Vec<RuleViolation>,
}

/// Renderer payload: the series plus every line a control chart needs.
#[derive(Debug, Clone, Serialize)]
pub struct ControlChart {
    pub values: Vec<f64>,
    pub center: f64,
    pub ucl: f64,
    pub lcl: f64,
    /// [lower, upper] one-sigma zone boundaries.
    pub zone_one_sigma: [f64; 2],
    /// [lower, upper] two-sigma zone boundaries.
    pub zone_two_sigma: [f64; 2],
}

/// Scan sliding windows for points beyond `center ± delta` on one side.
///
/// A window violates when at least `needed` of its `window` points lie
/// strictly beyond the offset on the same side. With `delta` zero this
/// degenerates to the one-side-of-center run rule.
fn scan_windows(
    values: &[f64],
    center: f64,
    delta: f64,
    window: usize,
    needed: usize,
    rule: RunRule,
    out: &mut Vec<RuleViolation>,
) {
    if values.len() < window {
        return;
    }
    let upper = center + delta;
    let lower = center - delta;
    for start in 0..=(values.len() - window) {
        let w = &values[start..start + window];
        let above = w.iter().filter(|&&v| v > upper).count();
        let below = w.iter().filter(|&&v| v < lower).count();
        if above >= needed || below >= needed {
            out.push(RuleViolation {
                rule,
                start,
                end: start + window - 1,
            });
        }
    }
}

/// Compute an individuals control chart over a validated series.
pub fn i_chart(series: &MeasurementSeries) -> Result<AnalysisResult> {
    let values = series.values();
    let center = mean(values).ok_or_else(|| {
        AnalysisError::CalculationError("cannot compute the mean of an empty series".to_string())
    })?;
    let avg_mr = moving_range_mean(values).ok_or_else(|| {
        AnalysisError::CalculationError(
            "moving range needs at least 2 observations".to_string(),
        )
    })?;
    let sigma_hat = avg_mr / D2_SUBGROUP_2;

    let ucl = center + 3.0 * sigma_hat;
    let lcl = center - 3.0 * sigma_hat;

    let out_of_control_indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > ucl || v < lcl)
        .map(|(i, _)| i)
        .collect();

    let mut rule_violations = Vec::new();
    scan_windows(
        values,
        center,
        2.0 * sigma_hat,
        3,
        2,
        RunRule::TwoOfThreeBeyondTwoSigma,
        &mut rule_violations,
    );
    scan_windows(
        values,
        center,
        sigma_hat,
        5,
        4,
        RunRule::FourOfFiveBeyondOneSigma,
        &mut rule_violations,
    );
    scan_windows(
        values,
        center,
        0.0,
        8,
        8,
        RunRule::EightOnOneSide,
        &mut rule_violations,
    );

    let mut statistics = Statistics::new();
    insert_stat(&mut statistics, "sample_size", values.len() as f64);
    insert_stat(&mut statistics, "mean", center);
    insert_stat(&mut statistics, "sigma_hat", sigma_hat);
    insert_stat(&mut statistics, "ucl", ucl);
    insert_stat(&mut statistics, "lcl", lcl);
    insert_stat(&mut statistics, "avg_moving_range", avg_mr);
    insert_stat(&mut statistics, "natural_tolerance", 6.0 * sigma_hat);
    insert_stat(
        &mut statistics,
        "out_of_control_count",
        out_of_control_indices.len() as f64,
    );

    let interpretation = interpret(
        out_of_control_indices.len(),
        rule_violations.len(),
        values.len(),
    ) + &series.dropped_note();

    Ok(AnalysisResult {
        analysis: AnalysisKind::IChart,
        statistics,
        classification: Classification::ControlChart(ControlClassification {
            out_of_control_indices,
            rule_violations,
        }),
        chart: ChartPayload::ControlChart(ControlChart {
            values: values.to_vec(),
            center,
            ucl,
            lcl,
            zone_one_sigma: [center - sigma_hat, center + sigma_hat],
            zone_two_sigma: [center - 2.0 * sigma_hat, center + 2.0 * sigma_hat],
        }),
        interpretation,
    })
}

fn interpret(out_of_control: usize, violations: usize, n: usize) -> String {
    if out_of_control > 0 {
        let pct = out_of_control as f64 / n as f64 * 100.0;
        format!(
            "Process shows {out_of_control} out-of-control point(s) ({pct:.1}% of data). \
             Investigate special causes."
        )
    } else if violations > 0 {
        format!(
            "Process has {violations} Western Electric rule violation(s). \
             Pattern suggests potential process instability."
        )
    } else {
        "Process appears to be in statistical control with no points beyond control limits \
         or Western Electric rule violations."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_series;

    fn series(data: &[f64]) -> MeasurementSeries {
        validate_series(data, MIN_POINTS).unwrap()
    }

    #[test]
    fn test_reference_chart() {
        let data = [10.0, 11.0, 11.3, 9.0, 8.0, 9.0, 9.5, 10.1, 11.4];
        let result = i_chart(&series(&data)).unwrap();

        let stat = |name: &str| result.statistics[name].unwrap();
        assert!((stat("mean") - 9.922).abs() < 1e-3);
        assert!((stat("sigma_hat") - 0.887).abs() < 1e-3);
        assert!((stat("ucl") - 12.582).abs() < 1e-3);
        assert!((stat("lcl") - 7.263).abs() < 1e-3);

        let Classification::ControlChart(ref c) = result.classification else {
            panic!("wrong classification variant");
        };
        assert!(c.out_of_control_indices.is_empty());
    }

    #[test]
    fn test_limits_are_symmetric_about_center() {
        let data = [5.0, 7.0, 6.5, 4.0, 8.0, 5.5, 6.0];
        let result = i_chart(&series(&data)).unwrap();
        let stat = |name: &str| result.statistics[name].unwrap();
        assert!(
            ((stat("ucl") - stat("mean")) - (stat("mean") - stat("lcl"))).abs() < 1e-10
        );
        assert!(stat("ucl") > stat("mean") && stat("mean") > stat("lcl"));
    }

    #[test]
    fn test_negative_lcl_is_not_clamped() {
        let data = [0.5, 3.0, 0.2, 2.8, 0.4, 3.1];
        let result = i_chart(&series(&data)).unwrap();
        assert!(result.statistics["lcl"].unwrap() < 0.0);
    }

    #[test]
    fn test_out_of_control_detection() {
        // Tight baseline then a spike far outside the limits
        let data = [10.0, 10.1, 9.9, 10.0, 10.1, 9.9, 10.0, 25.0, 10.0];
        let result = i_chart(&series(&data)).unwrap();
        let Classification::ControlChart(ref c) = result.classification else {
            panic!("wrong classification variant");
        };
        assert!(c.out_of_control_indices.contains(&7));
        assert!(result.interpretation.contains("out-of-control"));
    }

    #[test]
    fn test_four_of_five_rule_fires() {
        // Baseline near 10 with sigma_hat around 0.35, then a run of
        // values sitting well above one sigma
        let data = [
            10.0, 10.2, 9.8, 10.1, 9.9, 10.0, 10.2, 9.9, 10.8, 10.9, 10.8, 10.9, 10.8,
        ];
        let result = i_chart(&series(&data)).unwrap();
        let Classification::ControlChart(ref c) = result.classification else {
            panic!("wrong classification variant");
        };
        assert!(c
            .rule_violations
            .iter()
            .any(|v| v.rule == RunRule::FourOfFiveBeyondOneSigma));
    }

    #[test]
    fn test_overlapping_windows_not_deduplicated() {
        // Six consecutive points beyond one sigma on the same side give
        // two overlapping 4-of-5 windows
        let data = [
            10.0, 10.2, 9.8, 10.1, 9.9, 10.0, 10.2, 9.8, 10.9, 10.8, 10.9, 10.8, 10.9, 10.8,
        ];
        let result = i_chart(&series(&data)).unwrap();
        let Classification::ControlChart(ref c) = result.classification else {
            panic!("wrong classification variant");
        };
        let four_of_five: Vec<_> = c
            .rule_violations
            .iter()
            .filter(|v| v.rule == RunRule::FourOfFiveBeyondOneSigma)
            .collect();
        assert!(four_of_five.len() >= 2, "got {four_of_five:?}");
    }

    #[test]
    fn test_constant_series_degenerates_quietly() {
        let data = [4.2; 10];
        let result = i_chart(&series(&data)).unwrap();
        let stat = |name: &str| result.statistics[name].unwrap();
        assert_eq!(stat("sigma_hat"), 0.0);
        assert_eq!(stat("ucl"), stat("lcl"));
        let Classification::ControlChart(ref c) = result.classification else {
            panic!("wrong classification variant");
        };
        assert!(c.out_of_control_indices.is_empty());
        assert!(c.rule_violations.is_empty());
    }

    #[test]
    fn test_dropped_values_show_in_interpretation() {
        let data = [10.0, f64::NAN, 11.0, 11.3, 9.0, 8.0];
        let result = i_chart(&validate_series(&data, MIN_POINTS).unwrap()).unwrap();
        assert!(result.interpretation.contains("1 non-finite value"));
    }
}
