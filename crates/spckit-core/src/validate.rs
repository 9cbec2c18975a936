//! Structural input validation.
//!
//! All shape and quality checks happen here, before any engine runs.
//! Non-finite values are silently dropped (never treated as zero) and
//! the dropped count is carried on the cleaned series. Engines receive
//! validated inputs and only guard numeric degeneracies.

use crate::error::{AnalysisError, Result};
use crate::types::{CategoryTally, GroupedSeries, MeasurementSeries, SpecLimits};

/// Clean a raw array and enforce the analysis-specific minimum size.
///
/// Drops NaN and infinite entries, keeping count of how many were
/// removed. Fails with `EmptyInput` for an empty array, `AllNonFinite`
/// when nothing survives cleaning, and `TooFewPoints` when fewer than
/// `min_points` values remain.
pub fn validate_series(raw: &[f64], min_points: usize) -> Result<MeasurementSeries> {
    if raw.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    let values: Vec<f64> = raw.iter().copied().filter(|x| x.is_finite()).collect();
    let dropped = raw.len() - values.len();
    if values.is_empty() {
        return Err(AnalysisError::AllNonFinite(dropped));
    }
    if values.len() < min_points {
        return Err(AnalysisError::TooFewPoints {
            required: min_points,
            actual: values.len(),
        });
    }
    Ok(MeasurementSeries { values, dropped })
}

/// Minimum observations per surviving ANOVA group (variance needs 2).
const MIN_GROUP_POINTS: usize = 2;

/// Clean grouped data for ANOVA.
///
/// Each group is cleaned individually; groups left empty by cleaning are
/// discarded. Fails with `InsufficientGroups` when fewer than 2
/// non-empty groups remain, and with `TooFewPoints` when a surviving
/// group has fewer than 2 values (its variance would be undefined).
pub fn validate_groups(raw: &[(String, Vec<f64>)]) -> Result<GroupedSeries> {
    if raw.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut groups = Vec::with_capacity(raw.len());
    for (label, data) in raw {
        let values: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
        let dropped = data.len() - values.len();
        if values.is_empty() {
            continue;
        }
        groups.push((label.clone(), MeasurementSeries { values, dropped }));
    }

    if groups.len() < 2 {
        return Err(AnalysisError::InsufficientGroups(groups.len()));
    }
    for (_, series) in &groups {
        if series.len() < MIN_GROUP_POINTS {
            return Err(AnalysisError::TooFewPoints {
                required: MIN_GROUP_POINTS,
                actual: series.len(),
            });
        }
    }
    Ok(GroupedSeries { groups })
}

/// Validate a category tally for Pareto analysis.
///
/// Fails with `EmptyInput` for no categories, `TooFewPoints` for a
/// single category, and `NonNumeric` for negative or non-finite values.
/// A zero total passes validation; the engine reports it as a
/// calculation error because percentages divide by the total.
pub fn validate_tally(raw: &[(String, f64)]) -> Result<CategoryTally> {
    if raw.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }
    if raw.len() < 2 {
        return Err(AnalysisError::TooFewPoints {
            required: 2,
            actual: raw.len(),
        });
    }
    for (label, value) in raw {
        if !value.is_finite() {
            return Err(AnalysisError::NonNumeric(format!(
                "category '{label}' has a non-finite value"
            )));
        }
        if *value < 0.0 {
            return Err(AnalysisError::NonNumeric(format!(
                "category '{label}' has a negative value ({value})"
            )));
        }
    }
    Ok(CategoryTally {
        entries: raw.to_vec(),
    })
}

/// Validate specification limits for capability analysis.
///
/// Fails with `InvalidSpecLimits` when no limit is given, a limit is
/// non-finite, or `lower >= upper`.
pub fn validate_spec_limits(limits: &SpecLimits) -> Result<()> {
    if limits.lower.is_none() && limits.upper.is_none() {
        return Err(AnalysisError::InvalidSpecLimits(
            "at least one specification limit (lower or upper) is required".to_string(),
        ));
    }
    for (name, value) in [("lower", limits.lower), ("upper", limits.upper)] {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(AnalysisError::InvalidSpecLimits(format!(
                    "{name} specification limit must be finite"
                )));
            }
        }
    }
    if let (Some(l), Some(u)) = (limits.lower, limits.upper) {
        if l >= u {
            return Err(AnalysisError::InvalidSpecLimits(format!(
                "lower specification limit ({l}) must be below the upper limit ({u})"
            )));
        }
    }
    Ok(())
}
