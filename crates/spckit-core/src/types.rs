//! Input data model shared by every engine.
//!
//! All of these are immutable once built by the validator; engines never
//! mutate them. The dropped-value count travels with the cleaned series
//! as an explicit field so interpretation text can report it without any
//! side channel.

use serde::{Deserialize, Serialize};

/// An ordered series of finite measurements, cleaned by the validator.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSeries {
    pub(crate) values: Vec<f64>,
    pub(crate) dropped: usize,
}

impl MeasurementSeries {
    /// The cleaned values, in input order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of cleaned values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no values survived cleaning.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// How many non-finite input values were dropped during cleaning.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// A short note for interpretation text when values were dropped,
    /// empty otherwise.
    pub(crate) fn dropped_note(&self) -> String {
        match self.dropped {
            0 => String::new(),
            1 => " 1 non-finite value was removed before analysis.".to_string(),
            n => format!(" {n} non-finite values were removed before analysis."),
        }
    }
}

/// Named groups of measurements for ANOVA, in insertion order.
///
/// Insertion order is preserved (not sorted) so results are reported in
/// the caller's order and group permutations are observable in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSeries {
    pub(crate) groups: Vec<(String, MeasurementSeries)>,
}

impl GroupedSeries {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over (label, series) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MeasurementSeries)> {
        self.groups.iter().map(|(label, s)| (label.as_str(), s))
    }

    /// Total number of observations across all groups.
    pub fn total_len(&self) -> usize {
        self.groups.iter().map(|(_, s)| s.len()).sum()
    }

    /// Total number of non-finite values dropped across all groups.
    pub fn dropped(&self) -> usize {
        self.groups.iter().map(|(_, s)| s.dropped()).sum()
    }
}

/// Category labels with non-negative magnitudes for Pareto analysis,
/// in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTally {
    pub(crate) entries: Vec<(String, f64)>,
}

impl CategoryTally {
    /// Number of categories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no categories.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (label, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(label, v)| (label.as_str(), *v))
    }

    /// Sum of all category values.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

/// Specification limits for capability analysis.
///
/// At least one of `lower`/`upper` must be present; when both are given,
/// `lower` must be strictly below `upper`. The target defaults to the
/// midpoint of a two-sided specification.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecLimits {
    /// Lower specification limit (LSL).
    pub lower: Option<f64>,
    /// Upper specification limit (USL).
    pub upper: Option<f64>,
    /// Target value; defaults to the midpoint when both limits exist.
    pub target: Option<f64>,
}

impl SpecLimits {
    /// Two-sided specification width (USL - LSL), when both limits exist.
    pub fn width(&self) -> Option<f64> {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => Some(u - l),
            _ => None,
        }
    }

    /// Midpoint of a two-sided specification.
    pub fn midpoint(&self) -> Option<f64> {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => Some((l + u) / 2.0),
            _ => None,
        }
    }

    /// The effective target: explicit target, else the midpoint.
    pub fn effective_target(&self) -> Option<f64> {
        self.target.or_else(|| self.midpoint())
    }

    /// True when the target (if any) lies inside the given limits.
    /// Vacuously true without a target.
    pub fn target_within_limits(&self) -> bool {
        let Some(t) = self.target else {
            return true;
        };
        if let Some(l) = self.lower {
            if t < l {
                return false;
            }
        }
        if let Some(u) = self.upper {
            if t > u {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_limits_midpoint_and_width() {
        let limits = SpecLimits {
            lower: Some(9.5),
            upper: Some(10.5),
            target: None,
        };
        assert_eq!(limits.width(), Some(1.0));
        assert_eq!(limits.midpoint(), Some(10.0));
        assert_eq!(limits.effective_target(), Some(10.0));
    }

    #[test]
    fn test_spec_limits_one_sided_has_no_width() {
        let limits = SpecLimits {
            lower: None,
            upper: Some(10.5),
            target: None,
        };
        assert_eq!(limits.width(), None);
        assert_eq!(limits.effective_target(), None);
        assert!(limits.target_within_limits());
    }

    #[test]
    fn test_target_outside_limits_is_flagged() {
        let limits = SpecLimits {
            lower: Some(9.0),
            upper: Some(11.0),
            target: Some(12.0),
        };
        assert!(!limits.target_within_limits());

        let inside = SpecLimits {
            target: Some(10.0),
            ..limits
        };
        assert!(inside.target_within_limits());
    }
}
