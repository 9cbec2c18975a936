//! Error types for spckit-core.
//!
//! Every public entry point returns [`AnalysisError`] instead of letting
//! degenerate numbers (NaN indices, infinite ratios) leak into results.
//! Each variant maps to a stable machine-readable [`ErrorKind`] that
//! protocol front ends surface to users.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for spckit-core operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Main error type for analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The input contained no values at all.
    #[error("input contains no values")]
    EmptyInput,

    /// A value violated the numeric constraints of the analysis.
    #[error("{0}")]
    NonNumeric(String),

    /// Too few valid points remained after cleaning.
    #[error("need at least {required} valid data points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    /// Every input value was NaN or infinite.
    #[error("all {0} input values are non-finite")]
    AllNonFinite(usize),

    /// Fewer than two non-empty groups remained after cleaning.
    #[error("need at least 2 non-empty groups, got {0}")]
    InsufficientGroups(usize),

    /// Specification limits missing or inverted.
    #[error("{0}")]
    InvalidSpecLimits(String),

    /// A parameter is outside the domain of the requested distribution
    /// or analysis (non-positive lognormal data, alpha outside (0, 1), ...).
    #[error("{0}")]
    InvalidDistributionParameter(String),

    /// A numeric degeneracy surfaced during computation (zero variance,
    /// zero total, non-convergent fit).
    #[error("{0}")]
    CalculationError(String),
}

/// Machine-readable error kind, serialized in the failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyInput,
    NonNumeric,
    TooFewPoints,
    AllNonFinite,
    InsufficientGroups,
    InvalidSpecLimits,
    InvalidDistributionParameter,
    CalculationError,
}

impl AnalysisError {
    /// The stable kind identifier for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::EmptyInput => ErrorKind::EmptyInput,
            AnalysisError::NonNumeric(_) => ErrorKind::NonNumeric,
            AnalysisError::TooFewPoints { .. } => ErrorKind::TooFewPoints,
            AnalysisError::AllNonFinite(_) => ErrorKind::AllNonFinite,
            AnalysisError::InsufficientGroups(_) => ErrorKind::InsufficientGroups,
            AnalysisError::InvalidSpecLimits(_) => ErrorKind::InvalidSpecLimits,
            AnalysisError::InvalidDistributionParameter(_) => {
                ErrorKind::InvalidDistributionParameter
            }
            AnalysisError::CalculationError(_) => ErrorKind::CalculationError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorKind::TooFewPoints).unwrap();
        assert_eq!(json, "\"TOO_FEW_POINTS\"");
        let json = serde_json::to_string(&ErrorKind::CalculationError).unwrap();
        assert_eq!(json, "\"CALCULATION_ERROR\"");
    }

    #[test]
    fn test_display_messages() {
        let err = AnalysisError::TooFewPoints {
            required: 3,
            actual: 1,
        };
        assert_eq!(err.to_string(), "need at least 3 valid data points, got 1");
        assert_eq!(err.kind(), ErrorKind::TooFewPoints);
    }
}
