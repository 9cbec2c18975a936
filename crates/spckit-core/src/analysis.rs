//! Analysis dispatch and the JSON boundary envelope.
//!
//! Protocol front ends (MCP servers, CLIs, notebooks) deserialize a
//! tagged [`AnalysisRequest`], call [`analyze`], and serialize the
//! returned [`AnalysisResponse`]. The kind-to-engine dispatch is a plain
//! match over the request variants; adding an engine means adding a
//! variant and an arm.

use serde::{Deserialize, Serialize};

use spckit_stats::{default_functions, SpecialFunctions};

use crate::capability;
use crate::control;
use crate::error::{AnalysisError, ErrorKind, Result};
use crate::pareto;
use crate::probplot::{self, DistributionFamily};
use crate::result::{AnalysisKind, AnalysisResult};
use crate::types::SpecLimits;
use crate::validate;

fn default_alpha() -> f64 {
    0.05
}

fn default_threshold() -> f64 {
    0.8
}

fn default_confidence() -> f64 {
    0.95
}

/// One analysis request, tagged by kind.
///
/// Groups and categories are ordered pairs rather than maps so the
/// caller's ordering survives deserialization (Pareto tie-breaking and
/// ANOVA reporting order depend on it).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisRequest {
    /// Individual control chart over a measurement series.
    IChart { data: Vec<f64> },
    /// Capability indices against specification limits.
    Capability {
        data: Vec<f64>,
        #[serde(default)]
        lower: Option<f64>,
        #[serde(default)]
        upper: Option<f64>,
        #[serde(default)]
        target: Option<f64>,
    },
    /// One-way ANOVA over named groups.
    Anova {
        groups: Vec<(String, Vec<f64>)>,
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
    /// Pareto ranking of a category tally.
    Pareto {
        categories: Vec<(String, f64)>,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    /// Probability plot against a distribution family.
    ProbabilityPlot {
        data: Vec<f64>,
        #[serde(default)]
        distribution: DistributionFamily,
        #[serde(default = "default_confidence")]
        confidence_level: f64,
    },
}

impl AnalysisRequest {
    /// The analysis kind this request selects.
    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisRequest::IChart { .. } => AnalysisKind::IChart,
            AnalysisRequest::Capability { .. } => AnalysisKind::Capability,
            AnalysisRequest::Anova { .. } => AnalysisKind::Anova,
            AnalysisRequest::Pareto { .. } => AnalysisKind::Pareto,
            AnalysisRequest::ProbabilityPlot { .. } => AnalysisKind::ProbabilityPlot,
        }
    }
}

/// Validate and run a request with the default special-function provider.
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisResult> {
    analyze_with(request, &default_functions())
}

/// Validate and run a request with an explicit special-function provider.
pub fn analyze_with(
    request: &AnalysisRequest,
    fns: &dyn SpecialFunctions,
) -> Result<AnalysisResult> {
    tracing::debug!(kind = ?request.kind(), "dispatching analysis");
    match request {
        AnalysisRequest::IChart { data } => {
            let series = validate::validate_series(data, control::MIN_POINTS)?;
            tracing::debug!(points = series.len(), dropped = series.dropped(), "validated series");
            control::i_chart(&series)
        }
        AnalysisRequest::Capability {
            data,
            lower,
            upper,
            target,
        } => {
            let limits = SpecLimits {
                lower: *lower,
                upper: *upper,
                target: *target,
            };
            validate::validate_spec_limits(&limits)?;
            let series = validate::validate_series(data, 1)?;
            tracing::debug!(points = series.len(), dropped = series.dropped(), "validated series");
            capability::capability(&series, &limits, fns)
        }
        AnalysisRequest::Anova { groups, alpha } => {
            let grouped = validate::validate_groups(groups)?;
            tracing::debug!(
                groups = grouped.len(),
                observations = grouped.total_len(),
                "validated groups"
            );
            crate::anova::anova(&grouped, *alpha, fns)
        }
        AnalysisRequest::Pareto {
            categories,
            threshold,
        } => {
            let tally = validate::validate_tally(categories)?;
            tracing::debug!(categories = tally.len(), "validated tally");
            pareto::pareto(&tally, *threshold)
        }
        AnalysisRequest::ProbabilityPlot {
            data,
            distribution,
            confidence_level,
        } => {
            let series = validate::validate_series(data, probplot::MIN_POINTS)?;
            tracing::debug!(points = series.len(), dropped = series.dropped(), "validated series");
            probplot::probability_plot(&series, *distribution, *confidence_level, fns)
        }
    }
}

/// Error body of a failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// The JSON envelope handed to protocol front ends.
///
/// Success serializes as `{"success": true, "analysis": ..., "statistics":
/// ..., "classification": ..., "chart": ..., "interpretation": ...}`;
/// failure as `{"success": false, "error": {"kind": ..., "message": ...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl From<Result<AnalysisResult>> for AnalysisResponse {
    fn from(outcome: Result<AnalysisResult>) -> Self {
        match outcome {
            Ok(result) => AnalysisResponse {
                success: true,
                result: Some(result),
                error: None,
            },
            Err(err) => AnalysisResponse::from(err),
        }
    }
}

impl From<AnalysisError> for AnalysisResponse {
    fn from(err: AnalysisError) -> Self {
        AnalysisResponse {
            success: false,
            result: None,
            error: Some(ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            }),
        }
    }
}

/// Run a request and wrap the outcome in the boundary envelope.
pub fn handle(request: &AnalysisRequest) -> AnalysisResponse {
    AnalysisResponse::from(analyze(request))
}
