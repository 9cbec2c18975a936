//! Analysis result model.
//!
//! Every engine produces an [`AnalysisResult`]: a flat statistics map
//! (finite numbers or explicit nulls), a typed engine-specific
//! classification, a chart payload carrying enough raw data for any
//! renderer to draw the analysis without re-deriving statistics, and a
//! plain-language interpretation. Results are pure values: serializable,
//! comparable, cacheable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anova::AnovaClassification;
use crate::capability::CapabilityClassification;
use crate::control::ControlClassification;
use crate::pareto::ParetoClassification;
use crate::probplot::ProbabilityPlotClassification;

use crate::anova::AnovaChart;
use crate::capability::CapabilityChart;
use crate::control::ControlChart;
use crate::pareto::ParetoChart;
use crate::probplot::ProbabilityPlotChart;

/// Which analysis produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    IChart,
    Capability,
    Anova,
    Pareto,
    ProbabilityPlot,
}

impl AnalysisKind {
    /// Human-readable analysis name.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::IChart => "individual control chart",
            AnalysisKind::Capability => "process capability",
            AnalysisKind::Anova => "one-way ANOVA",
            AnalysisKind::Pareto => "Pareto analysis",
            AnalysisKind::ProbabilityPlot => "probability plot",
        }
    }
}

/// Metric name to value map. `None` marks a metric that is undefined
/// for this input (e.g. Cp without both specification limits) and
/// serializes as an explicit null.
pub type Statistics = BTreeMap<String, Option<f64>>;

/// Insert a metric, storing null when the value is not finite.
pub(crate) fn insert_stat(stats: &mut Statistics, name: &str, value: f64) {
    let stored = if value.is_finite() { Some(value) } else { None };
    stats.insert(name.to_string(), stored);
}

/// Insert an optional metric, storing null for `None` or non-finite.
pub(crate) fn insert_opt_stat(stats: &mut Statistics, name: &str, value: Option<f64>) {
    let stored = value.filter(|v| v.is_finite());
    stats.insert(name.to_string(), stored);
}

/// Engine-specific classification section.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Classification {
    ControlChart(ControlClassification),
    Capability(CapabilityClassification),
    Anova(AnovaClassification),
    Pareto(ParetoClassification),
    ProbabilityPlot(ProbabilityPlotClassification),
}

/// Raw data for renderers, per analysis kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChartPayload {
    ControlChart(ControlChart),
    Capability(CapabilityChart),
    Anova(AnovaChart),
    Pareto(ParetoChart),
    ProbabilityPlot(ProbabilityPlotChart),
}

/// The record every engine returns.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Which analysis produced this result.
    pub analysis: AnalysisKind,
    /// Metric name to value; null marks an undefined metric.
    pub statistics: Statistics,
    /// Engine-specific classification.
    pub classification: Classification,
    /// Raw series/lines/quantiles for chart rendering.
    pub chart: ChartPayload,
    /// Plain-language summary of the result.
    pub interpretation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_kind_snake_case() {
        let json = serde_json::to_string(&AnalysisKind::IChart).unwrap();
        assert_eq!(json, "\"i_chart\"");
        let json = serde_json::to_string(&AnalysisKind::ProbabilityPlot).unwrap();
        assert_eq!(json, "\"probability_plot\"");
    }

    #[test]
    fn test_insert_stat_nullifies_non_finite() {
        let mut stats = Statistics::new();
        insert_stat(&mut stats, "ok", 1.5);
        insert_stat(&mut stats, "bad", f64::INFINITY);
        insert_opt_stat(&mut stats, "missing", None);

        assert_eq!(stats["ok"], Some(1.5));
        assert_eq!(stats["bad"], None);
        assert_eq!(stats["missing"], None);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"bad\":null"));
        assert!(json.contains("\"ok\":1.5"));
    }
}
