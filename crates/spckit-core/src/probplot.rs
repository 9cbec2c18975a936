//! Probability-plot engine.
//!
//! Assesses distribution fit by plotting sorted data against theoretical
//! quantiles at median-rank plotting positions (i - 0.5) / n. Parameter
//! estimation is fixed per family so results are reproducible: sample
//! moments for normal, log-moments for lognormal, maximum likelihood for
//! Weibull. Goodness of fit is the Pearson correlation between data and
//! quantiles plus the least-squares line of data on quantiles; outliers
//! are flagged by studentized residual from that line.

use serde::{Deserialize, Serialize};

use spckit_stats::{
    linear_fit, mean, pearson, sample_std, sorted_values, standard_normal_pdf, weibull_mle,
    LinearFit, SpecialFunctions, WeibullFit,
};

use crate::error::{AnalysisError, Result};
use crate::result::{
    insert_stat, AnalysisKind, AnalysisResult, ChartPayload, Classification, Statistics,
};
use crate::types::MeasurementSeries;

/// Minimum cleaned points for a probability plot.
pub const MIN_POINTS: usize = 3;

/// Studentized-residual cutoff for outlier flagging.
const OUTLIER_Z: f64 = 3.0;

/// Distribution family fitted by the probability plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionFamily {
    #[default]
    Normal,
    Lognormal,
    Weibull,
}

impl DistributionFamily {
    /// Human-readable family name.
    pub fn label(&self) -> &'static str {
        match self {
            DistributionFamily::Normal => "normal",
            DistributionFamily::Lognormal => "lognormal",
            DistributionFamily::Weibull => "Weibull",
        }
    }
}

/// Classification section of a probability-plot result.
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityPlotClassification {
    pub distribution: DistributionFamily,
    /// Indices into the sorted values whose studentized residual
    /// exceeds the fixed cutoff.
    pub outlier_indices: Vec<usize>,
}

/// Renderer payload: everything a quantile plot needs.
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityPlotChart {
    pub sorted_values: Vec<f64>,
    pub plotting_positions: Vec<f64>,
    pub theoretical_quantiles: Vec<f64>,
    /// Least-squares line of data on quantiles.
    pub fit: LinearFit,
    /// Per-point lower confidence bound around the theoretical quantile.
    pub band_lower: Vec<f64>,
    /// Per-point upper confidence bound around the theoretical quantile.
    pub band_upper: Vec<f64>,
}

/// Fitted parameters for one family.
enum FittedFamily {
    Normal { location: f64, scale: f64 },
    Lognormal { log_mean: f64, log_std: f64 },
    Weibull(WeibullFit),
}

impl FittedFamily {
    fn quantile(&self, p: f64, fns: &dyn SpecialFunctions) -> f64 {
        match self {
            FittedFamily::Normal { location, scale } => location + scale * fns.normal_inv_cdf(p),
            FittedFamily::Lognormal { log_mean, log_std } => {
                (log_mean + log_std * fns.normal_inv_cdf(p)).exp()
            }
            FittedFamily::Weibull(fit) => fit.quantile(p),
        }
    }

    fn density(&self, x: f64) -> f64 {
        match self {
            FittedFamily::Normal { location, scale } => {
                standard_normal_pdf((x - location) / scale) / scale
            }
            FittedFamily::Lognormal { log_mean, log_std } => {
                if x <= 0.0 {
                    0.0
                } else {
                    standard_normal_pdf((x.ln() - log_mean) / log_std) / (x * log_std)
                }
            }
            FittedFamily::Weibull(fit) => fit.density(x),
        }
    }

    fn record(&self, statistics: &mut Statistics) {
        match self {
            FittedFamily::Normal { location, scale } => {
                insert_stat(statistics, "location", *location);
                insert_stat(statistics, "scale", *scale);
            }
            FittedFamily::Lognormal { log_mean, log_std } => {
                insert_stat(statistics, "log_mean", *log_mean);
                insert_stat(statistics, "log_std", *log_std);
            }
            FittedFamily::Weibull(fit) => {
                insert_stat(statistics, "shape", fit.shape);
                insert_stat(statistics, "scale", fit.scale);
            }
        }
    }
}

fn fit_family(
    sorted: &[f64],
    family: DistributionFamily,
) -> Result<FittedFamily> {
    match family {
        DistributionFamily::Normal => {
            let location = mean(sorted).ok_or_else(empty_err)?;
            let scale = sample_std(sorted).ok_or_else(empty_err)?;
            if scale <= 0.0 {
                return Err(zero_spread_err());
            }
            Ok(FittedFamily::Normal { location, scale })
        }
        DistributionFamily::Lognormal => {
            require_positive(sorted, family)?;
            let logs: Vec<f64> = sorted.iter().map(|v| v.ln()).collect();
            let log_mean = mean(&logs).ok_or_else(empty_err)?;
            let log_std = sample_std(&logs).ok_or_else(empty_err)?;
            if log_std <= 0.0 {
                return Err(zero_spread_err());
            }
            Ok(FittedFamily::Lognormal { log_mean, log_std })
        }
        DistributionFamily::Weibull => {
            require_positive(sorted, family)?;
            let fit = weibull_mle(sorted).ok_or_else(|| {
                AnalysisError::CalculationError(
                    "Weibull maximum-likelihood fit did not converge".to_string(),
                )
            })?;
            Ok(FittedFamily::Weibull(fit))
        }
    }
}

fn require_positive(sorted: &[f64], family: DistributionFamily) -> Result<()> {
    // Sorted ascending, so checking the first value suffices
    if sorted.first().is_some_and(|&v| v <= 0.0) {
        return Err(AnalysisError::InvalidDistributionParameter(format!(
            "the {} distribution requires strictly positive values",
            family.label()
        )));
    }
    Ok(())
}

fn empty_err() -> AnalysisError {
    AnalysisError::CalculationError("series is too short for distribution fitting".to_string())
}

fn zero_spread_err() -> AnalysisError {
    AnalysisError::CalculationError(
        "data has zero spread; distribution fit is undefined".to_string(),
    )
}

/// Assess distribution fit for a validated series.
pub fn probability_plot(
    series: &MeasurementSeries,
    family: DistributionFamily,
    confidence_level: f64,
    fns: &dyn SpecialFunctions,
) -> Result<AnalysisResult> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(AnalysisError::InvalidDistributionParameter(format!(
            "confidence level must be in (0, 1), got {confidence_level}"
        )));
    }

    let sorted = sorted_values(series.values());
    let n = sorted.len();

    let fitted = fit_family(&sorted, family)?;

    // Median-rank plotting positions
    let plotting_positions: Vec<f64> = (1..=n).map(|i| (i as f64 - 0.5) / n as f64).collect();
    let theoretical_quantiles: Vec<f64> = plotting_positions
        .iter()
        .map(|&p| fitted.quantile(p, fns))
        .collect();

    let correlation = pearson(&sorted, &theoretical_quantiles).ok_or_else(zero_spread_err)?;
    let fit = linear_fit(&theoretical_quantiles, &sorted).ok_or_else(zero_spread_err)?;

    // Studentized residuals from the fitted line
    let residuals: Vec<f64> = sorted
        .iter()
        .zip(theoretical_quantiles.iter())
        .map(|(&y, &x)| y - fit.predict(x))
        .collect();
    let residual_std =
        (residuals.iter().map(|r| r * r).sum::<f64>() / (n - 2).max(1) as f64).sqrt();
    let outlier_indices: Vec<usize> = if residual_std > 0.0 {
        residuals
            .iter()
            .enumerate()
            .filter(|(_, r)| (*r / residual_std).abs() > OUTLIER_Z)
            .map(|(i, _)| i)
            .collect()
    } else {
        Vec::new()
    };

    // Order-statistic confidence band around each theoretical quantile
    let z_crit = fns.normal_inv_cdf((1.0 + confidence_level) / 2.0);
    let mut band_lower = Vec::with_capacity(n);
    let mut band_upper = Vec::with_capacity(n);
    for (&p, &q) in plotting_positions.iter().zip(theoretical_quantiles.iter()) {
        let density = fitted.density(q);
        let se = if density > 0.0 {
            (p * (1.0 - p) / n as f64).sqrt() / density
        } else {
            f64::NAN
        };
        band_lower.push(q - z_crit * se);
        band_upper.push(q + z_crit * se);
    }

    let mut statistics = Statistics::new();
    insert_stat(&mut statistics, "sample_size", n as f64);
    insert_stat(&mut statistics, "correlation", correlation);
    insert_stat(&mut statistics, "r_squared", correlation * correlation);
    insert_stat(&mut statistics, "slope", fit.slope);
    insert_stat(&mut statistics, "intercept", fit.intercept);
    insert_stat(&mut statistics, "confidence_level", confidence_level);
    insert_stat(&mut statistics, "outlier_count", outlier_indices.len() as f64);
    fitted.record(&mut statistics);

    let quality = if correlation >= 0.99 {
        "Excellent"
    } else if correlation >= 0.95 {
        "Good"
    } else if correlation >= 0.90 {
        "Fair"
    } else {
        "Poor"
    };
    let mut interpretation = format!(
        "{quality} fit to the {} distribution (r = {correlation:.4}).",
        family.label()
    );
    if !outlier_indices.is_empty() {
        interpretation.push_str(&format!(
            " {} potential outlier(s) detected.",
            outlier_indices.len()
        ));
    }
    interpretation.push_str(&series.dropped_note());

    Ok(AnalysisResult {
        analysis: AnalysisKind::ProbabilityPlot,
        statistics,
        classification: Classification::ProbabilityPlot(ProbabilityPlotClassification {
            distribution: family,
            outlier_indices,
        }),
        chart: ChartPayload::ProbabilityPlot(ProbabilityPlotChart {
            sorted_values: sorted,
            plotting_positions,
            theoretical_quantiles,
            fit,
            band_lower,
            band_upper,
        }),
        interpretation,
    })
}
