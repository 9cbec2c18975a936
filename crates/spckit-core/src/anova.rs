//! One-way ANOVA engine with Tukey post-hoc comparisons.
//!
//! Classic fixed-effects decomposition: between-group and within-group
//! sums of squares, an F test against the upper tail of the
//! F-distribution, and eta-squared as effect size. Post-hoc pairwise
//! comparisons use the Tukey-Kramer procedure with critical values and
//! p-values from the studentized range distribution; they are computed
//! for every unordered pair whether or not the omnibus test is
//! significant, and callers filter on the per-pair flag.

use serde::Serialize;

use spckit_stats::{
    five_number_summary, mean, studentized_range_quantile, studentized_range_survival,
    variance, FiveNumberSummary, SpecialFunctions,
};

use crate::error::{AnalysisError, Result};
use crate::result::{
    insert_stat, AnalysisKind, AnalysisResult, ChartPayload, Classification, Statistics,
};
use crate::types::GroupedSeries;

/// Per-group descriptive statistics.
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatistics {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
}

/// One Tukey-Kramer pairwise comparison.
#[derive(Debug, Clone, Serialize)]
pub struct PairComparison {
    /// The two group labels, in input order.
    pub groups: (String, String),
    /// Mean of the first group minus mean of the second.
    pub mean_difference: f64,
    /// Standard error of the difference under the pooled variance.
    pub standard_error: f64,
    /// Honest significant difference: critical value times the error.
    pub hsd: f64,
    /// Observed studentized range statistic |difference| / error.
    pub q_statistic: f64,
    /// Upper-tail p-value from the studentized range distribution.
    pub p_value: f64,
    /// True when `p_value` is below the requested alpha.
    pub significant: bool,
}

/// Classification section of an ANOVA result.
#[derive(Debug, Clone, Serialize)]
pub struct AnovaClassification {
    /// Omnibus F-test outcome at the requested alpha.
    pub significant: bool,
    pub group_statistics: Vec<GroupStatistics>,
    pub comparisons: Vec<PairComparison>,
}

/// Renderer payload: per-group raw values and box-plot summaries.
#[derive(Debug, Clone, Serialize)]
pub struct AnovaChart {
    pub groups: Vec<GroupChart>,
}

/// One group's chart data.
#[derive(Debug, Clone, Serialize)]
pub struct GroupChart {
    pub label: String,
    pub values: Vec<f64>,
    pub summary: FiveNumberSummary,
}

/// Run a one-way ANOVA over validated groups.
pub fn anova(
    groups: &GroupedSeries,
    alpha: f64,
    fns: &dyn SpecialFunctions,
) -> Result<AnalysisResult> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(AnalysisError::InvalidDistributionParameter(format!(
            "significance level must be in (0, 1), got {alpha}"
        )));
    }

    let k = groups.len();
    let n_total = groups.total_len();
    let df_between = k - 1;
    let df_within = n_total - k;
    if df_within == 0 {
        return Err(AnalysisError::CalculationError(
            "no within-group degrees of freedom".to_string(),
        ));
    }

    let grand_sum: f64 = groups.iter().flat_map(|(_, s)| s.values()).sum();
    let grand_mean = grand_sum / n_total as f64;

    let mut group_statistics = Vec::with_capacity(k);
    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (label, series) in groups.iter() {
        let values = series.values();
        let gm = mean(values).ok_or_else(|| {
            AnalysisError::CalculationError(format!("group '{label}' is empty"))
        })?;
        let gv = variance(values).ok_or_else(|| {
            AnalysisError::CalculationError(format!(
                "group '{label}' needs at least 2 observations"
            ))
        })?;
        ss_between += values.len() as f64 * (gm - grand_mean).powi(2);
        ss_within += values.iter().map(|x| (x - gm).powi(2)).sum::<f64>();
        group_statistics.push(GroupStatistics {
            label: label.to_string(),
            count: values.len(),
            mean: gm,
            std_dev: gv.sqrt(),
            variance: gv,
        });
    }

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    if ms_within <= 0.0 {
        return Err(AnalysisError::CalculationError(
            "within-group variance is zero; the F statistic is undefined".to_string(),
        ));
    }

    let f_statistic = ms_between / ms_within;
    let p_value = fns.f_survival(f_statistic, df_between as f64, df_within as f64);
    let significant = p_value < alpha;
    let eta_squared = ss_between / (ss_between + ss_within);

    // Tukey-Kramer post-hoc over every unordered pair
    let q_critical = studentized_range_quantile(fns, 1.0 - alpha, k, df_within as f64);
    let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let a = &group_statistics[i];
            let b = &group_statistics[j];
            let standard_error = (ms_within / 2.0
                * (1.0 / a.count as f64 + 1.0 / b.count as f64))
                .sqrt();
            let mean_difference = a.mean - b.mean;
            let q_statistic = mean_difference.abs() / standard_error;
            let pair_p = studentized_range_survival(fns, q_statistic, k, df_within as f64);
            comparisons.push(PairComparison {
                groups: (a.label.clone(), b.label.clone()),
                mean_difference,
                standard_error,
                hsd: q_critical * standard_error,
                q_statistic,
                p_value: pair_p,
                significant: pair_p < alpha,
            });
        }
    }

    let mut statistics = Statistics::new();
    insert_stat(&mut statistics, "group_count", k as f64);
    insert_stat(&mut statistics, "sample_size", n_total as f64);
    insert_stat(&mut statistics, "grand_mean", grand_mean);
    insert_stat(&mut statistics, "ss_between", ss_between);
    insert_stat(&mut statistics, "ss_within", ss_within);
    insert_stat(&mut statistics, "ss_total", ss_between + ss_within);
    insert_stat(&mut statistics, "df_between", df_between as f64);
    insert_stat(&mut statistics, "df_within", df_within as f64);
    insert_stat(&mut statistics, "ms_between", ms_between);
    insert_stat(&mut statistics, "ms_within", ms_within);
    insert_stat(&mut statistics, "f_statistic", f_statistic);
    insert_stat(&mut statistics, "p_value", p_value);
    insert_stat(&mut statistics, "eta_squared", eta_squared);
    insert_stat(&mut statistics, "alpha", alpha);
    insert_stat(&mut statistics, "q_critical", q_critical);

    let mut chart_groups = Vec::with_capacity(k);
    for (label, series) in groups.iter() {
        let summary = five_number_summary(series.values()).ok_or_else(|| {
            AnalysisError::CalculationError(format!("group '{label}' is empty"))
        })?;
        chart_groups.push(GroupChart {
            label: label.to_string(),
            values: series.values().to_vec(),
            summary,
        });
    }

    let dropped = groups.dropped();
    let mut interpretation = if significant {
        format!(
            "Significant difference detected between groups (F = {f_statistic:.3}, \
             p = {p_value:.4}). At least one group mean differs from the others."
        )
    } else {
        format!(
            "No significant difference between group means (F = {f_statistic:.3}, \
             p = {p_value:.4}). Groups appear statistically similar."
        )
    };
    if dropped > 0 {
        interpretation.push_str(&format!(
            " {dropped} non-finite value(s) were removed before analysis."
        ));
    }

    Ok(AnalysisResult {
        analysis: AnalysisKind::Anova,
        statistics,
        classification: Classification::Anova(AnovaClassification {
            significant,
            group_statistics,
            comparisons,
        }),
        chart: ChartPayload::Anova(AnovaChart {
            groups: chart_groups,
        }),
        interpretation,
    })
}
