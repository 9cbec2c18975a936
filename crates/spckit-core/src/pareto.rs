//! Pareto ranking engine.
//!
//! Categories are ranked by value descending with a stable sort, so ties
//! keep their insertion order and the ranking is fully deterministic.
//! The vital few is the shortest leading prefix whose cumulative share
//! first reaches the threshold. Concentration is summarized by a
//! Gini-style coefficient computed from the trapezoidal area under the
//! ascending Lorenz curve of category shares.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::result::{
    insert_stat, AnalysisKind, AnalysisResult, ChartPayload, Classification, Statistics,
};
use crate::types::CategoryTally;

/// Classification section of a Pareto result.
#[derive(Debug, Clone, Serialize)]
pub struct ParetoClassification {
    /// Labels of the vital-few prefix, in ranked order.
    pub vital_few: Vec<String>,
}

/// Renderer payload: the ranked bar-and-cumulative-line data.
#[derive(Debug, Clone, Serialize)]
pub struct ParetoChart {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub percentages: Vec<f64>,
    pub cumulative_percentages: Vec<f64>,
}

/// Gini concentration coefficient of non-negative category values.
///
/// 1 - 2 * (area under the ascending Lorenz curve, normalized by the
/// category count). Zero for perfectly even values, approaching 1 - 1/n
/// when a single category carries everything.
fn gini_coefficient(values: &[f64], total: f64) -> f64 {
    let mut ascending = values.to_vec();
    ascending.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut cumulative = 0.0;
    let mut prev_share = 0.0;
    let mut area = 0.0;
    for v in &ascending {
        cumulative += v;
        let share = cumulative / total;
        area += (prev_share + share) / 2.0;
        prev_share = share;
    }
    1.0 - 2.0 * (area / ascending.len() as f64)
}

fn gini_note(gini: f64) -> &'static str {
    if gini < 0.2 {
        "values are relatively evenly distributed"
    } else if gini < 0.5 {
        "some concentration of values"
    } else if gini < 0.8 {
        "significant concentration in few categories"
    } else {
        "extreme concentration in few categories"
    }
}

/// Rank a validated tally and identify the vital few at `threshold`
/// (a fraction in (0, 1], e.g. 0.8 for the 80/20 rule).
pub fn pareto(tally: &CategoryTally, threshold: f64) -> Result<AnalysisResult> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(AnalysisError::InvalidDistributionParameter(format!(
            "vital-few threshold must be in (0, 1], got {threshold}"
        )));
    }

    let total = tally.total();
    if total <= 0.0 {
        return Err(AnalysisError::CalculationError(
            "total category value is zero; percentages are undefined".to_string(),
        ));
    }

    // Stable descending sort: ties keep insertion order
    let mut ranked: Vec<(&str, f64)> = tally.iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

    let categories: Vec<String> = ranked.iter().map(|(label, _)| label.to_string()).collect();
    let values: Vec<f64> = ranked.iter().map(|(_, v)| *v).collect();

    let percentages: Vec<f64> = values.iter().map(|v| v / total * 100.0).collect();
    let mut cumulative_percentages = Vec::with_capacity(percentages.len());
    let mut running = 0.0;
    for pct in &percentages {
        running += pct;
        cumulative_percentages.push(running);
    }

    let cutoff = threshold * 100.0;
    let mut vital_few = Vec::new();
    let mut vital_few_percentage = 0.0;
    for (label, &cum) in categories.iter().zip(cumulative_percentages.iter()) {
        vital_few.push(label.clone());
        vital_few_percentage = cum;
        if cum >= cutoff {
            break;
        }
    }

    let gini = gini_coefficient(&values, total);

    let mut statistics = Statistics::new();
    insert_stat(&mut statistics, "total", total);
    insert_stat(&mut statistics, "category_count", categories.len() as f64);
    insert_stat(&mut statistics, "vital_few_count", vital_few.len() as f64);
    insert_stat(&mut statistics, "vital_few_percentage", vital_few_percentage);
    insert_stat(&mut statistics, "gini_coefficient", gini);
    insert_stat(&mut statistics, "threshold", threshold);

    let interpretation = format!(
        "Pareto analysis identifies {} out of {} categories ({:.1}%) as the vital few, \
         accounting for {vital_few_percentage:.1}% of total impact. \
         Gini coefficient {gini:.2}: {}.",
        vital_few.len(),
        categories.len(),
        vital_few.len() as f64 / categories.len() as f64 * 100.0,
        gini_note(gini)
    );

    Ok(AnalysisResult {
        analysis: AnalysisKind::Pareto,
        statistics,
        classification: Classification::Pareto(ParetoClassification { vital_few }),
        chart: ChartPayload::Pareto(ParetoChart {
            categories,
            values,
            percentages,
            cumulative_percentages,
        }),
        interpretation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::validate::validate_tally;

    fn tally(raw: &[(&str, f64)]) -> CategoryTally {
        let owned: Vec<(String, f64)> = raw
            .iter()
            .map(|(label, v)| (label.to_string(), *v))
            .collect();
        validate_tally(&owned).unwrap()
    }

    fn reference() -> CategoryTally {
        tally(&[
            ("Surface", 45.0),
            ("Dimensional", 32.0),
            ("Assembly", 18.0),
            ("Material", 12.0),
            ("Other", 8.0),
        ])
    }

    #[test]
    fn test_reference_vital_few() {
        let result = pareto(&reference(), 0.8).unwrap();
        let Classification::Pareto(ref c) = result.classification else {
            panic!("wrong classification variant");
        };
        assert_eq!(c.vital_few, vec!["Surface", "Dimensional", "Assembly"]);
        let vp = result.statistics["vital_few_percentage"].unwrap();
        assert!((vp - 82.6).abs() < 0.1, "vital few share = {vp}");
    }

    #[test]
    fn test_cumulative_percentages_non_decreasing_to_100() {
        let result = pareto(&reference(), 0.8).unwrap();
        let ChartPayload::Pareto(ref chart) = result.chart else {
            panic!("wrong chart variant");
        };
        for w in chart.cumulative_percentages.windows(2) {
            assert!(w[1] >= w[0]);
        }
        let last = chart.cumulative_percentages.last().unwrap();
        assert!((last - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_vital_few_grows_with_threshold() {
        let mut last_len = 0;
        for threshold in [0.2, 0.5, 0.8, 0.95, 1.0] {
            let result = pareto(&reference(), threshold).unwrap();
            let Classification::Pareto(ref c) = result.classification else {
                panic!("wrong classification variant");
            };
            assert!(
                c.vital_few.len() >= last_len,
                "vital few shrank at threshold {threshold}"
            );
            last_len = c.vital_few.len();
        }
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let result = pareto(
            &tally(&[("first", 10.0), ("second", 10.0), ("third", 20.0)]),
            1.0,
        )
        .unwrap();
        let ChartPayload::Pareto(ref chart) = result.chart else {
            panic!("wrong chart variant");
        };
        assert_eq!(chart.categories, vec!["third", "first", "second"]);
    }

    #[test]
    fn test_zero_total_is_calculation_error() {
        let err = pareto(&tally(&[("a", 0.0), ("b", 0.0)]), 0.8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CalculationError);
    }

    #[test]
    fn test_bad_threshold_rejected() {
        let err = pareto(&reference(), 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDistributionParameter);
        let err = pareto(&reference(), 1.2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDistributionParameter);
    }

    #[test]
    fn test_gini_even_and_concentrated() {
        let even = pareto(&tally(&[("a", 10.0), ("b", 10.0), ("c", 10.0)]), 0.8).unwrap();
        assert!(even.statistics["gini_coefficient"].unwrap().abs() < 1e-12);

        let concentrated =
            pareto(&tally(&[("big", 100.0), ("tiny", 0.1), ("mini", 0.1)]), 0.8).unwrap();
        let gini = concentrated.statistics["gini_coefficient"].unwrap();
        assert!(gini > 0.6, "gini = {gini}");
    }
}
