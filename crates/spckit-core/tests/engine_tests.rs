//! End-to-end tests through the public request/response API.

use spckit_core::probplot::DistributionFamily;
use spckit_core::{analyze, handle, AnalysisRequest, Classification, ErrorKind};
use spckit_stats::{default_functions, SpecialFunctions};

fn i_chart_request(data: &[f64]) -> AnalysisRequest {
    AnalysisRequest::IChart {
        data: data.to_vec(),
    }
}

#[test]
fn i_chart_reference_series() {
    let request = i_chart_request(&[10.0, 11.0, 11.3, 9.0, 8.0, 9.0, 9.5, 10.1, 11.4]);
    let result = analyze(&request).unwrap();

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
fn i_chart_limit_symmetry_holds_for_many_inputs() {
    let samples: [&[f64]; 3] = [
        &[1.0, 2.0, 3.0, 4.0, 5.0],
        &[0.1, 0.5, 0.2, 0.9, 0.4, 0.6],
        &[-3.0, -1.0, -2.5, -0.5, -1.5],
    ];
    for data in samples {
        let result = analyze(&i_chart_request(data)).unwrap();
        let stat = |name: &str| result.statistics[name].unwrap();
        assert!(
            ((stat("ucl") - stat("mean")) - (stat("mean") - stat("lcl"))).abs() < 1e-9,
            "asymmetric limits for {data:?}"
        );
        assert!(stat("ucl") > stat("mean"));
        assert!(stat("mean") > stat("lcl"));
    }
}

#[test]
fn capability_constant_series_reports_calculation_error() {
    let request = AnalysisRequest::Capability {
        data: vec![10.0; 30],
        lower: Some(9.5),
        upper: Some(10.5),
        target: None,
    };
    let err = analyze(&request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CalculationError);

    let response = handle(&request);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["kind"], "CALCULATION_ERROR");
}

#[test]
fn capability_cp_dominates_cpk_off_center() {
    let request = AnalysisRequest::Capability {
        data: vec![10.1, 10.2, 10.15, 10.25, 10.2, 10.1, 10.18, 10.22],
        lower: Some(9.5),
        upper: Some(10.5),
        target: None,
    };
    let result = analyze(&request).unwrap();
    let cp = result.statistics["cp"].unwrap();
    let cpk = result.statistics["cpk"].unwrap();
    assert!(cp > cpk);
}

#[test]
fn anova_reference_groups_reproducible() {
    let request = AnalysisRequest::Anova {
        groups: vec![
            ("A".to_string(), vec![9.8, 10.2, 9.9, 10.1]),
            ("B".to_string(), vec![10.1, 10.3, 10.0, 10.4]),
            ("C".to_string(), vec![9.7, 9.9, 9.8, 10.0]),
        ],
        alpha: 0.05,
    };
    let first = analyze(&request).unwrap();
    let second = analyze(&request).unwrap();
    assert_eq!(first.statistics["f_statistic"], second.statistics["f_statistic"]);
    assert_eq!(first.statistics["p_value"], second.statistics["p_value"]);
    assert!(first.statistics["f_statistic"].unwrap() > 0.0);

    let Classification::Anova(ref c) = first.classification else {
        panic!("wrong classification variant");
    };
    assert_eq!(c.group_statistics.len(), 3);
    assert_eq!(c.comparisons.len(), 3);
}

#[test]
fn pareto_reference_tally_vital_few() {
    let request = AnalysisRequest::Pareto {
        categories: vec![
            ("Surface".to_string(), 45.0),
            ("Dimensional".to_string(), 32.0),
            ("Assembly".to_string(), 18.0),
            ("Material".to_string(), 12.0),
            ("Other".to_string(), 8.0),
        ],
        threshold: 0.8,
    };
    let result = analyze(&request).unwrap();
    let Classification::Pareto(ref c) = result.classification else {
        panic!("wrong classification variant");
    };
    assert_eq!(c.vital_few, vec!["Surface", "Dimensional", "Assembly"]);
    let share = result.statistics["vital_few_percentage"].unwrap();
    assert!((share - 82.6).abs() < 0.1);
}

#[test]
fn probability_plot_normal_identity() {
    // Data generated from a perfect normal-quantile sequence correlates
    // to 1 against its own fitted quantiles.
    let fns = default_functions();
    let n = 20;
    let request = AnalysisRequest::ProbabilityPlot {
        data: (1..=n)
            .map(|i| {
                let p = (i as f64 - 0.5) / n as f64;
                100.0 + 5.0 * fns.normal_inv_cdf(p)
            })
            .collect(),
        distribution: DistributionFamily::Normal,
        confidence_level: 0.95,
    };
    let result = analyze(&request).unwrap();
    let r = result.statistics["correlation"].unwrap();
    assert!(r > 0.999, "r = {r}");
}

#[test]
fn validation_errors_surface_with_stable_kinds() {
    let cases: Vec<(AnalysisRequest, &str)> = vec![
        (i_chart_request(&[]), "EMPTY_INPUT"),
        (i_chart_request(&[1.0, 2.0]), "TOO_FEW_POINTS"),
        (
            i_chart_request(&[f64::NAN, f64::INFINITY, f64::NAN]),
            "ALL_NON_FINITE",
        ),
        (
            AnalysisRequest::Anova {
                groups: vec![("only".to_string(), vec![1.0, 2.0])],
                alpha: 0.05,
            },
            "INSUFFICIENT_GROUPS",
        ),
        (
            AnalysisRequest::Capability {
                data: vec![1.0, 2.0, 3.0],
                lower: Some(5.0),
                upper: Some(4.0),
                target: None,
            },
            "INVALID_SPEC_LIMITS",
        ),
        (
            AnalysisRequest::ProbabilityPlot {
                data: vec![-1.0, 2.0, 3.0],
                distribution: DistributionFamily::Lognormal,
                confidence_level: 0.95,
            },
            "INVALID_DISTRIBUTION_PARAMETER",
        ),
    ];

    for (request, expected_kind) in cases {
        let response = handle(&request);
        assert!(!response.success);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"]["kind"], expected_kind, "for {expected_kind}");
    }
}

#[test]
fn dropped_values_are_counted_and_reported() {
    let request = i_chart_request(&[10.0, f64::NAN, 11.0, 11.3, f64::INFINITY, 9.0, 8.0]);
    let result = analyze(&request).unwrap();
    assert_eq!(result.statistics["sample_size"].unwrap(), 5.0);
    assert!(result.interpretation.contains("2 non-finite values"));
}

#[test]
fn chart_payload_is_renderer_complete() {
    // The renderer contract: raw series plus derived lines, no
    // re-derivation needed.
    let result = analyze(&i_chart_request(&[
        10.0, 11.0, 11.3, 9.0, 8.0, 9.0, 9.5, 10.1, 11.4,
    ]))
    .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["chart"]["values"].as_array().unwrap().len(), 9);
    assert!(json["chart"]["center"].is_number());
    assert!(json["chart"]["zone_one_sigma"].is_array());

    let request = AnalysisRequest::ProbabilityPlot {
        data: vec![3.0, 1.0, 2.0, 5.0, 4.0, 6.0, 8.0, 7.0],
        distribution: DistributionFamily::Normal,
        confidence_level: 0.95,
    };
    let result = analyze(&request).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let sorted = json["chart"]["sorted_values"].as_array().unwrap();
    assert_eq!(sorted.len(), 8);
    assert!(sorted[0].as_f64().unwrap() < sorted[7].as_f64().unwrap());
    assert!(json["chart"]["theoretical_quantiles"].is_array());
    assert!(json["chart"]["band_lower"].is_array());
}
