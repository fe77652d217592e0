mod common;
use common::assert_float_eq;

use hedge_model::output::HedgeOutcome;
use hedge_model::stats::{SampleMetric, Summary};

fn row(technique: &str, response_time: f64, system_load: f64) -> HedgeOutcome {
    HedgeOutcome {
        technique: technique.to_string(),
        app: "constant_constant-app".to_string(),
        func: "f".to_string(),
        end_timestamp: response_time,
        response_time,
        system_load,
        service_time: response_time,
        copy_service_time: 0.,
        delay: 0.,
    }
}

#[test]
fn test_quantiles_degenerate() {
    let mut m: SampleMetric = Default::default();
    let init = 111111.0;
    m.add(init);
    for q in &[0.0, 0.25, 0.5, 0.75, 1.0] {
        assert_float_eq(m.quantile(*q), init, 1e-9);
    }
}

#[test]
fn test_quantiles_simple() {
    let mut m: SampleMetric = Default::default();
    for i in (0..11).rev() {
        m.add(i as f64);
    }
    for q in &[0.0, 0.25, 0.5, 0.75, 1.0] {
        assert_float_eq(m.quantile(*q), 10.0 * (*q), 1e-12);
    }
}

#[test]
fn test_simple_methods() {
    let mut m: SampleMetric = Default::default();
    assert!(m.is_empty());
    assert!(m.quantile(0.5).is_nan());
    for i in 0..111 {
        m.add(i as f64);
    }
    assert_eq!(m.len(), 111);
    assert_float_eq(m.sum(), 6105.0, 1e-12);
    assert_float_eq(m.mean(), 55.0, 1e-12);
    assert_float_eq(m.min().unwrap(), 0.0, 1e-12);
    assert_float_eq(m.max().unwrap(), 110.0, 1e-12);
}

#[test]
fn test_summary_groups_by_technique() {
    let rows = vec![
        row("baseline", 10., 10.),
        row("naive_hedge", 4., 14.),
        row("baseline", 20., 20.),
        row("naive_hedge", 20., 40.),
    ];
    let summary = Summary::from_rows(&rows);
    let techniques: Vec<&str> = summary.techniques.keys().map(|s| s.as_str()).collect();
    assert_eq!(techniques, vec!["baseline", "naive_hedge"]);
    let naive = &summary.techniques["naive_hedge"];
    assert_float_eq(naive.response_time.mean(), 12., 1e-12);
    assert_float_eq(naive.system_load.sum(), 54., 1e-12);
}
