//! End-to-end checks of the classify -> aggregate pipeline against the
//! behaviour existing dashboards rely on.

use serde_json::{json, Value};

use stakeboard::aggregate::{aggregate, OTHERS_LABEL};
use stakeboard::classify::{classify, Archetype};
use stakeboard::config::Config;
use stakeboard::record::ChartData;
use stakeboard::render::{plan_chart, ChartKind};

fn data(v: Value) -> ChartData {
    ChartData::from_value(&v).expect("chartable payload")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_rows() -> ChartData {
    data(json!([
        {"operator_id": "op-a", "percentage": "41.2", "value": 1200},
        {"operator_id": "op-b", "percentage": 30},
        {"operator_id": null, "name": "fallback", "percentage": 3.1},
        {"percentage": "junk"}
    ]))
}

// ---------------------------------------------------------------------------
// S01: classify is deterministic
// ---------------------------------------------------------------------------
#[test]
fn s01_classify_deterministic() {
    let rows = sample_rows();
    for (cat, chart) in [
        ("operators", "concentration"),
        ("operators", "operator_details"),
        ("vaults", "metrics"),
        ("economic_security", "restaked"),
    ] {
        assert_eq!(classify(cat, chart, &rows), classify(cat, chart, &rows));
    }
}

// ---------------------------------------------------------------------------
// S02: labels and values stay parallel
// ---------------------------------------------------------------------------
#[test]
fn s02_series_parallel() {
    let rows = sample_rows();
    for chart in ["concentration", "collateral_utilization", "stake_distribution", "x"] {
        let spec = classify("operators", chart, &rows);
        assert_eq!(spec.labels.len(), spec.values.len());
        if let Some(limits) = &spec.secondary {
            assert_eq!(limits.len(), spec.labels.len());
        }
    }
}

// ---------------------------------------------------------------------------
// S03: aggregation conserves the total
// ---------------------------------------------------------------------------
#[test]
fn s03_conservation() {
    let cases: Vec<Vec<f64>> = vec![
        vec![40.0, 30.0, 15.0, 7.0, 4.0, 4.0],
        vec![0.1, 0.2, 0.3, 0.4, 98.0, 0.5, 0.5],
        vec![1.0; 40],
        vec![1e6, 3.3, 2.2, 1.1, 0.0, 0.0, 7.7],
    ];
    for values in cases {
        let labels: Vec<String> = (0..values.len()).map(|i| format!("s{}", i)).collect();
        let out = aggregate(&labels, &values, 5.0, 5).unwrap();
        let before: f64 = values.iter().sum();
        let after: f64 = out.iter().map(|s| s.value).sum();
        assert!((before - after).abs() < 1e-9 * before.abs().max(1.0), "{} != {}", before, after);
    }
}

// ---------------------------------------------------------------------------
// S04: threshold boundary is strict
// ---------------------------------------------------------------------------
#[test]
fn s04_threshold_boundary() {
    let labels = strings(&["A", "B", "C", "D", "E", "F"]);
    let at = aggregate(&labels, &[40.0, 30.0, 10.0, 8.0, 7.0, 5.0], 5.0, 5).unwrap();
    assert!(at.iter().all(|s| !s.is_others));

    let below = aggregate(&labels, &[40.0, 30.0, 10.0, 8.0, 7.0 + 0.2, 4.8], 5.0, 5).unwrap();
    // only one slice under 5%: guard keeps everything
    assert!(below.iter().all(|s| !s.is_others));

    let two_below = aggregate(&labels, &[40.0, 30.0, 15.5, 5.0, 4.75, 4.75], 5.0, 5).unwrap();
    let others = two_below.last().unwrap();
    assert!(others.is_others);
    assert!((others.value - 9.5).abs() < 1e-9);
    assert!(two_below.iter().any(|s| s.label == "D" && !s.is_others));
}

// ---------------------------------------------------------------------------
// S05: grouping guard
// ---------------------------------------------------------------------------
#[test]
fn s05_grouping_guard() {
    let five = strings(&["a", "b", "c", "d", "e"]);
    let out = aggregate(&five, &[96.0, 1.0, 1.0, 1.0, 1.0], 5.0, 5).unwrap();
    assert_eq!(out.len(), 5);

    let six = strings(&["a", "b", "c", "d", "e", "f"]);
    let out = aggregate(&six, &[20.0, 20.0, 20.0, 20.0, 17.0, 3.0], 5.0, 5).unwrap();
    assert_eq!(out.len(), 6);
}

// ---------------------------------------------------------------------------
// S06: utilization detection wins over any category
// ---------------------------------------------------------------------------
#[test]
fn s06_utilization_detection() {
    let rows = data(json!([{"asset": "wstETH", "utilization_percentage": 71.5, "max_limit": "5000"}]));
    let spec = classify("collateral", "collateral_utilization", &rows);
    assert_eq!(spec.archetype, Archetype::Utilization);
    assert_eq!(spec.values, vec![71.5]);
    assert_eq!(spec.secondary, Some(vec![5000.0]));
}

// ---------------------------------------------------------------------------
// S07: operators pie vs bar
// ---------------------------------------------------------------------------
#[test]
fn s07_operator_pie_vs_bar() {
    let rows = sample_rows();
    let cfg = Config::default();
    // the "distribution" substring rule fires before the operators rule
    let dist = plan_chart("op-dist", "operators", "distribution", &rows, &cfg).unwrap();
    assert_eq!(dist.archetype, Archetype::Distribution);
    assert_eq!(dist.kind, ChartKind::Doughnut);
    assert!(dist.kind.is_circular());
    let conc = classify("operators", "concentration", &rows);
    assert_eq!(conc.archetype, Archetype::Pie);
    let details = classify("operators", "operator_details", &rows);
    assert_eq!(details.archetype, Archetype::Bar);
    let plan = plan_chart("op-details", "operators", "operator_details", &rows, &cfg).unwrap();
    assert_eq!(plan.kind, ChartKind::Bar);
}

// ---------------------------------------------------------------------------
// S08: worked aggregation example
// ---------------------------------------------------------------------------
#[test]
fn s08_aggregation_example() {
    let labels = strings(&["A", "B", "C", "D", "E", "F"]);
    let out = aggregate(&labels, &[40.0, 30.0, 15.0, 7.0, 4.0, 4.0], 5.0, 5).unwrap();
    let values: Vec<f64> = out.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![40.0, 30.0, 15.0, 7.0, 8.0]);
    assert_eq!(out[4].label, OTHERS_LABEL);
    assert!(out[4].is_others);
    assert_eq!(values.iter().sum::<f64>(), 100.0);
}

// ---------------------------------------------------------------------------
// S09: zero total is passed through
// ---------------------------------------------------------------------------
#[test]
fn s09_zero_total() {
    let labels = strings(&["a", "b", "c"]);
    let out = aggregate(&labels, &[0.0, 0.0, 0.0], 5.0, 5).unwrap();
    assert_eq!(out.len(), 3);
    for (slice, label) in out.iter().zip(&labels) {
        assert_eq!(&slice.label, label);
        assert_eq!(slice.value, 0.0);
        assert!(!slice.is_others);
    }
}

// ---------------------------------------------------------------------------
// S10: missing value field reads as zero
// ---------------------------------------------------------------------------
#[test]
fn s10_missing_value_is_zero() {
    let rows = data(json!([{"asset": "cbETH"}, {"asset": "rETH", "value": "abc"}]));
    let spec = classify("economic_security", "collateral", &rows);
    assert_eq!(spec.archetype, Archetype::Generic);
    assert_eq!(spec.values, vec![0.0, 0.0]);
    assert_eq!(spec.labels, vec!["cbETH", "rETH"]);
}

#[test]
fn labels_fall_back_to_unknown() {
    let spec = classify("operators", "concentration", &sample_rows());
    assert_eq!(spec.labels, vec!["op-a", "op-b", "fallback", "Unknown"]);
    assert_eq!(spec.values, vec![41.2, 30.0, 3.1, 0.0]);
}
