//! Randomised trials over the classify/aggregate pipeline.
//!
//! Generates seeded random chart payloads (sparse fields, numeric strings,
//! zeros, junk) and checks that:
//! - every ChartSpec has parallel labels/values/secondary
//! - classification is deterministic
//! - aggregation conserves the total and respects its grouping guard
//!
//! Usage: SEED=42 TRIALS=5000 cargo run --bin trials

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Map, Value};

use stakeboard::aggregate::{aggregate, OTHERS_LABEL};
use stakeboard::classify::classify;
use stakeboard::record::{ChartData, MetricRecord};

const CATEGORIES: [&str; 5] = ["economic_security", "operators", "vaults", "curators", "collateral"];
const CHARTS: [&str; 7] = [
    "distribution",
    "concentration",
    "operator_details",
    "collateral_utilization",
    "stake_distribution",
    "vault_and_collateral_counts",
    "curator_stats",
];

fn random_value(rng: &mut StdRng) -> Value {
    match rng.gen_range(0..10) {
        0 => Value::Null,
        1 => json!("n/a"),
        2 => json!(format!("{:.2}%", rng.gen_range(0.0..100.0))),
        3 => json!(0),
        _ => json!(rng.gen_range(0.0..1_000.0)),
    }
}

fn random_records(rng: &mut StdRng) -> ChartData {
    let n = rng.gen_range(0..20);
    let keys = [
        "percentage",
        "value",
        "usd_value",
        "vault_count",
        "utilization_percentage",
        "max_limit",
    ];
    let rows = (0..n)
        .map(|i| {
            let mut m = Map::new();
            if rng.gen_bool(0.8) {
                m.insert("asset".to_string(), json!(format!("asset-{}", i)));
            }
            for key in keys {
                if rng.gen_bool(0.5) {
                    m.insert(key.to_string(), random_value(rng));
                }
            }
            MetricRecord::from(m)
        })
        .collect();
    ChartData::Records(rows)
}

#[derive(Default)]
struct Tally {
    trials: u64,
    grouped: u64,
    violations: Vec<String>,
}

fn main() -> Result<()> {
    let seed: u64 = std::env::var("SEED").ok().and_then(|v| v.parse().ok()).unwrap_or(42);
    let trials: u64 = std::env::var("TRIALS").ok().and_then(|v| v.parse().ok()).unwrap_or(5_000);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tally = Tally::default();

    for t in 0..trials {
        tally.trials += 1;
        let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let chart = CHARTS[rng.gen_range(0..CHARTS.len())];
        let data = random_records(&mut rng);

        let spec = classify(category, chart, &data);
        if spec != classify(category, chart, &data) {
            tally.violations.push(format!("trial {}: non-deterministic classify", t));
        }
        if spec.labels.len() != spec.values.len()
            || spec.secondary.as_ref().is_some_and(|s| s.len() != spec.labels.len())
        {
            tally.violations.push(format!("trial {}: series length mismatch", t));
        }

        let threshold = rng.gen_range(0.5..20.0);
        let min_count = rng.gen_range(0..10);
        let slices = aggregate(&spec.labels, &spec.values, threshold, min_count)?;
        let total: f64 = spec.values.iter().sum();
        let out: f64 = slices.iter().map(|s| s.value).sum();
        if (out - total).abs() > 1e-9 * total.abs().max(1.0) {
            tally
                .violations
                .push(format!("trial {}: total {} became {}", t, total, out));
        }
        if let Some(others) = slices.iter().find(|s| s.is_others) {
            tally.grouped += 1;
            if spec.labels.len() <= min_count || others.label != OTHERS_LABEL {
                tally
                    .violations
                    .push(format!("trial {}: grouped with {} labels", t, spec.labels.len()));
            }
        }
    }

    let summary = json!({
        "seed": seed,
        "trials": tally.trials,
        "grouped": tally.grouped,
        "violations": tally.violations.len(),
        "first_violations": tally.violations.iter().take(10).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if !tally.violations.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
