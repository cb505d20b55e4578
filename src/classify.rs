//! Chart classification: pick an archetype for a (category, chart) pair and
//! pull the label/value series out of the raw records.
//!
//! The decision order below is load-bearing. Existing reports render the way
//! they do because rules are tried top to bottom and the first match wins.

use serde::{Deserialize, Serialize};

use crate::lookup::{label_of, number_of};
use crate::record::{coerce_number, ChartData, MetricRecord};
use crate::report::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Bar,
    Pie,
    Distribution,
    Utilization,
    /// Catch-all for charts no rule recognises; drawn with the bar renderer.
    Generic,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Bar => "bar",
            Archetype::Pie => "pie",
            Archetype::Distribution => "distribution",
            Archetype::Utilization => "utilization",
            Archetype::Generic => "generic",
        }
    }

    /// Whether the chart shows parts of a whole (and so gets an Others bucket).
    pub fn is_proportional(&self) -> bool {
        matches!(self, Archetype::Pie | Archetype::Distribution)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub archetype: Archetype,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Parallel series, currently only `max_limit` for utilization charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Vec<f64>>,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

const LABEL_KEYS: [&str; 5] = ["asset", "operator_id", "curator_id", "label", "name"];
const LIMIT_KEYS: [&str; 1] = ["max_limit"];

/// Decide the archetype only. Exposed separately so callers can pick a
/// renderer without extracting the series.
pub fn archetype_for(category_id: &str, chart_id: &str, data: &ChartData) -> Archetype {
    if chart_id.contains("utilization") {
        return Archetype::Utilization;
    }
    if chart_id.contains("distribution") {
        return Archetype::Distribution;
    }
    match Category::from_id(category_id) {
        Some(Category::Operators) => {
            if chart_id == "distribution" || chart_id == "concentration" {
                Archetype::Pie
            } else {
                Archetype::Bar
            }
        }
        Some(Category::Vaults) => Archetype::Pie,
        Some(Category::Curators) => {
            if chart_id.contains("distribution") {
                Archetype::Pie
            } else {
                Archetype::Bar
            }
        }
        _ => {
            let has_percentage = data
                .first_record()
                .map(|r| r.fields().has_percentage())
                .unwrap_or(false);
            if has_percentage {
                Archetype::Pie
            } else {
                Archetype::Generic
            }
        }
    }
}

/// Classify a chart and extract its series. Never fails: unknown labels read
/// as "Unknown" and unusable numbers as 0.
pub fn classify(category_id: &str, chart_id: &str, data: &ChartData) -> ChartSpec {
    let archetype = archetype_for(category_id, chart_id, data);

    let (labels, values, limits) = match data {
        ChartData::Records(rows) => extract_records(rows, category_id, chart_id, archetype),
        ChartData::Mapping(map) => {
            let labels: Vec<String> = map.keys().cloned().collect();
            let values: Vec<f64> = map.values().map(coerce_number).collect();
            let limits = vec![0.0; labels.len()];
            (labels, values, limits)
        }
    };

    ChartSpec {
        archetype,
        labels,
        values,
        secondary: (archetype == Archetype::Utilization).then_some(limits),
    }
}

fn extract_records(
    rows: &[MetricRecord],
    category_id: &str,
    chart_id: &str,
    archetype: Archetype,
) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let label_keys = label_keys(category_id);
    let value_keys = value_keys(archetype, chart_id);

    let mut labels = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len());
    let mut limits = Vec::new();
    for row in rows {
        labels.push(label_of(row, &label_keys));
        values.push(number_of(row, &value_keys));
        if archetype == Archetype::Utilization {
            limits.push(number_of(row, &LIMIT_KEYS));
        }
    }
    (labels, values, limits)
}

/// Category-specific label key first, then the shared chain.
fn label_keys(category_id: &str) -> Vec<&'static str> {
    let primary = match Category::from_id(category_id) {
        Some(Category::Operators) => "operator_id",
        Some(Category::Curators) => "curator_id",
        _ => "asset",
    };
    let mut keys = vec![primary];
    keys.extend(LABEL_KEYS.iter().copied().filter(|k| *k != primary));
    keys
}

fn value_keys(archetype: Archetype, chart_id: &str) -> Vec<&'static str> {
    let mut keys = Vec::with_capacity(4);
    match archetype {
        Archetype::Utilization => keys.push("utilization_percentage"),
        Archetype::Pie | Archetype::Distribution => keys.push("percentage"),
        Archetype::Bar | Archetype::Generic => {}
    }
    if chart_id.contains("usd") || chart_id.contains("tvl") || chart_id.contains("value") {
        keys.push("usd_value");
    }
    if chart_id.contains("count") {
        keys.push("vault_count");
    }
    keys.push("value");
    if matches!(archetype, Archetype::Bar | Archetype::Generic) {
        keys.push("percentage");
    }
    keys
}
