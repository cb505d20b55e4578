//! Ordered field lookup: candidate keys are tried in sequence and the first
//! present, non-null value wins.

use serde_json::{Number, Value};

use crate::record::{coerce_number, MetricRecord};

pub const UNKNOWN_LABEL: &str = "Unknown";

pub fn first_defined<'a>(record: &'a MetricRecord, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(key))
}

pub fn label_of(record: &MetricRecord, keys: &[&str]) -> String {
    match first_defined(record, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_label(n),
        Some(other) => other.to_string(),
        None => UNKNOWN_LABEL.to_string(),
    }
}

/// Whole-valued floats print without a fraction (`1.0` -> "1"), negative
/// zero prints as "0".
fn number_label(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

pub fn number_of(record: &MetricRecord, keys: &[&str]) -> f64 {
    first_defined(record, keys).map(coerce_number).unwrap_or(0.0)
}
