//! Input rows as decoded from report JSON.
//!
//! Records are open maps: the report generator adds fields freely and older
//! reports lack newer ones. Everything here is tolerant of that; a field that
//! is absent or malformed reads as "not there" and numbers coerce to 0.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of a chart's data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricRecord(Map<String, Value>);

impl MetricRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Field value, treating explicit JSON `null` the same as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn fields(&self) -> RecordFields {
        RecordFields::from_record(self)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for MetricRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// The optional fields the classifier knows about.
///
/// Capability checks ("does this row carry a percentage?") go through this
/// schema rather than probing the raw map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordFields {
    pub percentage: Option<Value>,
    pub value: Option<Value>,
    pub usd_value: Option<Value>,
    pub vault_count: Option<Value>,
    pub utilization_percentage: Option<Value>,
    pub max_limit: Option<Value>,
    pub asset: Option<Value>,
    pub operator_id: Option<Value>,
    pub curator_id: Option<Value>,
    pub label: Option<Value>,
    pub name: Option<Value>,
}

impl RecordFields {
    pub fn from_record(record: &MetricRecord) -> Self {
        let pick = |key: &str| record.get(key).cloned();
        Self {
            percentage: pick("percentage"),
            value: pick("value"),
            usd_value: pick("usd_value"),
            vault_count: pick("vault_count"),
            utilization_percentage: pick("utilization_percentage"),
            max_limit: pick("max_limit"),
            asset: pick("asset"),
            operator_id: pick("operator_id"),
            curator_id: pick("curator_id"),
            label: pick("label"),
            name: pick("name"),
        }
    }

    pub fn has_percentage(&self) -> bool {
        self.percentage.is_some()
    }
}

/// Payload for a single chart: a sequence of rows, or a flat
/// label -> number mapping (used by a few economic-security charts).
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Records(Vec<MetricRecord>),
    Mapping(Map<String, Value>),
}

impl ChartData {
    /// Interpret a report section entry as chart data.
    ///
    /// Arrays become record sequences (non-object items are skipped).
    /// Objects whose values are all scalars become mappings. Anything else
    /// is not chartable and yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(ChartData::Records(
                items
                    .iter()
                    .filter_map(|item| item.as_object().cloned().map(MetricRecord::from))
                    .collect(),
            )),
            Value::Object(map) if !map.is_empty() && map.values().all(is_scalar) => {
                Some(ChartData::Mapping(map.clone()))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChartData::Records(rows) => rows.len(),
            ChartData::Mapping(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn first_record(&self) -> Option<&MetricRecord> {
        match self {
            ChartData::Records(rows) => rows.first(),
            ChartData::Mapping(_) => None,
        }
    }
}

fn is_scalar(v: &Value) -> bool {
    matches!(v, Value::Number(_) | Value::String(_) | Value::Null)
}

/// Permissive number conversion.
///
/// Numbers pass through; strings are read up to the longest numeric prefix
/// (`"12.5%"` -> 12.5, `" 3e2 units"` -> 300). Anything that does not yield a
/// finite-or-infinite number reads as NaN, and NaN is normalized to 0.
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    };
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mantissa_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - mantissa_start;
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        digits += end - frac_start;
    }
    if digits == 0 {
        return f64::NAN;
    }

    // exponent only counts when at least one digit follows it
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> MetricRecord {
        MetricRecord::from(v.as_object().unwrap().clone())
    }

    #[test]
    fn test_coerce_numbers_and_strings() {
        assert_eq!(coerce_number(&json!(42.5)), 42.5);
        assert_eq!(coerce_number(&json!("17")), 17.0);
        assert_eq!(coerce_number(&json!("12.5%")), 12.5);
        assert_eq!(coerce_number(&json!("  -3.25 units")), -3.25);
        assert_eq!(coerce_number(&json!("1e3")), 1000.0);
        assert_eq!(coerce_number(&json!(".5")), 0.5);
    }

    #[test]
    fn test_coerce_garbage_is_zero() {
        assert_eq!(coerce_number(&json!("n/a")), 0.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("-")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&json!({"a": 1})), 0.0);
    }

    #[test]
    fn test_dangling_exponent_is_ignored() {
        assert_eq!(coerce_number(&json!("7e")), 7.0);
        assert_eq!(coerce_number(&json!("7e+")), 7.0);
    }

    #[test]
    fn test_null_field_reads_as_absent() {
        let r = record(json!({"percentage": null, "value": 3}));
        assert!(r.get("percentage").is_none());
        assert!(!r.fields().has_percentage());
        assert!(r.fields().value.is_some());
    }

    #[test]
    fn test_chart_data_from_array_skips_scalars() {
        let data = ChartData::from_value(&json!([{"asset": "ETH"}, 4, {"asset": "BTC"}])).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.first_record().unwrap().get("asset"), Some(&json!("ETH")));
    }

    #[test]
    fn test_chart_data_mapping_keeps_order() {
        let data = ChartData::from_value(&json!({"zeta": 10, "alpha": "20"})).unwrap();
        match data {
            ChartData::Mapping(map) => {
                let keys: Vec<_> = map.keys().cloned().collect();
                assert_eq!(keys, vec!["zeta", "alpha"]);
            }
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_object_is_not_chart_data() {
        assert!(ChartData::from_value(&json!({"inner": {"a": 1}})).is_none());
        assert!(ChartData::from_value(&json!(5)).is_none());
        assert!(ChartData::from_value(&json!({})).is_none());
    }
}
