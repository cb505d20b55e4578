//! Small-slice folding for pie and doughnut charts.
//!
//! Slices under a percentage threshold are collapsed into one synthetic
//! "Others" slice so legends stay readable. Values are never rounded here;
//! the output sums to exactly the input total.

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

pub const OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSlice {
    pub label: String,
    pub value: f64,
    pub is_others: bool,
}

impl AggregatedSlice {
    fn plain(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
            is_others: false,
        }
    }
}

/// Grouping constants for one call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OthersPolicy {
    pub threshold_percent: f64,
    pub min_count_to_group: usize,
}

impl OthersPolicy {
    pub const fn new(threshold_percent: f64, min_count_to_group: usize) -> Self {
        Self {
            threshold_percent,
            min_count_to_group,
        }
    }
}

impl Default for OthersPolicy {
    fn default() -> Self {
        Self::new(5.0, 5)
    }
}

pub fn aggregate_with(labels: &[String], values: &[f64], policy: OthersPolicy) -> Result<Vec<AggregatedSlice>> {
    aggregate(labels, values, policy.threshold_percent, policy.min_count_to_group)
}

/// Fold slices below `threshold_percent` of the total into "Others".
///
/// Grouping only happens when there are more than `min_count_to_group`
/// labels *and* at least two small slices. A slice exactly at the threshold
/// stays on its own. A zero total returns everything ungrouped.
pub fn aggregate(
    labels: &[String],
    values: &[f64],
    threshold_percent: f64,
    min_count_to_group: usize,
) -> Result<Vec<AggregatedSlice>> {
    if labels.len() != values.len() {
        return Err(DashError::LengthMismatch {
            labels: labels.len(),
            values: values.len(),
        });
    }

    let ungrouped = || {
        labels
            .iter()
            .zip(values)
            .map(|(l, v)| AggregatedSlice::plain(l, *v))
            .collect::<Vec<_>>()
    };

    let total: f64 = values.iter().sum();
    if total == 0.0 {
        return Ok(ungrouped());
    }

    let (small, big): (Vec<usize>, Vec<usize>) =
        (0..values.len()).partition(|&i| values[i] / total * 100.0 < threshold_percent);

    if labels.len() <= min_count_to_group || small.len() < 2 {
        return Ok(ungrouped());
    }

    let mut out: Vec<AggregatedSlice> = big
        .iter()
        .map(|&i| AggregatedSlice::plain(&labels[i], values[i]))
        .collect();
    out.push(AggregatedSlice {
        label: OTHERS_LABEL.to_string(),
        value: small.iter().map(|&i| values[i]).sum(),
        is_others: true,
    });
    Ok(out)
}
