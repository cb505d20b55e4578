//! Chart plans: the classifier's output turned into a chart-library
//! configuration (kind, labels, series, colors), and the registry that owns
//! live plans per render target.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::aggregate::{aggregate_with, AggregatedSlice};
use crate::classify::{classify, Archetype};
use crate::config::Config;
use crate::error::{DashError, Result};
use crate::logging::{self, log, obj, v_str, Domain, Level};
use crate::record::ChartData;
use crate::report::CategoryDataset;

pub const PALETTE: [&str; 10] = [
    "#2196F3", "#4CAF50", "#FF9800", "#9C27B0", "#00BCD4", "#E91E63", "#FFEB3B", "#795548",
    "#3F51B5", "#8BC34A",
];
pub const OTHERS_COLOR: &str = "#9E9E9E";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Doughnut,
    Progress,
}

impl ChartKind {
    pub fn for_archetype(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Bar | Archetype::Generic => ChartKind::Bar,
            Archetype::Pie => ChartKind::Pie,
            Archetype::Distribution => ChartKind::Doughnut,
            Archetype::Utilization => ChartKind::Progress,
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPlan {
    pub target: String,
    pub category: String,
    pub chart_id: String,
    pub title: String,
    pub archetype: Archetype,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub others_grouped: bool,
}

/// "stake_distribution" -> "Stake Distribution"
pub fn humanize(id: &str) -> String {
    id.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn slice_colors(slices: &[AggregatedSlice]) -> Vec<String> {
    slices
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if s.is_others {
                OTHERS_COLOR.to_string()
            } else {
                PALETTE[i % PALETTE.len()].to_string()
            }
        })
        .collect()
}

/// Build the plan for one chart.
///
/// Fails only on caller errors: an empty target id, or a chart with nothing
/// to draw ("no chart rendered"). Bad field values were already defaulted by
/// the classifier.
pub fn plan_chart(
    target: &str,
    category_id: &str,
    chart_id: &str,
    data: &ChartData,
    cfg: &Config,
) -> Result<ChartPlan> {
    if target.is_empty() {
        return Err(DashError::MissingTarget(format!("{}.{}", category_id, chart_id)));
    }
    if data.is_empty() {
        logging::log_no_chart(target, chart_id, "no records");
        return Err(DashError::NoRecords {
            chart_id: chart_id.to_string(),
        });
    }

    let spec = classify(category_id, chart_id, data);
    logging::log_classified(category_id, chart_id, spec.archetype.as_str(), spec.len());

    let slices = match spec.archetype {
        Archetype::Pie => aggregate_with(&spec.labels, &spec.values, cfg.pie_others)?,
        Archetype::Distribution => aggregate_with(&spec.labels, &spec.values, cfg.distribution_others)?,
        _ => spec
            .labels
            .iter()
            .zip(&spec.values)
            .map(|(l, v)| AggregatedSlice {
                label: l.clone(),
                value: *v,
                is_others: false,
            })
            .collect(),
    };
    let others_grouped = slices.last().is_some_and(|s| s.is_others);
    if others_grouped {
        let others_value = slices.last().map(|s| s.value).unwrap_or(0.0);
        logging::log_others_grouped(chart_id, spec.len(), slices.len(), others_value);
    }

    let kind = ChartKind::for_archetype(spec.archetype);
    let title = humanize(chart_id);
    let mut datasets = vec![Dataset {
        label: if kind == ChartKind::Progress {
            "Utilization %".to_string()
        } else {
            title.clone()
        },
        data: slices.iter().map(|s| s.value).collect(),
        colors: slice_colors(&slices),
    }];
    if let Some(limits) = spec.secondary {
        datasets.push(Dataset {
            label: "Limit".to_string(),
            data: limits,
            colors: vec![OTHERS_COLOR.to_string(); slices.len()],
        });
    }

    Ok(ChartPlan {
        target: target.to_string(),
        category: category_id.to_string(),
        chart_id: chart_id.to_string(),
        title,
        archetype: spec.archetype,
        kind,
        labels: slices.into_iter().map(|s| s.label).collect(),
        datasets,
        others_grouped,
    })
}

/// Plan every chart of a dataset. Charts that cannot be drawn are logged and
/// skipped; the caller shows placeholders for whatever is missing.
pub fn plan_category(dataset: &CategoryDataset, cfg: &Config) -> Vec<ChartPlan> {
    let category = dataset.category.as_str();
    dataset
        .iter()
        .filter_map(|(chart_id, data)| {
            let target = format!("{}-{}", category, chart_id);
            plan_chart(&target, category, chart_id, data, cfg).ok()
        })
        .collect()
}

// =============================================================================
// Registry
// =============================================================================

/// Live chart plans keyed by render-target id.
///
/// Owned by whatever composes the views; there is no global instance.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    live: HashMap<String, ChartPlan>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a plan on its target, returning the plan it replaced.
    pub fn mount(&mut self, plan: ChartPlan) -> Option<ChartPlan> {
        let previous = self.live.insert(plan.target.clone(), plan);
        if let Some(prev) = &previous {
            log(
                Level::Debug,
                Domain::Render,
                "replaced",
                obj(&[("target", v_str(&prev.target)), ("chart_id", v_str(&prev.chart_id))]),
            );
        }
        previous
    }

    pub fn get(&self, target: &str) -> Option<&ChartPlan> {
        self.live.get(target)
    }

    pub fn require(&self, target: &str) -> Result<&ChartPlan> {
        self.get(target)
            .ok_or_else(|| DashError::MissingTarget(target.to_string()))
    }

    /// Release the plan on `target`. Safe to call repeatedly; returns
    /// whether anything was released.
    pub fn dispose(&mut self, target: &str) -> bool {
        let released = self.live.remove(target).is_some();
        if released {
            log(
                Level::Debug,
                Domain::Render,
                "disposed",
                obj(&[("target", v_str(target))]),
            );
        }
        released
    }

    pub fn dispose_all(&mut self) -> usize {
        let n = self.live.len();
        self.live.clear();
        n
    }

    pub fn targets(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.live.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
