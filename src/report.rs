//! Report files and per-category chart datasets.
//!
//! A report is one JSON document per network snapshot:
//!
//! ```text
//! { "network": {"name": ..},
//!   "economic_security": {..},
//!   "operators": {"stake_distribution": [..], "concentration": [..], "operator_details": [..]},
//!   "vaults": {"metrics": [..]},
//!   "curators" | "vault_configuration": {"curator_stats": [..]} }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{DashError, Result};
use crate::record::ChartData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    EconomicSecurity,
    Operators,
    Vaults,
    Curators,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::EconomicSecurity,
        Category::Operators,
        Category::Vaults,
        Category::Curators,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EconomicSecurity => "economic_security",
            Category::Operators => "operators",
            Category::Vaults => "vaults",
            Category::Curators => "curators",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::EconomicSecurity => "Economic Security",
            Category::Operators => "Operators",
            Category::Vaults => "Vaults",
            Category::Curators => "Curators",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == id)
    }

    /// Like `from_id`, but an unknown id is a caller bug and reported as one.
    pub fn parse(id: &str) -> Result<Self> {
        Self::from_id(id).ok_or_else(|| DashError::UnknownCategory(id.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkReport {
    #[serde(default)]
    pub network: NetworkInfo,
    #[serde(default)]
    pub economic_security: Value,
    #[serde(default)]
    pub operators: Value,
    #[serde(default)]
    pub vaults: Value,
    #[serde(default, alias = "vault_configuration")]
    pub curators: Value,
}

impl NetworkReport {
    pub fn section(&self, category: Category) -> Option<&Map<String, Value>> {
        let v = match category {
            Category::EconomicSecurity => &self.economic_security,
            Category::Operators => &self.operators,
            Category::Vaults => &self.vaults,
            Category::Curators => &self.curators,
        };
        v.as_object()
    }

    pub fn categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.section(*c).is_some_and(|s| !s.is_empty()))
            .collect()
    }
}

pub fn load_report(path: &Path) -> Result<NetworkReport> {
    let raw = std::fs::read_to_string(path).map_err(|source| DashError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(&raw, path)
}

pub fn parse_report(raw: &str, path: &Path) -> Result<NetworkReport> {
    serde_json::from_str(raw).map_err(|source| DashError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Chart id -> data for one category of one report.
///
/// Built once per selection and replaced wholesale when the selection
/// changes; never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDataset {
    pub category: Category,
    charts: Vec<(String, ChartData)>,
}

impl CategoryDataset {
    pub fn from_report(report: &NetworkReport, category: Category) -> Self {
        let mut charts: Vec<(String, ChartData)> = Vec::new();
        if let Some(section) = report.section(category) {
            // top-level chart ids keep their names; nested ids yield to them
            let top_level: Vec<&String> = section
                .iter()
                .filter(|(_, v)| ChartData::from_value(v).is_some())
                .map(|(k, _)| k)
                .collect();
            for (key, value) in section {
                if let Some(data) = ChartData::from_value(value) {
                    charts.push((key.clone(), data));
                    continue;
                }
                // one level of nesting, e.g. economic_security.collateral.{..}
                if let Some(inner) = value.as_object() {
                    for (inner_key, inner_value) in inner {
                        if let Some(data) = ChartData::from_value(inner_value) {
                            let taken = top_level.contains(&inner_key)
                                || charts.iter().any(|(k, _)| k == inner_key);
                            let id = if taken {
                                format!("{}_{}", key, inner_key)
                            } else {
                                inner_key.clone()
                            };
                            charts.push((id, data));
                        }
                    }
                }
            }
        }
        Self { category, charts }
    }

    pub fn get(&self, chart_id: &str) -> Option<&ChartData> {
        self.charts.iter().find(|(k, _)| k == chart_id).map(|(_, d)| d)
    }

    pub fn chart_ids(&self) -> Vec<&str> {
        self.charts.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChartData)> {
        self.charts.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }
}

// =============================================================================
// Manifest
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub charts: usize,
    pub empty_charts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportManifest {
    pub path: String,
    pub hash_sha256: String,
    pub network: String,
    pub categories: Vec<CategorySummary>,
    pub warnings: Vec<String>,
    pub modified_epoch: Option<u64>,
    pub ttl_secs: u64,
    pub stale: bool,
    pub generated_at_epoch: u64,
}

impl ReportManifest {
    pub fn ok(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub fn analyze_report(path: &Path, ttl_secs: u64, now_ts: u64) -> Result<ReportManifest> {
    let hash = file_sha256(path)?;
    let report = load_report(path)?;
    let mut warnings = Vec::new();

    let mtime = modified_epoch(path);
    let stale = mtime
        .map(|ts| now_ts.saturating_sub(ts) > ttl_secs)
        .unwrap_or(true);
    if stale {
        warnings.push("stale_report".to_string());
    }

    if report.network.name.is_empty() {
        warnings.push("missing_network_name".to_string());
    }

    let mut categories = Vec::new();
    for category in Category::ALL {
        if report.section(category).is_none() {
            warnings.push(format!("missing_section: {}", category.as_str()));
            continue;
        }
        let dataset = CategoryDataset::from_report(&report, category);
        if dataset.is_empty() {
            warnings.push(format!("no_charts: {}", category.as_str()));
        }
        let empty_charts: Vec<String> = dataset
            .iter()
            .filter(|(_, d)| d.is_empty())
            .map(|(k, _)| k.to_string())
            .collect();
        for chart in &empty_charts {
            warnings.push(format!("empty_chart: {}.{}", category.as_str(), chart));
        }
        categories.push(CategorySummary {
            category,
            charts: dataset.len(),
            empty_charts,
        });
    }

    Ok(ReportManifest {
        path: path.display().to_string(),
        hash_sha256: hash,
        network: report.network.name,
        categories,
        warnings,
        modified_epoch: mtime,
        ttl_secs,
        stale,
        generated_at_epoch: now_ts,
    })
}

/// File mtime in unix seconds, if the platform reports one.
pub fn modified_epoch(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    modified
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let io_err = |source| DashError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(report_path: &Path) -> PathBuf {
    let mut p = report_path.to_path_buf();
    let fname = report_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("report.json");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(v: Value) -> NetworkReport {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_category_roundtrip_ids() {
        for c in Category::ALL {
            assert_eq!(Category::from_id(c.as_str()), Some(c));
        }
        assert!(matches!(Category::parse("collateral"), Err(DashError::UnknownCategory(_))));
    }

    #[test]
    fn test_vault_configuration_alias() {
        let r = report(json!({"vault_configuration": {"curator_stats": [{"curator_id": "c"}]}}));
        let ds = CategoryDataset::from_report(&r, Category::Curators);
        assert_eq!(ds.chart_ids(), vec!["curator_stats"]);
    }

    #[test]
    fn test_dataset_flattens_one_level() {
        let r = report(json!({
            "network": {"name": "mainnet"},
            "economic_security": {
                "total_usd": 12.0,
                "collateral": {"collateral_utilization": [{"asset": "a"}], "note": "x"},
                "restaked_share": {"Lido": 60, "Other": 40}
            }
        }));
        let ds = CategoryDataset::from_report(&r, Category::EconomicSecurity);
        assert_eq!(ds.chart_ids(), vec!["collateral_utilization", "restaked_share"]);
    }

    #[test]
    fn test_nested_id_yields_to_later_top_level_key() {
        let r = report(json!({
            "economic_security": {
                "collateral": {"shares": [{"asset": "a", "value": 1}]},
                "shares": [{"asset": "b", "value": 2}]
            }
        }));
        let ds = CategoryDataset::from_report(&r, Category::EconomicSecurity);
        assert_eq!(ds.chart_ids(), vec!["collateral_shares", "shares"]);

        let mut registry = crate::render::ChartRegistry::new();
        for plan in crate::render::plan_category(&ds, &crate::config::Config::default()) {
            registry.mount(plan);
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_nested_id_yields_to_earlier_top_level_key() {
        let r = report(json!({
            "economic_security": {
                "shares": [{"asset": "b", "value": 2}],
                "collateral": {"shares": [{"asset": "a", "value": 1}]}
            }
        }));
        let ds = CategoryDataset::from_report(&r, Category::EconomicSecurity);
        assert_eq!(ds.chart_ids(), vec!["shares", "collateral_shares"]);
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let r = report(json!({"network": {"name": "holesky"}}));
        assert!(r.categories().is_empty());
        assert!(CategoryDataset::from_report(&r, Category::Vaults).is_empty());
    }

    #[test]
    fn test_manifest_path() {
        let p = default_manifest_path(Path::new("reports/mainnet/report.json"));
        assert_eq!(p, PathBuf::from("reports/mainnet/report.json.manifest.json"));
    }
}
