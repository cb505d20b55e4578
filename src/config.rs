use crate::aggregate::OthersPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub reports_dir: String,
    /// Others-bucket constants for pie/doughnut views.
    pub pie_others: OthersPolicy,
    /// Others-bucket constants for distribution views. Kept separate from
    /// the pie constants; existing reports were rendered with both.
    pub distribution_others: OthersPolicy,
    /// Reports older than this (by file mtime) are flagged stale in manifests.
    pub report_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            reports_dir: std::env::var("REPORTS_DIR").unwrap_or_else(|_| "./reports".to_string()),
            pie_others: OthersPolicy::new(
                std::env::var("PIE_OTHERS_PCT").ok().and_then(|v| v.parse().ok()).unwrap_or(5.0),
                std::env::var("PIE_OTHERS_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(5),
            ),
            distribution_others: OthersPolicy::new(
                std::env::var("DIST_OTHERS_PCT").ok().and_then(|v| v.parse().ok()).unwrap_or(2.0),
                std::env::var("DIST_OTHERS_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            ),
            report_ttl_secs: std::env::var("REPORT_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(86_400),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reports_dir: "./reports".to_string(),
            pie_others: OthersPolicy::new(5.0, 5),
            distribution_others: OthersPolicy::new(2.0, 10),
            report_ttl_secs: 86_400,
        }
    }
}
