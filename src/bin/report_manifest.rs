use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use stakeboard::config::Config;
use stakeboard::report::{analyze_report, default_manifest_path};

fn main() {
    let cfg = Config::from_env();
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.reports_dir).join("report.json"));
    let strict = env::var("MANIFEST_STRICT")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let now_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let manifest = match analyze_report(&path, cfg.report_ttl_secs, now_ts) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("analysis failed: {}", err);
            std::process::exit(2);
        }
    };

    for warning in &manifest.warnings {
        eprintln!("warning: {}", warning);
    }

    let out_path = default_manifest_path(&path);
    let payload = json!({ "manifest": manifest, "ok": manifest.ok() });
    let body = match serde_json::to_string_pretty(&payload) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("failed to encode manifest: {}", err);
            std::process::exit(3);
        }
    };
    if let Err(err) = fs::write(&out_path, body) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(4);
    }
    println!("wrote manifest {}", out_path.display());

    if strict && !manifest.ok() {
        std::process::exit(1);
    }
}
