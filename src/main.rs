//! Plan the charts of one report and print them as JSON.
//!
//! Usage:
//!   stakeboard <network> <report> [category] [chart]
//!   stakeboard <path/to/report.json> [category] [chart]
//!
//! Reports resolve to `$REPORTS_DIR/<network>/<report>.json`. Run with
//! `LOG_STDOUT=0` to keep log lines out of the JSON on stdout.

use anyhow::{bail, Context, Result};
use serde_json::json;
use std::cell::RefCell;
use std::env;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use stakeboard::config::Config;
use stakeboard::logging::{log, log_report_loaded, obj, v_str, Domain, Level, ProfileScope};
use stakeboard::navigation::{Navigator, ViewState};
use stakeboard::render::{plan_category, ChartPlan, ChartRegistry};
use stakeboard::report::{load_report, Category, CategoryDataset};

struct Selection {
    path: PathBuf,
    network: Option<String>,
    report: String,
    category: Option<String>,
    chart: Option<String>,
}

fn parse_args(cfg: &Config, args: &[String]) -> Result<Selection> {
    let Some(first) = args.first() else {
        bail!("usage: stakeboard <network> <report> [category] [chart] | <report.json> [category] [chart]");
    };

    if first.ends_with(".json") {
        let path = PathBuf::from(first);
        let report = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("report")
            .to_string();
        return Ok(Selection {
            path,
            network: None,
            report,
            category: args.get(1).cloned(),
            chart: args.get(2).cloned(),
        });
    }

    let Some(report) = args.get(1) else {
        bail!("missing report name for network {}", first);
    };
    let path = Path::new(&cfg.reports_dir)
        .join(first)
        .join(format!("{}.json", report));
    Ok(Selection {
        path,
        network: Some(first.clone()),
        report: report.clone(),
        category: args.get(2).cloned(),
        chart: args.get(3).cloned(),
    })
}

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let args: Vec<String> = env::args().skip(1).collect();
    let selection = parse_args(&cfg, &args)?;

    let _scope = ProfileScope::with_context("plan_report", &[("path", v_str(&selection.path.display().to_string()))]);
    let report = load_report(&selection.path)
        .with_context(|| format!("loading report {}", selection.path.display()))?;
    let network = selection
        .network
        .clone()
        .or_else(|| Some(report.network.name.clone()).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| "unknown".to_string());
    log_report_loaded(
        &selection.path.display().to_string(),
        &network,
        report.categories().len(),
    );

    let report = Rc::new(report);
    let registry = Rc::new(RefCell::new(ChartRegistry::new()));
    let mut nav = Navigator::new();
    {
        let report = Rc::clone(&report);
        let registry = Rc::clone(&registry);
        let cfg = cfg.clone();
        nav.subscribe(move |state| {
            if let ViewState::ChartDisplay { category, .. } = state {
                let dataset = CategoryDataset::from_report(&report, *category);
                let mut registry = registry.borrow_mut();
                // a new category replaces whatever was on screen
                registry.dispose_all();
                for plan in plan_category(&dataset, &cfg) {
                    registry.mount(plan);
                }
            }
        });
    }

    nav.select_network(&network)?;
    nav.select_report(&selection.report)?;

    let categories: Vec<Category> = match &selection.category {
        Some(id) => vec![Category::parse(id)?],
        None => report.categories(),
    };
    let mut plans: Vec<ChartPlan> = Vec::new();
    for category in &categories {
        nav.select_category(category.as_str())?;
        let registry = registry.borrow();
        plans.extend(
            registry
                .targets()
                .into_iter()
                .filter_map(|t| registry.get(t))
                .filter(|p| selection.chart.as_deref().map_or(true, |c| p.chart_id == c))
                .cloned(),
        );
    }

    if plans.is_empty() {
        log(
            Level::Warn,
            Domain::System,
            "nothing_to_draw",
            obj(&[
                ("network", v_str(&network)),
                ("report", v_str(&selection.report)),
            ]),
        );
    }

    let payload = json!({
        "network": network,
        "report": selection.report,
        "charts": plans,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
