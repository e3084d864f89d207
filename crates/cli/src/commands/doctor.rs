//! `smartspend doctor` — Diagnose system health.

use smartspend_config::AppConfig;
use smartspend_gateway::build_engine;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("SmartSpend Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  [ok]   Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  [err]  Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  [warn] No config file — using defaults (run `smartspend onboard`)");
        Some(AppConfig::default())
    };

    if let Some(config) = config {
        // Check predictor
        let predictor = smartspend_predictors::build_from_config(&config);
        match predictor.health_check().await {
            Ok(true) => println!("  [ok]   Predictor \"{}\" reachable", predictor.name()),
            Ok(false) => {
                println!("  [warn] Predictor \"{}\" reports unhealthy", predictor.name());
                issues += 1;
            }
            Err(e) => {
                println!("  [err]  Predictor \"{}\" unreachable: {e}", predictor.name());
                issues += 1;
            }
        }

        // Check engine tables
        let engine = build_engine(&config, predictor);
        if engine.keywords().is_empty() {
            println!("  [err]  Keyword table is empty — custom categories all fall to Other");
            issues += 1;
        } else {
            println!("  [ok]   Keyword table loaded ({} rules)", engine.keywords().len());
        }
        if engine.canonical().iter().any(|c| c == "Savings") {
            println!("  [ok]   Canonical list carries the Savings reserve");
        } else {
            println!("  [err]  Canonical list is missing \"Savings\" — seeding disabled");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
