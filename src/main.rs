use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use orgunit_hierarchy::{config::CONFIG_FILE, run_hierarchy, run_legacy, Config};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = env::var("ORGUNITS_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
    let config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;

    if args.len() > 1 && args[1] == "legacy" {
        run_legacy_mode(&config)?;
    } else if args.len() > 1 && args[1] != "hierarchy" {
        anyhow::bail!("unknown mode {:?}, expected \"hierarchy\" or \"legacy\"", args[1]);
    } else {
        run_hierarchy_mode(&config)?;
    }

    Ok(())
}

fn run_hierarchy_mode(config: &Config) -> Result<()> {
    println!("🌳 Generating org unit hierarchy");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let summary = run_hierarchy(config).context("Hierarchy generation failed")?;

    println!("✓ {} org units written to {}", summary.units, config.output.display());
    if let Some(report) = &summary.report {
        println!("✓ {}", report.summary());
        if !report.validation.is_clean() {
            println!("⚠️  {}", report.validation.summary());
        }
    }
    println!("Done...");

    Ok(())
}

fn run_legacy_mode(config: &Config) -> Result<()> {
    println!("🗂️  Generating flat facility metadata");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let summary = run_legacy(config).context("Facility generation failed")?;

    println!(
        "✓ {} facilities written to {}",
        summary.units,
        config.legacy.output.display()
    );
    println!("written JSON output");

    Ok(())
}
