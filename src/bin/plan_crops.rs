//! Full planning run: score soils, grade plots, allocate crops
//!
//! Writes the report to stdout; logs go to stderr.

use farm_planner_rust::{FarmPlanner, OutputFormat, PlanReport};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_planner_rust=info,plan_crops=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let config_path = std::env::var("PLANNER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(&data_dir).join("planner_config.json"));
    let format: OutputFormat = std::env::var("OUTPUT_FORMAT")
        .unwrap_or_else(|_| "csv".to_string())
        .parse()?;

    tracing::info!("Configuration:");
    tracing::info!("  DATA_DIR: {}", data_dir);
    tracing::info!("  PLANNER_CONFIG: {}", config_path.display());
    tracing::info!("  OUTPUT_FORMAT: {:?}", format);

    let planner = FarmPlanner::new(&data_dir, &config_path)?;
    let run = planner.plan();

    for limitation in &run.overview.limitations {
        tracing::warn!("{}", limitation);
    }

    let report = PlanReport::from(&run);
    print!("{}", format.render(&report)?);

    if run.outcome.plan.is_none() {
        tracing::error!("No plan produced: solve ended {}", run.outcome.status);
        std::process::exit(2);
    }

    Ok(())
}
