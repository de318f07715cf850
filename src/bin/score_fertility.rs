//! Fertility grading only: score table plus overview
//!
//! Writes the scores to stdout; logs go to stderr.

use farm_planner_rust::report::{CsvFormatter, JsonFormatter};
use farm_planner_rust::{FarmPlanner, OutputFormat};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm_planner_rust=info,score_fertility=info,warn".into()),
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

    let planner = FarmPlanner::new(&data_dir, &config_path)?;
    let scoring = planner.score_fertility();
    let overview = planner.overview(&scoring);

    match format {
        OutputFormat::Csv => print!("{}", CsvFormatter::format_scores(&scoring.scores)?),
        OutputFormat::Json => println!("{}", JsonFormatter::format_scores(&scoring.scores)?),
    }

    tracing::info!("Fertility overview:");
    tracing::info!("  Scored: {}", overview.scored);
    if let Some(avg) = overview.average_composite {
        tracing::info!("  Average composite: {:.2}", avg);
    }
    for (grade, count) in &overview.grade_counts {
        tracing::info!("  Grade {}: {}", grade, count);
    }
    if let Some(indicator) = overview.most_limiting() {
        tracing::info!("  Most often limiting: {}", indicator);
    }
    for plot_id in &overview.excluded {
        tracing::warn!("  Excluded: {}", plot_id);
    }
    for limitation in &overview.limitations {
        tracing::warn!("{}", limitation);
    }

    Ok(())
}
