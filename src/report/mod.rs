//! Output rendering
//!
//! A `PlanReport` gathers what a run produced; `CsvFormatter` and
//! `JsonFormatter` render it.

pub mod csv;
pub mod json;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::fertility::{FertilityOverview, FertilityScore};
use crate::optimizer::{AllocationPlan, SolveStatus};
use crate::planner::PlanningRun;
use crate::PlannerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub fertility: Vec<FertilityScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<FertilityOverview>,
    pub status: SolveStatus,
    pub plan: Option<AllocationPlan>,
}

impl From<&PlanningRun> for PlanReport {
    fn from(run: &PlanningRun) -> Self {
        Self {
            fertility: run.scoring.scores.clone(),
            overview: Some(run.overview.clone()),
            status: run.outcome.status,
            plan: run.outcome.plan.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(PlannerError::InvalidConfig(format!(
                "unknown output format '{}', expected csv or json",
                other
            ))),
        }
    }
}

impl OutputFormat {
    pub fn render(&self, report: &PlanReport) -> anyhow::Result<String> {
        match self {
            OutputFormat::Csv => CsvFormatter::format_report(report),
            OutputFormat::Json => Ok(JsonFormatter::format(report)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(" JSON ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xlsx".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Csv);
    }
}
