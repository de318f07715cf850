//! Delimited text output via polars
//!
//! Numbers are rounded to 2 decimals (4 for the nitrogen sub-index, which sits
//! in the thousandths for typical soils).

use anyhow::{Context, Result};
use polars::prelude::*;

use super::PlanReport;
use crate::fertility::FertilityScore;
use crate::optimizer::{AllocationPlan, GradeSource};

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn rounded<'a, I: IntoIterator<Item = &'a f64>>(values: I, decimals: i32) -> Vec<f64> {
    values.into_iter().map(|v| round_to(*v, decimals)).collect()
}

pub struct CsvFormatter;

impl CsvFormatter {
    pub fn scores_frame(scores: &[FertilityScore]) -> PolarsResult<DataFrame> {
        let ids: Vec<&str> = scores.iter().map(|s| s.plot_id.as_str()).collect();
        let grades: Vec<&str> = scores.iter().map(|s| s.grade.as_str()).collect();
        let limiting: Vec<String> = scores.iter().map(|s| s.limiting_indicator.to_string()).collect();

        df!(
            "plot_id" => ids,
            "sub_index_ph" => rounded(scores.iter().map(|s| &s.sub_index_ph), 2),
            "sub_index_n" => rounded(scores.iter().map(|s| &s.sub_index_n), 4),
            "sub_index_p" => rounded(scores.iter().map(|s| &s.sub_index_p), 2),
            "sub_index_k" => rounded(scores.iter().map(|s| &s.sub_index_k), 2),
            "min_sub_index" => rounded(scores.iter().map(|s| &s.min_sub_index), 4),
            "avg_sub_index" => rounded(scores.iter().map(|s| &s.avg_sub_index), 2),
            "composite_index" => rounded(scores.iter().map(|s| &s.composite_index), 2),
            "grade" => grades,
            "limiting_indicator" => limiting
        )
    }

    pub fn decisions_frame(plan: &AllocationPlan) -> PolarsResult<DataFrame> {
        let decisions = &plan.decisions;
        let ids: Vec<&str> = decisions.iter().map(|d| d.plot_id.as_str()).collect();
        let grades: Vec<&str> = decisions.iter().map(|d| d.grade.as_str()).collect();
        let crops: Vec<&str> = decisions.iter().map(|d| d.crop_name.as_str()).collect();

        df!(
            "plot_id" => ids,
            "grade" => grades,
            "crop" => crops,
            "area_m2" => rounded(decisions.iter().map(|d| &d.area_allocated_m2), 2),
            "profit" => rounded(decisions.iter().map(|d| &d.profit), 2)
        )
    }

    pub fn summaries_frame(plan: &AllocationPlan) -> PolarsResult<DataFrame> {
        let summaries = &plan.summaries;
        let ids: Vec<&str> = summaries.iter().map(|s| s.plot_id.as_str()).collect();
        let grades: Vec<&str> = summaries.iter().map(|s| s.grade.as_str()).collect();
        let sources: Vec<&str> = summaries
            .iter()
            .map(|s| match s.grade_source {
                GradeSource::Measured => "measured",
                GradeSource::Default => "default",
            })
            .collect();

        df!(
            "plot_id" => ids,
            "grade" => grades,
            "grade_source" => sources,
            "capacity_m2" => rounded(summaries.iter().map(|s| &s.capacity_m2), 2),
            "planted_m2" => rounded(summaries.iter().map(|s| &s.planted_m2), 2),
            "nitrogen_fixer_m2" => rounded(summaries.iter().map(|s| &s.nitrogen_fixer_m2), 2),
            "nitrogen_fixer_share_pct" => rounded(summaries.iter().map(|s| &s.nitrogen_fixer_share_pct), 2),
            "profit" => rounded(summaries.iter().map(|s| &s.profit), 2)
        )
    }

    /// Render one frame as CSV with a header row
    pub fn write_frame(df: &mut DataFrame) -> Result<String> {
        let mut buffer = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .finish(df)
            .context("Failed to write CSV")?;
        String::from_utf8(buffer).context("CSV output is not UTF-8")
    }

    pub fn format_scores(scores: &[FertilityScore]) -> Result<String> {
        let mut df = Self::scores_frame(scores).context("Failed to build fertility table")?;
        Self::write_frame(&mut df)
    }

    /// Sections separated by `# <name>` lines: fertility, plan, summary.
    /// Plan sections are omitted when the solve was not optimal.
    pub fn format_report(report: &PlanReport) -> Result<String> {
        let mut out = String::new();

        out.push_str("# fertility\n");
        out.push_str(&Self::format_scores(&report.fertility)?);

        out.push_str(&format!("\n# status: {}\n", report.status));
        if let Some(plan) = &report.plan {
            let mut decisions = Self::decisions_frame(plan).context("Failed to build plan table")?;
            out.push_str("\n# plan\n");
            out.push_str(&Self::write_frame(&mut decisions)?);

            let mut summaries = Self::summaries_frame(plan).context("Failed to build summary table")?;
            out.push_str("\n# summary\n");
            out.push_str(&Self::write_frame(&mut summaries)?);
            out.push_str(&format!("\n# total_profit: {:.2}\n", plan.total_profit));
        }

        Ok(out)
    }
}
