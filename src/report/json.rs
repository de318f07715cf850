use super::PlanReport;
use crate::fertility::FertilityScore;

/// JSON formatter for plan reports
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format report as pretty-printed JSON
    pub fn format(report: &PlanReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    /// Format report as compact JSON (no whitespace)
    pub fn format_compact(report: &PlanReport) -> Result<String, serde_json::Error> {
        serde_json::to_string(report)
    }

    pub fn format_scores(scores: &[FertilityScore]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(scores)
    }
}
