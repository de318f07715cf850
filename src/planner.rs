//! Farm planner - main coordinator
//!
//! Ties the stages together: soil readings are scored and graded, grades are
//! joined onto plot areas, and the allocation optimizer plans crops across the
//! graded plots.

use anyhow::Result;
use rustc_hash::FxHashMap;
use std::path::Path;

use crate::config::PlannerConfig;
use crate::data::FarmData;
use crate::fertility::{score_readings, FertilityOverview, FertilityScore, ScoringOutcome};
use crate::optimizer::{allocate, AllocationOutcome, GradeSource, Plot, AREA_EPSILON};

/// Everything one planning run produces
#[derive(Debug, Clone)]
pub struct PlanningRun {
    pub scoring: ScoringOutcome,
    pub overview: FertilityOverview,
    pub plots: Vec<Plot>,
    pub outcome: AllocationOutcome,
}

pub struct FarmPlanner {
    data: FarmData,
    config: PlannerConfig,
}

impl FarmPlanner {
    /// Load config (or defaults when the file is absent) and data
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(data_dir: P, config_path: Q) -> Result<Self> {
        let config = PlannerConfig::load_or_default(config_path)?;
        let data = FarmData::load(data_dir, &config)?;
        Ok(Self { data, config })
    }

    pub fn from_parts(data: FarmData, config: PlannerConfig) -> Self {
        Self { data, config }
    }

    pub fn data(&self) -> &FarmData {
        &self.data
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Validate and score every soil reading
    pub fn score_fertility(&self) -> ScoringOutcome {
        let outcome = score_readings(&self.data.soil, &self.config.fertility);
        tracing::info!(
            "Scored {} plots, excluded {}",
            outcome.scores.len(),
            outcome.excluded.len()
        );
        outcome
    }

    pub fn overview(&self, scoring: &ScoringOutcome) -> FertilityOverview {
        let excluded: Vec<String> = scoring.excluded.iter().map(|(id, _)| id.clone()).collect();
        FertilityOverview::from_scores(&scoring.scores, &excluded)
    }

    /// Join grades onto plot areas, in area order.
    ///
    /// Plots without a score take the configured default grade; with no default
    /// they are left out of planning.
    pub fn build_plots(&self, scores: &[FertilityScore]) -> Vec<Plot> {
        let mut by_plot: FxHashMap<&str, &FertilityScore> = FxHashMap::default();
        for score in scores {
            if by_plot.insert(score.plot_id.as_str(), score).is_some() {
                tracing::warn!(
                    "Plot {} has more than one soil sample, using the last one",
                    score.plot_id
                );
            }
        }

        let mut plots = Vec::with_capacity(self.data.areas.len());
        for area in &self.data.areas {
            if area.area_m2 <= AREA_EPSILON {
                tracing::warn!("Plot {} has no area, skipping", area.plot_id);
                continue;
            }

            let (grade, grade_source) = match by_plot.get(area.plot_id.as_str()) {
                Some(score) => (score.grade, GradeSource::Measured),
                None => match self.config.default_grade {
                    Some(grade) => {
                        tracing::warn!(
                            "Plot {} has no usable soil sample, assuming grade {}",
                            area.plot_id,
                            grade
                        );
                        (grade, GradeSource::Default)
                    }
                    None => {
                        tracing::warn!(
                            "Plot {} has no usable soil sample and no default grade, skipping",
                            area.plot_id
                        );
                        continue;
                    }
                },
            };

            plots.push(Plot {
                plot_id: area.plot_id.clone(),
                area_m2: area.area_m2,
                grade,
                grade_source,
            });
        }

        for score in scores {
            if !self.data.areas.iter().any(|a| a.plot_id == score.plot_id) {
                tracing::warn!("Plot {} has a soil sample but no area line", score.plot_id);
            }
        }

        plots
    }

    /// Full pipeline: score, grade, allocate
    pub fn plan(&self) -> PlanningRun {
        let scoring = self.score_fertility();
        let overview = self.overview(&scoring);
        let plots = self.build_plots(&scoring.scores);
        let outcome = allocate(&plots, &self.data.crops, &self.config.crop_policy);

        if let Some(plan) = &outcome.plan {
            for violation in plan.violations(&plots, &self.data.crops, &self.config.crop_policy, 1e-6) {
                tracing::warn!("Plan constraint check: {}", violation);
            }
        }

        PlanningRun {
            scoring,
            overview,
            plots,
            outcome,
        }
    }
}
