//! Solving the allocation model and shaping the result

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::AllocationModel;
use super::policy::CropPolicy;
use super::types::{Crop, GradeSource, Plot};
use crate::fertility::Grade;

/// Allocations at or below this area are solver noise and dropped
pub const AREA_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
        };
        write!(f, "{}", s)
    }
}

impl From<minilp::Error> for SolveStatus {
    fn from(err: minilp::Error) -> Self {
        match err {
            minilp::Error::Infeasible => SolveStatus::Infeasible,
            minilp::Error::Unbounded => SolveStatus::Unbounded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub plot_id: String,
    pub grade: Grade,
    pub crop_name: String,
    pub area_allocated_m2: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSummary {
    pub plot_id: String,
    pub grade: Grade,
    pub grade_source: GradeSource,
    pub capacity_m2: f64,
    pub planted_m2: f64,
    pub nitrogen_fixer_m2: f64,
    /// 0 when nothing is planted
    pub nitrogen_fixer_share_pct: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub total_profit: f64,
    pub decisions: Vec<AllocationDecision>,
    /// Every input plot, in input order
    pub summaries: Vec<PlotSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub status: SolveStatus,
    /// Present only when `status` is optimal
    pub plan: Option<AllocationPlan>,
}

impl AllocationOutcome {
    fn without_plan(status: SolveStatus) -> Self {
        Self { status, plan: None }
    }
}

/// Maximize total profit over allowed (plot, crop) pairs
pub fn allocate(plots: &[Plot], crops: &[Crop], policy: &CropPolicy) -> AllocationOutcome {
    let model = AllocationModel::build(plots, crops, policy);

    if model.is_empty() {
        tracing::info!("No allowed (plot, crop) pairs; returning an empty plan");
        return AllocationOutcome {
            status: SolveStatus::Optimal,
            plan: Some(build_plan(plots, crops, policy, &model, &[], 0.0)),
        };
    }

    tracing::info!(
        "Solving allocation: {} plots, {} variables",
        plots.len(),
        model.vars.len()
    );

    match model.problem.solve() {
        Ok(solution) => {
            let areas: Vec<f64> = model
                .vars
                .iter()
                .map(|v| solution[v.var].max(0.0))
                .collect();
            let plan = build_plan(plots, crops, policy, &model, &areas, solution.objective());
            tracing::info!("Allocation optimal, total profit {:.2}", plan.total_profit);
            AllocationOutcome {
                status: SolveStatus::Optimal,
                plan: Some(plan),
            }
        }
        Err(err) => {
            let status = SolveStatus::from(err);
            tracing::warn!("Allocation solve ended {}", status);
            AllocationOutcome::without_plan(status)
        }
    }
}

fn build_plan(
    plots: &[Plot],
    crops: &[Crop],
    policy: &CropPolicy,
    model: &AllocationModel,
    areas: &[f64],
    objective: f64,
) -> AllocationPlan {
    let mut decisions = Vec::new();
    let mut summaries = Vec::with_capacity(plots.len());

    for (plot, own) in plots.iter().zip(&model.plot_vars) {
        let mut planted = 0.0;
        let mut fixer_area = 0.0;
        let mut profit = 0.0;

        for &i in own {
            let area = areas.get(i).copied().unwrap_or(0.0);
            if area <= AREA_EPSILON {
                continue;
            }
            let crop = &crops[model.vars[i].crop_idx];
            let crop_profit = area * crop.profit_per_m2();

            planted += area;
            profit += crop_profit;
            if policy.is_nitrogen_fixer(&crop.name) {
                fixer_area += area;
            }

            decisions.push(AllocationDecision {
                plot_id: plot.plot_id.clone(),
                grade: plot.grade,
                crop_name: crop.name.clone(),
                area_allocated_m2: area,
                profit: crop_profit,
            });
        }

        summaries.push(PlotSummary {
            plot_id: plot.plot_id.clone(),
            grade: plot.grade,
            grade_source: plot.grade_source,
            capacity_m2: plot.area_m2,
            planted_m2: planted,
            nitrogen_fixer_m2: fixer_area,
            nitrogen_fixer_share_pct: if planted > 0.0 {
                fixer_area / planted * 100.0
            } else {
                0.0
            },
            profit,
        });
    }

    AllocationPlan {
        total_profit: objective,
        decisions,
        summaries,
    }
}

impl AllocationPlan {
    /// Capacity, eligibility and nitrogen-fixer violations beyond `tolerance`.
    /// Empty for any plan produced by `allocate` over the same plots and crops.
    pub fn violations(
        &self,
        plots: &[Plot],
        crops: &[Crop],
        policy: &CropPolicy,
        tolerance: f64,
    ) -> Vec<String> {
        let crop_names: FxHashSet<&str> = crops.iter().map(|c| c.name.as_str()).collect();
        let mut found = Vec::new();

        for decision in &self.decisions {
            if !policy.allowed(decision.grade).contains(&decision.crop_name.as_str()) {
                found.push(format!(
                    "{}: {} is not allowed on grade {}",
                    decision.plot_id, decision.crop_name, decision.grade
                ));
            }
        }

        for (plot, summary) in plots.iter().zip(&self.summaries) {
            if summary.planted_m2 > plot.area_m2 + tolerance {
                found.push(format!(
                    "{}: planted {:.6} m² exceeds capacity {:.6} m²",
                    plot.plot_id, summary.planted_m2, plot.area_m2
                ));
            }

            let available = |name: &str| crop_names.contains(name);
            if let Some(share) = policy.enforced_fixer_share(plot.grade, available) {
                if summary.nitrogen_fixer_m2 + tolerance < share * summary.planted_m2 {
                    found.push(format!(
                        "{}: nitrogen fixers cover {:.6} of {:.6} m², below {:.0}%",
                        plot.plot_id,
                        summary.nitrogen_fixer_m2,
                        summary.planted_m2,
                        share * 100.0
                    ));
                }
            }
        }

        found
    }

    pub fn planted_m2(&self) -> f64 {
        self.summaries.iter().map(|s| s.planted_m2).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::price_range::PriceRange;
    use approx::assert_relative_eq;

    fn plot(id: &str, area: f64, grade: Grade) -> Plot {
        Plot {
            plot_id: id.to_string(),
            area_m2: area,
            grade,
            grade_source: GradeSource::Measured,
        }
    }

    fn crop(name: &str, profit: f64) -> Crop {
        Crop::new(name, "春季", "60天", 1.0, 0.0, PriceRange::fixed(profit))
    }

    fn crops() -> Vec<Crop> {
        vec![
            crop("甜玉米", 20.0),
            crop("蒜", 30.0),
            crop("薄荷", 12.0),
            crop("凉薯", 8.0),
            crop("豌豆苗", 6.0),
            crop("地瓜", 10.0),
        ]
    }

    #[test]
    fn test_grade_i_takes_best_crop() {
        let plots = vec![plot("学院2", 522.0, Grade::I)];
        let outcome = allocate(&plots, &crops(), &CropPolicy::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);

        let plan = outcome.plan.unwrap();
        assert_eq!(plan.decisions.len(), 1);
        assert_eq!(plan.decisions[0].crop_name, "甜玉米");
        assert_relative_eq!(plan.total_profit, 522.0 * 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fixer_share_grade_ii() {
        // Best unconstrained is all 蒜; 10% must go to the best fixer (凉薯)
        let plots = vec![plot("学院1", 1000.0, Grade::II)];
        let policy = CropPolicy::default();
        let plan = allocate(&plots, &crops(), &policy).plan.unwrap();

        let summary = &plan.summaries[0];
        assert_relative_eq!(summary.planted_m2, 1000.0, epsilon = 1e-6);
        assert_relative_eq!(summary.nitrogen_fixer_m2, 100.0, epsilon = 1e-6);
        assert_relative_eq!(summary.nitrogen_fixer_share_pct, 10.0, epsilon = 1e-6);
        assert_relative_eq!(plan.total_profit, 900.0 * 30.0 + 100.0 * 8.0, epsilon = 1e-6);
        assert!(plan.violations(&plots, &crops(), &policy, 1e-6).is_empty());
    }

    #[test]
    fn test_fixer_share_grade_iii() {
        let plots = vec![plot("学院9", 500.0, Grade::III)];
        let policy = CropPolicy::default();
        let plan = allocate(&plots, &crops(), &policy).plan.unwrap();

        let summary = &plan.summaries[0];
        assert_relative_eq!(summary.nitrogen_fixer_m2, 100.0, epsilon = 1e-6);
        assert_relative_eq!(plan.total_profit, 400.0 * 12.0 + 100.0 * 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_conservation_and_eligibility() {
        let plots = vec![
            plot("学院1", 610.0, Grade::II),
            plot("学院2", 522.0, Grade::I),
            plot("学院9", 480.0, Grade::III),
        ];
        let policy = CropPolicy::default();
        let plan = allocate(&plots, &crops(), &policy).plan.unwrap();

        assert!(plan.violations(&plots, &crops(), &policy, 1e-6).is_empty());
        for (plot, summary) in plots.iter().zip(&plan.summaries) {
            assert_eq!(plot.plot_id, summary.plot_id);
            assert!(summary.planted_m2 <= plot.area_m2 + 1e-6);
        }
        let decision_total: f64 = plan.decisions.iter().map(|d| d.profit).sum();
        assert_relative_eq!(decision_total, plan.total_profit, epsilon = 1e-6);
    }

    #[test]
    fn test_loss_making_crops_leave_land_fallow() {
        let crops = vec![crop("甜玉米", -3.0)];
        let plots = vec![plot("学院2", 100.0, Grade::I)];
        let plan = allocate(&plots, &crops, &CropPolicy::default()).plan.unwrap();
        assert!(plan.decisions.is_empty());
        assert_relative_eq!(plan.summaries[0].planted_m2, 0.0);
    }

    #[test]
    fn test_plot_without_variables_still_summarized() {
        // No grade I crop is in this table
        let crops = vec![crop("薄荷", 12.0), crop("空心菜", 8.0)];
        let plots = vec![plot("学院2", 522.0, Grade::I), plot("学院9", 100.0, Grade::III)];
        let policy = CropPolicy::default();

        let model = AllocationModel::build(&plots, &crops, &policy);
        assert!(model.plot_vars[0].is_empty());
        assert_eq!(model.plot_vars[1].len(), 2);

        let plan = allocate(&plots, &crops, &policy).plan.unwrap();
        assert_eq!(plan.summaries.len(), 2);
        assert_eq!(plan.summaries[0].plot_id, "学院2");
        assert_relative_eq!(plan.summaries[0].planted_m2, 0.0);
        assert_relative_eq!(plan.summaries[0].nitrogen_fixer_share_pct, 0.0);
        assert_relative_eq!(plan.summaries[1].planted_m2, 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_missing_fixers_are_not_violations() {
        // Grade II allows 凉薯 and 豌豆苗, but neither is in the crop table
        let crops = vec![crop("蒜", 30.0)];
        let plots = vec![plot("学院1", 100.0, Grade::II)];
        let policy = CropPolicy::default();
        let plan = allocate(&plots, &crops, &policy).plan.unwrap();

        assert_relative_eq!(plan.summaries[0].planted_m2, 100.0, epsilon = 1e-6);
        assert_relative_eq!(plan.summaries[0].nitrogen_fixer_m2, 0.0);
        assert!(plan.violations(&plots, &crops, &policy, 1e-6).is_empty());
    }

    #[test]
    fn test_violations_flag_short_fixer_share() {
        let plots = vec![plot("学院1", 100.0, Grade::II)];
        let policy = CropPolicy::default();
        let plan = AllocationPlan {
            total_profit: 3000.0,
            decisions: vec![AllocationDecision {
                plot_id: "学院1".to_string(),
                grade: Grade::II,
                crop_name: "蒜".to_string(),
                area_allocated_m2: 100.0,
                profit: 3000.0,
            }],
            summaries: vec![PlotSummary {
                plot_id: "学院1".to_string(),
                grade: Grade::II,
                grade_source: GradeSource::Measured,
                capacity_m2: 100.0,
                planted_m2: 100.0,
                nitrogen_fixer_m2: 0.0,
                nitrogen_fixer_share_pct: 0.0,
                profit: 3000.0,
            }],
        };

        let found = plan.violations(&plots, &crops(), &policy, 1e-6);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("nitrogen fixers"));
    }

    #[test]
    fn test_no_variables_at_all() {
        let plots = vec![plot("学院2", 522.0, Grade::I)];
        let outcome = allocate(&plots, &[], &CropPolicy::default());
        assert_eq!(outcome.status, SolveStatus::Optimal);
        let plan = outcome.plan.unwrap();
        assert!(plan.decisions.is_empty());
        assert_eq!(plan.summaries.len(), 1);
        assert_relative_eq!(plan.total_profit, 0.0);
    }

    #[test]
    fn test_no_fixer_allowed_means_no_share_constraint() {
        let mut policy = CropPolicy::default();
        policy.nitrogen_fixers.clear();
        let plots = vec![plot("学院1", 100.0, Grade::II)];
        let plan = allocate(&plots, &crops(), &policy).plan.unwrap();
        assert_relative_eq!(plan.total_profit, 100.0 * 30.0, epsilon = 1e-6);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SolveStatus::Optimal.to_string(), "optimal");
        assert_eq!(SolveStatus::from(minilp::Error::Infeasible), SolveStatus::Infeasible);
        assert_eq!(SolveStatus::from(minilp::Error::Unbounded).to_string(), "unbounded");
    }
}
