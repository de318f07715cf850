//! Linear program construction
//!
//! One continuous variable per allowed (plot, crop) pair. Disallowed pairs never
//! enter the variable space. Constraints per plot:
//!
//! - capacity: Σ area ≤ plot area
//! - nitrogen fixers (grades with a share s, and only if a fixer is allowed):
//!   Σ fixer area ≥ s · Σ area, written as Σ (1−s)·fixer − s·other ≥ 0

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::policy::CropPolicy;
use super::types::{Crop, Plot};

/// Link from an LP variable back to its plot and crop
#[derive(Debug, Clone, Copy)]
pub struct DecisionVar {
    pub plot_idx: usize,
    pub crop_idx: usize,
    pub is_fixer: bool,
    pub var: Variable,
}

pub struct AllocationModel {
    pub problem: Problem,
    pub vars: Vec<DecisionVar>,
    /// Indices into `vars`, one list per plot
    pub plot_vars: Vec<SmallVec<[usize; 8]>>,
}

impl AllocationModel {
    pub fn build(plots: &[Plot], crops: &[Crop], policy: &CropPolicy) -> Self {
        let crop_lookup: FxHashMap<&str, usize> = crops
            .iter()
            .enumerate()
            .map(|(idx, crop)| (crop.name.as_str(), idx))
            .collect();

        let mut problem = Problem::new(OptimizationDirection::Maximize);
        let mut vars = Vec::new();
        let mut plot_vars = Vec::with_capacity(plots.len());
        let mut unknown_crops: FxHashSet<&str> = FxHashSet::default();

        for (plot_idx, plot) in plots.iter().enumerate() {
            let mut own: SmallVec<[usize; 8]> = SmallVec::new();

            for name in policy.allowed(plot.grade) {
                let Some(&crop_idx) = crop_lookup.get(name) else {
                    if unknown_crops.insert(name) {
                        tracing::warn!(
                            "Recommended crop '{}' is not in the crop table, skipping",
                            name
                        );
                    }
                    continue;
                };

                let var = problem.add_var(crops[crop_idx].profit_per_m2(), (0.0, f64::INFINITY));
                own.push(vars.len());
                vars.push(DecisionVar {
                    plot_idx,
                    crop_idx,
                    is_fixer: policy.is_nitrogen_fixer(name),
                    var,
                });
            }

            if !own.is_empty() {
                let mut capacity = LinearExpr::empty();
                for &i in &own {
                    capacity.add(vars[i].var, 1.0);
                }
                problem.add_constraint(capacity, ComparisonOp::Le, plot.area_m2);

                let available = |name: &str| crop_lookup.contains_key(name);
                if let Some(share) = policy.enforced_fixer_share(plot.grade, available) {
                    let mut fixers = LinearExpr::empty();
                    for &i in &own {
                        let coef = if vars[i].is_fixer { 1.0 - share } else { -share };
                        fixers.add(vars[i].var, coef);
                    }
                    problem.add_constraint(fixers, ComparisonOp::Ge, 0.0);
                }
            }

            tracing::debug!(
                "Plot {} (grade {}): {} decision variables",
                plot.plot_id,
                plot.grade,
                own.len()
            );
            plot_vars.push(own);
        }

        Self {
            problem,
            vars,
            plot_vars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
