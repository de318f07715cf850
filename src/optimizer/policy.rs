//! Agronomic crop policy
//!
//! Which crops each fertility grade may grow, which crops fix nitrogen, and the
//! minimum share of planted area nitrogen fixers must take on weaker plots.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::fertility::Grade;
use crate::PlannerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropPolicy {
    /// Grade → crops allowed on plots of that grade
    pub recommendations: BTreeMap<Grade, Vec<String>>,
    pub nitrogen_fixers: Vec<String>,
    /// Grade → minimum fixer fraction of planted area; absent grades are unconstrained
    pub min_fixer_share: BTreeMap<Grade, f64>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for CropPolicy {
    fn default() -> Self {
        let mut recommendations = BTreeMap::new();
        recommendations.insert(
            Grade::I,
            names(&["甜玉米", "茄子", "南瓜", "灯笼椒", "西蓝花", "豌豆苗", "凉薯"]),
        );
        recommendations.insert(
            Grade::II,
            names(&["地瓜", "空心菜", "莴笋", "萝卜", "蒜", "豌豆苗", "凉薯"]),
        );
        recommendations.insert(
            Grade::III,
            names(&["凉薯", "豌豆苗", "空心菜", "薄荷", "地瓜"]),
        );

        let mut min_fixer_share = BTreeMap::new();
        min_fixer_share.insert(Grade::II, 0.10);
        min_fixer_share.insert(Grade::III, 0.20);

        Self {
            recommendations,
            nitrogen_fixers: names(&["凉薯", "豌豆苗"]),
            min_fixer_share,
        }
    }
}

impl CropPolicy {
    /// Allowed crop names for a grade, duplicates removed, order kept
    pub fn allowed(&self, grade: Grade) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.recommendations
            .get(&grade)
            .map(|list| {
                list.iter()
                    .map(String::as_str)
                    .filter(|name| seen.insert(*name))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_nitrogen_fixer(&self, crop_name: &str) -> bool {
        self.nitrogen_fixers.iter().any(|n| n == crop_name)
    }

    /// Minimum fixer share for a grade; `None` or zero means no constraint
    pub fn min_fixer_share(&self, grade: Grade) -> Option<f64> {
        self.min_fixer_share
            .get(&grade)
            .copied()
            .filter(|share| *share > 0.0)
    }

    /// Fixer share enforced on a plot of `grade`. Applies only when the grade
    /// has a share and at least one allowed fixer passes `available`.
    pub fn enforced_fixer_share(&self, grade: Grade, available: impl Fn(&str) -> bool) -> Option<f64> {
        let share = self.min_fixer_share(grade)?;
        self.allowed(grade)
            .into_iter()
            .any(|name| self.is_nitrogen_fixer(name) && available(name))
            .then_some(share)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        for (grade, share) in &self.min_fixer_share {
            if !(0.0..=1.0).contains(share) {
                return Err(PlannerError::InvalidConfig(format!(
                    "nitrogen-fixer share for grade {} must be within [0, 1], got {}",
                    grade, share
                )));
            }
        }
        Ok(())
    }
}
