//! Fertility standard values
//!
//! Standard values (Sᵢ), the sub-index cap, the pH table and the grade
//! thresholds. Kept as data so a policy change is a config edit.

use serde::{Deserialize, Serialize};

use super::ph_table::PhTable;
use crate::PlannerError;

/// Composite-index cut points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeThresholds {
    /// Composite strictly above this is grade I
    pub grade_i_above: f64,
    /// Composite at or above this (and not grade I) is grade II
    pub grade_ii_from: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            grade_i_above: 1.7,
            grade_ii_from: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertilityStandard {
    /// Total nitrogen standard (g/kg); readings arrive in mg/kg
    pub nitrogen_g_per_kg: f64,
    /// Available phosphorus standard (mg/kg)
    pub phosphorus_mg_per_kg: f64,
    /// Available potassium standard (mg/kg)
    pub potassium_mg_per_kg: f64,
    /// Upper bound on every ratio sub-index
    pub sub_index_cap: f64,
    pub ph_table: PhTable,
    pub grades: GradeThresholds,
}

impl Default for FertilityStandard {
    fn default() -> Self {
        Self {
            nitrogen_g_per_kg: 1.0,
            phosphorus_mg_per_kg: 7.5,
            potassium_mg_per_kg: 80.0,
            sub_index_cap: 3.0,
            ph_table: PhTable::default(),
            grades: GradeThresholds::default(),
        }
    }
}

impl FertilityStandard {
    pub fn validate(&self) -> Result<(), PlannerError> {
        for (name, value) in [
            ("nitrogen_g_per_kg", self.nitrogen_g_per_kg),
            ("phosphorus_mg_per_kg", self.phosphorus_mg_per_kg),
            ("potassium_mg_per_kg", self.potassium_mg_per_kg),
            ("sub_index_cap", self.sub_index_cap),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlannerError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.grades.grade_ii_from > self.grades.grade_i_above {
            return Err(PlannerError::InvalidConfig(format!(
                "grade II floor {} is above grade I threshold {}",
                self.grades.grade_ii_from, self.grades.grade_i_above
            )));
        }

        self.ph_table.validate()
    }
}
