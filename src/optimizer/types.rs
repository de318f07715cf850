//! Allocation inputs: plots and crops

use serde::{Deserialize, Serialize};

use crate::fertility::Grade;
use crate::utils::price_range::PriceRange;

/// Where a plot's grade came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeSource {
    /// Scored from a complete soil sample
    Measured,
    /// No usable sample; the configured default grade was applied
    Default,
}

/// A planting area with its fertility grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub plot_id: String,
    pub area_m2: f64,
    pub grade: Grade,
    pub grade_source: GradeSource,
}

/// Candidate crop; profit per m² is derived once at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub name: String,
    pub season: String,
    pub growth_cycle: String,
    pub yield_kg_per_m2: f64,
    pub cost_per_m2: f64,
    pub price_per_kg: PriceRange,
    profit_per_m2: f64,
}

impl Crop {
    pub fn new(
        name: impl Into<String>,
        season: impl Into<String>,
        growth_cycle: impl Into<String>,
        yield_kg_per_m2: f64,
        cost_per_m2: f64,
        price_per_kg: PriceRange,
    ) -> Self {
        Self {
            name: name.into(),
            season: season.into(),
            growth_cycle: growth_cycle.into(),
            yield_kg_per_m2,
            cost_per_m2,
            price_per_kg,
            profit_per_m2: yield_kg_per_m2 * price_per_kg.avg - cost_per_m2,
        }
    }

    /// yield × average price − cost
    pub fn profit_per_m2(&self) -> f64 {
        self.profit_per_m2
    }
}
