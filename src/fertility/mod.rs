//! Soil fertility scoring
//!
//! Turns one row of pH/N/P/K readings per plot into a composite fertility index
//! and a three-level grade:
//! - `ph_table`: piecewise pH sub-index lookup
//! - `standard`: standard values, cap and grade thresholds (data, not code)
//! - `composite`: sub-indices, composite index, batch scoring
//! - `overview`: grade distribution and limiting-indicator counts

pub mod composite;
pub mod overview;
pub mod ph_table;
pub mod standard;

pub use composite::{
    score_readings, score_sample, score_samples, FertilityScore, ScoringOutcome, SoilReading,
    SoilSample, N_INDICATORS,
};
pub use overview::{FertilityOverview, RECOMMENDED_MIN_INDICATORS};
pub use ph_table::{PhBand, PhTable, CANONICAL_PH_TABLE_VERSION};
pub use standard::{FertilityStandard, GradeThresholds};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Soil indicator feeding one sub-index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    #[serde(rename = "pH")]
    Ph,
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Indicator {
    /// Fixed evaluation order; ties for the limiting indicator resolve to the earliest.
    pub const ALL: [Indicator; 4] = [
        Indicator::Ph,
        Indicator::Nitrogen,
        Indicator::Phosphorus,
        Indicator::Potassium,
    ];
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Indicator::Ph => "pH",
            Indicator::Nitrogen => "nitrogen",
            Indicator::Phosphorus => "phosphorus",
            Indicator::Potassium => "potassium",
        };
        f.write_str(name)
    }
}

/// Fertility grade (I best, III worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    I,
    II,
    III,
}

impl Grade {
    pub const ALL: [Grade; 3] = [Grade::I, Grade::II, Grade::III];

    /// Bucket a composite index. Total over f64: anything that is neither above
    /// the grade I threshold nor at/above the grade II floor (NaN included) is III.
    pub fn from_composite(composite: f64, thresholds: &GradeThresholds) -> Grade {
        if composite > thresholds.grade_i_above {
            Grade::I
        } else if composite >= thresholds.grade_ii_from {
            Grade::II
        } else {
            Grade::III
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::I => "I",
            Grade::II => "II",
            Grade::III => "III",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = crate::PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "I" | "1" => Ok(Grade::I),
            "II" | "2" => Ok(Grade::II),
            "III" | "3" => Ok(Grade::III),
            other => Err(crate::PlannerError::InvalidConfig(format!(
                "unknown fertility grade '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_thresholds() {
        let t = GradeThresholds::default();
        assert_eq!(Grade::from_composite(1.71, &t), Grade::I);
        assert_eq!(Grade::from_composite(1.7, &t), Grade::II);
        assert_eq!(Grade::from_composite(0.9, &t), Grade::II);
        assert_eq!(Grade::from_composite(0.8999, &t), Grade::III);
        assert_eq!(Grade::from_composite(0.0, &t), Grade::III);
    }

    #[test]
    fn test_grade_total_over_odd_values() {
        // Every f64 maps to exactly one grade
        let t = GradeThresholds::default();
        assert_eq!(Grade::from_composite(f64::NAN, &t), Grade::III);
        assert_eq!(Grade::from_composite(f64::INFINITY, &t), Grade::I);
        assert_eq!(Grade::from_composite(f64::NEG_INFINITY, &t), Grade::III);
        assert_eq!(Grade::from_composite(-1.0, &t), Grade::III);
    }

    #[test]
    fn test_grade_no_gaps_on_fine_grid() {
        let t = GradeThresholds::default();
        let mut c = 0.0;
        while c < 8.0 {
            let g = Grade::from_composite(c, &t);
            let expected = if c > 1.7 {
                Grade::I
            } else if c >= 0.9 {
                Grade::II
            } else {
                Grade::III
            };
            assert_eq!(g, expected, "composite {}", c);
            c += 0.001;
        }
    }

    #[test]
    fn test_grade_parse_and_display() {
        assert_eq!("II".parse::<Grade>().unwrap(), Grade::II);
        assert_eq!(" 3 ".parse::<Grade>().unwrap(), Grade::III);
        assert!("IV".parse::<Grade>().is_err());
        assert_eq!(Grade::I.to_string(), "I");
        assert_eq!(Indicator::Ph.to_string(), "pH");
    }
}
