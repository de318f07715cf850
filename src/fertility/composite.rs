//! Composite fertility index
//!
//! Sub-index rules:
//! - N: mg/kg → g/kg, divided by the standard, capped
//! - P, K: divided by their standards, capped
//! - pH: table lookup (see `ph_table`)
//!
//! Composite: P = ((P_min)² + (P_avg)²) / 2 × sqrt((n − 1) / n), with n = 4.
//!
//! The methodology asks for at least 10 indicators; only pH, N, P and K are
//! measured, so the composite runs with n = 4 (see `overview` for how this is
//! reported).

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use super::standard::FertilityStandard;
use super::{Grade, Indicator};
use crate::PlannerError;

/// Number of indicators entering the composite
pub const N_INDICATORS: usize = 4;

/// Raw soil row as read from the table; any indicator may be missing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoilReading {
    pub plot_id: String,
    pub ph: Option<f64>,
    pub nitrogen_mg_per_kg: Option<f64>,
    pub phosphorus_mg_per_kg: Option<f64>,
    pub potassium_mg_per_kg: Option<f64>,
}

impl SoilReading {
    fn value(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Ph => self.ph,
            Indicator::Nitrogen => self.nitrogen_mg_per_kg,
            Indicator::Phosphorus => self.phosphorus_mg_per_kg,
            Indicator::Potassium => self.potassium_mg_per_kg,
        }
    }
}

/// Complete soil sample for one plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    pub plot_id: String,
    pub ph: f64,
    pub nitrogen_mg_per_kg: f64,
    pub phosphorus_mg_per_kg: f64,
    pub potassium_mg_per_kg: f64,
}

impl SoilReading {
    /// Present, finite and in range; pH must lie in [0, 14], concentrations ≥ 0
    fn checked(&self, indicator: Indicator) -> Result<f64, PlannerError> {
        let value = self
            .value(indicator)
            .ok_or_else(|| PlannerError::MissingIndicator {
                plot_id: self.plot_id.clone(),
                indicator,
            })?;

        let valid = match indicator {
            Indicator::Ph => value.is_finite() && (0.0..=14.0).contains(&value),
            _ => value.is_finite() && value >= 0.0,
        };
        if !valid {
            return Err(PlannerError::InvalidIndicator {
                plot_id: self.plot_id.clone(),
                indicator,
                value,
            });
        }
        Ok(value)
    }
}

impl TryFrom<&SoilReading> for SoilSample {
    type Error = PlannerError;

    /// Missing values are never defaulted
    fn try_from(reading: &SoilReading) -> Result<Self, Self::Error> {
        Ok(SoilSample {
            plot_id: reading.plot_id.clone(),
            ph: reading.checked(Indicator::Ph)?,
            nitrogen_mg_per_kg: reading.checked(Indicator::Nitrogen)?,
            phosphorus_mg_per_kg: reading.checked(Indicator::Phosphorus)?,
            potassium_mg_per_kg: reading.checked(Indicator::Potassium)?,
        })
    }
}

/// Fertility score for one plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilityScore {
    pub plot_id: String,
    pub sub_index_ph: f64,
    pub sub_index_n: f64,
    pub sub_index_p: f64,
    pub sub_index_k: f64,
    pub min_sub_index: f64,
    pub avg_sub_index: f64,
    pub composite_index: f64,
    pub grade: Grade,
    /// First indicator (pH, N, P, K order) whose sub-index equals the minimum
    pub limiting_indicator: Indicator,
}

impl FertilityScore {
    pub fn sub_index(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Ph => self.sub_index_ph,
            Indicator::Nitrogen => self.sub_index_n,
            Indicator::Phosphorus => self.sub_index_p,
            Indicator::Potassium => self.sub_index_k,
        }
    }
}

/// Measured / standard, capped
fn ratio_sub_index(measured: f64, standard: f64, cap: f64) -> f64 {
    (measured / standard).min(cap)
}

/// Composite index from the min and mean sub-index
pub fn composite_index(min_sub_index: f64, avg_sub_index: f64) -> f64 {
    let n = N_INDICATORS as f64;
    (min_sub_index.powi(2) + avg_sub_index.powi(2)) / 2.0 * ((n - 1.0) / n).sqrt()
}

/// Score one complete sample. Pure and deterministic.
pub fn score_sample(sample: &SoilSample, standard: &FertilityStandard) -> FertilityScore {
    let cap = standard.sub_index_cap;

    let sub_index_ph = standard.ph_table.score(sample.ph);
    let nitrogen_g_per_kg = sample.nitrogen_mg_per_kg / 1000.0;
    let sub_index_n = ratio_sub_index(nitrogen_g_per_kg, standard.nitrogen_g_per_kg, cap);
    let sub_index_p = ratio_sub_index(sample.phosphorus_mg_per_kg, standard.phosphorus_mg_per_kg, cap);
    let sub_index_k = ratio_sub_index(sample.potassium_mg_per_kg, standard.potassium_mg_per_kg, cap);

    let sub_indices = [sub_index_ph, sub_index_n, sub_index_p, sub_index_k];
    let min_sub_index = sub_indices.iter().copied().fold(f64::INFINITY, f64::min);
    let avg_sub_index = sub_indices.iter().sum::<f64>() / N_INDICATORS as f64;

    let limiting_indicator = Indicator::ALL
        .iter()
        .zip(sub_indices.iter())
        .find(|(_, value)| **value == min_sub_index)
        .map(|(indicator, _)| *indicator)
        .unwrap_or(Indicator::Ph);

    let composite = composite_index(min_sub_index, avg_sub_index);

    FertilityScore {
        plot_id: sample.plot_id.clone(),
        sub_index_ph,
        sub_index_n,
        sub_index_p,
        sub_index_k,
        min_sub_index,
        avg_sub_index,
        composite_index: composite,
        grade: Grade::from_composite(composite, &standard.grades),
        limiting_indicator,
    }
}

/// Score a batch in parallel; output order matches input order
pub fn score_samples(samples: &[SoilSample], standard: &FertilityStandard) -> Vec<FertilityScore> {
    samples
        .par_iter()
        .map(|sample| score_sample(sample, standard))
        .collect()
}

/// Result of validating and scoring raw readings
#[derive(Debug, Clone, Default)]
pub struct ScoringOutcome {
    pub scores: Vec<FertilityScore>,
    /// Plots left out of grading, with the reason
    pub excluded: Vec<(String, PlannerError)>,
}

/// Validate raw readings, then score the complete ones.
///
/// Incomplete rows are logged and excluded, never scored with a stand-in value.
pub fn score_readings(readings: &[SoilReading], standard: &FertilityStandard) -> ScoringOutcome {
    let mut samples = Vec::with_capacity(readings.len());
    let mut excluded = Vec::new();

    for reading in readings {
        match SoilSample::try_from(reading) {
            Ok(sample) => samples.push(sample),
            Err(err) => {
                tracing::warn!("Excluding plot from grading: {}", err);
                excluded.push((reading.plot_id.clone(), err));
            }
        }
    }

    ScoringOutcome {
        scores: score_samples(&samples, standard),
        excluded,
    }
}
