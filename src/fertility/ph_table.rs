//! pH sub-index lookup table
//!
//! pH is not scored as a ratio against a standard value. It maps through a
//! piecewise table of disjoint bands that cover the whole real line, symmetric
//! around neutral pH 7.0.
//!
//! Only one table ships built in (`granular-v2`). Configs may replace it, in
//! which case the loader logs the version switch.

use serde::{Deserialize, Serialize};

use crate::PlannerError;

/// Version tag of the built-in table
pub const CANONICAL_PH_TABLE_VERSION: &str = "granular-v2";

/// One pH band with its sub-index score.
/// `None` bounds are open-ended (-inf / +inf).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhBand {
    pub lower: Option<f64>,
    #[serde(default)]
    pub lower_inclusive: bool,
    pub upper: Option<f64>,
    #[serde(default)]
    pub upper_inclusive: bool,
    pub score: f64,
}

impl PhBand {
    pub fn contains(&self, ph: f64) -> bool {
        let above_lower = match self.lower {
            None => true,
            Some(lo) if self.lower_inclusive => ph >= lo,
            Some(lo) => ph > lo,
        };
        let below_upper = match self.upper {
            None => true,
            Some(hi) if self.upper_inclusive => ph <= hi,
            Some(hi) => ph < hi,
        };
        above_lower && below_upper
    }
}

// ============================================================================
// EMBEDDED CANONICAL TABLE
// ============================================================================

static GRANULAR_BANDS: &[PhBand] = &[
    PhBand { lower: None, lower_inclusive: false, upper: Some(5.0), upper_inclusive: false, score: 1.0 },
    PhBand { lower: Some(5.0), lower_inclusive: true, upper: Some(5.5), upper_inclusive: false, score: 1.5 },
    PhBand { lower: Some(5.5), lower_inclusive: true, upper: Some(6.0), upper_inclusive: false, score: 2.0 },
    PhBand { lower: Some(6.0), lower_inclusive: true, upper: Some(6.5), upper_inclusive: false, score: 2.5 },
    PhBand { lower: Some(6.5), lower_inclusive: true, upper: Some(7.5), upper_inclusive: true, score: 3.0 },
    PhBand { lower: Some(7.5), lower_inclusive: false, upper: Some(8.0), upper_inclusive: true, score: 2.5 },
    PhBand { lower: Some(8.0), lower_inclusive: false, upper: Some(8.5), upper_inclusive: true, score: 2.0 },
    PhBand { lower: Some(8.5), lower_inclusive: false, upper: Some(9.0), upper_inclusive: true, score: 1.5 },
    PhBand { lower: Some(9.0), lower_inclusive: false, upper: None, upper_inclusive: false, score: 1.0 },
];

/// Versioned pH lookup table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhTable {
    pub version: String,
    pub bands: Vec<PhBand>,
}

impl Default for PhTable {
    fn default() -> Self {
        Self {
            version: CANONICAL_PH_TABLE_VERSION.to_string(),
            bands: GRANULAR_BANDS.to_vec(),
        }
    }
}

impl PhTable {
    /// Sub-index for a pH reading.
    ///
    /// A validated table always has exactly one matching band; an unmatched
    /// reading falls back to the lowest score in the table.
    pub fn score(&self, ph: f64) -> f64 {
        self.bands
            .iter()
            .find(|band| band.contains(ph))
            .map(|band| band.score)
            .unwrap_or_else(|| self.lowest_score())
    }

    pub fn lowest_score(&self) -> f64 {
        self.bands.iter().map(|b| b.score).fold(f64::INFINITY, f64::min)
    }

    pub fn is_canonical(&self) -> bool {
        self.version == CANONICAL_PH_TABLE_VERSION
    }

    /// Check that bands are ordered, disjoint and cover (-inf, +inf).
    ///
    /// Adjacent bands must share a boundary value that exactly one of them includes.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let (first, last) = match (self.bands.first(), self.bands.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(PlannerError::InvalidPhTable("table has no bands".to_string())),
        };

        if first.lower.is_some() {
            return Err(PlannerError::InvalidPhTable(
                "first band must be open below".to_string(),
            ));
        }
        if last.upper.is_some() {
            return Err(PlannerError::InvalidPhTable(
                "last band must be open above".to_string(),
            ));
        }

        for (idx, band) in self.bands.iter().enumerate() {
            if !band.score.is_finite() {
                return Err(PlannerError::InvalidPhTable(format!(
                    "band {} has non-finite score",
                    idx
                )));
            }
            if let (Some(lo), Some(hi)) = (band.lower, band.upper) {
                if lo >= hi {
                    return Err(PlannerError::InvalidPhTable(format!(
                        "band {} is empty ({} .. {})",
                        idx, lo, hi
                    )));
                }
            }
        }

        if self.lowest_score() < 0.0 {
            return Err(PlannerError::InvalidPhTable(format!(
                "band scores must be non-negative, lowest is {}",
                self.lowest_score()
            )));
        }

        for (idx, pair) in self.bands.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            match (a.upper, b.lower) {
                (Some(hi), Some(lo)) if hi == lo => {
                    if a.upper_inclusive == b.lower_inclusive {
                        return Err(PlannerError::InvalidPhTable(format!(
                            "boundary {} between bands {} and {} must be included by exactly one band",
                            hi,
                            idx,
                            idx + 1
                        )));
                    }
                }
                _ => {
                    return Err(PlannerError::InvalidPhTable(format!(
                        "bands {} and {} are not contiguous",
                        idx,
                        idx + 1
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_canonical_table_is_valid() {
        let table = PhTable::default();
        assert!(table.validate().is_ok());
        assert!(table.is_canonical());
        assert_eq!(table.bands.len(), 9);
    }

    #[test]
    fn test_band_boundaries() {
        let table = PhTable::default();
        assert_relative_eq!(table.score(4.99), 1.0);
        assert_relative_eq!(table.score(5.0), 1.5);
        assert_relative_eq!(table.score(5.5), 2.0);
        assert_relative_eq!(table.score(6.0), 2.5);
        assert_relative_eq!(table.score(6.5), 3.0);
        assert_relative_eq!(table.score(7.0), 3.0);
        assert_relative_eq!(table.score(7.5), 3.0);
        assert_relative_eq!(table.score(7.51), 2.5);
        assert_relative_eq!(table.score(8.0), 2.5);
        assert_relative_eq!(table.score(8.1), 2.0);
        assert_relative_eq!(table.score(8.5), 2.0);
        assert_relative_eq!(table.score(9.0), 1.5);
        assert_relative_eq!(table.score(9.01), 1.0);
    }

    #[test]
    fn test_symmetric_around_neutral() {
        // Band edges mirror around 7.0 (inclusive side flips with the mirror)
        let table = PhTable::default();
        for offset in [0.25, 0.75, 1.25, 1.75, 2.25, 3.0] {
            assert_relative_eq!(table.score(7.0 - offset), table.score(7.0 + offset));
        }
    }

    #[test]
    fn test_exactly_one_band_matches() {
        let table = PhTable::default();
        let mut ph = 0.0;
        while ph <= 14.0 {
            let hits = table.bands.iter().filter(|b| b.contains(ph)).count();
            assert_eq!(hits, 1, "pH {}", ph);
            ph += 0.05;
        }
    }

    #[test]
    fn test_validate_rejects_gap() {
        let mut table = PhTable::default();
        table.bands.remove(3);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_double_inclusive_boundary() {
        let mut table = PhTable::default();
        table.bands[5].lower_inclusive = true; // 7.5 now in two bands
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_score() {
        let mut table = PhTable::default();
        table.bands[0].score = -1.0;
        assert!(table.validate().is_err());
        assert_relative_eq!(PhTable::default().lowest_score(), 1.0);
    }

    #[test]
    fn test_validate_rejects_closed_ends() {
        let mut table = PhTable::default();
        table.bands[0].lower = Some(0.0);
        assert!(table.validate().is_err());

        let empty = PhTable {
            version: "empty".to_string(),
            bands: vec![],
        };
        assert!(empty.validate().is_err());
    }
}
