//! Fertility overview across plots
//!
//! Grade distribution, average composite and which indicator most often limits
//! the composite. Also carries the methodological limitations of a 4-indicator
//! composite so every report states them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::composite::{FertilityScore, N_INDICATORS};
use super::{Grade, Indicator};

/// Indicator count the methodology asks for
pub const RECOMMENDED_MIN_INDICATORS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilityOverview {
    pub scored: usize,
    pub excluded: Vec<String>,
    pub average_composite: Option<f64>,
    /// All three grades present, zero counts included
    pub grade_counts: BTreeMap<Grade, usize>,
    pub limiting_indicator_counts: BTreeMap<Indicator, usize>,
    pub indicators_used: usize,
    pub limitations: Vec<String>,
}

impl FertilityOverview {
    pub fn from_scores(scores: &[FertilityScore], excluded: &[String]) -> Self {
        let mut grade_counts: BTreeMap<Grade, usize> =
            Grade::ALL.iter().map(|&g| (g, 0)).collect();
        let mut limiting_indicator_counts = BTreeMap::new();

        for score in scores {
            *grade_counts.entry(score.grade).or_insert(0) += 1;
            *limiting_indicator_counts
                .entry(score.limiting_indicator)
                .or_insert(0) += 1;
        }

        let average_composite = if scores.is_empty() {
            None
        } else {
            Some(scores.iter().map(|s| s.composite_index).sum::<f64>() / scores.len() as f64)
        };

        Self {
            scored: scores.len(),
            excluded: excluded.to_vec(),
            average_composite,
            grade_counts,
            limiting_indicator_counts,
            indicators_used: N_INDICATORS,
            limitations: limitations(),
        }
    }

    /// Indicator that limits the most plots (ties go to pH/N/P/K order)
    pub fn most_limiting(&self) -> Option<Indicator> {
        Indicator::ALL
            .iter()
            .filter_map(|i| self.limiting_indicator_counts.get(i).map(|&n| (*i, n)))
            .fold(None, |best: Option<(Indicator, usize)>, (i, n)| match best {
                Some((_, best_n)) if best_n >= n => best,
                _ => Some((i, n)),
            })
            .map(|(i, _)| i)
    }
}

fn limitations() -> Vec<String> {
    vec![
        format!(
            "Composite uses {} indicators (pH, N, P, K); the methodology calls for at least {}.",
            N_INDICATORS, RECOMMENDED_MIN_INDICATORS
        ),
        "Organic matter, CEC and texture are not measured and do not enter the composite."
            .to_string(),
        "Ratio sub-indices are capped at the configured maximum; nitrogen is converted from mg/kg to g/kg first."
            .to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fertility::{score_sample, FertilityStandard, SoilSample};
    use approx::assert_relative_eq;

    fn score(plot_id: &str, ph: f64, n: f64, p: f64, k: f64) -> FertilityScore {
        score_sample(
            &SoilSample {
                plot_id: plot_id.to_string(),
                ph,
                nitrogen_mg_per_kg: n,
                phosphorus_mg_per_kg: p,
                potassium_mg_per_kg: k,
            },
            &FertilityStandard::default(),
        )
    }

    #[test]
    fn test_overview_counts() {
        let scores = vec![
            score("学院1", 8.0, 50.0, 70.0, 160.0), // II
            score("学院9", 8.0, 14.0, 19.0, 45.0),  // III
            score("学院2", 8.0, 18.0, 26.0, 60.0),  // II
        ];
        let overview = FertilityOverview::from_scores(&scores, &["注".to_string()]);

        assert_eq!(overview.scored, 3);
        assert_eq!(overview.excluded, vec!["注".to_string()]);
        assert_eq!(overview.grade_counts[&Grade::I], 0);
        assert_eq!(overview.grade_counts[&Grade::II], 2);
        assert_eq!(overview.grade_counts[&Grade::III], 1);
        assert_eq!(overview.limiting_indicator_counts[&Indicator::Nitrogen], 3);
        assert_eq!(overview.most_limiting(), Some(Indicator::Nitrogen));

        let expected = scores.iter().map(|s| s.composite_index).sum::<f64>() / 3.0;
        assert_relative_eq!(overview.average_composite.unwrap(), expected);
        assert_eq!(overview.indicators_used, 4);
        assert!(overview.limitations[0].contains("at least 10"));
    }

    #[test]
    fn test_empty_overview() {
        let overview = FertilityOverview::from_scores(&[], &[]);
        assert_eq!(overview.scored, 0);
        assert!(overview.average_composite.is_none());
        assert!(overview.most_limiting().is_none());
        assert_eq!(overview.grade_counts.len(), 3);
    }
}
