//! Plot area text parsing
//!
//! Areas come as free-text lines `<name> <integer> ㎡` (space before the unit
//! optional). Several plots may share a generic name; every name that occurs
//! more than once gets a numeric suffix in order of appearance
//! ("后勤临时管理用地" ×2 → "后勤临时管理用地1", "后勤临时管理用地2").

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::PlannerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub plot_id: String,
    pub area_m2: f64,
}

pub struct AreaParser {
    pattern: Regex,
}

impl AreaParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(r"^(.*?)\s*(\d+)\s*㎡$")?,
        })
    }

    /// Parse one line into (raw name, area)
    pub fn parse_line(&self, line: &str) -> Result<(String, u64), PlannerError> {
        let line = line.trim();
        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| PlannerError::UnparsableAreaLine(line.to_string()))?;

        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        if name.is_empty() {
            return Err(PlannerError::UnparsableAreaLine(line.to_string()));
        }

        let area = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .ok_or_else(|| PlannerError::UnparsableAreaLine(line.to_string()))?;

        Ok((name.to_string(), area))
    }

    /// Parse a whole text block. Blank lines are ignored; unparsable lines and
    /// zero areas are logged and skipped.
    pub fn parse(&self, text: &str) -> Vec<PlotArea> {
        let mut parsed = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match self.parse_line(line) {
                Ok((name, 0)) => {
                    tracing::warn!(
                        "{}",
                        PlannerError::InvalidArea {
                            plot_id: name,
                            area: 0.0
                        }
                    );
                }
                Ok(entry) => parsed.push(entry),
                Err(err) => tracing::warn!("Skipping area line: {}", err),
            }
        }

        let mut occurrences: FxHashMap<&str, usize> = FxHashMap::default();
        for (name, _) in &parsed {
            *occurrences.entry(name.as_str()).or_insert(0) += 1;
        }

        let mut next_suffix: FxHashMap<&str, usize> = FxHashMap::default();
        let mut areas = Vec::with_capacity(parsed.len());
        for (name, area) in &parsed {
            let plot_id = if occurrences.get(name.as_str()).copied().unwrap_or(0) > 1 {
                let suffix = next_suffix.entry(name.as_str()).or_insert(0);
                *suffix += 1;
                format!("{}{}", name, suffix)
            } else {
                name.clone()
            };
            areas.push(PlotArea {
                plot_id,
                area_m2: *area as f64,
            });
        }

        areas
    }
}
