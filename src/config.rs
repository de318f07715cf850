//! Planner configuration
//!
//! Everything that is data rather than code: the fertility standard (ratio
//! denominators, pH table, grade thresholds), the crop policy, the grade used
//! for plots without a soil sample, and the column aliases used to find fields
//! in the input sheets. Loaded from JSON; every section falls back to the
//! built-in default when omitted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::fertility::{FertilityStandard, Grade, CANONICAL_PH_TABLE_VERSION};
use crate::optimizer::CropPolicy;

fn aliases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Soil sheet layout; aliases are matched against cleaned header names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilColumns {
    /// Rows to drop before the header row
    pub skip_rows: usize,
    /// Falls back to the first column when no alias matches
    pub plot: Vec<String>,
    pub ph: Vec<String>,
    pub nitrogen: Vec<String>,
    pub phosphorus: Vec<String>,
    pub potassium: Vec<String>,
}

impl Default for SoilColumns {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            plot: aliases(&["学院", "plot", "plot_id"]),
            ph: aliases(&["pH"]),
            nitrogen: aliases(&["氮", "全氮", "nitrogen"]),
            phosphorus: aliases(&["磷", "有效磷", "phosphorus"]),
            potassium: aliases(&["钾", "速效钾", "potassium"]),
        }
    }
}

/// Crop sheet layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropColumns {
    pub skip_rows: usize,
    pub name: Vec<String>,
    pub season: Vec<String>,
    pub growth_cycle: Vec<String>,
    pub yield_kg: Vec<String>,
    /// Yield in 斤/m², converted at 0.5 kg per 斤
    pub yield_jin: Vec<String>,
    pub cost: Vec<String>,
    /// Free-text range column ("6.0-7.0"); used when present
    pub price_range: Vec<String>,
    pub price_min: Vec<String>,
    pub price_max: Vec<String>,
    pub price_avg: Vec<String>,
}

impl Default for CropColumns {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            name: aliases(&["Crop_Name", "蔬菜名称", "crop"]),
            season: aliases(&["Planting_Season", "生长季节", "season"]),
            growth_cycle: aliases(&["Growth_Cycle_days", "生长周期", "growth_cycle"]),
            yield_kg: aliases(&["Yield_kg_per_m2", "yield_kg_per_m2"]),
            yield_jin: aliases(&["Yield_jin_per_m2", "产量"]),
            cost: aliases(&["Cost_Yuan_per_m2", "种植成本", "cost_per_m2"]),
            price_range: aliases(&["Selling_Price_Yuan_per_kg", "销售单价", "price"]),
            price_min: aliases(&["Min_Selling_Price_Yuan_per_kg", "min_price"]),
            price_max: aliases(&["Max_Selling_Price_Yuan_per_kg", "max_price"]),
            price_avg: aliases(&["Avg_Selling_Price_Yuan_per_kg", "avg_price"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub fertility: FertilityStandard,
    pub crop_policy: CropPolicy,
    /// Grade for plots with no usable soil sample; `None` drops such plots
    pub default_grade: Option<Grade>,
    pub soil_columns: SoilColumns,
    pub crop_columns: CropColumns,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            fertility: FertilityStandard::default(),
            crop_policy: CropPolicy::default(),
            default_grade: Some(Grade::II),
            soil_columns: SoilColumns::default(),
            crop_columns: CropColumns::default(),
        }
    }
}

impl PlannerConfig {
    /// Load and validate a JSON config
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read planner config: {}", path.display()))?;
        let config: PlannerConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse planner config: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid planner config: {}", path.display()))?;

        tracing::info!(
            "Loaded planner config from {} (pH table {})",
            path.display(),
            config.fertility.ph_table.version
        );
        Ok(config)
    }

    /// Load when the file exists, built-in defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(
                "No planner config at {}, using built-in defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), crate::PlannerError> {
        self.fertility.validate()?;
        self.crop_policy.validate()?;

        if !self.fertility.ph_table.is_canonical() {
            tracing::warn!(
                "pH table version '{}' differs from canonical '{}'; grades are not comparable across versions",
                self.fertility.ph_table.version,
                CANONICAL_PH_TABLE_VERSION
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_grade, Some(Grade::II));
        assert!(config.fertility.ph_table.is_canonical());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let file = write_temp(r#"{ "default_grade": "III" }"#);
        let config = PlannerConfig::load(file.path()).unwrap();

        assert_eq!(config.default_grade, Some(Grade::III));
        assert_eq!(config.crop_policy, CropPolicy::default());
        assert_eq!(config.soil_columns, SoilColumns::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let file = write_temp(r#"{ "crop_policy": { "min_fixer_share": { "III": 2.0 } } }"#);
        assert!(PlannerConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner_config.json");
        std::fs::write(&path, r#"{ "default_grade": null }"#).unwrap();

        let config = PlannerConfig::load_or_default(&path).unwrap();
        assert_eq!(config.default_grade, None);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = PlannerConfig::load_or_default("/nonexistent/planner_config.json").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert!(PlannerConfig::load("/nonexistent/planner_config.json").is_err());
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = PlannerConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: PlannerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
