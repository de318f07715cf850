//! Farm Planner Rust Implementation
//!
//! Soil fertility grading and profit-maximizing crop allocation for campus
//! micro-farms.
//!
//! - `utils/`: Cell cleaning, price range and area line parsing
//! - `data`: Sheet loading with Polars
//! - `fertility/`: Sub-indices, composite index, grades, overview
//! - `optimizer/`: Crop allocation LP (minilp)
//! - `planner`: Coordinator running the full pipeline
//! - `report/`: CSV and JSON output

pub mod config;
pub mod data;
pub mod error;
pub mod fertility;
pub mod optimizer;
pub mod planner;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use config::PlannerConfig;
pub use data::FarmData;
pub use error::PlannerError;
pub use fertility::{score_readings, FertilityScore, FertilityStandard, Grade, SoilReading, SoilSample};
pub use optimizer::{allocate, AllocationOutcome, AllocationPlan, CropPolicy, Plot, SolveStatus};
pub use planner::{FarmPlanner, PlanningRun};
pub use report::{OutputFormat, PlanReport};
