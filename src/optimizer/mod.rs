//! Crop allocation optimizer
//!
//! Maximizes total profit by assigning crop areas to plots. Each plot's grade
//! decides which crops it may grow and how much of its planted area must go to
//! nitrogen-fixing crops. Solved as a continuous LP with minilp.

pub mod model;
pub mod plan;
pub mod policy;
pub mod types;

pub use model::AllocationModel;
pub use plan::{
    allocate, AllocationDecision, AllocationOutcome, AllocationPlan, PlotSummary, SolveStatus,
    AREA_EPSILON,
};
pub use policy::CropPolicy;
pub use types::{Crop, GradeSource, Plot};
