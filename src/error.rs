//! Planner error types
//!
//! Domain failures raised while cleaning input rows or validating configuration.
//! Row-level errors are logged and the row skipped; they never abort a run.

use thiserror::Error;

use crate::fertility::Indicator;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlannerError {
    #[error("plot '{plot_id}' is missing {indicator}")]
    MissingIndicator { plot_id: String, indicator: Indicator },

    #[error("plot '{plot_id}' has invalid {indicator} value {value}")]
    InvalidIndicator {
        plot_id: String,
        indicator: Indicator,
        value: f64,
    },

    #[error("could not parse area line: '{0}'")]
    UnparsableAreaLine(String),

    #[error("plot '{plot_id}' has non-positive area {area}")]
    InvalidArea { plot_id: String, area: f64 },

    #[error("could not parse price: '{0}'")]
    UnparsablePrice(String),

    #[error("{table}: no column matches any of {aliases:?}")]
    MissingColumn {
        table: String,
        aliases: Vec<String>,
    },

    #[error("invalid pH table: {0}")]
    InvalidPhTable(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
