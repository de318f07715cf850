//! Input cleaning utilities
//!
//! - Cleaning: Unit stripping, numeric coercion, header normalization
//! - Price range: Free-text price → min/max/avg
//! - Area parser: `<name> <int>㎡` lines with duplicate-name suffixes

pub mod area_parser;
pub mod cleaning;
pub mod price_range;

// Re-export commonly used types
pub use area_parser::{AreaParser, PlotArea};
pub use cleaning::{clean_column_name, parse_numeric_cell, strip_units};
pub use price_range::{PriceParser, PriceRange};
