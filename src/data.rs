//! Input data loading
//!
//! Reads the soil indicator sheet, the crop sheet and the plot area text from a
//! data directory. Sheets are read with polars with every column typed as
//! String, so unit-suffixed cells ("50mg/kg") survive until `utils::cleaning`
//! coerces them. Columns are located by configurable aliases.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::config::{CropColumns, PlannerConfig, SoilColumns};
use crate::fertility::SoilReading;
use crate::optimizer::Crop;
use crate::utils::area_parser::{AreaParser, PlotArea};
use crate::utils::cleaning::{clean_column_name, is_footnote_label, parse_numeric_cell};
use crate::utils::price_range::{PriceParser, PriceRange};
use crate::PlannerError;

pub const SOIL_FILE: &str = "soil_indicators.csv";
pub const CROP_FILE: &str = "crops.csv";
pub const AREA_FILE: &str = "farm_areas.txt";

/// kg per 斤
pub const JIN_TO_KG: f64 = 0.5;

/// Everything the planner reads from disk
#[derive(Debug, Clone)]
pub struct FarmData {
    pub soil: Vec<SoilReading>,
    pub crops: Vec<Crop>,
    pub areas: Vec<PlotArea>,
}

impl FarmData {
    /// Load all three inputs from `data_dir`
    pub fn load<P: AsRef<Path>>(data_dir: P, config: &PlannerConfig) -> Result<Self> {
        let dir = data_dir.as_ref();
        tracing::info!("Loading farm data from {}", dir.display());

        let soil_df = read_table(dir.join(SOIL_FILE), config.soil_columns.skip_rows)?;
        let soil = parse_soil_readings(&soil_df, &config.soil_columns)
            .with_context(|| format!("Failed to read soil table: {}", SOIL_FILE))?;

        let crop_df = read_table(dir.join(CROP_FILE), config.crop_columns.skip_rows)?;
        let crops = parse_crops(&crop_df, &config.crop_columns)
            .with_context(|| format!("Failed to read crop table: {}", CROP_FILE))?;

        let areas = read_areas(dir.join(AREA_FILE))?;

        tracing::info!(
            "  Soil rows: {}, crops: {}, plots: {}",
            soil.len(),
            crops.len(),
            areas.len()
        );

        Ok(Self { soil, crops, areas })
    }
}

/// Read a CSV with every column as String
pub fn read_table<P: AsRef<Path>>(path: P, skip_rows: usize) -> Result<DataFrame> {
    let path = path.as_ref();
    CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows(skip_rows)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {}", path.display()))
}

/// Parse the plot area text file
pub fn read_areas<P: AsRef<Path>>(path: P) -> Result<Vec<PlotArea>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read area file: {}", path.display()))?;
    let parser = AreaParser::new().context("Failed to compile area pattern")?;
    Ok(parser.parse(&text))
}

/// First header matching any alias, raw or cleaned, in alias order
pub fn find_column(df: &DataFrame, aliases: &[String]) -> Option<String> {
    let headers: Vec<(String, String)> = df
        .get_column_names()
        .into_iter()
        .map(|name| {
            let raw = name.to_string();
            let cleaned = clean_column_name(&raw);
            (raw, cleaned)
        })
        .collect();

    aliases.iter().find_map(|alias| {
        headers
            .iter()
            .find(|(raw, cleaned)| {
                raw.eq_ignore_ascii_case(alias) || cleaned.eq_ignore_ascii_case(alias)
            })
            .map(|(raw, _)| raw.clone())
    })
}

fn require_column(df: &DataFrame, table: &str, aliases: &[String]) -> Result<String, PlannerError> {
    find_column(df, aliases).ok_or_else(|| PlannerError::MissingColumn {
        table: table.to_string(),
        aliases: aliases.to_vec(),
    })
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .with_context(|| format!("Column '{}' not found", name))?
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))
}

fn optional_column<'a>(df: &'a DataFrame, aliases: &[String]) -> Result<Option<&'a StringChunked>> {
    find_column(df, aliases)
        .map(|name| string_column(df, &name))
        .transpose()
}

fn numeric_cell(column: Option<&StringChunked>, idx: usize) -> Option<f64> {
    cell(column, idx).and_then(parse_numeric_cell)
}

fn cell<'a>(column: Option<&'a StringChunked>, idx: usize) -> Option<&'a str> {
    column
        .and_then(|c| c.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Label of a data row, or `None` for blank and footnote rows
fn row_label<'a>(labels: &'a StringChunked, idx: usize, table: &str) -> Option<&'a str> {
    match cell(Some(labels), idx) {
        None => {
            tracing::warn!("{} row {}: empty name, skipping", table, idx + 1);
            None
        }
        Some(label) if is_footnote_label(label) => {
            tracing::debug!("{} row {}: footnote '{}', skipping", table, idx + 1, label);
            None
        }
        Some(label) => Some(label),
    }
}

/// Soil sheet → raw readings. Unparsable cells become missing.
pub fn parse_soil_readings(df: &DataFrame, columns: &SoilColumns) -> Result<Vec<SoilReading>> {
    let plot_col = match find_column(df, &columns.plot) {
        Some(name) => name,
        None => df
            .get_column_names()
            .first()
            .map(|name| name.to_string())
            .ok_or_else(|| PlannerError::MissingColumn {
                table: "soil".to_string(),
                aliases: columns.plot.clone(),
            })?,
    };
    let ph_col = require_column(df, "soil", &columns.ph)?;
    let n_col = require_column(df, "soil", &columns.nitrogen)?;
    let p_col = require_column(df, "soil", &columns.phosphorus)?;
    let k_col = require_column(df, "soil", &columns.potassium)?;

    let plots = string_column(df, &plot_col)?;
    let ph = string_column(df, &ph_col)?;
    let nitrogen = string_column(df, &n_col)?;
    let phosphorus = string_column(df, &p_col)?;
    let potassium = string_column(df, &k_col)?;

    let mut readings = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let Some(plot_id) = row_label(plots, idx, "soil") else {
            continue;
        };
        readings.push(SoilReading {
            plot_id: plot_id.to_string(),
            ph: numeric_cell(Some(ph), idx),
            nitrogen_mg_per_kg: numeric_cell(Some(nitrogen), idx),
            phosphorus_mg_per_kg: numeric_cell(Some(phosphorus), idx),
            potassium_mg_per_kg: numeric_cell(Some(potassium), idx),
        });
    }

    Ok(readings)
}

/// Crop sheet → crops. Rows without a usable yield, cost or price are skipped.
pub fn parse_crops(df: &DataFrame, columns: &CropColumns) -> Result<Vec<Crop>> {
    let name_col = require_column(df, "crop", &columns.name)?;
    let cost_col = require_column(df, "crop", &columns.cost)?;

    let (yield_col, yield_factor) = match find_column(df, &columns.yield_kg) {
        Some(name) => (name, 1.0),
        None => {
            let mut all = columns.yield_kg.clone();
            all.extend(columns.yield_jin.iter().cloned());
            let name = find_column(df, &columns.yield_jin).ok_or(PlannerError::MissingColumn {
                table: "crop".to_string(),
                aliases: all,
            })?;
            (name, JIN_TO_KG)
        }
    };

    let names = string_column(df, &name_col)?;
    let costs = string_column(df, &cost_col)?;
    let yields = string_column(df, &yield_col)?;

    let seasons = optional_column(df, &columns.season)?;
    let cycles = optional_column(df, &columns.growth_cycle)?;
    let price_text = optional_column(df, &columns.price_range)?;
    let price_min = optional_column(df, &columns.price_min)?;
    let price_max = optional_column(df, &columns.price_max)?;
    let price_avg = optional_column(df, &columns.price_avg)?;

    if price_text.is_none() && price_avg.is_none() {
        let mut all = columns.price_range.clone();
        all.extend(columns.price_avg.iter().cloned());
        return Err(PlannerError::MissingColumn {
            table: "crop".to_string(),
            aliases: all,
        }
        .into());
    }

    let prices = PriceParser::new().context("Failed to compile price pattern")?;
    let mut parsed = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let Some(name) = row_label(names, idx, "crop") else {
            continue;
        };

        let (Some(yield_per_m2), Some(cost)) =
            (numeric_cell(Some(yields), idx), numeric_cell(Some(costs), idx))
        else {
            tracing::warn!("Crop '{}': missing yield or cost, skipping", name);
            continue;
        };

        let price = match cell(price_text, idx) {
            Some(text) => prices.parse(text),
            None => price_columns(price_min, price_max, price_avg, idx),
        };
        let price = match price {
            Ok(price) => price,
            Err(err) => {
                tracing::warn!("Crop '{}': {}, skipping", name, err);
                continue;
            }
        };

        parsed.push(Crop::new(
            name,
            cell(seasons, idx).unwrap_or_default(),
            cell(cycles, idx).unwrap_or_default(),
            yield_per_m2 * yield_factor,
            cost,
            price,
        ));
    }

    Ok(parsed)
}

/// Separate min/max/avg columns; a missing avg is the min/max midpoint
fn price_columns(
    min: Option<&StringChunked>,
    max: Option<&StringChunked>,
    avg: Option<&StringChunked>,
    idx: usize,
) -> Result<PriceRange, PlannerError> {
    match (
        numeric_cell(min, idx),
        numeric_cell(max, idx),
        numeric_cell(avg, idx),
    ) {
        (Some(min), Some(max), Some(avg)) => Ok(PriceRange { min, max, avg }),
        (Some(min), Some(max), None) => Ok(PriceRange {
            min,
            max,
            avg: (min + max) / 2.0,
        }),
        (_, _, Some(avg)) => Ok(PriceRange::fixed(avg)),
        _ => Err(PlannerError::UnparsablePrice(String::new())),
    }
}
