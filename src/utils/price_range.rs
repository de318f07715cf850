//! Selling price parsing
//!
//! Prices arrive as free text ("6.0-7.0", "6.0~7.0", "11.5—13.0元") or as a
//! bare number. Every unsigned decimal in the text is extracted; min/max come
//! from those numbers and avg is their mean (the midpoint for a two-number range).

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::PlannerError;

/// Selling price per kg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl PriceRange {
    pub fn fixed(price: f64) -> Self {
        Self {
            min: price,
            max: price,
            avg: price,
        }
    }
}

pub struct PriceParser {
    number: Regex,
}

impl PriceParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            number: Regex::new(r"\d+(?:\.\d*)?")?,
        })
    }

    /// Unsigned decimals in order of appearance
    fn numbers(&self, text: &str) -> Vec<f64> {
        self.number
            .find_iter(text)
            .filter_map(|m| m.as_str().trim_end_matches('.').parse::<f64>().ok())
            .collect()
    }

    pub fn parse(&self, text: &str) -> Result<PriceRange, PlannerError> {
        let numbers = self.numbers(text);
        if numbers.is_empty() {
            return Err(PlannerError::UnparsablePrice(text.to_string()));
        }

        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = numbers.iter().sum::<f64>() / numbers.len() as f64;

        Ok(PriceRange { min, max, avg })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse_price_range(text: &str) -> Result<PriceRange, PlannerError> {
        PriceParser::new().unwrap().parse(text)
    }

    #[test]
    fn test_dash_range() {
        let p = parse_price_range("6.0-7.0").unwrap();
        assert_relative_eq!(p.min, 6.0);
        assert_relative_eq!(p.max, 7.0);
        assert_relative_eq!(p.avg, 6.5);
    }

    #[test]
    fn test_tilde_range() {
        assert_eq!(parse_price_range("6.0~7.0").unwrap(), parse_price_range("6.0-7.0").unwrap());
    }

    #[test]
    fn test_bare_number() {
        let p = parse_price_range("7.0").unwrap();
        assert_eq!(p, PriceRange::fixed(7.0));
        assert_eq!(parse_price_range("7").unwrap(), PriceRange::fixed(7.0));
    }

    #[test]
    fn test_unit_text_and_reversed_order() {
        let p = parse_price_range("13.0—11.5元/公斤").unwrap();
        assert_relative_eq!(p.min, 11.5);
        assert_relative_eq!(p.max, 13.0);
        assert_relative_eq!(p.avg, 12.25);
    }

    #[test]
    fn test_trailing_dot_and_integers() {
        let p = parse_price_range("5.-9").unwrap();
        assert_relative_eq!(p.min, 5.0);
        assert_relative_eq!(p.max, 9.0);
        assert_relative_eq!(p.avg, 7.0);
    }

    #[test]
    fn test_no_numbers() {
        assert_eq!(
            parse_price_range("面议"),
            Err(PlannerError::UnparsablePrice("面议".to_string()))
        );
    }
}
