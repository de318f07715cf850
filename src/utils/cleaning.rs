//! Cell and header cleaning
//!
//! Spreadsheet exports carry units inside the cells ("50mg/kg", "17.7℃") and
//! inside the headers ("钾mg/kg", "产量（斤/㎡）"). Units are stripped before
//! numeric parsing; anything that still fails to parse becomes missing.

/// Unit tokens removed from cells and headers. "mg/kg" must precede "g/kg".
pub const UNIT_TOKENS: &[&str] = &[
    "mg/kg", "g/kg", "us/cm", "uS/cm", "μS/cm", "µS/cm", "℃", "%", "㎡",
];

/// Header names that all mean soil pH after cleaning
const PH_HEADER_ALIASES: &[&str] = &["酸碱度", "酸碱度pH", "ph", "PH"];

/// Remove unit tokens and surrounding whitespace
pub fn strip_units(cell: &str) -> String {
    let mut cleaned = cell.to_string();
    for token in UNIT_TOKENS {
        if cleaned.contains(token) {
            cleaned = cleaned.replace(token, "");
        }
    }
    cleaned.trim().to_string()
}

/// Parse a cell as a finite number after unit stripping.
///
/// Empty, non-numeric, NaN and infinite cells all return `None`.
pub fn parse_numeric_cell(cell: &str) -> Option<f64> {
    let cleaned = strip_units(cell);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize a header: drop parenthesized text (ASCII or full-width) and
/// unit tokens; map every pH spelling to "pH".
pub fn clean_column_name(raw: &str) -> String {
    let mut name = raw.trim().to_string();

    let open = name.find(|c: char| c == '(' || c == '（');
    let close = name.rfind(|c: char| c == ')' || c == '）');
    if let (Some(start), Some(end)) = (open, close) {
        if end > start {
            let close_len = name[end..].chars().next().map_or(1, char::len_utf8);
            name.replace_range(start..end + close_len, "");
        }
    }

    let name = strip_units(&name);
    if PH_HEADER_ALIASES.contains(&name.as_str()) {
        "pH".to_string()
    } else {
        name
    }
}

/// Rows whose label starts with a footnote marker ("注：2024年11月采样") are not data
pub fn is_footnote_label(label: &str) -> bool {
    let label = label.trim();
    label.starts_with('注') || label.starts_with("Note") || label.starts_with('#')
}
