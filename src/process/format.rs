// src/process/format.rs

use arrow::array::{Array, Float64Array, Float64Builder, Int64Array, Int64Builder, StringArray};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ScrapeError;

/// Placeholder tokens e-Stat uses for "no value" (not surveyed, nil, confidential).
pub const NULL_SENTINELS: [&str; 3] = ["…", "-", "x"];

static YEAR_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*\(").expect("year prefix regex should compile"));

fn as_text(array: &dyn Array) -> Result<&StringArray, ScrapeError> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ScrapeError::NotText(array.data_type().clone()))
}

/// `平.13(2001)` → 2001. Full-width parentheses are accepted.
pub fn parse_year(raw: &str) -> Option<i64> {
    let normalized = raw.replace('（', "(").replace('）', ")");
    let stripped = YEAR_PREFIX.replace_all(&normalized, "");
    stripped.replace(')', "").trim().parse().ok()
}

pub fn is_null_sentinel(raw: &str) -> bool {
    NULL_SENTINELS.contains(&raw)
}

/// Convert a column of era-prefixed year strings into integer years.
///
/// Every entry must parse; a null or malformed entry fails the whole column.
pub fn format_raw_str_year(array: &dyn Array) -> Result<Int64Array, ScrapeError> {
    let strings = as_text(array)?;
    let mut b = Int64Builder::with_capacity(strings.len());
    for (row, opt) in strings.iter().enumerate() {
        let year = opt
            .and_then(parse_year)
            .ok_or_else(|| ScrapeError::ParseYear {
                row,
                raw: opt.map(str::to_string),
            })?;
        b.append_value(year);
    }
    Ok(b.finish())
}

/// Convert a column of quantity strings into floats, mapping sentinels to null.
pub fn format_raw_qty(array: &dyn Array) -> Result<Float64Array, ScrapeError> {
    let strings = as_text(array)?;
    let mut b = Float64Builder::with_capacity(strings.len());
    for (row, opt) in strings.iter().enumerate() {
        match opt.map(str::trim) {
            None => b.append_null(),
            Some(s) if is_null_sentinel(s) => b.append_null(),
            Some(s) => {
                let v: f64 = s.parse().map_err(|_| ScrapeError::ParseQuantity {
                    row,
                    raw: s.to_string(),
                })?;
                b.append_value(v);
            }
        }
    }
    Ok(b.finish())
}
