//! Coercion of raw cells into dates and numbers.

use crate::core::Scalar;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const MISSING_TOKENS: &[&str] = &["nan", "null", "na", "n/a", "none", "nat"];

/// Outcome of coercing a cell to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericCell {
    Value(f64),
    Missing,
    NonNumeric,
}

impl NumericCell {
    /// The value, or `NaN` for anything that is not a number.
    pub fn or_nan(self) -> f64 {
        match self {
            NumericCell::Value(v) => v,
            _ => f64::NAN,
        }
    }
}

/// Parse a date-like cell. Date-times are truncated to their calendar date.
pub fn coerce_date(cell: &Scalar) -> Option<NaiveDate> {
    match cell {
        Scalar::Text(s) => parse_date(s),
        Scalar::Null | Scalar::Number(_) => None,
    }
}

/// Parse a date string in any of the supported layouts.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return Some(date);
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.date());
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Coerce a cell to a finite number.
pub fn coerce_number(cell: &Scalar) -> NumericCell {
    match cell {
        Scalar::Null => NumericCell::Missing,
        Scalar::Number(v) if v.is_finite() => NumericCell::Value(*v),
        Scalar::Number(_) => NumericCell::Missing,
        Scalar::Text(s) => {
            let s = s.trim();
            if s.is_empty() || MISSING_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t)) {
                return NumericCell::Missing;
            }
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() => NumericCell::Value(v),
                Ok(_) => NumericCell::Missing,
                Err(_) => NumericCell::NonNumeric,
            }
        }
    }
}
