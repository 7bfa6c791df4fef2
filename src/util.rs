// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" cell handling so the rest of the
// code can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Tokens accepted as "true" by [`normalize_flag`], compared case-insensitively.
pub const TRUTHY_TOKENS: [&str; 3] = ["true", "1", "yes"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d"];

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional cells.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`nan`, `inf`, `22kW`).
/// - Returns `None` for anything that cannot be safely parsed.
///
/// Commas are not stripped: in French exports `7,4` is a decimal, not a
/// thousands separator, so it is treated as unparseable.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Parse a date or date/time cell, trying a fixed list of layouts in order.
///
/// Date-only values land on midnight. RFC 3339 values keep their wall-clock
/// time and drop the offset.
pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Map a boolean-like cell to a strict 0/1.
///
/// Only the exact tokens in [`TRUTHY_TOKENS`] (any case) count as 1. Every
/// other value, including a missing cell, is 0.
pub fn normalize_flag(s: Option<&str>) -> u8 {
    match s {
        Some(v) if TRUTHY_TOKENS.iter().any(|t| v.eq_ignore_ascii_case(t)) => 1,
        _ => 0,
    }
}

/// Returns `None` for empty cells so callers can treat "" and missing alike.
pub fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Percentage of `part` in `whole`, 0 when `whole` is zero.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    // Non-finite or beyond `i64`: no separators
    let Ok(int_val) = int_part.parse::<i64>() else {
        return format!("{:.*}", decimals, n);
    };
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `176,286 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
