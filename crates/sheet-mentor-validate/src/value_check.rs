//! Value comparison with adaptive tolerance and date canonicalization
//!
//! Floating-point extraction noise must never fail a learner whose answer is
//! right: both operands are rounded to the expected value's own decimal
//! precision before comparing, and the tolerance adapts to the magnitude of
//! the expectation.

use chrono::{Duration, NaiveDate};
use lazy_regex::regex;
use sheet_mentor_core::{CellValue, Expected};

/// Absolute floor of the adaptive tolerance
pub const MIN_ABS_TOLERANCE: f64 = 0.01;

/// Relative component of the adaptive tolerance (0.01% of the expectation)
pub const REL_TOLERANCE_FACTOR: f64 = 0.0001;

/// Excel's 1900 date system counts days from this base (the off-by-two
/// accounts for the fictitious 1900-02-29 and the 1-based serial)
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial numbers outside this window are treated as plain numbers
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 219_146.0; // ~year 2500

/// `max(explicit, 0.0001 × |expected|, 0.01)`
pub fn adaptive_tolerance(expected: f64, explicit: Option<f64>) -> f64 {
    let floor = (expected.abs() * REL_TOLERANCE_FACTOR).max(MIN_ABS_TOLERANCE);
    match explicit {
        Some(t) => t.max(floor),
        None => floor,
    }
}

fn decimal_places(v: f64) -> u32 {
    let s = format!("{}", v);
    s.split('.').nth(1).map_or(0, |frac| frac.len() as u32)
}

fn round_to(v: f64, decimals: u32) -> f64 {
    let m = 10f64.powi(decimals as i32);
    (v * m).round() / m
}

/// Comparison slack absorbing the representation error of the rounded diff,
/// keeping the tolerance boundary itself inclusive
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Numeric comparison under the adaptive tolerance
///
/// Both operands are first rounded to the expected value's own precision
/// (minimum two decimals) so extraction noise like `0.30000000000000004`
/// cannot produce a false negative. The boundary is inclusive: a difference
/// exactly at the tolerance passes.
pub fn numbers_match(expected: f64, actual: f64, explicit_tolerance: Option<f64>) -> bool {
    let precision = decimal_places(expected).max(2);
    let e = round_to(expected, precision);
    let a = round_to(actual, precision);
    (e - a).abs() <= adaptive_tolerance(expected, explicit_tolerance) + TOLERANCE_EPSILON
}

/// Case- and space-insensitive string comparison
pub fn strings_match(expected: &str, actual: &str) -> bool {
    let squash = |s: &str| {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_lowercase())
            .collect::<String>()
    };
    squash(expected) == squash(actual)
}

fn excel_epoch() -> NaiveDate {
    // Constant components are always valid
    NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2).unwrap()
}

/// Canonicalize anything date-like to a `YYYY-MM-DD` string
///
/// The ladder, in order: already-decoded date, Excel 1900-epoch day serial,
/// `DD/MM/YYYY` text, ISO text (date or datetime prefix).
pub fn canonical_date_value(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        CellValue::Number(n) => canonical_date_serial(*n),
        CellValue::Text(s) => canonical_date_text(s),
        _ => None,
    }
}

/// Canonicalize an expected value to a `YYYY-MM-DD` string
pub fn canonical_date_expected(expected: &Expected) -> Option<String> {
    match expected {
        Expected::Number(n) => canonical_date_serial(*n),
        Expected::Text(s) => canonical_date_text(s),
    }
}

fn canonical_date_serial(n: f64) -> Option<String> {
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&n) || n.fract() != 0.0 {
        return None;
    }
    let date = excel_epoch().checked_add_signed(Duration::days(n as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}

fn canonical_date_text(s: &str) -> Option<String> {
    let s = s.trim();
    if let Some(cap) = regex!(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").captures(s) {
        let day: u32 = cap[1].parse().ok()?;
        let month: u32 = cap[2].parse().ok()?;
        let year: i32 = cap[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(cap) = regex!(r"^(\d{4})-(\d{2})-(\d{2})").captures(s) {
        let year: i32 = cap[1].parse().ok()?;
        let month: u32 = cap[2].parse().ok()?;
        let day: u32 = cap[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    None
}

/// Whether `actual` satisfies `expected` under one tolerance policy
///
/// Tries numeric comparison first, then the date ladder when both sides
/// canonicalize, then the case/space-insensitive string comparison.
pub fn value_matches(expected: &Expected, actual: &CellValue, explicit_tolerance: Option<f64>) -> bool {
    if let (Some(e), Some(a)) = (expected.as_number(), actual.as_number()) {
        if numbers_match(e, a, explicit_tolerance) {
            return true;
        }
    }
    if let (Some(e), Some(a)) = (canonical_date_expected(expected), canonical_date_value(actual)) {
        if e == a {
            return true;
        }
    }
    strings_match(&expected.to_string(), &actual.to_string())
}

/// "Any of" comparison against the expected value and its alternatives
pub fn any_value_matches(
    expected: &Expected,
    alternatives: &[Expected],
    actual: &CellValue,
    explicit_tolerance: Option<f64>,
) -> bool {
    std::iter::once(expected)
        .chain(alternatives.iter())
        .any(|e| value_matches(e, actual, explicit_tolerance))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_tolerance_floor() {
        // max(1234.5 * 0.0001, 0.01) = 0.12345
        let tol = adaptive_tolerance(1234.5, None);
        assert!((tol - 0.12345).abs() < 1e-12);
        // Small expectations fall back to the absolute floor
        assert_eq!(adaptive_tolerance(3.0, None), 0.01);
        // An explicit tolerance can only widen, never narrow
        assert_eq!(adaptive_tolerance(3.0, Some(0.5)), 0.5);
        assert_eq!(adaptive_tolerance(1234.5, Some(0.001)), 0.12345);
    }

    #[test]
    fn test_numbers_match_spec_example() {
        assert!(numbers_match(1234.5, 1234.58, None)); // diff 0.08 <= 0.12345
        assert!(!numbers_match(1234.5, 1235.0, None)); // diff 0.5
    }

    #[test]
    fn test_numbers_match_rounds_float_noise() {
        assert!(numbers_match(0.3, 0.30000000000000004, None));
        assert!(numbers_match(100.0, 100.004, None));
    }

    #[test]
    fn test_numbers_match_boundary_inclusive() {
        // Exactly at the 0.01 floor: 20.0 - 19.99 lands a hair above 0.01
        // in binary and must still pass
        assert!(numbers_match(20.0, 19.99, None));
        assert!(numbers_match(10.0, 10.01, None));
        // Just beyond the boundary still fails
        assert!(!numbers_match(20.0, 19.989, None));
    }

    #[test]
    fn test_strings_match() {
        assert!(strings_match("Total Général", "total  général"));
        assert!(!strings_match("Total", "Moyenne"));
    }

    #[test]
    fn test_date_ladder() {
        let iso = "2024-03-15".to_string();
        assert_eq!(
            canonical_date_value(&CellValue::Text("15/03/2024".into())),
            Some(iso.clone())
        );
        assert_eq!(
            canonical_date_value(&CellValue::Text("2024-03-15T00:00:00".into())),
            Some(iso.clone())
        );
        assert_eq!(
            canonical_date_value(&CellValue::Date(
                chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
            )),
            Some(iso.clone())
        );
        // Excel serial for 2024-03-15
        assert_eq!(canonical_date_value(&CellValue::Number(45366.0)), Some(iso));
    }

    #[test]
    fn test_value_matches_date_forms() {
        let expected = Expected::Text("15/03/2024".into());
        assert!(value_matches(&expected, &CellValue::Number(45366.0), None));
        assert!(value_matches(
            &expected,
            &CellValue::Text("2024-03-15".into()),
            None
        ));
        assert!(!value_matches(
            &expected,
            &CellValue::Text("2024-03-16".into()),
            None
        ));
    }

    #[test]
    fn test_any_value_matches_alternatives() {
        let expected = Expected::Number(100.0);
        let alts = vec![Expected::Text("cent".into())];
        assert!(any_value_matches(&expected, &alts, &CellValue::Text("Cent".into()), None));
        assert!(!any_value_matches(&expected, &alts, &CellValue::Number(90.0), None));
    }
}
