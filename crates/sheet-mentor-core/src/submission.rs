//! Extracted submission data
//!
//! The file-parsing layer (out of scope here) flattens a workbook into two
//! maps keyed by A1-style references: raw formula strings and computed
//! values. Extraction tools are inconsistent about sheet prefixes, so lookups
//! tolerate a missing or extra `Sheet!` prefix.

use ahash::AHashMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A computed cell value as extracted from the workbook
///
/// Untagged: variants are tried in declaration order, so `Date` must sit
/// before `Text` for an ISO date string to decode as a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric value (Excel stores dates as numbers too; see the date ladder)
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// A value already decoded as a calendar date
    Date(NaiveDate),
    /// Text value
    Text(String),
    /// Explicitly empty cell
    Empty,
}

impl CellValue {
    /// The numeric payload, if any (booleans coerce to 0/1)
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    /// Whether the cell holds anything at all
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

/// The two maps a submission reduces to for grading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    /// Raw formula strings by cell reference (as typed, `=` included)
    #[serde(default)]
    pub formulas: AHashMap<String, String>,
    /// Computed values by cell reference
    #[serde(default)]
    pub values: AHashMap<String, CellValue>,
}

impl Submission {
    /// Create an empty submission
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a formula string for a cell
    pub fn set_formula<K: Into<String>, V: Into<String>>(&mut self, cell: K, formula: V) {
        self.formulas.insert(cell.into(), formula.into());
    }

    /// Insert a computed value for a cell
    pub fn set_value<K: Into<String>, V: Into<CellValue>>(&mut self, cell: K, value: V) {
        self.values.insert(cell.into(), value.into());
    }

    /// Look up a formula, tolerating a missing or extra sheet prefix
    pub fn formula(&self, cell: &str) -> Option<&str> {
        lookup(&self.formulas, cell).map(|s| s.as_str())
    }

    /// Look up a value, tolerating a missing or extra sheet prefix
    pub fn value(&self, cell: &str) -> Option<&CellValue> {
        lookup(&self.values, cell)
    }
}

fn lookup<'a, V>(map: &'a AHashMap<String, V>, cell: &str) -> Option<&'a V> {
    if let Some(v) = map.get(cell) {
        return Some(v);
    }
    match cell.rfind('!') {
        // Prefixed request, maybe stored bare
        Some(pos) => map.get(&cell[pos + 1..]),
        // Bare request, maybe stored prefixed on some sheet
        None => {
            let suffix = format!("!{}", cell);
            map.iter().find(|(k, _)| k.ends_with(&suffix)).map(|(_, v)| v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_exact_and_prefixed() {
        let mut sub = Submission::new();
        sub.set_value("Feuil1!B2", 100.0);
        sub.set_formula("C2", "=SOMME(A1:A10)");

        assert_eq!(sub.value("Feuil1!B2"), Some(&CellValue::Number(100.0)));
        assert_eq!(sub.value("B2"), Some(&CellValue::Number(100.0)));
        assert_eq!(sub.formula("Feuil1!C2"), Some("=SOMME(A1:A10)"));
        assert_eq!(sub.formula("D2"), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(CellValue::Text(" 12,5 ".into()).as_number(), Some(12.5));
        assert_eq!(CellValue::Bool(true).as_number(), Some(1.0));
        assert_eq!(CellValue::Text("abc".into()).as_number(), None);
    }

    #[test]
    fn test_presence() {
        assert!(!CellValue::Empty.is_present());
        assert!(!CellValue::Text("   ".into()).is_present());
        assert!(CellValue::Number(0.0).is_present());
    }

    #[test]
    fn test_submission_json_roundtrip() {
        let mut sub = Submission::new();
        sub.set_formula("C2", "=SOMME(A1:A10)");
        sub.set_value("B2", 100.0);
        sub.set_value("D1", NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        let json = serde_json::to_string(&sub).unwrap();
        let back: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(back.formula("C2"), Some("=SOMME(A1:A10)"));
        assert_eq!(back.value("B2"), Some(&CellValue::Number(100.0)));
        assert_eq!(
            back.value("D1"),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
        );
    }
}
