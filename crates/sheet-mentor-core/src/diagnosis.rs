//! Error diagnosis model
//!
//! When a formula checkpoint fails, the feedback layer classifies *why* into
//! one of a closed set of error kinds. The kind drives both the message
//! template and the severity shown in the UI.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Severity of a diagnosed error, for UI emphasis and advice rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or near-miss
    Low,
    /// Ordinary mistake
    Medium,
    /// Blocks the checkpoint entirely
    High,
}

/// The closed set of diagnosable formula errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Nothing was written in the target cell
    MissingFormula,
    /// The entry does not start with `=`
    MissingEquals,
    /// Opening and closing parentheses do not balance
    UnbalancedParens,
    /// The expected function is absent and nothing else was tried
    MissingFunction,
    /// A different function was used instead of the expected one
    WrongFunction,
    /// A near-miss spelling of the expected function
    FunctionTypo,
    /// A text criterion is missing its surrounding quotes
    MissingCriteriaQuotes,
    /// A comparison operator sits outside the quoted criterion
    OperatorOutsideQuotes,
    /// The formula references the wrong column or no range at all
    WrongColumn,
    /// The formula refers to its own cell
    CircularReference,
    /// A reference that should be absolute is not
    MissingAbsoluteReference,
    /// The cell shows `#N/A`
    NaError,
    /// The cell shows `#REF!`
    RefError,
    /// The cell shows `#VALUE!`
    ValueError,
    /// The computed value is wrong
    WrongValue,
    /// The computed value is wrong but within 5% of the expectation
    CloseValue,
    /// Nothing more specific could be determined
    Unknown,
}

impl ErrorKind {
    /// Fixed severity lookup
    pub fn severity(&self) -> Severity {
        match self {
            ErrorKind::MissingFormula | ErrorKind::WrongValue | ErrorKind::CircularReference => {
                Severity::High
            }
            ErrorKind::MissingEquals | ErrorKind::FunctionTypo | ErrorKind::CloseValue => {
                Severity::Low
            }
            _ => Severity::Medium,
        }
    }
}

/// Outcome of classifying one failed checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// What went wrong
    pub kind: ErrorKind,
    /// Template placeholders extracted during classification
    /// (e.g. `cell`, `expected`, `actual`, `suggestion`)
    pub details: AHashMap<String, String>,
    /// Fixed severity of `kind`
    pub severity: Severity,
}

impl Diagnosis {
    /// Build a diagnosis with the kind's fixed severity
    pub fn new(kind: ErrorKind, details: AHashMap<String, String>) -> Self {
        let severity = kind.severity();
        Self {
            kind,
            details,
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_lookup() {
        assert_eq!(ErrorKind::MissingFormula.severity(), Severity::High);
        assert_eq!(ErrorKind::WrongValue.severity(), Severity::High);
        assert_eq!(ErrorKind::CircularReference.severity(), Severity::High);
        assert_eq!(ErrorKind::MissingEquals.severity(), Severity::Low);
        assert_eq!(ErrorKind::FunctionTypo.severity(), Severity::Low);
        assert_eq!(ErrorKind::CloseValue.severity(), Severity::Low);
        assert_eq!(ErrorKind::WrongFunction.severity(), Severity::Medium);
        assert_eq!(ErrorKind::Unknown.severity(), Severity::Medium);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }
}
