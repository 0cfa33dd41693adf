//! Checkpoint model
//!
//! An exercise is graded checkpoint by checkpoint. Each checkpoint targets a
//! cell or span and carries one [`CheckpointKind`] describing what is being
//! verified there, plus an ordered hint ladder of increasing specificity.

use crate::cellref::RefShape;
use serde::{Deserialize, Serialize};

/// An expected literal value: exercises express them as numbers or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expected {
    /// Numeric expectation, compared with tolerance
    Number(f64),
    /// Text expectation, compared case/space-insensitively (dates included)
    Text(String),
}

impl Expected {
    /// The numeric payload, if this expectation is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expected::Number(n) => Some(*n),
            Expected::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Number(n) => write!(f, "{}", n),
            Expected::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A constraint on the `$`-shape of one reference inside a formula
///
/// `reference` names the cell or range token as the exercise author wrote it
/// (markers stripped when matching), e.g. `B1` with `shape: Absolute` requires
/// the learner to have written `$B$1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceConstraint {
    /// The reference token the constraint applies to
    pub reference: String,
    /// The required absolute/relative shape
    pub shape: RefShape,
}

/// What a checkpoint verifies, as a closed union dispatched exhaustively
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CheckpointKind {
    /// The formula written in the target cell
    #[serde(rename_all = "camelCase")]
    Formula {
        /// Function that must appear (either language accepted)
        #[serde(default)]
        expected_function: Option<String>,
        /// Fragments that must all appear in the normalized formula
        #[serde(default)]
        patterns: Vec<String>,
        /// Alternative full pattern sets; any one set matching suffices
        #[serde(default)]
        pattern_alternatives: Vec<Vec<String>>,
        /// `$`-shape requirements on individual references
        #[serde(default)]
        reference_constraints: Vec<ReferenceConstraint>,
    },
    /// The computed value in the target cell
    #[serde(rename_all = "camelCase")]
    Value {
        /// The expected value
        expected_value: Expected,
        /// Accepted alternatives ("any of" semantics)
        #[serde(default)]
        expected_value_alternatives: Vec<Expected>,
        /// Explicit numeric tolerance; the adaptive floor still applies
        #[serde(default)]
        tolerance: Option<f64>,
    },
    /// The values filled across the target span, in row-major order
    #[serde(rename_all = "camelCase")]
    RangeData {
        /// Expected ordered values; when absent only presence is required
        #[serde(default)]
        expected_values: Option<Vec<Expected>>,
    },
    /// At least one keyword appears in the target cell's text
    #[serde(rename_all = "camelCase")]
    TextContains {
        /// Keywords, any one matching as a case-insensitive substring
        keywords: Vec<String>,
    },
    /// A chart is expected on the target sheet
    #[serde(rename_all = "camelCase")]
    VisualChart {
        /// Pass/fail on structural presence alone, without manual review
        #[serde(default)]
        presence_only: bool,
    },
    /// Conditional formatting is expected on the target span
    #[serde(rename_all = "camelCase")]
    VisualFormat {
        /// Pass/fail on structural presence alone, without manual review
        #[serde(default)]
        presence_only: bool,
    },
    /// A pivot table is expected in the workbook
    #[serde(rename_all = "camelCase")]
    PivotTable {
        /// Pass/fail on structural presence alone, without manual review
        #[serde(default)]
        presence_only: bool,
    },
    /// Anything the engine cannot adjudicate; always routed to manual review
    Other,
}

impl CheckpointKind {
    /// Whether this kind can only be fully resolved by a visual check
    pub fn is_visual(&self) -> bool {
        matches!(
            self,
            CheckpointKind::VisualChart { .. }
                | CheckpointKind::VisualFormat { .. }
                | CheckpointKind::PivotTable { .. }
                | CheckpointKind::Other
        )
    }
}

/// One gradable expectation within an exercise
///
/// Invariant: `points >= 0`. The sum of points across an exercise's
/// checkpoints is the scoring denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    /// Stable identifier, echoed in results and feedback entries
    pub id: String,
    /// Target cell or span in A1 notation, optionally sheet-prefixed
    #[serde(alias = "cellule")]
    pub cell: String,
    /// Human description, used in the report's passed/failed listings
    #[serde(default)]
    pub description: String,
    /// Weight of this checkpoint in the final score
    pub points: f64,
    /// Ordered hints, from most basic to most revealing
    #[serde(default)]
    pub hints: Vec<String>,
    /// What is verified at the target
    #[serde(flatten)]
    pub kind: CheckpointKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_checkpoint_json_roundtrip() {
        let json = r#"{
            "id": "cp1",
            "cellule": "C2",
            "points": 10,
            "type": "formula",
            "expectedFunction": "SOMME.SI",
            "patterns": ["A2:A10"],
            "hints": ["Think about conditional sums", "Use SOMME.SI", "=SOMME.SI(A2:A10;\">0\")"]
        }"#;
        let cp: Checkpoint = serde_json::from_str(json).unwrap();
        assert_eq!(cp.id, "cp1");
        assert_eq!(cp.cell, "C2");
        match &cp.kind {
            CheckpointKind::Formula {
                expected_function, patterns, ..
            } => {
                assert_eq!(expected_function.as_deref(), Some("SOMME.SI"));
                assert_eq!(patterns, &vec!["A2:A10".to_string()]);
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_value_checkpoint_alternatives() {
        let json = r#"{
            "id": "cp2",
            "cell": "B2",
            "points": 5,
            "type": "value",
            "expectedValue": 100,
            "expectedValueAlternatives": [100.0, "100"]
        }"#;
        let cp: Checkpoint = serde_json::from_str(json).unwrap();
        match &cp.kind {
            CheckpointKind::Value {
                expected_value,
                expected_value_alternatives,
                tolerance,
            } => {
                assert_eq!(expected_value.as_number(), Some(100.0));
                assert_eq!(expected_value_alternatives.len(), 2);
                assert_eq!(*tolerance, None);
            }
            other => panic!("wrong kind: {:?}", other),
        }
    }

    #[test]
    fn test_visual_kinds_flagged() {
        assert!(CheckpointKind::VisualChart { presence_only: false }.is_visual());
        assert!(CheckpointKind::PivotTable { presence_only: true }.is_visual());
        assert!(CheckpointKind::Other.is_visual());
        assert!(!CheckpointKind::TextContains { keywords: vec![] }.is_visual());
    }
}
