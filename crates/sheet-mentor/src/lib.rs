//! # sheet-mentor
//!
//! A grading engine for spreadsheet exercises.
//!
//! Sheet-mentor compares a learner's extracted workbook data (raw formulas
//! and computed values) against an exercise's checkpoints, tolerating
//! French/English function names, separator styles and `$`-markers, and
//! renders progressive French feedback that reveals more with each attempt.
//!
//! ## Features
//!
//! - Language-agnostic formula comparison (SOMME.SI ≡ SUMIF, `;` ≡ `,`)
//! - Checkpoint validation: formulas, values, ranges, text, visual elements
//! - Adaptive numeric tolerance and an Excel-serial/ISO/text date ladder
//! - A closed error taxonomy with typo detection and severity levels
//! - Attempt-driven feedback: vague, then precise, then the solution
//! - Optional weighted single-checkpoint scoring ([`validate_flexible`])
//!
//! ## Example
//!
//! ```rust
//! use sheet_mentor::prelude::*;
//!
//! let exercise: Exercise = serde_json::from_str(r#"{
//!     "checkpoints": [
//!         {"id": "total", "cell": "C2", "points": 10, "type": "formula",
//!          "expectedFunction": "SOMME.SI"}
//!     ]
//! }"#).unwrap();
//!
//! let mut submission = Submission::new();
//! submission.set_formula("C2", "=SUMIF(A2:A10,\">0\")");
//!
//! let report = validate(&exercise, &submission, None);
//! let report = analyze_submission(&exercise, &submission, report, 1);
//! assert_eq!(report.score_out_of_ten, 10.0);
//! ```

pub mod prelude;

// Re-export the data model
pub use sheet_mentor_core::{
    CellRef, CellValue, Checkpoint, CheckpointKind, CheckpointResult, DetailLevel, Diagnosis,
    Error, ErrorKind, Exercise, Expected, FeedbackEntry, Persona, PersonaConfig, PersonaMessages,
    ReferenceConstraint, RefShape, Result, Severity, Span, Submission, SubmissionReport,
    ValidationStatus,
};

// Re-export formula normalization
pub use sheet_mentor_lang::{
    are_equivalent, contains_function, extract_function_names, normalize, translate, Lang,
    MatchOptions, NormalizeOptions,
};

// Re-export validation
pub use sheet_mentor_validate::{
    detect_frequent_errors, validate, validate_flexible, FlexibleExpectation, FlexibleOptions,
    FlexibleReport, FlexibleWeights, WorkbookInspector,
};

// Re-export feedback
pub use sheet_mentor_feedback::{analyze_submission, classify, select_feedback};
