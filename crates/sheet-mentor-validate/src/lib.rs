//! # sheet-mentor-validate
//!
//! Checkpoint validation for sheet-mentor.
//!
//! This crate provides:
//! - [`validate`] - grade a submission against an exercise's checkpoints
//! - [`validate_flexible`] - standalone weighted single-checkpoint scorer
//! - [`detect_frequent_errors`] - frequent beginner-mistake scan
//! - [`WorkbookInspector`] - structural-presence capability for visual checks
//!
//! Everything is synchronous and side-effect free; a grading call borrows
//! its inputs and returns a report.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sheet_mentor_validate::validate;
//!
//! let report = validate(&exercise, &submission, None);
//! println!("{}/10", report.score_out_of_ten);
//! ```

pub mod flexible;
pub mod frequent;
pub mod validator;
pub mod value_check;
pub mod visual;

pub use flexible::{
    validate_flexible, CheckOutcome, FlexibleExpectation, FlexibleOptions, FlexibleReport,
    FlexibleWeights, DEFAULT_ROW_TOLERANCE, FLEX_ABS_TOLERANCE, FLEX_REL_TOLERANCE,
};
pub use frequent::{detect_frequent_errors, FrequentError};
pub use validator::{reference_shape, validate};
pub use value_check::{
    adaptive_tolerance, any_value_matches, numbers_match, strings_match, value_matches,
    MIN_ABS_TOLERANCE, REL_TOLERANCE_FACTOR,
};
pub use visual::WorkbookInspector;
