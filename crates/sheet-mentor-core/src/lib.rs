//! # sheet-mentor-core
//!
//! Core data model for the sheet-mentor formula grading engine.
//!
//! This crate provides the types shared by the validation and feedback
//! crates:
//! - [`CellRef`] and [`Span`] - A1-style addressing with `$`-shape tracking
//! - [`Checkpoint`] and [`CheckpointKind`] - what an exercise grades
//! - [`Submission`] - the formula/value maps extracted from a workbook
//! - [`CheckpointResult`] and [`SubmissionReport`] - tri-state outcomes
//! - [`ErrorKind`] and [`Diagnosis`] - the closed error taxonomy
//!
//! Everything here is constructed per grading call and dropped with the
//! report; nothing holds state across calls.

pub mod cellref;
pub mod checkpoint;
pub mod diagnosis;
pub mod error;
pub mod exercise;
pub mod report;
pub mod submission;

// Re-exports for convenience
pub use cellref::{column_to_letters, letters_to_column, CellRef, RefShape, Span};
pub use checkpoint::{Checkpoint, CheckpointKind, Expected, ReferenceConstraint};
pub use diagnosis::{Diagnosis, ErrorKind, Severity};
pub use error::{Error, Result};
pub use exercise::{Exercise, Persona, PersonaConfig, PersonaMessages};
pub use report::{
    CheckpointResult, DetailLevel, FeedbackEntry, SubmissionReport, ValidationStatus,
};
pub use submission::{CellValue, Submission};
