//! Convenience re-exports for the common grading flow
//!
//! ```rust
//! use sheet_mentor::prelude::*;
//! ```

pub use sheet_mentor_core::{
    CellValue, Checkpoint, CheckpointKind, CheckpointResult, DetailLevel, ErrorKind, Exercise,
    Expected, FeedbackEntry, Persona, PersonaConfig, Submission, SubmissionReport,
    ValidationStatus,
};
pub use sheet_mentor_feedback::analyze_submission;
pub use sheet_mentor_lang::are_equivalent;
pub use sheet_mentor_validate::{validate, WorkbookInspector};
