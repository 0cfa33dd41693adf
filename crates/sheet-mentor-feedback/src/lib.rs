//! # sheet-mentor-feedback
//!
//! Error classification and progressive feedback for sheet-mentor.
//!
//! This crate provides:
//! - [`classify`] - first-match-wins diagnosis of a failed formula checkpoint
//! - [`select_feedback`] - render one diagnosis at the attempt's detail level
//! - [`analyze_submission`] - complete a validator report with diagnoses,
//!   feedback entries, error counts and the global message
//!
//! Feedback text is French and learner-facing; diagnostic details stay in
//! the report's machine-readable maps.

pub mod analyzer;
pub mod classify;
pub mod progressive;
pub mod templates;

pub use analyzer::analyze_submission;
pub use classify::{classify, CLOSE_VALUE_REL_THRESHOLD, TYPO_MAX_DISTANCE};
pub use progressive::{hint_for_attempt, select_feedback};
