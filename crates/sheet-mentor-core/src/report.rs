//! Validation results and the submission report
//!
//! Results are tri-state: a visual checkpoint that the engine cannot
//! adjudicate is `RequiresManualReview`, which is neither a pass nor a fail.
//! The report is the engine's only output; no failure mode escapes as an
//! error to the caller.

use crate::diagnosis::Severity;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Outcome of one checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationStatus {
    /// The checkpoint's expectations were met
    Passed,
    /// The checkpoint's expectations were not met
    Failed,
    /// Cannot be decided without an external visual check; not a failure
    RequiresManualReview,
}

impl ValidationStatus {
    /// Whether this result counts toward the score numerator
    pub fn is_passed(&self) -> bool {
        matches!(self, ValidationStatus::Passed)
    }
}

/// Result of validating one checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResult {
    /// The checkpoint this result belongs to
    pub checkpoint_id: String,
    /// Tri-state outcome
    pub status: ValidationStatus,
    /// Feedback text for the learner
    pub feedback: String,
    /// Hint chosen from the checkpoint's ladder, if any applies
    #[serde(default)]
    pub hint: Option<String>,
    /// Diagnostic details (actually-used functions, counts, raw errors)
    #[serde(default)]
    pub details: AHashMap<String, String>,
    /// Set when an external visual validation is being requested
    #[serde(default)]
    pub needs_visual_check: bool,
}

impl CheckpointResult {
    /// A passed result with feedback text
    pub fn passed<S: Into<String>>(checkpoint_id: &str, feedback: S) -> Self {
        Self {
            checkpoint_id: checkpoint_id.to_string(),
            status: ValidationStatus::Passed,
            feedback: feedback.into(),
            hint: None,
            details: AHashMap::new(),
            needs_visual_check: false,
        }
    }

    /// A failed result with feedback text
    pub fn failed<S: Into<String>>(checkpoint_id: &str, feedback: S) -> Self {
        Self {
            checkpoint_id: checkpoint_id.to_string(),
            status: ValidationStatus::Failed,
            feedback: feedback.into(),
            hint: None,
            details: AHashMap::new(),
            needs_visual_check: false,
        }
    }

    /// A manual-review result, flagged for external visual validation
    pub fn manual_review<S: Into<String>>(checkpoint_id: &str, feedback: S) -> Self {
        Self {
            checkpoint_id: checkpoint_id.to_string(),
            status: ValidationStatus::RequiresManualReview,
            feedback: feedback.into(),
            hint: None,
            details: AHashMap::new(),
            needs_visual_check: true,
        }
    }

    /// Attach a hint
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }

    /// Attach one diagnostic detail
    pub fn with_detail<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// How revealing a feedback message is; climbs with the attempt count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// First attempt: point at the area, reveal nothing
    Vague,
    /// Second attempt: name the mistake
    Precise,
    /// Third attempt onward: spell out the fix
    Solution,
}

impl DetailLevel {
    /// The ladder rung for a 1-based attempt number
    pub fn for_attempt(attempt: u32) -> Self {
        match attempt {
            0 | 1 => DetailLevel::Vague,
            2 => DetailLevel::Precise,
            _ => DetailLevel::Solution,
        }
    }
}

/// One rendered feedback message for a failed checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    /// The checkpoint this feedback belongs to
    pub checkpoint_id: String,
    /// Rendered message (persona tone applied)
    pub text: String,
    /// Hint from the checkpoint's ladder, by attempt index
    #[serde(default)]
    pub hint: Option<String>,
    /// Severity of the underlying diagnosis
    pub severity: Severity,
    /// Which rung of the disclosure ladder produced `text`
    pub detail_level: DetailLevel,
    /// The attempt number the entry was rendered for
    pub attempt: u32,
}

/// The full grading report for one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    /// Score on a 0–10 scale, rounded to one decimal
    pub score_out_of_ten: f64,
    /// Score on a 0–100 scale, rounded to the nearest integer
    pub score_out_of_hundred: f64,
    /// Number of checkpoints in the exercise
    pub checkpoints_total: usize,
    /// Number of checkpoints that passed
    pub checkpoints_passed: usize,
    /// Per-checkpoint outcomes, in exercise order
    pub results: Vec<CheckpointResult>,
    /// Rendered feedback for failed checkpoints (filled by the analyzer)
    #[serde(default)]
    pub feedback_entries: Vec<FeedbackEntry>,
    /// Overall message bucketed by score
    pub global_message: String,
    /// Priority advice, when the error profile warrants one
    #[serde(default)]
    pub advice: Option<String>,
    /// Count of high-severity diagnosed errors
    #[serde(default)]
    pub critical_errors: usize,
    /// Count of all diagnosed errors
    #[serde(default)]
    pub total_errors: usize,
}
