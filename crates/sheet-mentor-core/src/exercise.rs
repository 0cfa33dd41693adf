//! Exercise model: the checkpoint list plus pedagogical metadata

use crate::checkpoint::Checkpoint;
use serde::{Deserialize, Serialize};

/// Tutor tone applied to feedback messages
///
/// A closed set: exercises pick one of the three documented tones rather than
/// describing a persona in free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Cheers progress, softens failures
    Encouraging,
    /// Neutral and methodical
    Patient,
    /// Direct, expects rigor
    Demanding,
}

/// Exercise-supplied message overrides for the report's global message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaMessages {
    /// Shown on a perfect score
    #[serde(default)]
    pub success: Option<String>,
    /// Shown on a partial score
    #[serde(default)]
    pub partial: Option<String>,
    /// Shown on a low score
    #[serde(default)]
    pub failure: Option<String>,
}

/// Persona configuration attached to an exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Which tone to apply
    pub tone: Persona,
    /// Optional global-message overrides
    #[serde(default)]
    pub messages: PersonaMessages,
}

/// One exercise: the unit a submission is graded against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Gradable expectations, in presentation order
    pub checkpoints: Vec<Checkpoint>,
    /// Competence tags, passed through for reporting
    #[serde(default)]
    pub competences: Vec<String>,
    /// Exercise-level advice appended to reports scoring below 7/10
    #[serde(default)]
    pub pedagogical_advice: Option<String>,
    /// Optional tutor persona
    #[serde(default)]
    pub persona: Option<PersonaConfig>,
}

impl Exercise {
    /// Sum of points across all checkpoints (the scoring denominator)
    pub fn total_points(&self) -> f64 {
        self.checkpoints.iter().map(|c| c.points.max(0.0)).sum()
    }
}
