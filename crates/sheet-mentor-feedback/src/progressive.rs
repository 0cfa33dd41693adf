//! Progressive feedback: detail climbs with the attempt count
//!
//! Attempt 1 gets a vague nudge, attempt 2 names the mistake, attempt 3 and
//! beyond spells out the fix. The hint ladder advances with the attempt too,
//! clamped to the last hint once the ladder is exhausted.

use sheet_mentor_core::{DetailLevel, Diagnosis, FeedbackEntry, Persona};

use crate::templates::{render, template};

/// Render the feedback entry for one failed checkpoint
pub fn select_feedback(
    checkpoint_id: &str,
    diagnosis: &Diagnosis,
    attempt: u32,
    hints: &[String],
    persona: Option<Persona>,
) -> FeedbackEntry {
    let attempt = attempt.max(1);
    let level = DetailLevel::for_attempt(attempt);
    let body = render(template(diagnosis.kind, level), &diagnosis.details);
    let text = match persona {
        Some(tone) => apply_tone(tone, attempt, &body),
        None => body,
    };
    FeedbackEntry {
        checkpoint_id: checkpoint_id.to_string(),
        text,
        hint: hint_for_attempt(hints, attempt).map(String::from),
        severity: diagnosis.kind.severity(),
        detail_level: level,
        attempt,
    }
}

/// Hint at the attempt's rung, clamped to the last one
pub fn hint_for_attempt(hints: &[String], attempt: u32) -> Option<&str> {
    if hints.is_empty() {
        return None;
    }
    let idx = (attempt.max(1) as usize - 1).min(hints.len() - 1);
    Some(hints[idx].as_str())
}

fn apply_tone(tone: Persona, attempt: u32, body: &str) -> String {
    match tone {
        Persona::Encouraging => {
            if attempt <= 1 {
                format!("Bon début ! {}", body)
            } else {
                format!("Vous y êtes presque. {} Courage, vous allez y arriver !", body)
            }
        }
        Persona::Patient => {
            if attempt <= 2 {
                format!("{} Prenez votre temps pour relire.", body)
            } else {
                format!("Reprenons calmement. {}", body)
            }
        }
        Persona::Demanding => {
            if attempt <= 1 {
                body.to_string()
            } else {
                format!("{} Cette erreur a déjà été signalée, soyez rigoureux.", body)
            }
        }
    }
}
