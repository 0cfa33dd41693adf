//! Submission analysis: diagnose failures and render progressive feedback
//!
//! [`analyze_submission`] completes the partial report produced by the
//! validator: each failed checkpoint is classified, a feedback entry is
//! rendered at the attempt's detail level, error counts are tallied and the
//! global message is rebucketed (honoring exercise-supplied persona
//! overrides).

use sheet_mentor_core::{
    CheckpointKind, Exercise, Severity, Submission, SubmissionReport, ValidationStatus,
};

use crate::classify::classify;
use crate::progressive::select_feedback;

/// Diagnose every failed checkpoint and attach rendered feedback
///
/// `attempt` is 1-based; it drives both the detail level and the hint ladder.
/// The returned report is the input report with `feedback_entries`, error
/// counts, `global_message` and `advice` filled in.
pub fn analyze_submission(
    exercise: &Exercise,
    submission: &Submission,
    mut report: SubmissionReport,
    attempt: u32,
) -> SubmissionReport {
    let attempt = attempt.max(1);
    let tone = exercise.persona.as_ref().map(|p| p.tone);

    let mut entries = Vec::new();
    let mut critical = 0usize;
    let mut total = 0usize;

    for result in &report.results {
        if result.status != ValidationStatus::Failed {
            continue;
        }
        let Some(checkpoint) = exercise.checkpoints.iter().find(|c| c.id == result.checkpoint_id)
        else {
            log::warn!("result references unknown checkpoint {}", result.checkpoint_id);
            continue;
        };

        let expected_function = match &checkpoint.kind {
            CheckpointKind::Formula { expected_function, .. } => expected_function.as_deref(),
            _ => None,
        };
        let expected_value = match &checkpoint.kind {
            CheckpointKind::Value { expected_value, .. } => Some(expected_value),
            _ => None,
        };

        let diagnosis = classify(
            submission.formula(&checkpoint.cell),
            expected_function,
            expected_value,
            submission.value(&checkpoint.cell),
            checkpoint,
        );
        log::debug!(
            "checkpoint {} diagnosed as {:?}",
            checkpoint.id,
            diagnosis.kind
        );

        total += 1;
        if diagnosis.kind.severity() == Severity::High {
            critical += 1;
        }
        entries.push(select_feedback(
            &checkpoint.id,
            &diagnosis,
            attempt,
            &checkpoint.hints,
            tone,
        ));
    }

    report.feedback_entries = entries;
    report.total_errors = total;
    report.critical_errors = critical;
    report.global_message = global_message(exercise, report.score_out_of_hundred);
    if let Some(advice) = priority_advice(critical, total, attempt) {
        report.advice = Some(advice);
    }
    report
}

/// Bucketed overall message, with persona overrides when supplied
fn global_message(exercise: &Exercise, score_out_of_hundred: f64) -> String {
    let messages = exercise.persona.as_ref().map(|p| &p.messages);
    let custom = |pick: fn(&sheet_mentor_core::PersonaMessages) -> &Option<String>| {
        messages.and_then(|m| pick(m).clone())
    };

    if score_out_of_hundred >= 100.0 {
        custom(|m| &m.success)
            .unwrap_or_else(|| "Félicitations, tout est correct !".to_string())
    } else if score_out_of_hundred >= 70.0 {
        custom(|m| &m.partial)
            .unwrap_or_else(|| "Très bon travail, il ne reste que quelques points à corriger.".to_string())
    } else if score_out_of_hundred >= 40.0 {
        custom(|m| &m.partial)
            .unwrap_or_else(|| "Vous êtes sur la bonne voie, continuez vos efforts.".to_string())
    } else {
        custom(|m| &m.failure)
            .unwrap_or_else(|| "Reprenez l'exercice étape par étape, vous allez progresser.".to_string())
    }
}

/// Advice rules based on the error profile
fn priority_advice(critical: usize, total: usize, attempt: u32) -> Option<String> {
    if critical > 0 && attempt >= 2 {
        Some(format!(
            "Commencez par corriger {} erreur(s) bloquante(s) avant le reste.",
            critical
        ))
    } else if total > 3 {
        Some("Beaucoup de points échouent : corrigez la première erreur, les suivantes en découlent souvent.".to_string())
    } else {
        None
    }
}
