//! Checkpoint validation
//!
//! [`validate`] grades one submission against one exercise. Every checkpoint
//! produces a tri-state [`CheckpointResult`]; internal faults while grading a
//! single checkpoint are downgraded to `Failed` results so the batch always
//! completes and the caller never sees an error.

use crate::frequent::detect_frequent_errors;
use crate::value_check::{any_value_matches, numbers_match, strings_match};
use crate::visual::{chart_presence, format_presence, pivot_presence, WorkbookInspector};
use lazy_regex::regex;
use sheet_mentor_core::{
    CellValue, Checkpoint, CheckpointKind, CheckpointResult, Exercise, Expected, RefShape, Result,
    Span, Submission, SubmissionReport, ValidationStatus,
};
use sheet_mentor_lang::{contains_function, extract_function_names, matches_all_patterns, MatchOptions};

/// Score below which the exercise-level pedagogical advice is attached
const ADVICE_SCORE_THRESHOLD: f64 = 7.0;

/// How a formula checkpoint failed, for hint selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureCategory {
    /// Nothing was submitted at the target cell
    NothingSubmitted,
    /// The expected function is absent or wrong
    WrongFunction,
    /// A reference has the wrong `$`-shape
    ReferenceShape,
    /// Anything else
    Other,
}

/// Fixed priority table mapping failure category to a hint index
fn select_hint(hints: &[String], category: FailureCategory) -> Option<String> {
    if hints.is_empty() {
        return None;
    }
    let last = hints.len() - 1;
    let index = match category {
        FailureCategory::NothingSubmitted => 0,
        FailureCategory::WrongFunction => {
            if hints.len() < 3 {
                last
            } else {
                1
            }
        }
        FailureCategory::ReferenceShape => last,
        FailureCategory::Other => 1.min(last),
    };
    hints.get(index).cloned()
}

/// Grade a submission against an exercise
///
/// Returns a partial [`SubmissionReport`]: results, scores and the bucketed
/// report text. Feedback entries and error counts are filled in by the
/// feedback analyzer.
pub fn validate(
    exercise: &Exercise,
    submission: &Submission,
    inspector: Option<&dyn WorkbookInspector>,
) -> SubmissionReport {
    let mut results = Vec::with_capacity(exercise.checkpoints.len());
    for checkpoint in &exercise.checkpoints {
        log::debug!("validating checkpoint {} ({})", checkpoint.id, checkpoint.cell);
        let result = evaluate_checkpoint(checkpoint, submission, inspector).unwrap_or_else(|e| {
            log::warn!("checkpoint {} faulted during evaluation: {}", checkpoint.id, e);
            CheckpointResult::failed(
                &checkpoint.id,
                format!("Le point de contrôle en {} n'a pas pu être vérifié.", checkpoint.cell),
            )
            .with_detail("internal_error", e.to_string())
        });
        results.push(result);
    }

    let total_points = exercise.total_points();
    let earned_points: f64 = exercise
        .checkpoints
        .iter()
        .zip(&results)
        .filter(|(_, r)| r.status.is_passed())
        .map(|(c, _)| c.points.max(0.0))
        .sum();
    let ratio = if total_points > 0.0 {
        earned_points / total_points
    } else {
        0.0
    };
    let score_out_of_ten = (ratio * 100.0).round() / 10.0;
    let score_out_of_hundred = (ratio * 100.0).round();
    let checkpoints_passed = results.iter().filter(|r| r.status.is_passed()).count();

    let global_message = render_summary(exercise, &results, score_out_of_ten);
    let advice = if score_out_of_ten < ADVICE_SCORE_THRESHOLD {
        exercise.pedagogical_advice.clone()
    } else {
        None
    };

    SubmissionReport {
        score_out_of_ten,
        score_out_of_hundred,
        checkpoints_total: exercise.checkpoints.len(),
        checkpoints_passed,
        results,
        feedback_entries: Vec::new(),
        global_message,
        advice,
        critical_errors: 0,
        total_errors: 0,
    }
}

fn evaluate_checkpoint(
    checkpoint: &Checkpoint,
    submission: &Submission,
    inspector: Option<&dyn WorkbookInspector>,
) -> Result<CheckpointResult> {
    match &checkpoint.kind {
        CheckpointKind::Formula {
            expected_function,
            patterns,
            pattern_alternatives,
            reference_constraints,
        } => Ok(check_formula(
            checkpoint,
            submission,
            expected_function.as_deref(),
            patterns,
            pattern_alternatives,
            reference_constraints,
        )),
        CheckpointKind::Value {
            expected_value,
            expected_value_alternatives,
            tolerance,
        } => Ok(check_value(
            checkpoint,
            submission,
            expected_value,
            expected_value_alternatives,
            *tolerance,
        )),
        CheckpointKind::RangeData { expected_values } => {
            check_range_data(checkpoint, submission, expected_values.as_deref())
        }
        CheckpointKind::TextContains { keywords } => {
            Ok(check_text_contains(checkpoint, submission, keywords))
        }
        CheckpointKind::VisualChart { presence_only } => {
            Ok(check_visual(checkpoint, inspector, VisualKind::Chart, *presence_only))
        }
        CheckpointKind::VisualFormat { presence_only } => {
            Ok(check_visual(checkpoint, inspector, VisualKind::Format, *presence_only))
        }
        CheckpointKind::PivotTable { presence_only } => {
            Ok(check_visual(checkpoint, inspector, VisualKind::Pivot, *presence_only))
        }
        CheckpointKind::Other => Ok(CheckpointResult::manual_review(
            &checkpoint.id,
            format!(
                "Le point de contrôle en {} nécessite une vérification manuelle.",
                checkpoint.cell
            ),
        )),
    }
}

// === formula ===

fn check_formula(
    checkpoint: &Checkpoint,
    submission: &Submission,
    expected_function: Option<&str>,
    patterns: &[String],
    pattern_alternatives: &[Vec<String>],
    reference_constraints: &[sheet_mentor_core::ReferenceConstraint],
) -> CheckpointResult {
    let formula = match submission.formula(&checkpoint.cell) {
        Some(f) if !f.trim().is_empty() => f.to_string(),
        _ => {
            return CheckpointResult::failed(
                &checkpoint.id,
                format!("Aucune formule trouvée dans la cellule {}.", checkpoint.cell),
            )
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::NothingSubmitted))
            .with_detail("missing", "formula");
        }
    };

    if let Some(expected) = expected_function {
        if !contains_function(&formula, expected) {
            let used = extract_function_names(&formula);
            let used_list = if used.is_empty() {
                "aucune fonction".to_string()
            } else {
                used.join(", ")
            };
            return CheckpointResult::failed(
                &checkpoint.id,
                format!(
                    "La fonction {} était attendue en {}, mais vous avez utilisé : {}.",
                    expected, checkpoint.cell, used_list
                ),
            )
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::WrongFunction))
            .with_detail("expected_function", expected)
            .with_detail("used_functions", used.join(","));
        }
    }

    let match_opts = MatchOptions::default();
    let pattern_failure = if !pattern_alternatives.is_empty() {
        // Any one full alternative set must match
        let all_fail = pattern_alternatives
            .iter()
            .all(|set| !matches_all_patterns(&formula, set, &match_opts).is_empty());
        if all_fail {
            let first_unmatched = matches_all_patterns(&formula, &pattern_alternatives[0], &match_opts);
            Some(first_unmatched)
        } else {
            None
        }
    } else if !patterns.is_empty() {
        let unmatched = matches_all_patterns(&formula, patterns, &match_opts);
        if unmatched.is_empty() {
            None
        } else {
            Some(unmatched)
        }
    } else {
        None
    };

    if let Some(unmatched) = pattern_failure {
        return CheckpointResult::failed(
            &checkpoint.id,
            format!(
                "La formule en {} ne contient pas les éléments attendus : {}.",
                checkpoint.cell,
                unmatched.join(", ")
            ),
        )
        .with_hint(select_hint(&checkpoint.hints, FailureCategory::Other))
        .with_detail("unmatched_patterns", unmatched.join(","));
    }

    for constraint in reference_constraints {
        if let Some(message) = check_reference_shape(&formula, constraint) {
            return CheckpointResult::failed(&checkpoint.id, message)
                .with_hint(select_hint(&checkpoint.hints, FailureCategory::ReferenceShape))
                .with_detail("reference", constraint.reference.clone())
                .with_detail("expected_shape", constraint.shape.to_string());
        }
    }

    let findings = detect_frequent_errors(&formula);
    if let Some(critical) = findings.iter().find(|f| f.is_critical()) {
        return CheckpointResult::failed(&checkpoint.id, critical.message.clone())
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::Other))
            .with_detail("frequent_error", format!("{:?}", critical.kind));
    }

    CheckpointResult::passed(
        &checkpoint.id,
        format!("La formule en {} est correcte.", checkpoint.cell),
    )
}

/// The `$`-shape of `reference` as the formula actually writes it
///
/// The reference is matched by its bare column/row, markers stripped;
/// returns None when the formula never mentions it.
pub fn reference_shape(formula: &str, reference: &str) -> Option<RefShape> {
    let wanted = reference.replace('$', "").to_ascii_uppercase();
    let re = regex!(r"(\$?)([A-Za-z]{1,3})(\$?)(\d+)");
    for cap in re.captures_iter(formula) {
        let bare = format!("{}{}", cap[2].to_ascii_uppercase(), &cap[4]);
        if bare != wanted {
            continue;
        }
        return Some(match (!cap[1].is_empty(), !cap[3].is_empty()) {
            (true, true) => RefShape::Absolute,
            (false, false) => RefShape::Relative,
            (true, false) => RefShape::MixedCol,
            (false, true) => RefShape::MixedRow,
        });
    }
    None
}

/// Compare the `$`-shape of a constrained reference in the raw formula
///
/// Returns a targeted failure message on mismatch, None when satisfied.
fn check_reference_shape(
    formula: &str,
    constraint: &sheet_mentor_core::ReferenceConstraint,
) -> Option<String> {
    let wanted = constraint.reference.replace('$', "").to_ascii_uppercase();
    match reference_shape(formula, &constraint.reference) {
        Some(shape) if shape == constraint.shape => None,
        Some(shape) => Some(format!(
            "La référence {} doit être {} (vous avez écrit une référence {}). Pensez aux marqueurs $.",
            wanted, constraint.shape, shape
        )),
        None => Some(format!(
            "La référence {} attendue n'apparaît pas dans la formule.",
            wanted
        )),
    }
}

// === value ===

fn check_value(
    checkpoint: &Checkpoint,
    submission: &Submission,
    expected: &Expected,
    alternatives: &[Expected],
    tolerance: Option<f64>,
) -> CheckpointResult {
    let actual = match submission.value(&checkpoint.cell) {
        Some(v) if v.is_present() => v,
        _ => {
            return CheckpointResult::failed(
                &checkpoint.id,
                format!("Aucune valeur trouvée dans la cellule {}.", checkpoint.cell),
            )
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::NothingSubmitted))
            .with_detail("missing", "value");
        }
    };

    if any_value_matches(expected, alternatives, actual, tolerance) {
        CheckpointResult::passed(
            &checkpoint.id,
            format!("La valeur en {} est correcte.", checkpoint.cell),
        )
    } else {
        CheckpointResult::failed(
            &checkpoint.id,
            format!(
                "La valeur en {} ne correspond pas au résultat attendu.",
                checkpoint.cell
            ),
        )
        .with_hint(select_hint(&checkpoint.hints, FailureCategory::Other))
        .with_detail("expected", expected.to_string())
        .with_detail("actual", actual.to_string())
    }
}

// === rangeData ===

/// Floor tolerance reused for range elements (same rule as single values)
fn range_element_matches(expected: &Expected, actual: &CellValue) -> bool {
    if let (Some(e), Some(a)) = (expected.as_number(), actual.as_number()) {
        return numbers_match(e, a, None);
    }
    strings_match(&expected.to_string(), &actual.to_string())
}

fn check_range_data(
    checkpoint: &Checkpoint,
    submission: &Submission,
    expected_values: Option<&[Expected]>,
) -> Result<CheckpointResult> {
    let span = Span::parse(&checkpoint.cell)?;
    let extracted: Vec<CellValue> = span
        .cells()
        .filter_map(|r| submission.value(&r.to_string()).cloned())
        .filter(|v| v.is_present())
        .collect();

    let Some(expected) = expected_values else {
        return Ok(if extracted.is_empty() {
            CheckpointResult::failed(
                &checkpoint.id,
                format!("La plage {} ne contient aucune donnée.", checkpoint.cell),
            )
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::NothingSubmitted))
        } else {
            CheckpointResult::passed(
                &checkpoint.id,
                format!("La plage {} contient des données.", checkpoint.cell),
            )
        });
    };

    if extracted.len() != expected.len() {
        return Ok(CheckpointResult::failed(
            &checkpoint.id,
            format!(
                "La plage {} contient {} valeur(s), {} étaient attendue(s).",
                checkpoint.cell,
                extracted.len(),
                expected.len()
            ),
        )
        .with_hint(select_hint(&checkpoint.hints, FailureCategory::Other))
        .with_detail("expected_count", expected.len().to_string())
        .with_detail("actual_count", extracted.len().to_string()));
    }

    let mismatches: Vec<usize> = expected
        .iter()
        .zip(&extracted)
        .enumerate()
        .filter(|(_, (e, a))| !range_element_matches(e, a))
        .map(|(i, _)| i)
        .collect();

    Ok(if mismatches.is_empty() {
        CheckpointResult::passed(
            &checkpoint.id,
            format!("Les données de la plage {} sont correctes.", checkpoint.cell),
        )
    } else {
        CheckpointResult::failed(
            &checkpoint.id,
            format!(
                "{} valeur(s) de la plage {} ne correspondent pas.",
                mismatches.len(),
                checkpoint.cell
            ),
        )
        .with_hint(select_hint(&checkpoint.hints, FailureCategory::Other))
        .with_detail(
            "mismatched_positions",
            mismatches
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    })
}

// === textContains ===

fn check_text_contains(
    checkpoint: &Checkpoint,
    submission: &Submission,
    keywords: &[String],
) -> CheckpointResult {
    let text = match submission.value(&checkpoint.cell) {
        Some(v) if v.is_present() => v.to_string().to_lowercase(),
        _ => {
            return CheckpointResult::failed(
                &checkpoint.id,
                format!("Aucun texte trouvé dans la cellule {}.", checkpoint.cell),
            )
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::NothingSubmitted));
        }
    };

    if keywords.iter().any(|k| text.contains(&k.to_lowercase())) {
        CheckpointResult::passed(
            &checkpoint.id,
            format!("Le texte en {} est correct.", checkpoint.cell),
        )
    } else {
        CheckpointResult::failed(
            &checkpoint.id,
            format!(
                "Le texte en {} ne contient aucun des mots attendus.",
                checkpoint.cell
            ),
        )
        .with_hint(select_hint(&checkpoint.hints, FailureCategory::Other))
        .with_detail("keywords", keywords.join(","))
    }
}

// === visual ===

enum VisualKind {
    Chart,
    Format,
    Pivot,
}

fn check_visual(
    checkpoint: &Checkpoint,
    inspector: Option<&dyn WorkbookInspector>,
    kind: VisualKind,
    presence_only: bool,
) -> CheckpointResult {
    let Some(inspector) = inspector else {
        return CheckpointResult::manual_review(
            &checkpoint.id,
            format!(
                "Le point de contrôle en {} nécessite une vérification visuelle.",
                checkpoint.cell
            ),
        );
    };

    let sheet = checkpoint
        .cell
        .rfind('!')
        .map(|pos| checkpoint.cell[..pos].trim_matches('\'').to_string())
        .or_else(|| inspector.sheet_names().first().cloned())
        .unwrap_or_default();

    let present = match kind {
        VisualKind::Chart => chart_presence(inspector, &sheet),
        VisualKind::Format => match Span::parse(&checkpoint.cell) {
            Ok(span) => format_presence(inspector, &sheet, &span),
            Err(_) => false,
        },
        VisualKind::Pivot => pivot_presence(inspector),
    };

    if presence_only {
        if present {
            CheckpointResult::passed(
                &checkpoint.id,
                format!("L'élément attendu est présent ({}).", checkpoint.cell),
            )
        } else {
            CheckpointResult::failed(
                &checkpoint.id,
                format!("L'élément attendu en {} est introuvable.", checkpoint.cell),
            )
            .with_hint(select_hint(&checkpoint.hints, FailureCategory::NothingSubmitted))
        }
    } else {
        // The heuristic confirms presence, never content
        CheckpointResult::manual_review(
            &checkpoint.id,
            format!(
                "Un élément est {} en {} ; son contenu doit être vérifié visuellement.",
                if present { "présent" } else { "introuvable" },
                checkpoint.cell
            ),
        )
        .with_detail("structural_presence", present.to_string())
    }
}

// === report text ===

fn render_summary(exercise: &Exercise, results: &[CheckpointResult], score: f64) -> String {
    let mut lines = Vec::new();
    let tone = if score >= 8.0 {
        "Excellent travail !"
    } else if score >= 6.0 {
        "Bon travail, vous y êtes presque."
    } else if score >= 4.0 {
        "Continuez vos efforts, plusieurs points sont acquis."
    } else {
        "Ne vous découragez pas, reprenons point par point."
    };
    lines.push(tone.to_string());

    let passed: Vec<&str> = exercise
        .checkpoints
        .iter()
        .zip(results)
        .filter(|(_, r)| r.status.is_passed())
        .map(|(c, _)| {
            if c.description.is_empty() {
                c.cell.as_str()
            } else {
                c.description.as_str()
            }
        })
        .take(3)
        .collect();
    if !passed.is_empty() {
        lines.push(format!("Points réussis : {}.", passed.join(" ; ")));
    }

    for result in results {
        if result.status == ValidationStatus::Failed {
            match &result.hint {
                Some(hint) => lines.push(format!("{} Indice : {}", result.feedback, hint)),
                None => lines.push(result.feedback.clone()),
            }
        }
    }

    if score < ADVICE_SCORE_THRESHOLD {
        if let Some(advice) = &exercise.pedagogical_advice {
            lines.push(advice.clone());
        }
    }

    lines.join("\n")
}
