//! End-to-end grading: JSON exercise in, analyzed report out

use pretty_assertions::assert_eq;
use sheet_mentor::prelude::*;

fn conditional_sum_exercise() -> Exercise {
    serde_json::from_str(
        r#"{
            "checkpoints": [
                {
                    "id": "total",
                    "cellule": "B2",
                    "description": "Total des ventes",
                    "points": 10,
                    "type": "value",
                    "expectedValue": 100
                },
                {
                    "id": "conditional",
                    "cellule": "C2",
                    "description": "Somme conditionnelle",
                    "points": 10,
                    "type": "formula",
                    "expectedFunction": "SOMME.SI",
                    "patterns": ["A2:A10"],
                    "hints": [
                        "Relisez la partie du cours sur les sommes.",
                        "Il existe une fonction qui somme sous condition.",
                        "Utilisez =SOMME.SI(A2:A10;critère)."
                    ]
                }
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn french_submission_scores_full_marks() {
    let exercise = conditional_sum_exercise();
    let mut submission = Submission::new();
    submission.set_value("B2", 100.0);
    submission.set_formula("C2", "=SOMME.SI(A2:A10;\">50\")");

    let report = validate(&exercise, &submission, None);
    let report = analyze_submission(&exercise, &submission, report, 1);

    assert_eq!(report.score_out_of_ten, 10.0);
    assert_eq!(report.score_out_of_hundred, 100.0);
    assert_eq!(report.checkpoints_passed, 2);
    assert!(report.feedback_entries.is_empty());
    assert_eq!(report.total_errors, 0);
}

#[test]
fn english_submission_scores_identically() {
    let exercise = conditional_sum_exercise();
    let mut submission = Submission::new();
    submission.set_value("B2", 100.0);
    // Same technique: English name, comma separators, absolute markers
    submission.set_formula("C2", "=SUMIF($A$2:$A$10,\">50\")");

    let report = validate(&exercise, &submission, None);
    let report = analyze_submission(&exercise, &submission, report, 1);

    assert_eq!(report.score_out_of_ten, 10.0);
    assert_eq!(report.checkpoints_passed, 2);
}

#[test]
fn failed_checkpoint_produces_diagnosed_feedback() {
    let exercise = conditional_sum_exercise();
    let mut submission = Submission::new();
    submission.set_value("B2", 100.0);
    submission.set_formula("C2", "=MOYENNE(A2:A10)");

    let report = validate(&exercise, &submission, None);
    let report = analyze_submission(&exercise, &submission, report, 1);

    assert_eq!(report.score_out_of_ten, 5.0);
    assert_eq!(report.results[1].status, ValidationStatus::Failed);
    assert_eq!(report.feedback_entries.len(), 1);
    assert_eq!(report.feedback_entries[0].checkpoint_id, "conditional");
    assert_eq!(report.total_errors, 1);
}

#[test]
fn visual_checkpoint_without_inspector_goes_to_manual_review() {
    let exercise: Exercise = serde_json::from_str(
        r#"{
            "checkpoints": [
                {"id": "chart", "cell": "Feuil1!E1", "points": 5,
                 "type": "visualChart"}
            ]
        }"#,
    )
    .unwrap();

    let submission = Submission::new();
    let report = validate(&exercise, &submission, None);
    let report = analyze_submission(&exercise, &submission, report, 1);

    let result = &report.results[0];
    assert_eq!(result.status, ValidationStatus::RequiresManualReview);
    assert!(result.needs_visual_check);
    // Not a pass, not a failure
    assert_eq!(report.checkpoints_passed, 0);
    assert_eq!(report.total_errors, 0);
}

#[test]
fn report_serializes_to_json() {
    let exercise = conditional_sum_exercise();
    let mut submission = Submission::new();
    submission.set_value("B2", 100.0);

    let report = validate(&exercise, &submission, None);
    let report = analyze_submission(&exercise, &submission, report, 2);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["scoreOutOfTen"], 5.0);
    assert_eq!(json["checkpointsTotal"], 2);
    assert!(json["feedbackEntries"].as_array().unwrap().len() == 1);
}
