//! Progressive disclosure across repeated attempts

use pretty_assertions::assert_eq;
use sheet_mentor::prelude::*;

fn exercise_with_persona(persona_json: &str) -> Exercise {
    serde_json::from_str(&format!(
        r#"{{
            "checkpoints": [
                {{
                    "id": "conditional",
                    "cell": "C2",
                    "points": 10,
                    "type": "formula",
                    "expectedFunction": "SOMME.SI",
                    "hints": [
                        "Relisez la consigne.",
                        "Une fonction somme sous condition.",
                        "=SOMME.SI(plage;critère)"
                    ]
                }}
            ]{}
        }}"#,
        persona_json
    ))
    .unwrap()
}

fn graded(exercise: &Exercise, formula: &str, attempt: u32) -> SubmissionReport {
    let mut submission = Submission::new();
    submission.set_formula("C2", formula);
    let report = validate(exercise, &submission, None);
    analyze_submission(exercise, &submission, report, attempt)
}

#[test]
fn detail_climbs_with_each_attempt() {
    let exercise = exercise_with_persona("");
    let first = graded(&exercise, "=MOYENNE(A2:A10)", 1);
    let second = graded(&exercise, "=MOYENNE(A2:A10)", 2);
    let third = graded(&exercise, "=MOYENNE(A2:A10)", 3);

    let texts: Vec<&str> = [&first, &second, &third]
        .iter()
        .map(|r| r.feedback_entries[0].text.as_str())
        .collect();
    assert_ne!(texts[0], texts[1]);
    assert_ne!(texts[1], texts[2]);

    assert_eq!(first.feedback_entries[0].detail_level, DetailLevel::Vague);
    assert_eq!(second.feedback_entries[0].detail_level, DetailLevel::Precise);
    assert_eq!(third.feedback_entries[0].detail_level, DetailLevel::Solution);

    // The vague message never names the expected function
    assert!(!texts[0].contains("SOMME.SI"));
    // The solution does
    assert!(texts[2].contains("SOMME.SI"));
}

#[test]
fn hint_ladder_advances_and_clamps() {
    let exercise = exercise_with_persona("");
    let first = graded(&exercise, "=MOYENNE(A2:A10)", 1);
    let second = graded(&exercise, "=MOYENNE(A2:A10)", 2);
    let fifth = graded(&exercise, "=MOYENNE(A2:A10)", 5);

    assert_eq!(
        first.feedback_entries[0].hint.as_deref(),
        Some("Relisez la consigne.")
    );
    assert_eq!(
        second.feedback_entries[0].hint.as_deref(),
        Some("Une fonction somme sous condition.")
    );
    assert_eq!(
        fifth.feedback_entries[0].hint.as_deref(),
        Some("=SOMME.SI(plage;critère)")
    );
}

#[test]
fn typo_is_diagnosed_with_a_suggestion() {
    let exercise = exercise_with_persona("");
    let report = graded(&exercise, "=SOME.SI(A2:A10;\">0\")", 3);

    let entry = &report.feedback_entries[0];
    assert!(entry.text.contains("SOME.SI"));
    assert!(entry.text.contains("SOMME.SI"));
}

#[test]
fn persona_tone_wraps_the_message() {
    let neutral = exercise_with_persona("");
    let encouraging =
        exercise_with_persona(r#", "persona": {"tone": "encouraging", "messages": {}}"#);
    let demanding =
        exercise_with_persona(r#", "persona": {"tone": "demanding", "messages": {}}"#);

    let base = graded(&neutral, "=MOYENNE(A2:A10)", 2);
    let cheered = graded(&encouraging, "=MOYENNE(A2:A10)", 2);
    let stern = graded(&demanding, "=MOYENNE(A2:A10)", 2);

    let base_text = &base.feedback_entries[0].text;
    assert!(cheered.feedback_entries[0].text.contains(base_text.as_str()));
    assert_ne!(&cheered.feedback_entries[0].text, base_text);
    assert_ne!(cheered.feedback_entries[0].text, stern.feedback_entries[0].text);
}

#[test]
fn persona_failure_message_overrides_global() {
    let exercise = exercise_with_persona(
        r#", "persona": {"tone": "patient", "messages": {"failure": "On reprend ensemble, pas à pas."}}"#,
    );
    let report = graded(&exercise, "=MOYENNE(A2:A10)", 1);
    assert_eq!(report.score_out_of_hundred, 0.0);
    assert_eq!(report.global_message, "On reprend ensemble, pas à pas.");
}
