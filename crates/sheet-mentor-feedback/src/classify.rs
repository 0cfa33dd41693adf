//! Error classification for failed formula checkpoints
//!
//! A first-match-wins cascade: the earliest matching rule names the error.
//! The order encodes pedagogy — structural problems (nothing submitted, no
//! `=`, native error values) are diagnosed before technique problems, which
//! come before value problems.

use ahash::AHashMap;
use lazy_regex::regex;
use sheet_mentor_core::{
    CellValue, Checkpoint, CheckpointKind, Diagnosis, ErrorKind, Expected, RefShape,
};
use sheet_mentor_lang::{closest_match, extract_function_names, other_language_variant};
use sheet_mentor_validate::{detect_frequent_errors, reference_shape};

/// Relative difference under which a wrong value is called "close"
///
/// Deliberately looser than the validator's adaptive pass/fail tolerance:
/// this threshold only decides how the near-miss is *phrased*.
pub const CLOSE_VALUE_REL_THRESHOLD: f64 = 0.05;

/// Maximum edit distance for a misspelling to count as a typo
pub const TYPO_MAX_DISTANCE: usize = 2;

/// Diagnose why a formula checkpoint failed
pub fn classify(
    formula: Option<&str>,
    expected_function: Option<&str>,
    expected_value: Option<&Expected>,
    actual_value: Option<&CellValue>,
    checkpoint: &Checkpoint,
) -> Diagnosis {
    let mut details = AHashMap::new();
    details.insert("cell".to_string(), checkpoint.cell.clone());

    // 1. Nothing submitted
    let formula = match formula {
        Some(f) if !f.trim().is_empty() => f.trim(),
        _ => return Diagnosis::new(ErrorKind::MissingFormula, details),
    };
    details.insert("formula".to_string(), formula.to_string());

    // 2. No leading =
    if !formula.starts_with('=') {
        return Diagnosis::new(ErrorKind::MissingEquals, details);
    }

    // 3. Native error tokens, mapped one to one
    let upper = formula.to_ascii_uppercase();
    if upper.contains("#N/A") {
        return Diagnosis::new(ErrorKind::NaError, details);
    }
    if upper.contains("#REF!") {
        return Diagnosis::new(ErrorKind::RefError, details);
    }
    if upper.contains("#VALUE!") || upper.contains("#VALEUR!") {
        return Diagnosis::new(ErrorKind::ValueError, details);
    }

    // 4. Unbalanced parentheses
    if paren_balance(formula) != 0 {
        return Diagnosis::new(ErrorKind::UnbalancedParens, details);
    }

    // 5. Self-reference
    let own_cell = checkpoint.cell.rsplit('!').next().unwrap_or(&checkpoint.cell);
    if references_cell(formula, own_cell) {
        return Diagnosis::new(ErrorKind::CircularReference, details);
    }

    let used = extract_function_names(formula);

    // 6. Expected function absent: typo, wrong function, or nothing at all
    if let Some(expected) = expected_function {
        let expected_upper = expected.trim().to_ascii_uppercase();
        let variant = other_language_variant(&expected_upper);
        let present = used.iter().any(|f| {
            f == &expected_upper || variant.map_or(false, |v| f == v)
        });
        if !present {
            details.insert("function".to_string(), expected_upper.clone());
            if let Some((typo, _)) = closest_match(
                &expected_upper,
                used.iter().map(String::as_str),
                TYPO_MAX_DISTANCE,
            ) {
                details.insert("typo".to_string(), typo.to_string());
                details.insert("suggestion".to_string(), expected_upper);
                return Diagnosis::new(ErrorKind::FunctionTypo, details);
            }
            if let Some(variant) = variant {
                if let Some((typo, _)) = closest_match(
                    variant,
                    used.iter().map(String::as_str),
                    TYPO_MAX_DISTANCE,
                ) {
                    details.insert("typo".to_string(), typo.to_string());
                    details.insert("suggestion".to_string(), variant.to_string());
                    return Diagnosis::new(ErrorKind::FunctionTypo, details);
                }
            }
            return if used.is_empty() {
                Diagnosis::new(ErrorKind::MissingFunction, details)
            } else {
                details.insert("used".to_string(), used.join(", "));
                Diagnosis::new(ErrorKind::WrongFunction, details)
            };
        }
    }

    // 7. Criterion quoting mistakes in the conditional family
    for finding in detect_frequent_errors(formula) {
        if matches!(
            finding.kind,
            ErrorKind::MissingCriteriaQuotes | ErrorKind::OperatorOutsideQuotes
        ) {
            details.insert("finding".to_string(), finding.message.clone());
            return Diagnosis::new(finding.kind, details);
        }
    }

    // 8. Reference-shape expectations
    if let CheckpointKind::Formula {
        reference_constraints,
        patterns,
        ..
    } = &checkpoint.kind
    {
        for constraint in reference_constraints {
            if constraint.shape != RefShape::Absolute {
                continue;
            }
            // Only the constrained reference's own shape matters; markers
            // elsewhere in the formula prove nothing
            if let Some(shape) = reference_shape(formula, &constraint.reference) {
                if shape != RefShape::Absolute {
                    details.insert("reference".to_string(), constraint.reference.clone());
                    return Diagnosis::new(ErrorKind::MissingAbsoluteReference, details);
                }
            }
        }

        // 9. A range was expected but the formula has none
        let wants_range = patterns.iter().any(|p| is_range_pattern(p));
        let has_range = regex!(r"[A-Za-z]{1,3}\d+\s*:\s*[A-Za-z]{1,3}\d+")
            .is_match(&formula.replace('$', ""));
        if wants_range && !has_range {
            return Diagnosis::new(ErrorKind::WrongColumn, details);
        }
    }

    // 10. Value comparison: close miss or plain wrong
    if let (Some(expected), Some(actual)) = (
        expected_value.and_then(Expected::as_number),
        actual_value.and_then(CellValue::as_number),
    ) {
        if expected != actual {
            details.insert("expected".to_string(), expected.to_string());
            details.insert("actual".to_string(), actual.to_string());
            let rel = if expected != 0.0 {
                ((expected - actual) / expected).abs()
            } else {
                f64::INFINITY
            };
            return if rel <= CLOSE_VALUE_REL_THRESHOLD {
                Diagnosis::new(ErrorKind::CloseValue, details)
            } else {
                Diagnosis::new(ErrorKind::WrongValue, details)
            };
        }
    }

    Diagnosis::new(ErrorKind::Unknown, details)
}

fn paren_balance(formula: &str) -> i32 {
    let mut balance = 0;
    let mut in_quotes = false;
    for c in formula.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => balance += 1,
            ')' if !in_quotes => balance -= 1,
            _ => {}
        }
    }
    balance
}

/// Whether the formula references `cell` as a whole token
fn references_cell(formula: &str, cell: &str) -> bool {
    let bare = cell.replace('$', "").to_ascii_uppercase();
    let stripped = formula.replace('$', "").to_ascii_uppercase();
    let bytes = stripped.as_bytes();
    let cb = bare.as_bytes();
    let mut i = 0;
    while i + cb.len() <= bytes.len() {
        let end = i + cb.len();
        let before_ok = i == 0 || !bytes[i - 1].is_ascii_alphanumeric();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok && &bytes[i..end] == cb {
            return true;
        }
        i += 1;
    }
    false
}

fn is_range_pattern(pattern: &str) -> bool {
    regex!(r"^\$?[A-Za-z]{1,3}\$?\d+:\$?[A-Za-z]{1,3}\$?\d+$").is_match(pattern.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checkpoint(expected_function: Option<&str>) -> Checkpoint {
        Checkpoint {
            id: "cp1".into(),
            cell: "C2".into(),
            description: String::new(),
            points: 10.0,
            hints: vec![],
            kind: CheckpointKind::Formula {
                expected_function: expected_function.map(String::from),
                patterns: vec![],
                pattern_alternatives: vec![],
                reference_constraints: vec![],
            },
        }
    }

    #[test]
    fn test_missing_formula() {
        let d = classify(None, Some("SOMME"), None, None, &checkpoint(Some("SOMME")));
        assert_eq!(d.kind, ErrorKind::MissingFormula);
        assert_eq!(d.details.get("cell").map(String::as_str), Some("C2"));

        let d = classify(Some("   "), None, None, None, &checkpoint(None));
        assert_eq!(d.kind, ErrorKind::MissingFormula);
    }

    #[test]
    fn test_missing_equals() {
        let d = classify(Some("SOMME(A1:A10)"), None, None, None, &checkpoint(None));
        assert_eq!(d.kind, ErrorKind::MissingEquals);
    }

    #[test]
    fn test_native_error_tokens() {
        let cp = checkpoint(None);
        assert_eq!(classify(Some("=#N/A"), None, None, None, &cp).kind, ErrorKind::NaError);
        assert_eq!(classify(Some("=#REF!+1"), None, None, None, &cp).kind, ErrorKind::RefError);
        assert_eq!(
            classify(Some("=#VALUE!"), None, None, None, &cp).kind,
            ErrorKind::ValueError
        );
    }

    #[test]
    fn test_unbalanced_parens() {
        let d = classify(Some("=SOMME(A1:A10"), None, None, None, &checkpoint(None));
        assert_eq!(d.kind, ErrorKind::UnbalancedParens);
    }

    #[test]
    fn test_circular_reference() {
        let d = classify(Some("=C2+1"), None, None, None, &checkpoint(None));
        assert_eq!(d.kind, ErrorKind::CircularReference);
    }

    #[test]
    fn test_function_typo_suggests_expected_name() {
        let cp = checkpoint(Some("SOMME"));
        let d = classify(Some("=SOME(A1:A10)"), Some("SOMME"), None, None, &cp);
        assert_eq!(d.kind, ErrorKind::FunctionTypo);
        assert_eq!(d.details.get("suggestion").map(String::as_str), Some("SOMME"));
        assert_eq!(d.details.get("typo").map(String::as_str), Some("SOME"));
    }

    #[test]
    fn test_wrong_vs_missing_function() {
        let cp = checkpoint(Some("SOMME.SI"));
        let d = classify(Some("=MOYENNE(A1:A10)"), Some("SOMME.SI"), None, None, &cp);
        assert_eq!(d.kind, ErrorKind::WrongFunction);
        assert_eq!(d.details.get("used").map(String::as_str), Some("MOYENNE"));

        let d = classify(Some("=A1+A2"), Some("SOMME.SI"), None, None, &cp);
        assert_eq!(d.kind, ErrorKind::MissingFunction);
    }

    #[test]
    fn test_other_language_function_not_flagged() {
        let cp = checkpoint(Some("SOMME.SI"));
        let d = classify(
            Some("=SUMIF(A1:A10,\">0\")"),
            Some("SOMME.SI"),
            None,
            None,
            &cp,
        );
        assert_ne!(d.kind, ErrorKind::WrongFunction);
        assert_ne!(d.kind, ErrorKind::MissingFunction);
    }

    #[test]
    fn test_missing_criteria_quotes() {
        let cp = checkpoint(Some("NB.SI"));
        let d = classify(Some("=NB.SI(B2:B20;oui)"), Some("NB.SI"), None, None, &cp);
        assert_eq!(d.kind, ErrorKind::MissingCriteriaQuotes);
    }

    #[test]
    fn test_relative_constrained_reference_diagnosed() {
        let mut cp = checkpoint(None);
        if let CheckpointKind::Formula {
            reference_constraints,
            ..
        } = &mut cp.kind
        {
            reference_constraints.push(sheet_mentor_core::ReferenceConstraint {
                reference: "B1".into(),
                shape: RefShape::Absolute,
            });
        }
        // Markers elsewhere must not mask the relative B1
        let d = classify(Some("=SOMME($A$1:$A$10)*B1"), None, None, None, &cp);
        assert_eq!(d.kind, ErrorKind::MissingAbsoluteReference);
        assert_eq!(d.details.get("reference").map(String::as_str), Some("B1"));

        // Properly anchored reference is not diagnosed
        let d = classify(Some("=SOMME($A$1:$A$10)*$B$1"), None, None, None, &cp);
        assert_ne!(d.kind, ErrorKind::MissingAbsoluteReference);
    }

    #[test]
    fn test_close_vs_wrong_value() {
        let cp = checkpoint(None);
        let expected = Expected::Number(100.0);
        let d = classify(
            Some("=SOMME(A1:A9)"),
            None,
            Some(&expected),
            Some(&CellValue::Number(97.0)),
            &cp,
        );
        assert_eq!(d.kind, ErrorKind::CloseValue);

        let d = classify(
            Some("=SOMME(A1:A9)"),
            None,
            Some(&expected),
            Some(&CellValue::Number(50.0)),
            &cp,
        );
        assert_eq!(d.kind, ErrorKind::WrongValue);
    }

    #[test]
    fn test_unknown_fallback() {
        let d = classify(Some("=SOMME(A1:A10)"), None, None, None, &checkpoint(None));
        assert_eq!(d.kind, ErrorKind::Unknown);
    }
}
