//! Detection of frequent beginner mistakes in raw formulas
//!
//! These checks run on every formula checkpoint. A critical finding fails
//! the checkpoint even when the function/pattern checks passed: a formula
//! showing `#REF!` or with broken parentheses is wrong no matter how its
//! text looks. Criticality here is the detector's own notion, separate from
//! the diagnosis severity table, which grades pedagogical weight rather
//! than whether grading can proceed.

use lazy_regex::regex;
use sheet_mentor_core::{ErrorKind, Severity};
use sheet_mentor_lang::extract_function_names;

/// One frequent-mistake finding
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentError {
    /// The diagnosis this finding maps to
    pub kind: ErrorKind,
    /// Fixed severity of the kind
    pub severity: Severity,
    /// Learner-facing message (French)
    pub message: String,
}

impl FrequentError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
        }
    }

    /// Whether this finding alone fails the checkpoint
    ///
    /// Native error tokens and unbalanced parentheses mean the formula is
    /// broken regardless of its shape; quoting mistakes and a missing `=`
    /// are reported but leave the verdict to the other checks.
    pub fn is_critical(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NaError
                | ErrorKind::RefError
                | ErrorKind::ValueError
                | ErrorKind::UnbalancedParens
        )
    }
}

/// Functions whose second argument is a criterion
const CRITERIA_FUNCTIONS: &[&str] = &[
    "SUMIF", "SOMME.SI", "COUNTIF", "NB.SI", "AVERAGEIF", "MOYENNE.SI",
];

/// Scan a raw formula for frequent mistakes
pub fn detect_frequent_errors(formula: &str) -> Vec<FrequentError> {
    let trimmed = formula.trim();
    let mut findings = Vec::new();

    if trimmed.is_empty() {
        return findings;
    }

    if !trimmed.starts_with('=') {
        findings.push(FrequentError::new(
            ErrorKind::MissingEquals,
            "Une formule doit commencer par le signe =.",
        ));
    }

    for (token, kind) in [
        ("#N/A", ErrorKind::NaError),
        ("#REF!", ErrorKind::RefError),
        ("#VALUE!", ErrorKind::ValueError),
        ("#VALEUR!", ErrorKind::ValueError),
    ] {
        if trimmed.to_ascii_uppercase().contains(token) {
            findings.push(FrequentError::new(
                kind,
                format!("La formule produit l'erreur {}.", token),
            ));
        }
    }

    if paren_balance(trimmed) != 0 {
        findings.push(FrequentError::new(
            ErrorKind::UnbalancedParens,
            "Les parenthèses ouvrantes et fermantes ne correspondent pas.",
        ));
    }

    findings.extend(check_criteria_quoting(trimmed));

    findings
}

/// Parenthesis balance, ignoring parens inside quoted strings
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

/// Quoting checks on the criterion argument of the conditional family
fn check_criteria_quoting(formula: &str) -> Vec<FrequentError> {
    let mut findings = Vec::new();
    let used = extract_function_names(formula);
    let uses_criteria_fn = used
        .iter()
        .any(|f| CRITERIA_FUNCTIONS.contains(&f.as_str()));
    if !uses_criteria_fn {
        return findings;
    }

    for criterion in criterion_arguments(formula) {
        let c = criterion.trim();
        if c.is_empty() {
            continue;
        }
        // Operator left outside the quoted criterion: `>"10"` instead of ">10"
        if regex!(r#"^(>=|<=|<>|>|<|=)\s*""#).is_match(c) {
            findings.push(FrequentError::new(
                ErrorKind::OperatorOutsideQuotes,
                format!(
                    "L'opérateur de comparaison doit être à l'intérieur des guillemets : {}",
                    c
                ),
            ));
            continue;
        }
        if c.starts_with('"') {
            continue;
        }
        // A bare word that is neither a reference, a number nor a nested
        // call is a text criterion missing its quotes
        let is_ref = regex!(r"^\$?[A-Za-z]{1,3}\$?\d+(:\$?[A-Za-z]{1,3}\$?\d+)?$").is_match(c);
        let is_number = c.replace(',', ".").parse::<f64>().is_ok();
        let is_call = c.contains('(');
        let bare = c.trim_start_matches(['>', '<', '=']);
        let has_text = bare.chars().any(|ch| ch.is_alphabetic());
        if !is_ref && !is_number && !is_call && has_text {
            findings.push(FrequentError::new(
                ErrorKind::MissingCriteriaQuotes,
                format!("Le critère texte doit être entre guillemets : {}", c),
            ));
        }
    }
    findings
}

/// Extract the second (criterion) argument of each conditional-family call
fn criterion_arguments(formula: &str) -> Vec<String> {
    let mut out = Vec::new();
    let upper = formula.to_ascii_uppercase();
    for name in CRITERIA_FUNCTIONS {
        let mut search = 0;
        while let Some(found) = upper[search..].find(&format!("{}(", name)) {
            let open = search + found + name.len();
            // Reject matches inside a longer name (SOMME.SI inside SOMME.SI.ENS
            // cannot happen here because the paren must follow immediately)
            let at_boundary = {
                let i = search + found;
                i == 0 || {
                    let prev = upper.as_bytes()[i - 1];
                    !(prev.is_ascii_alphanumeric() || prev == b'.' || prev == b'_')
                }
            };
            if at_boundary {
                if let Some(args) = top_level_arguments(&formula[open..]) {
                    if let Some(criterion) = args.get(1) {
                        out.push(criterion.clone());
                    }
                }
            }
            search = open;
        }
    }
    out
}

/// Split the argument list starting at `(` into top-level arguments
///
/// Tracks nesting depth and quoted strings; accepts both `,` and `;` as the
/// separator. Returns None when the list never closes.
fn top_level_arguments(from_paren: &str) -> Option<Vec<String>> {
    let mut chars = from_paren.chars();
    if chars.next() != Some('(') {
        return None;
    }
    let mut args = Vec::new();
    let mut current = String::new();
    let mut depth = 0u32;
    let mut in_quotes = false;
    for c in chars {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ')' if !in_quotes => {
                if depth == 0 {
                    args.push(current);
                    return Some(args);
                }
                depth -= 1;
                current.push(c);
            }
            ',' | ';' if !in_quotes && depth == 0 => {
                args.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_formula_has_no_findings() {
        assert!(detect_frequent_errors("=SOMME.SI(A1:A10;\">100\")").is_empty());
        assert!(detect_frequent_errors("=SUM(A1:A10)").is_empty());
    }

    #[test]
    fn test_missing_equals() {
        let findings = detect_frequent_errors("SOMME(A1:A10)");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, ErrorKind::MissingEquals);
        assert!(!findings[0].is_critical());
    }

    #[test]
    fn test_native_error_tokens_are_critical() {
        let findings = detect_frequent_errors("=#REF!+1");
        assert_eq!(findings[0].kind, ErrorKind::RefError);
        assert!(findings[0].is_critical());
    }

    #[test]
    fn test_unbalanced_parens() {
        let findings = detect_frequent_errors("=SOMME(A1:A10");
        let finding = findings
            .iter()
            .find(|f| f.kind == ErrorKind::UnbalancedParens)
            .unwrap();
        assert!(finding.is_critical());
        // A paren inside a text literal does not count
        assert!(detect_frequent_errors("=NB.SI(A1:A10;\"(x\")").is_empty());
    }

    #[test]
    fn test_unquoted_text_criterion() {
        let findings = detect_frequent_errors("=NB.SI(B2:B20;oui)");
        let finding = findings
            .iter()
            .find(|f| f.kind == ErrorKind::MissingCriteriaQuotes)
            .unwrap();
        // A quoting mistake warns without failing the checkpoint by itself
        assert!(!finding.is_critical());
        // Quoted criterion is fine
        assert!(detect_frequent_errors("=NB.SI(B2:B20;\"oui\")").is_empty());
        // A cell reference as criterion is fine
        assert!(detect_frequent_errors("=NB.SI(B2:B20;D1)").is_empty());
    }

    #[test]
    fn test_operator_outside_quotes() {
        let findings = detect_frequent_errors("=SOMME.SI(A1:A10;>\"100\")");
        assert!(findings.iter().any(|f| f.kind == ErrorKind::OperatorOutsideQuotes));
    }

    #[test]
    fn test_top_level_argument_split() {
        let args = top_level_arguments("(A1:A10;\">0\";B1:B10)").unwrap();
        assert_eq!(args, vec!["A1:A10", "\">0\"", "B1:B10"]);
        let args = top_level_arguments("(SI(A1>0;1;2),B2)").unwrap();
        assert_eq!(args, vec!["SI(A1>0;1;2)", "B2"]);
    }
}
