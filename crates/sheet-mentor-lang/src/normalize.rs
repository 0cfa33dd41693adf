//! Formula normalization and language-agnostic comparison
//!
//! Normalization reduces a raw formula string to a canonical form so that
//! `=somme.si($A$1:$A$10; ">0")` and `=SUMIF(A1:A10,">0")` grade as the same
//! answer. Nothing here parses formulas into an AST; everything is string
//! rewriting with token-boundary checks.

use crate::tables::{
    other_language_variant, Lang, BOOLEAN_PAIRS, EN_TO_FR_ORDERED, FR_TO_EN_ORDERED,
};
use lazy_regex::regex;

/// Options for [`normalize`]
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Strip `$` absolute-reference markers
    pub strip_absolute: bool,
    /// Uppercase the whole formula
    pub upper_case: bool,
    /// Collapse whitespace around operators, parentheses and separators
    pub collapse_spaces: bool,
    /// Rewrite function names and boolean literals into this language
    pub target_language: Option<Lang>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strip_absolute: true,
            upper_case: true,
            collapse_spaces: true,
            target_language: None,
        }
    }
}

impl NormalizeOptions {
    /// The canonical form used for equivalence: everything on, English names
    pub fn canonical() -> Self {
        Self {
            target_language: Some(Lang::En),
            ..Self::default()
        }
    }
}

/// Options for [`matches_all_patterns`]
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Ignore `$` markers when matching
    pub ignore_absolute: bool,
    /// Accept a pattern written in either language
    pub ignore_language: bool,
    /// Match case-insensitively
    pub ignore_case: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            ignore_absolute: true,
            ignore_language: true,
            ignore_case: true,
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'_'
}

/// Replace `from` with `to` wherever it appears as a function-call token:
/// preceded by a non-identifier byte and immediately followed by `(`.
fn replace_function_token(input: &str, from: &str, to: &str) -> String {
    let bytes = input.as_bytes();
    let fb = from.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        let at_boundary = i == 0 || !is_ident_byte(bytes[i - 1]);
        if at_boundary
            && i + fb.len() < bytes.len()
            && bytes[i..i + fb.len()].eq_ignore_ascii_case(fb)
            && bytes[i + fb.len()] == b'('
        {
            out.push_str(to);
            i += fb.len();
        } else {
            // Copy one full character, not one byte
            let ch = input[i..].chars().next().unwrap();
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Replace `from` with `to` as a whole word (boolean literals)
fn replace_word_token(input: &str, from: &str, to: &str) -> String {
    let bytes = input.as_bytes();
    let fb = from.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        let at_boundary = i == 0 || !is_ident_byte(bytes[i - 1]);
        let end = i + fb.len();
        if at_boundary
            && end <= bytes.len()
            && bytes[i..end].eq_ignore_ascii_case(fb)
            && (end == bytes.len() || !is_ident_byte(bytes[end]))
        {
            out.push_str(to);
            i = end;
        } else {
            let ch = input[i..].chars().next().unwrap();
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Uppercase everything outside `"`-quoted string literals
///
/// Criteria like `"oui"` keep their case: grading compares literals strictly
/// and the learner's text is not ours to rewrite.
fn upper_outside_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_quotes = false;
    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            _ if in_quotes => out.push(c),
            _ => out.extend(c.to_uppercase()),
        }
    }
    out
}

const TIGHT_CHARS: &[char] = &[
    '(', ')', '+', '-', '*', '/', '^', '&', '=', '<', '>', ';', ',', ':', '%',
];

fn collapse_whitespace(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            // Drop the run entirely next to an operator/paren/separator,
            // or at either end of the string
            let prev_tight = out.chars().last().map_or(true, |c| TIGHT_CHARS.contains(&c));
            let next_tight = chars.get(j).map_or(true, |c| TIGHT_CHARS.contains(c));
            if !prev_tight && !next_tight {
                out.push(' ');
            }
            i = j;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Rewrite function names and boolean literals into the target language
fn rewrite_language(formula: &str, target: Lang) -> String {
    let pairs: &[(&str, &str)] = match target {
        Lang::En => FR_TO_EN_ORDERED.as_slice(),
        Lang::Fr => EN_TO_FR_ORDERED.as_slice(),
    };
    // Longest source name first, so a short name never rewrites inside the
    // tail of a longer one (NB must not shadow NB.SI.ENS)
    let mut out = formula.to_string();
    for &(from, to) in pairs {
        out = replace_function_token(&out, from, to);
    }
    for &(fr, en) in BOOLEAN_PAIRS {
        let (from, to) = match target {
            Lang::En => (fr, en),
            Lang::Fr => (en, fr),
        };
        out = replace_word_token(&out, from, to);
    }
    out
}

/// Normalize a formula string according to `opts`
///
/// Idempotent: normalizing an already-normalized formula is a no-op.
///
/// # Example
/// ```
/// use sheet_mentor_lang::{normalize, NormalizeOptions};
///
/// let canon = normalize("= somme.si( $A$1:$A$10 ; \">0\" )", &NormalizeOptions::canonical());
/// assert_eq!(canon, "=SUMIF(A1:A10;\">0\")");
/// ```
pub fn normalize(formula: &str, opts: &NormalizeOptions) -> String {
    let mut out = formula.trim().to_string();
    if opts.strip_absolute {
        out.retain(|c| c != '$');
    }
    if opts.upper_case {
        out = upper_outside_quotes(&out);
    }
    if opts.collapse_spaces {
        out = collapse_whitespace(&out);
    }
    if let Some(target) = opts.target_language {
        out = rewrite_language(&out, target);
    }
    out
}

/// Rewrite `;` argument separators to `,`, skipping quoted string literals
///
/// A small scanner tracks whether the current position is inside a `"`-quoted
/// literal so a separator inside a text criterion (`";"`) is never touched.
pub fn unify_separators(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut in_quotes = false;
    for c in formula.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            ';' if !in_quotes => out.push(','),
            _ => out.push(c),
        }
    }
    out
}

/// Whether two formulas are the same answer, independent of language,
/// reference markers, spacing and argument-separator convention
pub fn are_equivalent(f1: &str, f2: &str) -> bool {
    let opts = NormalizeOptions::canonical();
    let a = unify_separators(&normalize(f1, &opts));
    let b = unify_separators(&normalize(f2, &opts));
    a == b
}

fn is_function_name_shaped(pattern: &str) -> bool {
    regex!(r"^[A-Za-z][A-Za-z0-9_.]*$").is_match(pattern.trim())
}

fn is_range_shaped(pattern: &str) -> bool {
    regex!(r"^\[?\$?[A-Za-z]{1,3}\$?\d+(:\$?[A-Za-z]{1,3}\$?\d+)?\]?$").is_match(pattern.trim())
}

/// Check every required pattern against the formula; returns the unmatched
/// patterns (empty means the formula satisfies all of them)
pub fn matches_all_patterns(formula: &str, patterns: &[String], opts: &MatchOptions) -> Vec<String> {
    let base = NormalizeOptions {
        strip_absolute: opts.ignore_absolute,
        upper_case: opts.ignore_case,
        collapse_spaces: true,
        target_language: None,
    };
    let f_plain = normalize(formula, &base);
    let (f_en, f_fr) = if opts.ignore_language {
        let en = NormalizeOptions { target_language: Some(Lang::En), ..base };
        let fr = NormalizeOptions { target_language: Some(Lang::Fr), ..base };
        (normalize(formula, &en), normalize(formula, &fr))
    } else {
        (f_plain.clone(), f_plain.clone())
    };

    let mut unmatched = Vec::new();
    for pattern in patterns {
        let p_plain = normalize(pattern, &base);
        let mut matched = f_plain.contains(&p_plain);
        if !matched && opts.ignore_language {
            // A bare function name never gets rewritten by the token
            // substitution (no trailing paren), so match it as a call
            if is_function_name_shaped(pattern) {
                matched = contains_function(formula, pattern.trim());
            } else {
                let en = NormalizeOptions { target_language: Some(Lang::En), ..base };
                let fr = NormalizeOptions { target_language: Some(Lang::Fr), ..base };
                matched = f_en.contains(&normalize(pattern, &en))
                    || f_fr.contains(&normalize(pattern, &fr));
            }
        }
        // Structured references wrap ranges in brackets; fall back to a
        // bracket-stripped comparison for range-shaped patterns
        if !matched && is_range_shaped(pattern) {
            let p2: String = p_plain.chars().filter(|c| *c != '[' && *c != ']').collect();
            let f2: String = f_plain.chars().filter(|c| *c != '[' && *c != ']').collect();
            matched = f2.contains(&p2);
        }
        if !matched {
            unmatched.push(pattern.clone());
        }
    }
    unmatched
}

/// Whether the formula calls `name` (in either language) as a function
///
/// Whole-word only: `NB(` does not match inside `NBVAL(`.
pub fn contains_function(formula: &str, name: &str) -> bool {
    let name = name.trim().to_ascii_uppercase();
    if name.is_empty() {
        return false;
    }
    if has_function_call(formula, &name) {
        return true;
    }
    match other_language_variant(&name) {
        Some(variant) => has_function_call(formula, variant),
        None => false,
    }
}

fn has_function_call(formula: &str, name: &str) -> bool {
    let bytes = formula.as_bytes();
    let nb = name.as_bytes();
    let mut i = 0;
    while i + nb.len() < bytes.len() {
        let at_boundary = i == 0 || !is_ident_byte(bytes[i - 1]);
        if at_boundary
            && bytes[i..i + nb.len()].eq_ignore_ascii_case(nb)
            && bytes[i + nb.len()] == b'('
        {
            return true;
        }
        i += 1;
    }
    false
}

/// Every function name the formula calls, uppercased, in order of first use
pub fn extract_function_names(formula: &str) -> Vec<String> {
    let re = regex!(r"([A-Za-z][A-Za-z0-9_.]*)\s*\(");
    let mut seen = Vec::new();
    for cap in re.captures_iter(formula) {
        let name = cap[1].to_ascii_uppercase();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_strips_and_uppercases() {
        let opts = NormalizeOptions::default();
        assert_eq!(normalize("= somme( $a$1 : $a$10 )", &opts), "=SOMME(A1:A10)");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let opts = NormalizeOptions::canonical();
        let once = normalize("= nb.si( B2:B20 ; \"oui\" )", &opts);
        let twice = normalize(&once, &opts);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_translates_longest_first() {
        let opts = NormalizeOptions::canonical();
        // NB.SI.ENS must become COUNTIFS, never COUNT-something
        assert_eq!(
            normalize("=NB.SI.ENS(A1:A9;\">0\";B1:B9;\"x\")", &opts),
            "=COUNTIFS(A1:A9;\">0\";B1:B9;\"x\")"
        );
        assert_eq!(normalize("=NB.SI(A1:A9;\">0\")", &opts), "=COUNTIF(A1:A9;\">0\")");
        assert_eq!(normalize("=NB(A1:A9)", &opts), "=COUNT(A1:A9)");
    }

    #[test]
    fn test_normalize_rewrites_booleans() {
        let opts = NormalizeOptions::canonical();
        assert_eq!(normalize("=SI(A1>0;VRAI;FAUX)", &opts), "=IF(A1>0;TRUE;FALSE)");
    }

    #[test]
    fn test_only_function_tokens_rewritten() {
        let opts = NormalizeOptions::canonical();
        // SI not followed by '(' is left alone (could be a named range)
        assert_eq!(normalize("=SI(A1;SI;2)", &opts), "=IF(A1;SI;2)");
    }

    #[test]
    fn test_normalize_preserves_literal_case() {
        let opts = NormalizeOptions::canonical();
        assert_eq!(
            normalize("=nb.si(b2:b20;\"Oui\")", &opts),
            "=COUNTIF(B2:B20;\"Oui\")"
        );
    }

    #[test]
    fn test_are_equivalent_is_strict_on_literals() {
        assert!(are_equivalent(
            "=NB.SI(B2:B20;\"oui\")",
            "=COUNTIF(B2:B20,\"oui\")"
        ));
        assert!(!are_equivalent(
            "=NB.SI(B2:B20;\"oui\")",
            "=NB.SI(B2:B20;\"OUI\")"
        ));
    }

    #[test]
    fn test_are_equivalent_cross_language() {
        assert!(are_equivalent(
            "=SOMME.SI($A$1:$A$10; \">0\")",
            "=SUMIF(A1:A10,\">0\")"
        ));
        assert!(are_equivalent("=SOMME($A$1:$A$10)", "=SUM(A1:A10)"));
        assert!(!are_equivalent("=SUM(A1:A10)", "=SUM(A1:A11)"));
    }

    #[test]
    fn test_separator_inside_quotes_untouched() {
        assert_eq!(
            unify_separators("=TEXTJOIN(\";\";TRUE;A1:A3)"),
            "=TEXTJOIN(\";\",TRUE,A1:A3)"
        );
    }

    #[test]
    fn test_contains_function_whole_word() {
        assert!(contains_function("=NB.SI(A1:A9;\">0\")", "COUNTIF"));
        assert!(contains_function("=SUMIF(A1:A9,\">0\")", "SOMME.SI"));
        // NB appears only inside NBVAL here, so NB/COUNT must not match
        assert!(!contains_function("=NBVAL(A1:A9)", "NB"));
        assert!(!contains_function("=NBVAL(A1:A9)", "COUNT"));
        assert!(contains_function("=NBVAL(A1:A9)", "COUNTA"));
    }

    #[test]
    fn test_matches_all_patterns_reports_unmatched() {
        let patterns = vec!["SOMME.SI".to_string(), "B2:B10".to_string(), "\">100\"".to_string()];
        let unmatched = matches_all_patterns(
            "=SUMIF($B$2:$B$10,\">100\")",
            &patterns,
            &MatchOptions::default(),
        );
        assert_eq!(unmatched, Vec::<String>::new());

        let unmatched = matches_all_patterns(
            "=SUM(B2:B10)",
            &patterns,
            &MatchOptions::default(),
        );
        assert_eq!(unmatched, vec!["SOMME.SI".to_string(), "\">100\"".to_string()]);
    }

    #[test]
    fn test_range_pattern_bracket_fallback() {
        let patterns = vec!["[A2:A10]".to_string()];
        let unmatched =
            matches_all_patterns("=SUM(A2:A10)", &patterns, &MatchOptions::default());
        assert!(unmatched.is_empty());
    }

    #[test]
    fn test_extract_function_names() {
        let names = extract_function_names("=SI(NB.SI(A1:A9;\"x\")>0;somme(B1:B9);0)");
        assert_eq!(names, vec!["SI", "NB.SI", "SOMME"]);
    }
}
