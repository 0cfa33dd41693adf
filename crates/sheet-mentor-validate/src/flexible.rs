//! Flexible weighted formula validator
//!
//! A standalone single-checkpoint scorer for "fuzzy" grading: three weighted
//! checks (value, function, pattern) combine into one score, with a
//! permissive decision rule — a numerically correct answer passes even when
//! the formula is written differently than expected.

use crate::value_check::strings_match;
use lazy_regex::regex;
use sheet_mentor_core::{CellValue, Expected};
use sheet_mentor_lang::{
    are_equivalent, contains_function, extract_function_names, normalize, same_equivalence_class,
    translate, Lang, NormalizeOptions,
};

/// Flat absolute tolerance of the flexible value check
pub const FLEX_ABS_TOLERANCE: f64 = 0.01;

/// Flat relative tolerance of the flexible value check (0.1%)
pub const FLEX_REL_TOLERANCE: f64 = 0.001;

/// Default row-count tolerance for range-shaped patterns
pub const DEFAULT_ROW_TOLERANCE: u32 = 5;

/// Weights of the three checks (out of their sum)
#[derive(Debug, Clone, Copy)]
pub struct FlexibleWeights {
    /// Weight of the value check
    pub value: f64,
    /// Weight of the function check
    pub function: f64,
    /// Weight of the pattern check
    pub pattern: f64,
}

impl Default for FlexibleWeights {
    fn default() -> Self {
        Self {
            value: 50.0,
            function: 30.0,
            pattern: 20.0,
        }
    }
}

/// Options for [`validate_flexible`]
#[derive(Debug, Clone, Copy)]
pub struct FlexibleOptions {
    /// Check weights
    pub weights: FlexibleWeights,
    /// In strict mode all applicable checks must pass
    pub strict: bool,
    /// Allowed drift in range start/end rows for range-shaped patterns
    pub row_tolerance: u32,
}

impl Default for FlexibleOptions {
    fn default() -> Self {
        Self {
            weights: FlexibleWeights::default(),
            strict: false,
            row_tolerance: DEFAULT_ROW_TOLERANCE,
        }
    }
}

/// What the flexible validator grades against
#[derive(Debug, Clone, Default)]
pub struct FlexibleExpectation {
    /// Expected computed value, if the exercise defines one
    pub expected_value: Option<Expected>,
    /// Expected function (either language)
    pub expected_function: Option<String>,
    /// Required formula fragments
    pub patterns: Vec<String>,
    /// A reference formula for the unscored equivalence signal
    pub reference_formula: Option<String>,
}

/// Outcome of one weighted check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable explanation
    pub detail: String,
}

/// Result of a flexible validation
#[derive(Debug, Clone, PartialEq)]
pub struct FlexibleReport {
    /// Weighted score, 0–100 over the applicable checks
    pub score: f64,
    /// Overall verdict under the decision rule
    pub valid: bool,
    /// Value check, when an expected value was given
    pub value_check: Option<CheckOutcome>,
    /// Function check, when an expected function was given
    pub function_check: Option<CheckOutcome>,
    /// Pattern check, when patterns were given
    pub pattern_check: Option<CheckOutcome>,
    /// Unscored bonus: the formula is strictly equivalent to the reference
    pub formula_equivalent: bool,
    /// Functions the learner actually used
    pub used_functions: Vec<String>,
}

/// Grade one formula/value pair against a flexible expectation
pub fn validate_flexible(
    formula: Option<&str>,
    actual_value: Option<&CellValue>,
    expectation: &FlexibleExpectation,
    opts: &FlexibleOptions,
) -> FlexibleReport {
    let used_functions = formula.map(extract_function_names).unwrap_or_default();

    let value_check = expectation
        .expected_value
        .as_ref()
        .map(|expected| check_value(expected, actual_value));
    let function_check = expectation
        .expected_function
        .as_deref()
        .map(|expected| check_function(formula, &used_functions, expected));
    let pattern_check = if expectation.patterns.is_empty() {
        None
    } else {
        Some(check_patterns(formula, &expectation.patterns, opts.row_tolerance))
    };

    let mut applicable = 0.0;
    let mut earned = 0.0;
    for (check, weight) in [
        (&value_check, opts.weights.value),
        (&function_check, opts.weights.function),
        (&pattern_check, opts.weights.pattern),
    ] {
        if let Some(outcome) = check {
            applicable += weight;
            if outcome.passed {
                earned += weight;
            }
        }
    }
    let score = if applicable > 0.0 {
        (earned / applicable * 100.0).round()
    } else {
        0.0
    };

    let value_ok = value_check.as_ref().map(|c| c.passed);
    let function_ok = function_check.as_ref().map_or(true, |c| c.passed);
    let pattern_ok = pattern_check.as_ref().map_or(true, |c| c.passed);
    let any_structural = function_check.is_some() || pattern_check.is_some();

    let valid = if opts.strict {
        value_ok.unwrap_or(true) && function_ok && pattern_ok
    } else {
        // A correct value wins outright; otherwise both technique and
        // structure must check out
        value_ok == Some(true) || (any_structural && function_ok && pattern_ok)
    };

    let formula_equivalent = match (formula, expectation.reference_formula.as_deref()) {
        (Some(f), Some(reference)) => are_equivalent(f, reference),
        _ => false,
    };

    FlexibleReport {
        score,
        valid,
        value_check,
        function_check,
        pattern_check,
        formula_equivalent,
        used_functions,
    }
}

// === value ===

fn flexible_numbers_match(expected: f64, actual: f64) -> bool {
    let diff = (expected - actual).abs();
    diff <= FLEX_ABS_TOLERANCE || diff <= expected.abs() * FLEX_REL_TOLERANCE
}

fn check_value(expected: &Expected, actual: Option<&CellValue>) -> CheckOutcome {
    let Some(actual) = actual else {
        return CheckOutcome {
            passed: false,
            detail: "aucune valeur calculée".into(),
        };
    };
    let passed = match (expected.as_number(), actual.as_number()) {
        (Some(e), Some(a)) => e == a || flexible_numbers_match(e, a),
        _ => strings_match(&expected.to_string(), &actual.to_string()),
    };
    CheckOutcome {
        passed,
        detail: if passed {
            "valeur correcte".into()
        } else {
            format!("valeur obtenue {}, attendue {}", actual, expected)
        },
    }
}

// === function ===

fn check_function(formula: Option<&str>, used: &[String], expected: &str) -> CheckOutcome {
    let Some(formula) = formula else {
        return CheckOutcome {
            passed: false,
            detail: "aucune formule".into(),
        };
    };
    // Direct presence, either language
    if contains_function(formula, expected) {
        return CheckOutcome {
            passed: true,
            detail: format!("fonction {} utilisée", expected.to_ascii_uppercase()),
        };
    }
    // Interchangeable technique from the equivalence classes
    if let Some(other) = used
        .iter()
        .find(|f| same_equivalence_class(f, expected))
    {
        return CheckOutcome {
            passed: true,
            detail: format!(
                "fonction {} acceptée comme équivalente à {}",
                other,
                expected.to_ascii_uppercase()
            ),
        };
    }
    // Last resort: re-check on the canonical form, catching spacing
    // oddities like `SOMME (`. Whole-word only, so SUM never matches
    // inside SUMIF or SUMPRODUCT.
    let canon = normalize(formula, &NormalizeOptions::canonical());
    if contains_function(&canon, expected) {
        return CheckOutcome {
            passed: true,
            detail: format!("fonction {} trouvée", translate(expected, Lang::En)),
        };
    }
    CheckOutcome {
        passed: false,
        detail: if used.is_empty() {
            format!("fonction {} absente", expected.to_ascii_uppercase())
        } else {
            format!(
                "fonction {} absente ; vous avez utilisé {}",
                expected.to_ascii_uppercase(),
                used.join(", ")
            )
        },
    }
}

// === pattern ===

// Columns compare as fixed uppercase keys (max three letters)
type ColKey = [u8; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeShape {
    start_col: ColKey,
    end_col: ColKey,
    start_row: u32,
    end_row: u32,
}

fn col_key(s: &str) -> ColKey {
    let mut key = [0u8; 3];
    for (i, b) in s.bytes().take(3).enumerate() {
        key[i] = b.to_ascii_uppercase();
    }
    key
}

fn extract_ranges(formula: &str) -> Vec<RangeShape> {
    let stripped = formula.replace('$', "");
    regex!(r"([A-Za-z]{1,3})(\d+)\s*:\s*([A-Za-z]{1,3})(\d+)")
        .captures_iter(&stripped)
        .filter_map(|cap| {
            Some(RangeShape {
                start_col: col_key(&cap[1]),
                end_col: col_key(&cap[3]),
                start_row: cap[2].parse().ok()?,
                end_row: cap[4].parse().ok()?,
            })
        })
        .collect()
}

fn is_range_pattern(pattern: &str) -> bool {
    regex!(r"^\$?[A-Za-z]{1,3}\$?\d+:\$?[A-Za-z]{1,3}\$?\d+$").is_match(pattern.trim())
}

fn is_cell_pattern(pattern: &str) -> bool {
    regex!(r"^\$?[A-Za-z]{1,3}\$?\d+$").is_match(pattern.trim())
}

fn is_function_pattern(pattern: &str) -> bool {
    regex!(r"^[A-Za-z][A-Za-z0-9_.]*$").is_match(pattern.trim())
        && !is_cell_pattern(pattern)
}

fn range_pattern_matches(formula: &str, pattern: &str, row_tolerance: u32) -> bool {
    let Some(wanted) = extract_ranges(pattern).into_iter().next() else {
        return false;
    };
    extract_ranges(formula).iter().any(|r| {
        r.start_col == wanted.start_col
            && r.end_col == wanted.end_col
            && r.start_row.abs_diff(wanted.start_row) <= row_tolerance
            && r.end_row.abs_diff(wanted.end_row) <= row_tolerance
    })
}

fn check_patterns(formula: Option<&str>, patterns: &[String], row_tolerance: u32) -> CheckOutcome {
    let Some(formula) = formula else {
        return CheckOutcome {
            passed: false,
            detail: "aucune formule".into(),
        };
    };
    let canon = normalize(formula, &NormalizeOptions::canonical());
    let used = extract_function_names(formula);

    let mut failing = Vec::new();
    for pattern in patterns {
        let p = pattern.trim();
        let matched = if is_range_pattern(p) {
            range_pattern_matches(formula, p, row_tolerance)
        } else if is_cell_pattern(p) {
            canon.contains(&p.replace('$', "").to_ascii_uppercase())
        } else if is_function_pattern(p) {
            contains_function(formula, p)
                || used.iter().any(|f| same_equivalence_class(f, p))
        } else {
            // Literal/criterion token: with and without surrounding quotes
            let canon_p = normalize(p, &NormalizeOptions::canonical());
            let unquoted = canon_p.trim_matches('"');
            canon.contains(&canon_p) || canon.contains(unquoted)
        };
        if !matched {
            failing.push(pattern.clone());
        }
    }

    CheckOutcome {
        passed: failing.is_empty(),
        detail: if failing.is_empty() {
            "structure conforme".into()
        } else {
            format!("éléments manquants : {}", failing.join(", "))
        },
    }
}
