//! # sheet-mentor-lang
//!
//! Language-agnostic formula normalization for sheet-mentor.
//!
//! This crate provides:
//! - FR/EN function-name dictionaries and boolean-literal pairs
//! - Equivalence classes of interchangeable techniques
//! - Formula normalization (markers, case, spacing, language)
//! - Pattern matching and function-presence checks
//! - Levenshtein edit distance for typo detection
//!
//! ## Example
//!
//! ```rust
//! use sheet_mentor_lang::are_equivalent;
//!
//! assert!(are_equivalent(
//!     "=SOMME.SI($A$1:$A$10; \">0\")",
//!     "=SUMIF(A1:A10,\">0\")",
//! ));
//! ```

pub mod distance;
pub mod normalize;
pub mod tables;

pub use distance::{closest_match, edit_distance};
pub use normalize::{
    are_equivalent, contains_function, extract_function_names, matches_all_patterns, normalize,
    unify_separators, MatchOptions, NormalizeOptions,
};
pub use tables::{
    other_language_variant, same_equivalence_class, translate, Lang, BOOLEAN_PAIRS,
    EQUIVALENCE_CLASSES, FUNCTION_PAIRS,
};
