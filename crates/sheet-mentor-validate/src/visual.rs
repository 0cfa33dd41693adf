//! Best-effort structural heuristics for visual checkpoints
//!
//! Charts, conditional formatting and pivot tables cannot be graded from the
//! formula/value maps. When the caller supplies a [`WorkbookInspector`], the
//! validator can at least confirm *presence* of the right kind of object;
//! content judgment always stays with the external visual validator.

use sheet_mentor_core::Span;

/// Read-only structural view of the submitted workbook
///
/// Implemented by the (out-of-scope) file-parsing layer. Only used for
/// presence heuristics; nothing here reads cell contents.
pub trait WorkbookInspector {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Whether the sheet carries any drawing objects (charts, shapes)
    fn sheet_has_drawings(&self, sheet: &str) -> bool;

    /// Number of conditional-formatting rules intersecting the span
    fn conditional_format_rule_count(&self, sheet: &str, span: &Span) -> usize;

    /// Whether the sheet carries any table objects
    fn has_table_objects(&self, sheet: &str) -> bool;
}

/// Sheet-name fragments that suggest a pivot table lives there
const PIVOT_NAME_HINTS: &[&str] = &["pivot", "tcd", "croise", "croisé"];

/// Presence heuristic for a chart checkpoint
pub fn chart_presence(inspector: &dyn WorkbookInspector, sheet: &str) -> bool {
    inspector.sheet_has_drawings(sheet)
}

/// Presence heuristic for a conditional-formatting checkpoint
pub fn format_presence(inspector: &dyn WorkbookInspector, sheet: &str, span: &Span) -> bool {
    inspector.conditional_format_rule_count(sheet, span) > 0
}

/// Presence heuristic for a pivot-table checkpoint
pub fn pivot_presence(inspector: &dyn WorkbookInspector) -> bool {
    let by_name = inspector.sheet_names().iter().any(|name| {
        let lower = name.to_lowercase();
        PIVOT_NAME_HINTS.iter().any(|hint| lower.contains(hint))
    });
    by_name
        || inspector
            .sheet_names()
            .iter()
            .any(|name| inspector.has_table_objects(name))
}
