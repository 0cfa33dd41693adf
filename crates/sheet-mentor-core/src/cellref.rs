//! Cell reference and span types
//!
//! Submissions key their formula/value maps by A1-style references with an
//! optional sheet prefix (`Feuil1!B2`, `$C$4`). The `$` markers matter for
//! grading: several exercises require a specific absolute/relative shape on
//! a reference, so the shape is preserved through parsing.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The absolute/relative shape of a reference, derived from its `$` markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefShape {
    /// No `$` marker (e.g. `B2`)
    Relative,
    /// Both markers (e.g. `$B$2`)
    Absolute,
    /// Column fixed only (e.g. `$B2`)
    MixedCol,
    /// Row fixed only (e.g. `B$2`)
    MixedRow,
}

impl fmt::Display for RefShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefShape::Relative => "relative",
            RefShape::Absolute => "absolute",
            RefShape::MixedCol => "mixed-col",
            RefShape::MixedRow => "mixed-row",
        };
        write!(f, "{}", s)
    }
}

/// A single cell reference (e.g. `B2`, `$A$1`, `Feuil1!C10`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Optional sheet name prefix (without the `!`)
    pub sheet: Option<String>,
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0)
    pub col: u32,
    /// Whether the row reference carries a `$`
    pub row_absolute: bool,
    /// Whether the column reference carries a `$`
    pub col_absolute: bool,
}

impl CellRef {
    /// Create a relative reference with no sheet prefix
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            sheet: None,
            row,
            col,
            row_absolute: false,
            col_absolute: false,
        }
    }

    /// Parse an A1-style reference, with optional sheet prefix and `$` markers
    ///
    /// # Examples
    /// ```
    /// use sheet_mentor_core::CellRef;
    ///
    /// let r = CellRef::parse("B2").unwrap();
    /// assert_eq!((r.row, r.col), (1, 1));
    ///
    /// let r = CellRef::parse("Feuil1!$C$4").unwrap();
    /// assert_eq!(r.sheet.as_deref(), Some("Feuil1"));
    /// assert!(r.row_absolute && r.col_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidCellRef("empty reference".into()));
        }

        let (sheet, rest) = match s.rfind('!') {
            Some(pos) => {
                let name = s[..pos].trim_matches('\'');
                if name.is_empty() {
                    return Err(Error::InvalidCellRef(format!("empty sheet name in '{}'", s)));
                }
                (Some(name.to_string()), &s[pos + 1..])
            }
            None => (None, s),
        };

        let bytes = rest.as_bytes();
        let mut pos = 0;

        let col_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidCellRef(format!("no column letters in '{}'", s)));
        }
        let col = letters_to_column(&rest[col_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &rest[pos..];
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidCellRef(format!("invalid row number in '{}'", s)))?;
        if row == 0 {
            return Err(Error::InvalidCellRef(format!("row must be >= 1 in '{}'", s)));
        }

        Ok(Self {
            sheet,
            row: row - 1,
            col,
            row_absolute,
            col_absolute,
        })
    }

    /// The absolute/relative shape of this reference
    pub fn shape(&self) -> RefShape {
        match (self.col_absolute, self.row_absolute) {
            (true, true) => RefShape::Absolute,
            (false, false) => RefShape::Relative,
            (true, false) => RefShape::MixedCol,
            (false, true) => RefShape::MixedRow,
        }
    }

    /// Format as A1 notation, without the sheet prefix
    pub fn to_a1_string(&self) -> String {
        let mut out = String::new();
        if self.col_absolute {
            out.push('$');
        }
        out.push_str(&column_to_letters(self.col));
        if self.row_absolute {
            out.push('$');
        }
        out.push_str(&(self.row + 1).to_string());
        out
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", sheet)?;
        }
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular span of cells (e.g. `A1:B10`), or a single cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    /// Top-left corner
    pub start: CellRef,
    /// Bottom-right corner
    pub end: CellRef,
}

impl Span {
    /// Create a span, normalizing so start is top-left and end is bottom-right
    pub fn new(a: CellRef, b: CellRef) -> Self {
        let (start_row, end_row) = if a.row <= b.row { (a.row, b.row) } else { (b.row, a.row) };
        let (start_col, end_col) = if a.col <= b.col { (a.col, b.col) } else { (b.col, a.col) };
        let sheet = a.sheet.clone().or_else(|| b.sheet.clone());
        Self {
            start: CellRef {
                sheet: sheet.clone(),
                row: start_row,
                col: start_col,
                row_absolute: false,
                col_absolute: false,
            },
            end: CellRef {
                sheet,
                row: end_row,
                col: end_col,
                row_absolute: false,
                col_absolute: false,
            },
        }
    }

    /// Parse `A1:B10` notation; a bare reference yields a single-cell span
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.find(':') {
            Some(pos) => {
                let start = CellRef::parse(&s[..pos])?;
                let end = CellRef::parse(&s[pos + 1..])?;
                Ok(Self::new(start, end))
            }
            None => {
                let r = CellRef::parse(s)?;
                Ok(Self::new(r.clone(), r))
            }
        }
    }

    /// Number of rows in the span
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns in the span
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Whether the span is a single cell
    pub fn is_single_cell(&self) -> bool {
        self.start.row == self.end.row && self.start.col == self.end.col
    }

    /// Whether a reference falls inside the span (sheet prefixes ignored)
    pub fn contains(&self, r: &CellRef) -> bool {
        r.row >= self.start.row
            && r.row <= self.end.row
            && r.col >= self.start.col
            && r.col <= self.end.col
    }

    /// Iterate over the cells of the span in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        let sheet = self.start.sheet.clone();
        let start_col = self.start.col;
        let end_col = self.end.col;
        (self.start.row..=self.end.row).flat_map(move |row| {
            let sheet = sheet.clone();
            (start_col..=end_col).map(move |col| CellRef {
                sheet: sheet.clone(),
                row,
                col,
                row_absolute: false,
                col_absolute: false,
            })
        })
    }

    /// Format as `A1:B10` (single cells collapse to `A1`)
    pub fn to_a1_string(&self) -> String {
        if self.is_single_cell() {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.start.sheet {
            write!(f, "{}!", sheet)?;
        }
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Span {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Convert column letters to an index (A = 0, Z = 25, AA = 26)
pub fn letters_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidCellRef("empty column letters".into()));
    }
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidCellRef(format!("invalid column letter '{}'", c)));
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Ok(col - 1)
}

/// Convert a column index to letters (0 = A, 25 = Z, 26 = AA)
pub fn column_to_letters(col: u32) -> String {
    let mut out = String::new();
    let mut n = col + 1;
    while n > 0 {
        n -= 1;
        out.insert(0, ((n % 26) as u8 + b'A') as char);
        n /= 26;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_ref() {
        let r = CellRef::parse("B2").unwrap();
        assert_eq!((r.row, r.col), (1, 1));
        assert_eq!(r.shape(), RefShape::Relative);
        assert_eq!(r.to_string(), "B2");
    }

    #[test]
    fn test_parse_absolute_shapes() {
        assert_eq!(CellRef::parse("$A$1").unwrap().shape(), RefShape::Absolute);
        assert_eq!(CellRef::parse("$A1").unwrap().shape(), RefShape::MixedCol);
        assert_eq!(CellRef::parse("A$1").unwrap().shape(), RefShape::MixedRow);
        assert_eq!(CellRef::parse("A1").unwrap().shape(), RefShape::Relative);
    }

    #[test]
    fn test_parse_sheet_prefix() {
        let r = CellRef::parse("Feuil1!C10").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("Feuil1"));
        assert_eq!((r.row, r.col), (9, 2));
        assert_eq!(r.to_string(), "Feuil1!C10");

        let r = CellRef::parse("'Mon Budget'!A1").unwrap();
        assert_eq!(r.sheet.as_deref(), Some("Mon Budget"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(CellRef::parse("").is_err());
        assert!(CellRef::parse("12").is_err());
        assert!(CellRef::parse("A0").is_err());
        assert!(CellRef::parse("!B2").is_err());
    }

    #[test]
    fn test_letters_roundtrip() {
        assert_eq!(letters_to_column("A").unwrap(), 0);
        assert_eq!(letters_to_column("Z").unwrap(), 25);
        assert_eq!(letters_to_column("AA").unwrap(), 26);
        assert_eq!(letters_to_column("aa").unwrap(), 26);
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(27), "AB");
    }

    #[test]
    fn test_span_row_major_order() {
        let span = Span::parse("A1:B2").unwrap();
        let cells: Vec<String> = span.cells().map(|c| c.to_a1_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_span_single_cell() {
        let span = Span::parse("C3").unwrap();
        assert!(span.is_single_cell());
        assert_eq!(span.cells().count(), 1);
        assert_eq!(span.to_a1_string(), "C3");
    }

    #[test]
    fn test_span_normalizes_corners() {
        let span = Span::parse("B10:A1").unwrap();
        assert_eq!(span.to_a1_string(), "A1:B10");
        assert_eq!(span.row_count(), 10);
        assert_eq!(span.col_count(), 2);
    }

    #[test]
    fn test_span_strips_absolute_markers() {
        let span = Span::parse("$A$1:$B$5").unwrap();
        assert_eq!(span.to_a1_string(), "A1:B5");
    }
}
