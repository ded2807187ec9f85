//! Cell references and sheet dimensions

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell position (e.g. the "AA2091" in a worksheet's `r` attribute).
///
/// Both `row` and `column` are 1-based, matching spreadsheet conventions:
/// "A1" is `{ row: 1, column: 1 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based, A=1, B=2, ..., Z=26, AA=27)
    pub column: u32,
}

impl CellRef {
    /// Create a new cell reference
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse a reference from A1-style notation.
    ///
    /// # Examples
    /// ```
    /// use sheetmap_core::CellRef;
    ///
    /// let r = CellRef::parse("A1").unwrap();
    /// assert_eq!(r.row, 1);
    /// assert_eq!(r.column, 1);
    ///
    /// let r = CellRef::parse("AA2091").unwrap();
    /// assert_eq!(r.row, 2091);
    /// assert_eq!(r.column, 27);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidReference("empty reference".into()));
        }

        // Split the reference into its leading letters and trailing digits.
        let bytes = s.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == 0 {
            return Err(Error::InvalidReference(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let column = Self::letters_to_column(&s[..pos])?;

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidReference(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidReference(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidReference(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row, column })
    }

    /// Convert column letters to a 1-based column number (A = 1, Z = 26, AA = 27, etc.).
    ///
    /// Spreadsheet column naming has no "zero" digit, unlike pure base-26:
    /// after Z comes AA, not BA.
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidReference("empty column letters".into()));
        }

        let mut column: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidReference(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            column = column * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }

        Ok(column)
    }

    /// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
    pub fn column_to_letters(column: u32) -> String {
        let mut result = String::new();
        let mut n = column;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Format as an A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.column), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The rectangular bounding box of a sheet's non-empty cells.
///
/// Either declared by the worksheet (`<dimension ref="A1:C20"/>`) or computed
/// from the cells actually present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Top-left corner
    pub start: CellRef,
    /// Bottom-right corner
    pub end: CellRef,
}

impl Dimensions {
    /// Create dimensions from two corners
    pub fn new(start: CellRef, end: CellRef) -> Self {
        Self { start, end }
    }

    /// Parse a dimension reference such as "A1:C20".
    ///
    /// A single-cell reference ("A1") is valid and normalizes to a degenerate
    /// pair: Apache POI, for one, writes "A1" instead of "A1:A1".
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        let corner = |e: Error| Error::InvalidDimensions(format!("'{}': {}", s, e));

        if let Some(colon) = s.find(':') {
            let start = CellRef::parse(&s[..colon]).map_err(corner)?;
            let end = CellRef::parse(&s[colon + 1..]).map_err(corner)?;
            Ok(Self { start, end })
        } else {
            let single = CellRef::parse(s).map_err(corner)?;
            Ok(Self {
                start: single,
                end: single,
            })
        }
    }

    /// Compute the bounding box of a set of cell references.
    ///
    /// Returns `None` for an empty set.
    pub fn bounding_box<'a, I>(refs: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a CellRef>,
    {
        let mut refs = refs.into_iter();
        let first = refs.next()?;

        let mut min = *first;
        let mut max = *first;
        for r in refs {
            min.row = min.row.min(r.row);
            min.column = min.column.min(r.column);
            max.row = max.row.max(r.row);
            max.column = max.column.max(r.column);
        }

        Some(Self {
            start: min,
            end: max,
        })
    }

    /// Number of rows covered
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns covered
    pub fn column_count(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Check whether a cell falls inside this box
    pub fn contains(&self, r: &CellRef) -> bool {
        r.row >= self.start.row
            && r.row <= self.end.row
            && r.column >= self.start.column
            && r.column <= self.end.column
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for Dimensions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
