//! Cell address and range types

use crate::error::{Error, Result};
use crate::geometry::Axis;
use std::fmt;
use std::str::FromStr;

/// A cell address (0-based row and column)
///
/// Addresses order row-major, so a `BTreeMap` keyed by address iterates the
/// grid top-to-bottom, left-to-right. A1 notation is supported for display and
/// parsing; rows are 1-based there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Index of this address along an axis
    pub fn on(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Row => self.row,
            Axis::Column => self.col,
        }
    }

    /// Copy of this address with the index along `axis` replaced
    pub fn with(&self, axis: Axis, index: u32) -> Self {
        match axis {
            Axis::Row => Self::new(index, self.col),
            Axis::Column => Self::new(self.row, index),
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use tablegrid_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr, CellAddress::new(0, 0));
    ///
    /// let addr = CellAddress::parse("c12").unwrap();
    /// assert_eq!(addr, CellAddress::new(11, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        if split == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..split])?;

        let row_str = &s[split..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self::new(row - 1, col))
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut letters = Vec::new();
        let mut n = col as u64 + 1;

        while n > 0 {
            n -= 1;
            letters.push((n % 26) as u8 + b'A');
            n /= 26;
        }

        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
            if col > u32::MAX as u64 + 1 {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' is too large",
                    letters
                )));
            }
        }

        Ok((col - 1) as u32)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An inclusive range of cells (e.g., "A1:B10")
///
/// Both corners are inclusive. A valid range has `start <= end` on each axis;
/// [`CellRange::new`] and [`CellRange::from_indices`] normalize their input,
/// while [`CellRange::try_new`] rejects reversed bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalizing so start is top-left
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Create a range from row/column indices (normalized)
    pub fn from_indices(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a range from row/column indices, rejecting `start > end`
    pub fn try_new(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Result<Self> {
        let range = Self {
            start: CellAddress::new(start_row, start_col),
            end: CellAddress::new(end_row, end_col),
        };
        range.validate()?;
        Ok(range)
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(colon_pos) = s.find(':') {
            let start = CellAddress::parse(&s[..colon_pos])?;
            let end = CellAddress::parse(&s[colon_pos + 1..])?;
            Ok(Self::new(start, end))
        } else {
            let addr = CellAddress::parse(s)?;
            Ok(Self::single(addr))
        }
    }

    /// Check the `start <= end` invariant on both axes
    pub fn is_valid(&self) -> bool {
        self.start.row <= self.end.row && self.start.col <= self.end.col
    }

    /// Fail with [`Error::InvalidRange`] if the range is reversed
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidRange(format!(
                "start {:?} is after end {:?}",
                self.start, self.end
            )))
        }
    }

    /// Whether the range covers exactly one cell
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive bounds along an axis
    pub fn on(&self, axis: Axis) -> (u32, u32) {
        (self.start.on(axis), self.end.on(axis))
    }

    /// Copy of this range with the bounds along `axis` replaced
    pub fn with_span(&self, axis: Axis, start: u32, end: u32) -> Self {
        Self {
            start: self.start.with(axis, start),
            end: self.end.with(axis, end),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Check if this range overlaps with another
    pub fn overlaps(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && self.end.row >= other.start.row
            && self.start.col <= other.end.col
            && self.end.col >= other.start.col
    }

    /// Get the intersection of two ranges, if any
    pub fn intersect(&self, other: &CellRange) -> Option<CellRange> {
        if !self.overlaps(other) {
            return None;
        }

        Some(CellRange::from_indices(
            self.start.row.max(other.start.row),
            self.start.col.max(other.start.col),
            self.end.row.min(other.end.row),
            self.end.col.min(other.end.col),
        ))
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            next: self.is_valid().then_some(self.start),
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.is_single() {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    next: Option<CellAddress>,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        let addr = self.next?;

        self.next = if addr.col < self.range.end.col {
            Some(CellAddress::new(addr.row, addr.col + 1))
        } else if addr.row < self.range.end.row {
            Some(CellAddress::new(addr.row + 1, self.range.start.col))
        } else {
            None
        };

        Some(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16383);
        assert_eq!(CellAddress::letters_to_column("xfd").unwrap(), 16383);
        assert!(CellAddress::letters_to_column("ZZZZZZZZ").is_err());
    }

    #[test]
    fn test_cell_address_parse() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress::new(0, 0));
        assert_eq!(CellAddress::parse(" B2 ").unwrap(), CellAddress::new(1, 1));
        assert_eq!(
            CellAddress::parse("ALM1001").unwrap(),
            CellAddress::new(1000, 1000)
        );
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("A1B").is_err());
    }

    #[test]
    fn test_cell_address_ordering_is_row_major() {
        let mut addrs = vec![
            CellAddress::new(1, 0),
            CellAddress::new(0, 5),
            CellAddress::new(0, 1),
        ];
        addrs.sort();
        assert_eq!(
            addrs,
            vec![
                CellAddress::new(0, 1),
                CellAddress::new(0, 5),
                CellAddress::new(1, 0)
            ]
        );
    }

    #[test]
    fn test_cell_range_parse_and_display() {
        let range = CellRange::parse("C3:D5").unwrap();
        assert_eq!(range, CellRange::from_indices(2, 2, 4, 3));
        assert_eq!(range.to_string(), "C3:D5");

        // Reversed corners are normalized
        let range = CellRange::parse("D5:C3").unwrap();
        assert_eq!(range, CellRange::from_indices(2, 2, 4, 3));

        let range = CellRange::parse("C3").unwrap();
        assert!(range.is_single());
        assert_eq!(range.to_string(), "C3");
    }

    #[test]
    fn test_try_new_rejects_reversed_bounds() {
        assert!(CellRange::try_new(4, 0, 2, 0).is_err());
        assert!(CellRange::try_new(0, 3, 0, 1).is_err());
        assert!(CellRange::try_new(2, 1, 2, 1).is_ok());
    }

    #[test]
    fn test_axis_accessors() {
        let range = CellRange::from_indices(2, 5, 4, 9);
        assert_eq!(range.on(Axis::Row), (2, 4));
        assert_eq!(range.on(Axis::Column), (5, 9));
        assert_eq!(
            range.with_span(Axis::Row, 7, 8),
            CellRange::from_indices(7, 5, 8, 9)
        );
    }

    #[test]
    fn test_cell_range_intersect() {
        let a = CellRange::parse("B2:D4").unwrap();
        let b = CellRange::parse("C3:F9").unwrap();
        assert_eq!(a.intersect(&b), Some(CellRange::parse("C3:D4").unwrap()));
        assert_eq!(a.intersect(&CellRange::parse("E5").unwrap()), None);
    }

    #[test]
    fn test_cell_range_iterator() {
        let cells: Vec<_> = CellRange::parse("A1:B2").unwrap().cells().collect();
        assert_eq!(
            cells,
            vec![
                CellAddress::new(0, 0),
                CellAddress::new(0, 1),
                CellAddress::new(1, 0),
                CellAddress::new(1, 1),
            ]
        );
    }
}
