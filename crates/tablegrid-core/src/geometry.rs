//! Axis and pixel-space types

use std::fmt;

/// One of the two grid dimensions
///
/// Most sizing and structural operations are defined once and parameterized
/// over the axis they act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The row dimension (vertical)
    Row,
    /// The column dimension (horizontal)
    Column,
}

impl Axis {
    /// The other axis
    pub fn cross(self) -> Self {
        match self {
            Axis::Row => Axis::Column,
            Axis::Column => Axis::Row,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

/// A pixel rectangle (left/top edge plus extent)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Offset from the left edge of the grid
    pub left: f64,
    /// Offset from the top edge of the grid
    pub top: f64,
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Start and end of the rectangle along an axis
    pub fn span(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::Row => (self.top, self.bottom()),
            Axis::Column => (self.left, self.right()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right(), 40.0);
        assert_eq!(rect.bottom(), 60.0);
        assert_eq!(rect.span(Axis::Row), (20.0, 60.0));
        assert_eq!(rect.span(Axis::Column), (10.0, 40.0));
    }

    #[test]
    fn test_axis_cross() {
        assert_eq!(Axis::Row.cross(), Axis::Column);
        assert_eq!(Axis::Column.cross(), Axis::Row);
        assert_eq!(Axis::Column.to_string(), "column");
    }
}
