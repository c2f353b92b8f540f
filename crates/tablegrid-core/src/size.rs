//! Per-axis sizing: explicit sizes, default sizes, hidden indices and the
//! offset index
//!
//! `offset(i)` is the sum of the effective sizes of all indices `< i`, where
//! a hidden index contributes 0 and any other index contributes its explicit
//! size or, failing that, the default size for its position.
//!
//! Sizes are held in fixed-point units of 1/1024 px. Every size is rounded
//! to that resolution on entry, so offsets are exact sums: hiding an index
//! gives `offset(i) == offset(i + 1)` and showing it again restores every
//! offset bit for bit.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Error, Result};
use crate::fenwick::FenwickTree;
use crate::geometry::Axis;

/// Function producing the default size of an index
pub type SizeFn = Box<dyn Fn(u32) -> f64>;

/// Largest size of a single row or column, in pixels
pub const MAX_SIZE: f64 = 1_048_576.0;

const UNITS_PER_PIXEL: f64 = 1024.0;

/// Sizes, visibility and offsets for one axis
///
/// Explicit sizes and hidden flags are stored sparsely. The Fenwick tree
/// holds one effective size per index so offset queries and single-index
/// updates are O(log n); structural edits rebuild it from the shifted
/// effective-size vector in O(n).
pub struct SizeTable {
    axis: Axis,
    count: u32,
    default_size: SizeFn,
    explicit: BTreeMap<u32, i64>,
    hidden: BTreeSet<u32>,
    offsets: FenwickTree,
}

impl SizeTable {
    /// Create a table of `count` indices all sized by `default_size`
    pub fn new(axis: Axis, count: u32, default_size: SizeFn) -> Self {
        let mut table = Self {
            axis,
            count,
            default_size,
            explicit: BTreeMap::new(),
            hidden: BTreeSet::new(),
            offsets: FenwickTree::default(),
        };
        table.rebuild();
        table
    }

    /// Create a table where every index defaults to the same size
    pub fn uniform(axis: Axis, count: u32, size: f64) -> Self {
        Self::new(axis, count, Box::new(move |_: u32| size))
    }

    /// The axis this table sizes
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of indices
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Default size at a position
    ///
    /// Negative or non-finite results count as 0, results above
    /// [`MAX_SIZE`] as [`MAX_SIZE`].
    pub fn default_size(&self, index: u32) -> f64 {
        to_pixels(self.default_units(index))
    }

    /// Explicit size if set, else the default size (ignores hidden state)
    pub fn size(&self, index: u32) -> f64 {
        to_pixels(self.size_units(index))
    }

    /// Size contributed to offsets: 0 if hidden or out of range
    pub fn effective_size(&self, index: u32) -> f64 {
        to_pixels(self.offsets.get(index as usize))
    }

    /// Pixel offset of the start of `index`
    ///
    /// Indices past the end clamp to [`SizeTable::total_size`].
    pub fn offset(&self, index: u32) -> f64 {
        to_pixels(self.offsets.prefix(index as usize))
    }

    /// Total pixel extent of the axis
    pub fn total_size(&self) -> f64 {
        to_pixels(self.offsets.total())
    }

    /// Index at a pixel offset
    ///
    /// A visible index owns its span `[offset(i), offset(i + 1))`. Hidden
    /// indices have an empty span at `offset(i)` and still map through the
    /// ordering: a pixel where one or more hidden indices sit resolves to the
    /// first of them. Returns `None` for negative offsets and offsets at or
    /// past the total extent.
    pub fn index_at_offset(&self, offset: f64) -> Option<u32> {
        if offset.is_nan() || offset < 0.0 || offset >= self.total_size() {
            return None;
        }
        let scaled = offset * UNITS_PER_PIXEL;
        let target = scaled.floor() as i64;
        if scaled != scaled.floor() {
            // Between two unit boundaries: only a visible index can own it
            return Some(self.offsets.count_at_most(target) as u32);
        }
        if target == 0 {
            return Some(0);
        }
        // First index starting exactly at the pixel, else the one spanning it
        let below = self.offsets.count_below(target);
        if self.offsets.prefix(below + 1) == target {
            Some(below as u32 + 1)
        } else {
            Some(below as u32)
        }
    }

    /// Indices covering the pixel span `[start, end)`, including partially
    /// covered ones
    ///
    /// An empty span (`end <= start`) is treated as the single point `start`.
    pub fn indices_for_span(&self, start: f64, end: f64) -> Option<(u32, u32)> {
        if start.is_nan() || end.is_nan() || (end > start && end <= 0.0) {
            return None;
        }
        let first = self.index_at_offset(start.max(0.0))?;
        if end <= start {
            return Some((first, first));
        }

        let end = end.min(self.total_size());
        let last = (self.offsets.count_below(ceil_units(end)) as u32).max(first);
        Some((first, last))
    }

    /// Whether an index is hidden
    pub fn is_hidden(&self, index: u32) -> bool {
        self.hidden.contains(&index)
    }

    /// Hidden indices in ascending order
    pub fn hidden(&self) -> impl Iterator<Item = u32> + '_ {
        self.hidden.iter().copied()
    }

    /// Explicit sizes in ascending index order
    pub fn explicit_sizes(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.explicit.iter().map(|(&i, &units)| (i, to_pixels(units)))
    }

    /// Set the explicit size of each index
    ///
    /// The size is rounded to 1/1024 px. Hidden indices keep an effective
    /// size of 0 until shown.
    pub fn resize(&mut self, indices: &[u32], size: f64) -> Result<()> {
        if !size.is_finite() || size < 0.0 || size > MAX_SIZE {
            return Err(Error::InvalidSize(size));
        }
        self.check_indices(indices)?;

        let units = to_units(size);
        for &index in indices {
            self.explicit.insert(index, units);
            self.refresh(index);
        }
        Ok(())
    }

    /// Hide each index. Returns the indices that were not hidden before.
    pub fn hide(&mut self, indices: &[u32]) -> Result<Vec<u32>> {
        self.check_indices(indices)?;

        let mut changed = Vec::new();
        for &index in indices {
            if self.hidden.insert(index) {
                self.refresh(index);
                changed.push(index);
            }
        }
        Ok(changed)
    }

    /// Show each index. Returns the indices that were hidden before.
    pub fn show(&mut self, indices: &[u32]) -> Result<Vec<u32>> {
        self.check_indices(indices)?;

        let mut changed = Vec::new();
        for &index in indices {
            if self.hidden.remove(&index) {
                self.refresh(index);
                changed.push(index);
            }
        }
        Ok(changed)
    }

    /// Show every hidden index. Returns the indices shown.
    pub fn show_all(&mut self) -> Vec<u32> {
        let shown: Vec<u32> = std::mem::take(&mut self.hidden).into_iter().collect();
        for &index in &shown {
            self.refresh(index);
        }
        shown
    }

    /// Insert `count` default-sized, visible indices before `before`
    ///
    /// Callers validate `before <= count` and that the new count fits.
    pub(crate) fn insert(&mut self, before: u32, count: u32) {
        shift_map_forward(&mut self.explicit, before, count);
        shift_set_forward(&mut self.hidden, before, count);
        self.count += count;
        self.rebuild_from(before);
    }

    /// Remove the indices `[from, from + count)`, shifting later ones back
    ///
    /// Callers validate `from + count <= count`.
    pub(crate) fn delete(&mut self, from: u32, count: u32) {
        let end = from + count;

        let tail = self.explicit.split_off(&from);
        self.explicit.extend(
            tail.into_iter()
                .filter(|&(i, _)| i >= end)
                .map(|(i, s)| (i - count, s)),
        );

        let tail = self.hidden.split_off(&from);
        self.hidden
            .extend(tail.into_iter().filter(|&i| i >= end).map(|i| i - count));

        self.count -= count;
        self.rebuild_from(from);
    }

    fn check_indices(&self, indices: &[u32]) -> Result<()> {
        match indices.iter().find(|&&i| i >= self.count) {
            Some(&index) => Err(match self.axis {
                Axis::Row => Error::RowOutOfBounds(index, self.count),
                Axis::Column => Error::ColumnOutOfBounds(index, self.count),
            }),
            None => Ok(()),
        }
    }

    fn default_units(&self, index: u32) -> i64 {
        let size = (self.default_size)(index);
        if size.is_finite() && size > 0.0 {
            to_units(size.min(MAX_SIZE))
        } else {
            0
        }
    }

    fn size_units(&self, index: u32) -> i64 {
        if index >= self.count {
            return 0;
        }
        self.explicit
            .get(&index)
            .copied()
            .unwrap_or_else(|| self.default_units(index))
    }

    fn compute_effective(&self, index: u32) -> i64 {
        if self.hidden.contains(&index) {
            0
        } else {
            self.size_units(index)
        }
    }

    fn refresh(&mut self, index: u32) {
        let size = self.compute_effective(index);
        self.offsets.set(index as usize, size);
    }

    fn rebuild(&mut self) {
        self.rebuild_from(0);
    }

    /// Keep the effective sizes before `from`, recompute the rest, and
    /// rebuild the tree
    fn rebuild_from(&mut self, from: u32) {
        let mut values = std::mem::take(&mut self.offsets).into_values();
        values.truncate(from as usize);
        values.reserve((self.count - from.min(self.count)) as usize);
        for index in from..self.count {
            values.push(self.compute_effective(index));
        }
        self.offsets = FenwickTree::from_values(values);
    }
}

/// Round a size in `[0, MAX_SIZE]` to fixed-point units
fn to_units(px: f64) -> i64 {
    (px * UNITS_PER_PIXEL).round() as i64
}

fn to_pixels(units: i64) -> f64 {
    units as f64 / UNITS_PER_PIXEL
}

/// Smallest unit count at or above a pixel offset
fn ceil_units(px: f64) -> i64 {
    (px * UNITS_PER_PIXEL).ceil() as i64
}

fn shift_map_forward(map: &mut BTreeMap<u32, i64>, from: u32, by: u32) {
    let tail = map.split_off(&from);
    map.extend(tail.into_iter().map(|(i, s)| (i + by, s)));
}

fn shift_set_forward(set: &mut BTreeSet<u32>, from: u32, by: u32) {
    let tail = set.split_off(&from);
    set.extend(tail.into_iter().map(|i| i + by));
}

impl fmt::Debug for SizeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeTable")
            .field("axis", &self.axis)
            .field("count", &self.count)
            .field("explicit", &self.explicit)
            .field("hidden", &self.hidden)
            .field("total_size", &self.total_size())
            .finish()
    }
}
