//! Insertion and deletion of whole rows or columns
//!
//! A structural edit shifts three structures at once: the size table of the
//! edited axis, the cell store and the merged region index. Merges straddling
//! the edit point are reshaped; the cross axis is untouched.

use tracing::trace;

use crate::cell::{Cell, CellAddress, CellRange, CellStore};
use crate::error::{Error, Result};
use crate::geometry::Axis;
use crate::merge::MergedRegionIndex;
use crate::size::SizeTable;

/// Applies structural edits along the axis of `sizes`
pub struct StructuralEditor<'a> {
    sizes: &'a mut SizeTable,
    cells: &'a mut CellStore,
    merges: &'a mut MergedRegionIndex,
}

/// What happens to one merged region under a delete
#[derive(Debug, Clone, Copy, PartialEq)]
enum Reshape {
    /// Unchanged or shifted; anchor survives
    Keep(CellRange),
    /// Anchor row/column deleted; content moves to the new anchor
    Promote { from: CellAddress, to: CellRange },
    /// Every row/column of the region deleted
    Drop,
}

impl<'a> StructuralEditor<'a> {
    /// Borrow the structures an edit along `sizes.axis()` has to keep in step
    pub fn new(
        sizes: &'a mut SizeTable,
        cells: &'a mut CellStore,
        merges: &'a mut MergedRegionIndex,
    ) -> Self {
        Self {
            sizes,
            cells,
            merges,
        }
    }

    /// The axis being edited
    pub fn axis(&self) -> Axis {
        self.sizes.axis()
    }

    /// Insert `count` empty, default-sized, visible indices before `before`
    ///
    /// `before == count()` appends. A merge that starts before `before` and
    /// ends at or after it grows by `count`.
    pub fn insert(&mut self, before: u32, count: u32) -> Result<()> {
        let axis = self.axis();
        let current = self.sizes.count();
        if count == 0 {
            return Err(Error::InvalidCount(count, "insert count must be positive"));
        }
        if before > current {
            return Err(out_of_bounds(axis, before, current));
        }
        if current.checked_add(count).is_none() {
            return Err(Error::InvalidCount(count, "grid size would overflow"));
        }

        let moved: Vec<CellRange> = self
            .merges
            .take_from(axis, before)
            .into_iter()
            .map(|range| {
                let (s, e) = range.on(axis);
                if s >= before {
                    range.with_span(axis, s + count, e + count)
                } else {
                    range.with_span(axis, s, e + count)
                }
            })
            .collect();

        self.cells.insert_span(axis, before, count);
        self.sizes.insert(before, count);
        for range in &moved {
            self.merges.insert_region(*range);
            self.cells.set_span(range.start, *range);
        }

        trace!(%axis, before, count, moved = moved.len(), "structural insert applied");
        Ok(())
    }

    /// Delete the indices `[from, from + count)`
    ///
    /// Merges entirely inside the deleted span disappear with their content.
    /// Straddling merges shrink to what remains; when the anchor's row or
    /// column is deleted, the first surviving covered address becomes the
    /// anchor and keeps the content. A merge left with a single cell reverts
    /// to an ordinary cell.
    pub fn delete(&mut self, from: u32, count: u32) -> Result<()> {
        let axis = self.axis();
        let current = self.sizes.count();
        if count == 0 {
            return Err(Error::InvalidCount(count, "delete count must be positive"));
        }
        let end = match from.checked_add(count) {
            Some(end) if end <= current => end,
            _ => {
                let last = from.saturating_add(count - 1);
                return Err(out_of_bounds(axis, last.max(from), current));
            }
        };

        let plan: Vec<Reshape> = self
            .merges
            .take_from(axis, from)
            .iter()
            .map(|range| reshape_for_delete(range, axis, from, end, count))
            .collect();

        // Take promoted anchors out before their rows/columns go away
        let promoted: Vec<(Cell, CellRange)> = plan
            .iter()
            .filter_map(|reshape| match *reshape {
                Reshape::Promote { from: anchor, to } => self
                    .cells
                    .take(anchor.row, anchor.col)
                    .map(|cell| (cell, to)),
                _ => None,
            })
            .collect();

        self.cells.delete_span(axis, from, count);
        self.sizes.delete(from, count);

        for (mut cell, to) in promoted {
            cell.range = CellRange::single(to.start);
            self.cells.insert(cell);
        }

        let survivors: Vec<CellRange> = plan
            .iter()
            .filter_map(|reshape| match *reshape {
                Reshape::Keep(range) => Some(range),
                Reshape::Promote { to, .. } => Some(to),
                Reshape::Drop => None,
            })
            .collect();

        for range in &survivors {
            if !range.is_single() {
                self.merges.insert_region(*range);
            }
            self.cells.set_span(range.start, *range);
        }

        trace!(%axis, from, count, merges = self.merges.len(), "structural delete applied");
        Ok(())
    }
}

fn reshape_for_delete(range: &CellRange, axis: Axis, from: u32, end: u32, count: u32) -> Reshape {
    let (s, e) = range.on(axis);

    if e < from {
        return Reshape::Keep(*range);
    }
    if s >= end {
        return Reshape::Keep(range.with_span(axis, s - count, e - count));
    }
    if s >= from && e < end {
        return Reshape::Drop;
    }

    if s < from {
        let new_end = if e >= end { e - count } else { from - 1 };
        Reshape::Keep(range.with_span(axis, s, new_end))
    } else {
        // from <= s < end <= e
        Reshape::Promote {
            from: range.start,
            to: range.with_span(axis, from, e - count),
        }
    }
}

fn out_of_bounds(axis: Axis, index: u32, count: u32) -> Error {
    match axis {
        Axis::Row => Error::RowOutOfBounds(index, count),
        Axis::Column => Error::ColumnOutOfBounds(index, count),
    }
}
