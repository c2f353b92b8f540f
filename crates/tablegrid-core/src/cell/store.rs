//! Sparse cell storage
//!
//! Only cells that were explicitly written, plus the anchors of merged
//! regions, are stored. Every other address resolves to a default cell built
//! on demand from [`CellDefaults`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use super::{CellAddress, CellRange, CellValue, SharedString};
use crate::error::{Error, Result};
use crate::geometry::Axis;
use crate::merge::MergedRegionIndex;

/// Renderer name used when no other default is configured
pub const DEFAULT_RENDERER: &str = "base";

/// Function producing the default value of an unset cell
pub type DefaultValueFn = Box<dyn Fn(u32, u32) -> CellValue>;

/// Function producing the default renderer name of an unset cell
pub type DefaultRendererFn = Box<dyn Fn(u32, u32) -> SharedString>;

/// A single cell: its span, its content and the renderer that draws it
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Span of this cell (1×1 unless it anchors a merged region)
    pub range: CellRange,
    /// The cell's value
    pub value: CellValue,
    /// Key used by the rendering layer to pick a drawing strategy
    pub renderer_name: SharedString,
}

impl Cell {
    /// Create a cell spanning `range`
    pub fn new<V, R>(range: CellRange, value: V, renderer_name: R) -> Self
    where
        V: Into<CellValue>,
        R: Into<SharedString>,
    {
        Self {
            range,
            value: value.into(),
            renderer_name: renderer_name.into(),
        }
    }

    /// Create a 1×1 cell
    pub fn single<V, R>(row: u32, col: u32, value: V, renderer_name: R) -> Self
    where
        V: Into<CellValue>,
        R: Into<SharedString>,
    {
        Self::new(
            CellRange::single(CellAddress::new(row, col)),
            value,
            renderer_name,
        )
    }

    /// Anchor (top-left) address of the cell
    pub fn address(&self) -> CellAddress {
        self.range.start
    }

    /// Anchor row
    pub fn row(&self) -> u32 {
        self.range.start.row
    }

    /// Anchor column
    pub fn col(&self) -> u32 {
        self.range.start.col
    }

    /// Whether the cell spans more than one row or column
    pub fn is_merged(&self) -> bool {
        !self.range.is_single()
    }
}

/// Defaults for cells that were never written
pub struct CellDefaults {
    value: Option<DefaultValueFn>,
    renderer: Option<DefaultRendererFn>,
    renderer_name: SharedString,
}

impl CellDefaults {
    /// Empty values drawn by the given renderer
    pub fn new<R: Into<SharedString>>(renderer_name: R) -> Self {
        Self {
            value: None,
            renderer: None,
            renderer_name: renderer_name.into(),
        }
    }

    /// Compute default values from the cell position
    pub fn with_value_fn(mut self, f: DefaultValueFn) -> Self {
        self.value = Some(f);
        self
    }

    /// Compute default renderer names from the cell position
    pub fn with_renderer_fn(mut self, f: DefaultRendererFn) -> Self {
        self.renderer = Some(f);
        self
    }

    /// Default value at an address
    pub fn value(&self, row: u32, col: u32) -> CellValue {
        self.value
            .as_ref()
            .map(|f| f(row, col))
            .unwrap_or(CellValue::Empty)
    }

    /// Default renderer name at an address
    pub fn renderer_name(&self, row: u32, col: u32) -> SharedString {
        self.renderer
            .as_ref()
            .map(|f| f(row, col))
            .unwrap_or_else(|| self.renderer_name.clone())
    }

    /// Default 1×1 cell at an address
    pub fn cell(&self, row: u32, col: u32) -> Cell {
        Cell::single(row, col, self.value(row, col), self.renderer_name(row, col))
    }
}

impl Default for CellDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_RENDERER)
    }
}

impl fmt::Debug for CellDefaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellDefaults")
            .field("value_fn", &self.value.is_some())
            .field("renderer_fn", &self.renderer.is_some())
            .field("renderer_name", &self.renderer_name)
            .finish()
    }
}

/// Sparse row-based storage for cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, Cell>>`. Ordered maps
/// let structural edits split off and re-key only the shifted tail.
///
/// Invariant: a stored cell's `range.start` equals its key; its range is the
/// merged region it anchors, or 1×1.
#[derive(Debug, Default)]
pub struct CellStore {
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
    defaults: CellDefaults,
}

impl CellStore {
    /// Create an empty store
    pub fn new(defaults: CellDefaults) -> Self {
        Self {
            rows: BTreeMap::new(),
            defaults,
        }
    }

    /// Cell defaults
    pub fn defaults(&self) -> &CellDefaults {
        &self.defaults
    }

    /// Get the stored cell at an address (no merge resolution, no defaults)
    pub fn get(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    fn get_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Resolve the cell visible at an address
    ///
    /// Addresses covered by a merge resolve to the anchor; unset addresses
    /// produce a default cell.
    pub fn resolve(&self, merges: &MergedRegionIndex, row: u32, col: u32) -> Cow<'_, Cell> {
        let addr = merges
            .anchor_of(row, col)
            .unwrap_or(CellAddress::new(row, col));
        self.stored_or_default(addr.row, addr.col)
    }

    /// Distinct cells intersecting `range`, in row-major order of first contact
    ///
    /// A merged cell appears once, even if `range` covers only part of it.
    /// Each row is walked as runs of plain addresses between the merges
    /// crossing it, so merged areas are skipped rather than visited.
    pub fn get_range(&self, merges: &MergedRegionIndex, range: &CellRange) -> Vec<Cow<'_, Cell>> {
        let mut pending: Vec<CellRange> = merges.overlapping(range).copied().collect();
        pending.sort_unstable_by_key(|region| std::cmp::Reverse(region.start.row));

        let mut crossing: Vec<CellRange> = Vec::new();
        let mut emitted = ahash::AHashSet::new();
        let mut cells = Vec::new();

        for row in range.start.row..=range.end.row {
            crossing.retain(|region| region.end.row >= row);
            let before = crossing.len();
            while pending.last().map_or(false, |region| region.start.row <= row) {
                crossing.extend(pending.pop());
            }
            if crossing.len() != before {
                crossing.sort_unstable_by_key(|region| region.start.col);
            }

            let mut next = Some(range.start.col);
            for region in &crossing {
                let Some(col) = next else { break };
                for plain in col..region.start.col {
                    cells.push(self.stored_or_default(row, plain));
                }
                if emitted.insert(region.start) {
                    cells.push(self.stored_or_default(region.start.row, region.start.col));
                }
                next = region.end.col.checked_add(1);
            }
            if let Some(col) = next {
                for plain in col..=range.end.col {
                    cells.push(self.stored_or_default(row, plain));
                }
            }
        }

        cells
    }

    fn stored_or_default(&self, row: u32, col: u32) -> Cow<'_, Cell> {
        match self.get(row, col) {
            Some(cell) => Cow::Borrowed(cell),
            None => Cow::Owned(self.defaults.cell(row, col)),
        }
    }

    /// Write content at an address
    ///
    /// Writing to a merge anchor keeps its span; writing to any other address
    /// inside a merge is rejected.
    pub fn set(
        &mut self,
        merges: &MergedRegionIndex,
        row: u32,
        col: u32,
        value: CellValue,
        renderer_name: SharedString,
    ) -> Result<()> {
        self.check_writable(merges, row, col)?;

        match self.get_mut(row, col) {
            Some(cell) => {
                cell.value = value;
                cell.renderer_name = renderer_name;
            }
            None => self.insert(Cell::single(row, col, value, renderer_name)),
        }
        Ok(())
    }

    /// Clear content back to the default
    ///
    /// A merge anchor keeps its span with default content. Returns the
    /// previous content, if any was stored.
    pub fn remove(
        &mut self,
        merges: &MergedRegionIndex,
        row: u32,
        col: u32,
    ) -> Result<Option<Cell>> {
        self.check_writable(merges, row, col)?;

        if merges.is_anchor(row, col) {
            let value = self.defaults.value(row, col);
            let renderer_name = self.defaults.renderer_name(row, col);
            Ok(self.get_mut(row, col).map(|cell| {
                let previous = cell.clone();
                cell.value = value;
                cell.renderer_name = renderer_name;
                previous
            }))
        } else {
            Ok(self.take(row, col))
        }
    }

    fn check_writable(&self, merges: &MergedRegionIndex, row: u32, col: u32) -> Result<()> {
        match merges.anchor_of(row, col) {
            Some(anchor) if anchor != CellAddress::new(row, col) => Err(
                Error::MergedCellConflict(CellAddress::new(row, col).to_a1_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Store a cell under its anchor address, replacing any previous cell
    pub fn insert(&mut self, cell: Cell) {
        let addr = cell.address();
        self.rows.entry(addr.row).or_default().insert(addr.col, cell);
    }

    /// Remove and return the stored cell at an address
    pub fn take(&mut self, row: u32, col: u32) -> Option<Cell> {
        let row_map = self.rows.get_mut(&row)?;
        let cell = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        cell
    }

    /// Make sure a cell is stored at `anchor` and give it the span `range`
    pub(crate) fn materialize_anchor(&mut self, range: CellRange) {
        let anchor = range.start;
        match self.get_mut(anchor.row, anchor.col) {
            Some(cell) => cell.range = range,
            None => {
                let mut cell = self.defaults.cell(anchor.row, anchor.col);
                cell.range = range;
                self.insert(cell);
            }
        }
    }

    /// Set the span of a stored cell (no-op if nothing is stored there)
    pub(crate) fn set_span(&mut self, anchor: CellAddress, range: CellRange) {
        if let Some(cell) = self.get_mut(anchor.row, anchor.col) {
            cell.range = range;
        }
    }

    /// Drop every stored cell inside `range` except the one at `keep`
    pub(crate) fn clear_within(&mut self, range: &CellRange, keep: CellAddress) {
        let mut emptied = Vec::new();
        for (&row, cols) in self.rows.range_mut(range.start.row..=range.end.row) {
            cols.retain(|&col, _| {
                !(col >= range.start.col && col <= range.end.col)
                    || CellAddress::new(row, col) == keep
            });
            if cols.is_empty() {
                emptied.push(row);
            }
        }
        for row in emptied {
            self.rows.remove(&row);
        }
    }

    /// Shift every cell at index `>= before` on `axis` forward by `count`
    pub(crate) fn insert_span(&mut self, axis: Axis, before: u32, count: u32) {
        match axis {
            Axis::Row => {
                let tail = self.rows.split_off(&before);
                for (row, mut cols) in tail {
                    let new_row = row + count;
                    for (&col, cell) in cols.iter_mut() {
                        cell.range = CellRange::single(CellAddress::new(new_row, col));
                    }
                    self.rows.insert(new_row, cols);
                }
            }
            Axis::Column => {
                for (&row, cols) in self.rows.iter_mut() {
                    let tail = cols.split_off(&before);
                    for (col, mut cell) in tail {
                        let new_col = col + count;
                        cell.range = CellRange::single(CellAddress::new(row, new_col));
                        cols.insert(new_col, cell);
                    }
                }
            }
        }
    }

    /// Drop every cell in `[from, from + count)` on `axis` and shift the
    /// cells after it back by `count`
    pub(crate) fn delete_span(&mut self, axis: Axis, from: u32, count: u32) {
        let end = from + count;
        match axis {
            Axis::Row => {
                let tail = self.rows.split_off(&from);
                for (row, mut cols) in tail.into_iter().filter(|(row, _)| *row >= end) {
                    let new_row = row - count;
                    for (&col, cell) in cols.iter_mut() {
                        cell.range = CellRange::single(CellAddress::new(new_row, col));
                    }
                    self.rows.insert(new_row, cols);
                }
            }
            Axis::Column => {
                for (&row, cols) in self.rows.iter_mut() {
                    let tail = cols.split_off(&from);
                    for (col, mut cell) in tail.into_iter().filter(|(col, _)| *col >= end) {
                        let new_col = col - count;
                        cell.range = CellRange::single(CellAddress::new(row, new_col));
                        cols.insert(new_col, cell);
                    }
                }
                self.rows.retain(|_, cols| !cols.is_empty());
            }
        }
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over stored cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.rows.values().flat_map(|cols| cols.values())
    }
}
