//! The grid model facade

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::cell::{
    Cell, CellDefaults, CellRange, CellStore, CellValue, DefaultRendererFn, DefaultValueFn,
    SharedString,
};
use crate::change::{Listeners, ModelChange, SubscriptionId};
use crate::error::{Error, Result};
use crate::geometry::{Axis, Rect};
use crate::merge::MergedRegionIndex;
use crate::options::GridOptions;
use crate::size::{SizeFn, SizeTable};
use crate::structure::StructuralEditor;

/// A virtual grid: cell content, row/column sizes, hidden indices and merged
/// regions, plus the mapping between grid indices and pixel offsets
///
/// Queries outside the grid return `None`, an empty list or 0. Mutations
/// validate their arguments first and either apply completely or return an
/// error with nothing changed. Every applied mutation is reported to
/// subscribers as a [`ModelChange`].
#[derive(Debug)]
pub struct CellModel {
    rows: SizeTable,
    columns: SizeTable,
    cells: CellStore,
    merges: MergedRegionIndex,
    listeners: Listeners,
}

impl CellModel {
    /// Create an empty grid
    pub fn new(options: GridOptions) -> Self {
        let defaults = CellDefaults::new(options.default_renderer.as_str());
        Self::from_parts(
            SizeTable::uniform(Axis::Row, options.row_count, options.default_row_size),
            SizeTable::uniform(Axis::Column, options.column_count, options.default_column_size),
            CellStore::new(defaults),
        )
    }

    /// Start building a grid with per-index defaults and initial content
    pub fn builder() -> CellModelBuilder {
        CellModelBuilder::new()
    }

    fn from_parts(rows: SizeTable, columns: SizeTable, cells: CellStore) -> Self {
        Self {
            rows,
            columns,
            cells,
            merges: MergedRegionIndex::new(),
            listeners: Listeners::default(),
        }
    }

    // === Extent ===

    /// Number of rows
    pub fn row_count(&self) -> u32 {
        self.rows.count()
    }

    /// Number of columns
    pub fn column_count(&self) -> u32 {
        self.columns.count()
    }

    /// Total pixel width
    pub fn width(&self) -> f64 {
        self.columns.total_size()
    }

    /// Total pixel height
    pub fn height(&self) -> f64 {
        self.rows.total_size()
    }

    /// Size table of one axis
    pub fn sizes(&self, axis: Axis) -> &SizeTable {
        match axis {
            Axis::Row => &self.rows,
            Axis::Column => &self.columns,
        }
    }

    fn sizes_mut(&mut self, axis: Axis) -> &mut SizeTable {
        match axis {
            Axis::Row => &mut self.rows,
            Axis::Column => &mut self.columns,
        }
    }

    // === Sizes and offsets ===

    /// Effective height of a row (0 if hidden or out of range)
    pub fn row_size(&self, row: u32) -> f64 {
        self.rows.effective_size(row)
    }

    /// Effective width of a column (0 if hidden or out of range)
    pub fn column_size(&self, col: u32) -> f64 {
        self.columns.effective_size(col)
    }

    /// Pixel offset of the top edge of a row
    pub fn row_offset(&self, row: u32) -> f64 {
        self.rows.offset(row)
    }

    /// Pixel offset of the left edge of a column
    pub fn column_offset(&self, col: u32) -> f64 {
        self.columns.offset(col)
    }

    /// Set the height of each row
    pub fn resize_rows(&mut self, rows: &[u32], size: f64) -> Result<()> {
        self.resize(Axis::Row, rows, size)
    }

    /// Set the width of each column
    pub fn resize_columns(&mut self, cols: &[u32], size: f64) -> Result<()> {
        self.resize(Axis::Column, cols, size)
    }

    /// Set the explicit size of each index along an axis
    pub fn resize(&mut self, axis: Axis, indices: &[u32], size: f64) -> Result<()> {
        self.sizes_mut(axis).resize(indices, size)?;
        if indices.is_empty() {
            return Ok(());
        }
        debug!(%axis, count = indices.len(), size, "resized");
        self.notify(ModelChange::Resized {
            axis,
            indices: indices.to_vec(),
        });
        Ok(())
    }

    // === Visibility ===

    /// Whether a row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.rows.is_hidden(row)
    }

    /// Whether a column is hidden
    pub fn is_column_hidden(&self, col: u32) -> bool {
        self.columns.is_hidden(col)
    }

    /// Hide rows. Already hidden rows are left alone.
    pub fn hide_rows(&mut self, rows: &[u32]) -> Result<()> {
        self.set_hidden(Axis::Row, rows, true)
    }

    /// Show rows. Visible rows are left alone.
    pub fn show_rows(&mut self, rows: &[u32]) -> Result<()> {
        self.set_hidden(Axis::Row, rows, false)
    }

    /// Hide columns. Already hidden columns are left alone.
    pub fn hide_columns(&mut self, cols: &[u32]) -> Result<()> {
        self.set_hidden(Axis::Column, cols, true)
    }

    /// Show columns. Visible columns are left alone.
    pub fn show_columns(&mut self, cols: &[u32]) -> Result<()> {
        self.set_hidden(Axis::Column, cols, false)
    }

    /// Hide or show indices along an axis
    pub fn set_hidden(&mut self, axis: Axis, indices: &[u32], hidden: bool) -> Result<()> {
        let table = self.sizes_mut(axis);
        let changed = if hidden {
            table.hide(indices)?
        } else {
            table.show(indices)?
        };
        self.visibility_changed(axis, changed);
        Ok(())
    }

    /// Show every hidden row and column
    pub fn show_all(&mut self) {
        for axis in [Axis::Row, Axis::Column] {
            let shown = self.sizes_mut(axis).show_all();
            self.visibility_changed(axis, shown);
        }
    }

    fn visibility_changed(&mut self, axis: Axis, indices: Vec<u32>) {
        if indices.is_empty() {
            return;
        }
        debug!(%axis, count = indices.len(), "visibility changed");
        self.notify(ModelChange::VisibilityChanged { axis, indices });
    }

    // === Cells ===

    /// The cell visible at an address
    ///
    /// Addresses covered by a merge return the anchor cell itself, so two
    /// covered addresses yield the same object. Unset addresses return a
    /// default cell. `None` outside the grid.
    pub fn get_cell(&self, row: u32, col: u32) -> Option<Cow<'_, Cell>> {
        if !self.in_bounds(row, col) {
            return None;
        }
        Some(self.cells.resolve(&self.merges, row, col))
    }

    /// Distinct cells intersecting `range`, each merged cell once
    ///
    /// The part of `range` outside the grid is ignored.
    pub fn get_cells(&self, range: &CellRange) -> Result<Vec<Cow<'_, Cell>>> {
        range.validate()?;
        Ok(self
            .clip(range)
            .map(|clipped| self.cells.get_range(&self.merges, &clipped))
            .unwrap_or_default())
    }

    /// Cells overlapping a pixel rectangle (right and bottom edges exclusive)
    pub fn get_cells_for_rect(&self, rect: &Rect) -> Vec<Cow<'_, Cell>> {
        let (top, bottom) = rect.span(Axis::Row);
        let (left, right) = rect.span(Axis::Column);

        let rows = self.rows.indices_for_span(top, bottom);
        let cols = self.columns.indices_for_span(left, right);
        match (rows, cols) {
            (Some((r0, r1)), Some((c0, c1))) => self
                .cells
                .get_range(&self.merges, &CellRange::from_indices(r0, c0, r1, c1)),
            _ => Vec::new(),
        }
    }

    /// The cell visible at a pixel position
    pub fn get_cell_at_offset(&self, x: f64, y: f64) -> Option<Cow<'_, Cell>> {
        let row = self.rows.index_at_offset(y)?;
        let col = self.columns.index_at_offset(x)?;
        self.get_cell(row, col)
    }

    /// Pixel rectangle of a range
    pub fn get_bounds(&self, range: &CellRange) -> Result<Rect> {
        range.validate()?;
        let left = self.columns.offset(range.start.col);
        let top = self.rows.offset(range.start.row);
        let right = self.columns.offset(range.end.col.saturating_add(1));
        let bottom = self.rows.offset(range.end.row.saturating_add(1));
        Ok(Rect::new(left, top, right - left, bottom - top))
    }

    /// Write a cell's value and renderer name
    ///
    /// Writing to a merge anchor keeps the merge. Writing to any other
    /// address inside a merge fails with [`Error::MergedCellConflict`].
    pub fn set_cell<V, R>(&mut self, row: u32, col: u32, value: V, renderer_name: R) -> Result<()>
    where
        V: Into<CellValue>,
        R: Into<SharedString>,
    {
        self.check_address(row, col)?;
        self.cells
            .set(&self.merges, row, col, value.into(), renderer_name.into())?;
        self.cells_changed(row, col);
        Ok(())
    }

    /// Write a cell's value, keeping its current renderer name
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) -> Result<()> {
        self.check_address(row, col)?;
        let renderer_name = self
            .cells
            .resolve(&self.merges, row, col)
            .renderer_name
            .clone();
        self.set_cell(row, col, value, renderer_name)
    }

    /// Reset a cell to its default content
    ///
    /// Returns the content that was stored, if any.
    pub fn clear_cell(&mut self, row: u32, col: u32) -> Result<Option<Cell>> {
        self.check_address(row, col)?;
        let previous = self.cells.remove(&self.merges, row, col)?;
        if previous.is_some() {
            self.cells_changed(row, col);
        }
        Ok(previous)
    }

    fn cells_changed(&mut self, row: u32, col: u32) {
        let range = self.cells.resolve(&self.merges, row, col).range;
        trace!(range = %range, "cells changed");
        self.notify(ModelChange::CellsChanged { range });
    }

    // === Merging ===

    /// Merge a range into one cell anchored at its top-left address
    ///
    /// Returns `Ok(false)`, changing nothing, if the range overlaps a merged
    /// region of a different extent. Content of the other covered cells is
    /// discarded.
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<bool> {
        range.validate()?;
        self.check_address(range.end.row, range.end.col)?;

        let unchanged = range.is_single()
            || self.merges.region_at(range.start.row, range.start.col) == Some(range);
        if !self.merges.merge(&mut self.cells, range) {
            trace!(range = %range, "merge rejected: overlaps an existing merge");
            return Ok(false);
        }
        if !unchanged {
            debug!(range = %range, "merged");
            self.notify(ModelChange::Merged { range: *range });
        }
        Ok(true)
    }

    /// Split the merge covering an address, if any
    ///
    /// Returns the split region.
    pub fn split_cell(&mut self, row: u32, col: u32) -> Option<CellRange> {
        let range = self.merges.split(&mut self.cells, row, col)?;
        debug!(range = %range, "split");
        self.notify(ModelChange::Split { range });
        Some(range)
    }

    /// Merged regions in row-major anchor order
    pub fn merged_regions(&self) -> impl Iterator<Item = &CellRange> {
        self.merges.regions()
    }

    // === Structural edits ===

    /// Insert `count` rows before `before` (`before == row_count()` appends)
    pub fn insert_rows(&mut self, before: u32, count: u32) -> Result<()> {
        self.insert(Axis::Row, before, count)
    }

    /// Insert `count` columns before `before`
    pub fn insert_columns(&mut self, before: u32, count: u32) -> Result<()> {
        self.insert(Axis::Column, before, count)
    }

    /// Delete `count` rows starting at `from`
    pub fn delete_rows(&mut self, from: u32, count: u32) -> Result<()> {
        self.delete(Axis::Row, from, count)
    }

    /// Delete `count` columns starting at `from`
    pub fn delete_columns(&mut self, from: u32, count: u32) -> Result<()> {
        self.delete(Axis::Column, from, count)
    }

    /// Insert indices along an axis
    pub fn insert(&mut self, axis: Axis, before: u32, count: u32) -> Result<()> {
        self.editor(axis).insert(before, count)?;
        debug!(%axis, before, count, "inserted");
        self.notify(ModelChange::Inserted {
            axis,
            index: before,
            count,
        });
        Ok(())
    }

    /// Delete indices along an axis
    pub fn delete(&mut self, axis: Axis, from: u32, count: u32) -> Result<()> {
        self.editor(axis).delete(from, count)?;
        debug!(%axis, from, count, "deleted");
        self.notify(ModelChange::Deleted {
            axis,
            index: from,
            count,
        });
        Ok(())
    }

    fn editor(&mut self, axis: Axis) -> StructuralEditor<'_> {
        let sizes = match axis {
            Axis::Row => &mut self.rows,
            Axis::Column => &mut self.columns,
        };
        StructuralEditor::new(sizes, &mut self.cells, &mut self.merges)
    }

    // === Notification ===

    /// Register a listener for every applied mutation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ModelChange) + 'static,
    {
        self.listeners.subscribe(Box::new(listener))
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    fn notify(&mut self, change: ModelChange) {
        self.listeners.notify(&change);
    }

    // === Helpers ===

    fn in_bounds(&self, row: u32, col: u32) -> bool {
        row < self.row_count() && col < self.column_count()
    }

    fn check_address(&self, row: u32, col: u32) -> Result<()> {
        if row >= self.row_count() {
            return Err(Error::RowOutOfBounds(row, self.row_count()));
        }
        if col >= self.column_count() {
            return Err(Error::ColumnOutOfBounds(col, self.column_count()));
        }
        Ok(())
    }

    fn clip(&self, range: &CellRange) -> Option<CellRange> {
        if self.row_count() == 0 || self.column_count() == 0 {
            return None;
        }
        let grid = CellRange::from_indices(0, 0, self.row_count() - 1, self.column_count() - 1);
        range.intersect(&grid)
    }
}

impl Default for CellModel {
    fn default() -> Self {
        Self::new(GridOptions::default())
    }
}

/// Builder for a [`CellModel`] with per-index defaults and initial content
///
/// ```
/// use tablegrid_core::{Cell, CellModel, CellValue};
///
/// let model = CellModel::builder()
///     .cell(Cell::single(1000, 1000, "corner", "base"))
///     .default_value(|row, col| CellValue::from(row * col))
///     .column_size(|col| if col == 0 { 50.0 } else { 120.0 })
///     .row_size(|_| 30.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(model.row_count(), 1001);
/// assert_eq!(model.column_offset(2), 170.0);
/// ```
pub struct CellModelBuilder {
    options: GridOptions,
    cells: Vec<Cell>,
    value_fn: Option<DefaultValueFn>,
    renderer_fn: Option<DefaultRendererFn>,
    row_size_fn: Option<SizeFn>,
    column_size_fn: Option<SizeFn>,
    hidden_rows: Vec<u32>,
    hidden_columns: Vec<u32>,
}

impl CellModelBuilder {
    /// Start from [`GridOptions::default`]
    pub fn new() -> Self {
        Self::with_options(GridOptions::default())
    }

    /// Start from the given options
    pub fn with_options(options: GridOptions) -> Self {
        Self {
            options,
            cells: Vec::new(),
            value_fn: None,
            renderer_fn: None,
            row_size_fn: None,
            column_size_fn: None,
            hidden_rows: Vec::new(),
            hidden_columns: Vec::new(),
        }
    }

    /// Minimum number of rows (grows to cover the initial cells)
    pub fn row_count(mut self, count: u32) -> Self {
        self.options.row_count = count;
        self
    }

    /// Minimum number of columns (grows to cover the initial cells)
    pub fn column_count(mut self, count: u32) -> Self {
        self.options.column_count = count;
        self
    }

    /// Add an initial cell. A cell spanning more than one address is merged.
    pub fn cell(mut self, cell: Cell) -> Self {
        self.cells.push(cell);
        self
    }

    /// Add several initial cells
    pub fn cells<I: IntoIterator<Item = Cell>>(mut self, cells: I) -> Self {
        self.cells.extend(cells);
        self
    }

    /// Value of cells that were never written
    pub fn default_value<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, u32) -> CellValue + 'static,
    {
        self.value_fn = Some(Box::new(f));
        self
    }

    /// Renderer name of cells that were never written
    pub fn default_renderer<F, S>(mut self, f: F) -> Self
    where
        F: Fn(u32, u32) -> S + 'static,
        S: Into<SharedString>,
    {
        self.renderer_fn = Some(Box::new(move |row: u32, col: u32| f(row, col).into()));
        self
    }

    /// Height of rows without an explicit size
    pub fn row_size<F: Fn(u32) -> f64 + 'static>(mut self, f: F) -> Self {
        self.row_size_fn = Some(Box::new(f));
        self
    }

    /// Width of columns without an explicit size
    pub fn column_size<F: Fn(u32) -> f64 + 'static>(mut self, f: F) -> Self {
        self.column_size_fn = Some(Box::new(f));
        self
    }

    /// Rows hidden from the start
    pub fn hidden_rows<I: IntoIterator<Item = u32>>(mut self, rows: I) -> Self {
        self.hidden_rows.extend(rows);
        self
    }

    /// Columns hidden from the start
    pub fn hidden_columns<I: IntoIterator<Item = u32>>(mut self, cols: I) -> Self {
        self.hidden_columns.extend(cols);
        self
    }

    /// Build the model
    ///
    /// Fails if a cell range is invalid, if two initial merges overlap, if a
    /// cell lands inside another cell's merge, or if a hidden index lies
    /// outside the grid.
    pub fn build(self) -> Result<CellModel> {
        let mut row_count = self.options.row_count;
        let mut column_count = self.options.column_count;
        for cell in &self.cells {
            cell.range.validate()?;
            row_count = row_count.max(extent(cell.range.end.row)?);
            column_count = column_count.max(extent(cell.range.end.col)?);
        }

        let row_default = self.options.default_row_size;
        let column_default = self.options.default_column_size;
        let mut rows = SizeTable::new(
            Axis::Row,
            row_count,
            self.row_size_fn
                .unwrap_or_else(|| Box::new(move |_: u32| row_default)),
        );
        let mut columns = SizeTable::new(
            Axis::Column,
            column_count,
            self.column_size_fn
                .unwrap_or_else(|| Box::new(move |_: u32| column_default)),
        );
        rows.hide(&self.hidden_rows)?;
        columns.hide(&self.hidden_columns)?;

        let mut defaults = CellDefaults::new(self.options.default_renderer.as_str());
        if let Some(f) = self.value_fn {
            defaults = defaults.with_value_fn(f);
        }
        if let Some(f) = self.renderer_fn {
            defaults = defaults.with_renderer_fn(f);
        }

        let mut model = CellModel::from_parts(rows, columns, CellStore::new(defaults));
        let cell_count = self.cells.len();
        for cell in self.cells {
            model.place_initial(cell)?;
        }

        debug!(
            rows = model.row_count(),
            columns = model.column_count(),
            cells = cell_count,
            merges = model.merges.len(),
            "cell model built"
        );
        Ok(model)
    }
}

impl Default for CellModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CellModel {
    fn place_initial(&mut self, cell: Cell) -> Result<()> {
        let range = cell.range;
        let anchor = range.start;
        self.cells.set(
            &self.merges,
            anchor.row,
            anchor.col,
            cell.value,
            cell.renderer_name,
        )?;
        if !range.is_single() && !self.merges.merge(&mut self.cells, &range) {
            return Err(Error::MergedCellConflict(range.to_a1_string()));
        }
        Ok(())
    }
}

/// Count needed to include `last`
fn extent(last: u32) -> Result<u32> {
    last.checked_add(1)
        .ok_or(Error::InvalidCount(last, "grid size would overflow"))
}
