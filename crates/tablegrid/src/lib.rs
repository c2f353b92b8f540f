//! # tablegrid
//!
//! A virtual, arbitrarily large grid for canvas-rendered tables.
//!
//! The grid model itself lives in [`tablegrid_core`] and is re-exported here.
//! This crate adds the [`TableEngine`], which owns a model, drives a
//! [`Renderer`] and applies change requests from UI collaborators.
//!
//! ## Features
//!
//! - Sparse cell storage with per-position default values and renderers
//! - Variable row heights and column widths, hidden rows and columns
//! - Merged cells
//! - Row and column insertion and deletion
//! - O(log n) mapping between pixel offsets and grid indices
//!
//! ## Example
//!
//! ```rust
//! use tablegrid::prelude::*;
//!
//! let mut model = CellModel::builder()
//!     .row_count(1000)
//!     .column_count(50)
//!     .column_size(|col| if col == 0 { 50.0 } else { 120.0 })
//!     .build()
//!     .unwrap();
//!
//! model.hide_rows(&[1, 2]).unwrap();
//! let cell = model.get_cell_at_offset(60.0, 40.0).unwrap();
//! assert_eq!((cell.row(), cell.col()), (3, 1));
//! ```

pub mod engine;
pub mod prelude;

pub use engine::{EngineEvent, Intent, Renderer, TableEngine};

// Re-export core types
pub use tablegrid_core::{
    Axis, Cell, CellAddress, CellDefaults, CellModel, CellModelBuilder, CellRange, CellStore,
    CellValue, Error, GridOptions, MergedRegionIndex, ModelChange, Rect, Result, SharedString,
    SizeTable, StructuralEditor, SubscriptionId, DEFAULT_RENDERER,
};
