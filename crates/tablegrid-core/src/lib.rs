//! # tablegrid-core
//!
//! Data model and coordinate system of a virtual, arbitrarily large grid.
//!
//! This crate answers, for any cell address or pixel position, what content
//! lives there, where it is drawn, and how the grid changes under edits:
//! - [`CellModel`] - The facade: queries, mutations and change notification
//! - [`SizeTable`] - Per-axis sizes, hidden indices and offset lookups
//! - [`CellStore`] - Sparse cell storage
//! - [`MergedRegionIndex`] - Merged cell spans
//! - [`StructuralEditor`] - Row/column insertion and deletion
//!
//! ## Example
//!
//! ```rust
//! use tablegrid_core::{CellModel, CellRange, GridOptions};
//!
//! let mut model = CellModel::new(GridOptions::with_size(100, 20));
//!
//! model.set_cell(2, 2, "Hello", "base").unwrap();
//! assert!(model.merge_cells(&CellRange::parse("C3:D5").unwrap()).unwrap());
//!
//! // Every covered address resolves to the anchor
//! assert_eq!(model.get_cell(4, 3).unwrap().value.as_string(), Some("Hello"));
//!
//! let bounds = model.get_bounds(&CellRange::parse("C3:D5").unwrap()).unwrap();
//! assert_eq!((bounds.left, bounds.top), (240.0, 60.0));
//! assert_eq!((bounds.width, bounds.height), (240.0, 90.0));
//!
//! // Pixel positions map back to cells
//! let cell = model.get_cell_at_offset(300.0, 100.0).unwrap();
//! assert_eq!(cell.address().to_string(), "C3");
//! ```

pub mod cell;
pub mod change;
pub mod error;
mod fenwick;
pub mod geometry;
pub mod merge;
pub mod model;
pub mod options;
pub mod size;
pub mod structure;

// Re-exports for convenience
pub use cell::{
    Cell, CellAddress, CellDefaults, CellRange, CellRangeIterator, CellStore, CellValue,
    SharedString, DEFAULT_RENDERER,
};
pub use change::{ModelChange, SubscriptionId};
pub use error::{Error, Result};
pub use geometry::{Axis, Rect};
pub use merge::MergedRegionIndex;
pub use model::{CellModel, CellModelBuilder};
pub use options::GridOptions;
pub use size::{SizeFn, SizeTable, MAX_SIZE};
pub use structure::StructuralEditor;
