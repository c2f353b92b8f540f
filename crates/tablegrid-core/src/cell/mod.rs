//! Cell-related types and storage
//!
//! This module contains:
//! - [`CellValue`] - The opaque content of a cell
//! - [`CellAddress`] / [`CellRange`] - Grid addressing
//! - [`Cell`] - Content, renderer name and span of a single cell
//! - [`CellStore`] - Sparse storage of written cells and merge anchors

mod address;
mod store;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use store::{
    Cell, CellDefaults, CellStore, DefaultRendererFn, DefaultValueFn, DEFAULT_RENDERER,
};
pub use value::{CellValue, SharedString};
