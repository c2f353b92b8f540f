//! Grid configuration

use crate::cell::DEFAULT_RENDERER;

/// Shape and defaults of a new grid
///
/// Sizes given here apply uniformly; use
/// [`CellModelBuilder`](crate::CellModelBuilder) for per-index defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridOptions {
    /// Number of rows
    pub row_count: u32,
    /// Number of columns
    pub column_count: u32,
    /// Height of rows without an explicit size
    pub default_row_size: f64,
    /// Width of columns without an explicit size
    pub default_column_size: f64,
    /// Renderer name of cells that were never written
    pub default_renderer: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_count: 0,
            column_count: 0,
            default_row_size: 30.0,
            default_column_size: 120.0,
            default_renderer: DEFAULT_RENDERER.to_string(),
        }
    }
}

impl GridOptions {
    /// Options for a grid of the given shape with default sizes
    pub fn with_size(row_count: u32, column_count: u32) -> Self {
        Self {
            row_count,
            column_count,
            ..Default::default()
        }
    }
}
