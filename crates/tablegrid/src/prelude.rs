//! Prelude module - common imports for tablegrid users
//!
//! ```rust
//! use tablegrid::prelude::*;
//! ```

pub use crate::{
    // Axis and geometry
    Axis,
    // Cell types
    Cell,
    CellAddress,
    // Main types
    CellModel,
    CellModelBuilder,
    CellRange,
    CellValue,
    // Engine types
    EngineEvent,
    // Error types
    Error,
    GridOptions,
    Intent,
    ModelChange,
    Rect,
    Renderer,
    Result,
    TableEngine,
};
