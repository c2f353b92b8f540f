//! The demo grid
//!
//! 1001×1001 cells. Row 0 and column 0 are headers drawn by the
//! `row-column-header` renderer; every other unset cell shows `row * column`.

use std::io::Write;

use anyhow::Result;
use tablegrid::prelude::*;

/// Renderer name of header cells
pub const HEADER_RENDERER: &str = "row-column-header";

/// Build the demo model
pub fn demo_model() -> Result<CellModel> {
    let model = CellModel::builder()
        .cell(Cell::single(1000, 1000, "last", "base"))
        .default_value(|row, col| CellValue::from(row * col))
        .default_renderer(|row, col| {
            if row == 0 || col == 0 {
                HEADER_RENDERER
            } else {
                "base"
            }
        })
        .row_size(|_| 30.0)
        .column_size(|col| if col == 0 { 50.0 } else { 120.0 })
        .build()?;
    Ok(model)
}

/// Commands run by `tgrid demo`
pub const DEMO_SCRIPT: &str = "\
size
merge C3:D5
get D4
bounds C3:D5
at 170 60
rect 160 50 20 20
hide-rows 5-6
hide-columns 1
view 0 0 600 270
show-all
split C3
get D4
";

/// Run the demo script against the demo model
pub fn run<W: Write>(out: &mut W) -> Result<()> {
    let mut session = crate::Session::new(demo_model()?);
    session.run(DEMO_SCRIPT, out)
}
