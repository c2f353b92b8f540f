//! Line-oriented grid scripts
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped. Cells and ranges use A1 notation (rows 1-based). Row and column
//! indices are 0-based, and index lists accept spans such as `3-5`.
//!
//! ```text
//! grid 20 10
//! set C3 Hello
//! merge C3:D5
//! hide-rows 7-9
//! get D4
//! bounds C3:D5
//! view 0 0 600 300
//! ```

use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use tablegrid::prelude::*;
use tracing::debug;

use crate::render::TextRenderer;

/// Default viewport of a new session
pub const DEFAULT_VIEWPORT: Rect = Rect {
    left: 0.0,
    top: 0.0,
    width: 960.0,
    height: 300.0,
};

/// A grid being driven by a script
pub struct Session {
    engine: TableEngine<TextRenderer>,
}

impl Session {
    /// Start a session on an existing model
    pub fn new(model: CellModel) -> Self {
        let mut engine = TableEngine::new(model, TextRenderer::new(DEFAULT_VIEWPORT));
        engine.initialize();
        Self { engine }
    }

    /// The model being edited
    pub fn model(&self) -> &CellModel {
        self.engine.cell_model()
    }

    /// Run every line of a script, stopping at the first failing command
    pub fn run<W: Write>(&mut self, source: &str, out: &mut W) -> Result<()> {
        for (number, line) in source.lines().enumerate() {
            self.execute(line, out)
                .with_context(|| format!("line {}: {}", number + 1, line.trim()))?;
        }
        Ok(())
    }

    /// Run a single command
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }
        let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();
        debug!(command, ?args, "executing");

        match command {
            "grid" => {
                let [rows, cols] = numbers::<2>(&args)?;
                let model = CellModel::new(GridOptions::with_size(rows, cols));
                *self = Session::new(model);
                writeln!(out, "grid {} x {}", rows, cols)?;
            }
            "set" => {
                let (target, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: set <cell> <value>"))?;
                let addr = CellAddress::parse(target)?;
                let value = parse_value(text.trim());
                self.edit(|model| model.set_cell_value(addr.row, addr.col, value))?;
            }
            "clear" => {
                let addr = CellAddress::parse(single(&args)?)?;
                self.edit(|model| model.clear_cell(addr.row, addr.col).map(|_| ()))?;
            }
            "merge" => {
                let range = CellRange::parse(single(&args)?)?;
                if self.engine.apply(Intent::MergeSelection(range))? || self.is_merged(&range) {
                    writeln!(out, "merged {}", range)?;
                } else {
                    writeln!(out, "conflict: {} overlaps a merged region", range)?;
                }
            }
            "split" => {
                let addr = CellAddress::parse(single(&args)?)?;
                let changed = self.engine.apply(Intent::SplitSelection {
                    row: addr.row,
                    column: addr.col,
                })?;
                writeln!(out, "{}", if changed { "split" } else { "not merged" })?;
            }
            "insert-rows" | "insert-columns" | "delete-rows" | "delete-columns" => {
                let [index, count] = numbers::<2>(&args)?;
                let axis = if command.ends_with("rows") {
                    Axis::Row
                } else {
                    Axis::Column
                };
                if command.starts_with("insert") {
                    self.edit(|model| model.insert(axis, index, count))?;
                } else {
                    self.edit(|model| model.delete(axis, index, count))?;
                }
            }
            "resize-rows" | "resize-columns" => {
                let (size, indices) = args
                    .split_first()
                    .ok_or_else(|| anyhow!("usage: {} <size> <index>...", command))?;
                let size: f64 = size
                    .parse()
                    .with_context(|| format!("invalid size '{}'", size))?;
                let indices = index_list(indices)?;
                let axis = if command == "resize-rows" {
                    Axis::Row
                } else {
                    Axis::Column
                };
                self.edit(|model| model.resize(axis, &indices, size))?;
            }
            "hide-rows" | "hide-columns" => {
                let selected = spans(&args)?;
                let intent = if command == "hide-rows" {
                    Intent::HideRows(
                        selected
                            .iter()
                            .map(|&(s, e)| CellRange::from_indices(s, 0, e, 0))
                            .collect(),
                    )
                } else {
                    Intent::HideColumns(
                        selected
                            .iter()
                            .map(|&(s, e)| CellRange::from_indices(0, s, 0, e))
                            .collect(),
                    )
                };
                self.engine.apply(intent)?;
            }
            "show-rows" | "show-columns" => {
                let indices = index_list(&args)?;
                let axis = if command == "show-rows" {
                    Axis::Row
                } else {
                    Axis::Column
                };
                self.edit(|model| model.set_hidden(axis, &indices, false))?;
            }
            "show-all" => {
                self.engine.apply(Intent::ShowAll)?;
            }
            "get" => {
                let addr = CellAddress::parse(single(&args)?)?;
                match self.model().get_cell(addr.row, addr.col) {
                    Some(cell) => writeln!(out, "{}", describe(&cell))?,
                    None => writeln!(out, "{}: outside the grid", addr)?,
                }
            }
            "bounds" => {
                let range = CellRange::parse(single(&args)?)?;
                let rect = self.model().get_bounds(&range)?;
                writeln!(out, "{}: {}", range, format_rect(&rect))?;
            }
            "at" => {
                let [x, y] = pixels::<2>(&args)?;
                match self.model().get_cell_at_offset(x, y) {
                    Some(cell) => writeln!(out, "{}", describe(&cell))?,
                    None => writeln!(out, "({}, {}): outside the grid", x, y)?,
                }
            }
            "rect" => {
                let [left, top, width, height] = pixels::<4>(&args)?;
                let cells = self
                    .model()
                    .get_cells_for_rect(&Rect::new(left, top, width, height));
                let names: Vec<String> = cells.iter().map(|cell| cell.range.to_string()).collect();
                writeln!(out, "{} cells: {}", names.len(), names.join(" "))?;
            }
            "size" => {
                let model = self.model();
                writeln!(
                    out,
                    "{} rows x {} columns, {} x {} px, {} merged",
                    model.row_count(),
                    model.column_count(),
                    model.width(),
                    model.height(),
                    model.merged_regions().count()
                )?;
            }
            "view" => {
                if !args.is_empty() {
                    let [left, top, width, height] = pixels::<4>(&args)?;
                    self.engine
                        .renderer_mut()
                        .set_viewport(Rect::new(left, top, width, height));
                }
                self.engine.repaint();
                write!(out, "{}", self.engine.renderer().frame())?;
            }
            other => bail!("unknown command '{}'", other),
        }
        Ok(())
    }

    /// Apply an owner edit to the model, then repaint
    fn edit<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut CellModel) -> tablegrid::Result<()>,
    {
        f(self.engine.cell_model_mut())?;
        self.engine.repaint();
        Ok(())
    }

    fn is_merged(&self, range: &CellRange) -> bool {
        range.is_single()
            || self
                .model()
                .merged_regions()
                .any(|merged| merged == range)
    }
}

/// Numbers become numbers, `true`/`false` booleans, anything else text
fn parse_value(text: &str) -> CellValue {
    if text.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(n) = text.parse::<f64>() {
        return CellValue::Number(n);
    }
    match text {
        "true" => CellValue::Boolean(true),
        "false" => CellValue::Boolean(false),
        _ => CellValue::string(text),
    }
}

fn describe(cell: &Cell) -> String {
    let mut text = format!(
        "{} = {:?} [{}]",
        cell.address(),
        cell.value.to_string(),
        cell.renderer_name
    );
    if cell.is_merged() {
        text.push_str(&format!(" merged {}", cell.range));
    }
    text
}

fn format_rect(rect: &Rect) -> String {
    format!(
        "left={} top={} width={} height={}",
        rect.left, rect.top, rect.width, rect.height
    )
}

fn single<'a>(args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(*arg),
        _ => bail!("expected 1 argument, got {}", args.len()),
    }
}

fn numbers<const N: usize>(args: &[&str]) -> Result<[u32; N]> {
    if args.len() != N {
        bail!("expected {} arguments, got {}", N, args.len());
    }
    let mut values = [0u32; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .with_context(|| format!("invalid index '{}'", arg))?;
    }
    Ok(values)
}

fn pixels<const N: usize>(args: &[&str]) -> Result<[f64; N]> {
    if args.len() != N {
        bail!("expected {} arguments, got {}", N, args.len());
    }
    let mut values = [0.0; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .with_context(|| format!("invalid pixel value '{}'", arg))?;
    }
    Ok(values)
}

/// Parse `4`, `3-5` style arguments into inclusive spans
fn spans(args: &[&str]) -> Result<Vec<(u32, u32)>> {
    if args.is_empty() {
        bail!("expected at least one index");
    }
    args.iter()
        .map(|&arg| {
            let (start, end) = arg.split_once('-').unwrap_or((arg, arg));
            let start: u32 = start
                .parse()
                .with_context(|| format!("invalid index '{}'", arg))?;
            let end: u32 = end
                .parse()
                .with_context(|| format!("invalid index '{}'", arg))?;
            if end < start {
                bail!("reversed span '{}'", arg);
            }
            Ok((start, end))
        })
        .collect()
}

fn index_list(args: &[&str]) -> Result<Vec<u32>> {
    Ok(spans(args)?
        .into_iter()
        .flat_map(|(start, end)| start..=end)
        .collect())
}
