//! Plain-text renderer
//!
//! Draws the cells inside a pixel viewport as a table of fixed-width columns.
//! Addresses covered by a merge show `<` (covered from the left) or `^`
//! (covered from above) instead of repeating the anchor's value.

use std::fmt::Write;

use tablegrid::prelude::*;

/// Width of one rendered column, in characters
const COLUMN_WIDTH: usize = 10;

/// Renders a viewport of the grid into a string
#[derive(Debug, Clone)]
pub struct TextRenderer {
    viewport: Rect,
    frame: String,
    frames: usize,
}

impl TextRenderer {
    /// Renderer showing the given pixel viewport
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            frame: String::new(),
            frames: 0,
        }
    }

    /// The pixel viewport being drawn
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Change the viewport. Takes effect on the next render.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// The last rendered frame
    pub fn frame(&self) -> &str {
        &self.frame
    }

    /// Number of frames rendered so far
    pub fn frame_count(&self) -> usize {
        self.frames
    }
}

impl Renderer for TextRenderer {
    fn render(&mut self, model: &CellModel) {
        self.frames += 1;
        self.frame = draw(model, &self.viewport);
    }
}

fn draw(model: &CellModel, viewport: &Rect) -> String {
    let (top, bottom) = viewport.span(Axis::Row);
    let (left, right) = viewport.span(Axis::Column);
    let rows = model.sizes(Axis::Row).indices_for_span(top, bottom);
    let cols = model.sizes(Axis::Column).indices_for_span(left, right);
    let (Some((r0, r1)), Some((c0, c1))) = (rows, cols) else {
        return String::from("(empty viewport)\n");
    };

    let visible_cols: Vec<u32> = (c0..=c1).filter(|&c| !model.is_column_hidden(c)).collect();
    let mut out = String::new();

    // Header row of column letters
    let _ = write!(out, "{:>6} ", "");
    for &col in &visible_cols {
        let _ = write!(out, "|{:^width$}", CellAddress::column_to_letters(col), width = COLUMN_WIDTH);
    }
    out.push_str("|\n");

    for row in (r0..=r1).filter(|&r| !model.is_row_hidden(r)) {
        let _ = write!(out, "{:>6} ", row + 1);
        for &col in &visible_cols {
            let text = match model.get_cell(row, col) {
                Some(cell) if cell.address() == CellAddress::new(row, col) => {
                    fit(&cell.value.to_string())
                }
                Some(cell) if cell.row() == row => "<".to_string(),
                Some(_) => "^".to_string(),
                None => String::new(),
            };
            let _ = write!(out, "|{:<width$}", text, width = COLUMN_WIDTH);
        }
        out.push_str("|\n");
    }
    out
}

/// Truncate to one column, marking cut text with `~`
fn fit(text: &str) -> String {
    if text.chars().count() <= COLUMN_WIDTH {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(COLUMN_WIDTH - 1).collect();
    cut.push('~');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_truncates() {
        assert_eq!(fit("short"), "short");
        assert_eq!(fit("exactly10!"), "exactly10!");
        assert_eq!(fit("much too long"), "much too~");
    }

    #[test]
    fn test_draw_marks_merged_cells() {
        let mut model = CellModel::new(GridOptions::with_size(3, 3));
        model.set_cell(0, 0, "top", "base").unwrap();
        model
            .merge_cells(&CellRange::parse("A1:B2").unwrap())
            .unwrap();

        let text = draw(&model, &Rect::new(0.0, 0.0, 360.0, 90.0));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("A") && lines[0].contains("C"));
        assert!(lines[1].starts_with("     1 |top"));
        assert!(lines[1].contains("|<"));
        assert!(lines[2].contains("|^"));
    }

    #[test]
    fn test_draw_skips_hidden_and_handles_empty() {
        let mut model = CellModel::new(GridOptions::with_size(3, 3));
        model.hide_columns(&[1]).unwrap();
        let text = draw(&model, &Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert!(!text.lines().next().unwrap_or_default().contains('B'));

        let empty = draw(&model, &Rect::new(5000.0, 0.0, 10.0, 10.0));
        assert_eq!(empty, "(empty viewport)\n");
    }
}
