//! Engine lifecycle and intent handling

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tablegrid::prelude::*;

/// Records what it was asked to do
#[derive(Default)]
struct RecordingRenderer {
    initialized: bool,
    frames: Vec<(u32, u32, f64)>,
    cleaned_up: bool,
}

impl Renderer for RecordingRenderer {
    fn initialize(&mut self, _model: &CellModel) {
        self.initialized = true;
    }

    fn render(&mut self, model: &CellModel) {
        self.frames
            .push((model.row_count(), model.column_count(), model.height()));
    }

    fn cleanup(&mut self) {
        self.cleaned_up = true;
    }
}

fn engine() -> TableEngine<RecordingRenderer> {
    let model = CellModel::new(GridOptions::with_size(10, 5));
    TableEngine::new(model, RecordingRenderer::default())
}

fn record(engine: &mut TableEngine<RecordingRenderer>) -> Rc<RefCell<Vec<EngineEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    engine.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

#[test]
fn initialize_announces_ready_then_paints() {
    let mut engine = engine();
    let events = record(&mut engine);
    assert!(!engine.is_ready());
    assert!(engine.renderer().frames.is_empty());

    engine.initialize();
    engine.initialize();

    assert!(engine.renderer().initialized);
    assert_eq!(engine.renderer().frames, vec![(10, 5, 300.0)]);
    assert_eq!(*events.borrow(), vec![EngineEvent::RendererReady]);
}

#[test]
fn intents_change_the_model_and_repaint() {
    let mut engine = engine();
    engine.initialize();
    let events = record(&mut engine);

    let selection = CellRange::parse("A2:B3").unwrap();
    assert!(engine.apply(Intent::MergeSelection(selection)).unwrap());
    assert!(engine
        .apply(Intent::HideRows(vec![CellRange::parse("A5:A6").unwrap()]))
        .unwrap());

    let model = engine.cell_model();
    assert_eq!(model.merged_regions().count(), 1);
    assert!(model.is_row_hidden(4) && model.is_row_hidden(5));
    assert_eq!(engine.renderer().frames.len(), 3);
    assert_eq!(engine.renderer().frames[2], (10, 5, 240.0));

    assert_eq!(
        *events.borrow(),
        vec![
            EngineEvent::ModelChanged(ModelChange::Merged { range: selection }),
            EngineEvent::ModelChanged(ModelChange::VisibilityChanged {
                axis: Axis::Row,
                indices: vec![4, 5],
            }),
        ]
    );
}

#[test]
fn unchanged_intents_do_not_repaint() {
    let mut engine = engine();
    engine.initialize();
    engine
        .apply(Intent::MergeSelection(CellRange::parse("B2:C3").unwrap()))
        .unwrap();
    let frames = engine.renderer().frames.len();

    // Conflicting merge, split of an unmerged cell, nothing hidden
    let conflicting = CellRange::parse("C3:D4").unwrap();
    assert!(!engine.apply(Intent::MergeSelection(conflicting)).unwrap());
    assert!(!engine
        .apply(Intent::SplitSelection { row: 8, column: 4 })
        .unwrap());
    assert!(!engine.apply(Intent::ShowAll).unwrap());

    assert_eq!(engine.renderer().frames.len(), frames);
}

#[test]
fn split_and_show_all() {
    let mut engine = engine();
    engine.initialize();
    engine
        .apply(Intent::MergeSelection(CellRange::parse("B2:C3").unwrap()))
        .unwrap();
    engine
        .apply(Intent::HideColumns(vec![CellRange::parse("D1:E1").unwrap()]))
        .unwrap();

    assert!(engine
        .apply(Intent::SplitSelection { row: 2, column: 2 })
        .unwrap());
    assert!(engine.apply(Intent::ShowAll).unwrap());

    let model = engine.cell_model();
    assert_eq!(model.merged_regions().count(), 0);
    assert!(!model.is_column_hidden(3));
    assert_eq!(model.width(), 600.0);
}

#[test]
fn invalid_intents_are_errors() {
    let mut engine = engine();
    engine.initialize();
    let result = engine.apply(Intent::HideRows(vec![CellRange::parse("A9:A12").unwrap()]));
    assert!(matches!(result, Err(Error::RowOutOfBounds(10, 10))));
    assert_eq!(engine.cell_model().height(), 300.0);
}

#[test]
fn owner_edits_reach_listeners_on_repaint() {
    let mut engine = engine();
    engine.initialize();
    let events = record(&mut engine);

    engine.cell_model_mut().insert_rows(0, 2).unwrap();
    assert!(events.borrow().is_empty());

    engine.repaint();
    assert_eq!(
        *events.borrow(),
        vec![EngineEvent::ModelChanged(ModelChange::Inserted {
            axis: Axis::Row,
            index: 0,
            count: 2,
        })]
    );
    assert_eq!(engine.renderer().frames.last(), Some(&(12, 5, 360.0)));
}

#[test]
fn cleanup_detaches_everything() {
    let mut engine = engine();
    engine.initialize();
    let events = record(&mut engine);

    engine.cleanup();
    assert!(engine.renderer().cleaned_up);
    assert!(!engine.is_ready());

    engine.cell_model_mut().insert_rows(0, 1).unwrap();
    engine.repaint();
    assert!(events.borrow().is_empty());

    let (model, renderer) = engine.into_parts();
    assert_eq!(model.row_count(), 11);
    assert_eq!(renderer.frames.len(), 1);
}
