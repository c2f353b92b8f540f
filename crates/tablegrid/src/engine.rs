//! Table engine: owns the cell model and drives a renderer
//!
//! Collaborators (renderer, selection, toolbar) read the model through
//! [`TableEngine::cell_model`] and request changes as [`Intent`]s. The engine
//! applies each intent, forwards the resulting model changes to its own
//! listeners and repaints.
//!
//! # Example
//!
//! ```rust
//! use tablegrid::prelude::*;
//!
//! struct CountingRenderer(usize);
//!
//! impl Renderer for CountingRenderer {
//!     fn render(&mut self, _model: &CellModel) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let model = CellModel::new(GridOptions::with_size(10, 10));
//! let mut engine = TableEngine::new(model, CountingRenderer(0));
//! engine.initialize();
//!
//! let range = CellRange::parse("B2:C3").unwrap();
//! assert!(engine.apply(Intent::MergeSelection(range)).unwrap());
//! assert_eq!(engine.renderer().0, 2);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tablegrid_core::{CellModel, CellRange, ModelChange, Result, SubscriptionId};
use tracing::{debug, trace};

/// Draws a [`CellModel`]
///
/// Implementations only read the model; changes go through
/// [`TableEngine::apply`].
pub trait Renderer {
    /// Prepare for drawing. Called once by [`TableEngine::initialize`].
    fn initialize(&mut self, _model: &CellModel) {}

    /// Draw the current state of the model
    fn render(&mut self, model: &CellModel);

    /// Release drawing resources. Called once by [`TableEngine::cleanup`].
    fn cleanup(&mut self) {}
}

/// Something meaningful happened in the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The renderer finished initializing; the first repaint follows
    RendererReady,
    /// The model was mutated
    ModelChanged(ModelChange),
}

/// A change requested by a collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Merge the selected range
    MergeSelection(CellRange),
    /// Split the merge covering a cell
    SplitSelection { row: u32, column: u32 },
    /// Hide every row touched by the selected ranges
    HideRows(Vec<CellRange>),
    /// Hide every column touched by the selected ranges
    HideColumns(Vec<CellRange>),
    /// Show every hidden row and column
    ShowAll,
}

type EngineListener = Box<dyn FnMut(&EngineEvent)>;

/// Owns a [`CellModel`] and a [`Renderer`]
pub struct TableEngine<R: Renderer> {
    model: CellModel,
    renderer: R,
    listeners: Vec<EngineListener>,
    pending: Rc<RefCell<Vec<ModelChange>>>,
    subscription: Option<SubscriptionId>,
    ready: bool,
}

impl<R: Renderer> TableEngine<R> {
    /// Take ownership of a model and a renderer
    ///
    /// Nothing is drawn until [`TableEngine::initialize`] is called, so
    /// listeners registered in between see [`EngineEvent::RendererReady`].
    pub fn new(mut model: CellModel, renderer: R) -> Self {
        let pending = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pending);
        let subscription =
            model.subscribe(move |change: &ModelChange| sink.borrow_mut().push(change.clone()));

        Self {
            model,
            renderer,
            listeners: Vec::new(),
            pending,
            subscription: Some(subscription),
            ready: false,
        }
    }

    /// Initialize the renderer, announce it and draw the first frame
    pub fn initialize(&mut self) {
        if self.ready {
            return;
        }
        self.renderer.initialize(&self.model);
        self.ready = true;
        debug!("renderer ready");
        self.emit(&EngineEvent::RendererReady);
        self.repaint();
    }

    /// Whether [`TableEngine::initialize`] has run
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The cell model
    pub fn cell_model(&self) -> &CellModel {
        &self.model
    }

    /// The cell model, for edits issued by the engine's owner
    ///
    /// Changes made here reach engine listeners on the next
    /// [`TableEngine::repaint`].
    pub fn cell_model_mut(&mut self) -> &mut CellModel {
        &mut self.model
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, to reconfigure it before the next repaint
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Register a listener for engine events
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Apply a collaborator's request
    ///
    /// Returns whether the model changed. A merge that conflicts with an
    /// existing one returns `Ok(false)`. The view is repainted after every
    /// change.
    pub fn apply(&mut self, intent: Intent) -> Result<bool> {
        trace!(?intent, "applying intent");
        let queued = self.pending.borrow().len();
        match intent {
            Intent::MergeSelection(range) => {
                self.model.merge_cells(&range)?;
            }
            Intent::SplitSelection { row, column } => {
                self.model.split_cell(row, column);
            }
            Intent::HideRows(ranges) => {
                let rows = touched(&ranges, |r| (r.start.row, r.end.row));
                self.model.hide_rows(&rows)?;
            }
            Intent::HideColumns(ranges) => {
                let cols = touched(&ranges, |r| (r.start.col, r.end.col));
                self.model.hide_columns(&cols)?;
            }
            Intent::ShowAll => self.model.show_all(),
        }

        let changed = self.pending.borrow().len() > queued;
        if changed {
            self.repaint();
        }
        Ok(changed)
    }

    /// Deliver pending model changes and draw the current state
    pub fn repaint(&mut self) {
        let changes: Vec<ModelChange> = self.pending.borrow_mut().drain(..).collect();
        for change in changes {
            self.emit(&EngineEvent::ModelChanged(change));
        }
        if self.ready {
            self.renderer.render(&self.model);
        }
    }

    /// Release the renderer and detach every listener
    pub fn cleanup(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.model.unsubscribe(id);
        }
        self.pending.borrow_mut().clear();
        self.listeners.clear();
        if self.ready {
            self.renderer.cleanup();
            self.ready = false;
        }
        debug!("engine cleaned up");
    }

    /// Take the model and renderer back
    pub fn into_parts(mut self) -> (CellModel, R) {
        self.cleanup();
        (self.model, self.renderer)
    }

    fn emit(&mut self, event: &EngineEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }
}

impl<R: Renderer> fmt::Debug for TableEngine<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEngine")
            .field("model", &self.model)
            .field("listeners", &self.listeners.len())
            .field("ready", &self.ready)
            .finish()
    }
}

/// Every index along one axis covered by any of the ranges, ascending and
/// without duplicates
fn touched(ranges: &[CellRange], span: impl Fn(&CellRange) -> (u32, u32)) -> Vec<u32> {
    let mut indices: Vec<u32> = ranges
        .iter()
        .flat_map(|range| {
            let (start, end) = span(range);
            start..=end
        })
        .collect();
    indices.sort_unstable();
    indices.dedup();
    indices
}
