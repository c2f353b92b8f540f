//! Change notification
//!
//! Listeners are plain closures invoked synchronously, in subscription order,
//! after each successful mutation.

use std::fmt;

use tracing::trace;

use crate::cell::CellRange;
use crate::geometry::Axis;

/// A successful mutation of a [`CellModel`](crate::CellModel)
#[derive(Debug, Clone, PartialEq)]
pub enum ModelChange {
    /// Cell content was written or cleared
    CellsChanged { range: CellRange },
    /// Explicit sizes were set
    Resized { axis: Axis, indices: Vec<u32> },
    /// Indices were hidden or shown (only those whose state changed)
    VisibilityChanged { axis: Axis, indices: Vec<u32> },
    /// `count` indices were inserted starting at `index`
    Inserted { axis: Axis, index: u32, count: u32 },
    /// `count` indices were deleted starting at `index`
    Deleted { axis: Axis, index: u32, count: u32 },
    /// A range was merged
    Merged { range: CellRange },
    /// A merged region was split
    Split { range: CellRange },
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&ModelChange)>;

/// Ordered list of change listeners
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn notify(&mut self, change: &ModelChange) {
        if self.entries.is_empty() {
            return;
        }
        trace!(listeners = self.entries.len(), ?change, "notifying listeners");
        for (_, listener) in &mut self.entries {
            listener(change);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();

        let first = Rc::clone(&log);
        listeners.subscribe(Box::new(move |_: &ModelChange| {
            first.borrow_mut().push("first")
        }));
        let second = Rc::clone(&log);
        listeners.subscribe(Box::new(move |_: &ModelChange| {
            second.borrow_mut().push("second")
        }));

        listeners.notify(&ModelChange::Inserted {
            axis: Axis::Row,
            index: 0,
            count: 1,
        });

        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::default();
        let counter = Rc::clone(&hits);
        let id = listeners.subscribe(Box::new(move |_: &ModelChange| {
            *counter.borrow_mut() += 1
        }));

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert_eq!(listeners.len(), 0);

        listeners.notify(&ModelChange::Split {
            range: CellRange::from_indices(0, 0, 1, 1),
        });
        assert_eq!(*hits.borrow(), 0);
    }
}
