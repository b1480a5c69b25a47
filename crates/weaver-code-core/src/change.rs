//! Change classification and listener registries.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::TextDocument;

/// How a document differs from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Strictly equal.
    None,
    /// Same text, different selection.
    Selection,
    /// Different text.
    Content,
}

pub fn classify_change(old: &TextDocument, new: &TextDocument) -> ChangeKind {
    if old.strict_equals(new) {
        ChangeKind::None
    } else if old.perceptually_equals(new) {
        ChangeKind::Selection
    } else {
        ChangeKind::Content
    }
}

/// Handle returned by `Listeners::add`.
///
/// Unique across every registry in the process, so an owner holding several
/// registries can try each one in turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(0);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Handler<E> = Rc<dyn Fn(&E)>;

/// Ordered list of callbacks.
///
/// Callbacks run in registration order. `snapshot` lets an owner clone the
/// list out of a `RefCell` and release the borrow before calling them.
pub struct Listeners<E: ?Sized> {
    handlers: Vec<(ListenerId, Handler<E>)>,
}

impl<E: ?Sized> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<E: ?Sized> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.handlers.len())
            .finish()
    }
}

impl<E: ?Sized> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, handler: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.handlers.push((id, Rc::new(handler)));
        id
    }

    /// Returns whether the listener was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _)| *hid != id);
        self.handlers.len() != before
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Handler<E>> {
        self.handlers.iter().map(|(_, h)| Rc::clone(h)).collect()
    }

    pub fn emit(&self, event: &E) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn test_classify_change() {
        let base = TextDocument::with_caret("abc", 1);
        assert_eq!(classify_change(&base, &base.clone()), ChangeKind::None);
        assert_eq!(
            classify_change(&base, &base.with_selection(0, 3)),
            ChangeKind::Selection
        );
        assert_eq!(
            classify_change(&base, &base.insert_text("x").unwrap()),
            ChangeKind::Content
        );
        // Losing the selection is a selection change.
        assert_eq!(
            classify_change(&base, &base.without_selection()),
            ChangeKind::Selection
        );
    }

    #[test]
    fn test_listeners_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<u32> = Listeners::new();
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            listeners.add(move |n| log.borrow_mut().push(format!("{name}:{n}")));
        }
        listeners.emit(&7);
        assert_eq!(*log.borrow(), vec!["first:7", "second:7", "third:7"]);
    }

    #[test]
    fn test_remove_listener() {
        let hits = Rc::new(RefCell::new(0));
        let mut listeners: Listeners<()> = Listeners::new();
        let h = Rc::clone(&hits);
        let id = listeners.add(move |_| *h.borrow_mut() += 1);
        let h = Rc::clone(&hits);
        listeners.add(move |_| *h.borrow_mut() += 10);

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        for handler in listeners.snapshot() {
            handler(&());
        }
        assert_eq!(*hits.borrow(), 10);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn test_ids_are_unique_across_registries() {
        let updates_hit = Rc::new(RefCell::new(0));
        let mut updates: Listeners<str> = Listeners::new();
        let mut selections: Listeners<bool> = Listeners::new();
        let h = Rc::clone(&updates_hit);
        let update_id = updates.add(move |_| *h.borrow_mut() += 1);
        let selection_id = selections.add(|_| {});
        assert_ne!(update_id, selection_id);

        // Removing through both registries only touches the owner of the id.
        let removed = updates.remove(selection_id) || selections.remove(selection_id);
        assert!(removed);
        assert_eq!(updates.len(), 1);
        assert!(selections.is_empty());
        updates.emit("x");
        assert_eq!(*updates_hit.borrow(), 1);
    }
}
