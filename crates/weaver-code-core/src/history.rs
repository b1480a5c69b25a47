//! Undo/redo history over snapshots of editor state.
//!
//! The manager keeps a bounded stack of states captured from a client and
//! restores them through the same client. Consecutive pushes of equivalent
//! states coalesce into one entry, so selection changes alone never create
//! undo steps.

use crate::error::HistoryError;

/// Default cap on history entries.
pub const MAX_HISTORY: usize = 300;

/// Source and sink of history snapshots.
pub trait HistoryClient<T> {
    /// Capture the live state.
    fn current_state(&self) -> T;

    /// Whether two states differ only in ways that should not create an undo step.
    fn states_are_equivalent(&self, a: &T, b: &T) -> bool;

    /// Make `state` live.
    fn restore_state(&self, state: &T);
}

/// Bounded snapshot stack with a cursor.
pub struct UndoRedoManager<T> {
    client: Option<Box<dyn HistoryClient<T>>>,
    entries: Vec<T>,
    /// Cursor into `entries`; `None` while empty.
    index: Option<usize>,
    max_entries: usize,
}

impl<T> Default for UndoRedoManager<T> {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl<T> std::fmt::Debug for UndoRedoManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoRedoManager")
            .field("attached", &self.client.is_some())
            .field("len", &self.entries.len())
            .field("index", &self.index)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl<T> UndoRedoManager<T> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            client: None,
            entries: Vec::new(),
            index: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Attach the client that states are captured from and restored to.
    pub fn attach(&mut self, client: impl HistoryClient<T> + 'static) {
        self.client = Some(Box::new(client));
    }

    pub fn is_attached(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&dyn HistoryClient<T>, HistoryError> {
        self.client.as_deref().ok_or(HistoryError::NoClient)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `None` while empty.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Change the cap, evicting the oldest entries if needed.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        self.trim();
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.index.is_some_and(|i| i + 1 < self.entries.len())
    }

    /// Whether the live state has drifted from the entry under the cursor.
    pub fn dirty(&self) -> Result<bool, HistoryError> {
        let client = self.client()?;
        let Some(entry) = self.index.and_then(|i| self.entries.get(i)) else {
            return Ok(true);
        };
        Ok(!client.states_are_equivalent(&client.current_state(), entry))
    }

    /// Record the live state.
    ///
    /// An equivalent state replaces the entry under the cursor; anything else
    /// discards the redo branch and appends.
    pub fn push(&mut self) -> Result<(), HistoryError> {
        let client = self.client()?;
        let state = client.current_state();

        if let Some(i) = self.index {
            if client.states_are_equivalent(&state, &self.entries[i]) {
                self.entries[i] = state;
                tracing::trace!(target: "weaver_code::history", index = i, "coalesced entry");
                return Ok(());
            }
            self.entries.truncate(i + 1);
        }

        self.entries.push(state);
        self.trim();
        self.index = Some(self.entries.len() - 1);
        tracing::debug!(
            target: "weaver_code::history",
            len = self.entries.len(),
            "pushed entry"
        );
        Ok(())
    }

    /// Step back one entry. Returns whether anything was restored.
    pub fn undo(&mut self) -> Result<bool, HistoryError> {
        let client = self.client()?;
        let Some(i) = self.index.filter(|i| *i > 0) else {
            return Ok(false);
        };
        tracing::debug!(target: "weaver_code::history", index = i - 1, "undo");
        client.restore_state(&self.entries[i - 1]);
        self.index = Some(i - 1);
        Ok(true)
    }

    /// Step forward one entry. Returns whether anything was restored.
    pub fn redo(&mut self) -> Result<bool, HistoryError> {
        let client = self.client()?;
        let Some(i) = self.index.filter(|i| i + 1 < self.entries.len()) else {
            return Ok(false);
        };
        tracing::debug!(target: "weaver_code::history", index = i + 1, "redo");
        client.restore_state(&self.entries[i + 1]);
        self.index = Some(i + 1);
        Ok(true)
    }

    /// Drop all history and record the live state as the only entry.
    pub fn reset(&mut self) -> Result<(), HistoryError> {
        let state = self.client()?.current_state();
        self.entries.clear();
        self.entries.push(state);
        self.index = Some(0);
        tracing::debug!(target: "weaver_code::history", "reset");
        Ok(())
    }

    fn trim(&mut self) {
        let excess = self.entries.len().saturating_sub(self.max_entries);
        if excess > 0 {
            self.entries.drain(..excess);
            self.index = self.index.map(|i| i.saturating_sub(excess));
        }
    }
}
