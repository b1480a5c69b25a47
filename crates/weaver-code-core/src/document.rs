//! The immutable text document model.
//!
//! A `TextDocument` is the full editor content plus an anchor/focus selection.
//! Every transform returns a new document; nothing is mutated in place, so
//! documents can be shared freely between the DOM bridge, the input pipeline
//! and the undo history.

use std::fmt;
use std::sync::Arc;

use crate::error::DocumentError;
use crate::text::{normalize_line_endings, slice_utf16, utf16_len, utf16_to_byte};
use crate::text_helpers::{
    find_line_end, find_line_start, find_word_boundary_forward, find_word_end, find_word_start,
};

/// What kind of selection a document carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionType {
    /// No active selection (the editor is not focused, or nothing was read).
    None,
    /// Collapsed selection.
    Caret,
    /// Non-empty selection.
    Range,
}

/// Direction of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Anchor at or before focus.
    #[default]
    Forward,
    /// Focus before anchor.
    Backward,
}

/// Immutable document: text plus selection.
///
/// Offsets are UTF-16 code units into `text` and always lie within
/// `0..=len()`.
#[derive(Clone)]
pub struct TextDocument {
    text: Arc<str>,
    len: usize,
    anchor: usize,
    focus: usize,
    has_selection: bool,
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Debug for TextDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDocument")
            .field("text", &&*self.text)
            .field("anchor", &self.anchor)
            .field("focus", &self.focus)
            .field("selection_type", &self.selection_type())
            .finish()
    }
}

impl PartialEq for TextDocument {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl Eq for TextDocument {}

impl TextDocument {
    /// Create a document without a selection. Line endings are normalized.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text: Arc<str> = normalize_line_endings(text.as_ref()).into();
        Self {
            len: utf16_len(&text),
            text,
            anchor: 0,
            focus: 0,
            has_selection: false,
        }
    }

    /// Create a document with a selection. Offsets are clamped into range.
    pub fn with_text_and_selection(text: impl AsRef<str>, anchor: usize, focus: usize) -> Self {
        Self::new(text).with_selection(anchor, focus)
    }

    /// Create a document with a caret at `offset`.
    pub fn with_caret(text: impl AsRef<str>, offset: usize) -> Self {
        Self::with_text_and_selection(text, offset, offset)
    }

    // === Accessors ===

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn anchor(&self) -> usize {
        self.anchor
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn has_selection(&self) -> bool {
        self.has_selection
    }

    pub fn selection_type(&self) -> SelectionType {
        if !self.has_selection {
            SelectionType::None
        } else if self.anchor == self.focus {
            SelectionType::Caret
        } else {
            SelectionType::Range
        }
    }

    pub fn direction(&self) -> Direction {
        if self.anchor <= self.focus {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    pub fn earliest(&self) -> usize {
        self.anchor.min(self.focus)
    }

    pub fn latest(&self) -> usize {
        self.anchor.max(self.focus)
    }

    /// Text before the selection.
    pub fn preceding_text(&self) -> &str {
        slice_utf16(&self.text, 0, self.earliest())
    }

    /// Text inside the selection.
    pub fn selected_text(&self) -> &str {
        slice_utf16(&self.text, self.earliest(), self.latest())
    }

    /// Text after the selection.
    pub fn following_text(&self) -> &str {
        slice_utf16(&self.text, self.latest(), self.len)
    }

    pub fn character_before(&self) -> Option<char> {
        self.preceding_text().chars().next_back()
    }

    pub fn character_after(&self) -> Option<char> {
        self.following_text().chars().next()
    }

    /// Number of lines (a trailing newline starts an empty final line).
    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }

    // === Equality ===

    /// Same content and same selection: type, direction and all three slices.
    pub fn strict_equals(&self, other: &Self) -> bool {
        self.selection_type() == other.selection_type()
            && self.direction() == other.direction()
            && self.preceding_text() == other.preceding_text()
            && self.selected_text() == other.selected_text()
            && self.following_text() == other.following_text()
    }

    /// Same content; selection may differ.
    pub fn perceptually_equals(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.text, &other.text) || self.text == other.text
    }

    // === Selection replacement (always valid) ===

    /// Same text, new selection. Offsets are clamped into range.
    pub fn with_selection(&self, anchor: usize, focus: usize) -> Self {
        Self {
            text: Arc::clone(&self.text),
            len: self.len,
            anchor: anchor.min(self.len),
            focus: focus.min(self.len),
            has_selection: true,
        }
    }

    /// Same text, no selection.
    pub fn without_selection(&self) -> Self {
        Self {
            text: Arc::clone(&self.text),
            len: self.len,
            anchor: 0,
            focus: 0,
            has_selection: false,
        }
    }

    /// Same text, whole document selected.
    pub fn select_all(&self) -> Self {
        self.with_selection(0, self.len)
    }

    /// New text, selection kept where it still fits.
    pub fn with_text(&self, text: impl AsRef<str>) -> Self {
        let next = Self::new(text);
        if self.has_selection {
            next.with_selection(self.anchor, self.focus)
        } else {
            next
        }
    }

    // === Transforms ===

    fn require_selection(&self, operation: &'static str) -> Result<(), DocumentError> {
        if self.has_selection {
            Ok(())
        } else {
            Err(DocumentError::no_selection(operation))
        }
    }

    /// Keep direction while moving both ends to `start..end`.
    fn with_ordered_selection(&self, start: usize, end: usize, direction: Direction) -> Self {
        match direction {
            Direction::Forward => self.with_selection(start, end),
            Direction::Backward => self.with_selection(end, start),
        }
    }

    /// Collapse to a caret at the earliest end.
    pub fn collapse_to_start(&self) -> Result<Self, DocumentError> {
        self.require_selection("collapse_to_start")?;
        let offset = self.earliest();
        Ok(self.with_selection(offset, offset))
    }

    /// Collapse to a caret at the latest end.
    pub fn collapse_to_end(&self) -> Result<Self, DocumentError> {
        self.require_selection("collapse_to_end")?;
        let offset = self.latest();
        Ok(self.with_selection(offset, offset))
    }

    /// Move the caret over the next character without changing text.
    ///
    /// Used to type over an existing closing bracket.
    pub fn skip_character(&self) -> Result<Self, DocumentError> {
        match self.selection_type() {
            SelectionType::None => Err(DocumentError::no_selection("skip_character")),
            SelectionType::Range => Err(DocumentError::NotACaret {
                operation: "skip_character",
            }),
            SelectionType::Caret => {
                let step = self.character_after().map(char::len_utf16).unwrap_or(0);
                let offset = self.focus + step;
                Ok(self.with_selection(offset, offset))
            }
        }
    }

    /// Move the caret past the current word run and the separators after it.
    pub fn skip_word(&self) -> Result<Self, DocumentError> {
        self.require_selection("skip_word")?;
        let offset = find_word_boundary_forward(&self.text, self.focus);
        Ok(self.with_selection(offset, offset))
    }

    /// Grow the selection to whole lines, keeping its direction.
    pub fn expand_to_cover_lines(&self) -> Result<Self, DocumentError> {
        self.require_selection("expand_to_cover_lines")?;
        let start = find_line_start(&self.text, self.earliest());
        let end = find_line_end(&self.text, self.latest());
        Ok(self.with_ordered_selection(start, end, self.direction()))
    }

    /// Grow the selection over the word runs touching its ends, keeping its direction.
    pub fn expand_to_cover_words(&self) -> Result<Self, DocumentError> {
        self.require_selection("expand_to_cover_words")?;
        let start = find_word_start(&self.text, self.earliest());
        let end = find_word_end(&self.text, self.latest());
        Ok(self.with_ordered_selection(start, end, self.direction()))
    }

    /// Remove the selected range and leave a caret where it started.
    pub fn delete_selection(&self) -> Result<Self, DocumentError> {
        self.require_selection("delete_selection")?;
        let start = self.earliest();
        if self.selection_type() == SelectionType::Caret {
            return Ok(self.clone());
        }
        let start_byte = utf16_to_byte(&self.text, start);
        let end_byte = utf16_to_byte(&self.text, self.latest());

        let mut text = String::with_capacity(self.text.len() - (end_byte - start_byte));
        text.push_str(&self.text[..start_byte]);
        text.push_str(&self.text[end_byte..]);

        Ok(Self::new(text).with_selection(start, start))
    }

    /// Insert text at the selection, moving both ends past it.
    pub fn insert_text(&self, new_text: &str) -> Result<Self, DocumentError> {
        self.insert_text_with(new_text, true, true)
    }

    /// Insert text at the selection, replacing any selected range.
    ///
    /// `advance_anchor`/`advance_focus` choose whether each end of the
    /// resulting selection moves past the inserted text. Inserting a closing
    /// bracket with neither advanced leaves the caret before it.
    pub fn insert_text_with(
        &self,
        new_text: &str,
        advance_anchor: bool,
        advance_focus: bool,
    ) -> Result<Self, DocumentError> {
        self.require_selection("insert_text")?;
        let base = self.delete_selection()?;
        let caret = base.earliest();
        let new_text = normalize_line_endings(new_text);
        let inserted = utf16_len(&new_text);

        let at = utf16_to_byte(&base.text, caret);
        let mut text = String::with_capacity(base.text.len() + new_text.len());
        text.push_str(&base.text[..at]);
        text.push_str(&new_text);
        text.push_str(&base.text[at..]);

        let anchor = if advance_anchor { caret + inserted } else { caret };
        let focus = if advance_focus { caret + inserted } else { caret };
        Ok(Self::new(text).with_selection(anchor, focus))
    }
}

/// Mutable scratch space for assembling a document while walking the DOM.
///
/// Text is appended chunk by chunk; anchor and focus are recorded when the
/// walk reaches the selection's nodes. `build` freezes the result.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    text: String,
    len: usize,
    anchor: Option<usize>,
    focus: Option<usize>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text.
    pub fn push_str(&mut self, chunk: &str) {
        self.len += utf16_len(chunk);
        self.text.push_str(chunk);
    }

    /// Current length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the accumulated text ends with a newline (or is empty).
    pub fn at_line_start(&self) -> bool {
        self.text.is_empty() || self.text.ends_with('\n')
    }

    /// Record the anchor at the current position plus `offset`.
    pub fn mark_anchor(&mut self, offset: usize) {
        if self.anchor.is_none() {
            self.anchor = Some(self.len + offset);
        }
    }

    /// Record the focus at the current position plus `offset`.
    pub fn mark_focus(&mut self, offset: usize) {
        if self.focus.is_none() {
            self.focus = Some(self.len + offset);
        }
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Freeze into a document.
    ///
    /// If only one end was found it is used for both; if neither, the
    /// document has no selection.
    pub fn build(self) -> TextDocument {
        let doc = TextDocument::new(self.text);
        match (self.anchor, self.focus) {
            (Some(anchor), Some(focus)) => doc.with_selection(anchor, focus),
            (Some(offset), None) | (None, Some(offset)) => doc.with_selection(offset, offset),
            (None, None) => doc,
        }
    }
}
