//! The DOM bridge: owner of the current document.
//!
//! Every read from and write to the editor element goes through here. The
//! bridge classifies each transition (selection-only or content) and fires
//! the matching listeners after its own state borrow is released, so
//! listeners may call back into the bridge.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node};
use weaver_code_core::{
    ChangeKind, LineLayout, ListenerId, Listeners, TextDocument, classify_change,
};

use crate::dom_reader::read_document;
use crate::dom_writer::{
    Highlighter, dom_document, locate_offsets, native_selection, rehighlight, write_content,
    write_selection,
};
use crate::error::DomError;

/// Vertical placement of one rendered line, relative to the editor's content box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineMetric {
    pub top: f64,
    pub height: f64,
}

#[derive(Default)]
struct BridgeState {
    document: TextDocument,
    line_metrics: Vec<LineMetric>,
}

type DocListeners = RefCell<Listeners<TextDocument>>;

pub struct DomBridge {
    editor: HtmlElement,
    state: RefCell<BridgeState>,
    highlighter: RefCell<Option<Rc<dyn Highlighter>>>,
    selection_changed: DocListeners,
    content_changed: DocListeners,
    line_metrics_changed: RefCell<Listeners<[LineMetric]>>,
}

impl DomBridge {
    /// Attach to `editor`, whose current content becomes the initial document.
    pub fn new(editor: HtmlElement) -> Self {
        let document = TextDocument::new(crate::dom_reader::read_text(&editor));
        Self {
            editor,
            state: RefCell::new(BridgeState {
                document,
                line_metrics: Vec::new(),
            }),
            highlighter: RefCell::new(None),
            selection_changed: RefCell::default(),
            content_changed: RefCell::default(),
            line_metrics_changed: RefCell::default(),
        }
    }

    pub fn editor(&self) -> &HtmlElement {
        &self.editor
    }

    /// The current document.
    pub fn document(&self) -> TextDocument {
        self.state.borrow().document.clone()
    }

    pub fn line_metrics(&self) -> Vec<LineMetric> {
        self.state.borrow().line_metrics.clone()
    }

    pub fn set_highlighter(&self, highlighter: Option<Rc<dyn Highlighter>>) {
        *self.highlighter.borrow_mut() = highlighter;
    }

    pub fn has_highlighter(&self) -> bool {
        self.highlighter.borrow().is_some()
    }

    // === Listeners ===

    pub fn on_selection_changed(&self, f: impl Fn(&TextDocument) + 'static) -> ListenerId {
        self.selection_changed.borrow_mut().add(f)
    }

    pub fn on_content_changed(&self, f: impl Fn(&TextDocument) + 'static) -> ListenerId {
        self.content_changed.borrow_mut().add(f)
    }

    pub fn on_line_metrics_changed(&self, f: impl Fn(&[LineMetric]) + 'static) -> ListenerId {
        self.line_metrics_changed.borrow_mut().add(f)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.selection_changed.borrow_mut().remove(id)
            || self.content_changed.borrow_mut().remove(id)
            || self.line_metrics_changed.borrow_mut().remove(id)
    }

    pub fn clear_listeners(&self) {
        self.selection_changed.borrow_mut().clear();
        self.content_changed.borrow_mut().clear();
        self.line_metrics_changed.borrow_mut().clear();
    }

    fn notify(&self, kind: ChangeKind, doc: &TextDocument) {
        let handlers = match kind {
            ChangeKind::None => return,
            ChangeKind::Selection => self.selection_changed.borrow().snapshot(),
            ChangeKind::Content => self.content_changed.borrow().snapshot(),
        };
        for handler in handlers {
            handler(doc);
        }
    }

    // === Transitions ===

    fn commit(&self, doc: TextDocument) -> Result<ChangeKind, DomError> {
        let kind = {
            let mut state = self.state.borrow_mut();
            let kind = classify_change(&state.document, &doc);
            if kind != ChangeKind::None {
                state.document = doc.clone();
            }
            kind
        };
        self.notify(kind, &doc);
        if kind == ChangeKind::Content {
            self.recompute_line_metrics()?;
        }
        Ok(kind)
    }

    /// Read the DOM and adopt whatever changed.
    pub fn poll(&self) -> Result<ChangeKind, DomError> {
        let selection = native_selection()?;
        let candidate = read_document(&self.editor, &selection)?;
        let kind = self.commit(candidate)?;
        if kind != ChangeKind::None {
            tracing::trace!(target: "weaver_code::bridge", ?kind, "poll picked up change");
        }
        Ok(kind)
    }

    /// Write `doc` into the DOM, touching only the selection when the text is unchanged.
    pub fn push_to_dom(&self, doc: TextDocument) -> Result<ChangeKind, DomError> {
        let same_text = self.state.borrow().document.perceptually_equals(&doc);
        if same_text {
            write_selection(&self.editor, &doc)?;
        } else {
            let highlighter = self.highlighter.borrow().clone();
            write_content(&self.editor, &doc, highlighter.as_deref())?;
        }
        tracing::trace!(
            target: "weaver_code::bridge",
            selection_only = same_text,
            len = doc.len(),
            "pushed document to DOM"
        );
        self.commit(doc)
    }

    /// Full write of `doc` whatever the bridge currently holds.
    ///
    /// Content listeners and metrics always run, so collaborators see the
    /// initial document even when it equals the empty starting state.
    pub fn render(&self, doc: TextDocument) -> Result<(), DomError> {
        let highlighter = self.highlighter.borrow().clone();
        write_content(&self.editor, &doc, highlighter.as_deref())?;
        self.state.borrow_mut().document = doc.clone();
        tracing::trace!(target: "weaver_code::bridge", len = doc.len(), "rendered document");
        self.notify(ChangeKind::Content, &doc);
        self.recompute_line_metrics()
    }

    /// Re-run the highlighter over the current document.
    ///
    /// With `restore_selection` unset the native selection is left alone.
    pub fn highlight(&self, restore_selection: bool) -> Result<(), DomError> {
        let Some(highlighter) = self.highlighter.borrow().clone() else {
            return Ok(());
        };
        let doc = self.document();
        rehighlight(
            &self.editor,
            highlighter.as_ref(),
            restore_selection.then_some(&doc),
        )
    }

    // === Line metrics ===

    /// Measure every line and notify listeners if anything moved.
    pub fn recompute_line_metrics(&self) -> Result<(), DomError> {
        let metrics = self.measure_lines()?;
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.line_metrics == metrics {
                false
            } else {
                state.line_metrics = metrics.clone();
                true
            }
        };
        if changed {
            tracing::trace!(target: "weaver_code::bridge", lines = metrics.len(), "line metrics changed");
            for handler in self.line_metrics_changed.borrow().snapshot() {
                handler(&metrics);
            }
        }
        Ok(())
    }

    fn measure_lines(&self) -> Result<Vec<LineMetric>, DomError> {
        let text = self.state.borrow().document.text().to_string();
        let layout = LineLayout::new(&text);
        let starts: Vec<usize> = layout.lines().iter().map(|l| l.start).collect();
        let positions = locate_offsets(&self.editor, &starts);

        let range = dom_document()?
            .create_range()
            .map_err(|e| DomError::js("create_range", e))?;
        let origin = self.editor.get_bounding_client_rect().top() - self.editor.scroll_top() as f64;

        let mut tops = Vec::with_capacity(positions.len());
        let mut previous = 0.0;
        for position in &positions {
            range
                .set_start(&position.node, position.offset)
                .map_err(|e| DomError::js("set_start", e))?;
            range.collapse_with_to_start(true);
            let rect = range.get_bounding_client_rect();
            let top = if rect.top() == 0.0 && rect.height() == 0.0 {
                // Collapsed ranges at element positions often report an empty rect.
                element_top(&position.node, position.offset).unwrap_or(previous + origin) - origin
            } else {
                rect.top() - origin
            };
            let top = top.max(previous);
            tops.push(top);
            previous = top;
        }

        let bottom = (self.editor.scroll_height() as f64).max(previous);
        Ok(tops
            .iter()
            .enumerate()
            .map(|(i, &top)| LineMetric {
                top,
                height: tops.get(i + 1).copied().unwrap_or(bottom) - top,
            })
            .collect())
    }
}

/// Client top of the element at or around a child-index position.
fn element_top(node: &Node, offset: u32) -> Option<f64> {
    let child = node.child_nodes().get(offset);
    let target = child
        .as_ref()
        .and_then(|c| c.dyn_ref::<Element>())
        .or_else(|| node.dyn_ref::<Element>())?;
    Some(target.get_bounding_client_rect().top())
}
