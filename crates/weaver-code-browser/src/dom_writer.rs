//! Writing documents back into the editor DOM.
//!
//! Two paths: a selection-only write that just moves the native selection,
//! and a full content write that rebuilds the line markup. Offsets are
//! mapped to DOM positions with the same flattening rules the reader uses,
//! so a write followed by a read gives back the same document.

use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Node, Selection};
use weaver_code_core::text::utf16_len;
use weaver_code_core::{LineLayout, TextDocument};

use crate::dom_reader::{FILLER_ATTR, NodeKind, classify};
use crate::error::DomError;

/// Class of the per-line container.
pub const LINE_CLASS: &str = "weaver-code-line";

/// Opaque syntax highlighter.
///
/// Receives the editor element after its text has been written. It may
/// change markup freely but must leave the character sequence alone.
pub trait Highlighter {
    fn highlight(&self, element: &HtmlElement);
}

impl<F: Fn(&HtmlElement)> Highlighter for F {
    fn highlight(&self, element: &HtmlElement) {
        self(element)
    }
}

/// A point in the DOM: UTF-16 offset for text nodes, child index for elements.
#[derive(Debug, Clone, PartialEq)]
pub struct DomPosition {
    pub node: Node,
    pub offset: u32,
}

impl DomPosition {
    fn new(node: impl Into<Node>, offset: usize) -> Self {
        Self {
            node: node.into(),
            offset: offset as u32,
        }
    }
}

pub(crate) fn dom_document() -> Result<web_sys::Document, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .document()
        .ok_or(DomError::NoDocument)
}

/// The window's native selection object.
pub fn native_selection() -> Result<Selection, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .get_selection()
        .map_err(|e| DomError::js("get_selection", e))?
        .ok_or(DomError::NoSelection)
}

fn apply_selection(anchor: &DomPosition, focus: &DomPosition) -> Result<(), DomError> {
    native_selection()?
        .set_base_and_extent(&anchor.node, anchor.offset, &focus.node, focus.offset)
        .map_err(|e| DomError::js("set_base_and_extent", e))
}

/// Resolves text offsets to DOM positions in one walk.
struct Locator<'a> {
    root: &'a Node,
    /// (offset, slot) sorted by offset.
    targets: Vec<(usize, usize)>,
    next: usize,
    acc: usize,
    at_line_start: bool,
    found: Vec<Option<DomPosition>>,
}

impl Locator<'_> {
    fn pending(&self) -> Option<usize> {
        self.targets.get(self.next).map(|(offset, _)| *offset)
    }

    fn resolve(&mut self, position: DomPosition) {
        let slot = self.targets[self.next].1;
        self.found[slot] = Some(position);
        self.next += 1;
    }

    fn children(&mut self, parent: &Node) {
        let children = parent.child_nodes();
        for i in 0..children.length() {
            if self.pending().is_none() {
                return;
            }
            let Some(child) = children.get(i) else {
                continue;
            };
            match classify(&child, self.root) {
                NodeKind::Text(data) => {
                    let len = utf16_len(&data);
                    let ends_line = data.ends_with('\n');
                    while let Some(target) = self.pending() {
                        // A position right after a newline belongs to the next line.
                        let end = self.acc + len;
                        let inside = target < end || (target == end && !ends_line);
                        if !inside {
                            break;
                        }
                        let offset = target.saturating_sub(self.acc);
                        self.resolve(DomPosition::new(child.clone(), offset));
                    }
                    self.acc += len;
                    if len > 0 {
                        self.at_line_start = ends_line;
                    }
                }
                NodeKind::Break => {
                    while self.pending() == Some(self.acc) {
                        self.resolve(DomPosition::new(parent.clone(), i as usize));
                    }
                    self.acc += 1;
                    self.at_line_start = true;
                }
                NodeKind::Filler => {
                    while self.pending() == Some(self.acc) {
                        self.resolve(DomPosition::new(parent.clone(), i as usize));
                    }
                }
                NodeKind::Block => {
                    if !self.at_line_start {
                        self.acc += 1;
                        self.at_line_start = true;
                    }
                    self.children(&child);
                }
                NodeKind::Inline => self.children(&child),
                NodeKind::Skip => {}
            }
        }
    }
}

/// Map text offsets to DOM positions inside `editor`.
///
/// Offsets past the end of the content resolve to the end of the editor.
pub fn locate_offsets(editor: &HtmlElement, offsets: &[usize]) -> Vec<DomPosition> {
    let root: &Node = editor.as_ref();
    let mut targets: Vec<(usize, usize)> = offsets.iter().copied().zip(0..).collect();
    targets.sort_unstable();

    let mut locator = Locator {
        root,
        targets,
        next: 0,
        acc: 0,
        at_line_start: true,
        found: vec![None; offsets.len()],
    };
    locator.children(root);

    let end = DomPosition::new(root.clone(), root.child_nodes().length() as usize);
    locator
        .found
        .into_iter()
        .map(|p| p.unwrap_or_else(|| end.clone()))
        .collect()
}

/// Move the native selection to the document's selection without touching content.
pub fn write_selection(editor: &HtmlElement, doc: &TextDocument) -> Result<(), DomError> {
    if !doc.has_selection() {
        return Ok(());
    }
    let positions = locate_offsets(editor, &[doc.anchor(), doc.focus()]);
    tracing::trace!(
        target: "weaver_code::writer",
        anchor = doc.anchor(),
        focus = doc.focus(),
        "selection-only write"
    );
    apply_selection(&positions[0], &positions[1])
}

/// Rebuild the editor's line markup from `doc` and restore its selection.
pub fn write_content(
    editor: &HtmlElement,
    doc: &TextDocument,
    highlighter: Option<&dyn Highlighter>,
) -> Result<(), DomError> {
    let document = dom_document()?;
    let scroll_top = editor.scroll_top();
    let scroll_left = editor.scroll_left();

    let layout = LineLayout::new(doc.text());
    let fragment = document.create_document_fragment();
    let ends = [doc.anchor(), doc.focus()];
    let mut tracked: [Option<DomPosition>; 2] = [None, None];

    for line in layout.lines() {
        let span = document
            .create_element("span")
            .map_err(|e| DomError::js("create_element", e))?;
        span.set_class_name(LINE_CLASS);

        let text = if line.text.is_empty() {
            None
        } else {
            let node = document.create_text_node(&line.text);
            span.append_child(&node)
                .map_err(|e| DomError::js("append_child", e))?;
            Some(node)
        };
        let marker = if line.break_marker {
            let node = document.create_text_node("\n");
            span.append_child(&node)
                .map_err(|e| DomError::js("append_child", e))?;
            Some(node)
        } else {
            None
        };
        if line.filler {
            let br = document
                .create_element("br")
                .map_err(|e| DomError::js("create_element", e))?;
            br.set_attribute(FILLER_ATTR, "")
                .map_err(|e| DomError::js("set_attribute", e))?;
            span.append_child(&br)
                .map_err(|e| DomError::js("append_child", e))?;
        }

        if doc.has_selection() {
            for (slot, offset) in ends.iter().enumerate() {
                if tracked[slot].is_some() || !(line.start..=line.end()).contains(offset) {
                    continue;
                }
                let column = offset - line.start;
                tracked[slot] = Some(match (&text, &marker) {
                    (Some(text), _) => DomPosition::new(text.clone(), column),
                    (None, Some(marker)) => DomPosition::new(marker.clone(), 0),
                    (None, None) => DomPosition::new(span.clone(), 0),
                });
            }
        }

        fragment
            .append_child(&span)
            .map_err(|e| DomError::js("append_child", e))?;
    }

    editor.set_text_content(None);
    editor
        .append_child(&fragment)
        .map_err(|e| DomError::js("append_child", e))?;

    if let Some(highlighter) = highlighter {
        highlighter.highlight(editor);
    }

    editor.set_scroll_top(scroll_top);
    editor.set_scroll_left(scroll_left);

    tracing::trace!(
        target: "weaver_code::writer",
        lines = layout.len(),
        highlighted = highlighter.is_some(),
        "full content write"
    );

    if !doc.has_selection() {
        return Ok(());
    }

    let root: &Node = editor.as_ref();
    let still_attached = tracked
        .iter()
        .all(|p| p.as_ref().is_some_and(|p| root.contains(Some(&p.node))));
    let [anchor, focus] = match tracked {
        [Some(anchor), Some(focus)] if still_attached => [anchor, focus],
        _ => {
            // The highlighter replaced our nodes; find the offsets again.
            tracing::trace!(target: "weaver_code::writer", "re-resolving selection after highlight");
            let mut positions = locate_offsets(editor, &ends).into_iter();
            match (positions.next(), positions.next()) {
                (Some(anchor), Some(focus)) => [anchor, focus],
                _ => return Ok(()),
            }
        }
    };
    apply_selection(&anchor, &focus)
}

/// Re-run the highlighter over unchanged content.
///
/// The native selection is put back only when `selection` is given; a
/// blurred editor passes `None` so the caret is not pulled back into it.
pub fn rehighlight(
    editor: &HtmlElement,
    highlighter: &dyn Highlighter,
    selection: Option<&TextDocument>,
) -> Result<(), DomError> {
    let scroll_top = editor.scroll_top();
    let scroll_left = editor.scroll_left();
    highlighter.highlight(editor);
    editor.set_scroll_top(scroll_top);
    editor.set_scroll_left(scroll_left);
    tracing::trace!(
        target: "weaver_code::writer",
        restore_selection = selection.is_some(),
        "rehighlighted"
    );
    match selection {
        Some(doc) => write_selection(editor, doc),
        None => Ok(()),
    }
}

/// Whether `node` is an element carrying the line class.
pub fn is_line_container(node: &Node) -> bool {
    node.dyn_ref::<web_sys::Element>()
        .is_some_and(|e| e.class_list().contains(LINE_CLASS))
}
