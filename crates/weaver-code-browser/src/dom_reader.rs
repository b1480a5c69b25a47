//! Reading a `TextDocument` out of the live editor DOM.
//!
//! The editor element is flattened depth-first: text nodes contribute their
//! data, `<br>` contributes a newline unless it is a placeholder, and block
//! wrappers the browser inserts (`div`, `p`) start a new line when text
//! precedes them. Selection endpoints are recorded when the walk reaches
//! them. Element-type endpoints (`(element, child_index)`) are resolved at
//! the matching child boundary.

use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node, Selection};
use weaver_code_core::text::{slice_utf16, utf16_len};
use weaver_code_core::{DocumentBuilder, TextDocument};

use crate::error::DomError;

/// Attribute marking a `<br>` that only gives an empty line its height.
pub const FILLER_ATTR: &str = "data-weaver-filler";

/// How a node contributes to the flattened text.
pub(crate) enum NodeKind {
    Text(String),
    /// A `<br>` that counts as a newline.
    Break,
    /// A placeholder `<br>` that contributes nothing.
    Filler,
    /// A block wrapper; opens a new line if text precedes it.
    Block,
    Inline,
    /// Non-editable or non-content node.
    Skip,
}

fn is_block_tag(tag: &str) -> bool {
    matches!(tag, "div" | "p" | "pre" | "li" | "section")
}

pub(crate) fn classify(node: &Node, root: &Node) -> NodeKind {
    match node.node_type() {
        Node::TEXT_NODE => NodeKind::Text(node.node_value().unwrap_or_default()),
        Node::ELEMENT_NODE => {
            let Some(element) = node.dyn_ref::<Element>() else {
                return NodeKind::Skip;
            };
            if element.get_attribute("contenteditable").as_deref() == Some("false") {
                return NodeKind::Skip;
            }
            let tag = element.tag_name().to_ascii_lowercase();
            if tag == "br" {
                if element.has_attribute(FILLER_ATTR) || is_trailing_placeholder(node, root) {
                    NodeKind::Filler
                } else {
                    NodeKind::Break
                }
            } else if is_block_tag(&tag) {
                NodeKind::Block
            } else {
                NodeKind::Inline
            }
        }
        _ => NodeKind::Skip,
    }
}

/// Browsers keep a trailing `<br>` in block containers so they have height.
fn is_trailing_placeholder(node: &Node, root: &Node) -> bool {
    if node.next_sibling().is_some() {
        return false;
    }
    let Some(parent) = node.parent_node() else {
        return false;
    };
    if &parent == root {
        return true;
    }
    parent
        .dyn_ref::<Element>()
        .is_some_and(|e| is_block_tag(&e.tag_name().to_ascii_lowercase()))
}

/// A native selection endpoint.
struct Endpoint {
    node: Node,
    offset: usize,
}

struct Reader<'a> {
    root: &'a Node,
    builder: DocumentBuilder,
    anchor: Option<Endpoint>,
    focus: Option<Endpoint>,
}

impl Reader<'_> {
    /// Record endpoints sitting at child boundary `index` of `node`.
    fn boundary(&mut self, node: &Node, index: usize, child_count: usize) {
        let hits = |ep: &Option<Endpoint>| {
            ep.as_ref().is_some_and(|ep| {
                &ep.node == node
                    && (ep.offset == index || (index == child_count && ep.offset > child_count))
            })
        };
        if hits(&self.anchor) {
            self.builder.mark_anchor(0);
        }
        if hits(&self.focus) {
            self.builder.mark_focus(0);
        }
    }

    fn text(&mut self, node: &Node, data: &str) {
        let len = utf16_len(data);
        if let Some(ep) = self.anchor.as_ref().filter(|ep| &ep.node == node) {
            self.builder.mark_anchor(ep.offset.min(len));
        }
        if let Some(ep) = self.focus.as_ref().filter(|ep| &ep.node == node) {
            self.builder.mark_focus(ep.offset.min(len));
        }
        self.builder.push_str(data);
    }

    fn visit(&mut self, node: &Node) {
        match classify(node, self.root) {
            NodeKind::Text(data) => self.text(node, &data),
            NodeKind::Break => {
                self.boundary(node, 0, 0);
                self.builder.push_str("\n");
            }
            NodeKind::Filler | NodeKind::Skip => self.boundary(node, 0, 0),
            NodeKind::Block => {
                if !self.builder.at_line_start() {
                    self.builder.push_str("\n");
                }
                self.children(node);
            }
            NodeKind::Inline => self.children(node),
        }
    }

    fn children(&mut self, node: &Node) {
        let children = node.child_nodes();
        let count = children.length() as usize;
        for i in 0..count {
            self.boundary(node, i, count);
            if let Some(child) = children.get(i as u32) {
                self.visit(&child);
            }
        }
        self.boundary(node, count, count);
    }
}

/// Read the editor's text and the native selection as a document.
///
/// Selection endpoints outside the editor are ignored; if neither is inside,
/// the document has no selection.
pub fn read_document(editor: &HtmlElement, selection: &Selection) -> Result<TextDocument, DomError> {
    let root: &Node = editor.as_ref();
    let endpoint = |node: Option<Node>, offset: u32| {
        node.filter(|n| root.contains(Some(n)))
            .map(|node| Endpoint {
                node,
                offset: offset as usize,
            })
    };

    let mut reader = Reader {
        root,
        builder: DocumentBuilder::new(),
        anchor: endpoint(selection.anchor_node(), selection.anchor_offset()),
        focus: endpoint(selection.focus_node(), selection.focus_offset()),
    };
    reader.children(root);

    let marked = [reader.builder.anchor(), reader.builder.focus()];
    let doc = reader.builder.build();
    check_consistency(&doc, marked)?;

    tracing::trace!(
        target: "weaver_code::reader",
        len = doc.len(),
        anchor = doc.anchor(),
        focus = doc.focus(),
        selection = ?doc.selection_type(),
        "read document from DOM"
    );
    Ok(doc)
}

/// Verify that every recorded offset addresses the text exactly.
///
/// Debug builds fail; release builds log and carry on with the clamped
/// document.
fn check_consistency(doc: &TextDocument, marked: [Option<usize>; 2]) -> Result<(), DomError> {
    for offset in marked.into_iter().flatten() {
        let actual = utf16_len(slice_utf16(doc.text(), 0, offset));
        if actual != offset {
            let err = DomError::Inconsistent {
                what: "preceding text length",
                expected: offset,
                actual,
            };
            if cfg!(debug_assertions) {
                return Err(err);
            }
            tracing::warn!(target: "weaver_code::reader", %err, "selection offset out of step with text");
        }
    }
    Ok(())
}

/// Flattened text of the editor, ignoring the selection.
pub fn read_text(editor: &HtmlElement) -> String {
    let root: &Node = editor.as_ref();
    let mut reader = Reader {
        root,
        builder: DocumentBuilder::new(),
        anchor: None,
        focus: None,
    };
    reader.children(root);
    reader.builder.build().text().to_string()
}
