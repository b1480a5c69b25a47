//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;
use weaver_code_browser::{
    Direction, HighlightHandle, KeyEvent, LineMetric, SelectionType, TextDocument,
};

#[wasm_bindgen(typescript_custom_section)]
const EDITOR_OPTIONS_TS: &str = r#"
export type Processor = (
    doc: TextDocument,
    args: { handled: boolean; event: JsKeyEvent },
) => TextDocument | undefined | void;

export interface EditorOptions {
    tab?: string;
    dir?: "ltr" | "rtl";
    spellcheck?: boolean;
    history?: number;
    maxUndoHistory?: number;
    historyDebounceMs?: number;
    highlightThrottleMs?: number;
    scrollThrottleMs?: number;
    readonly?: boolean;
    wrapsText?: boolean;
    language?: string;
    code?: string;
    catchTab?: boolean;
    preserveIndent?: boolean;
    addClosing?: boolean;
    tabProcessor?: { enabled?: boolean };
    newlineProcessor?: {
        enabled?: boolean;
        incrementIndentationOn?: string;
        moveToNewLine?: string;
    };
    bracketProcessor?: { enabled?: boolean; pairs?: [string, string][] };
    processorOrder?: ("tab" | "newline" | "bracket")[];
    gutter?: {
        enabled?: boolean;
        width?: string;
        border?: boolean;
        class?: string;
        customizer?: (
            lineNumber: number,
            elements: { row: HTMLElement; number: HTMLElement; accessory: HTMLElement },
        ) => void;
    };
    highlightElement?: (element: HTMLElement) => void;
    keydownPipeline?: (Processor | "tab" | "newline" | "bracket")[];
    keyupPipeline?: (Processor | "tab" | "newline" | "bracket")[];
    onUpdate?: (code: string) => void;
}
"#;

pub(crate) fn js_error(err: impl std::fmt::Display) -> JsError {
    JsError::new(&err.to_string())
}

/// Immutable text plus selection, mirrored for JavaScript.
///
/// Every transform returns a new document and throws when the document
/// has no selection.
#[wasm_bindgen(js_name = TextDocument)]
#[derive(Debug, Clone, Default)]
pub struct JsTextDocument {
    inner: TextDocument,
}

impl JsTextDocument {
    pub fn into_inner(self) -> TextDocument {
        self.inner
    }

    pub fn inner(&self) -> &TextDocument {
        &self.inner
    }
}

impl From<TextDocument> for JsTextDocument {
    fn from(inner: TextDocument) -> Self {
        Self { inner }
    }
}

fn offset(value: u32) -> usize {
    value as usize
}

#[wasm_bindgen(js_class = TextDocument)]
impl JsTextDocument {
    /// `anchor` alone makes a caret; neither makes a document without a selection.
    #[wasm_bindgen(constructor)]
    pub fn new(text: &str, anchor: Option<u32>, focus: Option<u32>) -> Self {
        let inner = match (anchor, focus) {
            (None, None) => TextDocument::new(text),
            (Some(a), None) | (None, Some(a)) => TextDocument::with_caret(text, offset(a)),
            (Some(a), Some(f)) => TextDocument::with_text_and_selection(text, offset(a), offset(f)),
        };
        Self { inner }
    }

    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String {
        self.inner.text().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> u32 {
        self.inner.len() as u32
    }

    #[wasm_bindgen(getter, js_name = anchorIndex)]
    pub fn anchor_index(&self) -> u32 {
        self.inner.anchor() as u32
    }

    #[wasm_bindgen(getter, js_name = focusIndex)]
    pub fn focus_index(&self) -> u32 {
        self.inner.focus() as u32
    }

    #[wasm_bindgen(getter, js_name = hasSelection)]
    pub fn has_selection(&self) -> bool {
        self.inner.has_selection()
    }

    /// `"none"`, `"caret"` or `"range"`.
    #[wasm_bindgen(getter, js_name = selectionType)]
    pub fn selection_type(&self) -> String {
        match self.inner.selection_type() {
            SelectionType::None => "none",
            SelectionType::Caret => "caret",
            SelectionType::Range => "range",
        }
        .to_string()
    }

    /// `"forward"` or `"backward"`.
    #[wasm_bindgen(getter)]
    pub fn dir(&self) -> String {
        match self.inner.direction() {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
        .to_string()
    }

    #[wasm_bindgen(getter, js_name = earliestIndex)]
    pub fn earliest_index(&self) -> u32 {
        self.inner.earliest() as u32
    }

    #[wasm_bindgen(getter, js_name = latestIndex)]
    pub fn latest_index(&self) -> u32 {
        self.inner.latest() as u32
    }

    #[wasm_bindgen(getter, js_name = precedingText)]
    pub fn preceding_text(&self) -> String {
        self.inner.preceding_text().to_string()
    }

    #[wasm_bindgen(getter, js_name = selectedText)]
    pub fn selected_text(&self) -> String {
        self.inner.selected_text().to_string()
    }

    #[wasm_bindgen(getter, js_name = followingText)]
    pub fn following_text(&self) -> String {
        self.inner.following_text().to_string()
    }

    #[wasm_bindgen(getter, js_name = characterBefore)]
    pub fn character_before(&self) -> Option<String> {
        self.inner.character_before().map(String::from)
    }

    #[wasm_bindgen(getter, js_name = characterAfter)]
    pub fn character_after(&self) -> Option<String> {
        self.inner.character_after().map(String::from)
    }

    #[wasm_bindgen(getter, js_name = lineCount)]
    pub fn line_count(&self) -> u32 {
        self.inner.line_count() as u32
    }

    #[wasm_bindgen(js_name = strictEquals)]
    pub fn strict_equals(&self, other: &JsTextDocument) -> bool {
        self.inner.strict_equals(&other.inner)
    }

    #[wasm_bindgen(js_name = perceptuallyEquals)]
    pub fn perceptually_equals(&self, other: &JsTextDocument) -> bool {
        self.inner.perceptually_equals(&other.inner)
    }

    #[wasm_bindgen(js_name = withSelection)]
    pub fn with_selection(&self, anchor: u32, focus: u32) -> JsTextDocument {
        self.inner.with_selection(offset(anchor), offset(focus)).into()
    }

    #[wasm_bindgen(js_name = withoutSelection)]
    pub fn without_selection(&self) -> JsTextDocument {
        self.inner.without_selection().into()
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&self) -> JsTextDocument {
        self.inner.select_all().into()
    }

    #[wasm_bindgen(js_name = collapseToStart)]
    pub fn collapse_to_start(&self) -> Result<JsTextDocument, JsError> {
        self.inner.collapse_to_start().map(Into::into).map_err(js_error)
    }

    #[wasm_bindgen(js_name = collapseToEnd)]
    pub fn collapse_to_end(&self) -> Result<JsTextDocument, JsError> {
        self.inner.collapse_to_end().map(Into::into).map_err(js_error)
    }

    #[wasm_bindgen(js_name = skipCharacter)]
    pub fn skip_character(&self) -> Result<JsTextDocument, JsError> {
        self.inner.skip_character().map(Into::into).map_err(js_error)
    }

    #[wasm_bindgen(js_name = skipWord)]
    pub fn skip_word(&self) -> Result<JsTextDocument, JsError> {
        self.inner.skip_word().map(Into::into).map_err(js_error)
    }

    #[wasm_bindgen(js_name = expandToCoverLines)]
    pub fn expand_to_cover_lines(&self) -> Result<JsTextDocument, JsError> {
        self.inner
            .expand_to_cover_lines()
            .map(Into::into)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = expandToCoverWords)]
    pub fn expand_to_cover_words(&self) -> Result<JsTextDocument, JsError> {
        self.inner
            .expand_to_cover_words()
            .map(Into::into)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteSelection)]
    pub fn delete_selection(&self) -> Result<JsTextDocument, JsError> {
        self.inner.delete_selection().map(Into::into).map_err(js_error)
    }

    /// Both advance flags default to true.
    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(
        &self,
        text: &str,
        advance_anchor: Option<bool>,
        advance_focus: Option<bool>,
    ) -> Result<JsTextDocument, JsError> {
        self.inner
            .insert_text_with(
                text,
                advance_anchor.unwrap_or(true),
                advance_focus.unwrap_or(true),
            )
            .map(Into::into)
            .map_err(js_error)
    }
}

/// Keyboard event as handed to JS processors.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsKeyEvent {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub ctrl_key: bool,
    pub alt_key: bool,
    pub shift_key: bool,
    pub meta_key: bool,
    pub repeat: bool,
    pub is_composing: bool,
    pub is_enter: bool,
    pub is_tab: bool,
    pub is_undo: bool,
    pub is_redo: bool,
    pub is_mutating_input: bool,
}

impl From<&KeyEvent> for JsKeyEvent {
    fn from(event: &KeyEvent) -> Self {
        Self {
            key: event.key.as_dom_key().to_string(),
            code: event.code.as_ref().map(|c| c.to_string()),
            ctrl_key: event.modifiers.ctrl,
            alt_key: event.modifiers.alt,
            shift_key: event.modifiers.shift,
            meta_key: event.modifiers.meta,
            repeat: event.repeat,
            is_composing: event.is_composing,
            is_enter: event.is_enter(),
            is_tab: event.is_tab(),
            is_undo: event.is_undo(),
            is_redo: event.is_redo(),
            is_mutating_input: event.is_mutating_input(),
        }
    }
}

/// Vertical placement of one rendered line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct JsLineMetric {
    pub top: f64,
    pub height: f64,
}

impl From<&LineMetric> for JsLineMetric {
    fn from(metric: &LineMetric) -> Self {
        Self {
            top: metric.top,
            height: metric.height,
        }
    }
}

/// Overlay highlight returned by `createHighlight`.
#[wasm_bindgen(js_name = Highlight)]
pub struct JsHighlight {
    inner: HighlightHandle,
}

impl From<HighlightHandle> for JsHighlight {
    fn from(inner: HighlightHandle) -> Self {
        Self { inner }
    }
}

#[wasm_bindgen(js_class = Highlight)]
impl JsHighlight {
    /// 1-based line, or undefined when unplaced.
    #[wasm_bindgen(getter, js_name = lineNumber)]
    pub fn line_number(&self) -> Option<u32> {
        self.inner.line_number().map(|l| l as u32)
    }

    #[wasm_bindgen(setter, js_name = lineNumber)]
    pub fn set_line_number(&self, line: Option<u32>) {
        self.inner.set_line_number(line.map(|l| l as usize));
    }

    #[wasm_bindgen(getter)]
    pub fn visible(&self) -> bool {
        self.inner.visible()
    }

    #[wasm_bindgen(setter)]
    pub fn set_visible(&self, visible: bool) {
        self.inner.set_visible(visible);
    }

    #[wasm_bindgen(getter, js_name = cssClass)]
    pub fn css_class(&self) -> Option<String> {
        self.inner.css_class()
    }

    #[wasm_bindgen(setter, js_name = cssClass)]
    pub fn set_css_class(&self, class: Option<String>) {
        self.inner.set_css_class(class);
    }

    pub fn delete(&self) {
        self.inner.delete();
    }
}
