//! `createEditor` and the `CodeEditor` handle exposed to JavaScript.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;
use weaver_code_browser::{
    CodeEditor, Dir, EditorConfig, EditorOptions, GutterLine, Highlighter, LineCustomizer,
    ListenerId, TextDocument,
};

use crate::processors::{document_from_js, pipeline_from_js};
use crate::types::{JsHighlight, JsLineMetric, JsTextDocument, js_error};

fn option(options: &JsValue, key: &str) -> Option<JsValue> {
    if !options.is_object() {
        return None;
    }
    Reflect::get(options, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn function_option(options: &JsValue, key: &str) -> Result<Option<Function>, JsError> {
    match option(options, key) {
        None => Ok(None),
        Some(value) => value
            .dyn_into::<Function>()
            .map(Some)
            .map_err(|_| JsError::new(&format!("option `{key}` must be a function"))),
    }
}

fn log_callback_error(what: &str, err: JsValue) {
    tracing::warn!(target: "weaver_code::js", callback = what, error = ?err, "callback threw");
}

/// `highlightElement` as a `Highlighter`.
struct JsHighlighter(Function);

impl Highlighter for JsHighlighter {
    fn highlight(&self, element: &HtmlElement) {
        if let Err(err) = self.0.call1(&JsValue::NULL, element) {
            log_callback_error("highlightElement", err);
        }
    }
}

/// `gutter.customizer` as a `LineCustomizer`.
struct JsCustomizer(Function);

impl LineCustomizer for JsCustomizer {
    fn customize(&self, line: usize, elements: &GutterLine) {
        let slots = Object::new();
        let _ = Reflect::set(&slots, &"row".into(), &elements.row);
        let _ = Reflect::set(&slots, &"number".into(), &elements.number);
        let _ = Reflect::set(&slots, &"accessory".into(), &elements.accessory);
        if let Err(err) = self
            .0
            .call2(&JsValue::NULL, &JsValue::from(line as u32), &slots)
        {
            log_callback_error("gutter.customizer", err);
        }
    }
}

fn resolve_host(host: &JsValue) -> Result<Option<HtmlElement>, JsError> {
    if host.as_string().is_some() {
        return Ok(None);
    }
    host.clone()
        .dyn_into::<HtmlElement>()
        .map(Some)
        .map_err(|_| JsError::new("host must be a selector or an HTMLElement"))
}

/// Create an editor inside `host`, a CSS selector or an element.
///
/// `options` follows the `EditorOptions` interface; every field is optional.
#[wasm_bindgen(js_name = createEditor)]
pub fn create_editor(host: JsValue, options: JsValue) -> Result<JsEditor, JsError> {
    let config: EditorConfig = if options.is_undefined() || options.is_null() {
        EditorConfig::default()
    } else {
        serde_wasm_bindgen::from_value(options.clone())
            .map_err(|e| JsError::new(&format!("invalid editor options: {e}")))?
    };
    let config = config.normalized();

    let gutter = option(&options, "gutter").unwrap_or(JsValue::UNDEFINED);
    let keydown_pipeline = option(&options, "keydownPipeline")
        .map(|value| pipeline_from_js(&value, &config))
        .transpose()?;
    let keyup_pipeline = option(&options, "keyupPipeline")
        .map(|value| pipeline_from_js(&value, &config))
        .transpose()?;
    let on_update = function_option(&options, "onUpdate")?;

    let editor_options = EditorOptions {
        code: option(&options, "code").and_then(|v| v.as_string()),
        highlighter: function_option(&options, "highlightElement")?
            .map(|f| Rc::new(JsHighlighter(f)) as Rc<dyn Highlighter>),
        gutter_customizer: function_option(&gutter, "customizer")?
            .map(|f| Rc::new(JsCustomizer(f)) as Rc<dyn LineCustomizer>),
        keydown_pipeline,
        keyup_pipeline,
        config,
    };

    let inner = match resolve_host(&host)? {
        Some(element) => CodeEditor::new(element, editor_options),
        None => CodeEditor::attach(&host.as_string().unwrap_or_default(), editor_options),
    }
    .map_err(js_error)?;

    let editor = JsEditor {
        inner,
        listeners: RefCell::default(),
        next_listener: Cell::new(1),
    };
    if let Some(callback) = on_update {
        editor.on_update(callback);
    }
    Ok(editor)
}

/// A running editor.
#[wasm_bindgen(js_name = CodeEditor)]
pub struct JsEditor {
    inner: CodeEditor,
    listeners: RefCell<HashMap<u32, ListenerId>>,
    next_listener: Cell<u32>,
}

impl JsEditor {
    fn register(&self, id: ListenerId) -> u32 {
        let handle = self.next_listener.get();
        self.next_listener.set(handle.wrapping_add(1));
        self.listeners.borrow_mut().insert(handle, id);
        handle
    }
}

#[wasm_bindgen(js_class = CodeEditor)]
impl JsEditor {
    #[wasm_bindgen(getter)]
    pub fn code(&self) -> String {
        self.inner.code()
    }

    /// Replaces the text, puts the caret at the start and clears history.
    #[wasm_bindgen(setter)]
    pub fn set_code(&self, code: &str) -> Result<(), JsError> {
        self.inner.set_code(code).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn document(&self) -> JsTextDocument {
        self.inner.document().into()
    }

    /// Accepts a `TextDocument` or any object with the same fields.
    #[wasm_bindgen(setter)]
    pub fn set_document(&self, doc: JsValue) -> Result<(), JsError> {
        let doc: TextDocument =
            document_from_js(&doc).ok_or_else(|| JsError::new("expected a TextDocument"))?;
        self.inner.set_document(doc).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn element(&self) -> HtmlElement {
        self.inner.element().clone()
    }

    /// Register `callback(code)`; returns an id for `removeListener`.
    #[wasm_bindgen(js_name = onUpdate)]
    pub fn on_update(&self, callback: Function) -> u32 {
        let id = self.inner.on_update(move |code| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(code)) {
                log_callback_error("onUpdate", err);
            }
        });
        self.register(id)
    }

    /// Register `callback(doc, focused)`; returns an id for `removeListener`.
    #[wasm_bindgen(js_name = onSelectionFocusChanged)]
    pub fn on_selection_focus_changed(&self, callback: Function) -> u32 {
        let id = self.inner.on_selection_focus_changed(move |change| {
            let doc = JsValue::from(JsTextDocument::from(change.document.clone()));
            let focused = JsValue::from_bool(change.focused);
            if let Err(err) = callback.call2(&JsValue::NULL, &doc, &focused) {
                log_callback_error("onSelectionFocusChanged", err);
            }
        });
        self.register(id)
    }

    #[wasm_bindgen(js_name = removeListener)]
    pub fn remove_listener(&self, id: u32) -> bool {
        self.listeners
            .borrow_mut()
            .remove(&id)
            .is_some_and(|id| self.inner.remove_listener(id))
    }

    #[wasm_bindgen(getter)]
    pub fn spellcheck(&self) -> bool {
        self.inner.spellcheck()
    }

    #[wasm_bindgen(setter)]
    pub fn set_spellcheck(&self, value: bool) -> Result<(), JsError> {
        self.inner.set_spellcheck(value).map_err(js_error)
    }

    #[wasm_bindgen(getter, js_name = wrapsText)]
    pub fn wraps_text(&self) -> bool {
        self.inner.wraps_text()
    }

    #[wasm_bindgen(setter, js_name = wrapsText)]
    pub fn set_wraps_text(&self, value: bool) -> Result<(), JsError> {
        self.inner.set_wraps_text(value).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn readonly(&self) -> bool {
        self.inner.readonly()
    }

    #[wasm_bindgen(setter)]
    pub fn set_readonly(&self, value: bool) -> Result<(), JsError> {
        self.inner.set_readonly(value).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn language(&self) -> Option<String> {
        self.inner.language()
    }

    #[wasm_bindgen(setter)]
    pub fn set_language(&self, value: Option<String>) -> Result<(), JsError> {
        self.inner.set_language(value.as_deref()).map_err(js_error)
    }

    /// `"ltr"` or `"rtl"`.
    #[wasm_bindgen(getter)]
    pub fn dir(&self) -> String {
        self.inner.dir().as_str().to_string()
    }

    #[wasm_bindgen(setter)]
    pub fn set_dir(&self, value: &str) -> Result<(), JsError> {
        let dir = Dir::parse(value)
            .ok_or_else(|| JsError::new(&format!("invalid dir `{value}`")))?;
        self.inner.set_dir(dir).map_err(js_error)
    }

    /// 1-based line, or undefined.
    #[wasm_bindgen(getter, js_name = highlightedLine)]
    pub fn highlighted_line(&self) -> Option<u32> {
        self.inner.highlighted_line().map(|l| l as u32)
    }

    #[wasm_bindgen(setter, js_name = highlightedLine)]
    pub fn set_highlighted_line(&self, line: Option<u32>) -> Result<(), JsError> {
        self.inner
            .set_highlighted_line(line.map(|l| l as usize))
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = invalidateGutterLine)]
    pub fn invalidate_gutter_line(&self, line: u32) -> Result<(), JsError> {
        self.inner
            .invalidate_gutter_line(line as usize)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = createHighlight)]
    pub fn create_highlight(&self) -> Result<JsHighlight, JsError> {
        self.inner
            .create_highlight()
            .map(JsHighlight::from)
            .map_err(js_error)
    }

    /// `{ top, height }` per line, in pixels relative to the editor.
    #[wasm_bindgen(js_name = lineMetrics)]
    pub fn line_metrics(&self) -> Result<JsValue, JsError> {
        let metrics: Vec<JsLineMetric> = self
            .inner
            .line_metrics()
            .iter()
            .map(JsLineMetric::from)
            .collect();
        serde_wasm_bindgen::to_value(&metrics).map_err(js_error)
    }

    pub fn undo(&self) -> Result<bool, JsError> {
        self.inner.undo().map_err(js_error)
    }

    pub fn redo(&self) -> Result<bool, JsError> {
        self.inner.redo().map_err(js_error)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    /// Force a history checkpoint.
    #[wasm_bindgen(js_name = recordHistory)]
    pub fn record_history(&self) -> Result<(), JsError> {
        self.inner.record_history().map_err(js_error)
    }

    pub fn destroy(&self) {
        self.listeners.borrow_mut().clear();
        self.inner.destroy();
    }

    #[wasm_bindgen(getter, js_name = isDestroyed)]
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }
}
