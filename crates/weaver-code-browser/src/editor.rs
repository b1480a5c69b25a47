//! The `CodeEditor` orchestrator.
//!
//! Builds the editor markup inside a host element and wires DOM events to
//! the bridge, the input pipelines and the history manager. All handlers
//! run synchronously on the main thread; DOM listeners and timers hold weak
//! references so dropping the editor stops everything.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, Event, HtmlElement, KeyboardEvent};
use weaver_code_core::text::normalize_line_endings;
use weaver_code_core::{
    ChangeKind, Dir, EditorConfig, HistoryClient, HistoryError, KeyEvent, ListenerId, Listeners,
    Pipeline, SelectionType, TextDocument, UndoRedoManager, default_keydown_pipeline,
};

use crate::bridge::{DomBridge, LineMetric};
use crate::dom_writer::{Highlighter, dom_document};
use crate::error::{DomError, EditorError};
use crate::events::{clipboard_text, key_event, set_clipboard_text};
use crate::gutter::{
    Gutter, HighlightHandle, LineCustomizer, LineHighlights, LineNumberGutter, create_div,
};
use crate::timers::{DebouncedTask, ThrottledTask};

pub const ROOT_CLASS: &str = "weaver-code";
pub const EDITOR_CLASS: &str = "weaver-code-editor";
pub const WRAP_CLASS: &str = "weaver-code-wrap";
pub const ACTIVE_LINE_CLASS: &str = "weaver-code-active-line";

/// Everything `CodeEditor::new` needs besides the host element.
#[derive(Default)]
pub struct EditorOptions {
    pub config: EditorConfig,
    /// Initial text. Defaults to the host element's text content.
    pub code: Option<String>,
    pub highlighter: Option<Rc<dyn Highlighter>>,
    pub gutter_customizer: Option<Rc<dyn LineCustomizer>>,
    /// Replaces the default tab/newline/bracket pipeline entirely.
    pub keydown_pipeline: Option<Pipeline>,
    pub keyup_pipeline: Option<Pipeline>,
}

/// Payload of selection/focus notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionFocus {
    pub document: TextDocument,
    pub focused: bool,
}

/// History client restoring snapshots through the bridge.
struct BridgeHistory {
    bridge: Rc<DomBridge>,
    focused: Rc<Cell<bool>>,
}

impl HistoryClient<TextDocument> for BridgeHistory {
    fn current_state(&self) -> TextDocument {
        self.bridge.document()
    }

    fn states_are_equivalent(&self, a: &TextDocument, b: &TextDocument) -> bool {
        a.perceptually_equals(b)
    }

    fn restore_state(&self, state: &TextDocument) {
        let state = if self.focused.get() {
            state.clone()
        } else {
            state.without_selection()
        };
        if let Err(err) = self.bridge.push_to_dom(state) {
            tracing::warn!(target: "weaver_code::history", %err, "failed to restore history entry");
        }
    }
}

struct Tasks {
    highlight: ThrottledTask,
    history: DebouncedTask,
    scroll: ThrottledTask,
}

impl Tasks {
    fn new(shared: &Weak<Shared>, config: &EditorConfig) -> Self {
        let ms = |ms: u32| Duration::from_millis(ms as u64);

        let weak = shared.clone();
        let highlight = ThrottledTask::new(ms(config.highlight_throttle_ms), move || {
            if let Some(shared) = weak.upgrade() {
                shared.run_highlight();
            }
        });

        let weak = shared.clone();
        let history = DebouncedTask::new(ms(config.history_debounce_ms), move || {
            if let Some(shared) = weak.upgrade() {
                shared.push_history();
            }
        });

        let weak = shared.clone();
        let scroll = ThrottledTask::new(ms(config.scroll_throttle_ms), move || {
            if let Some(shared) = weak.upgrade() {
                shared.sync_scroll();
            }
        });

        Self {
            highlight,
            history,
            scroll,
        }
    }
}

struct Shared {
    root: HtmlElement,
    editor: HtmlElement,
    bridge: Rc<DomBridge>,
    history: RefCell<UndoRedoManager<TextDocument>>,
    config: RefCell<EditorConfig>,
    keydown_pipeline: Pipeline,
    keyup_pipeline: Pipeline,
    gutter: Option<LineNumberGutter>,
    highlights: LineHighlights,
    active_line: RefCell<Option<HighlightHandle>>,
    highlighted_line: Cell<Option<usize>>,
    focused: Rc<Cell<bool>>,
    composing: Cell<bool>,
    restoring: Cell<bool>,
    destroyed: Cell<bool>,
    tasks: RefCell<Option<Tasks>>,
    dom_listeners: RefCell<Vec<EventListener>>,
    update_listeners: RefCell<Listeners<str>>,
    selection_focus_listeners: RefCell<Listeners<SelectionFocus>>,
}

impl Shared {
    fn alive(&self) -> Result<(), EditorError> {
        if self.destroyed.get() {
            Err(EditorError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn with_tasks(&self, f: impl FnOnce(&Tasks)) {
        if let Ok(tasks) = self.tasks.try_borrow() {
            if let Some(tasks) = tasks.as_ref() {
                f(tasks);
            }
        }
    }

    /// Write a document, dropping its selection while unfocused.
    fn write(&self, doc: TextDocument) -> Result<ChangeKind, EditorError> {
        let doc = if self.focused.get() {
            doc
        } else {
            doc.without_selection()
        };
        Ok(self.bridge.push_to_dom(doc)?)
    }

    // === Bridge listeners ===

    fn content_changed(&self, doc: &TextDocument) {
        if let Some(gutter) = &self.gutter {
            if let Err(err) = gutter.set_number_of_lines(doc.line_count()) {
                tracing::warn!(target: "weaver_code::editor", %err, "gutter update failed");
            }
        }
        if !self.restoring.get() {
            self.with_tasks(|tasks| tasks.history.trigger());
        }
        for handler in self.update_listeners.borrow().snapshot() {
            handler(doc.text());
        }
    }

    fn emit_selection_focus(&self, doc: &TextDocument) {
        let event = SelectionFocus {
            document: doc.clone(),
            focused: self.focused.get(),
        };
        for handler in self.selection_focus_listeners.borrow().snapshot() {
            handler(&event);
        }
    }

    fn line_metrics_changed(&self, metrics: &[LineMetric]) {
        if let Some(gutter) = &self.gutter {
            gutter.set_line_metrics(metrics);
        }
        self.highlights.set_line_metrics(metrics);
    }

    // === Timer work ===

    fn run_highlight(&self) {
        if self.destroyed.get() {
            return;
        }
        if let Err(err) = self.bridge.highlight(self.focused.get()) {
            tracing::warn!(target: "weaver_code::editor", %err, "highlight failed");
        }
    }

    fn push_history(&self) {
        if self.destroyed.get() {
            return;
        }
        let Ok(mut history) = self.history.try_borrow_mut() else {
            tracing::warn!(target: "weaver_code::history", "history busy, checkpoint skipped");
            return;
        };
        if let Err(err) = history.push() {
            tracing::warn!(target: "weaver_code::history", %err, "checkpoint failed");
        }
    }

    fn sync_scroll(&self) {
        let top = self.editor.scroll_top() as f64;
        if let Some(gutter) = &self.gutter {
            gutter.set_scroll_offset(top);
        }
        self.highlights.set_scroll_offset(top);
    }

    /// Checkpoint now, dropping any pending debounced push.
    fn record_history(&self) {
        self.with_tasks(|tasks| tasks.history.cancel());
        self.push_history();
    }

    fn flush_history(&self) {
        self.with_tasks(|tasks| {
            tasks.history.flush();
        });
    }

    fn poll(&self) -> Result<ChangeKind, EditorError> {
        if !self.focused.get() {
            return Ok(ChangeKind::None);
        }
        Ok(self.bridge.poll()?)
    }

    // === DOM event handlers ===

    fn run_pipeline(
        &self,
        pipeline: &Pipeline,
        event: &Event,
        key: &KeyEvent,
    ) -> Result<(), EditorError> {
        if pipeline.is_empty() {
            return Ok(());
        }
        self.poll()?;
        let before = self.bridge.document();
        if !before.has_selection() {
            return Ok(());
        }
        let result = pipeline.run(&before, key)?;
        if result.handled {
            event.prevent_default();
        }
        if result.changed {
            self.bridge.push_to_dom(result.document)?;
        }
        Ok(())
    }

    fn keydown(&self, event: &KeyboardEvent) -> Result<(), EditorError> {
        let key = key_event(event);
        if key.is_composing || !self.focused.get() || self.config.borrow().readonly {
            return Ok(());
        }
        if key.is_undo() {
            event.prevent_default();
            self.undo()?;
            return Ok(());
        }
        if key.is_redo() {
            event.prevent_default();
            self.redo()?;
            return Ok(());
        }
        self.run_pipeline(&self.keydown_pipeline, event, &key)
    }

    fn keyup(&self, event: &KeyboardEvent) -> Result<(), EditorError> {
        let key = key_event(event);
        if key.is_composing || self.composing.get() || !self.focused.get() {
            return Ok(());
        }
        self.poll()?;
        if self.config.borrow().readonly {
            return Ok(());
        }
        self.run_pipeline(&self.keyup_pipeline, event, &key)
    }

    fn input(&self) -> Result<(), EditorError> {
        if self.composing.get() {
            return Ok(());
        }
        if self.poll()? == ChangeKind::Content {
            self.with_tasks(|tasks| tasks.highlight.trigger());
        }
        Ok(())
    }

    fn composition_end(&self) -> Result<(), EditorError> {
        self.composing.set(false);
        self.input()
    }

    fn cut(&self, event: &ClipboardEvent) -> Result<(), EditorError> {
        if !self.focused.get() || self.config.borrow().readonly {
            return Ok(());
        }
        self.poll()?;
        let doc = self.bridge.document();
        if doc.selection_type() != SelectionType::Range {
            return Ok(());
        }
        event.prevent_default();
        set_clipboard_text(event, doc.selected_text())?;
        self.record_history();
        self.bridge.push_to_dom(doc.delete_selection()?)?;
        self.record_history();
        Ok(())
    }

    fn paste(&self, event: &ClipboardEvent) -> Result<(), EditorError> {
        if !self.focused.get() || self.config.borrow().readonly {
            return Ok(());
        }
        let Some(text) = clipboard_text(event) else {
            return Ok(());
        };
        event.prevent_default();
        self.poll()?;
        let doc = self.bridge.document();
        if !doc.has_selection() {
            return Ok(());
        }
        self.record_history();
        self.bridge
            .push_to_dom(doc.insert_text(&normalize_line_endings(&text))?)?;
        self.record_history();
        Ok(())
    }

    fn focus(&self) -> Result<(), EditorError> {
        self.focused.set(true);
        if self.poll()? != ChangeKind::Selection {
            self.emit_selection_focus(&self.bridge.document());
        }
        Ok(())
    }

    fn blur(&self) {
        self.focused.set(false);
        self.flush_history();
        self.emit_selection_focus(&self.bridge.document());
    }

    fn selection_change(&self) -> Result<(), EditorError> {
        if self.composing.get() {
            return Ok(());
        }
        self.poll()?;
        Ok(())
    }

    // === History ===

    fn undo(&self) -> Result<bool, EditorError> {
        self.alive()?;
        self.flush_history();
        self.step_history(|history| history.undo())
    }

    fn redo(&self) -> Result<bool, EditorError> {
        self.alive()?;
        self.flush_history();
        self.step_history(|history| history.redo())
    }

    fn step_history(
        &self,
        step: impl FnOnce(
            &mut UndoRedoManager<TextDocument>,
        ) -> Result<bool, HistoryError>,
    ) -> Result<bool, EditorError> {
        let Ok(mut history) = self.history.try_borrow_mut() else {
            tracing::warn!(target: "weaver_code::history", "history busy, ignoring re-entrant undo/redo");
            return Ok(false);
        };
        self.restoring.set(true);
        let result = step(&mut history);
        self.restoring.set(false);
        Ok(result?)
    }
}

fn report(what: &'static str, result: Result<(), EditorError>) {
    if let Err(err) = result {
        tracing::warn!(target: "weaver_code::editor", %err, "{what} handler failed");
    }
}

/// Handle to a running editor.
///
/// Cheap to clone; every clone drives the same editor.
#[derive(Clone)]
pub struct CodeEditor {
    shared: Rc<Shared>,
}

impl CodeEditor {
    /// Build an editor inside `host`.
    pub fn new(host: HtmlElement, options: EditorOptions) -> Result<Self, EditorError> {
        let EditorOptions {
            config,
            code,
            highlighter,
            gutter_customizer,
            keydown_pipeline,
            keyup_pipeline,
        } = options;
        let config = config.normalized();
        let document = dom_document()?;

        let keydown_pipeline = match keydown_pipeline {
            Some(pipeline) => pipeline,
            None => default_keydown_pipeline(&config)?,
        };
        let keyup_pipeline = keyup_pipeline.unwrap_or_default();

        let code = code.unwrap_or_else(|| host.text_content().unwrap_or_default());
        host.set_text_content(None);

        let root = create_div(&document, ROOT_CLASS)?;
        let body = create_div(&document, "weaver-code-body")?;
        let editor = create_div(&document, EDITOR_CLASS)?;
        for (name, value) in [
            ("role", "textbox"),
            ("aria-multiline", "true"),
            ("autocapitalize", "off"),
            ("autocorrect", "off"),
            ("translate", "no"),
        ] {
            editor
                .set_attribute(name, value)
                .map_err(|e| DomError::js("set_attribute", e))?;
        }

        let gutter = if config.gutter.enabled {
            let gutter = LineNumberGutter::new(document.clone(), &config.gutter, gutter_customizer)?;
            root.append_child(gutter.element())
                .map_err(|e| DomError::js("append_child", e))?;
            Some(gutter)
        } else {
            None
        };
        let highlights = LineHighlights::new(document.clone())?;
        body.append_child(highlights.element())
            .map_err(|e| DomError::js("append_child", e))?;
        body.append_child(&editor)
            .map_err(|e| DomError::js("append_child", e))?;
        root.append_child(&body)
            .map_err(|e| DomError::js("append_child", e))?;
        host.append_child(&root)
            .map_err(|e| DomError::js("append_child", e))?;

        let bridge = Rc::new(DomBridge::new(editor.clone()));
        bridge.set_highlighter(highlighter);

        let focused = Rc::new(Cell::new(false));
        let mut history = UndoRedoManager::new(config.max_undo_history);
        history.attach(BridgeHistory {
            bridge: bridge.clone(),
            focused: focused.clone(),
        });

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| Shared {
            tasks: RefCell::new(Some(Tasks::new(weak, &config))),
            root,
            editor,
            bridge,
            history: RefCell::new(history),
            config: RefCell::new(config),
            keydown_pipeline,
            keyup_pipeline,
            gutter,
            highlights,
            active_line: RefCell::new(None),
            highlighted_line: Cell::new(None),
            focused,
            composing: Cell::new(false),
            restoring: Cell::new(false),
            destroyed: Cell::new(false),
            dom_listeners: RefCell::new(Vec::new()),
            update_listeners: RefCell::default(),
            selection_focus_listeners: RefCell::default(),
        });

        let this = Self { shared };
        this.apply_config();
        this.connect_bridge();
        this.connect_dom()?;

        this.shared.bridge.render(TextDocument::new(&code))?;
        this.shared.with_tasks(|tasks| tasks.history.cancel());
        this.shared.history.borrow_mut().reset()?;

        tracing::debug!(
            target: "weaver_code::editor",
            len = this.shared.bridge.document().len(),
            keydown = ?this.shared.keydown_pipeline,
            "editor created"
        );
        Ok(this)
    }

    /// Build an editor inside the first element matching `selector`.
    pub fn attach(selector: &str, options: EditorOptions) -> Result<Self, EditorError> {
        let host = dom_document()?
            .query_selector(selector)
            .map_err(|e| DomError::js("query_selector", e))?
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| DomError::ElementNotFound(selector.to_string()))?;
        Self::new(host, options)
    }

    fn connect_bridge(&self) {
        let bridge = &self.shared.bridge;

        let weak = Rc::downgrade(&self.shared);
        bridge.on_content_changed(move |doc| {
            if let Some(shared) = weak.upgrade() {
                shared.content_changed(doc);
            }
        });

        let weak = Rc::downgrade(&self.shared);
        bridge.on_selection_changed(move |doc| {
            if let Some(shared) = weak.upgrade() {
                shared.emit_selection_focus(doc);
            }
        });

        let weak = Rc::downgrade(&self.shared);
        bridge.on_line_metrics_changed(move |metrics| {
            if let Some(shared) = weak.upgrade() {
                shared.line_metrics_changed(metrics);
            }
        });
    }

    fn connect_dom(&self) -> Result<(), EditorError> {
        let shared = &self.shared;
        let editor = shared.editor.clone();
        let active = EventListenerOptions::enable_prevent_default();
        let mut listeners = Vec::new();

        macro_rules! on {
            ($target:expr, $name:literal, |$shared:ident, $event:ident| $body:expr) => {{
                let weak = Rc::downgrade(shared);
                listeners.push(EventListener::new_with_options(
                    $target,
                    $name,
                    active,
                    move |$event: &Event| {
                        let Some($shared) = weak.upgrade() else {
                            return;
                        };
                        if $shared.destroyed.get() {
                            return;
                        }
                        #[allow(unused_variables)]
                        let $event = $event;
                        $body
                    },
                ));
            }};
        }

        on!(&editor, "keydown", |shared, event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                report("keydown", shared.keydown(event));
            }
        });
        on!(&editor, "keyup", |shared, event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                report("keyup", shared.keyup(event));
            }
        });
        on!(&editor, "input", |shared, event| report("input", shared.input()));
        on!(&editor, "compositionstart", |shared, event| shared.composing.set(true));
        on!(&editor, "compositionend", |shared, event| {
            report("compositionend", shared.composition_end())
        });
        on!(&editor, "cut", |shared, event| {
            if let Some(event) = event.dyn_ref::<ClipboardEvent>() {
                report("cut", shared.cut(event));
            }
        });
        on!(&editor, "paste", |shared, event| {
            if let Some(event) = event.dyn_ref::<ClipboardEvent>() {
                report("paste", shared.paste(event));
            }
        });
        on!(&editor, "focus", |shared, event| report("focus", shared.focus()));
        on!(&editor, "blur", |shared, event| shared.blur());
        on!(&editor, "scroll", |shared, event| {
            shared.with_tasks(|tasks| tasks.scroll.trigger())
        });

        let document = dom_document()?;
        on!(&document, "selectionchange", |shared, event| {
            report("selectionchange", shared.selection_change())
        });

        let window = web_sys::window().ok_or(DomError::NoWindow)?;
        on!(&window, "resize", |shared, event| {
            report("resize", shared.bridge.recompute_line_metrics().map_err(Into::into))
        });

        *shared.dom_listeners.borrow_mut() = listeners;
        Ok(())
    }

    /// Push the stored configuration onto the editor element.
    fn apply_config(&self) {
        let config = self.shared.config.borrow();
        let editor = &self.shared.editor;
        editor.set_spellcheck(config.spellcheck);
        let editable = if config.readonly { "false" } else { "true" };
        for (name, value) in [("dir", config.dir.as_str()), ("contenteditable", editable)] {
            if let Err(err) = editor.set_attribute(name, value) {
                tracing::warn!(
                    target: "weaver_code::editor",
                    attribute = name,
                    error = ?err,
                    "failed to set editor attribute"
                );
            }
        }
        let _ = self
            .shared
            .root
            .class_list()
            .toggle_with_force(WRAP_CLASS, config.wraps_text);
        let style = editor.style();
        let _ = style.set_property("white-space", if config.wraps_text { "pre-wrap" } else { "pre" });
        let _ = style.set_property("overflow-wrap", if config.wraps_text { "anywhere" } else { "normal" });
        if let Some(language) = &config.language {
            let _ = editor.class_list().add_1(&format!("language-{language}"));
        }
    }

    fn update_config(&self, f: impl FnOnce(&mut EditorConfig)) -> Result<(), EditorError> {
        self.shared.alive()?;
        f(&mut self.shared.config.borrow_mut());
        self.apply_config();
        Ok(())
    }

    // === Content ===

    /// The current text.
    pub fn code(&self) -> String {
        self.shared.bridge.document().text().to_string()
    }

    /// Replace the content, put the caret at the start and reset history.
    pub fn set_code(&self, code: &str) -> Result<(), EditorError> {
        self.shared.alive()?;
        self.shared.write(TextDocument::with_caret(code, 0))?;
        self.shared.with_tasks(|tasks| tasks.history.cancel());
        match self.shared.history.try_borrow_mut() {
            Ok(mut history) => history.reset()?,
            Err(_) => {
                tracing::warn!(target: "weaver_code::history", "history busy, reset skipped")
            }
        }
        Ok(())
    }

    pub fn document(&self) -> TextDocument {
        self.shared.bridge.document()
    }

    /// Replace text and selection without resetting history.
    pub fn set_document(&self, doc: TextDocument) -> Result<(), EditorError> {
        self.shared.alive()?;
        self.shared.write(doc)?;
        Ok(())
    }

    pub fn element(&self) -> &HtmlElement {
        &self.shared.editor
    }

    pub fn config(&self) -> EditorConfig {
        self.shared.config.borrow().clone()
    }

    // === Listeners ===

    /// Called with the new text after every content change.
    pub fn on_update(&self, f: impl Fn(&str) + 'static) -> ListenerId {
        self.shared.update_listeners.borrow_mut().add(f)
    }

    /// Called when the selection moves without a content change, and on focus or blur.
    pub fn on_selection_focus_changed(
        &self,
        f: impl Fn(&SelectionFocus) + 'static,
    ) -> ListenerId {
        self.shared.selection_focus_listeners.borrow_mut().add(f)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.update_listeners.borrow_mut().remove(id)
            || self.shared.selection_focus_listeners.borrow_mut().remove(id)
    }

    // === Settings ===

    pub fn spellcheck(&self) -> bool {
        self.shared.config.borrow().spellcheck
    }

    pub fn set_spellcheck(&self, spellcheck: bool) -> Result<(), EditorError> {
        self.update_config(|c| c.spellcheck = spellcheck)
    }

    pub fn wraps_text(&self) -> bool {
        self.shared.config.borrow().wraps_text
    }

    pub fn set_wraps_text(&self, wraps_text: bool) -> Result<(), EditorError> {
        self.update_config(|c| c.wraps_text = wraps_text)?;
        self.shared.bridge.recompute_line_metrics()?;
        Ok(())
    }

    pub fn readonly(&self) -> bool {
        self.shared.config.borrow().readonly
    }

    pub fn set_readonly(&self, readonly: bool) -> Result<(), EditorError> {
        self.update_config(|c| c.readonly = readonly)
    }

    pub fn language(&self) -> Option<String> {
        self.shared.config.borrow().language.clone()
    }

    /// Swap the `language-*` class and re-run the highlighter.
    pub fn set_language(&self, language: Option<&str>) -> Result<(), EditorError> {
        self.shared.alive()?;
        let previous = self.shared.config.borrow().language.clone();
        if let Some(previous) = previous {
            let _ = self
                .shared
                .editor
                .class_list()
                .remove_1(&format!("language-{previous}"));
        }
        self.update_config(|c| c.language = language.filter(|l| !l.is_empty()).map(String::from))?;
        self.shared.run_highlight();
        Ok(())
    }

    pub fn dir(&self) -> Dir {
        self.shared.config.borrow().dir
    }

    pub fn set_dir(&self, dir: Dir) -> Result<(), EditorError> {
        self.update_config(|c| c.dir = dir)
    }

    // === Gutter and highlights ===

    pub fn highlighted_line(&self) -> Option<usize> {
        self.shared.highlighted_line.get()
    }

    /// Mark one line (1-based) in the gutter and the highlight layer.
    pub fn set_highlighted_line(&self, line: Option<usize>) -> Result<(), EditorError> {
        self.shared.alive()?;
        let line = line.filter(|&l| l > 0);
        self.shared.highlighted_line.set(line);
        if let Some(gutter) = &self.shared.gutter {
            gutter.set_highlighted_line(line);
        }
        let mut active = self.shared.active_line.borrow_mut();
        let handle = match active.as_ref() {
            Some(handle) => handle.clone(),
            None => {
                let handle = self.shared.highlights.create()?;
                handle.set_css_class(Some(ACTIVE_LINE_CLASS.to_string()));
                active.insert(handle).clone()
            }
        };
        handle.set_line_number(line);
        handle.set_visible(line.is_some());
        Ok(())
    }

    /// Re-render one gutter row, running the customizer again.
    pub fn invalidate_gutter_line(&self, line: usize) -> Result<(), EditorError> {
        self.shared.alive()?;
        if let Some(gutter) = &self.shared.gutter {
            gutter.update_line_number(line);
        }
        Ok(())
    }

    pub fn create_highlight(&self) -> Result<HighlightHandle, EditorError> {
        self.shared.alive()?;
        Ok(self.shared.highlights.create()?)
    }

    pub fn line_metrics(&self) -> Vec<LineMetric> {
        self.shared.bridge.line_metrics()
    }

    // === History ===

    pub fn undo(&self) -> Result<bool, EditorError> {
        self.shared.undo()
    }

    pub fn redo(&self) -> Result<bool, EditorError> {
        self.shared.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.shared
            .history
            .try_borrow()
            .is_ok_and(|history| history.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.shared
            .history
            .try_borrow()
            .is_ok_and(|history| history.can_redo())
    }

    /// Force a history checkpoint now.
    pub fn record_history(&self) -> Result<(), EditorError> {
        self.shared.alive()?;
        self.shared.record_history();
        Ok(())
    }

    // === Teardown ===

    /// Detach listeners, cancel timers and remove the editor markup.
    pub fn destroy(&self) {
        let shared = &self.shared;
        if shared.destroyed.replace(true) {
            return;
        }
        shared.dom_listeners.borrow_mut().clear();
        if let Ok(mut tasks) = shared.tasks.try_borrow_mut() {
            tasks.take();
        }
        shared.bridge.clear_listeners();
        shared.update_listeners.borrow_mut().clear();
        shared.selection_focus_listeners.borrow_mut().clear();
        shared.highlights.clear();
        shared.root.remove();
        tracing::debug!(target: "weaver_code::editor", "editor destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.get()
    }
}
