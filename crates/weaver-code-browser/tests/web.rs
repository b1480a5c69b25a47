//! WASM browser tests for weaver-code-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{
    ClipboardEvent, ClipboardEventInit, DataTransfer, Event, HtmlElement, KeyboardEvent,
    KeyboardEventInit,
};

wasm_bindgen_test_configure!(run_in_browser);

use weaver_code_browser::dom_writer::{LINE_CLASS, is_line_container, native_selection};
use weaver_code_browser::{
    ChangeKind, CodeEditor, DomBridge, EditorError, EditorOptions, TextDocument, platform,
    read_document, read_text, write_content,
};

fn element(tag: &str) -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element: HtmlElement = document.create_element(tag).unwrap().unchecked_into();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

fn editable() -> HtmlElement {
    let editor = element("div");
    editor.set_attribute("contenteditable", "true").unwrap();
    editor
}

fn round_trip(doc: &TextDocument) -> TextDocument {
    let editor = editable();
    write_content(&editor, doc, None).unwrap();
    let read = read_document(&editor, &native_selection().unwrap()).unwrap();
    editor.remove();
    read
}

// === Round trips ===

#[wasm_bindgen_test]
fn test_round_trip_is_strictly_equal() {
    let cases = [
        TextDocument::with_caret("", 0),
        TextDocument::with_caret("hello", 5),
        TextDocument::with_caret("a\nb", 2),
        TextDocument::with_caret("a\nb", 1),
        TextDocument::with_caret("x\n", 2),
        TextDocument::with_caret("\n\n", 1),
        TextDocument::with_text_and_selection("fn main() {\n    1\n}", 12, 3),
        TextDocument::with_text_and_selection("one\ntwo\nthree", 0, 13),
        TextDocument::with_caret("emoji 🦀 here", 8),
    ];
    for doc in cases {
        let read = round_trip(&doc);
        assert!(
            read.strict_equals(&doc),
            "round trip of {doc:?} gave {read:?}"
        );
    }
}

#[wasm_bindgen_test]
fn test_write_builds_one_container_per_line() {
    let editor = editable();
    write_content(&editor, &TextDocument::new("a\n\nb\n"), None).unwrap();
    let children = editor.child_nodes();
    assert_eq!(children.length(), 4);
    for i in 0..children.length() {
        assert!(is_line_container(&children.get(i).unwrap()));
    }
    assert_eq!(read_text(&editor), "a\n\nb\n");
    editor.remove();
}

#[wasm_bindgen_test]
fn test_highlighter_markup_keeps_selection() {
    let editor = editable();
    let doc = TextDocument::with_text_and_selection("let x = 1;\nlet y = 2;", 4, 15);
    let wrap = |el: &HtmlElement| {
        let lines = el.query_selector_all(&format!(".{LINE_CLASS}")).unwrap();
        for i in 0..lines.length() {
            let line: HtmlElement = lines.get(i).unwrap().unchecked_into();
            let html = line.inner_html();
            line.set_inner_html(&format!("<span class=\"tok\">{html}</span>"));
        }
    };
    write_content(&editor, &doc, Some(&wrap)).unwrap();
    assert!(editor.query_selector(".tok").unwrap().is_some());
    let read = read_document(&editor, &native_selection().unwrap()).unwrap();
    assert!(read.strict_equals(&doc), "got {read:?}");
    editor.remove();
}

// === Foreign markup ===

#[wasm_bindgen_test]
fn test_reader_handles_browser_blocks() {
    let editor = editable();
    editor.set_inner_html("foo<div>bar</div><div><br></div>");
    assert_eq!(read_text(&editor), "foo\nbar\n");

    editor.set_inner_html("a<br>b");
    assert_eq!(read_text(&editor), "a\nb");

    editor.set_inner_html("a<br><br>");
    assert_eq!(read_text(&editor), "a\n");

    editor.set_inner_html("a<span contenteditable=\"false\">widget</span>b");
    assert_eq!(read_text(&editor), "ab");
    editor.remove();
}

#[wasm_bindgen_test]
fn test_reader_resolves_element_endpoints() {
    let editor = editable();
    editor.set_inner_html("ab<br>cd");
    let selection = native_selection().unwrap();
    // Caret between the <br> and "cd", addressed by child index.
    selection
        .set_base_and_extent(&editor, 2, &editor, 2)
        .unwrap();
    let doc = read_document(&editor, &selection).unwrap();
    assert_eq!(doc.text(), "ab\ncd");
    assert_eq!((doc.anchor(), doc.focus()), (3, 3));

    selection
        .set_base_and_extent(&editor, 0, &editor, 3)
        .unwrap();
    let doc = read_document(&editor, &selection).unwrap();
    assert_eq!((doc.anchor(), doc.focus()), (0, 5));
    editor.remove();
}

// === Bridge ===

#[wasm_bindgen_test]
fn test_bridge_classifies_pushes() {
    let editor = editable();
    let bridge = DomBridge::new(editor.clone());
    let contents = Rc::new(RefCell::new(0));
    let selections = Rc::new(RefCell::new(0));
    {
        let contents = contents.clone();
        bridge.on_content_changed(move |_| *contents.borrow_mut() += 1);
        let selections = selections.clone();
        bridge.on_selection_changed(move |_| *selections.borrow_mut() += 1);
    }

    let doc = TextDocument::with_caret("abc", 3);
    assert_eq!(bridge.push_to_dom(doc.clone()).unwrap(), ChangeKind::Content);
    assert_eq!(bridge.push_to_dom(doc.clone()).unwrap(), ChangeKind::None);
    assert_eq!(
        bridge.push_to_dom(doc.with_selection(0, 3)).unwrap(),
        ChangeKind::Selection
    );
    assert_eq!(*contents.borrow(), 1);
    assert_eq!(*selections.borrow(), 1);

    // Nothing moved in the DOM since the last push.
    assert_eq!(bridge.poll().unwrap(), ChangeKind::None);
    assert_eq!(bridge.line_metrics().len(), 1);
    editor.remove();
}

// === Editor ===

fn editor_with(code: &str) -> (HtmlElement, CodeEditor) {
    let host = element("div");
    let editor = CodeEditor::new(
        host.clone(),
        EditorOptions {
            code: Some(code.to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    (host, editor)
}

#[wasm_bindgen_test]
fn test_editor_takes_host_text() {
    let host = element("div");
    host.set_text_content(Some("fn main() {}"));
    let editor = CodeEditor::new(host.clone(), EditorOptions::default()).unwrap();
    assert_eq!(editor.code(), "fn main() {}");
    assert_eq!(editor.element().get_attribute("contenteditable").as_deref(), Some("true"));
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_editor_set_code_resets_history() {
    let (host, editor) = editor_with("a");
    let updates = Rc::new(RefCell::new(Vec::new()));
    {
        let updates = updates.clone();
        editor.on_update(move |code| updates.borrow_mut().push(code.to_string()));
    }
    editor.set_code("b\nc").unwrap();
    assert_eq!(editor.code(), "b\nc");
    assert!(!editor.can_undo());
    assert_eq!(*updates.borrow(), vec!["b\nc".to_string()]);
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_editor_undo_redo_through_checkpoints() {
    let (host, editor) = editor_with("a");
    editor.set_document(TextDocument::new("ab")).unwrap();
    editor.record_history().unwrap();
    assert!(editor.can_undo());

    assert!(editor.undo().unwrap());
    assert_eq!(editor.code(), "a");
    assert!(editor.redo().unwrap());
    assert_eq!(editor.code(), "ab");
    assert!(!editor.redo().unwrap());
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_editor_gutter_and_highlights() {
    let (host, editor) = editor_with("a\nb\nc");
    let rows = host.query_selector_all(".weaver-code-gutter-line").unwrap();
    assert_eq!(rows.length(), 3);

    editor.set_highlighted_line(Some(2)).unwrap();
    assert_eq!(editor.highlighted_line(), Some(2));
    assert!(host.query_selector(".weaver-code-highlighted").unwrap().is_some());

    let highlight = editor.create_highlight().unwrap();
    highlight.set_line_number(Some(3));
    highlight.set_visible(true);
    highlight.set_css_class(Some("breakpoint".into()));
    assert_eq!(highlight.line_number(), Some(3));
    assert!(host.query_selector(".breakpoint").unwrap().is_some());
    highlight.delete();
    assert!(highlight.is_deleted());
    assert!(host.query_selector(".breakpoint").unwrap().is_none());

    editor.set_code("only").unwrap();
    let rows = host.query_selector_all(".weaver-code-gutter-line").unwrap();
    assert_eq!(rows.length(), 1);
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_editor_settings_reach_the_element() {
    let (host, editor) = editor_with("x");
    editor.set_readonly(true).unwrap();
    assert_eq!(editor.element().get_attribute("contenteditable").as_deref(), Some("false"));
    editor.set_dir(weaver_code_browser::Dir::Rtl).unwrap();
    assert_eq!(editor.element().get_attribute("dir").as_deref(), Some("rtl"));
    editor.set_language(Some("rust")).unwrap();
    assert!(editor.element().class_list().contains("language-rust"));
    editor.set_language(Some("toml")).unwrap();
    assert!(!editor.element().class_list().contains("language-rust"));
    assert!(editor.element().class_list().contains("language-toml"));
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_editor_destroy_detaches() {
    let (host, editor) = editor_with("x");
    editor.destroy();
    assert!(editor.is_destroyed());
    assert_eq!(host.child_element_count(), 0);
    assert_eq!(editor.set_code("y"), Err(EditorError::Destroyed));
    // Idempotent.
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_attach_missing_selector() {
    let err = CodeEditor::attach("#does-not-exist", EditorOptions::default()).err();
    assert!(matches!(
        err,
        Some(EditorError::Dom(weaver_code_browser::DomError::ElementNotFound(_)))
    ));
}

// === Event handling ===

/// Mark the editor focused the way a real focus event would.
fn focus(editor: &CodeEditor) {
    let event = Event::new("focus").unwrap();
    editor.element().dispatch_event(&event).unwrap();
}

fn press(editor: &CodeEditor, key: &str) -> KeyboardEvent {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    editor.element().dispatch_event(&event).unwrap();
    event
}

fn clipboard(editor: &CodeEditor, kind: &str, text: &str) -> DataTransfer {
    let data = DataTransfer::new().unwrap();
    data.set_data("text/plain", text).unwrap();
    let init = ClipboardEventInit::new();
    init.set_clipboard_data(Some(&data));
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = ClipboardEvent::new_with_event_init_dict(kind, &init).unwrap();
    editor.element().dispatch_event(&event).unwrap();
    data
}

#[wasm_bindgen_test]
fn test_enter_after_brace_runs_the_pipeline() {
    let (host, editor) = editor_with("");
    focus(&editor);
    editor
        .set_document(TextDocument::with_caret("if (x) {", 8))
        .unwrap();

    let event = press(&editor, "Enter");
    assert!(event.default_prevented());
    assert_eq!(editor.code(), "if (x) {\n  ");
    let doc = editor.document();
    assert_eq!((doc.anchor(), doc.focus()), (11, 11));
    // The DOM holds the same document.
    let read = read_document(editor.element(), &native_selection().unwrap()).unwrap();
    assert!(read.strict_equals(&doc), "DOM has {read:?}");
    assert_eq!(host.query_selector_all(".weaver-code-gutter-line").unwrap().length(), 2);
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_keydown_is_ignored_while_unfocused() {
    let (host, editor) = editor_with("{");
    let event = press(&editor, "Enter");
    assert!(!event.default_prevented());
    assert_eq!(editor.code(), "{");
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_cut_is_one_undo_step() {
    let (host, editor) = editor_with("hello world");
    focus(&editor);
    editor
        .set_document(TextDocument::with_text_and_selection("hello world", 5, 11))
        .unwrap();
    assert!(!editor.can_undo());

    let data = clipboard(&editor, "cut", "");
    assert_eq!(data.get_data("text/plain").unwrap(), "world");
    assert_eq!(editor.code(), "hello");
    assert!(editor.can_undo());

    assert!(editor.undo().unwrap());
    assert_eq!(editor.code(), "hello world");
    assert!(!editor.can_undo());
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_paste_is_one_undo_step() {
    let (host, editor) = editor_with("ab");
    focus(&editor);
    editor.set_document(TextDocument::with_caret("ab", 1)).unwrap();

    clipboard(&editor, "paste", "X\r\nY");
    assert_eq!(editor.code(), "aX\nYb");
    assert_eq!(editor.document().focus(), 4);

    assert!(editor.undo().unwrap());
    assert_eq!(editor.code(), "ab");
    assert!(!editor.can_undo());
    assert!(editor.redo().unwrap());
    assert_eq!(editor.code(), "aX\nYb");
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_selection_only_change_adds_no_history() {
    let (host, editor) = editor_with("abc");
    focus(&editor);
    editor.set_document(TextDocument::with_caret("abc", 1)).unwrap();
    editor.record_history().unwrap();
    editor
        .set_document(TextDocument::with_text_and_selection("abc", 0, 3))
        .unwrap();
    editor.record_history().unwrap();
    assert!(!editor.can_undo());
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_remove_listener_of_either_kind() {
    let (host, editor) = editor_with("abc");
    focus(&editor);
    let updates = Rc::new(RefCell::new(0));
    let selections = Rc::new(RefCell::new(0));
    let update_id = {
        let updates = updates.clone();
        editor.on_update(move |_| *updates.borrow_mut() += 1)
    };
    let selection_id = {
        let selections = selections.clone();
        editor.on_selection_focus_changed(move |_| *selections.borrow_mut() += 1)
    };

    assert!(editor.remove_listener(selection_id));
    assert!(!editor.remove_listener(selection_id));
    editor.set_document(TextDocument::with_caret("abc", 2)).unwrap();
    editor.set_document(TextDocument::with_caret("abcd", 4)).unwrap();
    assert_eq!(*selections.borrow(), 0);
    assert_eq!(*updates.borrow(), 1);

    assert!(editor.remove_listener(update_id));
    editor.set_document(TextDocument::with_caret("abcde", 5)).unwrap();
    assert_eq!(*updates.borrow(), 1);
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_empty_editor_has_one_gutter_row() {
    let (host, editor) = editor_with("");
    assert_eq!(host.query_selector_all(".weaver-code-gutter-line").unwrap().length(), 1);
    assert_eq!(editor.line_metrics().len(), 1);
    let lines = editor.element().query_selector_all(&format!(".{LINE_CLASS}")).unwrap();
    assert_eq!(lines.length(), 1);
    editor.destroy();
    host.remove();
}

#[wasm_bindgen_test]
fn test_rehighlight_after_blur_leaves_selection_alone() {
    let host = element("div");
    let runs = Rc::new(RefCell::new(0));
    let highlighter = {
        let runs = runs.clone();
        move |_: &HtmlElement| *runs.borrow_mut() += 1
    };
    let editor = CodeEditor::new(
        host.clone(),
        EditorOptions {
            code: Some("let x = 1;".to_string()),
            highlighter: Some(Rc::new(highlighter)),
            ..Default::default()
        },
    )
    .unwrap();
    focus(&editor);
    editor.set_document(TextDocument::with_caret("let x = 1;", 3)).unwrap();
    editor.element().dispatch_event(&Event::new("blur").unwrap()).unwrap();

    // The user moved on to some other text on the page.
    let other = element("p");
    other.set_text_content(Some("elsewhere"));
    let selection = native_selection().unwrap();
    selection.select_all_children(&other).unwrap();

    let before = *runs.borrow();
    editor.set_language(Some("rust")).unwrap();
    assert_eq!(*runs.borrow(), before + 1);
    let anchor = selection.anchor_node().unwrap();
    assert!(other.contains(Some(&anchor)));

    editor.destroy();
    other.remove();
    host.remove();
}

// === Platform detection ===

#[wasm_bindgen_test]
fn test_platform_detection() {
    let plat = platform();
    // Values depend on the browser running the test.
    assert_eq!(plat.uses_meta_shortcuts(), plat.mac || plat.ios);
}
