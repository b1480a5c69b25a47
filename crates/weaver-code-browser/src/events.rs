//! Conversion of browser events into editor inputs.

use smol_str::SmolStr;
use web_sys::{ClipboardEvent, KeyboardEvent};
use weaver_code_core::{Key, KeyEvent, Modifiers};

use crate::error::DomError;
use crate::platform::platform;

/// Legacy `keyCode` browsers report for keys consumed by an IME.
const IME_PROCESS_KEY_CODE: u32 = 229;

/// Classify a DOM keyboard event.
pub fn key_event(event: &KeyboardEvent) -> KeyEvent {
    let code = event.code();
    KeyEvent {
        key: Key::from_dom_key(&event.key()),
        code: (!code.is_empty()).then(|| SmolStr::new(code)),
        modifiers: Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        },
        repeat: event.repeat(),
        is_composing: event.is_composing() || event.key_code() == IME_PROCESS_KEY_CODE,
        is_mac: platform().uses_meta_shortcuts(),
    }
}

/// Plain text carried by a paste event, line endings untouched.
pub fn clipboard_text(event: &ClipboardEvent) -> Option<String> {
    event
        .clipboard_data()
        .and_then(|data| data.get_data("text/plain").ok())
}

/// Put `text` on the clipboard of a cut or copy event.
pub fn set_clipboard_text(event: &ClipboardEvent, text: &str) -> Result<(), DomError> {
    let data = event.clipboard_data().ok_or(DomError::Js {
        operation: "clipboard_data",
        message: "event carries no clipboard data".into(),
    })?;
    data.set_data("text/plain", text)
        .map_err(|e| DomError::js("set_data", e))
}
