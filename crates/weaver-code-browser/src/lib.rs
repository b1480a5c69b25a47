//! Browser DOM layer for the weaver code editor.
//!
//! Keeps a contenteditable element and an immutable `TextDocument` in
//! lockstep. Assumes a `wasm32-unknown-unknown` target.
//!
//! # Architecture
//!
//! - `dom_reader`: DOM + native selection → `TextDocument`
//! - `dom_writer`: `TextDocument` → line markup and native selection
//! - `bridge`: owner of the current document, change classification, line metrics
//! - `editor`: `CodeEditor`, wiring DOM events to pipelines and history
//! - `gutter`: line numbers and line highlight overlays
//! - `timers`: throttled/debounced tasks on browser timeouts
//! - `platform`: Browser/OS detection for shortcut conventions
//!
//! This crate re-exports `weaver-code-core`, so consumers only need to
//! depend on `weaver-code-browser`.

pub use weaver_code_core;
pub use weaver_code_core::*;

pub mod bridge;
pub mod dom_reader;
pub mod dom_writer;
pub mod editor;
pub mod error;
pub mod events;
pub mod gutter;
pub mod platform;
pub mod timers;

pub use bridge::{DomBridge, LineMetric};
pub use dom_reader::{read_document, read_text};
pub use dom_writer::{DomPosition, Highlighter, locate_offsets, write_content, write_selection};
pub use editor::{CodeEditor, EditorOptions, SelectionFocus};
pub use error::{DomError, EditorError};
pub use gutter::{Gutter, GutterLine, HighlightHandle, LineCustomizer, LineHighlights};
pub use platform::{Platform, platform};
pub use timers::{DebouncedTask, ThrottledTask};
