//! weaver-code-core: framework-free logic for the weaver code editor.
//!
//! This crate provides:
//! - `TextDocument` - immutable text plus anchor/focus selection
//! - `LineLayout` - the line structure a DOM write produces
//! - `KeyEvent` - keyboard classification
//! - `Pipeline` and the tab/newline/bracket input processors
//! - `UndoRedoManager<T>` - coalescing snapshot history
//! - `Throttle`/`Debounce` state machines and listener registries
//!
//! Offsets everywhere are UTF-16 code units.

pub mod change;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod keyboard;
pub mod lines;
pub mod processors;
pub mod text;
pub mod text_helpers;
pub mod timing;

pub use change::{ChangeKind, ListenerId, Listeners, classify_change};
pub use config::{
    BracketProcessorConfig, Dir, EditorConfig, GutterConfig, NewlineProcessorConfig,
    ProcessorKind, TabProcessorConfig,
};
pub use document::{Direction, DocumentBuilder, SelectionType, TextDocument};
pub use error::{DocumentError, HistoryError};
pub use history::{HistoryClient, MAX_HISTORY, UndoRedoManager};
pub use keyboard::{Key, KeyEvent, Modifiers};
pub use lines::{LineLayout, LinePosition, LineSpec};
pub use processors::{
    BracketProcessor, InputProcessor, NewlineProcessor, Pipeline, PipelineResult,
    ProcessOutcome, TabProcessor, default_keydown_pipeline,
};
pub use smol_str::SmolStr;
pub use timing::{Debounce, Throttle, ThrottleAction};
