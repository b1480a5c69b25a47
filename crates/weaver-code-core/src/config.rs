//! Editor configuration.
//!
//! Deserialized from the options object handed to `createEditor`. Every field
//! has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::history::MAX_HISTORY;

/// Text direction of the editable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    #[default]
    Ltr,
    Rtl,
}

impl Dir {
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Ltr => "ltr",
            Dir::Rtl => "rtl",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ltr" => Some(Dir::Ltr),
            "rtl" => Some(Dir::Rtl),
            _ => None,
        }
    }
}

/// Built-in keydown processors, used to order the default pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorKind {
    Tab,
    Newline,
    Bracket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabProcessorConfig {
    pub enabled: bool,
}

impl Default for TabProcessorConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewlineProcessorConfig {
    pub enabled: bool,
    /// Text before the caret matching this adds one level of indentation.
    pub increment_indentation_on: String,
    /// Text after the caret matching this is pushed onto its own line.
    pub move_to_new_line: String,
}

impl Default for NewlineProcessorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            increment_indentation_on: r"[({\[]$".to_string(),
            move_to_new_line: r"^[)}\]]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BracketProcessorConfig {
    pub enabled: bool,
    /// Opening character and the closer inserted after it.
    pub pairs: Vec<(char, char)>,
}

impl Default for BracketProcessorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pairs: vec![('(', ')'), ('[', ']'), ('{', '}'), ('\'', '\''), ('"', '"')],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GutterConfig {
    pub enabled: bool,
    /// CSS width of the gutter; natural width when unset.
    pub width: Option<String>,
    pub border: bool,
    /// Extra class added to the gutter element.
    pub class: Option<String>,
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: None,
            border: true,
            class: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// String inserted for one level of indentation.
    pub tab: String,
    pub dir: Dir,
    pub spellcheck: bool,
    #[serde(alias = "history")]
    pub max_undo_history: usize,
    pub history_debounce_ms: u32,
    pub highlight_throttle_ms: u32,
    pub scroll_throttle_ms: u32,
    pub readonly: bool,
    pub wraps_text: bool,
    pub language: Option<String>,
    pub tab_processor: TabProcessorConfig,
    pub newline_processor: NewlineProcessorConfig,
    pub bracket_processor: BracketProcessorConfig,
    pub gutter: GutterConfig,
    pub processor_order: Vec<ProcessorKind>,

    // Legacy switches, folded into the processor configs by `normalized`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catch_tab: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_indent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_closing: Option<bool>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab: "  ".to_string(),
            dir: Dir::Ltr,
            spellcheck: false,
            max_undo_history: MAX_HISTORY,
            history_debounce_ms: 300,
            highlight_throttle_ms: 16,
            scroll_throttle_ms: 16,
            readonly: false,
            wraps_text: false,
            language: None,
            tab_processor: TabProcessorConfig::default(),
            newline_processor: NewlineProcessorConfig::default(),
            bracket_processor: BracketProcessorConfig::default(),
            gutter: GutterConfig::default(),
            processor_order: vec![
                ProcessorKind::Tab,
                ProcessorKind::Newline,
                ProcessorKind::Bracket,
            ],
            catch_tab: None,
            preserve_indent: None,
            add_closing: None,
        }
    }
}

impl EditorConfig {
    /// Fold legacy switches into the processor configs and fix degenerate values.
    pub fn normalized(mut self) -> Self {
        if let Some(enabled) = self.catch_tab.take() {
            self.tab_processor.enabled = enabled;
        }
        if let Some(enabled) = self.preserve_indent.take() {
            self.newline_processor.enabled = enabled;
        }
        if let Some(enabled) = self.add_closing.take() {
            self.bracket_processor.enabled = enabled;
        }
        if self.tab.is_empty() {
            tracing::warn!("empty tab string, falling back to two spaces");
            self.tab = "  ".to_string();
        }
        self.max_undo_history = self.max_undo_history.max(1);
        self
    }
}
