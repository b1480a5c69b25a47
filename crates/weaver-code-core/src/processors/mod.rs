//! Keyboard input processors.
//!
//! A processor looks at the current document and a key event and either
//! leaves the document alone, replaces it, or replaces it and claims the
//! event. Processors never touch the DOM; the editor decides whether the
//! pipeline result needs writing back.

mod bracket;
mod newline;
mod tab;

use std::fmt;

pub use bracket::BracketProcessor;
pub use newline::NewlineProcessor;
pub use tab::TabProcessor;

use crate::config::{EditorConfig, ProcessorKind};
use crate::document::TextDocument;
use crate::error::DocumentError;
use crate::keyboard::KeyEvent;

/// What a processor did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No change; the pipeline continues with the same document.
    Unchanged,
    /// Continue the pipeline with this document.
    Replace(TextDocument),
    /// Use this document, stop the pipeline and suppress the browser default.
    Handled(TextDocument),
}

/// A single step of an input pipeline.
pub trait InputProcessor {
    fn process(
        &self,
        doc: &TextDocument,
        event: &KeyEvent,
    ) -> Result<ProcessOutcome, DocumentError>;

    /// Name used in traces.
    fn name(&self) -> &str {
        "processor"
    }
}

impl<F> InputProcessor for F
where
    F: Fn(&TextDocument, &KeyEvent) -> Result<ProcessOutcome, DocumentError>,
{
    fn process(
        &self,
        doc: &TextDocument,
        event: &KeyEvent,
    ) -> Result<ProcessOutcome, DocumentError> {
        self(doc, event)
    }
}

/// Result of running a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub document: TextDocument,
    /// A processor claimed the event; the browser default must be prevented.
    pub handled: bool,
    /// The document differs from the input (strict comparison).
    pub changed: bool,
}

/// Ordered chain of processors.
#[derive(Default)]
pub struct Pipeline {
    processors: Vec<Box<dyn InputProcessor>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| p.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, processor: impl InputProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    pub fn with(mut self, processor: impl InputProcessor + 'static) -> Self {
        self.push(processor);
        self
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run every processor in order until one handles the event.
    pub fn run(&self, doc: &TextDocument, event: &KeyEvent) -> Result<PipelineResult, DocumentError> {
        let mut current = doc.clone();
        let mut handled = false;

        for processor in &self.processors {
            match processor.process(&current, event)? {
                ProcessOutcome::Unchanged => {}
                ProcessOutcome::Replace(next) => {
                    tracing::trace!(processor = processor.name(), "replaced document");
                    current = next;
                }
                ProcessOutcome::Handled(next) => {
                    tracing::trace!(processor = processor.name(), "handled event");
                    current = next;
                    handled = true;
                    break;
                }
            }
        }

        let changed = !current.strict_equals(doc);
        Ok(PipelineResult {
            document: current,
            handled,
            changed,
        })
    }
}

/// Build the default keydown pipeline in the configured order.
///
/// Fails if a configured newline pattern does not compile.
pub fn default_keydown_pipeline(config: &EditorConfig) -> Result<Pipeline, DocumentError> {
    let mut pipeline = Pipeline::new();
    for kind in &config.processor_order {
        match kind {
            ProcessorKind::Tab => pipeline.push(TabProcessor::new(
                config.tab.clone(),
                config.tab_processor.clone(),
            )),
            ProcessorKind::Newline => pipeline.push(NewlineProcessor::new(
                config.tab.clone(),
                &config.newline_processor,
            )?),
            ProcessorKind::Bracket => {
                pipeline.push(BracketProcessor::new(config.bracket_processor.clone()))
            }
        }
    }
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{Key, Modifiers};

    fn enter() -> KeyEvent {
        KeyEvent::plain(Key::Enter)
    }

    fn typed(c: &str) -> KeyEvent {
        KeyEvent::plain(Key::character(c))
    }

    #[test]
    fn test_unchanged_processors_pass_through() {
        let pipeline = Pipeline::new()
            .with(|_: &TextDocument, _: &KeyEvent| Ok(ProcessOutcome::Unchanged));
        let doc = TextDocument::with_caret("abc", 1);
        let result = pipeline.run(&doc, &typed("x")).unwrap();
        assert!(!result.handled);
        assert!(!result.changed);
        assert_eq!(result.document, doc);
    }

    #[test]
    fn test_replace_continues_and_handled_stops() {
        let pipeline = Pipeline::new()
            .with(|d: &TextDocument, _: &KeyEvent| Ok(ProcessOutcome::Replace(d.insert_text("a")?)))
            .with(|d: &TextDocument, _: &KeyEvent| Ok(ProcessOutcome::Handled(d.insert_text("b")?)))
            .with(|d: &TextDocument, _: &KeyEvent| Ok(ProcessOutcome::Replace(d.insert_text("c")?)));
        let result = pipeline
            .run(&TextDocument::with_caret("", 0), &typed("x"))
            .unwrap();
        assert_eq!(result.document.text(), "ab");
        assert!(result.handled);
        assert!(result.changed);
    }

    #[test]
    fn test_selection_only_change_counts_as_changed() {
        let pipeline = Pipeline::new()
            .with(|d: &TextDocument, _: &KeyEvent| Ok(ProcessOutcome::Replace(d.select_all())));
        let doc = TextDocument::with_caret("abc", 0);
        let result = pipeline.run(&doc, &typed("x")).unwrap();
        assert!(result.changed);
        assert!(result.document.perceptually_equals(&doc));
    }

    #[test]
    fn test_errors_propagate() {
        let pipeline = Pipeline::new()
            .with(|d: &TextDocument, _: &KeyEvent| Ok(ProcessOutcome::Replace(d.delete_selection()?)));
        let err = pipeline
            .run(&TextDocument::new("abc"), &typed("x"))
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidSelection { .. }));
    }

    #[test]
    fn test_default_pipeline_auto_indent() {
        let pipeline = default_keydown_pipeline(&EditorConfig::default()).unwrap();
        assert_eq!(pipeline.len(), 3);
        let doc = TextDocument::with_caret("if (x) {", 8);
        let result = pipeline.run(&doc, &enter()).unwrap();
        assert_eq!(result.document.text(), "if (x) {\n  ");
        assert_eq!(result.document.focus(), 11);
        assert!(result.handled);
    }

    #[test]
    fn test_default_pipeline_closing_bracket_reflow() {
        let pipeline = default_keydown_pipeline(&EditorConfig::default()).unwrap();
        let doc = TextDocument::with_caret("{}", 1);
        let result = pipeline.run(&doc, &enter()).unwrap();
        assert_eq!(result.document.text(), "{\n  \n}");
        assert_eq!(result.document.focus(), 4);
        assert_eq!(result.document.anchor(), 4);
    }

    #[test]
    fn test_default_pipeline_respects_order_and_flags() {
        let mut config = EditorConfig::default();
        config.processor_order = vec![ProcessorKind::Bracket];
        let pipeline = default_keydown_pipeline(&config).unwrap();
        assert_eq!(pipeline.len(), 1);
        let result = pipeline
            .run(&TextDocument::with_caret("", 0), &enter())
            .unwrap();
        assert!(!result.handled);

        config.bracket_processor.enabled = false;
        let pipeline = default_keydown_pipeline(&config).unwrap();
        let result = pipeline
            .run(&TextDocument::with_caret("", 0), &typed("("))
            .unwrap();
        assert!(!result.changed);
    }

    #[test]
    fn test_default_pipeline_rejects_bad_pattern() {
        let mut config = EditorConfig::default();
        config.newline_processor.move_to_new_line = "([".to_string();
        let err = default_keydown_pipeline(&config).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPattern { .. }));
    }

    #[test]
    fn test_modified_keys_fall_through() {
        let pipeline = default_keydown_pipeline(&EditorConfig::default()).unwrap();
        let event = KeyEvent::new(Key::character("("), Modifiers::CTRL);
        let result = pipeline
            .run(&TextDocument::with_caret("", 0), &event)
            .unwrap();
        assert!(!result.handled);
        assert!(!result.changed);
    }
}
