//! Bracket and quote pairing.

use super::{InputProcessor, ProcessOutcome};
use crate::config::BracketProcessorConfig;
use crate::document::{SelectionType, TextDocument};
use crate::error::DocumentError;
use crate::keyboard::KeyEvent;

#[derive(Debug, Clone)]
pub struct BracketProcessor {
    config: BracketProcessorConfig,
}

impl BracketProcessor {
    pub fn new(config: BracketProcessorConfig) -> Self {
        Self { config }
    }

    fn closer_for(&self, open: char) -> Option<char> {
        self.config
            .pairs
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, c)| *c)
    }

    fn is_closer(&self, c: char) -> bool {
        self.config.pairs.iter().any(|(_, close)| *close == c)
    }
}

/// The single character a key event types, if any.
fn typed_char(event: &KeyEvent) -> Option<char> {
    if !event.is_mutating_input() {
        return None;
    }
    let mut chars = event.character()?.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

impl InputProcessor for BracketProcessor {
    fn process(
        &self,
        doc: &TextDocument,
        event: &KeyEvent,
    ) -> Result<ProcessOutcome, DocumentError> {
        if !self.config.enabled || !doc.has_selection() {
            return Ok(ProcessOutcome::Unchanged);
        }
        let Some(key) = typed_char(event) else {
            return Ok(ProcessOutcome::Unchanged);
        };

        // Type over a closer that is already there.
        if self.is_closer(key)
            && doc.selection_type() == SelectionType::Caret
            && doc.character_after() == Some(key)
        {
            return Ok(ProcessOutcome::Handled(doc.skip_character()?));
        }

        let Some(close) = self.closer_for(key) else {
            return Ok(ProcessOutcome::Unchanged);
        };
        if doc.character_before() == Some('\\') {
            return Ok(ProcessOutcome::Unchanged);
        }

        let is_quote = key == close;
        let at_boundary = matches!(doc.character_after(), None | Some(' ') | Some('\n'));
        if !is_quote && !at_boundary {
            return Ok(ProcessOutcome::Unchanged);
        }

        let mut buf = [0; 4];
        let opened = doc.insert_text(key.encode_utf8(&mut buf))?;
        let paired = opened.insert_text_with(close.encode_utf8(&mut buf), false, false)?;
        Ok(ProcessOutcome::Handled(paired))
    }

    fn name(&self) -> &str {
        "bracket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::Key;

    fn press(doc: TextDocument, key: &str) -> ProcessOutcome {
        BracketProcessor::new(BracketProcessorConfig::default())
            .process(&doc, &KeyEvent::plain(Key::character(key)))
            .unwrap()
    }

    fn handled(outcome: ProcessOutcome) -> TextDocument {
        match outcome {
            ProcessOutcome::Handled(d) => d,
            other => panic!("expected handled, got {other:?}"),
        }
    }

    #[test]
    fn test_pairs_at_end_of_text() {
        let d = handled(press(TextDocument::with_caret("foo", 3), "("));
        assert_eq!(d.text(), "foo()");
        assert_eq!((d.anchor(), d.focus()), (4, 4));
    }

    #[test]
    fn test_pairs_before_space_or_newline() {
        let d = handled(press(TextDocument::with_caret("a \n", 1), "["));
        assert_eq!(d.text(), "a[] \n");
        let d = handled(press(TextDocument::with_caret("a\nb", 1), "{"));
        assert_eq!(d.text(), "a{}\nb");
        assert_eq!(d.focus(), 2);
    }

    #[test]
    fn test_no_pair_before_word() {
        let outcome = press(TextDocument::with_caret("foo", 0), "(");
        assert_eq!(outcome, ProcessOutcome::Unchanged);
    }

    #[test]
    fn test_skip_over_existing_closer() {
        let d = handled(press(TextDocument::with_caret("foo()", 4), ")"));
        assert_eq!(d.text(), "foo()");
        assert_eq!(d.focus(), 5);
    }

    #[test]
    fn test_quotes_always_pair() {
        let d = handled(press(TextDocument::with_caret("xy", 1), "\""));
        assert_eq!(d.text(), "x\"\"y");
        assert_eq!(d.focus(), 2);
    }

    #[test]
    fn test_quote_skips_over_itself() {
        let d = handled(press(TextDocument::with_caret("'a'", 2), "'"));
        assert_eq!(d.text(), "'a'");
        assert_eq!(d.focus(), 3);
    }

    #[test]
    fn test_escaped_opener_is_literal() {
        let outcome = press(TextDocument::with_caret("\"\\", 2), "\"");
        assert_eq!(outcome, ProcessOutcome::Unchanged);
    }

    #[test]
    fn test_range_is_replaced_by_pair() {
        let d = handled(press(TextDocument::with_text_and_selection("a bc", 2, 4), "("));
        assert_eq!(d.text(), "a ()");
        assert_eq!(d.focus(), 3);
    }

    #[test]
    fn test_lone_closer_is_left_to_browser() {
        let outcome = press(TextDocument::with_caret("a", 1), ")");
        assert_eq!(outcome, ProcessOutcome::Unchanged);
    }
}
