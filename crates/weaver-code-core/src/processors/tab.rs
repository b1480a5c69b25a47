//! Tab key: insert indentation at a caret, indent or dedent whole lines otherwise.

use super::{InputProcessor, ProcessOutcome};
use crate::config::TabProcessorConfig;
use crate::document::{SelectionType, TextDocument};
use crate::error::DocumentError;
use crate::keyboard::KeyEvent;
use crate::text::utf16_len;

#[derive(Debug, Clone)]
pub struct TabProcessor {
    tab: String,
    config: TabProcessorConfig,
}

/// How one covered line was rewritten.
struct LineEdit {
    old_start: usize,
    new_start: usize,
    /// Code units added (indent) or removed (dedent) at the line start.
    amount: usize,
}

impl TabProcessor {
    pub fn new(tab: impl Into<String>, config: TabProcessorConfig) -> Self {
        Self {
            tab: tab.into(),
            config,
        }
    }

    fn tab_width(&self) -> usize {
        self.tab.chars().count()
    }

    fn reindent(&self, doc: &TextDocument, dedent: bool) -> Result<TextDocument, DocumentError> {
        let lines = doc.expand_to_cover_lines()?;
        let mut old_start = lines.earliest();
        let mut new_start = lines.earliest();
        let mut block = String::with_capacity(lines.selected_text().len());
        let mut edits = Vec::new();

        for (idx, line) in lines.selected_text().split('\n').enumerate() {
            if idx > 0 {
                block.push('\n');
                new_start += 1;
            }
            let amount = if dedent {
                // Only whitespace actually present is removed.
                let strip = line
                    .chars()
                    .take(self.tab_width())
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .count();
                block.push_str(&line[strip..]);
                strip
            } else {
                block.push_str(&self.tab);
                block.push_str(line);
                utf16_len(&self.tab)
            };
            edits.push(LineEdit {
                old_start,
                new_start,
                amount,
            });
            let old_len = utf16_len(line);
            old_start += old_len + 1;
            new_start += if dedent {
                old_len - amount
            } else {
                old_len + amount
            };
        }

        let map = |old: usize| -> usize {
            let edit = edits
                .iter()
                .rev()
                .find(|e| e.old_start <= old)
                .unwrap_or(&edits[0]);
            let column = old - edit.old_start;
            if dedent {
                edit.new_start + column.saturating_sub(edit.amount)
            } else {
                edit.new_start + column + edit.amount
            }
        };

        let mut start = map(doc.earliest());
        let end = map(doc.latest());
        // A range starting at a line start keeps covering the new indentation.
        if !dedent
            && doc.selection_type() == SelectionType::Range
            && doc.earliest() == edits[0].old_start
        {
            start = edits[0].new_start;
        }

        let rewritten = lines.insert_text(&block)?;
        Ok(if doc.anchor() <= doc.focus() {
            rewritten.with_selection(start, end)
        } else {
            rewritten.with_selection(end, start)
        })
    }
}

impl InputProcessor for TabProcessor {
    fn process(
        &self,
        doc: &TextDocument,
        event: &KeyEvent,
    ) -> Result<ProcessOutcome, DocumentError> {
        if !self.config.enabled || !event.is_tab() || !doc.has_selection() {
            return Ok(ProcessOutcome::Unchanged);
        }

        let shift = event.shift();
        if doc.selection_type() == SelectionType::Caret && !shift {
            return Ok(ProcessOutcome::Handled(doc.insert_text(&self.tab)?));
        }

        Ok(ProcessOutcome::Handled(self.reindent(doc, shift)?))
    }

    fn name(&self) -> &str {
        "tab"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Direction;
    use crate::keyboard::{Key, Modifiers};

    fn processor() -> TabProcessor {
        TabProcessor::new("  ", TabProcessorConfig::default())
    }

    fn tab() -> KeyEvent {
        KeyEvent::plain(Key::Tab)
    }

    fn shift_tab() -> KeyEvent {
        KeyEvent::new(Key::Tab, Modifiers::SHIFT)
    }

    fn run(doc: TextDocument, event: KeyEvent) -> TextDocument {
        match processor().process(&doc, &event).unwrap() {
            ProcessOutcome::Handled(d) => d,
            other => panic!("expected handled, got {other:?}"),
        }
    }

    #[test]
    fn test_caret_inserts_tab() {
        let d = run(TextDocument::with_caret("ab", 1), tab());
        assert_eq!(d.text(), "a  b");
        assert_eq!(d.focus(), 3);
    }

    #[test]
    fn test_indent_selected_lines() {
        let d = run(TextDocument::with_text_and_selection("a\nb\nc", 0, 5), tab());
        assert_eq!(d.text(), "  a\n  b\n  c");
        assert_eq!((d.anchor(), d.focus()), (0, 11));
        assert_eq!(d.selected_text(), "  a\n  b\n  c");
    }

    #[test]
    fn test_indent_keeps_backward_direction() {
        let d = run(TextDocument::with_text_and_selection("a\nb\nc", 5, 0), tab());
        assert_eq!(d.direction(), Direction::Backward);
        assert_eq!((d.anchor(), d.focus()), (11, 0));
    }

    #[test]
    fn test_indent_partial_range_shifts_both_ends() {
        // "bc" selected inside "abc" / "def".
        let d = run(TextDocument::with_text_and_selection("abc\ndef", 1, 5), tab());
        assert_eq!(d.text(), "  abc\n  def");
        assert_eq!(d.selected_text(), "bc\n  d");
    }

    #[test]
    fn test_dedent_never_goes_negative() {
        let d = run(
            TextDocument::with_text_and_selection("    a\n b\nc", 0, 10),
            shift_tab(),
        );
        assert_eq!(d.text(), "  a\nb\nc");
        assert_eq!((d.anchor(), d.focus()), (0, 7));
    }

    #[test]
    fn test_dedent_keeps_non_whitespace() {
        let d = run(TextDocument::with_caret("\tx", 2), shift_tab());
        assert_eq!(d.text(), "x");
        assert_eq!(d.focus(), 1);

        let d = run(TextDocument::with_caret("x y", 1), shift_tab());
        assert_eq!(d.text(), "x y");
        assert_eq!(d.focus(), 1);
    }

    #[test]
    fn test_dedent_caret_inside_indentation() {
        let d = run(TextDocument::with_caret("    x", 1), shift_tab());
        assert_eq!(d.text(), "  x");
        assert_eq!(d.focus(), 0);
    }

    #[test]
    fn test_ignores_other_keys_and_disabled() {
        let doc = TextDocument::with_caret("a", 1);
        let outcome = processor()
            .process(&doc, &KeyEvent::plain(Key::Enter))
            .unwrap();
        assert_eq!(outcome, ProcessOutcome::Unchanged);

        let disabled = TabProcessor::new("  ", TabProcessorConfig { enabled: false });
        assert_eq!(
            disabled.process(&doc, &tab()).unwrap(),
            ProcessOutcome::Unchanged
        );

        let unfocused = TextDocument::new("a");
        assert_eq!(
            processor().process(&unfocused, &tab()).unwrap(),
            ProcessOutcome::Unchanged
        );
    }
}
