//! Enter key: carry the current line's indentation onto the new line.

use regex_lite::Regex;

use super::{InputProcessor, ProcessOutcome};
use crate::config::NewlineProcessorConfig;
use crate::document::TextDocument;
use crate::error::DocumentError;
use crate::keyboard::KeyEvent;
use crate::text_helpers::line_indentation;

#[derive(Debug, Clone)]
pub struct NewlineProcessor {
    tab: String,
    enabled: bool,
    increment_indentation_on: Regex,
    move_to_new_line: Regex,
}

fn compile(pattern: &str) -> Result<Regex, DocumentError> {
    Regex::new(pattern).map_err(|e| DocumentError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

impl NewlineProcessor {
    pub fn new(
        tab: impl Into<String>,
        config: &NewlineProcessorConfig,
    ) -> Result<Self, DocumentError> {
        Ok(Self {
            tab: tab.into(),
            enabled: config.enabled,
            increment_indentation_on: compile(&config.increment_indentation_on)?,
            move_to_new_line: compile(&config.move_to_new_line)?,
        })
    }
}

impl InputProcessor for NewlineProcessor {
    fn process(
        &self,
        doc: &TextDocument,
        event: &KeyEvent,
    ) -> Result<ProcessOutcome, DocumentError> {
        // Native Enter inserts <div>/<br> soup depending on the browser, so
        // every Enter is handled here.
        if !self.enabled || !event.is_enter() || !doc.has_selection() {
            return Ok(ProcessOutcome::Unchanged);
        }

        let base = doc.delete_selection()?;
        let indent = line_indentation(base.text(), base.earliest());

        let mut new_indent = indent.to_string();
        if self.increment_indentation_on.is_match(base.preceding_text()) {
            new_indent.push_str(&self.tab);
        }

        let mut next = base.insert_text(&format!("\n{new_indent}"))?;
        if self.move_to_new_line.is_match(base.following_text()) {
            next = next.insert_text_with(&format!("\n{indent}"), false, false)?;
        }

        Ok(ProcessOutcome::Handled(next))
    }

    fn name(&self) -> &str {
        "newline"
    }
}
