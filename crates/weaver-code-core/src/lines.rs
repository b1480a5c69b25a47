//! Line layout shared by the DOM writer and line metrics.
//!
//! A full content write renders one line container per `\n`-separated line.
//! Every line except the last ends with a `\n` break marker; an empty final
//! line gets a filler break so the browser gives it height.

use crate::text::utf16_len;

/// One rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    /// Line text without the trailing newline.
    pub text: String,
    /// UTF-16 offset of the first character of the line.
    pub start: usize,
    /// Length in UTF-16 code units, excluding the break marker.
    pub len: usize,
    /// Whether the line ends with a `\n` marker.
    pub break_marker: bool,
    /// Whether the line needs a filler break to be rendered.
    pub filler: bool,
}

impl LineSpec {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Position of an offset within the line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinePosition {
    /// Zero-based line index.
    pub line: usize,
    /// UTF-16 column within the line.
    pub column: usize,
}

/// The line containers a full write produces for some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineLayout {
    lines: Vec<LineSpec>,
}

impl LineLayout {
    pub fn new(text: &str) -> Self {
        let parts = split_lines(text);
        let last = parts.len() - 1;
        let mut start = 0;
        let mut lines = Vec::with_capacity(parts.len());

        for (idx, part) in parts.into_iter().enumerate() {
            let len = utf16_len(part);
            let is_last = idx == last;
            lines.push(LineSpec {
                text: part.to_string(),
                start,
                len,
                break_marker: !is_last,
                // Only a final empty line after a newline needs the filler;
                // an empty document renders fine as a single empty line.
                filler: is_last && part.is_empty() && idx > 0,
            });
            start += len + 1;
        }

        Self { lines }
    }

    pub fn lines(&self) -> &[LineSpec] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total length in UTF-16 code units.
    pub fn text_len(&self) -> usize {
        self.lines.last().map(LineSpec::end).unwrap_or(0)
    }

    /// Locate an offset. Offsets past the end resolve to the end of the last line.
    pub fn locate(&self, offset: usize) -> LinePosition {
        for (line, spec) in self.lines.iter().enumerate() {
            if offset <= spec.end() {
                return LinePosition {
                    line,
                    column: offset.saturating_sub(spec.start),
                };
            }
        }
        let line = self.lines.len().saturating_sub(1);
        LinePosition {
            line,
            column: self.lines.get(line).map(|l| l.len).unwrap_or(0),
        }
    }

    /// Offset of the start of `line`, clamped to the last line.
    pub fn line_start(&self, line: usize) -> usize {
        self.lines
            .get(line)
            .or(self.lines.last())
            .map(|l| l.start)
            .unwrap_or(0)
    }
}

/// Split text into lines on `\n`. A trailing newline yields an empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Locate `offset` in `text`, clamped to the end of the last line.
pub fn locate(text: &str, offset: usize) -> LinePosition {
    LineLayout::new(text).locate(offset)
}

/// Zero-based line index containing `offset` in `text`.
pub fn line_of_offset(text: &str, offset: usize) -> usize {
    locate(text, offset).line
}

/// UTF-16 offset where `line` starts, clamped to the last line.
pub fn line_start_offset(text: &str, line: usize) -> usize {
    LineLayout::new(text).line_start(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe(layout: &LineLayout) -> String {
        layout
            .lines()
            .iter()
            .map(|l| {
                format!(
                    "{}+{} {:?}{}{}",
                    l.start,
                    l.len,
                    l.text,
                    if l.break_marker { " br" } else { "" },
                    if l.filler { " filler" } else { "" },
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_layout_plan() {
        let layout = LineLayout::new("fn main() {\n  x\n}\n");
        insta::assert_snapshot!(describe(&layout), @r#"
        0+11 "fn main() {" br
        12+3 "  x" br
        16+1 "}" br
        18+0 "" filler
        "#);
    }

    #[test]
    fn test_empty_document() {
        let layout = LineLayout::new("");
        assert_eq!(layout.len(), 1);
        assert!(!layout.lines()[0].filler);
        assert!(!layout.lines()[0].break_marker);
        assert_eq!(layout.locate(0), LinePosition { line: 0, column: 0 });
    }

    #[test]
    fn test_locate() {
        let layout = LineLayout::new("ab\ncd\n");
        assert_eq!(layout.locate(0), LinePosition { line: 0, column: 0 });
        // End of line zero, before the newline.
        assert_eq!(layout.locate(2), LinePosition { line: 0, column: 2 });
        assert_eq!(layout.locate(3), LinePosition { line: 1, column: 0 });
        assert_eq!(layout.locate(5), LinePosition { line: 1, column: 2 });
        assert_eq!(layout.locate(6), LinePosition { line: 2, column: 0 });
        // Past the end clamps to the end of the last line.
        assert_eq!(layout.locate(60), LinePosition { line: 2, column: 0 });
        assert_eq!(layout.text_len(), 6);
    }

    #[test]
    fn test_line_start_and_index() {
        let layout = LineLayout::new("a\nbb\nccc");
        assert_eq!(layout.line_start(0), 0);
        assert_eq!(layout.line_start(2), 5);
        assert_eq!(layout.line_start(9), 5);
        assert_eq!(line_of_offset("a\nbb\nccc", 4), 1);
        assert_eq!(line_start_offset("a\nbb\nccc", 1), 2);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(locate("a\nbb", 3), LinePosition { line: 1, column: 1 });
    }
}
