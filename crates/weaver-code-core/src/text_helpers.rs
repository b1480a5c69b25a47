//! Text navigation helpers.
//!
//! Line and word boundary searches over plain text. All offsets are UTF-16
//! code units, matching `TextDocument`.

use crate::text::{byte_to_utf16, is_word_char, utf16_len, utf16_to_byte};

/// Find start of line containing offset.
pub fn find_line_start(text: &str, offset: usize) -> usize {
    let byte = utf16_to_byte(text, offset);
    match text[..byte].rfind('\n') {
        Some(pos) => byte_to_utf16(text, pos + 1),
        None => 0,
    }
}

/// Find end of line containing offset (position of newline or end of text).
pub fn find_line_end(text: &str, offset: usize) -> usize {
    let byte = utf16_to_byte(text, offset);
    match text[byte..].find('\n') {
        Some(pos) => byte_to_utf16(text, byte + pos),
        None => utf16_len(text),
    }
}

/// Leading whitespace (spaces and tabs) of the line containing offset,
/// cut off at offset itself.
pub fn line_indentation(text: &str, offset: usize) -> &str {
    let start = utf16_to_byte(text, find_line_start(text, offset));
    let end = utf16_to_byte(text, offset).max(start);
    let line = &text[start..end];
    let indent_len = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..indent_len]
}

/// Skip backward over word characters starting at offset.
pub fn find_word_start(text: &str, offset: usize) -> usize {
    let byte = utf16_to_byte(text, offset);
    let start = text[..byte]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(byte);
    byte_to_utf16(text, start)
}

/// Skip forward over word characters starting at offset.
pub fn find_word_end(text: &str, offset: usize) -> usize {
    let byte = utf16_to_byte(text, offset);
    let run: usize = text[byte..]
        .chars()
        .take_while(|c| is_word_char(*c))
        .map(char::len_utf8)
        .sum();
    byte_to_utf16(text, byte + run)
}

/// Find word boundary forward from cursor.
///
/// Skips the run of word characters at the cursor, then the run of non-word
/// characters after it.
pub fn find_word_boundary_forward(text: &str, cursor: usize) -> usize {
    let after_word = utf16_to_byte(text, find_word_end(text, cursor));
    let run: usize = text[after_word..]
        .chars()
        .take_while(|c| !is_word_char(*c))
        .map(char::len_utf8)
        .sum();
    byte_to_utf16(text, after_word + run)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_bounds() {
        let text = "first\nsecond\nthird";
        assert_eq!(find_line_start(text, 0), 0);
        assert_eq!(find_line_start(text, 8), 6);
        assert_eq!(find_line_end(text, 8), 12);
        assert_eq!(find_line_start(text, 18), 13);
        assert_eq!(find_line_end(text, 18), 18);
    }

    #[test]
    fn test_line_bounds_at_newline() {
        let text = "ab\ncd";
        // Offset 2 sits before the newline, still on the first line.
        assert_eq!(find_line_start(text, 2), 0);
        assert_eq!(find_line_end(text, 2), 2);
        // Offset 3 is the start of the second line.
        assert_eq!(find_line_start(text, 3), 3);
    }

    #[test]
    fn test_line_indentation() {
        let text = "fn main() {\n    let x = 1;\n\tfoo";
        assert_eq!(line_indentation(text, 5), "");
        assert_eq!(line_indentation(text, 20), "    ");
        assert_eq!(line_indentation(text, 30), "\t");
        assert_eq!(line_indentation("   ", 3), "   ");
        // Inside the indentation only what precedes the offset counts.
        assert_eq!(line_indentation(text, 14), "  ");
        assert_eq!(line_indentation(text, 12), "");
    }

    #[test]
    fn test_word_runs() {
        let text = "let foo_bar = 1;";
        assert_eq!(find_word_start(text, 7), 4);
        assert_eq!(find_word_end(text, 7), 11);
        assert_eq!(find_word_start(text, 4), 4);
        assert_eq!(find_word_end(text, 3), 3);
    }

    #[test]
    fn test_word_boundary_forward() {
        let text = "foo.bar baz";
        assert_eq!(find_word_boundary_forward(text, 0), 4);
        assert_eq!(find_word_boundary_forward(text, 4), 8);
        assert_eq!(find_word_boundary_forward(text, 8), 11);
        assert_eq!(find_word_boundary_forward(text, 11), 11);
    }

    #[test]
    fn test_word_runs_with_astral_chars() {
        let text = "😀abc";
        assert_eq!(find_word_start(text, 5), 2);
        assert_eq!(find_word_end(text, 2), 5);
    }
}
