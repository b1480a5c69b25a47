//! UTF-16 offset handling for document text.
//!
//! Documents are addressed in UTF-16 code units because that is what the DOM
//! Selection API reports. Text is stored as UTF-8, so every slice goes
//! through these conversions.

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset into a byte index into `s`.
///
/// Offsets past the end clamp to `s.len()`. An offset that falls between the
/// two halves of a surrogate pair snaps back to the start of that character.
pub fn utf16_to_byte(s: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (byte_idx, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return byte_idx;
        }
        units = next;
    }
    s.len()
}

/// Convert a byte index into `s` into a UTF-16 offset.
pub fn byte_to_utf16(s: &str, byte_idx: usize) -> usize {
    utf16_len(&s[..byte_idx.min(s.len())])
}

/// Slice `s` by UTF-16 offsets.
pub fn slice_utf16(s: &str, start: usize, end: usize) -> &str {
    let start = utf16_to_byte(s, start);
    let end = utf16_to_byte(s, end).max(start);
    &s[start..end]
}

/// Normalize `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_line_endings(s: &str) -> String {
    if !s.contains('\r') {
        return s.to_string();
    }
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Whether `c` is a word character for word-wise movement (`[A-Za-z0-9_]`).
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_len() {
        assert_eq!(utf16_len("hello"), 5);
        assert_eq!(utf16_len("héllo"), 5);
        // Astral plane characters take two code units.
        assert_eq!(utf16_len("a😀b"), 4);
    }

    #[test]
    fn test_utf16_to_byte() {
        let s = "a😀b";
        assert_eq!(utf16_to_byte(s, 0), 0);
        assert_eq!(utf16_to_byte(s, 1), 1);
        // Inside the surrogate pair snaps back.
        assert_eq!(utf16_to_byte(s, 2), 1);
        assert_eq!(utf16_to_byte(s, 3), 5);
        assert_eq!(utf16_to_byte(s, 4), 6);
        assert_eq!(utf16_to_byte(s, 100), 6);
    }

    #[test]
    fn test_byte_to_utf16() {
        let s = "é😀";
        assert_eq!(byte_to_utf16(s, 0), 0);
        assert_eq!(byte_to_utf16(s, 2), 1);
        assert_eq!(byte_to_utf16(s, 6), 3);
    }

    #[test]
    fn test_slice_utf16() {
        assert_eq!(slice_utf16("hello world", 6, 11), "world");
        assert_eq!(slice_utf16("a😀b", 1, 3), "😀");
        assert_eq!(slice_utf16("abc", 2, 1), "");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_line_endings("plain"), "plain");
    }

    #[test]
    fn test_word_chars() {
        assert!(is_word_char('a'));
        assert!(is_word_char('Z'));
        assert!(is_word_char('7'));
        assert!(is_word_char('_'));
        assert!(!is_word_char('-'));
        assert!(!is_word_char(' '));
        assert!(!is_word_char('é'));
    }
}
