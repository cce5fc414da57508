//! Rope-based text buffer abstraction.
//!
//! Positions are absolute char offsets. A trailing newline does not open an
//! extra line: `"ab\ncd\n"` has two lines, matching how Vim counts them.
//! Cursor code only talks to buffers through [`TextBuffer`] so hosts can
//! plug in their own storage.

use anyhow::Result;
use ropey::Rope;
use std::ops::Range;

pub mod motion;

/// Line and column queries the cursor engine needs from a buffer.
///
/// Line indices past the end are clamped to the last line; offsets past the
/// end are clamped to `len_chars()`.
pub trait TextBuffer {
    /// Total number of chars in the buffer.
    fn len_chars(&self) -> usize;

    /// Number of lines (at least 1, even for an empty buffer).
    fn line_count(&self) -> usize;

    /// Line index containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Offset of the first char of `line`.
    fn line_start(&self, line: usize) -> usize;

    /// Offset one past the last char of `line`, excluding its newline.
    fn line_end(&self, line: usize) -> usize;

    /// Char at `offset`, if any.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Offset one past the newline of `line` (or the buffer end on the last line).
    fn line_end_with_newline(&self, line: usize) -> usize {
        let end = self.line_end(line);
        if end < self.len_chars() { end + 1 } else { end }
    }

    /// Number of chars in `line`, excluding its newline.
    fn line_len(&self, line: usize) -> usize {
        self.line_end(line) - self.line_start(line)
    }

    /// Zero based column of `offset` within its line.
    fn column_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.len_chars());
        offset - self.line_start(self.line_of(offset))
    }

    /// Highest column a cursor may rest on in `line`.
    ///
    /// With `allow_end` the cursor may sit one past the last char; otherwise
    /// it must rest on a real char (column 0 for an empty line).
    fn last_column(&self, line: usize, allow_end: bool) -> usize {
        let len = self.line_len(line);
        if allow_end { len } else { len.saturating_sub(1) }
    }

    /// Offset for `(line, column)`, clamping both to valid positions.
    fn offset_at(&self, line: usize, column: usize, allow_end: bool) -> usize {
        let line = line.min(self.line_count() - 1);
        self.line_start(line) + column.min(self.last_column(line, allow_end))
    }

    /// Clamp `offset` into the buffer and onto a valid position of its line.
    fn normalize_offset(&self, offset: usize, allow_end: bool) -> usize {
        let offset = offset.min(self.len_chars());
        let line = self.line_of(offset);
        let start = self.line_start(line);
        let max = start + self.last_column(line, allow_end);
        offset.clamp(start, max)
    }
}

/// Buffers that support the removals and insertions performed by select mode.
pub trait TextBufferMut: TextBuffer {
    /// Remove the chars in `range` (clamped) and return them.
    fn remove(&mut self, range: Range<usize>) -> String;

    /// Insert `text` at `offset` (clamped).
    fn insert(&mut self, offset: usize, text: &str);
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Debug)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.line_count() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Whole buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Chars in `range`, clamped to the buffer.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.min(len);
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn ends_with_newline(&self) -> bool {
        let len = self.rope.len_chars();
        len > 0 && self.rope.char(len - 1) == '\n'
    }
}

impl TextBuffer for Buffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn line_count(&self) -> usize {
        let lines = self.rope.len_lines();
        if self.ends_with_newline() { lines - 1 } else { lines }
    }

    fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.rope.len_chars());
        self.rope.char_to_line(offset).min(self.line_count() - 1)
    }

    fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.line_count() - 1))
    }

    fn line_end(&self, line: usize) -> usize {
        let line = line.min(self.line_count() - 1);
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        self.rope.line_to_char(line) + len
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }
}

impl TextBufferMut for Buffer {
    fn remove(&mut self, range: Range<usize>) -> String {
        let removed = self.slice(range.clone());
        if !removed.is_empty() {
            let len = self.rope.len_chars();
            self.rope.remove(range.start.min(len)..range.end.min(len));
        }
        removed
    }

    fn insert(&mut self, offset: usize, text: &str) {
        let offset = offset.min(self.rope.len_chars());
        self.rope.insert(offset, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line(0).unwrap(), "hello\n");
        assert_eq!(b.line(1).unwrap(), "world");
        assert_eq!(b.line(2), None);
    }

    #[test]
    fn trailing_newline_does_not_open_a_line() {
        let b = Buffer::from_str("t", "ab\ncd\n").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_of(b.len_chars()), 1);
        assert_eq!(b.line_end(1), 5);
        assert_eq!(b.line_end_with_newline(1), 6);
    }

    #[test]
    fn empty_buffer_has_one_line() {
        let b = Buffer::from_str("t", "").unwrap();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.line_start(0), 0);
        assert_eq!(b.line_end(0), 0);
        assert_eq!(b.normalize_offset(7, false), 0);
    }

    #[test]
    fn columns_and_offsets() {
        let b = Buffer::from_str("t", "abc\nde\n\nxyz").unwrap();
        assert_eq!(b.column_of(5), 1);
        assert_eq!(b.offset_at(1, 10, false), 5);
        assert_eq!(b.offset_at(1, 10, true), 6);
        // empty line: both modes land on the line start
        assert_eq!(b.offset_at(2, 3, false), 7);
        assert_eq!(b.offset_at(2, 3, true), 7);
        assert_eq!(b.offset_at(9, 1, false), 9);
    }

    #[test]
    fn normalize_clamps_to_last_real_char() {
        let b = Buffer::from_str("t", "abc\ndef").unwrap();
        // offset 3 is the newline of line 0
        assert_eq!(b.normalize_offset(3, false), 2);
        assert_eq!(b.normalize_offset(3, true), 3);
        assert_eq!(b.normalize_offset(100, false), 6);
        assert_eq!(b.normalize_offset(100, true), 7);
    }

    #[test]
    fn remove_and_insert() {
        let mut b = Buffer::from_str("t", "hello world").unwrap();
        assert_eq!(b.remove(5..11), " world");
        assert_eq!(b.text(), "hello");
        b.insert(0, ">> ");
        assert_eq!(b.text(), ">> hello");
        assert_eq!(b.remove(50..60), "");
    }

    proptest! {
        #[test]
        fn normalized_offsets_stay_on_their_line(text in "[a-c\n]{0,40}", offset in 0usize..60, allow_end in any::<bool>()) {
            let b = Buffer::from_str("p", &text).unwrap();
            let n = b.normalize_offset(offset, allow_end);
            prop_assert!(n <= b.len_chars());
            let line = b.line_of(n);
            prop_assert!(n >= b.line_start(line));
            prop_assert!(n <= b.line_end(line));
            if !allow_end && b.line_len(line) > 0 {
                prop_assert!(n < b.line_end(line));
            }
        }
    }
}
