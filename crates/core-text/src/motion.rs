//! Cursor motion helpers over char offsets.
//!
//! These operate purely on a [`TextBuffer`] and an offset and are free of
//! editor state. Each helper returns the target offset, or `None` when the
//! motion cannot move at all (Vim beeps in that case). Callers still
//! normalize the result for the active mode.

use crate::TextBuffer;

/// Move left `count` chars, staying on the current line.
pub fn left<B: TextBuffer + ?Sized>(buf: &B, offset: usize, count: usize) -> Option<usize> {
    let col = buf.column_of(offset);
    if col == 0 {
        return None;
    }
    Some(offset - count.min(col))
}

/// Move right `count` chars, staying on the current line.
pub fn right<B: TextBuffer + ?Sized>(
    buf: &B,
    offset: usize,
    count: usize,
    allow_end: bool,
) -> Option<usize> {
    let line = buf.line_of(offset);
    let col = buf.column_of(offset);
    let last = buf.last_column(line, allow_end);
    if col >= last {
        return None;
    }
    Some(buf.line_start(line) + col.saturating_add(count).min(last))
}

/// First column of the line containing `offset`.
pub fn line_start<B: TextBuffer + ?Sized>(buf: &B, offset: usize) -> usize {
    buf.line_start(buf.line_of(offset))
}

/// End of the line `count - 1` lines below `offset`.
///
/// The returned offset sits one past the last char; callers outside
/// end-allowed modes normalize it back onto the last char.
pub fn line_end<B: TextBuffer + ?Sized>(buf: &B, offset: usize, count: usize) -> usize {
    let line = buf.line_of(offset).saturating_add(count.saturating_sub(1));
    buf.line_end(line.min(buf.line_count() - 1))
}

/// First non-blank char of the line containing `offset` (line end when blank).
pub fn first_non_blank<B: TextBuffer + ?Sized>(buf: &B, offset: usize) -> usize {
    let line = buf.line_of(offset);
    let end = buf.line_end(line);
    (buf.line_start(line)..end)
        .find(|&o| buf.char_at(o).is_some_and(|c| !c.is_whitespace()))
        .unwrap_or(end)
}

/// Target line for a vertical move of `delta` lines, or `None` at a buffer edge.
pub fn vertical_line<B: TextBuffer + ?Sized>(buf: &B, offset: usize, delta: isize) -> Option<usize> {
    let line = buf.line_of(offset);
    let last = buf.line_count() - 1;
    let target = line.saturating_add_signed(delta).min(last);
    if target == line { None } else { Some(target) }
}

/// Offset of the `count`th occurrence of `ch` after `offset` on the same line.
pub fn find_char_forward<B: TextBuffer + ?Sized>(
    buf: &B,
    offset: usize,
    ch: char,
    count: usize,
) -> Option<usize> {
    let end = buf.line_end(buf.line_of(offset));
    (offset + 1..end)
        .filter(|&o| buf.char_at(o) == Some(ch))
        .nth(count.max(1) - 1)
}

/// Offset of the `count`th occurrence of `ch` before `offset` on the same line.
pub fn find_char_backward<B: TextBuffer + ?Sized>(
    buf: &B,
    offset: usize,
    ch: char,
    count: usize,
) -> Option<usize> {
    let start = buf.line_start(buf.line_of(offset));
    (start..offset.min(buf.len_chars()))
        .rev()
        .filter(|&o| buf.char_at(o) == Some(ch))
        .nth(count.max(1) - 1)
}

/// Start of `line` (1-based, clamped) at its first non-blank, as used by `gg`/`G`.
pub fn document_line<B: TextBuffer + ?Sized>(buf: &B, line: usize) -> usize {
    let idx = line.saturating_sub(1).min(buf.line_count() - 1);
    first_non_blank(buf, buf.line_start(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Buffer;

    fn buf(s: &str) -> Buffer {
        Buffer::from_str("t", s).unwrap()
    }

    #[test]
    fn left_stops_at_line_start() {
        let b = buf("ab\ncdef");
        assert_eq!(left(&b, 5, 1), Some(4));
        assert_eq!(left(&b, 5, 9), Some(3));
        assert_eq!(left(&b, 3, 1), None);
    }

    #[test]
    fn right_respects_end_allowance() {
        let b = buf("abc\nd");
        assert_eq!(right(&b, 0, 1, false), Some(1));
        assert_eq!(right(&b, 1, 5, false), Some(2));
        assert_eq!(right(&b, 2, 1, false), None);
        assert_eq!(right(&b, 2, 1, true), Some(3));
    }

    #[test]
    fn line_end_with_count_goes_down() {
        let b = buf("abc\ndefg\nh");
        assert_eq!(line_end(&b, 1, 1), 3);
        assert_eq!(line_end(&b, 1, 2), 8);
        assert_eq!(line_end(&b, 1, 99), 10);
    }

    #[test]
    fn first_non_blank_skips_indent() {
        let b = buf("    let x\n   \n");
        assert_eq!(first_non_blank(&b, 7), 4);
        assert_eq!(first_non_blank(&b, 11), 13);
    }

    #[test]
    fn vertical_line_reports_edges() {
        let b = buf("a\nb\nc\n");
        assert_eq!(vertical_line(&b, 0, 1), Some(1));
        assert_eq!(vertical_line(&b, 0, 10), Some(2));
        assert_eq!(vertical_line(&b, 0, -1), None);
        assert_eq!(vertical_line(&b, 4, 1), None);
    }

    #[test]
    fn find_char_both_directions() {
        let b = buf("a,b,c,d\nx,y");
        assert_eq!(find_char_forward(&b, 0, ',', 1), Some(1));
        assert_eq!(find_char_forward(&b, 0, ',', 3), Some(5));
        assert_eq!(find_char_forward(&b, 0, ',', 4), None);
        assert_eq!(find_char_backward(&b, 6, ',', 1), Some(5));
        assert_eq!(find_char_backward(&b, 6, ',', 2), Some(3));
        assert_eq!(find_char_backward(&b, 0, ',', 1), None);
    }

    #[test]
    fn document_line_clamps() {
        let b = buf("one\n  two\nthree");
        assert_eq!(document_line(&b, 1), 0);
        assert_eq!(document_line(&b, 2), 6);
        assert_eq!(document_line(&b, 42), 10);
        assert_eq!(document_line(&b, 0), 0);
    }
}
