//! Selection ranges for the selecting modes, block rows and end swapping.
//!
//! Visual mode selects inclusively (the char under the cursor is part of the
//! selection), select mode exclusively. Linewise selections cover whole lines
//! including the newline. Block selections are laid out as one row per line,
//! each row owned by its own cursor; the primary cursor carries the anchor.

use core_state::{Cursor, CursorSet, Mode, ModePair, Selection, StickyColumn, SubMode};
use core_text::TextBuffer;
use smallvec::SmallVec;

/// Selection between `anchor` and `head` for a characterwise or linewise
/// selecting mode.
pub fn selection_range(buf: &dyn TextBuffer, anchor: usize, head: usize, (mode, sub): ModePair) -> Selection {
    let lo = anchor.min(head);
    let hi = anchor.max(head);
    match sub {
        SubMode::Line => Selection::new(
            buf.line_start(buf.line_of(lo)),
            buf.line_end_with_newline(buf.line_of(hi)),
        ),
        _ if mode == Mode::Select => Selection::new(lo, hi),
        _ => Selection::new(lo, (hi + 1).min(buf.len_chars())),
    }
}

/// One line of a block selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRow {
    pub line: usize,
    pub selection: Selection,
    /// Where the row's cursor rests.
    pub caret: usize,
}

pub type BlockRows = SmallVec<[BlockRow; 8]>;

/// Rows of the block spanned by `anchor` and `head`.
///
/// Each row covers columns `[min, max + 1)` clamped to its line. When the
/// head's sticky column is `LineEnd` (after `$`) every row instead runs to
/// its own line end. Lines shorter than the left edge collapse to an empty
/// row at their end.
pub fn block_rows(buf: &dyn TextBuffer, anchor: usize, head: usize, sticky: StickyColumn) -> BlockRows {
    let (a_line, h_line) = (buf.line_of(anchor), buf.line_of(head));
    let (a_col, h_col) = (buf.column_of(anchor), buf.column_of(head));
    let left = a_col.min(h_col);
    let right = a_col.max(h_col) + 1;
    let to_line_end = sticky == StickyColumn::LineEnd;
    (a_line.min(h_line)..=a_line.max(h_line))
        .map(|line| {
            let start = buf.line_start(line);
            let end = buf.line_end(line);
            let sel_start = (start + left).min(end);
            let sel_end = if to_line_end { end } else { (start + right).min(end) };
            let caret = if to_line_end {
                sel_end.saturating_sub(1).max(sel_start)
            } else {
                (start + h_col).min(sel_end.saturating_sub(1)).max(sel_start)
            };
            BlockRow {
                line,
                selection: Selection::new(sel_start, sel_end.max(sel_start)),
                caret,
            }
        })
        .collect()
}

/// Lay out one cursor per block row from the primary cursor's anchor and
/// head. The primary keeps its offset and gets its own row's selection.
pub(crate) fn sync_block_rows(buf: &dyn TextBuffer, cursors: &mut CursorSet) {
    let primary = cursors.primary().clone();
    let Some(anchor) = primary.anchor else {
        cursors.retain_primary();
        return;
    };
    let head_line = buf.line_of(primary.offset);
    let rows = block_rows(buf, anchor, primary.offset, primary.last_column);
    let own = rows.iter().find(|r| r.line == head_line).map(|r| r.selection);
    cursors.primary_mut().selection = own;
    cursors.replace_secondaries(
        rows.into_iter()
            .filter(|r| r.line != head_line)
            .map(|r| (r.caret, Some(r.selection))),
    );
}

/// Exchange anchor and offset; the selection is unchanged. Fails (returns
/// false) for a cursor without an anchor.
pub fn swap_ends(cursor: &mut Cursor) -> bool {
    let Some(anchor) = cursor.anchor else {
        return false;
    };
    cursor.anchor = Some(cursor.offset);
    cursor.offset = anchor;
    true
}

/// Swap only the horizontal ends of a block: anchor and head trade columns
/// and keep their lines.
pub fn swap_block_columns(buf: &dyn TextBuffer, cursor: &mut Cursor) -> bool {
    let Some(anchor) = cursor.anchor else {
        return false;
    };
    let (a_line, a_col) = (buf.line_of(anchor), buf.column_of(anchor));
    let (h_line, h_col) = (buf.line_of(cursor.offset), buf.column_of(cursor.offset));
    cursor.anchor = Some(buf.offset_at(a_line, h_col, true));
    cursor.offset = buf.offset_at(h_line, a_col, true);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Buffer;
    use pretty_assertions::assert_eq;

    fn buf(s: &str) -> Buffer {
        Buffer::from_str("t", s).unwrap()
    }

    #[test]
    fn visual_is_inclusive_select_exclusive() {
        let b = buf("hello world");
        let v = selection_range(&b, 6, 2, (Mode::Visual, SubMode::Character));
        assert_eq!((v.start(), v.end()), (2, 7));
        let s = selection_range(&b, 6, 2, (Mode::Select, SubMode::Character));
        assert_eq!((s.start(), s.end()), (2, 6));
        let end = selection_range(&b, 10, 10, (Mode::Visual, SubMode::Character));
        assert_eq!((end.start(), end.end()), (10, 11));
    }

    #[test]
    fn linewise_covers_newlines() {
        let b = buf("ab\ncd\nef");
        let l = selection_range(&b, 4, 1, (Mode::Visual, SubMode::Line));
        assert_eq!((l.start(), l.end()), (0, 6));
        let last = selection_range(&b, 7, 7, (Mode::Visual, SubMode::Line));
        assert_eq!((last.start(), last.end()), (6, 8));
    }

    #[test]
    fn block_rows_rectangular() {
        let b = buf("abcdef\nab\nabcdef");
        // anchor (0,1) head (2,3)
        let rows = block_rows(&b, 1, 13, StickyColumn::Column(3));
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].selection.start(), rows[0].selection.end()), (1, 4));
        // short middle line clipped at its end
        assert_eq!((rows[1].selection.start(), rows[1].selection.end()), (8, 9));
        assert_eq!(rows[1].caret, 8);
        assert_eq!((rows[2].selection.start(), rows[2].selection.end()), (11, 14));
        assert_eq!(rows[2].caret, 13);
    }

    #[test]
    fn block_rows_to_line_end() {
        let b = buf("abc\nabcdefg\nab");
        let rows = block_rows(&b, 1, 14, StickyColumn::LineEnd);
        assert_eq!((rows[0].selection.start(), rows[0].selection.end()), (1, 3));
        assert_eq!(rows[0].caret, 2);
        assert_eq!((rows[1].selection.start(), rows[1].selection.end()), (5, 11));
        assert_eq!(rows[1].caret, 10);
        assert_eq!((rows[2].selection.start(), rows[2].selection.end()), (13, 14));
    }

    #[test]
    fn swap_exchanges_anchor_and_offset() {
        let mut set = CursorSet::new(9);
        let c = set.primary_mut();
        c.anchor = Some(3);
        c.set_selection(3, 9);
        assert!(swap_ends(c));
        assert_eq!((c.anchor, c.offset), (Some(9), 3));
        assert_eq!(c.selection, Some(Selection::new(3, 9)));
        c.anchor = None;
        assert!(!swap_ends(c));
    }

    #[test]
    fn block_column_swap_keeps_lines() {
        let b = buf("abcdef\nabcdef");
        let mut set = CursorSet::new(11);
        let c = set.primary_mut();
        c.anchor = Some(1);
        assert!(swap_block_columns(&b, c));
        assert_eq!(c.anchor, Some(4));
        assert_eq!(c.offset, 8);
    }
}
