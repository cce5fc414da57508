//! Concrete motion handlers.
//!
//! Each handler only computes target offsets and maintains the sticky
//! column; normalization, selection updates and mode changes are left to the
//! dispatcher.

use crate::{Command, Execution, MotionContext, MotionHandler, MotionKind};
use core_state::{Cursor, StickyColumn};
use core_text::motion;

/// Handler implementing `kind`.
pub fn handler_for(kind: MotionKind) -> Box<dyn MotionHandler> {
    match kind {
        MotionKind::Left => Box::new(Horizontal::Left),
        MotionKind::Right => Box::new(Horizontal::Right),
        MotionKind::Up => Box::new(Vertical::lines(-1)),
        MotionKind::Down => Box::new(Vertical::lines(1)),
        MotionKind::LineStart => Box::new(LineStart),
        MotionKind::LineEnd => Box::new(LineEnd),
        MotionKind::FirstNonBlank => Box::new(FirstNonBlank),
        MotionKind::DocumentStart => Box::new(DocumentLine::First),
        MotionKind::DocumentEnd => Box::new(DocumentLine::Last),
        MotionKind::FindChar => Box::new(FindChar { forward: true }),
        MotionKind::FindCharBackward => Box::new(FindChar { forward: false }),
        MotionKind::PageDown => Box::new(Vertical::pages(1)),
        MotionKind::PageUp => Box::new(Vertical::pages(-1)),
    }
}

/// `h`/`l` and the arrow keys: stay on the current line.
#[derive(Debug, Clone, Copy)]
pub enum Horizontal {
    Left,
    Right,
}

impl MotionHandler for Horizontal {
    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, command: &Command) -> Option<usize> {
        match self {
            Horizontal::Left => motion::left(ctx.buffer, cursor.offset, command.count()),
            Horizontal::Right => {
                motion::right(ctx.buffer, cursor.offset, command.count(), ctx.end_allowed())
            }
        }
    }
}

/// `j`/`k` and full-page scrolling. The sticky column survives the move:
/// it is stashed before the offset is computed and restored afterwards.
#[derive(Debug, Clone, Copy)]
pub struct Vertical {
    direction: isize,
    page: bool,
    stash: StickyColumn,
}

impl Vertical {
    pub fn lines(direction: isize) -> Self {
        Self {
            direction,
            page: false,
            stash: StickyColumn::default(),
        }
    }

    pub fn pages(direction: isize) -> Self {
        Self {
            page: true,
            ..Self::lines(direction)
        }
    }

    fn distance(&self, ctx: &MotionContext<'_>, count: usize) -> isize {
        // a page keeps two lines of context, like Vim's <C-f>
        let unit = if self.page {
            ctx.viewport_lines.saturating_sub(2).max(1)
        } else {
            1
        };
        isize::try_from(unit.saturating_mul(count)).unwrap_or(isize::MAX)
    }
}

impl MotionHandler for Vertical {
    fn execution(&self) -> Execution {
        if self.page {
            Execution::Batch
        } else {
            Execution::PerCursor
        }
    }

    fn pre_offset_computation(
        &mut self,
        _ctx: &MotionContext<'_>,
        cursor: &mut Cursor,
        _command: &Command,
    ) -> bool {
        self.stash = cursor.last_column;
        true
    }

    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, command: &Command) -> Option<usize> {
        let delta = self.direction.saturating_mul(self.distance(ctx, command.count()));
        let line = motion::vertical_line(ctx.buffer, cursor.offset, delta)?;
        let column = match cursor.last_column {
            StickyColumn::Column(c) => c,
            StickyColumn::LineEnd => usize::MAX,
        };
        Some(ctx.buffer.offset_at(line, column, ctx.end_allowed()))
    }

    fn post_move(&mut self, _ctx: &MotionContext<'_>, cursor: &mut Cursor, _command: &Command) {
        cursor.last_column = self.stash;
    }
}

/// `0`, `<Home>`
#[derive(Debug, Clone, Copy)]
pub struct LineStart;

impl MotionHandler for LineStart {
    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, _command: &Command) -> Option<usize> {
        Some(motion::line_start(ctx.buffer, cursor.offset))
    }
}

/// `$`, `<End>`. Later vertical motions stick to the line end.
#[derive(Debug, Clone, Copy)]
pub struct LineEnd;

impl MotionHandler for LineEnd {
    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, command: &Command) -> Option<usize> {
        Some(motion::line_end(ctx.buffer, cursor.offset, command.count()))
    }

    fn post_move(&mut self, _ctx: &MotionContext<'_>, cursor: &mut Cursor, _command: &Command) {
        cursor.last_column = StickyColumn::LineEnd;
    }
}

/// `^`
#[derive(Debug, Clone, Copy)]
pub struct FirstNonBlank;

impl MotionHandler for FirstNonBlank {
    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, _command: &Command) -> Option<usize> {
        Some(motion::first_non_blank(ctx.buffer, cursor.offset))
    }
}

/// `gg` and `G`. A typed count names the line, otherwise the first or last
/// line is used.
#[derive(Debug, Clone, Copy)]
pub enum DocumentLine {
    First,
    Last,
}

impl MotionHandler for DocumentLine {
    fn offset(&mut self, ctx: &MotionContext<'_>, _cursor: &Cursor, command: &Command) -> Option<usize> {
        let line = match (command.raw_count(), self) {
            (0, DocumentLine::First) => 1,
            (0, DocumentLine::Last) => ctx.buffer.line_count(),
            (n, _) => n,
        };
        Some(motion::document_line(ctx.buffer, line))
    }
}

/// `f{char}` / `F{char}`
#[derive(Debug, Clone, Copy)]
pub struct FindChar {
    forward: bool,
}

impl MotionHandler for FindChar {
    fn offset(&mut self, ctx: &MotionContext<'_>, cursor: &Cursor, command: &Command) -> Option<usize> {
        let ch = command.char_argument()?;
        if self.forward {
            motion::find_char_forward(ctx.buffer, cursor.offset, ch, command.count())
        } else {
            motion::find_char_backward(ctx.buffer, cursor.offset, ch, command.count())
        }
    }
}
