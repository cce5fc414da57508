//! Cursors (carets) and the cursor set.
//!
//! A cursor is an offset plus optional selection state. The set owns every
//! cursor of a session, tracks which one is primary, and merges cursors whose
//! selections collide. Removals are announced to registered
//! [`CursorListener`]s; registration is scoped by a [`WatchGuard`] so a
//! listener never outlives the window it was installed for.

use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// Stable identity of a cursor for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorId(u32);

/// Half-open char range `[start, end)` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// Construct a new range normalizing ordering so that start <= end.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    pub fn overlaps(&self, other: &Selection) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn union(&self, other: &Selection) -> Selection {
        Selection {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Remembered target column for vertical motions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickyColumn {
    Column(usize),
    /// Set by `$`: vertical motions land on each line's end.
    LineEnd,
}

impl Default for StickyColumn {
    fn default() -> Self {
        StickyColumn::Column(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    id: CursorId,
    pub offset: usize,
    pub selection: Option<Selection>,
    /// Where the user started selecting (Vim's selection start). Only set
    /// while a selecting mode is active.
    pub anchor: Option<usize>,
    pub last_column: StickyColumn,
}

impl Cursor {
    fn new(id: CursorId, offset: usize) -> Self {
        Self {
            id,
            offset,
            selection: None,
            anchor: None,
            last_column: StickyColumn::default(),
        }
    }

    pub fn id(&self) -> CursorId {
        self.id
    }

    /// Selection start, or the offset when nothing is selected.
    pub fn selection_start(&self) -> usize {
        self.selection.map_or(self.offset, |s| s.start())
    }

    /// Selection end, or the offset when nothing is selected.
    pub fn selection_end(&self) -> usize {
        self.selection.map_or(self.offset, |s| s.end())
    }

    pub fn set_selection(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end, "selection start {start} > end {end}");
        self.selection = Some(Selection::new(start, end));
    }

    /// Drop selection and anchor.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.anchor = None;
    }

    fn collides(&self, other: &Cursor) -> bool {
        match (self.selection, other.selection) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => a.overlaps(&b),
            (Some(a), _) if !a.is_empty() => a.contains(other.offset),
            (_, Some(b)) if !b.is_empty() => b.contains(self.offset),
            _ => self.offset == other.offset,
        }
    }
}

/// Observer of cursor removals.
pub trait CursorListener {
    /// Called after `removed` left the set; `remaining` are the survivors.
    fn cursor_removed(&mut self, removed: &Cursor, remaining: &mut [Cursor]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListenerId(u32);

/// Inline capacity for per-cycle cursor orderings.
pub type CursorOrder = SmallVec<[CursorId; 8]>;

pub struct CursorSet {
    cursors: Vec<Cursor>,
    primary: CursorId,
    next_id: u32,
    listeners: Vec<(ListenerId, Box<dyn CursorListener>)>,
    next_listener: u32,
}

impl std::fmt::Debug for CursorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorSet")
            .field("cursors", &self.cursors)
            .field("primary", &self.primary)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CursorSet {
    /// A set holding one primary cursor at `offset`.
    pub fn new(offset: usize) -> Self {
        Self {
            cursors: vec![Cursor::new(CursorId(0), offset)],
            primary: CursorId(0),
            next_id: 1,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// A set with one cursor per offset; the first becomes primary. An empty
    /// slice yields a single cursor at 0.
    pub fn from_offsets(offsets: &[usize]) -> Self {
        let mut set = Self::new(offsets.first().copied().unwrap_or(0));
        for &offset in offsets.iter().skip(1) {
            set.add(offset);
        }
        set
    }

    pub fn add(&mut self, offset: usize) -> CursorId {
        let id = CursorId(self.next_id);
        self.next_id += 1;
        self.cursors.push(Cursor::new(id, offset));
        id
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Always false: a set keeps at least its primary cursor.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn get(&self, id: CursorId) -> Option<&Cursor> {
        self.cursors.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CursorId) -> Option<&mut Cursor> {
        self.cursors.iter_mut().find(|c| c.id == id)
    }

    pub fn primary_id(&self) -> CursorId {
        self.primary
    }

    pub fn primary(&self) -> &Cursor {
        let idx = self.primary_index();
        &self.cursors[idx]
    }

    pub fn primary_mut(&mut self) -> &mut Cursor {
        let idx = self.primary_index();
        &mut self.cursors[idx]
    }

    /// Make `id` primary. Returns false when no such cursor exists.
    pub fn set_primary(&mut self, id: CursorId) -> bool {
        if self.get(id).is_some() {
            self.primary = id;
            true
        } else {
            false
        }
    }

    fn primary_index(&self) -> usize {
        let idx = self.cursors.iter().position(|c| c.id == self.primary);
        debug_assert!(idx.is_some(), "primary cursor missing from set");
        idx.unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        self.cursors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cursor> {
        self.cursors.iter_mut()
    }

    /// Cursor ids in ascending offset order (ties by id).
    pub fn ids_by_offset(&self) -> CursorOrder {
        let mut order: SmallVec<[(usize, CursorId); 8]> =
            self.cursors.iter().map(|c| (c.offset, c.id)).collect();
        order.sort_unstable();
        order.into_iter().map(|(_, id)| id).collect()
    }

    /// Remove a cursor and notify listeners. The last cursor cannot be
    /// removed. Removing the primary promotes the first remaining cursor.
    pub fn remove(&mut self, id: CursorId) -> Option<Cursor> {
        if self.cursors.len() <= 1 {
            return None;
        }
        let idx = self.cursors.iter().position(|c| c.id == id)?;
        let removed = self.cursors.remove(idx);
        if removed.id == self.primary {
            self.primary = self.cursors[0].id;
        }
        self.notify_removed(&removed);
        Some(removed)
    }

    /// Drop every secondary cursor without notifying listeners.
    pub fn retain_primary(&mut self) {
        let primary = self.primary;
        self.cursors.retain(|c| c.id == primary);
    }

    /// Replace all secondaries with fresh cursors, used to lay out one caret
    /// per row of a block selection. Listeners are not notified.
    pub fn replace_secondaries<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = (usize, Option<Selection>)>,
    {
        self.retain_primary();
        for (offset, selection) in rows {
            let id = self.add(offset);
            if let Some(c) = self.get_mut(id) {
                c.selection = selection;
            }
        }
    }

    /// Register a removal listener for the lifetime of the returned guard.
    pub fn watch(&mut self, listener: Box<dyn CursorListener>) -> WatchGuard<'_> {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        WatchGuard { set: self, id }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify_removed(&mut self, removed: &Cursor) {
        if self.listeners.is_empty() {
            return;
        }
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener.cursor_removed(removed, &mut self.cursors);
        }
        // Listeners registered from inside a callback land in self.listeners.
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    /// Merge cursors whose selections overlap or whose bare offsets coincide.
    ///
    /// Cursors are ordered by selection start; of two colliding neighbours
    /// the earlier one survives. The survivor's selection widens to the union
    /// of both, it adopts the discarded offset when that offset lies outside
    /// its own selection, and it inherits the primary flag. Returns the
    /// number of cursors removed.
    pub fn merge_overlapping(&mut self) -> usize {
        if self.cursors.len() < 2 {
            return 0;
        }
        self.cursors
            .sort_by_key(|c| (c.selection_start(), c.selection_end(), c.offset, c.id));
        let mut merged = 0;
        let mut i = 0;
        while i + 1 < self.cursors.len() {
            if !self.cursors[i].collides(&self.cursors[i + 1]) {
                i += 1;
                continue;
            }
            let discarded = self.cursors.remove(i + 1);
            let survivor = &mut self.cursors[i];
            let own = survivor.selection;
            if let (Some(a), Some(b)) = (own, discarded.selection) {
                survivor.selection = Some(a.union(&b));
            }
            if own.is_some_and(|s| !s.contains(discarded.offset)) {
                survivor.offset = discarded.offset;
                survivor.last_column = discarded.last_column;
            }
            if discarded.id == self.primary {
                self.primary = survivor.id;
            }
            trace!(
                target: "state.cursors",
                survivor = ?self.cursors[i].id,
                discarded = ?discarded.id,
                "cursor_merged"
            );
            self.notify_removed(&discarded);
            merged += 1;
        }
        merged
    }
}

/// Scoped listener registration. Dropping the guard deregisters the
/// listener, including during unwinding. The cursor set stays reachable
/// through the guard while it lives.
pub struct WatchGuard<'a> {
    set: &'a mut CursorSet,
    id: ListenerId,
}

impl Deref for WatchGuard<'_> {
    type Target = CursorSet;
    fn deref(&self) -> &CursorSet {
        self.set
    }
}

impl DerefMut for WatchGuard<'_> {
    fn deref_mut(&mut self) -> &mut CursorSet {
        self.set
    }
}

impl Drop for WatchGuard<'_> {
    fn drop(&mut self) {
        let id = self.id;
        self.set.listeners.retain(|(l, _)| *l != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<CursorId>>>);

    impl CursorListener for Recorder {
        fn cursor_removed(&mut self, removed: &Cursor, _remaining: &mut [Cursor]) {
            self.0.borrow_mut().push(removed.id());
        }
    }

    #[test]
    fn selection_normalizes_order() {
        let s = Selection::new(9, 3);
        assert_eq!((s.start(), s.end()), (3, 9));
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn ids_by_offset_is_ascending() {
        let set = CursorSet::from_offsets(&[10, 2, 7]);
        let offsets: Vec<usize> = set
            .ids_by_offset()
            .iter()
            .map(|id| set.get(*id).unwrap().offset)
            .collect();
        assert_eq!(offsets, vec![2, 7, 10]);
    }

    #[test]
    fn last_cursor_cannot_be_removed() {
        let mut set = CursorSet::new(3);
        let id = set.primary_id();
        assert!(set.remove(id).is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn removing_primary_promotes_another() {
        let mut set = CursorSet::from_offsets(&[1, 5]);
        let primary = set.primary_id();
        set.remove(primary).unwrap();
        assert_eq!(set.primary().offset, 5);
    }

    #[test]
    fn guard_scopes_listener() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut set = CursorSet::from_offsets(&[1, 5, 9]);
        let victim = set.ids_by_offset()[1];
        {
            let mut guard = set.watch(Box::new(Recorder(log.clone())));
            assert_eq!(guard.listener_count(), 1);
            guard.remove(victim);
        }
        assert_eq!(set.listener_count(), 0);
        let last = set.ids_by_offset()[1];
        set.remove(last);
        assert_eq!(log.borrow().as_slice(), &[victim]);
    }

    #[test]
    fn merge_same_offset_without_selection() {
        let mut set = CursorSet::from_offsets(&[4, 4, 8]);
        assert_eq!(set.merge_overlapping(), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn merge_widens_survivor_and_moves_primary() {
        let mut set = CursorSet::from_offsets(&[7, 4]);
        let first = set.primary_id();
        let second = set.ids_by_offset()[0];
        set.get_mut(first).unwrap().set_selection(4, 8);
        let c = set.get_mut(second).unwrap();
        c.set_selection(2, 5);
        c.offset = 4;
        assert_eq!(set.merge_overlapping(), 1);
        let survivor = set.primary();
        assert_eq!(survivor.id(), second);
        assert_eq!(survivor.selection, Some(Selection::new(2, 8)));
        assert_eq!(survivor.offset, 7);
    }

    #[test]
    fn touching_selections_do_not_merge() {
        let mut set = CursorSet::from_offsets(&[0, 5]);
        let ids = set.ids_by_offset();
        set.get_mut(ids[0]).unwrap().set_selection(0, 5);
        set.get_mut(ids[1]).unwrap().set_selection(5, 9);
        assert_eq!(set.merge_overlapping(), 0);
    }

    #[test]
    fn replace_secondaries_keeps_primary() {
        let mut set = CursorSet::from_offsets(&[3, 8, 12]);
        let primary = set.primary_id();
        set.replace_secondaries([(20, Some(Selection::new(18, 21)))]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.primary_id(), primary);
        assert!(set.iter().any(|c| c.offset == 20 && c.selection == Some(Selection::new(18, 21))));
    }
}
