//! Paint strokes and bounded undo/redo
//!
//! A stroke collects every cell edit made during one continuous pointer
//! gesture. Edits are written to the document immediately so the user sees
//! them live; the stroke only records how to reverse them. Revisiting a cell
//! keeps its first `before` and overwrites its `after`, so a gesture collapses
//! to at most one change per cell.

use std::collections::{HashMap, VecDeque};

use crate::document::MapDocument;
use crate::layer::Tile;

/// Maximum number of strokes kept on the undo stack
pub const MAX_UNDO_STEPS: usize = 200;

/// A single recorded cell change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChange {
    pub layer: usize,
    pub x: u32,
    pub y: u32,
    pub before: Tile,
    pub after: Tile,
}

/// Result of committing the active stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// No stroke was active
    NoStroke,
    /// The stroke had no net effect and was dropped
    Discarded,
    /// The stroke was pushed onto the undo stack with this many changes
    Committed(usize),
}

/// In-progress stroke. Changes keep insertion order for deterministic replay.
#[derive(Debug, Default)]
struct ActiveStroke {
    changes: Vec<TileChange>,
    index: HashMap<(usize, u32, u32), usize>,
}

impl ActiveStroke {
    fn record(&mut self, layer: usize, x: u32, y: u32, before: Tile, after: Tile) {
        if let Some(&i) = self.index.get(&(layer, x, y)) {
            self.changes[i].after = after;
        } else {
            self.index.insert((layer, x, y), self.changes.len());
            self.changes.push(TileChange {
                layer,
                x,
                y,
                before,
                after,
            });
        }
    }
}

/// Undo/redo stacks of committed strokes plus the stroke being painted
#[derive(Debug, Default)]
pub struct StrokeHistory {
    active: Option<ActiveStroke>,
    undo_stack: VecDeque<Vec<TileChange>>,
    redo_stack: Vec<Vec<TileChange>>,
}

impl StrokeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke, dropping any uncommitted one
    pub fn begin_stroke(&mut self) {
        self.active = Some(ActiveStroke::default());
    }

    pub fn is_stroke_active(&self) -> bool {
        self.active.is_some()
    }

    /// Paint one cell as part of the active stroke.
    ///
    /// Writes through to the document right away. Returns false when the
    /// address is out of range or the cell already holds `value`.
    pub fn paint(&mut self, doc: &mut MapDocument, layer: usize, x: u32, y: u32, value: Tile) -> bool {
        if !doc.contains(layer, x, y) {
            return false;
        }
        let current = doc.get_tile(layer, x, y);
        if current == value {
            return false;
        }
        self.active
            .get_or_insert_with(ActiveStroke::default)
            .record(layer, x, y, current, value);
        doc.set_tile(layer, x, y, value);
        true
    }

    /// Finish the active stroke and push its net changes onto the undo stack
    pub fn commit_stroke(&mut self) -> CommitOutcome {
        let Some(stroke) = self.active.take() else {
            return CommitOutcome::NoStroke;
        };
        let changes: Vec<TileChange> = stroke
            .changes
            .into_iter()
            .filter(|change| change.before != change.after)
            .collect();
        if changes.is_empty() {
            return CommitOutcome::Discarded;
        }
        let count = changes.len();
        self.push_undo(changes);
        self.redo_stack.clear();
        CommitOutcome::Committed(count)
    }

    fn push_undo(&mut self, changes: Vec<TileChange>) {
        self.undo_stack.push_back(changes);
        while self.undo_stack.len() > MAX_UNDO_STEPS {
            self.undo_stack.pop_front();
        }
    }

    /// Revert the most recent stroke. Returns false if there is nothing to undo.
    pub fn undo(&mut self, doc: &mut MapDocument) -> bool {
        let Some(stroke) = self.undo_stack.pop_back() else {
            return false;
        };
        for change in stroke.iter().rev() {
            doc.set_tile(change.layer, change.x, change.y, change.before);
        }
        self.redo_stack.push(stroke);
        true
    }

    /// Re-apply the most recently undone stroke. Returns false if there is nothing to redo.
    pub fn redo(&mut self, doc: &mut MapDocument) -> bool {
        let Some(stroke) = self.redo_stack.pop() else {
            return false;
        };
        for change in &stroke {
            doc.set_tile(change.layer, change.x, change.y, change.after);
        }
        self.push_undo(stroke);
        true
    }

    /// Drop the active stroke and both stacks
    pub fn clear(&mut self) {
        self.active = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Changes of the most recent undoable stroke, oldest first
    pub fn last_stroke(&self) -> Option<&[TileChange]> {
        self.undo_stack.back().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_writes_through() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        assert!(history.paint(&mut doc, 0, 2, 3, Some(7)));
        assert_eq!(doc.get_tile(0, 2, 3), Some(7));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_paint_same_value_is_noop() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        assert!(!history.paint(&mut doc, 0, 2, 3, None));
        assert_eq!(history.commit_stroke(), CommitOutcome::Discarded);
    }

    #[test]
    fn test_paint_out_of_bounds_is_noop() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        assert!(!history.paint(&mut doc, 4, 0, 0, Some(1)));
        assert!(!history.paint(&mut doc, 0, 30, 0, Some(1)));
        assert_eq!(history.commit_stroke(), CommitOutcome::Discarded);
    }

    #[test]
    fn test_a_b_a_stroke_is_discarded() {
        let mut doc = MapDocument::new();
        doc.set_tile(0, 1, 1, Some(3));
        let mut history = StrokeHistory::new();

        history.begin_stroke();
        history.paint(&mut doc, 0, 1, 1, Some(9));
        history.paint(&mut doc, 0, 1, 1, Some(3));
        assert_eq!(history.commit_stroke(), CommitOutcome::Discarded);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(doc.get_tile(0, 1, 1), Some(3));
    }

    #[test]
    fn test_revisited_cell_keeps_first_before() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        history.paint(&mut doc, 0, 4, 4, Some(1));
        history.paint(&mut doc, 0, 4, 4, Some(2));
        history.paint(&mut doc, 0, 4, 4, Some(5));
        assert_eq!(history.commit_stroke(), CommitOutcome::Committed(1));

        let stroke = history.last_stroke().unwrap();
        assert_eq!(stroke[0].before, None);
        assert_eq!(stroke[0].after, Some(5));
    }

    #[test]
    fn test_undo_restores_five_cells() {
        let mut doc = MapDocument::new();
        doc.set_tile(0, 2, 0, Some(50));
        let original = doc.clone();
        let mut history = StrokeHistory::new();

        history.begin_stroke();
        for x in 0..5 {
            history.paint(&mut doc, 0, x, 0, Some(4));
        }
        assert_eq!(history.commit_stroke(), CommitOutcome::Committed(5));

        assert!(history.undo(&mut doc));
        assert_eq!(doc, original);
        assert_eq!(history.redo_len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_redo_reapplies() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        history.paint(&mut doc, 0, 0, 0, Some(1));
        history.paint(&mut doc, 0, 1, 0, Some(2));
        history.commit_stroke();
        let painted = doc.clone();

        history.undo(&mut doc);
        assert!(history.redo(&mut doc));
        assert_eq!(doc, painted);
        assert_eq!(history.undo_len(), 1);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut doc));
    }

    #[test]
    fn test_new_stroke_clears_redo() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        history.paint(&mut doc, 0, 0, 0, Some(1));
        history.commit_stroke();
        history.undo(&mut doc);
        assert!(history.can_redo());

        history.begin_stroke();
        history.paint(&mut doc, 0, 5, 5, Some(1));
        history.commit_stroke();
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_empty_reports_nothing() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        assert!(!history.undo(&mut doc));
        assert_eq!(history.commit_stroke(), CommitOutcome::NoStroke);
    }

    #[test]
    fn test_undo_stack_is_bounded() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        for i in 0..(MAX_UNDO_STEPS + 25) {
            history.begin_stroke();
            let x = (i % 30) as u32;
            let y = (i / 30) as u32;
            history.paint(&mut doc, 0, x, y, Some(1));
            history.commit_stroke();
            assert!(history.undo_len() <= MAX_UNDO_STEPS);
        }
        assert_eq!(history.undo_len(), MAX_UNDO_STEPS);

        // The oldest 25 strokes were evicted: undoing everything leaves them painted
        while history.undo(&mut doc) {}
        assert_eq!(doc.get_tile(0, 0, 0), Some(1));
        assert_eq!(doc.get_tile(0, 24, 0), Some(1));
        assert_eq!(doc.get_tile(0, 25, 0), None);
    }

    #[test]
    fn test_clear() {
        let mut doc = MapDocument::new();
        let mut history = StrokeHistory::new();
        history.begin_stroke();
        history.paint(&mut doc, 0, 0, 0, Some(1));
        history.commit_stroke();
        history.undo(&mut doc);
        history.begin_stroke();

        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_stroke_active());
    }
}
