//! Bounded undo/redo history over the stroke set.

use crate::stroke::Stroke;

/// Maximum number of undo snapshots to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// Snapshot-based undo/redo manager.
///
/// Each entry is a deep copy of the full stroke set. The undo stack is
/// bounded; the oldest entry is evicted on overflow. Committing any new
/// mutation clears the redo stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Vec<Stroke>>,
    redo_stack: Vec<Vec<Stroke>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-mutation state (call before making changes).
    pub fn commit(&mut self, current: &[Stroke]) {
        self.undo_stack.push(current.to_vec());
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo: returns the stroke set to restore, pushing the current
    /// state onto the redo stack. `None` (guaranteed no-op) when the
    /// undo stack is empty.
    pub fn undo(&mut self, current: &[Stroke]) -> Option<Vec<Stroke>> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        Some(snapshot)
    }

    /// Redo: symmetric to [`History::undo`].
    pub fn redo(&mut self, current: &[Stroke]) -> Option<Vec<Stroke>> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries currently on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{Rgba, StrokePoint, StrokeTool};

    fn stroke(x: f64) -> Stroke {
        Stroke::new(
            StrokeTool::Pen,
            Rgba::black(),
            3.0,
            1.0,
            StrokePoint::new(x, 0.0, 1.0, 0),
        )
    }

    #[test]
    fn test_undo_empty_is_noop() {
        let mut history = History::new();
        assert!(history.undo(&[]).is_none());
        assert!(history.redo(&[]).is_none());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::new();
        let before: Vec<Stroke> = vec![stroke(1.0)];
        let mut current = before.clone();

        history.commit(&current);
        current.push(stroke(2.0));
        let committed = current.clone();

        current = history.undo(&current).unwrap();
        assert_eq!(current, before);

        current = history.redo(&current).unwrap();
        assert_eq!(current, committed);
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut history = History::new();
        let mut current = vec![stroke(1.0)];

        history.commit(&current);
        current.push(stroke(2.0));
        current = history.undo(&current).unwrap();
        assert!(history.can_redo());

        history.commit(&current);
        assert!(!history.can_redo());
        assert!(history.redo(&current).is_none());
    }

    #[test]
    fn test_bounded_history_evicts_oldest() {
        let mut history = History::new();
        let mut current = Vec::new();

        for i in 0..60 {
            history.commit(&current);
            current.push(stroke(i as f64));
        }

        assert_eq!(history.undo_depth(), 50);

        // Unwind everything; the deepest reachable state is the one
        // captured by commit #11 (ten oldest snapshots were evicted).
        let mut last = current;
        while let Some(snapshot) = history.undo(&last) {
            last = snapshot;
        }
        assert_eq!(last.len(), 10);
    }

    #[test]
    fn test_clear_drops_both_stacks() {
        let mut history = History::new();
        let current = vec![stroke(1.0)];
        history.commit(&current);
        history.undo(&current);

        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
