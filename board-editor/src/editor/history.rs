// Undo/redo history module for the editor.
//
// Linear log of whole-canvas snapshots. Every mutating action must end with
// `record_state`; undo/redo only move the cursor and restore.

use board_core::{CanvasSurface, Restore, Snapshot, SurfaceError};
use std::fmt;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Undo => f.write_str("undo"),
            Direction::Redo => f.write_str("redo"),
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    /// Boundary of the log. Benign: nothing changed.
    #[error("nothing to {direction}")]
    NoHistoryAvailable { direction: Direction },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    entries: Vec<Snapshot>,
    cursor: Option<usize>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the surface and push it as the newest entry.
    pub fn record_state<S>(&mut self, surface: &S) -> Result<(), SurfaceError>
    where
        S: CanvasSurface + ?Sized,
    {
        let snapshot = surface.capture()?;
        self.push(snapshot);
        Ok(())
    }

    /// Push a captured snapshot, discarding everything after the cursor.
    pub fn push(&mut self, snapshot: Snapshot) {
        match self.cursor {
            Some(cursor) => {
                let dropped = self.entries.len() - (cursor + 1);
                if dropped > 0 {
                    trace!(dropped, "discarding redo entries");
                }
                self.entries.truncate(cursor + 1);
            }
            None => self.entries.clear(),
        }

        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
        debug!(cursor = self.entries.len() - 1, len = self.entries.len(), "state recorded");
    }

    /// Step back one entry and restore it on the surface.
    pub fn undo<S>(&mut self, surface: &mut S) -> Result<Restore, HistoryError>
    where
        S: CanvasSurface + ?Sized,
    {
        match self.cursor {
            Some(cursor) if cursor > 0 => self.step_to(cursor - 1, surface),
            _ => {
                debug!("undo requested with no earlier state");
                Err(HistoryError::NoHistoryAvailable {
                    direction: Direction::Undo,
                })
            }
        }
    }

    /// Step forward one entry and restore it on the surface.
    pub fn redo<S>(&mut self, surface: &mut S) -> Result<Restore, HistoryError>
    where
        S: CanvasSurface + ?Sized,
    {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => self.step_to(cursor + 1, surface),
            _ => {
                debug!("redo requested with no later state");
                Err(HistoryError::NoHistoryAvailable {
                    direction: Direction::Redo,
                })
            }
        }
    }

    fn step_to<S>(&mut self, target: usize, surface: &mut S) -> Result<Restore, HistoryError>
    where
        S: CanvasSurface + ?Sized,
    {
        let previous = self.cursor;
        self.cursor = Some(target);

        surface.clear();
        match surface.restore(&self.entries[target]) {
            Ok(outcome) => {
                debug!(cursor = target, pending = outcome.is_pending(), "history restored");
                Ok(outcome)
            }
            Err(e) => {
                // Keep the cursor on the entry the caller last saw.
                self.cursor = previous;
                Err(e.into())
            }
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// The entry the cursor points at.
    pub fn current(&self) -> Option<&Snapshot> {
        self.cursor.map(|c| &self.entries[c])
    }

    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::objects::{DrawableObject, Shape};
    use crate::Canvas;

    fn snap(tag: &str) -> Snapshot {
        Snapshot::from_encoded(tag)
    }

    fn circle(radius: f32) -> DrawableObject {
        DrawableObject::new(Shape::Circle { radius }, 0.0, 0.0)
    }

    #[test]
    fn test_empty_history() {
        let history = HistoryManager::new();
        assert_eq!(history.cursor(), None);
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.current().is_none());
    }

    #[test]
    fn test_record_after_undo_truncates_redo_branch() {
        let mut canvas = Canvas::default();
        let mut history = HistoryManager::new();
        let mut states = Vec::new();
        for r in [10.0, 20.0, 30.0, 40.0] {
            canvas.add(circle(r));
            history.record_state(&canvas).unwrap();
            states.push(canvas.capture().unwrap());
        }

        history.undo(&mut canvas).unwrap();
        history.undo(&mut canvas).unwrap();
        assert_eq!(history.cursor(), Some(1));

        canvas.add(circle(99.0));
        history.record_state(&canvas).unwrap();
        let new_state = canvas.capture().unwrap();

        assert_eq!(
            history.entries(),
            &[states[0].clone(), states[1].clone(), new_state]
        );
        assert_eq!(history.cursor(), Some(2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_then_redo_restores_surface() {
        let mut canvas = Canvas::default();
        let mut history = HistoryManager::new();
        history.record_state(&canvas).unwrap();

        canvas.add(circle(10.0));
        history.record_state(&canvas).unwrap();
        let with_one = canvas.capture().unwrap();

        canvas.add(circle(20.0));
        history.record_state(&canvas).unwrap();
        let with_two = canvas.capture().unwrap();

        history.undo(&mut canvas).unwrap();
        assert_eq!(canvas.capture().unwrap(), with_one);
        assert_eq!(history.cursor(), Some(1));

        history.redo(&mut canvas).unwrap();
        assert_eq!(canvas.capture().unwrap(), with_two);
        assert_eq!(history.cursor(), Some(2));
    }

    #[test]
    fn test_boundaries_are_noops() {
        let mut canvas = Canvas::default();
        let mut history = HistoryManager::new();

        assert!(matches!(
            history.undo(&mut canvas),
            Err(HistoryError::NoHistoryAvailable {
                direction: Direction::Undo
            })
        ));

        history.record_state(&canvas).unwrap();
        assert!(history.undo(&mut canvas).is_err());
        assert_eq!(history.cursor(), Some(0));

        assert!(matches!(
            history.redo(&mut canvas),
            Err(HistoryError::NoHistoryAvailable {
                direction: Direction::Redo
            })
        ));
        assert_eq!(history.cursor(), Some(0));
    }

    #[test]
    fn test_failed_restore_keeps_cursor() {
        let mut canvas = Canvas::default();
        let mut history = HistoryManager::new();
        history.push(snap("{ broken"));
        history.record_state(&canvas).unwrap();

        let err = history.undo(&mut canvas).unwrap_err();
        assert!(matches!(err, HistoryError::Surface(SurfaceError::Decode(_))));
        assert_eq!(history.cursor(), Some(1));
    }
}
