//! Linear undo/redo history of board snapshots.
//!
//! Recording a new snapshot while positioned before the end drops every
//! later entry first, so there is only ever one line of play.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::Move;
use crate::piece::Color;

/// A recorded position and the side to move in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Board,
    pub turn: Color,
}

#[derive(Clone, Debug)]
pub struct History {
    snapshots: Vec<Snapshot>,
    current: usize,
}

impl History {
    pub fn new(initial: Snapshot) -> Self {
        History {
            snapshots: vec![initial],
            current: 0,
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Never true: a history always holds its initial snapshot.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Append `snapshot` after the current entry, discarding the redo tail.
    /// Returns how many entries were dropped.
    pub fn record(&mut self, snapshot: Snapshot) -> usize {
        let dropped = self.snapshots.len() - (self.current + 1);
        self.snapshots.truncate(self.current + 1);
        self.snapshots.push(snapshot);
        self.current += 1;
        dropped
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        Some(self.current())
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        Some(self.current())
    }

    /// The move that led into the current snapshot, recovered by diffing it
    /// against its predecessor. None at the initial snapshot.
    pub fn last_move(&self) -> Option<Move> {
        if self.current == 0 {
            return None;
        }
        move_delta(
            &self.snapshots[self.current - 1].board,
            &self.snapshots[self.current].board,
        )
    }
}

/// Recover a single piece move from two boards: the origin is the square that
/// was emptied, the destination the square that gained a different piece.
///
/// Deliberately not limited to squares that were empty before: a capture
/// destination was occupied, and undo/redo should highlight it the same way
/// the live move did.
pub fn move_delta(before: &Board, after: &Board) -> Option<Move> {
    let mut from = None;
    let mut to = None;
    for r in 0..8 {
        for c in 0..8 {
            let (old, new) = (before.squares[r][c], after.squares[r][c]);
            if old == new {
                continue;
            }
            match (old, new) {
                (Some(_), None) => from = Some((r, c)),
                (_, Some(_)) => to = Some((r, c)),
                (None, None) => {}
            }
        }
    }
    Some(Move::new(from?, to?))
}
