//! Check and end-of-game detection built on top of single-move legality.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Square};
use crate::piece::Color;
use crate::rules::{attacks, is_legal};

/// Result of looking at a position from the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    /// A king is gone from the board; the survivor's side wins outright.
    KingCaptured(Color),
    Checkmate(Color),
    Stalemate,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }

    pub fn winner(self) -> Option<Color> {
        match self {
            GameStatus::KingCaptured(c) | GameStatus::Checkmate(c) => Some(c),
            GameStatus::Ongoing | GameStatus::Stalemate => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "Game in progress"),
            GameStatus::KingCaptured(winner) => write!(f, "{winner} wins by king capture!"),
            GameStatus::Checkmate(winner) => write!(f, "Checkmate! {winner} wins!"),
            GameStatus::Stalemate => write!(f, "Stalemate! Draw."),
        }
    }
}

fn all_squares() -> impl Iterator<Item = Square> {
    (0..8).flat_map(|r| (0..8).map(move |c| (r, c)))
}

/// Is `color`'s king attacked by any opposing piece? A side without a king is
/// not in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    let Some(king) = board.find_king(color) else {
        return false;
    };
    board
        .pieces()
        .filter(|(_, p)| p.color != color)
        .any(|(sq, p)| attacks(board, sq, king, p))
}

/// Does `color` have at least one legal move that leaves its own king out of
/// check?
pub fn has_any_legal_move(board: &Board, color: Color) -> bool {
    for (from, piece) in board.pieces().filter(|(_, p)| p.color == color) {
        for to in all_squares() {
            if from == to || !is_legal(board, from, to, piece) {
                continue;
            }
            let mut trial = *board;
            trial.set(to, Some(piece));
            trial.set(from, None);
            if !is_in_check(&trial, color) {
                return true;
            }
        }
    }
    false
}

/// Classify the position for `side_to_move`.
///
/// A missing king is checked first and wins the game for the other side no
/// matter whose turn it is. The White king is looked for first, so a board
/// without either king reads as a Black win.
pub fn evaluate_end_state(board: &Board, side_to_move: Color) -> GameStatus {
    if board.find_king(Color::White).is_none() {
        return GameStatus::KingCaptured(Color::Black);
    }
    if board.find_king(Color::Black).is_none() {
        return GameStatus::KingCaptured(Color::White);
    }

    if has_any_legal_move(board, side_to_move) {
        return GameStatus::Ongoing;
    }
    if is_in_check(board, side_to_move) {
        GameStatus::Checkmate(side_to_move.opposite())
    } else {
        GameStatus::Stalemate
    }
}

/// Squares the piece on `from` may legally move to, ignoring self-check.
/// Empty when `from` is empty.
pub fn legal_destinations(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    all_squares()
        .filter(|&to| to != from && is_legal(board, from, to, piece))
        .collect()
}
