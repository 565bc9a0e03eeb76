// =============================================================================
// Move legality
//
// Single-move legality: piece geometry, path clearance and the capture rules.
// Nothing here looks at whether the mover's own king ends up attacked; that
// is only checked in aggregate by the analysis module.
//
// Coordinate system: row 0 = rank 8, col 0 = file a. White pawns move toward
// row 0, Black pawns toward row 7.
// =============================================================================

use crate::board::{Board, Square};
use crate::piece::{Piece, PieceType};

/// Can `piece`, standing on `from`, move to `to`?
///
/// The caller vouches for `piece`; the board is not re-read at `from`.
/// A destination holding any king is never legal, and neither is capturing a
/// piece of the mover's own color.
pub fn is_legal(board: &Board, from: Square, to: Square, piece: Piece) -> bool {
    if let Some(dest) = board.get(to) {
        if dest.piece_type == PieceType::King {
            return false;
        }
    }
    attacks(board, from, to, piece)
}

/// Like [`is_legal`] but without the king guard: does `piece` on `from` reach
/// `to`? Used for check detection, where the target square holds the king.
pub fn attacks(board: &Board, from: Square, to: Square, piece: Piece) -> bool {
    if from.0 >= 8 || from.1 >= 8 || to.0 >= 8 || to.1 >= 8 {
        return false;
    }
    let dest = board.get(to);
    if dest.map(|p| p.color == piece.color).unwrap_or(false) {
        return false;
    }

    let dr = to.0 as i32 - from.0 as i32;
    let dc = to.1 as i32 - from.1 as i32;

    match piece.piece_type {
        PieceType::Pawn => pawn_reaches(board, from, dr, dc, piece, dest),
        PieceType::Rook => (dr == 0) != (dc == 0) && path_clear(board, from, dr, dc),
        PieceType::Knight => matches!((dr.abs(), dc.abs()), (2, 1) | (1, 2)),
        PieceType::Bishop => dr != 0 && dr.abs() == dc.abs() && path_clear(board, from, dr, dc),
        PieceType::Queen => {
            if dr == 0 || dc == 0 {
                attacks(board, from, to, piece.as_type(PieceType::Rook))
            } else if dr.abs() == dc.abs() {
                attacks(board, from, to, piece.as_type(PieceType::Bishop))
            } else {
                false
            }
        }
        PieceType::King => dr.abs() <= 1 && dc.abs() <= 1,
    }
}

fn pawn_reaches(
    board: &Board,
    from: Square,
    dr: i32,
    dc: i32,
    piece: Piece,
    dest: Option<Piece>,
) -> bool {
    let dir = piece.color.forward();

    // Single push
    if dc == 0 && dr == dir && dest.is_none() {
        return true;
    }

    // Double push from the starting row; both squares must be empty
    if dc == 0 && dr == 2 * dir && from.0 == piece.color.pawn_row() && dest.is_none() {
        let middle = ((from.0 as i32 + dir) as usize, from.1);
        return board.get(middle).is_none();
    }

    // Diagonal capture; dest is known not to be our own color
    dc.abs() == 1 && dr == dir && dest.is_some()
}

/// Every square strictly between `from` and `from + (dr, dc)` is empty.
/// The offset must be a straight or diagonal line.
fn path_clear(board: &Board, from: Square, dr: i32, dc: i32) -> bool {
    let steps = dr.abs().max(dc.abs());
    let (sr, sc) = (dr.signum(), dc.signum());
    (1..steps).all(|i| {
        let r = from.0 as i32 + i * sr;
        let c = from.1 as i32 + i * sc;
        board.get((r as usize, c as usize)).is_none()
    })
}
