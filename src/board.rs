use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;
use crate::piece::{Color, Piece, PieceType};

/// A board coordinate: (row, col). Row 0 is rank 8 (Black's back rank),
/// col 0 is file a.
pub type Square = (usize, usize);

/// Piece placement of the standard starting position.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Parse algebraic notation such as "e2" into a square.
pub fn parse_square(s: &str) -> Result<Square, ChessError> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return Err(ChessError::InvalidSquare(s.to_string()));
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(ChessError::InvalidSquare(s.to_string()));
    }
    Ok(((b'8' - rank) as usize, (file - b'a') as usize))
}

/// Algebraic name of a square, e.g. (6, 4) -> "e2". Squares off the board
/// are written as raw coordinates.
pub fn square_name((row, col): Square) -> String {
    if row >= 8 || col >= 8 {
        return format!("({row},{col})");
    }
    let file = (b'a' + col as u8) as char;
    let rank = (b'8' - row as u8) as char;
    format!("{file}{rank}")
}

/// The 8×8 grid. A plain container: it performs no rule checks of its own.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board { squares: [[None; 8]; 8] }
    }

    pub fn new() -> Self {
        let mut board = Board::empty();

        // Black pieces (rows 0-1)
        for (col, &pt) in BACK_RANK.iter().enumerate() {
            board.squares[0][col] = Some(Piece::new(pt, Color::Black));
        }
        for sq in &mut board.squares[1] {
            *sq = Some(Piece::new(PieceType::Pawn, Color::Black));
        }

        // White pieces (rows 6-7)
        for sq in &mut board.squares[6] {
            *sq = Some(Piece::new(PieceType::Pawn, Color::White));
        }
        for (col, &pt) in BACK_RANK.iter().enumerate() {
            board.squares[7][col] = Some(Piece::new(pt, Color::White));
        }

        board
    }

    /// Piece on `square`; squares off the board read as empty.
    pub fn get(&self, (row, col): Square) -> Option<Piece> {
        self.squares.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Writes to squares off the board are ignored.
    pub fn set(&mut self, (row, col): Square, value: Option<Piece>) {
        if let Some(cell) = self.squares.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    /// Every occupied square with its piece, row by row.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, sq)| sq.map(|p| ((r, c), p)))
        })
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    /// Parse the piece-placement field of a FEN string. Ranks are listed from
    /// rank 8 (row 0) down to rank 1 (row 7).
    pub fn from_placement(placement: &str) -> Result<Self, ChessError> {
        let ranks: Vec<&str> = placement.trim().split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, found {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (row, rank) in ranks.iter().enumerate() {
            let mut col = 0usize;
            for ch in rank.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(ChessError::InvalidPlacement(format!(
                            "bad empty-run '{ch}' in rank {}",
                            8 - row
                        )));
                    }
                    col += skip as usize;
                } else {
                    let piece = Piece::from_char(ch).ok_or_else(|| {
                        ChessError::InvalidPlacement(format!("unknown piece '{ch}'"))
                    })?;
                    if col >= 8 {
                        return Err(ChessError::InvalidPlacement(format!(
                            "rank {} has more than 8 files",
                            8 - row
                        )));
                    }
                    board.squares[row][col] = Some(piece);
                    col += 1;
                }
                if col > 8 {
                    break;
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "rank {} does not cover 8 files",
                    8 - row
                )));
            }
        }
        Ok(board)
    }

    /// Inverse of [`Board::from_placement`].
    pub fn to_placement(&self) -> String {
        let mut out = String::new();
        for (row, rank) in self.squares.iter().enumerate() {
            if row > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for sq in rank {
                match sq {
                    Some(p) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(p.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, rank) in self.squares.iter().enumerate() {
            write!(f, "{}", 8 - row)?;
            for sq in rank {
                write!(f, " {}", sq.map(|p| p.to_char()).unwrap_or('.'))?;
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
