use serde::{Deserialize, Serialize};

use crate::board::{parse_square, square_name, Square};
use crate::error::ChessError;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }

    /// Convert to coordinate notation, e.g. "e2e4"
    pub fn to_uci(&self) -> String {
        format!("{}{}", square_name(self.from), square_name(self.to))
    }

    /// Parse from coordinate notation. A trailing promotion letter is refused,
    /// pawns never promote here.
    pub fn from_uci(s: &str) -> Result<Move, ChessError> {
        let s = s.trim();
        if s.len() != 4 || !s.is_ascii() {
            return Err(ChessError::InvalidMove(s.to_string()));
        }
        let from = parse_square(&s[..2]).map_err(|_| ChessError::InvalidMove(s.to_string()))?;
        let to = parse_square(&s[2..]).map_err(|_| ChessError::InvalidMove(s.to_string()))?;
        Ok(Move { from, to })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uci())
    }
}
