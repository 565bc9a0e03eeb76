use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ChessError;
use crate::piece::Color;

/// How a session starts, and what `reset` returns to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// FEN piece placement of the starting position. `None` means the
    /// standard layout.
    pub placement: Option<String>,
    pub first_turn: Color,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            placement: None,
            first_turn: Color::White,
        }
    }
}

impl SessionConfig {
    /// Load from JSON such as `{"placement": "4k3/8/8/8/8/8/8/4K2R", "first_turn": "Black"}`.
    /// Missing fields take their defaults. The placement is validated here.
    pub fn from_json(json: &str) -> Result<Self, ChessError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.initial_board()?;
        Ok(config)
    }

    pub fn initial_board(&self) -> Result<Board, ChessError> {
        match &self.placement {
            Some(placement) => Board::from_placement(placement),
            None => Ok(Board::new()),
        }
    }
}
