//! Errors raised at the text and configuration boundary.
//!
//! Engine commands themselves never fail; these only come out of notation
//! parsing and config loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChessError {
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
