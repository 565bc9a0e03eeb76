use crate::analysis::legal_destinations;
use crate::piece::{Color, PieceType};
use crate::session::{Session, SessionEvent};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_turn: String,
    selected: Option<[usize; 2]>,
    targets: Vec<[usize; 2]>,
    game_over: bool,
    result: Option<String>,
    is_in_check: bool,
    last_move: Option<[[usize; 2]; 2]>,
    can_undo: bool,
    can_redo: bool,
    /// Set only by the command that ended the game, so the page can show its
    /// message once.
    game_ended: Option<String>,
}

fn piece_type_to_string(pt: PieceType) -> String {
    match pt {
        PieceType::King => "King".to_string(),
        PieceType::Queen => "Queen".to_string(),
        PieceType::Rook => "Rook".to_string(),
        PieceType::Bishop => "Bishop".to_string(),
        PieceType::Knight => "Knight".to_string(),
        PieceType::Pawn => "Pawn".to_string(),
    }
}

fn color_to_string(c: Color) -> String {
    c.to_string()
}

fn build_board_state(session: &Session, events: &[SessionEvent]) -> BoardState {
    let view = session.view();
    let squares: Vec<Vec<Option<SquarePiece>>> = (0..8)
        .map(|r| {
            (0..8)
                .map(|c| {
                    view.board.squares[r][c].map(|p| SquarePiece {
                        piece_type: piece_type_to_string(p.piece_type),
                        color: color_to_string(p.color),
                    })
                })
                .collect()
        })
        .collect();

    let game_ended = events.iter().find_map(|e| match e {
        SessionEvent::GameEnded(status) => Some(status.to_string()),
        SessionEvent::StateChanged => None,
    });

    BoardState {
        squares,
        current_turn: color_to_string(view.turn),
        selected: view.selection.map(|(r, c)| [r, c]),
        targets: session.targets().into_iter().map(|(r, c)| [r, c]).collect(),
        game_over: view.game_over,
        result: view.game_over.then(|| view.status.to_string()),
        is_in_check: view.in_check,
        last_move: view.last_move.map(|m| [[m.from.0, m.from.1], [m.to.0, m.to.1]]),
        can_undo: view.can_undo,
        can_redo: view.can_redo,
        game_ended,
    }
}

#[wasm_bindgen]
pub struct Game {
    session: Session,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            session: Session::new(),
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        self.state(&[])
    }

    /// A click on a board cell: selects or moves depending on the selection.
    pub fn click(&mut self, row: usize, col: usize) -> JsValue {
        let events = self.session.click((row, col));
        self.state(&events)
    }

    pub fn select(&mut self, row: usize, col: usize) -> JsValue {
        let events = self.session.select_origin((row, col));
        self.state(&events)
    }

    pub fn move_to(&mut self, row: usize, col: usize) -> JsValue {
        let events = self.session.attempt_move((row, col));
        self.state(&events)
    }

    pub fn undo(&mut self) -> JsValue {
        let events = self.session.undo();
        self.state(&events)
    }

    pub fn redo(&mut self) -> JsValue {
        let events = self.session.redo();
        self.state(&events)
    }

    pub fn reset(&mut self) -> JsValue {
        let events = self.session.reset();
        self.state(&events)
    }

    /// Squares the piece on (row, col) could move to, for hover hints.
    pub fn get_targets(&self, row: usize, col: usize) -> JsValue {
        let targets: Vec<[usize; 2]> = legal_destinations(self.session.board(), (row, col))
            .into_iter()
            .map(|(r, c)| [r, c])
            .collect();
        serde_wasm_bindgen::to_value(&targets).unwrap_or(JsValue::NULL)
    }
}

impl Game {
    fn state(&self, events: &[SessionEvent]) -> JsValue {
        let state = build_board_state(&self.session, events);
        serde_wasm_bindgen::to_value(&state).unwrap_or(JsValue::NULL)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
