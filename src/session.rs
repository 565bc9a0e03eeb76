// =============================================================================
// Game session
//
// Owns the authoritative board, the side to move, the current selection and
// the undo/redo history. The presentation layer drives it one command at a
// time and renders `view()` after each one.
//
// Commands never fail. Anything the rules refuse (selecting an empty or enemy
// square, an illegal destination, undo at the start of the history) is
// absorbed, and the command returns no events or just a cleared selection.
// =============================================================================

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{evaluate_end_state, is_in_check, legal_destinations, GameStatus};
use crate::board::{Board, Square};
use crate::config::SessionConfig;
use crate::error::ChessError;
use crate::history::{History, Snapshot};
use crate::moves::Move;
use crate::piece::Color;
use crate::rules::is_legal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting for the side to move to pick a piece.
    Ongoing,
    PieceSelected(Square),
    GameOver(GameStatus),
}

/// What a command changed, for the presentation layer to react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    /// Board, turn, selection or highlight changed; re-render.
    StateChanged,
    GameEnded(GameStatus),
}

/// Everything a front end needs to draw the game.
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub board: Board,
    pub turn: Color,
    pub selection: Option<Square>,
    pub game_over: bool,
    pub status: GameStatus,
    pub in_check: bool,
    pub last_move: Option<Move>,
    pub history_len: usize,
    pub current_index: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Clone, Debug)]
pub struct Session {
    start: Snapshot,
    board: Board,
    turn: Color,
    phase: Phase,
    last_move: Option<Move>,
    history: History,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot {
            board: Board::new(),
            turn: Color::White,
        })
    }

    pub fn with_config(config: &SessionConfig) -> Result<Self, ChessError> {
        let board = config.initial_board()?;
        Ok(Self::from_snapshot(Snapshot {
            board,
            turn: config.first_turn,
        }))
    }

    fn from_snapshot(start: Snapshot) -> Self {
        Session {
            start,
            board: start.board,
            turn: start.turn,
            phase: Phase::Ongoing,
            last_move: None,
            history: History::new(start),
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> Option<Square> {
        match self.phase {
            Phase::PieceSelected(sq) => Some(sq),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver(_))
    }

    /// The terminal status once the game is over, `Ongoing` before that.
    pub fn status(&self) -> GameStatus {
        match self.phase {
            Phase::GameOver(status) => status,
            _ => GameStatus::Ongoing,
        }
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn current_index(&self) -> usize {
        self.history.current_index()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Destinations the rules accept for the selected piece, for highlighting.
    pub fn targets(&self) -> Vec<Square> {
        self.selection()
            .map(|sq| legal_destinations(&self.board, sq))
            .unwrap_or_default()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            board: self.board,
            turn: self.turn,
            selection: self.selection(),
            game_over: self.is_game_over(),
            status: self.status(),
            // The snapshot's turn is the side to move next, which is the
            // losing side once the game has ended.
            in_check: is_in_check(&self.board, self.history.current().turn),
            last_move: self.last_move,
            history_len: self.history.len(),
            current_index: self.history.current_index(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Select the piece on `square` if it belongs to the side to move and
    /// nothing is selected yet.
    pub fn select_origin(&mut self, square: Square) -> Vec<SessionEvent> {
        if self.phase != Phase::Ongoing {
            return Vec::new();
        }
        match self.board.get(square) {
            Some(piece) if piece.color == self.turn => {
                self.phase = Phase::PieceSelected(square);
                vec![SessionEvent::StateChanged]
            }
            _ => Vec::new(),
        }
    }

    /// Move the selected piece to `destination`. An illegal destination only
    /// clears the selection.
    pub fn attempt_move(&mut self, destination: Square) -> Vec<SessionEvent> {
        let Phase::PieceSelected(origin) = self.phase else {
            return Vec::new();
        };
        self.phase = Phase::Ongoing;

        let mv = Move::new(origin, destination);
        let piece = match self.board.get(origin) {
            Some(p) if p.color == self.turn && is_legal(&self.board, origin, destination, p) => p,
            _ => {
                debug!(%mv, turn = %self.turn, "move rejected");
                return vec![SessionEvent::StateChanged];
            }
        };

        self.board.set(destination, Some(piece));
        self.board.set(origin, None);
        self.last_move = Some(mv);

        let next = self.turn.opposite();
        let dropped = self.history.record(Snapshot {
            board: self.board,
            turn: next,
        });
        debug!(%mv, mover = %self.turn, dropped, "move played");

        let status = evaluate_end_state(&self.board, next);
        if status.is_terminal() {
            info!(%status, "game over");
            self.phase = Phase::GameOver(status);
            return vec![SessionEvent::StateChanged, SessionEvent::GameEnded(status)];
        }
        self.turn = next;
        vec![SessionEvent::StateChanged]
    }

    /// Board-click behaviour: select when nothing is selected, otherwise try
    /// to move the selection onto the clicked square.
    pub fn click(&mut self, square: Square) -> Vec<SessionEvent> {
        match self.phase {
            Phase::Ongoing => self.select_origin(square),
            Phase::PieceSelected(_) => self.attempt_move(square),
            Phase::GameOver(_) => Vec::new(),
        }
    }

    /// Select `mv.from` and move it to `mv.to` in one call. Does nothing when
    /// a selection is already pending or `mv.from` cannot be selected.
    pub fn play(&mut self, mv: Move) -> Vec<SessionEvent> {
        if self.select_origin(mv.from).is_empty() {
            return Vec::new();
        }
        self.attempt_move(mv.to)
    }

    pub fn undo(&mut self) -> Vec<SessionEvent> {
        let Some(snapshot) = self.history.undo().copied() else {
            return Vec::new();
        };
        self.restore(snapshot);
        debug!(index = self.history.current_index(), "undo");
        vec![SessionEvent::StateChanged]
    }

    pub fn redo(&mut self) -> Vec<SessionEvent> {
        let Some(snapshot) = self.history.redo().copied() else {
            return Vec::new();
        };
        self.restore(snapshot);
        debug!(index = self.history.current_index(), "redo");
        vec![SessionEvent::StateChanged]
    }

    /// Back to the starting position with a fresh history.
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        *self = Self::from_snapshot(self.start);
        info!("game reset");
        vec![SessionEvent::StateChanged]
    }

    /// Game over is not carried across undo/redo: the restored position is
    /// treated as live until the next move is evaluated.
    fn restore(&mut self, snapshot: Snapshot) {
        self.board = snapshot.board;
        self.turn = snapshot.turn;
        self.phase = Phase::Ongoing;
        self.last_move = self.history.last_move();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{Piece, PieceType};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn mv(s: &str) -> Move {
        Move::from_uci(s).expect("test move parses")
    }

    fn session_from(placement: &str, first_turn: Color) -> Session {
        let config = SessionConfig {
            placement: Some(placement.to_string()),
            first_turn,
        };
        Session::with_config(&config).expect("test config is valid")
    }

    #[test]
    fn new_session_is_the_standard_start() {
        let session = Session::new();
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.phase(), Phase::Ongoing);
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.last_move(), None);
        assert_eq!(evaluate_end_state(session.board(), session.turn()), GameStatus::Ongoing);
    }

    #[test]
    fn opening_two_pawn_moves() {
        let mut session = Session::new();
        assert_eq!(session.play(mv("e2e4")), vec![SessionEvent::StateChanged]);
        assert_eq!(session.play(mv("d7d5")), vec![SessionEvent::StateChanged]);

        let mut expected = Board::new();
        expected.set((6, 4), None);
        expected.set((4, 4), Some(Piece::new(PieceType::Pawn, Color::White)));
        expected.set((1, 3), None);
        expected.set((3, 3), Some(Piece::new(PieceType::Pawn, Color::Black)));

        assert_eq!(session.board(), &expected);
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.history_len(), 3);
        assert_eq!(session.last_move(), Some(mv("d7d5")));
        assert_eq!(evaluate_end_state(session.board(), session.turn()), GameStatus::Ongoing);
    }

    #[test]
    fn selection_only_takes_own_pieces() {
        let mut session = Session::new();
        assert!(session.select_origin((4, 4)).is_empty(), "empty square");
        assert!(session.select_origin((1, 4)).is_empty(), "black pawn on white's turn");
        assert_eq!(session.selection(), None);

        assert_eq!(session.select_origin((6, 4)), vec![SessionEvent::StateChanged]);
        assert_eq!(session.selection(), Some((6, 4)));
        assert!(session.select_origin((6, 3)).is_empty(), "already selected");
        assert_eq!(session.selection(), Some((6, 4)));
        assert!(!session.targets().is_empty());
    }

    #[test]
    fn illegal_attempt_only_clears_the_selection() {
        let mut session = Session::new();
        session.select_origin((6, 4));
        assert_eq!(session.attempt_move((3, 4)), vec![SessionEvent::StateChanged]);
        assert_eq!(session.selection(), None);
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.history_len(), 1);
        assert!(session.attempt_move((4, 4)).is_empty(), "no selection, nothing to move");
    }

    #[test]
    fn off_board_destination_only_clears_the_selection() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut session = Session::new();
            session.select_origin((6, 4));
            assert_eq!(session.attempt_move((100, 0)), vec![SessionEvent::StateChanged]);
            assert_eq!(session.selection(), None);
            assert_eq!(session.board(), &Board::new());
            assert_eq!(session.turn(), Color::White);
            assert_eq!(session.history_len(), 1);

            session.select_origin((6, 4));
            assert_eq!(session.click((3, usize::MAX)), vec![SessionEvent::StateChanged]);
            assert_eq!(session.selection(), None);
            assert_eq!(session.history_len(), 1);
        });
    }

    #[test]
    fn click_selects_then_moves() {
        let mut session = Session::new();
        session.click((7, 6));
        assert_eq!(session.selection(), Some((7, 6)));
        session.click((5, 5));
        assert_eq!(session.board().get((5, 5)), Some(Piece::new(PieceType::Knight, Color::White)));
        assert_eq!(session.turn(), Color::Black);
    }

    #[test]
    fn move_then_undo_round_trips() {
        let mut session = Session::new();
        session.play(mv("g1f3"));
        assert_eq!(session.undo(), vec![SessionEvent::StateChanged]);
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.selection(), None);
        assert_eq!(session.last_move(), None);
        assert!(session.can_redo());
    }

    #[test]
    fn undo_and_redo_at_the_edges_are_no_ops() {
        let mut session = Session::new();
        assert!(session.undo().is_empty());
        assert!(session.redo().is_empty());
        session.play(mv("e2e4"));
        assert!(session.redo().is_empty());
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn redo_restores_the_highlight() {
        let mut session = Session::new();
        session.play(mv("e2e4"));
        session.play(mv("d7d5"));
        session.play(mv("e4d5"));
        session.undo();
        assert_eq!(session.last_move(), Some(mv("d7d5")));
        session.redo();
        assert_eq!(session.last_move(), Some(mv("e4d5")), "captures are recovered too");
        assert_eq!(session.turn(), Color::Black);
    }

    #[test]
    fn new_move_after_undo_discards_redo_branch() {
        let mut session = Session::new();
        session.play(mv("e2e4")); // A
        session.play(mv("e7e5")); // B
        session.undo();
        session.play(mv("d7d5")); // C
        assert!(!session.can_redo());
        assert!(session.redo().is_empty());
        assert_eq!(session.history_len(), 3);
        assert!(session.board().get((3, 4)).is_none(), "B is gone");
        assert!(session.board().get((3, 3)).is_some());
    }

    #[test]
    fn selection_is_dropped_by_undo() {
        let mut session = Session::new();
        session.play(mv("e2e4"));
        session.select_origin((1, 4));
        session.undo();
        assert_eq!(session.selection(), None);
        assert_eq!(session.turn(), Color::White);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut session = Session::new();
        session.play(mv("f2f3"));
        session.play(mv("e7e5"));
        session.play(mv("g2g4"));
        let events = session.play(mv("d8h4"));

        let mate = GameStatus::Checkmate(Color::Black);
        assert_eq!(events, vec![SessionEvent::StateChanged, SessionEvent::GameEnded(mate)]);
        assert!(session.is_game_over());
        assert_eq!(session.status(), mate);
        assert_eq!(session.turn(), Color::Black, "turn does not advance once the game ends");
        assert_eq!(session.history_len(), 5);

        let frozen = *session.board();
        assert!(session.click((6, 0)).is_empty());
        assert!(session.select_origin((6, 0)).is_empty());
        assert!(session.play(mv("a2a3")).is_empty());
        assert_eq!(session.board(), &frozen);
        assert!(session.view().in_check, "the mated side is in check");

        // Undo and redo both reopen the position.
        session.undo();
        assert!(!session.is_game_over());
        assert_eq!(session.turn(), Color::Black);
        session.redo();
        assert!(!session.is_game_over());
        assert_eq!(session.status(), GameStatus::Ongoing);
        assert_eq!(session.turn(), Color::White);
        assert_eq!(session.board(), &frozen);

        // Reset after a finished game opens play from the start again.
        session.undo();
        session.play(mv("d8h4"));
        assert!(session.is_game_over());
        assert_eq!(session.reset(), vec![SessionEvent::StateChanged]);
        assert_eq!(session.phase(), Phase::Ongoing);
        assert_eq!(session.play(mv("e2e4")), vec![SessionEvent::StateChanged]);
        assert_eq!(session.turn(), Color::Black);
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn stalemate_ends_the_game() {
        // White Ka1, Black Kc2 and Qc4; Black to move plays Qb3.
        let mut session = session_from("8/8/8/8/2q5/8/2k5/K7", Color::Black);
        let events = session.play(mv("c4b3"));
        assert_eq!(events.last(), Some(&SessionEvent::GameEnded(GameStatus::Stalemate)));
        assert_eq!(session.status(), GameStatus::Stalemate);
    }

    #[test]
    fn missing_king_is_a_king_capture_win() {
        let mut session = session_from("8/8/8/8/8/8/P7/4K3", Color::White);
        let events = session.play(mv("a2a3"));
        assert_eq!(
            events,
            vec![
                SessionEvent::StateChanged,
                SessionEvent::GameEnded(GameStatus::KingCaptured(Color::White))
            ]
        );
        assert_eq!(session.status().to_string(), "White wins by king capture!");
    }

    /// A move that exposes the mover's own king is still accepted; only the
    /// aggregate "has a move" scan looks at self-check.
    #[test]
    fn moves_into_self_check_are_accepted() {
        // Black Ka8 and Re8, White Be2 shields Ke1.
        let mut session = session_from("k3r3/8/8/8/8/8/4B3/4K3", Color::White);
        let events = session.play(mv("e2d3"));
        assert_eq!(events, vec![SessionEvent::StateChanged]);
        assert!(is_in_check(session.board(), Color::White));
        assert_eq!(session.turn(), Color::Black);
        assert!(!session.is_game_over());
        assert!(!session.view().in_check, "view reports the side to move");

        // The rook still cannot take the king.
        assert_eq!(session.play(mv("e8e1")), vec![SessionEvent::StateChanged]);
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.board().find_king(Color::White), Some((7, 4)));
    }

    #[test]
    fn reset_returns_to_the_configured_start() {
        let mut session = session_from("4k3/8/8/8/8/8/4P3/4K3", Color::Black);
        session.play(mv("e8d8"));
        session.play(mv("e2e4"));
        assert_eq!(session.reset(), vec![SessionEvent::StateChanged]);
        assert_eq!(session.turn(), Color::Black);
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.board().to_placement(), "4k3/8/8/8/8/8/4P3/4K3");
        assert!(!session.can_undo());
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = SessionConfig {
            placement: Some("not a board".to_string()),
            first_turn: Color::White,
        };
        assert!(Session::with_config(&config).is_err());
    }

    #[test]
    fn view_serializes_to_json() {
        let mut session = Session::new();
        session.play(mv("e2e4"));
        let json = serde_json::to_value(session.view()).expect("view serializes");
        assert_eq!(json["turn"], "Black");
        assert_eq!(json["history_len"], 2);
        assert_eq!(json["game_over"], false);
        assert_eq!(json["last_move"]["from"], serde_json::json!([6, 4]));
    }

    /// Random clicks, undos, redos and resets: the session must always stay
    /// consistent with its history.
    #[test]
    fn random_commands_keep_session_consistent() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut session = Session::new();

        for step in 0..5000 {
            let before_len = session.history_len();
            match rng.gen_range(0..20) {
                0 => {
                    session.undo();
                }
                1 => {
                    session.redo();
                }
                2 if step % 400 == 0 => {
                    session.reset();
                }
                _ => {
                    // Bias toward the side to move's pieces so games progress.
                    let square = if session.selection().is_none() && rng.gen_bool(0.8) {
                        let own: Vec<Square> = session
                            .board()
                            .pieces()
                            .filter(|(_, p)| p.color == session.turn())
                            .map(|(sq, _)| sq)
                            .collect();
                        if own.is_empty() {
                            (rng.gen_range(0..8), rng.gen_range(0..8))
                        } else {
                            own[rng.gen_range(0..own.len())]
                        }
                    } else if let Some(&to) = session.targets().first().filter(|_| rng.gen_bool(0.5)) {
                        to
                    } else {
                        (rng.gen_range(0..10), rng.gen_range(0..10))
                    };
                    session.click(square);
                }
            }

            assert_eq!(session.board(), &session.history.current().board, "step {step}");
            assert!(session.current_index() < session.history_len());
            assert!(session.history_len() <= before_len + 1);
            if let Some(sq) = session.selection() {
                let piece = session.board().get(sq).expect("selection holds a piece");
                assert_eq!(piece.color, session.turn());
            }
            if session.is_game_over() {
                assert!(session.status().is_terminal());
                assert_eq!(session.history.current().turn, session.turn().opposite());
            } else {
                assert_eq!(session.turn(), session.history.current().turn);
            }
        }
    }
}
