use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::board::{Board, BoardError, Hand};
use crate::sfen::{encode_sfen, parse_sfen, SfenError};
use crate::types::{Color, Move, Piece, Square};
use crate::usi::UsiError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Sfen(#[from] SfenError),
    #[error(transparent)]
    Usi(#[from] UsiError),
    #[error("board error: {0}")]
    Board(#[from] BoardError),
    #[error("move color does not match turn")]
    WrongTurn,
    #[error("no piece on source square {}-{}", .0.rank, .0.file)]
    EmptySource(Square),
    #[error("piece on source square belongs to the opponent")]
    NotOwnPiece,
    #[error("required hand piece does not exist")]
    MissingHandPiece,
    #[error("drop target is occupied")]
    OccupiedTarget,
    #[error("illegal move")]
    IllegalMove,
    #[error("no move to undo")]
    EmptyHistory,
}

/// Board, both hands and the side to move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub hand: Hand,
    pub turn: Color,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            hand: Hand::empty(),
            turn: Color::Sente,
        }
    }

    pub fn empty(turn: Color) -> Self {
        Self {
            board: Board::empty(),
            hand: Hand::empty(),
            turn,
        }
    }

    pub fn from_sfen(sfen: &str) -> Result<Self, PositionError> {
        Ok(parse_sfen(sfen)?.state)
    }

    pub fn sfen(&self, move_number: u32) -> String {
        encode_sfen(self, move_number)
    }

    /// Applies `mv` for `color`, returning the successor state.
    pub fn apply(&self, mv: &Move, color: Color) -> Result<Self, PositionError> {
        simulate_move(self, mv, color)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a move without touching `state`.
///
/// Only structural checks are made here (a friendly piece on the source, a
/// held piece and empty target for drops); rule legality lives in
/// [`crate::rules`]. On success the turn passes to the opponent of `color`.
pub fn simulate_move(
    state: &GameState,
    mv: &Move,
    color: Color,
) -> Result<GameState, PositionError> {
    match *mv {
        Move::Normal { from, to, .. } => {
            let Some(piece) = state.board.get(from) else {
                warn!(
                    rank = from.rank,
                    file = from.file,
                    "move from empty square rejected"
                );
                return Err(PositionError::EmptySource(from));
            };
            if piece.color != color {
                return Err(PositionError::NotOwnPiece);
            }
            if state.board.get(to).is_some_and(|target| target.color == color) {
                return Err(PositionError::IllegalMove);
            }
        }
        Move::Drop { piece, to } => {
            if state.hand.count(color, piece) == 0 {
                return Err(PositionError::MissingHandPiece);
            }
            if !state.board.is_empty(to) {
                return Err(PositionError::OccupiedTarget);
            }
        }
    }

    let mut next = state.clone();
    apply_unchecked(&mut next, mv, color);
    Ok(next)
}

/// In-place application for moves already known to be structurally sound.
pub(crate) fn apply_unchecked(state: &mut GameState, mv: &Move, color: Color) {
    match *mv {
        Move::Normal {
            from, to, promote, ..
        } => {
            let Ok(Some(moving)) = state.board.remove(from) else {
                return;
            };
            if let Ok(Some(captured)) = state.board.remove(to) {
                state.hand.add(color, captured.piece_type);
            }
            let kind = if promote == Some(true) {
                moving.piece_type.promote()
            } else {
                moving.piece_type
            };
            let _ = state.board.put(Piece::new(kind, color), to);
        }
        Move::Drop { piece, to } => {
            if state.hand.take(color, piece) {
                let _ = state.board.put(Piece::new(piece, color), to);
            }
        }
    }
    state.turn = color.opposite();
}
