use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::movegen::find_king;
use crate::position::{simulate_move, GameState, PositionError};
use crate::rules::{has_legal_move, is_legal_move, king_in_check, legal_moves};
use crate::sfen::parse_sfen;
use crate::types::{Color, Move, MoveList};
use crate::usi::{format_move, parse_move};

/// True when an opposing piece attacks `color`'s king. A missing king is
/// never in check.
pub fn is_in_check(state: &GameState, color: Color) -> bool {
    king_in_check(state, color)
}

pub fn is_checkmate(state: &GameState, color: Color) -> bool {
    is_in_check(state, color) && !has_legal_move(state, color)
}

/// No legal move while not in check. In shogi this loses like a mate.
pub fn is_stalemate(state: &GameState, color: Color) -> bool {
    find_king(&state.board, color).is_some()
        && !is_in_check(state, color)
        && !has_legal_move(state, color)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    NoLegalMoves { winner: Color },
    KingCaptured { winner: Color },
}

impl GameStatus {
    pub const fn winner(self) -> Option<Color> {
        match self {
            Self::Ongoing => None,
            Self::Checkmate { winner }
            | Self::NoLegalMoves { winner }
            | Self::KingCaptured { winner } => Some(winner),
        }
    }
}

pub fn game_status(state: &GameState) -> GameStatus {
    for color in Color::ALL {
        if find_king(&state.board, color).is_none() {
            return GameStatus::KingCaptured {
                winner: color.opposite(),
            };
        }
    }
    let side = state.turn;
    if has_legal_move(state, side) {
        GameStatus::Ongoing
    } else if is_in_check(state, side) {
        GameStatus::Checkmate {
            winner: side.opposite(),
        }
    } else {
        GameStatus::NoLegalMoves {
            winner: side.opposite(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub usi: String,
    pub before: GameState,
}

/// A game in progress: current state plus the moves that led to it.
#[derive(Debug, Clone)]
pub struct Shogi {
    state: GameState,
    initial: GameState,
    start_move_number: u32,
    history: Vec<HistoryEntry>,
}

impl Shogi {
    pub fn new() -> Self {
        Self::from_state(GameState::new())
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            initial: state.clone(),
            state,
            start_move_number: 1,
            history: Vec::new(),
        }
    }

    pub fn from_sfen(sfen: &str) -> Result<Self, PositionError> {
        let parsed = parse_sfen(sfen)?;
        let mut game = Self::from_state(parsed.state);
        game.start_move_number = parsed.move_number;
        Ok(game)
    }

    pub fn sfen(&self) -> String {
        self.state.sfen(self.move_number())
    }

    /// SFEN of the position the game started from.
    pub fn initial_sfen(&self) -> String {
        self.initial.sfen(self.start_move_number)
    }

    pub fn starts_from_startpos(&self) -> bool {
        self.initial == GameState::new()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn turn(&self) -> Color {
        self.state.turn
    }

    pub fn moves(&self) -> MoveList {
        if self.is_game_over() {
            MoveList::new()
        } else {
            legal_moves(&self.state, self.state.turn)
        }
    }

    pub fn make_move(&mut self, mv: &Move) -> Result<(), PositionError> {
        let color = self.state.turn;
        if !is_legal_move(&self.state, mv, color) {
            warn!(usi = %format_move(mv), ?color, "illegal move rejected");
            return Err(PositionError::IllegalMove);
        }
        let next = simulate_move(&self.state, mv, color)?;
        let before = std::mem::replace(&mut self.state, next);
        self.history.push(HistoryEntry {
            mv: *mv,
            usi: format_move(mv),
            before,
        });
        Ok(())
    }

    /// Parses a USI token against the current position and plays it.
    pub fn make_usi_move(&mut self, token: &str) -> Result<Move, PositionError> {
        let mv = parse_move(token, &self.state)?;
        self.make_move(&mv)?;
        Ok(mv)
    }

    pub fn undo(&mut self) -> Result<Move, PositionError> {
        let entry = self.history.pop().ok_or(PositionError::EmptyHistory)?;
        self.state = entry.before;
        Ok(entry.mv)
    }

    pub fn in_check(&self) -> bool {
        is_in_check(&self.state, self.state.turn)
    }

    pub fn is_checkmate(&self) -> bool {
        is_checkmate(&self.state, self.state.turn)
    }

    pub fn status(&self) -> GameStatus {
        game_status(&self.state)
    }

    pub fn is_game_over(&self) -> bool {
        self.status() != GameStatus::Ongoing
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Moves played so far in USI notation.
    pub fn usi_moves(&self) -> Vec<String> {
        self.history.iter().map(|entry| entry.usi.clone()).collect()
    }

    pub fn move_number(&self) -> u32 {
        self.start_move_number
            .saturating_add(self.history.len() as u32)
    }
}

impl Default for Shogi {
    fn default() -> Self {
        Self::new()
    }
}
