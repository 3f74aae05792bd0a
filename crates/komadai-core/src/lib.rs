pub mod board;
pub mod constants;
pub mod eval;
pub mod game;
pub mod movegen;
pub mod position;
pub mod rules;
pub mod search;
pub mod sfen;
pub mod types;
pub mod usi;

pub use board::{Board, BoardError, Hand};
pub use constants::{SQUARES, STARTPOS_SFEN};
pub use eval::Evaluator;
pub use game::{
    game_status, is_checkmate, is_in_check, is_stalemate, GameStatus, HistoryEntry, Shogi,
};
pub use movegen::{
    attacked_squares, find_king, generate_moves, is_square_attacked, promotion_option,
    PromotionOption,
};
pub use position::{simulate_move, GameState, PositionError};
pub use rules::{
    has_legal_move, is_legal_drop, is_legal_move, is_valid_move, legal_moves, legal_moves_with,
};
pub use search::{SearchLimits, SearchResult, Searcher};
pub use sfen::{encode_sfen, parse_sfen, ParsedSfen, SfenError};
pub use types::{Color, Move, MoveList, Piece, PieceType, Score, Square};
pub use usi::{format_move, format_square, parse_move, parse_square, UsiError};
