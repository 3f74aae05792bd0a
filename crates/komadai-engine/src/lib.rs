pub mod ai;
pub mod alphabeta;
pub mod arena;
pub mod classical;
pub mod heuristic;
pub mod usi_engine;

pub use ai::{find_mate_in_one, AiConfig, AiPlayer, Difficulty, ParseDifficultyError};
pub use alphabeta::{AlphaBetaConfig, AlphaBetaResult, AlphaBetaSearcher, MATE_SCORE};
pub use arena::{
    elo_diff, play_game, play_game_from, run_battle, ArenaError, BattleConfig, BattleReport,
    BattleSummary, GameRecord, GameResult, Termination,
};
pub use classical::{piece_value, ClassicalEval};
pub use heuristic::{heuristic_value, quick_evaluate_move, rank_moves};
pub use usi_engine::{
    BestMove, EngineConfig, EngineError, EngineIo, ProcessIo, UsiEngine,
    DEFAULT_BESTMOVE_ATTEMPTS, DEFAULT_HANDSHAKE_ATTEMPTS,
};
