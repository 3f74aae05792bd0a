use std::fmt;
use std::str::FromStr;

use komadai_core::{is_checkmate, legal_moves, simulate_move, Color, GameState, Move, SearchLimits};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::alphabeta::{AlphaBetaConfig, AlphaBetaSearcher};
use crate::heuristic::rank_moves;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty `{0}`, expected easy, medium or hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Plies searched by the hard player before quiescence.
    pub hard_depth: u8,
    pub node_limit: Option<u64>,
    pub time_ms: Option<u64>,
    /// Fixed seed for reproducible games; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            hard_depth: 3,
            node_limit: Some(400_000),
            time_ms: None,
            seed: None,
        }
    }
}

/// Computer player for all three difficulty tiers. The random source is
/// owned by the player, so two players built from the same seed replay the
/// same choices.
#[derive(Debug)]
pub struct AiPlayer {
    config: AiConfig,
    rng: StdRng,
    searcher: AlphaBetaSearcher,
}

impl AiPlayer {
    pub fn new(config: AiConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: AiConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            searcher: AlphaBetaSearcher::new(AlphaBetaConfig {
                max_depth: config.hard_depth,
            }),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Picks a move for `color`, or `None` when `color` has no legal move.
    pub fn generate_move(
        &mut self,
        state: &GameState,
        difficulty: Difficulty,
        color: Color,
    ) -> Option<Move> {
        let moves = legal_moves(state, color);
        if moves.is_empty() {
            debug!(?color, "no legal move available");
            return None;
        }

        let chosen = match difficulty {
            Difficulty::Easy => moves.choose(&mut self.rng).copied(),
            Difficulty::Medium => self.medium_move(state, &moves, color),
            Difficulty::Hard => self.hard_move(state, color),
        };
        debug!(%difficulty, ?color, candidates = moves.len(), chosen = ?chosen, "ai move selected");
        chosen
    }

    fn medium_move(&mut self, state: &GameState, moves: &[Move], color: Color) -> Option<Move> {
        if let Some(mate) = find_mate_in_one(state, moves, color) {
            return Some(mate);
        }

        let ranked = rank_moves(state, moves, color);
        let best_score = ranked.first()?.1;
        let tied: Vec<Move> = ranked
            .iter()
            .take_while(|(_, score)| *score == best_score)
            .map(|(mv, _)| *mv)
            .collect();
        tied.choose(&mut self.rng).copied()
    }

    fn hard_move(&mut self, state: &GameState, color: Color) -> Option<Move> {
        let mut root = state.clone();
        root.turn = color;
        let limits = SearchLimits {
            depth: Some(self.config.hard_depth),
            nodes: self.config.node_limit,
            time_ms: self.config.time_ms,
        };
        let result = self.searcher.search_with_info(&root, limits);
        debug!(
            depth = result.depth,
            nodes = result.nodes,
            score = result.score.0,
            "hard search finished"
        );
        result.best_move
    }
}

/// First move in `moves` that leaves the opponent checkmated.
pub fn find_mate_in_one(state: &GameState, moves: &[Move], color: Color) -> Option<Move> {
    moves.iter().copied().find(|mv| {
        simulate_move(state, mv, color)
            .is_ok_and(|next| is_checkmate(&next, color.opposite()))
    })
}
