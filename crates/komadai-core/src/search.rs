use crate::position::GameState;
use crate::types::{Move, Score};

/// A-priori bounds on a search. There is no way to stop a search in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub nodes: Option<u64>,
    pub time_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub nodes_searched: u64,
}

pub trait Searcher {
    /// Searches for the side to move in `state`.
    fn search(&mut self, state: &GameState, limits: SearchLimits) -> SearchResult;
}
