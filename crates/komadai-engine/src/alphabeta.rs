use std::time::{Duration, Instant};

use komadai_core::{
    find_king, generate_moves, is_in_check, legal_moves, legal_moves_with, simulate_move, Color,
    Evaluator, GameState, Move, PieceType, Score, SearchLimits, SearchResult, Searcher,
};

use crate::classical::{piece_value, ClassicalEval};

pub const MATE_SCORE: i32 = 30_000;
const DEFAULT_MAX_DEPTH: u8 = 3;
const CHECK_INTERVAL_NODES: u64 = 1_024;
const MAX_PLY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct AlphaBetaConfig {
    pub max_depth: u8,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaBetaResult {
    pub best_move: Option<Move>,
    pub score: Score,
    /// Deepest iteration that finished before a limit was hit.
    pub depth: u8,
    pub nodes: u64,
}

/// Iterative-deepening negamax with a capture-only quiescence tail.
///
/// The root keeps generation order among equally ordered moves and only
/// replaces its best move on a strictly higher score, so an optional
/// promotion (generated after its declining twin) is played only when it
/// evaluates better.
pub struct AlphaBetaSearcher {
    eval: Box<dyn Evaluator>,
    max_depth: u8,
    nodes: u64,
    stop: bool,
    node_limit: Option<u64>,
    time_limit: Option<Duration>,
    started_at: Instant,
    last_completed_depth: u8,
    killers: [[Option<Move>; 2]; MAX_PLY],
    history: [[i32; 81]; 30],
}

impl std::fmt::Debug for AlphaBetaSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBetaSearcher")
            .field("eval", &"<Evaluator>")
            .field("max_depth", &self.max_depth)
            .field("nodes", &self.nodes)
            .field("stop", &self.stop)
            .field("node_limit", &self.node_limit)
            .field("time_limit", &self.time_limit)
            .field("last_completed_depth", &self.last_completed_depth)
            .finish_non_exhaustive()
    }
}

impl AlphaBetaSearcher {
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self::with_eval(config, Box::new(ClassicalEval::new()))
    }

    pub fn with_eval(config: AlphaBetaConfig, eval: Box<dyn Evaluator>) -> Self {
        Self {
            eval,
            max_depth: config.max_depth.max(1),
            nodes: 0,
            stop: false,
            node_limit: None,
            time_limit: None,
            started_at: Instant::now(),
            last_completed_depth: 0,
            killers: [[None; 2]; MAX_PLY],
            history: [[0; 81]; 30],
        }
    }

    /// Searches for the side to move in `state`.
    pub fn search_with_info(&mut self, state: &GameState, limits: SearchLimits) -> AlphaBetaResult {
        self.nodes = 0;
        self.stop = false;
        self.last_completed_depth = 0;
        self.node_limit = limits.nodes;
        self.time_limit = limits.time_ms.map(Duration::from_millis);
        self.started_at = Instant::now();
        self.killers = [[None; 2]; MAX_PLY];
        self.age_history();

        let color = state.turn;
        let mut root_moves = legal_moves(state, color);
        if root_moves.is_empty() {
            return AlphaBetaResult {
                best_move: None,
                score: Score(-MATE_SCORE),
                depth: 0,
                nodes: 0,
            };
        }
        self.order_moves(&mut root_moves, state, 0);

        let max_depth = limits.depth.unwrap_or(self.max_depth).max(1);
        let mut best_move = None;
        let mut best_score = -MATE_SCORE;

        for depth in 1..=max_depth {
            if self.should_stop() {
                break;
            }
            match self.search_root(state, &root_moves, depth) {
                Ok((candidate, score)) => {
                    best_move = candidate;
                    best_score = score;
                    self.last_completed_depth = depth;
                }
                Err(AbortSearch) => break,
            }
        }

        // A limit that cuts the first iteration short still has to yield a move.
        if best_move.is_none() {
            best_move = root_moves.first().copied();
        }

        AlphaBetaResult {
            best_move,
            score: Score(best_score),
            depth: self.last_completed_depth,
            nodes: self.nodes,
        }
    }

    fn search_root(
        &mut self,
        state: &GameState,
        moves: &[Move],
        depth: u8,
    ) -> Result<(Option<Move>, i32), AbortSearch> {
        self.bump_nodes()?;

        let color = state.turn;
        let mut alpha = -MATE_SCORE - 1;
        let beta = MATE_SCORE + 1;
        let mut best_move = None;

        for mv in moves {
            let Ok(next) = simulate_move(state, mv, color) else {
                continue;
            };
            let score = -self.negamax(&next, depth - 1, -beta, -alpha, 1)?;
            if score > alpha {
                alpha = score;
                best_move = Some(*mv);
            }
        }

        Ok((best_move, alpha))
    }

    fn negamax(
        &mut self,
        state: &GameState,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: u8,
    ) -> Result<i32, AbortSearch> {
        self.bump_nodes()?;

        let color = state.turn;
        if find_king(&state.board, color).is_none() {
            return Ok(-MATE_SCORE + i32::from(ply));
        }
        if depth == 0 {
            return self.quiescence(state, alpha, beta, ply);
        }

        // Drop-pawn mate is not examined below the root.
        let mut moves = legal_moves_with(state, color, true);
        if moves.is_empty() {
            return Ok(-MATE_SCORE + i32::from(ply));
        }
        self.order_moves(&mut moves, state, ply);

        let mut best_score = -MATE_SCORE;
        let mut searched_moves = 0usize;
        for mv in moves {
            let Ok(next) = simulate_move(state, &mv, color) else {
                continue;
            };

            let score = if searched_moves == 0 {
                -self.negamax(&next, depth - 1, -beta, -alpha, ply + 1)?
            } else {
                let mut score = -self.negamax(&next, depth - 1, -alpha - 1, -alpha, ply + 1)?;
                if score > alpha && score < beta {
                    score = -self.negamax(&next, depth - 1, -beta, -alpha, ply + 1)?;
                }
                score
            };
            searched_moves += 1;

            best_score = best_score.max(score);
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if !mv.is_capture() {
                    self.store_killer(&mv, ply);
                    self.bump_history(&mv, color, depth);
                }
                break;
            }
        }

        Ok(best_score)
    }

    fn quiescence(
        &mut self,
        state: &GameState,
        mut alpha: i32,
        beta: i32,
        ply: u8,
    ) -> Result<i32, AbortSearch> {
        self.bump_nodes()?;

        let stand_pat = self.evaluate(state);
        if stand_pat >= beta {
            return Ok(beta);
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let color = state.turn;
        let mut captures = generate_moves(state, color);
        captures.retain(Move::is_capture);
        self.order_moves(&mut captures, state, ply);

        for mv in captures {
            let Some(victim) = state.board.get(mv.to()) else {
                continue;
            };
            if victim.piece_type.is_royal() {
                return Ok(MATE_SCORE - i32::from(ply));
            }
            let Ok(next) = simulate_move(state, &mv, color) else {
                continue;
            };
            if is_in_check(&next, color) {
                continue;
            }
            let score = -self.quiescence(&next, -beta, -alpha, ply + 1)?;

            if score >= beta {
                return Ok(beta);
            }
            if score > alpha {
                alpha = score;
            }
        }

        Ok(alpha)
    }

    fn evaluate(&self, state: &GameState) -> i32 {
        let score = self.eval.evaluate(state).0;
        if state.turn == Color::Sente {
            score
        } else {
            -score
        }
    }

    fn order_moves(&self, moves: &mut [Move], state: &GameState, ply: u8) {
        moves.sort_by_key(|mv| -self.move_order_key(mv, state, ply));
    }

    fn move_order_key(&self, mv: &Move, state: &GameState, ply: u8) -> i32 {
        if mv.is_capture() {
            return 500_000 + mvv_lva(mv, state);
        }

        if self.is_killer(mv, ply) {
            return 400_000;
        }

        self.history[history_index(state.turn, mv.piece())][square_idx(mv.to())]
    }

    fn is_killer(&self, mv: &Move, ply: u8) -> bool {
        let ply_idx = usize::from(ply).min(MAX_PLY - 1);
        self.killers[ply_idx].iter().flatten().any(|killer| killer == mv)
    }

    fn store_killer(&mut self, mv: &Move, ply: u8) {
        let ply_idx = usize::from(ply).min(MAX_PLY - 1);
        if self.killers[ply_idx][0] == Some(*mv) {
            return;
        }
        self.killers[ply_idx][1] = self.killers[ply_idx][0];
        self.killers[ply_idx][0] = Some(*mv);
    }

    fn bump_history(&mut self, mv: &Move, color: Color, depth: u8) {
        let piece_idx = history_index(color, mv.piece());
        let to_idx = square_idx(mv.to());
        let bonus = i32::from(depth) * i32::from(depth);
        self.history[piece_idx][to_idx] = self.history[piece_idx][to_idx].saturating_add(bonus);
    }

    fn age_history(&mut self) {
        for piece in &mut self.history {
            for score in piece {
                *score /= 2;
            }
        }
    }

    fn bump_nodes(&mut self) -> Result<(), AbortSearch> {
        self.nodes = self.nodes.saturating_add(1);
        if self.nodes % CHECK_INTERVAL_NODES == 0 && self.should_stop() {
            return Err(AbortSearch);
        }
        Ok(())
    }

    fn should_stop(&mut self) -> bool {
        if self.stop {
            return true;
        }

        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            self.stop = true;
            return true;
        }

        if self
            .time_limit
            .is_some_and(|limit| self.started_at.elapsed() >= limit)
        {
            self.stop = true;
            return true;
        }

        false
    }
}

impl Default for AlphaBetaSearcher {
    fn default() -> Self {
        Self::new(AlphaBetaConfig::default())
    }
}

impl Searcher for AlphaBetaSearcher {
    fn search(&mut self, state: &GameState, limits: SearchLimits) -> SearchResult {
        let result = self.search_with_info(state, limits);
        SearchResult {
            best_move: result.best_move,
            score: result.score,
            nodes_searched: result.nodes,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct AbortSearch;

fn mvv_lva(mv: &Move, state: &GameState) -> i32 {
    let victim = state
        .board
        .get(mv.to())
        .map_or(0, |piece| piece_value(piece.piece_type));
    victim.saturating_mul(16) - piece_value(mv.piece())
}

fn history_index(color: Color, piece: PieceType) -> usize {
    color.index() * 15 + piece as usize
}

fn square_idx(square: komadai_core::Square) -> usize {
    usize::from(square.rank - 1) * 9 + usize::from(square.file - 1)
}
