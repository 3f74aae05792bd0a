//! One-ply move scoring for the medium player.

use komadai_core::{
    movegen::is_square_attacked,
    position::{simulate_move, GameState},
    types::{Color, Move, PieceType},
};

const KING_CAPTURE_PENALTY: i32 = 5_000;
const PROMOTION_BONUS: i32 = 120;
const CENTER_BONUS: i32 = 40;

/// Lighter material scale than [`crate::classical`]; only relative order
/// matters here.
pub fn heuristic_value(kind: PieceType) -> i32 {
    match kind {
        PieceType::Pawn => 100,
        PieceType::Lance => 150,
        PieceType::Knight => 200,
        PieceType::Silver => 250,
        PieceType::Gold => 300,
        PieceType::Bishop => 450,
        PieceType::Rook => 500,
        PieceType::King | PieceType::Jewel => 1_000,
        PieceType::Tokin => 150,
        PieceType::PromotedLance => 160,
        PieceType::PromotedKnight => 210,
        PieceType::PromotedSilver => 260,
        PieceType::Horse => 500,
        PieceType::Dragon => 600,
    }
}

/// Scores `mv` for `color` without searching replies:
///
/// * twice the value of a captured piece,
/// * a bonus for promoting and for landing within two squares of the centre,
/// * a penalty for capturing with the king,
/// * minus the moved piece's value when the destination is attacked afterwards.
pub fn quick_evaluate_move(state: &GameState, mv: &Move, color: Color) -> i32 {
    let mut score = 0;
    let to = mv.to();

    if mv.piece().is_royal() && mv.is_capture() {
        score -= KING_CAPTURE_PENALTY;
    }

    if let Some(target) = state.board.get(to) {
        if target.color != color {
            score += heuristic_value(target.piece_type) * 2;
        }
    }

    if mv.is_promotion() {
        score += PROMOTION_BONUS;
    }

    if (i32::from(to.file) - 5).abs() <= 2 && (i32::from(to.rank) - 5).abs() <= 2 {
        score += CENTER_BONUS;
    }

    if let Ok(next) = simulate_move(state, mv, color) {
        if is_square_attacked(&next.board, to, color.opposite()) {
            score -= heuristic_value(mv.piece());
        }
    }

    score
}

/// Every move paired with its [`quick_evaluate_move`] score, best first.
/// Equal scores keep their input order.
pub fn rank_moves(state: &GameState, moves: &[Move], color: Color) -> Vec<(Move, i32)> {
    let mut ranked: Vec<(Move, i32)> = moves
        .iter()
        .map(|mv| (*mv, quick_evaluate_move(state, mv, color)))
        .collect();
    ranked.sort_by_key(|(_, score)| -score);
    ranked
}
