//! Move legality on top of the pseudo-legal generator.
//!
//! The public predicates take the mover's color explicitly and reject any
//! color that is not `state.turn`. The crate-internal `*_for` helpers skip
//! that check so detectors can ask about either side.

use crate::movegen::{
    attacked_squares, find_king, generate_moves, is_square_attacked, promotion_option,
    PromotionOption,
};
use crate::position::{apply_unchecked, GameState};
use crate::types::{Color, Move, MoveList, PieceType, Square};

/// Whether `color` may drop `piece` on (`to_rank`, `to_file`).
///
/// With `skip_mate_check` the drop-pawn-mate rule is not evaluated, leaving
/// only the cheaper occupancy, rank, double-pawn and self-check rules.
pub fn is_legal_drop(
    state: &GameState,
    piece: PieceType,
    to_rank: u8,
    to_file: u8,
    color: Color,
    skip_mate_check: bool,
) -> bool {
    if color != state.turn {
        return false;
    }
    let Some(to) = Square::new(to_rank, to_file) else {
        return false;
    };
    drop_is_legal(state, piece, to, color, skip_mate_check)
}

/// Whether the piece of `color` on the source square can move to the target
/// square under at least one promotion choice.
pub fn is_valid_move(
    state: &GameState,
    from_rank: u8,
    from_file: u8,
    to_rank: u8,
    to_file: u8,
    color: Color,
) -> bool {
    if color != state.turn {
        return false;
    }
    let (Some(from), Some(to)) = (Square::new(from_rank, from_file), Square::new(to_rank, to_file))
    else {
        return false;
    };
    let Some(piece) = state.board.get(from) else {
        return false;
    };
    if piece.color != color || !attacked_squares(&state.board, from, piece).contains(&to) {
        return false;
    }
    let mv = Move::Normal {
        from,
        to,
        piece: piece.piece_type,
        capture: state.board.get(to).is_some(),
        promote: None,
    };
    leaves_king_safe(state, &mv, color)
}

/// Full check of a resolved move, including its promotion flag.
pub fn is_legal_move(state: &GameState, mv: &Move, color: Color) -> bool {
    color == state.turn && move_is_legal_for(state, mv, color)
}

/// Every legal move and drop for `color` in generation order.
pub fn legal_moves(state: &GameState, color: Color) -> MoveList {
    legal_moves_with(state, color, false)
}

/// [`legal_moves`] with optional bypass of the drop-pawn-mate rule.
pub fn legal_moves_with(state: &GameState, color: Color, skip_mate_check: bool) -> MoveList {
    let mut moves = generate_moves(state, color);
    moves.retain(|mv| match *mv {
        Move::Normal { .. } => leaves_king_safe(state, mv, color),
        Move::Drop { piece, to } => drop_is_legal(state, piece, to, color, skip_mate_check),
    });
    moves
}

pub fn has_legal_move(state: &GameState, color: Color) -> bool {
    has_legal_move_with(state, color, false)
}

pub(crate) fn has_legal_move_with(state: &GameState, color: Color, skip_mate_check: bool) -> bool {
    generate_moves(state, color).iter().any(|mv| match *mv {
        Move::Normal { .. } => leaves_king_safe(state, mv, color),
        Move::Drop { piece, to } => drop_is_legal(state, piece, to, color, skip_mate_check),
    })
}

pub(crate) fn move_is_legal_for(state: &GameState, mv: &Move, color: Color) -> bool {
    match *mv {
        Move::Normal {
            from,
            to,
            piece,
            capture,
            promote,
        } => {
            let Some(moving) = state.board.get(from) else {
                return false;
            };
            if moving.color != color || moving.piece_type != piece {
                return false;
            }
            if capture != state.board.get(to).is_some() {
                return false;
            }
            if !attacked_squares(&state.board, from, moving).contains(&to) {
                return false;
            }
            let flag_ok = match promotion_option(piece, color, from, to) {
                PromotionOption::None => promote.is_none(),
                PromotionOption::Optional => promote.is_some(),
                PromotionOption::Forced => promote == Some(true),
            };
            flag_ok && leaves_king_safe(state, mv, color)
        }
        Move::Drop { piece, to } => drop_is_legal(state, piece, to, color, false),
    }
}

fn drop_is_legal(
    state: &GameState,
    piece: PieceType,
    to: Square,
    color: Color,
    skip_mate_check: bool,
) -> bool {
    if piece.hand_index().is_none() || state.hand.count(color, piece) == 0 {
        return false;
    }
    if !state.board.is_empty(to) {
        return false;
    }
    let relative = color.relative_rank(to.rank);
    let rank_ok = match piece {
        PieceType::Pawn | PieceType::Lance => relative < 8,
        PieceType::Knight => relative < 7,
        _ => true,
    };
    if !rank_ok {
        return false;
    }
    if piece == PieceType::Pawn && has_pawn_on_file(state, color, to.file) {
        return false;
    }

    let mut next = state.clone();
    apply_unchecked(&mut next, &Move::Drop { piece, to }, color);
    if king_in_check(&next, color) {
        return false;
    }
    if piece == PieceType::Pawn && !skip_mate_check {
        let opponent = color.opposite();
        if king_in_check(&next, opponent) && !has_legal_move_with(&next, opponent, true) {
            return false;
        }
    }
    true
}

fn has_pawn_on_file(state: &GameState, color: Color, file: u8) -> bool {
    (1..=9).any(|rank| {
        state.board.at(rank, file).is_some_and(|piece| {
            piece.color == color && piece.piece_type == PieceType::Pawn
        })
    })
}

fn leaves_king_safe(state: &GameState, mv: &Move, color: Color) -> bool {
    let mut next = state.clone();
    apply_unchecked(&mut next, mv, color);
    !king_in_check(&next, color)
}

pub(crate) fn king_in_check(state: &GameState, color: Color) -> bool {
    find_king(&state.board, color)
        .is_some_and(|king| is_square_attacked(&state.board, king, color.opposite()))
}
