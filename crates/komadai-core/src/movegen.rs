use arrayvec::ArrayVec;

use crate::board::Board;
use crate::position::GameState;
use crate::types::{Color, Move, MoveList, Piece, PieceType, Square};

/// Step directions as (rank, file) deltas seen from sente; the last two are
/// the knight jumps.
pub const DIRS: [(i8, i8); 10] = [
    (1, -1),
    (1, 0),
    (1, 1),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (2, -1),
    (2, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    None,
    Step,
    Slide,
}

const N: Probe = Probe::None;
const S: Probe = Probe::Step;
const R: Probe = Probe::Slide;

const GOLD: [Probe; 10] = [S, S, S, S, S, N, S, N, N, N];

/// Reach of each piece kind along each of [`DIRS`], indexed by `PieceType`.
pub const PIECE_PROBES: [[Probe; 10]; 15] = [
    [N, S, N, N, N, N, N, N, N, N], // pawn
    [N, R, N, N, N, N, N, N, N, N], // lance
    [N, N, N, N, N, N, N, N, S, S], // knight
    [S, S, S, N, N, S, N, S, N, N], // silver
    GOLD,
    [R, N, R, N, N, R, N, R, N, N], // bishop
    [N, R, N, R, R, N, R, N, N, N], // rook
    [S, S, S, S, S, S, S, S, N, N], // king
    [S, S, S, S, S, S, S, S, N, N], // jewel
    GOLD,
    GOLD,
    GOLD,
    GOLD,
    [R, S, R, S, S, R, S, R, N, N], // horse
    [S, R, S, R, R, S, R, S, N, N], // dragon
];

/// Whether a board move may or must promote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOption {
    None,
    Optional,
    Forced,
}

pub fn promotion_option(
    kind: PieceType,
    color: Color,
    from: Square,
    to: Square,
) -> PromotionOption {
    if !kind.is_promotable() {
        return PromotionOption::None;
    }
    if !color.in_promotion_zone(from.rank) && !color.in_promotion_zone(to.rank) {
        return PromotionOption::None;
    }
    if must_promote(kind, color, to.rank) {
        PromotionOption::Forced
    } else {
        PromotionOption::Optional
    }
}

/// Pawn and lance on the last rank, knight on the last two.
pub fn must_promote(kind: PieceType, color: Color, rank: u8) -> bool {
    let relative = color.relative_rank(rank);
    match kind {
        PieceType::Pawn | PieceType::Lance => relative >= 8,
        PieceType::Knight => relative >= 7,
        _ => false,
    }
}

/// Pseudo-legal moves for `color`: every board move its pieces can make, with
/// promotion variants expanded, plus a drop of each held kind on every empty
/// square. Self-check and drop restrictions are left to [`crate::rules`].
pub fn generate_moves(state: &GameState, color: Color) -> MoveList {
    let mut moves = MoveList::with_capacity(128);
    append_board_moves(&mut moves, &state.board, color);
    append_drops(&mut moves, state, color);
    moves
}

pub fn generate_board_moves(board: &Board, color: Color) -> MoveList {
    let mut moves = MoveList::with_capacity(96);
    append_board_moves(&mut moves, board, color);
    moves
}

pub fn generate_moves_for_square(board: &Board, from: Square) -> MoveList {
    let mut moves = MoveList::new();
    if let Some(piece) = board.get(from) {
        append_piece_moves(&mut moves, board, from, piece);
    }
    moves
}

/// Squares `piece` standing on `origin` can move to, ignoring promotion and
/// king safety. Rays stop on the first occupied square, which is included
/// only when it holds an enemy piece.
pub fn attacked_squares(board: &Board, origin: Square, piece: Piece) -> ArrayVec<Square, 20> {
    let mut squares = ArrayVec::new();
    let probes = PIECE_PROBES[piece.piece_type as usize];
    for (idx, probe) in probes.into_iter().enumerate() {
        if probe == Probe::None {
            continue;
        }
        let (dr, df) = adjusted_dir(piece.color, DIRS[idx]);
        let mut current = origin;
        while let Some(next) = current.offset(dr, df) {
            match board.get(next) {
                Some(occupant) => {
                    if occupant.color != piece.color {
                        squares.push(next);
                    }
                    break;
                }
                None => squares.push(next),
            }
            if probe == Probe::Step {
                break;
            }
            current = next;
        }
    }
    squares
}

/// Looks outward from `square` for a piece of `by` whose movement reaches it.
pub fn is_square_attacked(board: &Board, square: Square, by: Color) -> bool {
    for (idx, dir) in DIRS.into_iter().enumerate() {
        let (dr, df) = adjusted_dir(by, dir);
        let mut distance = 1u8;
        let mut current = square;
        while let Some(prev) = current.offset(-dr, -df) {
            if let Some(piece) = board.get(prev) {
                if piece.color == by {
                    match PIECE_PROBES[piece.piece_type as usize][idx] {
                        Probe::Slide => return true,
                        Probe::Step if distance == 1 => return true,
                        _ => {}
                    }
                }
                break;
            }
            if idx >= 8 {
                break;
            }
            current = prev;
            distance += 1;
        }
    }
    false
}

pub fn find_king(board: &Board, color: Color) -> Option<Square> {
    board
        .pieces()
        .find(|(_, piece)| piece.color == color && piece.piece_type.is_royal())
        .map(|(square, _)| square)
}

fn append_board_moves(moves: &mut MoveList, board: &Board, color: Color) {
    for (from, piece) in board.pieces() {
        if piece.color == color {
            append_piece_moves(moves, board, from, piece);
        }
    }
}

fn append_piece_moves(moves: &mut MoveList, board: &Board, from: Square, piece: Piece) {
    for to in attacked_squares(board, from, piece) {
        let capture = board.get(to).is_some();
        let base = |promote| Move::Normal {
            from,
            to,
            piece: piece.piece_type,
            capture,
            promote,
        };
        match promotion_option(piece.piece_type, piece.color, from, to) {
            PromotionOption::None => moves.push(base(None)),
            PromotionOption::Optional => {
                moves.push(base(Some(false)));
                moves.push(base(Some(true)));
            }
            PromotionOption::Forced => moves.push(base(Some(true))),
        }
    }
}

fn append_drops(moves: &mut MoveList, state: &GameState, color: Color) {
    let held: ArrayVec<PieceType, 7> = state.hand.held(color).map(|(kind, _)| kind).collect();
    if held.is_empty() {
        return;
    }
    for to in crate::constants::SQUARES {
        if !state.board.is_empty(to) {
            continue;
        }
        for &piece in &held {
            moves.push(Move::Drop { piece, to });
        }
    }
}

const fn adjusted_dir(color: Color, dir: (i8, i8)) -> (i8, i8) {
    match color {
        Color::Sente => dir,
        Color::Gote => (-dir.0, -dir.1),
    }
}
