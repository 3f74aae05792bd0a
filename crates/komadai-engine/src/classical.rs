use komadai_core::{
    board::Board,
    eval::Evaluator,
    game::is_in_check,
    movegen::find_king,
    position::GameState,
    types::{Color, PieceType, Score, Square},
};

/// Material values, indexed by `PieceType`. Both royal kinds share a value.
const PIECE_VALUES: [i32; 15] = [
    100,    // fu
    350,    // kyosha
    400,    // keima
    500,    // gin
    600,    // kin
    900,    // kaku
    1_000,  // hisha
    10_000, // ou
    10_000, // gyoku
    600,    // tokin
    550,    // nkyosha
    600,    // nkeima
    700,    // ngin
    1_100,  // uma
    1_200,  // ryu
];

/// Held pieces count for four fifths of their board value.
const HAND_NUMERATOR: i32 = 4;
const HAND_DENOMINATOR: i32 = 5;

const CHECK_PENALTY: i32 = 2_000;

const KING_HOME_BONUS: i32 = 1_000;
const KING_SECOND_RANK_PENALTY: i32 = 500;
const KING_ADVANCE_PENALTY: i32 = 1_000;

const CENTER_WEIGHT: i32 = 10;
const ADVANCE_WEIGHT: i32 = 15;
const MAJOR_PIECE_BONUS: i32 = 100;

const GOLD_SILVER_GUARD: i32 = 300;
const OTHER_GUARD: i32 = 80;
const ADJACENT_MAJOR_THREAT: i32 = 5_000;
const THIN_DEFENCE_PENALTY: i32 = 500;
const ESCAPE_SQUARE_BONUS: i32 = 30;
const MISSING_KING_PENALTY: i32 = 50_000;

const NEIGHBOURS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Material, placement, check and king-shelter terms, scored from sente's
/// side.
#[derive(Debug, Clone, Copy)]
pub struct ClassicalEval;

impl ClassicalEval {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClassicalEval {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for ClassicalEval {
    fn evaluate(&self, state: &GameState) -> Score {
        let mut sente_score: i32 = 0;
        let mut gote_score: i32 = 0;

        for (square, piece) in state.board.pieces() {
            let value = piece_value(piece.piece_type)
                + position_bonus(piece.piece_type, piece.color, square);
            match piece.color {
                Color::Sente => sente_score += value,
                Color::Gote => gote_score += value,
            }
        }

        for color in Color::ALL {
            let held: i32 = state
                .hand
                .held(color)
                .map(|(kind, count)| piece_value(kind) * i32::from(count))
                .sum();
            let held = held * HAND_NUMERATOR / HAND_DENOMINATOR;
            match color {
                Color::Sente => sente_score += held,
                Color::Gote => gote_score += held,
            }
        }

        if is_in_check(state, Color::Sente) {
            sente_score -= CHECK_PENALTY;
        }
        if is_in_check(state, Color::Gote) {
            gote_score -= CHECK_PENALTY;
        }

        sente_score += king_safety(&state.board, Color::Sente);
        gote_score += king_safety(&state.board, Color::Gote);

        Score(sente_score - gote_score)
    }
}

#[inline]
pub fn piece_value(kind: PieceType) -> i32 {
    PIECE_VALUES[kind as usize]
}

fn position_bonus(kind: PieceType, color: Color, square: Square) -> i32 {
    let advance = i32::from(color.relative_rank(square.rank));

    if kind.is_royal() {
        return match advance {
            0 => KING_HOME_BONUS,
            1 => -KING_SECOND_RANK_PENALTY,
            _ => -advance * KING_ADVANCE_PENALTY,
        };
    }

    let center_distance = (i32::from(square.file) - 5).abs();
    let mut bonus = (4 - center_distance) * CENTER_WEIGHT + advance * ADVANCE_WEIGHT;
    if matches!(
        kind,
        PieceType::Rook | PieceType::Bishop | PieceType::Dragon | PieceType::Horse
    ) {
        bonus += MAJOR_PIECE_BONUS;
    }
    bonus
}

fn king_safety(board: &Board, color: Color) -> i32 {
    let Some(king) = find_king(board, color) else {
        return -MISSING_KING_PENALTY;
    };

    let mut safety = 0;
    let mut defenders = 0;
    let mut escapes = 0;

    for (dr, df) in NEIGHBOURS {
        let Some(square) = king.offset(dr, df) else {
            continue;
        };
        match board.get(square) {
            Some(piece) if piece.color == color => {
                defenders += 1;
                safety += match piece.piece_type {
                    PieceType::Gold | PieceType::Silver => GOLD_SILVER_GUARD,
                    _ => OTHER_GUARD,
                };
            }
            Some(piece) => {
                escapes += 1;
                if matches!(piece.piece_type, PieceType::Dragon | PieceType::Horse) {
                    safety -= ADJACENT_MAJOR_THREAT;
                }
            }
            None => escapes += 1,
        }
    }

    if defenders < 2 {
        safety -= THIN_DEFENCE_PENALTY;
    }
    safety + escapes * ESCAPE_SQUARE_BONUS
}
