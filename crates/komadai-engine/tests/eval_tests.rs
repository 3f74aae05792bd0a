use komadai_core::{
    eval::Evaluator,
    position::GameState,
    types::{Color, Piece, PieceType, Square},
};
use komadai_engine::ClassicalEval;

fn eval(state: &GameState) -> i32 {
    ClassicalEval::new().evaluate(state).0
}

fn sq(rank: u8, file: u8) -> Square {
    Square::new_unchecked(rank, file)
}

fn kings_only() -> GameState {
    let mut state = GameState::empty(Color::Sente);
    state
        .board
        .put(Piece::new(PieceType::King, Color::Sente), sq(1, 5))
        .unwrap();
    state
        .board
        .put(Piece::new(PieceType::Jewel, Color::Gote), sq(9, 5))
        .unwrap();
    state
}

#[test]
fn starting_position_is_balanced() {
    assert_eq!(eval(&GameState::new()), 0);
}

#[test]
fn mirrored_kings_are_balanced() {
    assert_eq!(eval(&kings_only()), 0);
}

#[test]
fn hand_pieces_count_four_fifths() {
    let mut state = kings_only();
    state.hand.set(Color::Sente, PieceType::Rook, 1).unwrap();
    assert_eq!(eval(&state), 800);

    state.hand.set(Color::Gote, PieceType::Pawn, 2).unwrap();
    assert_eq!(eval(&state), 800 - 160);
}

#[test]
fn missing_gote_gold_favours_sente() {
    let mut state = GameState::new();
    let removed = state.board.remove(sq(9, 4)).unwrap();
    assert_eq!(removed.map(|piece| piece.piece_type), Some(PieceType::Gold));

    let score = eval(&state);
    assert!(score > 600, "losing a gold guard should cost more than its value, got {score}");
}

#[test]
fn check_is_penalised() {
    let quiet = {
        let mut state = kings_only();
        state
            .board
            .put(Piece::new(PieceType::Rook, Color::Gote), sq(5, 1))
            .unwrap();
        eval(&state)
    };
    let checking = {
        let mut state = kings_only();
        state
            .board
            .put(Piece::new(PieceType::Rook, Color::Gote), sq(1, 1))
            .unwrap();
        eval(&state)
    };
    assert!(
        checking < quiet - 1_500,
        "check should dominate the placement difference: quiet {quiet}, checking {checking}"
    );
}

#[test]
fn promoted_rook_outweighs_rook() {
    let score_with = |kind| {
        let mut state = kings_only();
        state
            .board
            .put(Piece::new(kind, Color::Sente), sq(5, 5))
            .unwrap();
        eval(&state)
    };
    assert!(score_with(PieceType::Dragon) > score_with(PieceType::Rook));
}
