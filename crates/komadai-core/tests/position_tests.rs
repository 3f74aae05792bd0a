use komadai_core::position::{simulate_move, GameState, PositionError};
use komadai_core::rules::{is_legal_drop, is_legal_move, legal_moves, legal_moves_with};
use komadai_core::types::{Color, Move, Piece, PieceType, Square};

fn sq(rank: u8, file: u8) -> Square {
    Square::new(rank, file).expect("valid square")
}

fn place(state: &mut GameState, kind: PieceType, color: Color, rank: u8, file: u8) {
    state
        .board
        .put(Piece::new(kind, color), sq(rank, file))
        .expect("square on board");
}

/// Gote king boxed in on 9-1 by its own knight and pawn. A sente pawn on 8-1
/// would be defended by the gold on 7-1.
fn drop_mate_position(with_gold: bool) -> GameState {
    let mut state = GameState::empty(Color::Sente);
    place(&mut state, PieceType::King, Color::Gote, 9, 1);
    place(&mut state, PieceType::Knight, Color::Gote, 9, 2);
    place(&mut state, PieceType::Pawn, Color::Gote, 8, 2);
    place(&mut state, PieceType::King, Color::Sente, 1, 9);
    if with_gold {
        place(&mut state, PieceType::Gold, Color::Sente, 7, 1);
    }
    state
        .hand
        .set(Color::Sente, PieceType::Pawn, 1)
        .expect("pawn is droppable");
    state
}

#[test]
fn pawn_drop_mate_is_illegal() {
    let state = drop_mate_position(true);
    assert!(!is_legal_drop(&state, PieceType::Pawn, 8, 1, Color::Sente, false));
    assert!(is_legal_drop(&state, PieceType::Pawn, 8, 1, Color::Sente, true));

    let pawn_mate = Move::Drop {
        piece: PieceType::Pawn,
        to: sq(8, 1),
    };
    assert!(!legal_moves(&state, Color::Sente).contains(&pawn_mate));
    assert!(legal_moves_with(&state, Color::Sente, true).contains(&pawn_mate));
}

#[test]
fn pawn_drop_check_with_escape_is_legal() {
    let state = drop_mate_position(false);
    assert!(is_legal_drop(&state, PieceType::Pawn, 8, 1, Color::Sente, false));
}

#[test]
fn gold_drop_mate_is_allowed() {
    let mut state = drop_mate_position(true);
    state.hand = Default::default();
    state
        .hand
        .set(Color::Sente, PieceType::Gold, 1)
        .expect("gold is droppable");
    state.board.remove(sq(7, 1)).expect("square on board");
    place(&mut state, PieceType::Lance, Color::Sente, 7, 1);
    assert!(is_legal_drop(&state, PieceType::Gold, 8, 1, Color::Sente, false));
}

#[test]
fn second_unpromoted_pawn_on_a_file_is_illegal() {
    let mut state = GameState::new();
    state
        .hand
        .set(Color::Sente, PieceType::Pawn, 1)
        .expect("pawn is droppable");
    for file in 1..=9 {
        assert!(
            !is_legal_drop(&state, PieceType::Pawn, 5, file, Color::Sente, false),
            "file {file} already holds a sente pawn"
        );
    }

    state.board.remove(sq(3, 4)).expect("square on board");
    assert!(is_legal_drop(&state, PieceType::Pawn, 5, 4, Color::Sente, false));
}

#[test]
fn drop_needs_turn_hand_piece_and_empty_square() {
    let mut state = GameState::new();
    assert!(!is_legal_drop(&state, PieceType::Silver, 5, 5, Color::Sente, false));

    state
        .hand
        .set(Color::Sente, PieceType::Silver, 1)
        .expect("silver is droppable");
    assert!(is_legal_drop(&state, PieceType::Silver, 5, 5, Color::Sente, false));
    assert!(!is_legal_drop(&state, PieceType::Silver, 3, 5, Color::Sente, false));
    assert!(!is_legal_drop(&state, PieceType::Silver, 5, 5, Color::Gote, false));
    assert!(!is_legal_drop(&state, PieceType::King, 5, 5, Color::Sente, false));
}

#[test]
fn pawn_cannot_be_dropped_on_last_rank() {
    let mut state = GameState::empty(Color::Sente);
    place(&mut state, PieceType::King, Color::Sente, 1, 5);
    place(&mut state, PieceType::King, Color::Gote, 9, 9);
    state
        .hand
        .set(Color::Sente, PieceType::Pawn, 1)
        .expect("pawn is droppable");
    state
        .hand
        .set(Color::Sente, PieceType::Knight, 1)
        .expect("knight is droppable");

    assert!(!is_legal_drop(&state, PieceType::Pawn, 9, 3, Color::Sente, false));
    assert!(is_legal_drop(&state, PieceType::Pawn, 8, 3, Color::Sente, false));
    assert!(!is_legal_drop(&state, PieceType::Knight, 8, 3, Color::Sente, false));
    assert!(is_legal_drop(&state, PieceType::Knight, 7, 3, Color::Sente, false));
}

#[test]
fn king_capture_is_discarded_not_held() {
    let mut state = GameState::empty(Color::Gote);
    place(&mut state, PieceType::King, Color::Sente, 5, 5);
    place(&mut state, PieceType::Gold, Color::Gote, 6, 5);

    let capture = Move::Normal {
        from: sq(6, 5),
        to: sq(5, 5),
        piece: PieceType::Gold,
        capture: true,
        promote: None,
    };
    let next = simulate_move(&state, &capture, Color::Gote).expect("capture applies");
    assert_eq!(next.hand.total(Color::Gote), 0);
    assert_eq!(
        next.board.get(sq(5, 5)),
        Some(Piece::new(PieceType::Gold, Color::Gote))
    );
    assert_eq!(next.turn, Color::Sente);
}

#[test]
fn promoted_capture_returns_base_kind() {
    let mut state = GameState::empty(Color::Sente);
    place(&mut state, PieceType::Silver, Color::Sente, 4, 4);
    place(&mut state, PieceType::PromotedKnight, Color::Gote, 5, 4);

    let next = state
        .apply(
            &Move::Normal {
                from: sq(4, 4),
                to: sq(5, 4),
                piece: PieceType::Silver,
                capture: true,
                promote: None,
            },
            Color::Sente,
        )
        .expect("capture applies");
    assert_eq!(next.hand.count(Color::Sente, PieceType::Knight), 1);
    assert_eq!(next.hand.count(Color::Sente, PieceType::PromotedKnight), 0);
}

#[test]
fn structural_errors_are_reported() {
    let state = GameState::new();
    let opponents_pawn = Move::Normal {
        from: sq(7, 5),
        to: sq(6, 5),
        piece: PieceType::Pawn,
        capture: false,
        promote: None,
    };
    assert_eq!(
        simulate_move(&state, &opponents_pawn, Color::Sente),
        Err(PositionError::NotOwnPiece)
    );

    let onto_own_piece = Move::Normal {
        from: sq(1, 1),
        to: sq(3, 1),
        piece: PieceType::Lance,
        capture: false,
        promote: None,
    };
    assert_eq!(
        simulate_move(&state, &onto_own_piece, Color::Sente),
        Err(PositionError::IllegalMove)
    );
}

#[test]
fn declined_promotion_on_optional_move_keeps_piece() {
    let mut state = GameState::empty(Color::Sente);
    place(&mut state, PieceType::King, Color::Sente, 1, 1);
    place(&mut state, PieceType::King, Color::Gote, 9, 9);
    place(&mut state, PieceType::Bishop, Color::Sente, 5, 5);

    let declined = Move::Normal {
        from: sq(5, 5),
        to: sq(7, 7),
        piece: PieceType::Bishop,
        capture: false,
        promote: Some(false),
    };
    let unflagged = Move::Normal {
        from: sq(5, 5),
        to: sq(7, 7),
        piece: PieceType::Bishop,
        capture: false,
        promote: None,
    };
    assert!(is_legal_move(&state, &declined, Color::Sente));
    assert!(!is_legal_move(&state, &unflagged, Color::Sente));

    let next = simulate_move(&state, &declined, Color::Sente).expect("move applies");
    assert_eq!(
        next.board.get(sq(7, 7)),
        Some(Piece::new(PieceType::Bishop, Color::Sente))
    );
}
