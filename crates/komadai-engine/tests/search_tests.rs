use komadai_core::{
    is_checkmate, legal_moves, parse_square, simulate_move, Color, Evaluator, GameState, Move,
    PieceType, Score, SearchLimits, Searcher, Square,
};
use komadai_engine::{AlphaBetaConfig, AlphaBetaSearcher, MATE_SCORE};

/// Scores every position the same, so the root decides between equals.
struct FlatEval;

impl Evaluator for FlatEval {
    fn evaluate(&self, _state: &GameState) -> Score {
        Score(0)
    }
}

fn sq(rank: u8, file: u8) -> Square {
    Square::new_unchecked(rank, file)
}

fn depth(d: u8) -> SearchLimits {
    SearchLimits {
        depth: Some(d),
        ..SearchLimits::default()
    }
}

#[test]
fn search_returns_legal_move() {
    let state = GameState::new();
    let mut searcher = AlphaBetaSearcher::default();

    let result = searcher.search_with_info(&state, depth(2));

    let best_move = result.best_move.expect("search should return move");
    assert!(legal_moves(&state, Color::Sente).contains(&best_move));
    assert_eq!(result.depth, 2);
    assert!(result.nodes > 0);
}

#[test]
fn search_takes_hanging_rook() {
    let state = GameState::from_sfen("4k4/9/9/9/r4R3/9/9/9/4K4 b - 1").unwrap();
    let mut searcher = AlphaBetaSearcher::default();

    let result = searcher.search_with_info(&state, depth(2));

    let best_move = result.best_move.expect("search should find capture");
    assert!(best_move.is_capture());
    assert_eq!(best_move.to(), parse_square("9e").unwrap());
}

#[test]
fn search_finds_gold_drop_mate() {
    let state = GameState::from_sfen("4k4/9/4P4/9/9/9/9/9/4K4 b G 1").unwrap();
    let mut searcher = AlphaBetaSearcher::default();

    let result = searcher.search_with_info(&state, depth(2));

    let best_move = result.best_move.expect("mate should be found");
    let next = simulate_move(&state, &best_move, Color::Sente).unwrap();
    assert!(is_checkmate(&next, Color::Gote));
    assert!(result.score.0 >= MATE_SCORE - 10);
}

#[test]
fn search_recognizes_checkmated_side() {
    let state = GameState::from_sfen("4k4/4G4/4P4/9/9/9/9/9/4K4 w - 2").unwrap();
    let mut searcher = AlphaBetaSearcher::default();

    let result = searcher.search_with_info(&state, depth(3));

    assert!(result.best_move.is_none());
    assert!(result.score.0 <= -29_000);
}

#[test]
fn search_plays_for_gote() {
    let state = GameState::from_sfen("4k4/9/9/9/3r4R/9/9/9/4K4 w - 1").unwrap();
    let mut searcher = AlphaBetaSearcher::new(AlphaBetaConfig { max_depth: 2 });

    let result = searcher.search_with_info(&state, SearchLimits::default());

    let best_move = result.best_move.expect("gote has moves");
    assert!(legal_moves(&state, Color::Gote).contains(&best_move));
    assert!(best_move.is_capture());
}

#[test]
fn node_limit_stops_deep_search_with_a_move() {
    let state = GameState::new();
    let mut searcher = AlphaBetaSearcher::default();

    let result = searcher.search_with_info(
        &state,
        SearchLimits {
            depth: Some(6),
            nodes: Some(2_000),
            ..SearchLimits::default()
        },
    );

    assert!(result.best_move.is_some());
    assert!(result.depth < 6);
    assert!(result.nodes < 2_000 + 1_024);
}

#[test]
fn searcher_trait_returns_result() {
    let state = GameState::new();
    let mut searcher = AlphaBetaSearcher::default();

    let result = Searcher::search(&mut searcher, &state, depth(1));

    assert!(result.best_move.is_some());
    assert!(result.nodes_searched > 0);
}

#[test]
fn search_promotes_when_promotion_scores_higher() {
    let state = GameState::from_sfen("8k/9/9/4S4/9/9/9/9/K8 b - 1").unwrap();
    let mut searcher = AlphaBetaSearcher::default();

    let result = searcher.search_with_info(&state, depth(1));

    assert_eq!(
        result.best_move,
        Some(Move::Normal {
            from: sq(6, 5),
            to: sq(7, 5),
            piece: PieceType::Silver,
            capture: false,
            promote: Some(true),
        })
    );
}

#[test]
fn search_keeps_declined_promotion_on_equal_scores() {
    let state = GameState::from_sfen("K7k/9/4S4/9/9/9/9/9/9 b - 1").unwrap();
    let legal = legal_moves(&state, Color::Sente);
    let mut searcher =
        AlphaBetaSearcher::with_eval(AlphaBetaConfig { max_depth: 1 }, Box::new(FlatEval));

    let result = searcher.search_with_info(&state, depth(1));

    let best_move = result.best_move.expect("sente has moves");
    assert_eq!(best_move, legal[0]);
    let Move::Normal {
        from,
        to,
        piece,
        capture,
        promote,
    } = best_move
    else {
        panic!("expected a board move, got {best_move:?}");
    };
    assert_eq!(promote, Some(false));
    let promoted_twin = Move::Normal {
        from,
        to,
        piece,
        capture,
        promote: Some(true),
    };
    assert!(legal.contains(&promoted_twin));
    assert_eq!(result.score, Score(0));
}
