mod common;

use common::{connect, FakeEngine};
use komadai_core::{Color, Shogi};
use komadai_engine::{
    play_game, play_game_from, run_battle, AiConfig, AiPlayer, BattleConfig, Difficulty,
    EngineError, GameRecord, GameResult, Termination,
};

/// Both kings can only step back and forth between two squares.
const SHUFFLE: &str = "4k4/9/9/9/9/9/3n5/8r/K8 b - 1";

fn battle_config(games: u32, max_plies: u32) -> BattleConfig {
    BattleConfig {
        games,
        max_plies,
        difficulty: Difficulty::Easy,
        ai: AiConfig {
            seed: Some(11),
            ..AiConfig::default()
        },
        ..BattleConfig::default()
    }
}

#[test]
fn colours_alternate_and_resignations_score_for_the_ai() {
    let config = battle_config(2, 300);
    let mut ai = AiPlayer::new(config.ai);

    let report = run_battle(&config, &mut ai, |engine| {
        connect(FakeEngine::scripted(&["bestmove resign"]), engine)
    });

    let [first, second] = report.records.as_slice() else {
        panic!("expected two records, got {}", report.records.len());
    };
    assert_eq!(first.ai_color, Color::Gote);
    assert_eq!(first.plies, 0);
    assert_eq!(second.ai_color, Color::Sente);
    assert_eq!(second.plies, 1);
    for record in &report.records {
        assert_eq!(record.result, GameResult::AiWin);
        assert_eq!(record.termination, Termination::Resignation);
    }
    assert_eq!(report.summary.ai_wins, 2);
    assert_eq!(report.summary.win_rate(), 1.0);
    assert_eq!(report.summary.elo_diff(), f64::INFINITY);
}

#[test]
fn illegal_engine_move_aborts_only_that_game() {
    let config = battle_config(1, 300);
    let mut ai = AiPlayer::new(config.ai);

    let report = run_battle(&config, &mut ai, |engine| {
        connect(FakeEngine::scripted(&["bestmove 7g7e"]), engine)
    });

    let record = &report.records[0];
    assert_eq!(record.result, GameResult::Aborted);
    assert_eq!(record.termination, Termination::ProtocolFault);
    assert!(record.error.as_deref().is_some_and(|e| e.contains("7g7e")));
    assert_eq!(report.summary.aborted, 1);
    assert_eq!(report.summary.scored_games(), 0);
}

#[test]
fn engine_that_fails_to_start_is_recorded() {
    let config = battle_config(2, 300);
    let mut ai = AiPlayer::new(config.ai);
    let mut attempts = 0;

    let report = run_battle(&config, &mut ai, |engine| {
        attempts += 1;
        if attempts == 1 {
            connect(FakeEngine::scripted(&[]).mute(), engine)
        } else {
            connect(FakeEngine::scripted(&["bestmove resign"]), engine)
        }
    });

    assert_eq!(report.records[0].result, GameResult::Aborted);
    assert!(report.records[0].moves.is_empty());
    assert_eq!(report.records[1].result, GameResult::AiWin);
    assert_eq!(report.summary.aborted, 1);
    assert_eq!(report.summary.ai_wins, 1);
}

#[test]
fn engine_disconnect_mid_game_keeps_played_moves() {
    let config = battle_config(1, 300);
    let mut ai = AiPlayer::new(config.ai);
    let mut engine = connect(FakeEngine::scripted(&["bestmove 7g7f"]), &config.engine).unwrap();

    let record = play_game(1, &mut engine, &mut ai, Color::Gote, &config);

    assert_eq!(record.result, GameResult::Aborted);
    assert_eq!(record.moves.len(), 2);
    assert_eq!(record.moves[0], "7g7f");
    assert_eq!(
        record.error.as_deref(),
        Some(EngineError::Disconnected.to_string().as_str())
    );
}

#[test]
fn move_limit_ends_a_game_as_a_draw() {
    let config = battle_config(1, 12);
    let mut ai = AiPlayer::new(config.ai);
    let mut engine = connect(FakeEngine::first_legal(), &config.engine).unwrap();

    let record = play_game(1, &mut engine, &mut ai, Color::Sente, &config);

    assert_ne!(record.result, GameResult::Aborted, "{:?}", record.error);
    assert!(record.plies <= 12);
    if record.result == GameResult::Draw {
        assert_eq!(record.termination, Termination::MoveLimit);
        assert_eq!(record.plies, 12);
    }

    let mut replay = Shogi::new();
    for token in &record.moves {
        replay.make_usi_move(token).expect("recorded moves replay");
    }
}

#[test]
fn medium_ai_finishes_a_game_against_first_legal_engine() {
    let config = BattleConfig {
        difficulty: Difficulty::Medium,
        ..battle_config(1, 300)
    };
    let mut ai = AiPlayer::new(config.ai);
    let mut engine = connect(FakeEngine::first_legal(), &config.engine).unwrap();

    let record = play_game(1, &mut engine, &mut ai, Color::Sente, &config);

    assert_ne!(record.result, GameResult::Aborted, "{:?}", record.error);
    assert_eq!(record.plies as usize, record.moves.len());
}

#[test]
fn report_serializes_to_json() {
    let config = battle_config(1, 300);
    let mut ai = AiPlayer::new(config.ai);

    let report = run_battle(&config, &mut ai, |engine| {
        connect(FakeEngine::scripted(&["bestmove (none)"]), engine)
    });
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["records"][0]["result"], "ai_win");
    assert_eq!(value["records"][0]["ai_color"], "gote");
    assert_eq!(value["summary"]["ai_wins"], 1);
    assert!(value["records"][0].get("error").is_none());
}

fn shuffle_game(config: &BattleConfig) -> (GameRecord, Vec<String>) {
    let mut ai = AiPlayer::new(config.ai);
    let fake = FakeEngine::cycling(&["5a6a", "6a5a"]);
    let transcript = fake.transcript();
    let mut engine = connect(fake, &config.engine).unwrap();
    let game = Shogi::from_sfen(SHUFFLE).unwrap();

    let record = play_game_from(1, game, &mut engine, &mut ai, Color::Sente, config);
    let sent = transcript.borrow().sent.clone();
    (record, sent)
}

#[test]
fn repeated_position_ends_the_game_as_a_draw() {
    let config = battle_config(1, 300);

    let (record, sent) = shuffle_game(&config);

    assert_eq!(record.result, GameResult::Draw, "{:?}", record.error);
    assert_eq!(record.termination, Termination::Repetition);
    assert_eq!(record.plies, 24);
    assert_eq!(record.moves[..4], ["9i8i", "5a6a", "8i9i", "6a5a"]);
    assert!(sent.contains(&format!("position sfen {SHUFFLE} moves 9i8i")));
}

#[test]
fn repetition_waits_for_the_minimum_ply_count() {
    let config = BattleConfig {
        repetition_min_plies: 100,
        ..battle_config(1, 300)
    };

    let (record, _) = shuffle_game(&config);

    assert_eq!(record.termination, Termination::Repetition);
    assert_eq!(record.plies, 100);
}

#[test]
fn zero_threshold_disables_repetition_draws() {
    let config = BattleConfig {
        repetition_threshold: 0,
        ..battle_config(1, 40)
    };

    let (record, _) = shuffle_game(&config);

    assert_eq!(record.result, GameResult::Draw);
    assert_eq!(record.termination, Termination::MoveLimit);
    assert_eq!(record.plies, 40);
}
