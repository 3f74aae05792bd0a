use std::collections::HashMap;

use komadai_core::{Color, GameState, GameStatus, PositionError, Shogi};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ai::{AiConfig, AiPlayer, Difficulty};
use crate::usi_engine::{BestMove, EngineConfig, EngineError, EngineIo, UsiEngine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub games: u32,
    /// Half-moves after which a game is scored as a draw.
    pub max_plies: u32,
    /// Occurrences of one position that end the game as a draw; 0 disables
    /// the check.
    pub repetition_threshold: u32,
    /// Plies that must be played before a repetition can end the game.
    pub repetition_min_plies: u32,
    pub difficulty: Difficulty,
    pub ai: AiConfig,
    pub engine: EngineConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            games: 2,
            max_plies: 300,
            repetition_threshold: 4,
            repetition_min_plies: 24,
            difficulty: Difficulty::Hard,
            ai: AiConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    AiWin,
    EngineWin,
    Draw,
    /// The engine failed mid-game; the game is not scored.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    NoLegalMoves,
    KingCaptured,
    Resignation,
    MoveLimit,
    Repetition,
    ProtocolFault,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game: u32,
    pub ai_color: Color,
    pub result: GameResult,
    pub termination: Termination,
    pub plies: u32,
    pub moves: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("ai produced an unplayable move: {0}")]
    Ai(#[from] PositionError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub games: u32,
    pub ai_wins: u32,
    pub engine_wins: u32,
    pub draws: u32,
    pub aborted: u32,
    pub average_plies: f64,
}

impl BattleSummary {
    pub fn from_records(records: &[GameRecord]) -> Self {
        let mut summary = Self {
            games: records.len() as u32,
            ..Self::default()
        };
        let mut total_plies = 0u64;
        for record in records {
            match record.result {
                GameResult::AiWin => summary.ai_wins += 1,
                GameResult::EngineWin => summary.engine_wins += 1,
                GameResult::Draw => summary.draws += 1,
                GameResult::Aborted => {
                    summary.aborted += 1;
                    continue;
                }
            }
            total_plies += u64::from(record.plies);
        }
        let scored = summary.scored_games();
        if scored > 0 {
            summary.average_plies = total_plies as f64 / f64::from(scored);
        }
        summary
    }

    pub fn scored_games(&self) -> u32 {
        self.games - self.aborted
    }

    /// Share of scored games the AI won, in `0.0..=1.0`.
    pub fn win_rate(&self) -> f64 {
        let scored = self.scored_games();
        if scored == 0 {
            return 0.0;
        }
        f64::from(self.ai_wins) / f64::from(scored)
    }

    pub fn elo_diff(&self) -> f64 {
        elo_diff(self.ai_wins, self.draws, self.scored_games())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    pub records: Vec<GameRecord>,
    pub summary: BattleSummary,
}

/// Elo difference implied by a score, draws counting half.
pub fn elo_diff(wins: u32, draws: u32, total_games: u32) -> f64 {
    if total_games == 0 {
        return 0.0;
    }
    let win_rate = (f64::from(wins) + f64::from(draws) * 0.5) / f64::from(total_games);
    if win_rate <= 0.0 {
        f64::NEG_INFINITY
    } else if win_rate >= 1.0 {
        f64::INFINITY
    } else {
        -400.0 * (1.0 / win_rate - 1.0).log10()
    }
}

/// Plays `config.games` games, starting a fresh engine through `connect`
/// for each one. The engine takes sente in odd-numbered games.
pub fn run_battle<I, F>(config: &BattleConfig, ai: &mut AiPlayer, mut connect: F) -> BattleReport
where
    I: EngineIo,
    F: FnMut(&EngineConfig) -> Result<UsiEngine<I>, EngineError>,
{
    let mut records = Vec::with_capacity(config.games as usize);
    for game in 1..=config.games {
        let ai_color = if game % 2 == 1 {
            Color::Gote
        } else {
            Color::Sente
        };
        info!(
            game,
            total = config.games,
            ?ai_color,
            difficulty = %config.difficulty,
            "game starting"
        );

        let record = match connect(&config.engine) {
            Ok(mut engine) => play_game(game, &mut engine, ai, ai_color, config),
            Err(err) => aborted(game, ai_color, Vec::new(), &err.into()),
        };
        info!(
            game,
            result = ?record.result,
            termination = ?record.termination,
            plies = record.plies,
            "game finished"
        );
        records.push(record);
    }

    let summary = BattleSummary::from_records(&records);
    BattleReport { records, summary }
}

/// Plays one game from the start position. Engine failures end the game as
/// [`GameResult::Aborted`].
pub fn play_game<I: EngineIo>(
    game_number: u32,
    engine: &mut UsiEngine<I>,
    ai: &mut AiPlayer,
    ai_color: Color,
    config: &BattleConfig,
) -> GameRecord {
    play_game_from(game_number, Shogi::new(), engine, ai, ai_color, config)
}

/// Like [`play_game`], continuing `game` instead of starting afresh. The
/// engine is sent the game's initial SFEN unless it is the start position.
pub fn play_game_from<I: EngineIo>(
    game_number: u32,
    mut game: Shogi,
    engine: &mut UsiEngine<I>,
    ai: &mut AiPlayer,
    ai_color: Color,
    config: &BattleConfig,
) -> GameRecord {
    match drive_game(&mut game, engine, ai, ai_color, config) {
        Ok((result, termination)) => GameRecord {
            game: game_number,
            ai_color,
            result,
            termination,
            plies: game.history().len() as u32,
            moves: game.usi_moves(),
            error: None,
        },
        Err(err) => {
            warn!(game = game_number, error = %err, "game aborted");
            aborted(game_number, ai_color, game.usi_moves(), &err)
        }
    }
}

fn drive_game<I: EngineIo>(
    game: &mut Shogi,
    engine: &mut UsiEngine<I>,
    ai: &mut AiPlayer,
    ai_color: Color,
    config: &BattleConfig,
) -> Result<(GameResult, Termination), ArenaError> {
    let winner_result = |winner: Color| {
        if winner == ai_color {
            GameResult::AiWin
        } else {
            GameResult::EngineWin
        }
    };

    let mut seen: HashMap<GameState, u32> = HashMap::new();
    let mut occurrences = 1;
    seen.insert(game.state().clone(), occurrences);

    loop {
        match game.status() {
            GameStatus::Ongoing => {}
            GameStatus::Checkmate { winner } => {
                return Ok((winner_result(winner), Termination::Checkmate))
            }
            GameStatus::NoLegalMoves { winner } => {
                return Ok((winner_result(winner), Termination::NoLegalMoves))
            }
            GameStatus::KingCaptured { winner } => {
                return Ok((winner_result(winner), Termination::KingCaptured))
            }
        }
        let plies = game.history().len() as u32;
        if config.repetition_threshold > 0
            && plies >= config.repetition_min_plies
            && occurrences >= config.repetition_threshold
        {
            return Ok((GameResult::Draw, Termination::Repetition));
        }
        if plies >= config.max_plies {
            return Ok((GameResult::Draw, Termination::MoveLimit));
        }

        let mover = game.turn();
        if mover == ai_color {
            let Some(mv) = ai.generate_move(game.state(), config.difficulty, ai_color) else {
                return Ok((winner_result(mover.opposite()), Termination::NoLegalMoves));
            };
            game.make_move(&mv)?;
        } else {
            let reply = if game.starts_from_startpos() {
                engine.best_move(&game.usi_moves())?
            } else {
                engine.best_move_after(&game.initial_sfen(), &game.usi_moves())?
            };
            match reply {
                BestMove::Resign => return Ok((winner_result(ai_color), Termination::Resignation)),
                BestMove::Move(token) => play_engine_move(game, &token)?,
            }
        }

        let count = seen.entry(game.state().clone()).or_insert(0);
        *count += 1;
        occurrences = *count;

        if let Some(entry) = game.history().last() {
            debug!(
                ply = game.history().len(),
                color = ?mover,
                usi = %entry.usi,
                occurrences,
                "move played"
            );
        }
    }
}

fn play_engine_move(game: &mut Shogi, token: &str) -> Result<(), EngineError> {
    match game.make_usi_move(token) {
        Ok(_) => Ok(()),
        Err(PositionError::Usi(err)) => Err(EngineError::Usi(err)),
        Err(_) => Err(EngineError::IllegalMove(token.to_string())),
    }
}

fn aborted(game: u32, ai_color: Color, moves: Vec<String>, err: &ArenaError) -> GameRecord {
    GameRecord {
        game,
        ai_color,
        result: GameResult::Aborted,
        termination: Termination::ProtocolFault,
        plies: moves.len() as u32,
        moves,
        error: Some(err.to_string()),
    }
}
