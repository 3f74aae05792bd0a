use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use komadai_engine::{run_battle, AiPlayer, BattleConfig, Difficulty, UsiEngine};

/// Plays the built-in AI against an external USI engine.
#[derive(Debug, Parser)]
#[command(name = "battle", version)]
struct Args {
    /// JSON file with a battle configuration; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    games: Option<u32>,
    #[arg(long)]
    engine: Option<PathBuf>,
    #[arg(long)]
    skill_level: Option<u8>,
    #[arg(long)]
    movetime: Option<u64>,
    #[arg(long)]
    difficulty: Option<Difficulty>,
    #[arg(long)]
    max_plies: Option<u32>,
    /// Occurrences of one position that draw the game; 0 disables.
    #[arg(long)]
    repetition_threshold: Option<u32>,
    #[arg(long)]
    repetition_min_plies: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Print the full report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(BattleConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => BattleConfig::default(),
        };

        if let Some(games) = self.games {
            config.games = games;
        }
        if let Some(path) = self.engine {
            config.engine.path = path;
        }
        if let Some(level) = self.skill_level {
            config.engine.skill_level = level;
        }
        if let Some(movetime) = self.movetime {
            config.engine.movetime_ms = movetime;
        }
        if let Some(difficulty) = self.difficulty {
            config.difficulty = difficulty;
        }
        if let Some(max_plies) = self.max_plies {
            config.max_plies = max_plies;
        }
        if let Some(threshold) = self.repetition_threshold {
            config.repetition_threshold = threshold;
        }
        if let Some(min_plies) = self.repetition_min_plies {
            config.repetition_min_plies = min_plies;
        }
        if self.seed.is_some() {
            config.ai.seed = self.seed;
        }
        Ok((config, self.json))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, json) = Args::parse().into_config()?;
    tracing::info!(
        games = config.games,
        engine = %config.engine.path.display(),
        skill_level = config.engine.skill_level,
        movetime_ms = config.engine.movetime_ms,
        difficulty = %config.difficulty,
        "battle starting"
    );

    let mut ai = AiPlayer::new(config.ai);
    let report = run_battle(&config, &mut ai, |engine| UsiEngine::start(engine.clone()));
    let summary = &report.summary;

    if json {
        let out = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{out}");
    }

    eprintln!(
        "\nResults over {} games ({} aborted): AI {} / engine {} / draws {}",
        summary.games, summary.aborted, summary.ai_wins, summary.engine_wins, summary.draws
    );
    eprintln!(
        "AI win rate: {:.1}%  avg plies: {:.1}  Elo diff: {:+.1}",
        summary.win_rate() * 100.0,
        summary.average_plies,
        summary.elo_diff()
    );

    if summary.aborted == summary.games && summary.games > 0 {
        anyhow::bail!("every game was aborted; check the engine path and protocol");
    }
    Ok(())
}
