//! Client side of the USI protocol for an external engine process.
//!
//! Every wait for a reply is bounded by a count of lines read rather than a
//! clock. Running out of attempts, like any other failure, shuts the engine
//! down and is reported as an [`EngineError`]; a resignation is an ordinary
//! [`BestMove::Resign`].

use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use komadai_core::UsiError;

pub const DEFAULT_HANDSHAKE_ATTEMPTS: usize = 1_000;
pub const DEFAULT_BESTMOVE_ATTEMPTS: usize = 5_000;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine `{path}`: {source}")]
    Spawn {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("engine i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("engine did not answer `{expected}` within the attempt limit")]
    Timeout { expected: String },
    #[error("engine closed its output")]
    Disconnected,
    #[error("engine sent an unreadable move: {0}")]
    Usi(#[from] UsiError),
    #[error("engine played illegal move `{0}`")]
    IllegalMove(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub skill_level: u8,
    pub movetime_ms: u64,
    pub variant: String,
    pub handshake_attempts: usize,
    pub bestmove_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/usr/games/fairy-stockfish"),
            skill_level: 3,
            movetime_ms: 200,
            variant: "shogi".to_string(),
            handshake_attempts: DEFAULT_HANDSHAKE_ATTEMPTS,
            bestmove_attempts: DEFAULT_BESTMOVE_ATTEMPTS,
        }
    }
}

/// Line transport to an engine.
pub trait EngineIo {
    fn send_line(&mut self, line: &str) -> io::Result<()>;
    /// Next line without its terminator, or `None` once the engine's output
    /// is closed.
    fn read_line(&mut self) -> io::Result<Option<String>>;
    /// Closes both pipes and stops the engine. Must be idempotent.
    fn shutdown(&mut self);
}

/// An engine running as a child process.
#[derive(Debug)]
pub struct ProcessIo {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl ProcessIo {
    pub fn spawn(path: &Path) -> Result<Self, EngineError> {
        let spawn_error = |source| EngineError::Spawn {
            path: path.display().to_string(),
            source,
        };
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_error)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);
        debug!(path = %path.display(), pid = child.id(), "engine process started");
        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }
}

impl EngineIo for ProcessIo {
    fn send_line(&mut self, line: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "engine stdin closed"))?;
        writeln!(stdin, "{line}")?;
        stdin.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut line = String::new();
        if stdout.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn shutdown(&mut self) {
        self.stdin.take();
        self.stdout.take();
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

impl Drop for ProcessIo {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestMove {
    Move(String),
    Resign,
}

/// A handshaken engine ready to be asked for moves.
#[derive(Debug)]
pub struct UsiEngine<I: EngineIo = ProcessIo> {
    io: I,
    config: EngineConfig,
    closed: bool,
}

impl UsiEngine<ProcessIo> {
    /// Spawns the engine at `config.path` and performs the handshake.
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let io = ProcessIo::spawn(&config.path)?;
        Self::with_io(io, config)
    }
}

impl<I: EngineIo> UsiEngine<I> {
    /// Handshakes over an existing transport. The transport is shut down if
    /// the handshake fails.
    pub fn with_io(io: I, config: EngineConfig) -> Result<Self, EngineError> {
        let mut engine = Self {
            io,
            config,
            closed: false,
        };
        if let Err(err) = engine.handshake() {
            warn!(error = %err, "engine handshake failed");
            engine.close();
            return Err(err);
        }
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Asks for a move after `moves` played from the start position.
    pub fn best_move(&mut self, moves: &[String]) -> Result<BestMove, EngineError> {
        let position = if moves.is_empty() {
            "position startpos".to_string()
        } else {
            format!("position startpos moves {}", moves.join(" "))
        };
        self.request_move(&position)
    }

    /// Asks for a move in an arbitrary position.
    pub fn best_move_from_sfen(&mut self, sfen: &str) -> Result<BestMove, EngineError> {
        self.best_move_after(sfen, &[])
    }

    /// Asks for a move after `moves` played from the position `sfen`.
    pub fn best_move_after(
        &mut self,
        sfen: &str,
        moves: &[String],
    ) -> Result<BestMove, EngineError> {
        let position = if moves.is_empty() {
            format!("position sfen {sfen}")
        } else {
            format!("position sfen {sfen} moves {}", moves.join(" "))
        };
        self.request_move(&position)
    }

    /// Sends `quit` and shuts the transport down.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.io.send_line("quit");
        self.io.shutdown();
        debug!("engine closed");
    }

    fn handshake(&mut self) -> Result<(), EngineError> {
        let attempts = self.config.handshake_attempts;
        self.send("usi")?;
        self.wait_for("usiok", attempts)?;
        self.send(&format!(
            "setoption name UCI_Variant value {}",
            self.config.variant
        ))?;
        self.send(&format!(
            "setoption name Skill Level value {}",
            self.config.skill_level
        ))?;
        self.send("isready")?;
        self.wait_for("readyok", attempts)?;
        debug!(
            skill_level = self.config.skill_level,
            variant = %self.config.variant,
            "engine ready"
        );
        Ok(())
    }

    fn request_move(&mut self, position: &str) -> Result<BestMove, EngineError> {
        let result = self.exchange(position);
        if result.is_err() {
            self.close();
        }
        result
    }

    fn exchange(&mut self, position: &str) -> Result<BestMove, EngineError> {
        self.send(position)?;
        self.send(&format!("go movetime {}", self.config.movetime_ms))?;
        let line = self.wait_for("bestmove", self.config.bestmove_attempts)?;
        match line.split_whitespace().nth(1) {
            None | Some("resign") | Some("(none)") => Ok(BestMove::Resign),
            Some(token) => Ok(BestMove::Move(token.to_string())),
        }
    }

    fn send(&mut self, line: &str) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::Disconnected);
        }
        trace!(line, "> engine");
        self.io.send_line(line)?;
        Ok(())
    }

    fn wait_for(&mut self, prefix: &str, attempts: usize) -> Result<String, EngineError> {
        for _ in 0..attempts {
            let Some(line) = self.io.read_line()? else {
                return Err(EngineError::Disconnected);
            };
            trace!(line = %line, "< engine");
            let line = line.trim();
            if line.starts_with(prefix) {
                return Ok(line.to_string());
            }
        }
        warn!(expected = prefix, attempts, "engine reply attempt limit reached");
        Err(EngineError::Timeout {
            expected: prefix.to_string(),
        })
    }
}

impl<I: EngineIo> Drop for UsiEngine<I> {
    fn drop(&mut self) {
        self.close();
    }
}
