#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use komadai_core::{format_move, Shogi};
use komadai_engine::{EngineConfig, EngineError, EngineIo, UsiEngine};

#[derive(Debug, Default)]
pub struct Transcript {
    pub sent: Vec<String>,
    pub shutdowns: usize,
}

impl Transcript {
    pub fn last_sent(&self) -> Option<&str> {
        self.sent.last().map(String::as_str)
    }
}

#[derive(Debug)]
pub enum Replies {
    /// Each `go` consumes the next line; once empty the engine goes quiet.
    Scripted(VecDeque<String>),
    /// Replies with the first legal move after the last `position` command.
    FirstLegal,
    /// Plays the listed moves in a loop.
    Cycle { moves: Vec<String>, next: usize },
}

/// In-memory USI engine driven by the commands it receives.
#[derive(Debug)]
pub struct FakeEngine {
    replies: Replies,
    pending: VecDeque<String>,
    start: Option<String>,
    position: Vec<String>,
    answer_usi: bool,
    chatter: bool,
    log: Rc<RefCell<Transcript>>,
}

impl FakeEngine {
    pub fn scripted(lines: &[&str]) -> Self {
        Self::new(Replies::Scripted(
            lines.iter().map(|line| line.to_string()).collect(),
        ))
    }

    pub fn first_legal() -> Self {
        Self::new(Replies::FirstLegal)
    }

    pub fn cycling(moves: &[&str]) -> Self {
        Self::new(Replies::Cycle {
            moves: moves.iter().map(|mv| mv.to_string()).collect(),
            next: 0,
        })
    }

    fn new(replies: Replies) -> Self {
        Self {
            replies,
            pending: VecDeque::new(),
            start: None,
            position: Vec::new(),
            answer_usi: true,
            chatter: false,
            log: Rc::default(),
        }
    }

    /// Never sends `usiok`.
    pub fn mute(mut self) -> Self {
        self.answer_usi = false;
        self
    }

    /// Emits `info` lines forever instead of closing when it has nothing
    /// left to say.
    pub fn chatty(mut self) -> Self {
        self.chatter = true;
        self
    }

    pub fn transcript(&self) -> Rc<RefCell<Transcript>> {
        Rc::clone(&self.log)
    }

    fn answer_go(&mut self) {
        match &mut self.replies {
            Replies::Scripted(lines) => {
                if let Some(line) = lines.pop_front() {
                    self.pending.push_back(line);
                }
            }
            Replies::Cycle { moves, next } => {
                let mv = &moves[*next % moves.len()];
                *next += 1;
                self.pending.push_back(format!("bestmove {mv}"));
            }
            Replies::FirstLegal => {
                let mut game = match &self.start {
                    Some(sfen) => Shogi::from_sfen(sfen).expect("arena sent a valid sfen"),
                    None => Shogi::new(),
                };
                for token in &self.position {
                    game.make_usi_move(token).expect("arena sent a legal history");
                }
                let reply = match game.moves().first() {
                    Some(mv) => format!("bestmove {}", format_move(mv)),
                    None => "bestmove resign".to_string(),
                };
                self.pending.push_back("info depth 1 score cp 0".to_string());
                self.pending.push_back(reply);
            }
        }
    }
}

impl EngineIo for FakeEngine {
    fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.log.borrow_mut().sent.push(line.to_string());
        match line.split_whitespace().next() {
            Some("usi") if self.answer_usi => {
                self.pending.push_back("id name fake".to_string());
                self.pending.push_back("usiok".to_string());
            }
            Some("isready") => self.pending.push_back("readyok".to_string()),
            Some("position") => {
                let (setup, moves) = match line.split_once(" moves ") {
                    Some((setup, moves)) => (setup, moves),
                    None => (line, ""),
                };
                self.start = setup
                    .strip_prefix("position sfen ")
                    .map(str::to_string);
                self.position = moves.split_whitespace().map(str::to_string).collect();
            }
            Some("go") => self.answer_go(),
            _ => {}
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Some(line));
        }
        if self.chatter {
            return Ok(Some("info string thinking".to_string()));
        }
        Ok(None)
    }

    fn shutdown(&mut self) {
        self.log.borrow_mut().shutdowns += 1;
    }
}

pub fn connect(
    fake: FakeEngine,
    config: &EngineConfig,
) -> Result<UsiEngine<FakeEngine>, EngineError> {
    UsiEngine::with_io(fake, config.clone())
}
