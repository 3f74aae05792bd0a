use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{BACK_RANK, SQUARES};
use crate::types::{Color, Piece, PieceType, Square};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("square out of bounds")]
    OutOfBounds,
    #[error("invalid board key `{0}`")]
    InvalidKey(String),
    #[error("unknown color `{0}`")]
    UnknownColor(String),
    #[error("unknown piece kind `{0}`")]
    UnknownPiece(String),
    #[error("piece kind `{0}` cannot be held in hand")]
    NotDroppable(String),
}

type CellMap = BTreeMap<String, BTreeMap<String, Option<Piece>>>;
type HandMap = BTreeMap<String, BTreeMap<String, u8>>;

/// 9x9 grid addressed by 1-based rank and file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "CellMap", try_from = "CellMap")]
pub struct Board {
    cells: [[Option<Piece>; 9]; 9],
}

impl Board {
    pub fn new() -> Self {
        let mut board = Self::empty();
        board.setup_starting_position();
        board
    }

    pub const fn empty() -> Self {
        Self {
            cells: [[None; 9]; 9],
        }
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        let (r, f) = square_coords(square)?;
        self.cells[r][f]
    }

    /// Bounds-checked lookup by raw coordinates.
    pub fn at(&self, rank: u8, file: u8) -> Option<Piece> {
        Square::new(rank, file).and_then(|square| self.get(square))
    }

    pub fn put(&mut self, piece: Piece, square: Square) -> Result<Option<Piece>, BoardError> {
        let (r, f) = square_coords(square).ok_or(BoardError::OutOfBounds)?;
        Ok(self.cells[r][f].replace(piece))
    }

    pub fn remove(&mut self, square: Square) -> Result<Option<Piece>, BoardError> {
        let (r, f) = square_coords(square).ok_or(BoardError::OutOfBounds)?;
        Ok(self.cells[r][f].take())
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        SQUARES
            .into_iter()
            .filter_map(|square| self.get(square).map(|piece| (square, piece)))
    }

    fn setup_starting_position(&mut self) {
        for (idx, kind) in BACK_RANK.into_iter().enumerate() {
            self.cells[0][idx] = Some(Piece::new(kind, Color::Sente));
            self.cells[8][idx] = Some(Piece::new(kind, Color::Gote));
            self.cells[2][idx] = Some(Piece::new(PieceType::Pawn, Color::Sente));
            self.cells[6][idx] = Some(Piece::new(PieceType::Pawn, Color::Gote));
        }
        self.cells[1][1] = Some(Piece::new(PieceType::Bishop, Color::Sente));
        self.cells[1][7] = Some(Piece::new(PieceType::Rook, Color::Sente));
        self.cells[7][1] = Some(Piece::new(PieceType::Rook, Color::Gote));
        self.cells[7][7] = Some(Piece::new(PieceType::Bishop, Color::Gote));
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Board> for CellMap {
    fn from(board: Board) -> Self {
        let mut ranks = CellMap::new();
        for rank in 1..=9u8 {
            let files = (1..=9u8)
                .map(|file| (file.to_string(), board.at(rank, file)))
                .collect();
            ranks.insert(rank.to_string(), files);
        }
        ranks
    }
}

impl TryFrom<CellMap> for Board {
    type Error = BoardError;

    fn try_from(ranks: CellMap) -> Result<Self, Self::Error> {
        let mut board = Self::empty();
        for (rank_key, files) in ranks {
            let rank = parse_coordinate(&rank_key)?;
            for (file_key, cell) in files {
                let file = parse_coordinate(&file_key)?;
                if let Some(piece) = cell {
                    board.put(piece, Square::new_unchecked(rank, file))?;
                }
            }
        }
        Ok(board)
    }
}

/// Pieces in hand, per color and droppable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "HandMap", try_from = "HandMap")]
pub struct Hand {
    counts: [[u8; 7]; 2],
}

impl Hand {
    pub const fn empty() -> Self {
        Self { counts: [[0; 7]; 2] }
    }

    pub fn count(&self, color: Color, kind: PieceType) -> u8 {
        kind.hand_index()
            .map(|idx| self.counts[color.index()][idx])
            .unwrap_or(0)
    }

    pub fn set(&mut self, color: Color, kind: PieceType, count: u8) -> Result<(), BoardError> {
        let idx = kind
            .hand_index()
            .ok_or_else(|| BoardError::NotDroppable(kind.name().to_string()))?;
        self.counts[color.index()][idx] = count;
        Ok(())
    }

    /// Adds a captured piece, demoted. Royal pieces are discarded.
    pub fn add(&mut self, color: Color, kind: PieceType) {
        if let Some(idx) = kind.demote().hand_index() {
            let slot = &mut self.counts[color.index()][idx];
            *slot = slot.saturating_add(1);
        }
    }

    /// Takes one piece out of the hand, returning whether one was there.
    pub fn take(&mut self, color: Color, kind: PieceType) -> bool {
        let Some(idx) = kind.hand_index() else {
            return false;
        };
        let slot = &mut self.counts[color.index()][idx];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    pub fn total(&self, color: Color) -> u32 {
        self.counts[color.index()].iter().map(|&n| u32::from(n)).sum()
    }

    /// Held kinds with their counts, weakest first.
    pub fn held(&self, color: Color) -> impl Iterator<Item = (PieceType, u8)> + '_ {
        PieceType::HAND
            .into_iter()
            .map(move |kind| (kind, self.count(color, kind)))
            .filter(|&(_, count)| count > 0)
    }
}

impl From<Hand> for HandMap {
    fn from(hand: Hand) -> Self {
        Color::ALL
            .into_iter()
            .map(|color| {
                let kinds = PieceType::HAND
                    .into_iter()
                    .map(|kind| (kind.name().to_string(), hand.count(color, kind)))
                    .collect();
                (color.name().to_string(), kinds)
            })
            .collect()
    }
}

impl TryFrom<HandMap> for Hand {
    type Error = BoardError;

    fn try_from(map: HandMap) -> Result<Self, Self::Error> {
        let mut hand = Self::empty();
        for (color_key, kinds) in map {
            let color =
                Color::from_name(&color_key).ok_or(BoardError::UnknownColor(color_key))?;
            for (kind_key, count) in kinds {
                let kind =
                    PieceType::from_name(&kind_key).ok_or(BoardError::UnknownPiece(kind_key))?;
                hand.set(color, kind, count)?;
            }
        }
        Ok(hand)
    }
}

pub fn square_index(square: Square) -> Option<usize> {
    let (r, f) = square_coords(square)?;
    Some(r * 9 + f)
}

fn square_coords(square: Square) -> Option<(usize, usize)> {
    if !(1..=9).contains(&square.rank) || !(1..=9).contains(&square.file) {
        return None;
    }
    Some((usize::from(square.rank - 1), usize::from(square.file - 1)))
}

fn parse_coordinate(key: &str) -> Result<u8, BoardError> {
    key.parse::<u8>()
        .ok()
        .filter(|n| (1..=9).contains(n))
        .ok_or_else(|| BoardError::InvalidKey(key.to_string()))
}
