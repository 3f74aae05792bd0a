use thiserror::Error;

use crate::board::{Board, Hand};
use crate::position::GameState;
use crate::types::{Color, Piece, PieceType, Square};

pub use crate::constants::STARTPOS_SFEN;

/// Hand order used when encoding, strongest first.
const HAND_ORDER: [PieceType; 7] = [
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Gold,
    PieceType::Silver,
    PieceType::Knight,
    PieceType::Lance,
    PieceType::Pawn,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSfen {
    pub state: GameState,
    pub move_number: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SfenError {
    #[error("expected 3 or 4 fields, received {0}")]
    FieldCount(usize),
    #[error("expected 9 ranks, received {0}")]
    RankCount(usize),
    #[error("expected 9 squares in rank {rank}, received {squares}")]
    RankWidth { rank: u8, squares: usize },
    #[error("invalid piece `{0}`")]
    InvalidPiece(String),
    #[error("invalid side to move `{0}`")]
    InvalidTurn(String),
    #[error("invalid hand `{0}`")]
    InvalidHand(String),
    #[error("invalid move number `{0}`")]
    InvalidMoveNumber(String),
}

/// Parses `board turn hand [move-number]`.
///
/// SFEN lists ranks from gote's side, so its first row is internal rank 9 and
/// each row runs from internal file 1 to file 9.
pub fn parse_sfen(sfen: &str) -> Result<ParsedSfen, SfenError> {
    let parts: Vec<&str> = sfen.split_whitespace().collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(SfenError::FieldCount(parts.len()));
    }

    let board = parse_board(parts[0])?;
    let mut code = parts[1].chars();
    let turn = match (code.next(), code.next()) {
        (Some(ch), None) => Color::from_code(ch),
        _ => None,
    }
    .ok_or_else(|| SfenError::InvalidTurn(parts[1].to_string()))?;
    let hand = parse_hand(parts[2])?;
    let move_number = match parts.get(3) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| SfenError::InvalidMoveNumber((*raw).to_string()))?,
        None => 1,
    };

    Ok(ParsedSfen {
        state: GameState { board, hand, turn },
        move_number,
    })
}

pub fn encode_sfen(state: &GameState, move_number: u32) -> String {
    let mut placement = String::new();
    for rank in (1..=9u8).rev() {
        let mut empties = 0u32;
        for file in 1..=9u8 {
            match state.board.at(rank, file) {
                Some(piece) => {
                    if empties > 0 {
                        placement.push_str(&empties.to_string());
                        empties = 0;
                    }
                    placement.push_str(&encode_piece(piece));
                }
                None => empties += 1,
            }
        }
        if empties > 0 {
            placement.push_str(&empties.to_string());
        }
        if rank > 1 {
            placement.push('/');
        }
    }

    format!(
        "{} {} {} {}",
        placement,
        state.turn.to_code(),
        encode_hand(&state.hand),
        move_number
    )
}

fn parse_board(field: &str) -> Result<Board, SfenError> {
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 9 {
        return Err(SfenError::RankCount(rows.len()));
    }

    let mut board = Board::empty();
    for (row_idx, row) in rows.iter().enumerate() {
        let rank = 9 - row_idx as u8;
        let mut file = 1usize;
        let mut promoted = false;
        for ch in row.chars() {
            if let Some(n) = ch.to_digit(10) {
                if promoted || n == 0 {
                    return Err(SfenError::InvalidPiece(ch.to_string()));
                }
                file += n as usize;
                continue;
            }
            if ch == '+' {
                if promoted {
                    return Err(SfenError::InvalidPiece("++".to_string()));
                }
                promoted = true;
                continue;
            }
            let piece = decode_piece(ch, promoted)?;
            promoted = false;
            if file > 9 {
                return Err(SfenError::RankWidth {
                    rank,
                    squares: file,
                });
            }
            let _ = board.put(piece, Square::new_unchecked(rank, file as u8));
            file += 1;
        }
        if promoted || file != 10 {
            return Err(SfenError::RankWidth {
                rank,
                squares: file - 1,
            });
        }
    }
    Ok(board)
}

fn parse_hand(field: &str) -> Result<Hand, SfenError> {
    let mut hand = Hand::empty();
    if field == "-" {
        return Ok(hand);
    }

    let mut count: Option<u32> = None;
    for ch in field.chars() {
        if let Some(digit) = ch.to_digit(10) {
            let next = count
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|n| n.checked_add(digit))
                .ok_or_else(|| SfenError::InvalidHand(field.to_string()))?;
            count = Some(next);
            continue;
        }
        let color = if ch.is_ascii_uppercase() {
            Color::Sente
        } else {
            Color::Gote
        };
        let kind = PieceType::from_letter(ch.to_ascii_uppercase())
            .filter(|kind| kind.hand_index().is_some())
            .ok_or_else(|| SfenError::InvalidHand(field.to_string()))?;
        let n = count.take().unwrap_or(1);
        let total = u32::from(hand.count(color, kind))
            .checked_add(n)
            .and_then(|total| u8::try_from(total).ok())
            .ok_or_else(|| SfenError::InvalidHand(field.to_string()))?;
        hand.set(color, kind, total)
            .map_err(|_| SfenError::InvalidHand(field.to_string()))?;
    }
    if count.is_some() {
        return Err(SfenError::InvalidHand(field.to_string()));
    }
    Ok(hand)
}

fn decode_piece(ch: char, promoted: bool) -> Result<Piece, SfenError> {
    let color = if ch.is_ascii_uppercase() {
        Color::Sente
    } else {
        Color::Gote
    };
    let base = PieceType::from_letter(ch.to_ascii_uppercase())
        .ok_or_else(|| SfenError::InvalidPiece(ch.to_string()))?;
    let kind = if promoted {
        if !base.is_promotable() {
            return Err(SfenError::InvalidPiece(format!("+{ch}")));
        }
        base.promote()
    } else {
        base
    };
    Ok(Piece::new(kind, color))
}

fn encode_piece(piece: Piece) -> String {
    let letter = piece.piece_type.letter();
    let letter = match piece.color {
        Color::Sente => letter,
        Color::Gote => letter.to_ascii_lowercase(),
    };
    if piece.piece_type.is_promoted() {
        format!("+{letter}")
    } else {
        letter.to_string()
    }
}

fn encode_hand(hand: &Hand) -> String {
    let mut out = String::new();
    for color in Color::ALL {
        for kind in HAND_ORDER {
            let count = hand.count(color, kind);
            if count == 0 {
                continue;
            }
            if count > 1 {
                out.push_str(&count.to_string());
            }
            out.push(match color {
                Color::Sente => kind.letter(),
                Color::Gote => kind.letter().to_ascii_lowercase(),
            });
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}
