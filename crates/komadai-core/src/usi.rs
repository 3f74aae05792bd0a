//! USI move notation.
//!
//! USI numbers files and ranks from the opposite corner, so both axes map as
//! `internal = 10 - external`. Ranks are written as letters, `a` for external
//! rank 1 through `i` for rank 9.

use thiserror::Error;

use crate::movegen::{promotion_option, PromotionOption};
use crate::position::GameState;
use crate::types::{Move, PieceType, Square};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsiError {
    #[error("malformed move token `{0}`")]
    Malformed(String),
    #[error("invalid square `{0}`")]
    InvalidSquare(String),
    #[error("`{0}` is not a droppable piece letter")]
    InvalidDropPiece(char),
    #[error("no piece on the source square of `{0}`")]
    EmptySource(String),
    #[error("`{0}` requests a promotion that is not available")]
    PromotionUnavailable(String),
    #[error("`{0}` must promote")]
    PromotionRequired(String),
}

pub fn format_square(square: Square) -> String {
    let file = 10 - square.file;
    let rank = char::from(b'a' + (9 - square.rank));
    format!("{file}{rank}")
}

pub fn parse_square(text: &str) -> Result<Square, UsiError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(file), Some(rank), None) => square_from_chars(file, rank)
            .ok_or_else(|| UsiError::InvalidSquare(text.to_string())),
        _ => Err(UsiError::InvalidSquare(text.to_string())),
    }
}

pub fn format_move(mv: &Move) -> String {
    match *mv {
        Move::Normal {
            from, to, promote, ..
        } => {
            let mut token = format_square(from);
            token.push_str(&format_square(to));
            if promote == Some(true) {
                token.push('+');
            }
            token
        }
        Move::Drop { piece, to } => format!("{}*{}", piece.letter(), format_square(to)),
    }
}

/// Decodes `token` against `state`.
///
/// The moving piece and capture flag come from the board. The promotion flag
/// is resolved the way the generator resolves it, so a token without `+` is a
/// declined promotion where one was available and an error where promotion
/// is forced.
pub fn parse_move(token: &str, state: &GameState) -> Result<Move, UsiError> {
    let chars: Vec<char> = token.chars().collect();
    let malformed = || UsiError::Malformed(token.to_string());

    if chars.len() == 4 && chars[1] == '*' {
        let piece = PieceType::from_letter(chars[0])
            .filter(|kind| kind.hand_index().is_some())
            .ok_or(UsiError::InvalidDropPiece(chars[0]))?;
        let to = square_from_chars(chars[2], chars[3]).ok_or_else(malformed)?;
        return Ok(Move::Drop { piece, to });
    }

    let promote_requested = match chars.len() {
        4 => false,
        5 if chars[4] == '+' => true,
        _ => return Err(malformed()),
    };
    let from = square_from_chars(chars[0], chars[1]).ok_or_else(malformed)?;
    let to = square_from_chars(chars[2], chars[3]).ok_or_else(malformed)?;
    let moving = state
        .board
        .get(from)
        .ok_or_else(|| UsiError::EmptySource(token.to_string()))?;

    let promote = match (
        promotion_option(moving.piece_type, moving.color, from, to),
        promote_requested,
    ) {
        (PromotionOption::None, false) => None,
        (PromotionOption::None, true) => {
            return Err(UsiError::PromotionUnavailable(token.to_string()))
        }
        (PromotionOption::Optional, requested) => Some(requested),
        (PromotionOption::Forced, true) => Some(true),
        (PromotionOption::Forced, false) => {
            return Err(UsiError::PromotionRequired(token.to_string()))
        }
    };

    Ok(Move::Normal {
        from,
        to,
        piece: moving.piece_type,
        capture: state.board.get(to).is_some(),
        promote,
    })
}

fn square_from_chars(file: char, rank: char) -> Option<Square> {
    let file = file.to_digit(10)? as u8;
    if !('a'..='i').contains(&rank) {
        return None;
    }
    let rank = rank as u8 - b'a' + 1;
    Square::new(10u8.checked_sub(rank)?, 10u8.checked_sub(file)?)
}
