use crate::types::{PieceType, Square};

pub const STARTPOS_SFEN: &str =
    "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// Every square, rank-major from rank 1 file 1.
pub const SQUARES: [Square; 81] = build_squares();

/// Sente back rank from file 1 to file 9; gote mirrors it.
pub const BACK_RANK: [PieceType; 9] = [
    PieceType::Lance,
    PieceType::Knight,
    PieceType::Silver,
    PieceType::Gold,
    PieceType::Jewel,
    PieceType::Gold,
    PieceType::Silver,
    PieceType::Knight,
    PieceType::Lance,
];

const fn build_squares() -> [Square; 81] {
    let mut squares = [Square::new_unchecked(1, 1); 81];
    let mut idx = 0;
    while idx < 81 {
        squares[idx] = Square::new_unchecked((idx / 9) as u8 + 1, (idx % 9) as u8 + 1);
        idx += 1;
    }
    squares
}
