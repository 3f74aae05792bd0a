use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Sente = 0,
    Gote = 1,
}

impl Color {
    pub const ALL: [Self; 2] = [Self::Sente, Self::Gote];

    pub const fn opposite(self) -> Self {
        match self {
            Self::Sente => Self::Gote,
            Self::Gote => Self::Sente,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sente => "sente",
            Self::Gote => "gote",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sente" => Some(Self::Sente),
            "gote" => Some(Self::Gote),
            _ => None,
        }
    }

    /// SFEN side-to-move code.
    pub const fn to_code(self) -> char {
        match self {
            Self::Sente => 'b',
            Self::Gote => 'w',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'b' => Some(Self::Sente),
            'w' => Some(Self::Gote),
            _ => None,
        }
    }

    /// Distance of `rank` from this color's own back rank, 0..=8.
    pub const fn relative_rank(self, rank: u8) -> u8 {
        match self {
            Self::Sente => rank - 1,
            Self::Gote => 9 - rank,
        }
    }

    pub const fn in_promotion_zone(self, rank: u8) -> bool {
        self.relative_rank(rank) >= 6
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceType {
    #[serde(rename = "fu")]
    Pawn = 0,
    #[serde(rename = "kyosha")]
    Lance = 1,
    #[serde(rename = "keima")]
    Knight = 2,
    #[serde(rename = "gin")]
    Silver = 3,
    #[serde(rename = "kin")]
    Gold = 4,
    #[serde(rename = "kaku")]
    Bishop = 5,
    #[serde(rename = "hisha")]
    Rook = 6,
    #[serde(rename = "ou")]
    King = 7,
    #[serde(rename = "gyoku")]
    Jewel = 8,
    #[serde(rename = "tokin")]
    Tokin = 9,
    #[serde(rename = "nkyosha")]
    PromotedLance = 10,
    #[serde(rename = "nkeima")]
    PromotedKnight = 11,
    #[serde(rename = "ngin")]
    PromotedSilver = 12,
    #[serde(rename = "uma")]
    Horse = 13,
    #[serde(rename = "ryu")]
    Dragon = 14,
}

impl PieceType {
    pub const ALL: [Self; 15] = [
        Self::Pawn,
        Self::Lance,
        Self::Knight,
        Self::Silver,
        Self::Gold,
        Self::Bishop,
        Self::Rook,
        Self::King,
        Self::Jewel,
        Self::Tokin,
        Self::PromotedLance,
        Self::PromotedKnight,
        Self::PromotedSilver,
        Self::Horse,
        Self::Dragon,
    ];

    /// Kinds that can be held in hand, in SFEN hand order reversed
    /// (weakest first).
    pub const HAND: [Self; 7] = [
        Self::Pawn,
        Self::Lance,
        Self::Knight,
        Self::Silver,
        Self::Gold,
        Self::Bishop,
        Self::Rook,
    ];

    pub const fn is_royal(self) -> bool {
        matches!(self, Self::King | Self::Jewel)
    }

    pub const fn is_promoted(self) -> bool {
        matches!(
            self,
            Self::Tokin
                | Self::PromotedLance
                | Self::PromotedKnight
                | Self::PromotedSilver
                | Self::Horse
                | Self::Dragon
        )
    }

    pub const fn is_promotable(self) -> bool {
        matches!(
            self,
            Self::Pawn | Self::Lance | Self::Knight | Self::Silver | Self::Bishop | Self::Rook
        )
    }

    pub const fn promote(self) -> Self {
        match self {
            Self::Pawn => Self::Tokin,
            Self::Lance => Self::PromotedLance,
            Self::Knight => Self::PromotedKnight,
            Self::Silver => Self::PromotedSilver,
            Self::Bishop => Self::Horse,
            Self::Rook => Self::Dragon,
            other => other,
        }
    }

    pub const fn demote(self) -> Self {
        match self {
            Self::Tokin => Self::Pawn,
            Self::PromotedLance => Self::Lance,
            Self::PromotedKnight => Self::Knight,
            Self::PromotedSilver => Self::Silver,
            Self::Horse => Self::Bishop,
            Self::Dragon => Self::Rook,
            other => other,
        }
    }

    /// Slot in a hand table, `None` for kinds that never enter a hand.
    pub const fn hand_index(self) -> Option<usize> {
        match self {
            Self::Pawn => Some(0),
            Self::Lance => Some(1),
            Self::Knight => Some(2),
            Self::Silver => Some(3),
            Self::Gold => Some(4),
            Self::Bishop => Some(5),
            Self::Rook => Some(6),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pawn => "fu",
            Self::Lance => "kyosha",
            Self::Knight => "keima",
            Self::Silver => "gin",
            Self::Gold => "kin",
            Self::Bishop => "kaku",
            Self::Rook => "hisha",
            Self::King => "ou",
            Self::Jewel => "gyoku",
            Self::Tokin => "tokin",
            Self::PromotedLance => "nkyosha",
            Self::PromotedKnight => "nkeima",
            Self::PromotedSilver => "ngin",
            Self::Horse => "uma",
            Self::Dragon => "ryu",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Upper-case USI/SFEN letter of the unpromoted form.
    pub const fn letter(self) -> char {
        match self.demote() {
            Self::Pawn => 'P',
            Self::Lance => 'L',
            Self::Knight => 'N',
            Self::Silver => 'S',
            Self::Gold => 'G',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            _ => 'K',
        }
    }

    /// Inverse of [`PieceType::letter`]; `K` maps to the king-minor kind.
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'P' => Some(Self::Pawn),
            'L' => Some(Self::Lance),
            'N' => Some(Self::Knight),
            'S' => Some(Self::Silver),
            'G' => Some(Self::Gold),
            'B' => Some(Self::Bishop),
            'R' => Some(Self::Rook),
            'K' => Some(Self::Jewel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Self { piece_type, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Square {
    pub rank: u8,
    pub file: u8,
}

impl Square {
    pub const fn new(rank: u8, file: u8) -> Option<Self> {
        if rank >= 1 && rank <= 9 && file >= 1 && file <= 9 {
            Some(Self { rank, file })
        } else {
            None
        }
    }

    pub const fn new_unchecked(rank: u8, file: u8) -> Self {
        Self { rank, file }
    }

    pub fn offset(self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = self.rank as i8 + d_rank;
        let file = self.file as i8 + d_file;
        if (1..=9).contains(&rank) && (1..=9).contains(&file) {
            Some(Self::new_unchecked(rank as u8, file as u8))
        } else {
            None
        }
    }
}

/// A fully resolved move.
///
/// `promote` is `None` when the move carried no promotion choice at all,
/// `Some(true)` for a promoting move (forced or chosen) and `Some(false)` when
/// an available promotion was declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Move {
    Normal {
        from: Square,
        to: Square,
        piece: PieceType,
        capture: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promote: Option<bool>,
    },
    Drop {
        piece: PieceType,
        to: Square,
    },
}

impl Move {
    pub const fn to(&self) -> Square {
        match *self {
            Self::Normal { to, .. } | Self::Drop { to, .. } => to,
        }
    }

    pub const fn from(&self) -> Option<Square> {
        match *self {
            Self::Normal { from, .. } => Some(from),
            Self::Drop { .. } => None,
        }
    }

    pub const fn piece(&self) -> PieceType {
        match *self {
            Self::Normal { piece, .. } | Self::Drop { piece, .. } => piece,
        }
    }

    pub const fn is_drop(&self) -> bool {
        matches!(self, Self::Drop { .. })
    }

    pub const fn is_capture(&self) -> bool {
        matches!(self, Self::Normal { capture: true, .. })
    }

    pub const fn is_promotion(&self) -> bool {
        matches!(
            self,
            Self::Normal {
                promote: Some(true),
                ..
            }
        )
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(pub i32);

pub type MoveList = Vec<Move>;
