//! Piece identity: colors, kinds, type codes and ids.
//!
//! A piece type is written as a two-letter code, kind then color (`"PW"` is a
//! white pawn, `"KB"` the black king). A piece id extends that code with the
//! spawn cell, `"PW_6_0"`, so the color and kind can always be recovered from
//! the id alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::Cell;

/// Errors raised when parsing piece type codes or ids.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PieceIdError {
    /// The kind letter is not one of `K Q R B N P`.
    #[error("unknown piece kind `{0}`")]
    UnknownKind(char),
    /// The color letter is not `W` or `B`.
    #[error("unknown piece color `{0}`")]
    UnknownColor(char),
    /// The text is too short to contain a type code.
    #[error("malformed piece id `{0}`")]
    Malformed(String),
}

// =============================================================================
// Color
// =============================================================================

/// Side a piece belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    /// White, starts on the bottom rows and moves toward row 0.
    White,
    /// Black, starts on the top rows and moves toward the last row.
    Black,
}

impl Color {
    /// Both colors in a fixed order.
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// Single-letter code used in type codes and ids.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }

    /// Parses a color letter.
    ///
    /// # Errors
    ///
    /// Returns [`PieceIdError::UnknownColor`] for any other letter.
    pub fn from_code(code: char) -> Result<Self, PieceIdError> {
        match code {
            'W' => Ok(Color::White),
            'B' => Ok(Color::Black),
            other => Err(PieceIdError::UnknownColor(other)),
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a forward pawn step.
    #[must_use]
    pub const fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// =============================================================================
// Piece Kind
// =============================================================================

/// Chess piece kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// King.
    King,
    /// Queen.
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight. Jumps, so its paths are never blocked.
    Knight,
    /// Pawn. Subject to the double-step and promotion rules.
    Pawn,
}

impl PieceKind {
    /// All kinds in code order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    /// Single-letter code.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
        }
    }

    /// Parses a kind letter.
    ///
    /// # Errors
    ///
    /// Returns [`PieceIdError::UnknownKind`] for any other letter.
    pub fn from_code(code: char) -> Result<Self, PieceIdError> {
        match code {
            'K' => Ok(PieceKind::King),
            'Q' => Ok(PieceKind::Queen),
            'R' => Ok(PieceKind::Rook),
            'B' => Ok(PieceKind::Bishop),
            'N' => Ok(PieceKind::Knight),
            'P' => Ok(PieceKind::Pawn),
            other => Err(PieceIdError::UnknownKind(other)),
        }
    }

    /// Material value credited to the capturing side.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King => 100,
        }
    }

    /// Returns true for pieces that jump over others.
    #[must_use]
    pub const fn jumps(self) -> bool {
        matches!(self, PieceKind::Knight)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Pawn => "pawn",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Piece Type
// =============================================================================

/// A kind/color pair, written as its two-letter code (`"PW"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceType {
    /// Kind of piece.
    pub kind: PieceKind,
    /// Owning side.
    pub color: Color,
}

impl PieceType {
    /// Creates a piece type.
    #[must_use]
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Every kind/color combination, white first.
    pub fn all() -> impl Iterator<Item = PieceType> {
        Color::ALL
            .into_iter()
            .flat_map(|color| PieceKind::ALL.into_iter().map(move |kind| Self::new(kind, color)))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.code(), self.color.code())
    }
}

impl FromStr for PieceType {
    type Err = PieceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(kind), Some(color), None) => Ok(Self::new(
                PieceKind::from_code(kind)?,
                Color::from_code(color)?,
            )),
            _ => Err(PieceIdError::Malformed(s.to_owned())),
        }
    }
}

// =============================================================================
// Piece Id
// =============================================================================

/// Unique identifier for a piece, e.g. `"PW_6_0"`.
///
/// The first two characters always form a valid [`PieceType`] code, so
/// [`PieceId::color`] and [`PieceId::kind`] are infallible. Ordering is by
/// the raw string, which gives the arena its deterministic iteration order.
///
/// # Example
///
/// ```
/// use kungfu_core::board::Cell;
/// use kungfu_core::piece::{Color, PieceId, PieceKind, PieceType};
///
/// let id = PieceId::for_spawn(PieceType::new(PieceKind::Pawn, Color::White), Cell::new(6, 0));
/// assert_eq!(id.as_str(), "PW_6_0");
/// assert_eq!(id.color(), Color::White);
///
/// let parsed = PieceId::parse("QB_0_3").unwrap();
/// assert_eq!(parsed.kind(), PieceKind::Queen);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceId {
    raw: String,
    piece_type: PieceType,
}

impl PieceId {
    /// Builds the conventional id for a piece spawned at `cell`.
    #[must_use]
    pub fn for_spawn(piece_type: PieceType, cell: Cell) -> Self {
        Self {
            raw: format!("{piece_type}_{}_{}", cell.row, cell.col),
            piece_type,
        }
    }

    /// Parses and validates an id.
    ///
    /// # Errors
    ///
    /// Returns an error if the first two characters are not a type code.
    pub fn parse(raw: &str) -> Result<Self, PieceIdError> {
        let piece_type = raw.get(..2).ok_or_else(|| PieceIdError::Malformed(raw.to_owned()))?;
        Ok(Self {
            piece_type: piece_type.parse()?,
            raw: raw.to_owned(),
        })
    }

    /// Returns the same id re-prefixed for another kind (`PW_6_0` → `QW_6_0`).
    #[must_use]
    pub fn with_kind(&self, kind: PieceKind) -> Self {
        let piece_type = PieceType::new(kind, self.piece_type.color);
        Self {
            raw: format!("{piece_type}{}", &self.raw[2..]),
            piece_type,
        }
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Kind/color code embedded in the id.
    #[must_use]
    pub const fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    /// Owning side.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.piece_type.color
    }

    /// Piece kind.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.piece_type.kind
    }
}

impl fmt::Debug for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PieceId({})", self.raw)
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PieceId {
    type Error = PieceIdError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<PieceId> for String {
    fn from(id: PieceId) -> Self {
        id.raw
    }
}

impl FromStr for PieceId {
    type Err = PieceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
