//! Piece identity, colours and board coordinates.
//!
//! Coordinates are `(row, column)` with row 0 being Black's back rank and row 7
//! White's, column 0 being the a-file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shakmaty::{File, Rank, Square};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn advance.
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn back_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_row(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row a pawn of this colour promotes on.
    pub fn promotion_row(self) -> u8 {
        self.opposite().back_row()
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

impl FromStr for Color {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(EngineError::InvalidNotation(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceKind {
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
    ];

    pub fn is_promotion_target(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }

    /// Lowercase letter used in move notation (`q`, `r`, `b`, `n`, ...).
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Rook => 'r',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'r' => Some(PieceKind::Rook),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub column: u8,
}

impl Position {
    pub fn new(row: u8, column: u8) -> Result<Self> {
        let pos = Position { row, column };
        pos.validate()?;
        Ok(pos)
    }

    pub fn is_valid(&self) -> bool {
        self.row < 8 && self.column < 8
    }

    /// Fails with `InvalidPosition` for coordinates outside the board. Positions
    /// received over the wire are not checked on deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(EngineError::InvalidPosition {
                row: self.row,
                column: self.column,
            })
        }
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i8 + dr;
        let column = self.column as i8 + dc;
        if (0..8).contains(&row) && (0..8).contains(&column) {
            Some(Position {
                row: row as u8,
                column: column as u8,
            })
        } else {
            None
        }
    }

    pub(crate) fn index(self) -> usize {
        self.row as usize * 8 + self.column as usize
    }

    pub(crate) fn from_index(idx: usize) -> Position {
        Position {
            row: (idx / 8) as u8,
            column: (idx % 8) as u8,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "({}, {})", self.row, self.column);
        }
        let file = File::new(u32::from(self.column));
        let rank = Rank::new(7 - u32::from(self.row));
        write!(f, "{}{}", file.char(), rank.char())
    }
}

impl FromStr for Position {
    type Err = EngineError;

    /// Parses algebraic notation, e.g. `"e4"` -> row 4, column 4.
    fn from_str(s: &str) -> Result<Self> {
        let square: Square = s
            .trim()
            .parse()
            .map_err(|_| EngineError::InvalidNotation(s.to_string()))?;
        let column = square.file().char() as u8 - b'a';
        let rank = square.rank().char() as u8 - b'1';
        Position::new(7 - rank, column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: PieceId,
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub color: Color,
    pub position: Position,
    #[serde(default)]
    pub captured: bool,
    /// Castling eligibility. Only kings and rooks consult it.
    #[serde(default)]
    pub never_moved: bool,
}

impl Piece {
    /// A live piece. It counts as never moved when it stands on its colour's
    /// back row.
    pub fn new(id: PieceId, kind: PieceKind, color: Color, position: Position) -> Self {
        Piece {
            id,
            kind,
            color,
            position,
            captured: false,
            never_moved: position.row == color.back_row(),
        }
    }

    pub fn with_never_moved(mut self, never_moved: bool) -> Self {
        self.never_moved = never_moved;
        self
    }

    pub fn is_live(&self) -> bool {
        !self.captured
    }

    /// Relocates the piece; it permanently loses its never-moved status.
    pub(crate) fn relocate(&mut self, to: Position) {
        self.position = to;
        self.never_moved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algebraic_notation_maps_rank_8_to_row_0() {
        let e4: Position = "e4".parse().unwrap();
        assert_eq!(e4, Position { row: 4, column: 4 });
        let a8: Position = "a8".parse().unwrap();
        assert_eq!(a8, Position { row: 0, column: 0 });
        assert_eq!(Position::new(7, 7).unwrap().to_string(), "h1");
        assert!("z9".parse::<Position>().is_err());
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        assert_eq!(
            Position::new(8, 0),
            Err(EngineError::InvalidPosition { row: 8, column: 0 })
        );
        assert_eq!(Position::new(3, 3).unwrap().offset(-4, 0), None);
        assert_eq!(
            Position::new(3, 3).unwrap().offset(1, -2),
            Some(Position { row: 4, column: 1 })
        );
    }

    #[test]
    fn never_moved_follows_home_row() {
        let home = Piece::new(PieceId(1), PieceKind::Rook, Color::White, "a1".parse().unwrap());
        assert!(home.never_moved);
        let away = Piece::new(PieceId(2), PieceKind::Rook, Color::White, "a8".parse().unwrap());
        assert!(!away.never_moved);
        let black = Piece::new(PieceId(3), PieceKind::King, Color::Black, "e8".parse().unwrap());
        assert!(black.never_moved);
    }

    #[test]
    fn relocation_clears_never_moved_for_good() {
        let mut rook = Piece::new(PieceId(1), PieceKind::Rook, Color::White, "h1".parse().unwrap());
        rook.relocate("h4".parse().unwrap());
        rook.relocate("h1".parse().unwrap());
        assert!(!rook.never_moved);
    }
}
