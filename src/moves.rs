//! The record of a single ply.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::{PieceId, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub u32);

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mov-{}", self.0)
    }
}

/// One ply as exchanged with the session layer. Built by the caller from a
/// destination picked out of the legal-move set (see `Board::prepare_move`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub id: MoveId,
    pub piece_id: PieceId,
    pub origin: Position,
    pub destination: Position,
    #[serde(default)]
    pub captured_piece_id: Option<PieceId>,
    #[serde(default)]
    pub is_castle: bool,
    #[serde(default)]
    pub is_promotion: bool,
    #[serde(default)]
    pub confirmed: bool,
}

impl Move {
    pub fn new(id: MoveId, piece_id: PieceId, origin: Position, destination: Position) -> Self {
        Move {
            id,
            piece_id,
            origin,
            destination,
            captured_piece_id: None,
            is_castle: false,
            is_promotion: false,
            confirmed: false,
        }
    }

    pub fn capturing(mut self, captured: PieceId) -> Self {
        self.captured_piece_id = Some(captured);
        self
    }

    pub fn castle(mut self) -> Self {
        self.is_castle = true;
        self
    }

    /// Rows travelled, used for the two-square pawn advance test.
    pub fn row_distance(&self) -> u8 {
        self.origin.row.abs_diff(self.destination.row)
    }
}

/// Coordinate notation, e.g. `e2e4`.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)
    }
}
