//! Error types for the rules engine and the game orchestrator.

use thiserror::Error;

use crate::game::GameState;
use crate::piece::{Color, PieceId, PieceKind, Position};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),

    #[error("piece {piece} cannot move: it is {turn}'s turn")]
    NotYourTurn { piece: PieceId, turn: Color },

    #[error("no move to undo")]
    NoMoveToUndo,

    #[error("no move waiting for confirmation")]
    NoPendingMove,

    #[error("piece {piece} cannot be promoted to {kind}")]
    InvalidPromotion { piece: PieceId, kind: PieceKind },

    #[error("position ({row}, {column}) is off the board")]
    InvalidPosition { row: u8, column: u8 },

    #[error("piece {piece} cannot move to {destination}")]
    IllegalMove { piece: PieceId, destination: Position },

    #[error("game is {0:?}, not in progress")]
    NotInProgress(GameState),

    #[error("{0} seat is already taken")]
    SeatTaken(Color),

    #[error("both seats must be filled before the game starts")]
    SeatsNotFilled,

    #[error("square {0} is already occupied")]
    SquareOccupied(Position),

    #[error("piece id {0} is already on the board")]
    DuplicatePiece(PieceId),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value for option {name}: {value}")]
    InvalidOptionValue { name: String, value: String },

    #[error("invalid notation: {0}")]
    InvalidNotation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
