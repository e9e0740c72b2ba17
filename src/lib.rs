pub mod board;
pub mod console;
pub mod error;
pub mod game;
pub mod moves;
pub mod options;
pub mod piece;
pub mod utils;

pub use board::Board;
pub use error::{EngineError, Result};
pub use game::{EndReason, Game, GameResult, GameState, Outcome};
pub use moves::{Move, MoveId};
pub use options::{GameOptions, StalematePolicy};
pub use piece::{Color, Piece, PieceId, PieceKind, Position};
