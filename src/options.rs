//! Game configuration.
//!
//! Options are plain data, settable by name the same way the console's
//! `setoption name <name> value <value>` command does.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// What happens when the side to move has no legal move and is not in check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StalematePolicy {
    /// Report it through `Board::is_stalemate` only; the game stays in progress.
    #[default]
    Continue,
    /// End the game as a draw.
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    pub stalemate: StalematePolicy,

    /// Reject moves whose destination is not in the piece's legal set
    pub validate_moves: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            stalemate: StalematePolicy::Continue,
            validate_moves: true,
        }
    }
}

impl GameOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set option value
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        let invalid = || EngineError::InvalidOptionValue {
            name: name.to_string(),
            value: value.unwrap_or("<empty>").to_string(),
        };
        match name {
            "Stalemate" => {
                self.stalemate = match value.map(str::to_ascii_lowercase).as_deref() {
                    Some("draw") => StalematePolicy::Draw,
                    Some("continue") => StalematePolicy::Continue,
                    _ => return Err(invalid()),
                };
            }
            "ValidateMoves" => {
                self.validate_moves = match value {
                    Some(v) => v.parse::<bool>().map_err(|_| invalid())?,
                    None => return Err(invalid()),
                };
            }
            _ => return Err(EngineError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}
