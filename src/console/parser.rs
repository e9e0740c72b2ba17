//! Console command parser

//! One command per line, whitespace separated. Squares use algebraic notation.

use crate::piece::{Color, PieceKind, Position};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ConsoleCommand {
    NewGame,
    SetOption {
        name: String,
        value: Option<String>,
    },
    Board,
    Status,
    Moves(Position),
    Move {
        from: Position,
        to: Position,
        promotion: Option<PieceKind>,
    },
    Confirm,
    Undo,
    Promote {
        square: Position,
        kind: PieceKind,
    },
    Draw {
        offer: bool,
        color: Color,
    },
    Resign(Color),
    Abandon(Color),
    Quit,
    /// Known command with missing or malformed arguments
    Invalid(String),
    Unknown(String),
}

/// Parse a console command from a string (simple tokenizer)
pub fn parse_command(line: &str) -> ConsoleCommand {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ConsoleCommand::Unknown("".to_string());
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let invalid = || ConsoleCommand::Invalid(trimmed.to_string());
    match parts[0] {
        "new" => ConsoleCommand::NewGame,
        "board" => ConsoleCommand::Board,
        "status" => ConsoleCommand::Status,
        "confirm" => ConsoleCommand::Confirm,
        "undo" => ConsoleCommand::Undo,
        "quit" => ConsoleCommand::Quit,
        "setoption" => {
            // expected: setoption name <name> [value <val>]
            let mut name = String::new();
            let mut value: Option<String> = None;
            let mut i = 1usize;
            while i < parts.len() {
                match parts[i] {
                    "name" => {
                        i += 1;
                        let mut vals = Vec::new();
                        while i < parts.len() && parts[i] != "value" {
                            vals.push(parts[i]);
                            i += 1;
                        }
                        name = vals.join(" ");
                    }
                    "value" => {
                        i += 1;
                        value = Some(parts[i..].join(" "));
                        break;
                    }
                    _ => {
                        i += 1;
                    }
                }
            }
            if name.is_empty() {
                return invalid();
            }
            ConsoleCommand::SetOption { name, value }
        }
        "moves" => match parts.get(1).and_then(|s| s.parse().ok()) {
            Some(square) => ConsoleCommand::Moves(square),
            None => invalid(),
        },
        "move" => parts
            .get(1)
            .and_then(|s| parse_coordinate_move(s))
            .unwrap_or_else(invalid),
        "promote" => {
            let square = parts.get(1).and_then(|s| s.parse().ok());
            let kind = parts
                .get(2)
                .and_then(|s| s.chars().next())
                .and_then(PieceKind::from_letter);
            match (square, kind) {
                (Some(square), Some(kind)) => ConsoleCommand::Promote { square, kind },
                _ => invalid(),
            }
        }
        "draw" => {
            let offer = match parts.get(1) {
                Some(&"offer") => true,
                Some(&"retract") => false,
                _ => return invalid(),
            };
            match parts.get(2).and_then(|s| s.parse().ok()) {
                Some(color) => ConsoleCommand::Draw { offer, color },
                None => invalid(),
            }
        }
        "resign" | "abandon" => match parts.get(1).and_then(|s| s.parse::<Color>().ok()) {
            Some(color) if parts[0] == "resign" => ConsoleCommand::Resign(color),
            Some(color) => ConsoleCommand::Abandon(color),
            None => invalid(),
        },
        other => ConsoleCommand::Unknown(other.to_string()),
    }
}

// e2e4, e7e8q
fn parse_coordinate_move(s: &str) -> Option<ConsoleCommand> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) {
        return None;
    }
    let from = s[0..2].parse().ok()?;
    let to = s[2..4].parse().ok()?;
    let promotion = match s[4..].chars().next() {
        Some(c) => Some(PieceKind::from_letter(c).filter(|k| k.is_promotion_target())?),
        None => None,
    };
    Some(ConsoleCommand::Move {
        from,
        to,
        promotion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_moves() {
        assert_eq!(
            parse_command("move e7e8q"),
            ConsoleCommand::Move {
                from: "e7".parse().unwrap(),
                to: "e8".parse().unwrap(),
                promotion: Some(PieceKind::Queen),
            }
        );
        assert_eq!(
            parse_command("move e7e8k"),
            ConsoleCommand::Invalid("move e7e8k".to_string())
        );
        assert_eq!(
            parse_command("move e9"),
            ConsoleCommand::Invalid("move e9".to_string())
        );
    }

    #[test]
    fn parses_setoption_with_spaces() {
        assert_eq!(
            parse_command("setoption name Stalemate value draw"),
            ConsoleCommand::SetOption {
                name: "Stalemate".to_string(),
                value: Some("draw".to_string()),
            }
        );
    }

    #[test]
    fn parses_draw_and_resign() {
        assert_eq!(
            parse_command("draw offer black"),
            ConsoleCommand::Draw {
                offer: true,
                color: Color::Black
            }
        );
        assert_eq!(parse_command("resign white"), ConsoleCommand::Resign(Color::White));
        assert_eq!(parse_command("abandon b"), ConsoleCommand::Abandon(Color::Black));
        assert_eq!(
            parse_command("frobnicate"),
            ConsoleCommand::Unknown("frobnicate".to_string())
        );
    }
}
