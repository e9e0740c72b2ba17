//! Console event loop: reads commands, drives the game, writes responses.

use std::io::{self, BufRead, Write};

use tracing::warn;

use super::parser::{parse_command, ConsoleCommand};
use crate::error::Result;
use crate::game::{Game, GameState, Outcome};
use crate::options::GameOptions;
use crate::piece::{Color, PieceKind, Position};

pub struct Console {
    game: Game,
    options: GameOptions,
    running: bool,
}

impl Console {
    pub fn new(options: GameOptions) -> Result<Self> {
        let game = fresh_game(options.clone())?;
        Ok(Self {
            game,
            options,
            running: true,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn handle_command(&mut self, cmd: ConsoleCommand) -> Vec<String> {
        match self.execute(cmd) {
            Ok(res) => res,
            Err(e) => {
                warn!(error = %e, "command failed");
                vec![format!("error {}", e)]
            }
        }
    }

    fn execute(&mut self, cmd: ConsoleCommand) -> Result<Vec<String>> {
        let mut res = Vec::new();
        match cmd {
            ConsoleCommand::NewGame => {
                self.game = fresh_game(self.options.clone())?;
                res.push("ok new game".to_string());
            }
            ConsoleCommand::SetOption { name, value } => {
                // Applies to the running game and to every later one
                self.options.set_option(&name, value.as_deref())?;
                *self.game.options_mut() = self.options.clone();
                res.push(format!("option {} = {}", name, value.unwrap_or_default()));
            }
            ConsoleCommand::Board => {
                res.extend(self.game.board().to_string().lines().map(str::to_string));
                res.push(format!("turn {}", self.game.turn()));
            }
            ConsoleCommand::Status => match serde_json::to_string(&self.game) {
                Ok(json) => res.push(format!("status {}", json)),
                Err(e) => res.push(format!("error {}", e)),
            },
            ConsoleCommand::Moves(square) => {
                let Some(piece) = self.game.board().piece_at(square)? else {
                    res.push(format!("error no piece on {}", square));
                    return Ok(res);
                };
                let targets: Vec<String> = self
                    .game
                    .board()
                    .legal_moves(piece)
                    .iter()
                    .map(Position::to_string)
                    .collect();
                res.push(format!("moves {}: {}", square, targets.join(" ")));
            }
            ConsoleCommand::Move {
                from,
                to,
                promotion,
            } => {
                let Some(piece) = self.game.board().piece_at(from)? else {
                    res.push(format!("error no piece on {}", from));
                    return Ok(res);
                };
                let id = piece.id;
                let applied = self.game.play(id, to)?;
                if applied.is_promotion && self.game.state() == GameState::InProgress {
                    self.game.promote(id, promotion.unwrap_or(PieceKind::Queen))?;
                }
                res.push(format!("ok {}", applied));
                res.extend(self.status_lines());
            }
            ConsoleCommand::Confirm => {
                self.game.confirm_move()?;
                res.push("ok confirmed".to_string());
            }
            ConsoleCommand::Undo => {
                let undone = self.game.undo_last_move()?;
                res.push(format!("undone {}", undone));
                res.extend(self.status_lines());
            }
            ConsoleCommand::Promote { square, kind } => {
                let Some(piece) = self.game.board().piece_at(square)? else {
                    res.push(format!("error no piece on {}", square));
                    return Ok(res);
                };
                let id = piece.id;
                self.game.promote(id, kind)?;
                res.push(format!("ok promoted {} to {}", square, kind));
                res.extend(self.status_lines());
            }
            ConsoleCommand::Draw { offer, color } => {
                if offer {
                    self.game.offer_draw(color)?;
                    res.push(format!("ok {} offers a draw", color));
                } else {
                    self.game.retract_draw(color)?;
                    res.push(format!("ok {} retracts the draw offer", color));
                }
                res.extend(self.status_lines());
            }
            ConsoleCommand::Resign(color) => {
                self.game.resign(color)?;
                res.extend(self.status_lines());
            }
            ConsoleCommand::Abandon(color) => {
                self.game.abandon(color)?;
                res.extend(self.status_lines());
            }
            ConsoleCommand::Quit => {
                self.running = false;
            }
            ConsoleCommand::Invalid(s) => {
                res.push(format!("error malformed command: {}", s));
            }
            ConsoleCommand::Unknown(s) => {
                res.push(format!("error unknown command: {}", s));
            }
        }
        Ok(res)
    }

    fn status_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.game.state() == GameState::Finished {
            let reason = self
                .game
                .end_reason()
                .map(|r| format!(" ({:?})", r))
                .unwrap_or_default();
            match self.game.outcome() {
                Some(Outcome::Winner(color)) => {
                    lines.push(format!("result {} wins{}", color, reason))
                }
                Some(Outcome::Draw) => lines.push(format!("result draw{}", reason)),
                None => {}
            }
        } else if self.game.in_check() {
            lines.push(format!("check {}", self.game.turn()));
        }
        lines
    }
}

fn fresh_game(options: GameOptions) -> Result<Game> {
    let mut game = Game::new(options);
    game.join(Color::White, "white")?;
    game.join(Color::Black, "black")?;
    game.start()?;
    Ok(game)
}

pub fn run_console(options: GameOptions) -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    let mut console =
        Console::new(options).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut buf = String::new();

    while console.is_running() {
        buf.clear();
        let n = reader.read_line(&mut buf)?;
        if n == 0 {
            // EOF reached
            break;
        }
        let line = buf.trim();
        if line.is_empty() {
            continue;
        }

        for r in process_line(line, &mut console) {
            writeln!(writer, "{}", r)?;
        }

        // Flush after each command so a front end sees the reply immediately
        writer.flush()?;
    }

    Ok(())
}

pub fn process_line(line: &str, console: &mut Console) -> Vec<String> {
    let cmd = parse_command(line);
    console.handle_command(cmd)
}
