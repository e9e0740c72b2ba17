//! Match orchestration: lifecycle, turn and ply bookkeeping, result.
//!
//! A `Game` owns one `Board` and sequences engine calls: apply a move, switch
//! the turn, recompute check and checkmate for the side now to move. Each match
//! is its own instance; calls on one instance must not overlap.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::error::{EngineError, Result};
use crate::moves::{Move, MoveId};
use crate::options::{GameOptions, StalematePolicy};
use crate::piece::{Color, PieceId, PieceKind, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Waiting,
    InProgress,
    Finished,
}

/// Result from one seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Winner(Color),
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Checkmate,
    DrawAgreed,
    Resignation,
    Abandonment,
    /// Only with `StalematePolicy::Draw`.
    Stalemate,
}

/// One value per colour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByColor<T> {
    pub white: T,
    pub black: T,
}

impl<T> ByColor<T> {
    pub fn get(&self, color: Color) -> &T {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn get_mut(&mut self, color: Color) -> &mut T {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    board: Board,
    options: GameOptions,
    state: GameState,
    turn: Color,
    ply: u32,
    elapsed_secs: u64,
    outcome: Option<Outcome>,
    end_reason: Option<EndReason>,
    draw_offers: ByColor<bool>,
    seats: ByColor<Option<String>>,
    in_check: bool,
    checkmate: bool,
    next_move_id: u32,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameOptions::default())
    }
}

impl Game {
    /// A waiting game on the standard initial position, White to move.
    pub fn new(options: GameOptions) -> Self {
        Self::from_board(Board::standard(), Color::White, options)
    }

    /// A waiting game on an arbitrary position.
    pub fn from_board(board: Board, turn: Color, options: GameOptions) -> Self {
        let next_move_id = board.moves().len() as u32 + 1;
        let in_check = board.is_in_check(turn);
        Game {
            board,
            options,
            state: GameState::Waiting,
            turn,
            ply: 0,
            elapsed_secs: 0,
            outcome: None,
            end_reason: None,
            draw_offers: ByColor::default(),
            seats: ByColor::default(),
            in_check,
            checkmate: false,
            next_move_id,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut GameOptions {
        &mut self.options
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn draw_offered(&self, color: Color) -> bool {
        *self.draw_offers.get(color)
    }

    pub fn seat(&self, color: Color) -> Option<&str> {
        self.seats.get(color).as_deref()
    }

    pub fn result_for(&self, color: Color) -> Option<GameResult> {
        self.outcome.map(|outcome| match outcome {
            Outcome::Winner(winner) if winner == color => GameResult::Win,
            Outcome::Winner(_) => GameResult::Loss,
            Outcome::Draw => GameResult::Draw,
        })
    }

    // Lifecycle ---------------------------------------------------

    pub fn join(&mut self, color: Color, player: impl Into<String>) -> Result<()> {
        let seat = self.seats.get_mut(color);
        if seat.is_some() {
            return Err(EngineError::SeatTaken(color));
        }
        *seat = Some(player.into());
        Ok(())
    }

    /// Waiting -> InProgress once both seats are filled.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            GameState::InProgress => return Ok(()),
            GameState::Finished => return Err(EngineError::NotInProgress(self.state)),
            GameState::Waiting => {}
        }
        if self.seats.white.is_none() || self.seats.black.is_none() {
            return Err(EngineError::SeatsNotFilled);
        }
        self.state = GameState::InProgress;
        self.refresh_status();
        info!(white = ?self.seats.white, black = ?self.seats.black, "game started");
        Ok(())
    }

    /// Adds to the elapsed time while the game is in progress.
    pub fn tick(&mut self, secs: u64) {
        if self.state == GameState::InProgress {
            self.elapsed_secs += secs;
        }
    }

    fn require_in_progress(&self) -> Result<()> {
        if self.state == GameState::InProgress {
            Ok(())
        } else {
            Err(EngineError::NotInProgress(self.state))
        }
    }

    fn finish(&mut self, outcome: Outcome, reason: EndReason) {
        self.state = GameState::Finished;
        self.outcome = Some(outcome);
        self.end_reason = Some(reason);
        info!(?outcome, ?reason, ply = self.ply, "game finished");
    }

    // Recompute check/mate for the side to move; the other side just moved.
    fn refresh_status(&mut self) {
        let mover = self.turn.opposite();
        self.in_check = self.board.is_in_check(self.turn);
        let stuck = !self.board.has_legal_moves(self.turn);
        self.checkmate = self.in_check && stuck;
        if self.state != GameState::InProgress {
            return;
        }
        if self.checkmate {
            self.finish(Outcome::Winner(mover), EndReason::Checkmate);
        } else if stuck
            && self.options.stalemate == StalematePolicy::Draw
            && !self.awaiting_promotion()
        {
            self.finish(Outcome::Draw, EndReason::Stalemate);
        }
    }

    // A pawn just reached the far row and has not been promoted yet; the
    // stalemate verdict waits for `promote`.
    fn awaiting_promotion(&self) -> bool {
        self.board.last_move().is_some_and(|mv| {
            mv.is_promotion
                && self
                    .board
                    .piece(mv.piece_id)
                    .is_some_and(|p| p.kind == PieceKind::Pawn)
        })
    }

    // Moves -------------------------------------------------------

    /// Builds the move record for `piece_id` to `destination` with the game's
    /// next move id.
    pub fn prepare_move(&mut self, piece_id: PieceId, destination: Position) -> Result<Move> {
        let mv = self
            .board
            .prepare_move(piece_id, destination, MoveId(self.next_move_id))?;
        self.next_move_id += 1;
        Ok(mv)
    }

    pub fn apply_move(&mut self, mv: Move) -> Result<()> {
        self.require_in_progress()?;
        let piece = self
            .board
            .piece(mv.piece_id)
            .filter(|p| p.is_live())
            .ok_or(EngineError::UnknownPiece(mv.piece_id))?;
        if piece.color != self.turn {
            return Err(EngineError::NotYourTurn {
                piece: mv.piece_id,
                turn: self.turn,
            });
        }
        mv.destination.validate()?;
        if self.options.validate_moves {
            let illegal = EngineError::IllegalMove {
                piece: mv.piece_id,
                destination: mv.destination,
            };
            if mv.origin != piece.position
                || !self.board.legal_moves(piece).contains(&mv.destination)
            {
                return Err(illegal);
            }
            // The record must describe the move the board would make
            let expected = self.board.prepare_move(mv.piece_id, mv.destination, mv.id)?;
            if mv.captured_piece_id != expected.captured_piece_id
                || mv.is_castle != expected.is_castle
            {
                return Err(illegal);
            }
        }

        self.board.make_move(mv)?;
        self.turn = self.turn.opposite();
        self.ply += 1;
        self.refresh_status();
        debug!(turn = %self.turn, ply = self.ply, check = self.in_check, "turn passed");
        Ok(())
    }

    /// Prepares and applies a move in one step; returns the applied record.
    pub fn play(&mut self, piece_id: PieceId, destination: Position) -> Result<Move> {
        let mv = self.prepare_move(piece_id, destination)?;
        self.apply_move(mv.clone())?;
        Ok(mv)
    }

    /// Marks the last move as confirmed by its player.
    pub fn confirm_move(&mut self) -> Result<()> {
        match self.board.last_move() {
            Some(mv) if !mv.confirmed => {}
            _ => return Err(EngineError::NoPendingMove),
        }
        self.board.confirm_last_move();
        Ok(())
    }

    /// Reverts the last ply. The checkmate flag is cleared; check is recomputed
    /// for the side to move again. A game ended by checkmate or stalemate is
    /// reopened.
    pub fn undo_last_move(&mut self) -> Result<Move> {
        if self.board.moves().is_empty() {
            return Err(EngineError::NoMoveToUndo);
        }
        match (self.state, self.end_reason) {
            (GameState::InProgress, _) => {}
            (GameState::Finished, Some(EndReason::Checkmate | EndReason::Stalemate)) => {}
            (state, _) => return Err(EngineError::NotInProgress(state)),
        }
        let mv = self.board.undo_last_move()?;
        self.turn = self
            .board
            .piece(mv.piece_id)
            .map_or(self.turn.opposite(), |p| p.color);
        self.ply = self.ply.saturating_sub(1);
        self.in_check = self.board.is_in_check(self.turn);
        self.checkmate = false;
        if self.state == GameState::Finished {
            self.state = GameState::InProgress;
            self.outcome = None;
            self.end_reason = None;
            info!(ply = self.ply, "game reopened by undo");
        }
        Ok(mv)
    }

    /// Promotes a pawn; the new piece may give check or mate.
    pub fn promote(&mut self, piece_id: PieceId, kind: PieceKind) -> Result<()> {
        self.require_in_progress()?;
        self.board.promote(piece_id, kind)?;
        self.refresh_status();
        Ok(())
    }

    // Draws and resignations --------------------------------------

    /// Records `color`'s draw offer. Offers from both sides end the game.
    pub fn offer_draw(&mut self, color: Color) -> Result<()> {
        self.require_in_progress()?;
        *self.draw_offers.get_mut(color) = true;
        if self.draw_offers.white && self.draw_offers.black {
            self.finish(Outcome::Draw, EndReason::DrawAgreed);
        }
        Ok(())
    }

    pub fn retract_draw(&mut self, color: Color) -> Result<()> {
        self.require_in_progress()?;
        *self.draw_offers.get_mut(color) = false;
        Ok(())
    }

    pub fn resign(&mut self, color: Color) -> Result<()> {
        self.require_in_progress()?;
        self.finish(Outcome::Winner(color.opposite()), EndReason::Resignation);
        Ok(())
    }

    pub fn abandon(&mut self, color: Color) -> Result<()> {
        self.require_in_progress()?;
        self.finish(Outcome::Winner(color.opposite()), EndReason::Abandonment);
        Ok(())
    }
}
