// Board state: piece list (captured pieces stay as tombstones), move history,
// move generation and king-safety rules.
// Coordinates: row 0 = Black's back rank, row 7 = White's, column 0 = a-file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::moves::{Move, MoveId};
use crate::piece::{Color, Piece, PieceId, PieceKind, Position};
use crate::utils::{Mailbox, Occupant, DIAGONAL, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONAL};

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

// Undo entry per rollback
#[derive(Debug, Clone, PartialEq, Eq)]
struct Undo {
    // index of the move in the history
    ply: usize,
    never_moved: bool,
    rook: Option<RookShift>,
    promoted_from: Option<PieceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RookShift {
    index: usize,
    from: Position,
    to: Position,
    never_moved: bool,
}

#[derive(Debug, Clone, Copy)]
struct EnPassant {
    target: Position,
    victim: PieceId,
    victim_square: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pieces: Vec<Piece>,
    #[serde(default, alias = "historialMovimientos")]
    moves: Vec<Move>,
    // Undo stack per unmake; entries exist only for moves made locally
    #[serde(skip)]
    undo_stack: Vec<Undo>,
}

impl Board {
    // Board vuota, populated through add_piece
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard initial position. Ids 1-8 are the white pawns, 9-16 the
    /// black pawns, then the back ranks column by column, black before white.
    pub fn standard() -> Self {
        let mut pieces = Vec::with_capacity(32);
        let mut next_id = 1;
        let mut place = |kind: PieceKind, color: Color, row: u8, column: u8| {
            pieces.push(Piece::new(
                PieceId(next_id),
                kind,
                color,
                Position { row, column },
            ));
            next_id += 1;
        };
        for column in 0..8 {
            place(PieceKind::Pawn, Color::White, 6, column);
        }
        for column in 0..8 {
            place(PieceKind::Pawn, Color::Black, 1, column);
        }
        for (column, &kind) in BACK_RANK.iter().enumerate() {
            place(kind, Color::Black, 0, column as u8);
            place(kind, Color::White, 7, column as u8);
        }
        Board {
            pieces,
            moves: Vec::new(),
            undo_stack: Vec::new(),
        }
    }

    /// Builds a board from a piece list, enforcing id uniqueness and one live
    /// piece per square.
    pub fn from_pieces<I: IntoIterator<Item = Piece>>(pieces: I) -> Result<Self> {
        let mut board = Board::new();
        for piece in pieces {
            board.add_piece(piece)?;
        }
        Ok(board)
    }

    // Spatial queries ---------------------------------------------

    /// Every piece, captured ones included.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    fn index_of(&self, id: PieceId) -> Result<usize> {
        self.pieces
            .iter()
            .position(|p| p.id == id)
            .ok_or(EngineError::UnknownPiece(id))
    }

    pub fn piece_at(&self, pos: Position) -> Result<Option<&Piece>> {
        pos.validate()?;
        Ok(self
            .pieces
            .iter()
            .find(|p| p.is_live() && p.position == pos))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces
            .iter()
            .filter(move |p| p.is_live() && p.color == color)
    }

    pub fn king(&self, color: Color) -> Option<&Piece> {
        self.pieces_of(color).find(|p| p.kind == PieceKind::King)
    }

    pub fn add_piece(&mut self, piece: Piece) -> Result<()> {
        piece.position.validate()?;
        if self.piece(piece.id).is_some() {
            return Err(EngineError::DuplicatePiece(piece.id));
        }
        if piece.is_live() && self.piece_at(piece.position)?.is_some() {
            return Err(EngineError::SquareOccupied(piece.position));
        }
        self.pieces.push(piece);
        Ok(())
    }

    /// Marks the piece captured. It stays in the list so undo can revive it.
    pub fn remove_piece(&mut self, id: PieceId) -> Result<()> {
        let index = self.index_of(id)?;
        self.pieces[index].captured = true;
        Ok(())
    }

    pub fn record_move(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Captured pieces of `color`, counted by kind.
    pub fn captured_counts(&self, color: Color) -> BTreeMap<PieceKind, u32> {
        let mut counts = BTreeMap::new();
        for piece in self.pieces.iter().filter(|p| p.captured && p.color == color) {
            *counts.entry(piece.kind).or_insert(0) += 1;
        }
        counts
    }

    fn mailbox(&self) -> Mailbox {
        let mut mb = Mailbox::empty();
        for (index, piece) in self.pieces.iter().enumerate() {
            if piece.is_live() && piece.position.is_valid() {
                mb.set(
                    piece.position,
                    Some(Occupant {
                        index,
                        kind: piece.kind,
                        color: piece.color,
                    }),
                );
            }
        }
        mb
    }

    // Legality helpers -------------------------------------------

    pub fn is_attacked(&self, pos: Position, defender: Color) -> Result<bool> {
        pos.validate()?;
        Ok(self.mailbox().is_attacked(pos, defender))
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        let mb = self.mailbox();
        match mb.king(color) {
            Some(king) => mb.is_attacked(king, color),
            None => false,
        }
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_moves(color)
    }

    /// Not in check and nothing to play. Whether that ends the game is the
    /// orchestrator's call (see `StalematePolicy`).
    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_moves(color)
    }

    pub fn has_legal_moves(&self, color: Color) -> bool {
        let mb = self.mailbox();
        self.pieces_of(color)
            .any(|piece| !self.legal_moves_in(&mb, piece).is_empty())
    }

    // Generate moves APIs -----------------------------------------

    /// Legal destinations of `piece`, in generator order.
    pub fn legal_moves(&self, piece: &Piece) -> Vec<Position> {
        self.legal_moves_in(&self.mailbox(), piece)
    }

    pub fn legal_moves_of(&self, id: PieceId) -> Result<Vec<Position>> {
        let piece = self.piece(id).ok_or(EngineError::UnknownPiece(id))?;
        Ok(self.legal_moves(piece))
    }

    /// Every legal `(piece, destination)` pair for `color`.
    pub fn legal_moves_for(&self, color: Color) -> Vec<(PieceId, Position)> {
        let mb = self.mailbox();
        self.pieces_of(color)
            .flat_map(|piece| {
                self.legal_moves_in(&mb, piece)
                    .into_iter()
                    .map(move |dest| (piece.id, dest))
            })
            .collect()
    }

    fn legal_moves_in(&self, mb: &Mailbox, piece: &Piece) -> Vec<Position> {
        // Boards received over the wire are not validated square by square
        if !piece.is_live() || !piece.position.is_valid() {
            return Vec::new();
        }
        let mut candidates = Vec::with_capacity(28);
        self.pseudo_moves(mb, piece, &mut candidates);
        let en_passant = self.en_passant(piece);
        candidates.retain(|&dest| keeps_king_safe(mb, piece, dest, en_passant));
        candidates
    }

    fn pseudo_moves(&self, mb: &Mailbox, piece: &Piece, out: &mut Vec<Position>) {
        match piece.kind {
            PieceKind::Pawn => self.pawn_pseudos(mb, piece, out),
            PieceKind::Rook => slide(mb, piece, &ORTHOGONAL, out),
            PieceKind::Bishop => slide(mb, piece, &DIAGONAL, out),
            PieceKind::Queen => {
                slide(mb, piece, &ORTHOGONAL, out);
                slide(mb, piece, &DIAGONAL, out);
            }
            PieceKind::Knight => step(mb, piece, &KNIGHT_OFFSETS, out),
            PieceKind::King => {
                step(mb, piece, &KING_OFFSETS, out);
                self.castling_pseudos(mb, piece, out);
            }
        }
    }

    fn pawn_pseudos(&self, mb: &Mailbox, pawn: &Piece, out: &mut Vec<Position>) {
        let dir = pawn.color.forward();
        let from = pawn.position;
        // Single and double pushes
        if let Some(one) = from.offset(dir, 0).filter(|&p| mb.is_empty(p)) {
            out.push(one);
            if from.row == pawn.color.pawn_row() {
                if let Some(two) = one.offset(dir, 0).filter(|&p| mb.is_empty(p)) {
                    out.push(two);
                }
            }
        }
        // Captures
        for dc in [-1, 1] {
            if let Some(to) = from.offset(dir, dc) {
                if mb.get(to).is_some_and(|o| o.color != pawn.color) {
                    out.push(to);
                }
            }
        }
        if let Some(ep) = self.en_passant(pawn) {
            out.push(ep.target);
        }
    }

    // Only the immediately preceding ply can enable it: an enemy pawn that
    // just advanced two rows and now stands beside `pawn`.
    fn en_passant(&self, pawn: &Piece) -> Option<EnPassant> {
        if pawn.kind != PieceKind::Pawn {
            return None;
        }
        let last = self.last_move()?;
        if last.row_distance() != 2 {
            return None;
        }
        let moved = self.piece(last.piece_id)?;
        if moved.kind != PieceKind::Pawn || !moved.is_live() || moved.color == pawn.color {
            return None;
        }
        if moved.position.row != pawn.position.row
            || moved.position.column.abs_diff(pawn.position.column) != 1
        {
            return None;
        }
        let dc = moved.position.column as i8 - pawn.position.column as i8;
        let target = pawn.position.offset(pawn.color.forward(), dc)?;
        Some(EnPassant {
            target,
            victim: moved.id,
            victim_square: moved.position,
        })
    }

    fn castling_pseudos(&self, mb: &Mailbox, king: &Piece, out: &mut Vec<Position>) {
        let row = king.color.back_row();
        if !king.never_moved || king.position != (Position { row, column: 4 }) {
            return;
        }
        if mb.is_attacked(king.position, king.color) {
            return;
        }
        // (rook column, king destination): king side, then queen side
        for (rook_column, king_to) in [(7, 6), (0, 2)] {
            if self.can_castle(mb, king, rook_column, king_to) {
                out.push(Position {
                    row,
                    column: king_to,
                });
            }
        }
    }

    fn can_castle(&self, mb: &Mailbox, king: &Piece, rook_column: u8, king_to: u8) -> bool {
        let row = king.position.row;
        let rook = match mb.get(Position {
            row,
            column: rook_column,
        }) {
            Some(o) => &self.pieces[o.index],
            None => return false,
        };
        if rook.kind != PieceKind::Rook || rook.color != king.color || !rook.never_moved {
            return false;
        }
        // Everything between king and rook must be empty; on the queen side that
        // includes the b-file square next to the rook.
        let (lo, hi) = if rook_column > king.position.column {
            (king.position.column, rook_column)
        } else {
            (rook_column, king.position.column)
        };
        if (lo + 1..hi).any(|column| !mb.is_empty(Position { row, column })) {
            return false;
        }
        // No square the king crosses or lands on may be attacked.
        let step: i8 = if king_to > king.position.column { 1 } else { -1 };
        let mut square = king.position;
        while square.column != king_to {
            square = match square.offset(0, step) {
                Some(next) => next,
                None => return false,
            };
            if mb.is_attacked(square, king.color) {
                return false;
            }
        }
        true
    }

    // Move records -----------------------------------------------

    /// Builds the record for moving `piece_id` to `destination`, the way the
    /// client fills it in: capture inferred from occupancy or en passant, castle
    /// from a two-column king move, promotion from a pawn reaching the far row.
    /// Legality is not checked here.
    pub fn prepare_move(
        &self,
        piece_id: PieceId,
        destination: Position,
        id: MoveId,
    ) -> Result<Move> {
        destination.validate()?;
        let piece = self
            .piece(piece_id)
            .filter(|p| p.is_live())
            .ok_or(EngineError::UnknownPiece(piece_id))?;
        let mut mv = Move::new(id, piece_id, piece.position, destination);
        match self.piece_at(destination)? {
            Some(target) if target.color != piece.color => {
                mv.captured_piece_id = Some(target.id);
            }
            Some(_) => {}
            None => {
                if let Some(ep) = self.en_passant(piece).filter(|ep| ep.target == destination) {
                    mv.captured_piece_id = Some(ep.victim);
                }
            }
        }
        mv.is_castle = piece.kind == PieceKind::King
            && piece.position.column.abs_diff(destination.column) == 2;
        mv.is_promotion =
            piece.kind == PieceKind::Pawn && destination.row == piece.color.promotion_row();
        Ok(mv)
    }

    /// Applies `mv`: relocates the piece, tombstones the captured piece, moves
    /// the rook of a castle and appends the move to the history. Turn order and
    /// legality are the caller's concern. Nothing is mutated on error.
    pub fn make_move(&mut self, mv: Move) -> Result<()> {
        mv.origin.validate()?;
        mv.destination.validate()?;
        let index = self.index_of(mv.piece_id)?;
        let captured = mv
            .captured_piece_id
            .map(|id| self.index_of(id))
            .transpose()?;
        let rook = if mv.is_castle {
            Some(self.castling_rook(index, mv.destination)?)
        } else {
            None
        };

        let undo = Undo {
            ply: self.moves.len(),
            never_moved: self.pieces[index].never_moved,
            rook,
            promoted_from: None,
        };
        self.pieces[index].relocate(mv.destination);
        if let Some(c) = captured {
            self.pieces[c].captured = true;
        }
        if let Some(shift) = rook {
            self.pieces[shift.index].relocate(shift.to);
        }
        debug!(piece = %mv.piece_id, mv = %mv, captured = ?mv.captured_piece_id, "move applied");
        self.moves.push(mv);
        self.undo_stack.push(undo);
        Ok(())
    }

    fn castling_rook(&self, king_index: usize, destination: Position) -> Result<RookShift> {
        let king = &self.pieces[king_index];
        let illegal = EngineError::IllegalMove {
            piece: king.id,
            destination,
        };
        let (from_column, to_column) = match destination.column {
            6 => (7, 5),
            2 => (0, 3),
            _ => return Err(illegal),
        };
        let from = Position {
            row: destination.row,
            column: from_column,
        };
        let index = self
            .pieces
            .iter()
            .position(|p| {
                p.is_live()
                    && p.position == from
                    && p.kind == PieceKind::Rook
                    && p.color == king.color
            })
            .ok_or(illegal)?;
        Ok(RookShift {
            index,
            from,
            to: Position {
                row: destination.row,
                column: to_column,
            },
            never_moved: self.pieces[index].never_moved,
        })
    }

    // Rook of a castle received without an undo entry: it must still stand
    // next to the king and had necessarily never moved before.
    fn castled_rook(&self, mv: &Move) -> Option<RookShift> {
        let (home_column, now_column) = match mv.destination.column {
            6 => (7, 5),
            2 => (0, 3),
            _ => return None,
        };
        let row = mv.destination.row;
        let now = Position {
            row,
            column: now_column,
        };
        let index = self
            .pieces
            .iter()
            .position(|p| p.is_live() && p.position == now && p.kind == PieceKind::Rook)?;
        Some(RookShift {
            index,
            from: Position {
                row,
                column: home_column,
            },
            to: now,
            never_moved: true,
        })
    }

    /// Reverts the last move and returns it.
    pub fn undo_last_move(&mut self) -> Result<Move> {
        let mv = self.moves.last().cloned().ok_or(EngineError::NoMoveToUndo)?;
        let index = self.index_of(mv.piece_id)?;
        let captured = mv
            .captured_piece_id
            .map(|id| self.index_of(id))
            .transpose()?;
        let recorded = self
            .undo_stack
            .last()
            .is_some_and(|u| u.ply + 1 == self.moves.len());
        let undo = if recorded { self.undo_stack.pop() } else { None };
        let rook = match &undo {
            Some(u) => u.rook,
            None if mv.is_castle => self.castled_rook(&mv),
            None => None,
        };

        let piece = &mut self.pieces[index];
        piece.position = mv.origin;
        match &undo {
            Some(u) => {
                piece.never_moved = u.never_moved;
                if let Some(kind) = u.promoted_from {
                    piece.kind = kind;
                }
            }
            None if mv.is_castle => piece.never_moved = true,
            None => {}
        }
        if let Some(c) = captured {
            self.pieces[c].captured = false;
        }
        if let Some(shift) = rook {
            let rook = &mut self.pieces[shift.index];
            rook.position = shift.from;
            rook.never_moved = shift.never_moved;
        }
        self.moves.pop();
        debug!(piece = %mv.piece_id, mv = %mv, "move undone");
        Ok(mv)
    }

    /// Turns a live pawn into a rook, knight, bishop or queen in place.
    pub fn promote(&mut self, piece_id: PieceId, kind: PieceKind) -> Result<()> {
        let index = self.index_of(piece_id)?;
        let piece = &self.pieces[index];
        if piece.kind != PieceKind::Pawn || !piece.is_live() || !kind.is_promotion_target() {
            return Err(EngineError::InvalidPromotion {
                piece: piece_id,
                kind,
            });
        }
        // The pawn that just moved gets its kind restored if that move is undone
        if let Some(undo) = self.undo_stack.last_mut() {
            if undo.ply + 1 == self.moves.len() && self.moves[undo.ply].piece_id == piece_id {
                undo.promoted_from = Some(PieceKind::Pawn);
            }
        }
        self.pieces[index].kind = kind;
        debug!(piece = %piece_id, %kind, "pawn promoted");
        Ok(())
    }

    /// Marks the last move as confirmed by its player.
    pub fn confirm_last_move(&mut self) -> Option<&Move> {
        let mv = self.moves.last_mut()?;
        mv.confirmed = true;
        Some(mv)
    }

    /// Leaf count of the legal move tree, `color` to move. Promotions count
    /// once per destination.
    pub fn perft(&mut self, depth: u32, color: Color) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves_for(color);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for (piece, dest) in moves {
            let id = MoveId(self.moves.len() as u32);
            let Ok(mv) = self.prepare_move(piece, dest, id) else {
                continue;
            };
            if self.make_move(mv).is_err() {
                continue;
            }
            nodes += self.perft(depth - 1, color.opposite());
            let undone = self.undo_last_move();
            debug_assert!(undone.is_ok(), "perft unmake failed: {:?}", undone);
        }
        nodes
    }
}

// Ray pieces: extend until the edge, stop before an own piece, stop on an enemy.
fn slide(mb: &Mailbox, piece: &Piece, directions: &[(i8, i8)], out: &mut Vec<Position>) {
    for &(dr, dc) in directions {
        let mut current = piece.position;
        while let Some(next) = current.offset(dr, dc) {
            match mb.get(next) {
                None => out.push(next),
                Some(o) => {
                    if o.color != piece.color {
                        out.push(next);
                    }
                    break;
                }
            }
            current = next;
        }
    }
}

fn step(mb: &Mailbox, piece: &Piece, offsets: &[(i8, i8)], out: &mut Vec<Position>) {
    for &(dr, dc) in offsets {
        if let Some(to) = piece.position.offset(dr, dc) {
            if mb.get(to).map_or(true, |o| o.color != piece.color) {
                out.push(to);
            }
        }
    }
}

// Plays the candidate on a copy of the snapshot and asks whether the mover's
// king is attacked there. The board is not mutated.
fn keeps_king_safe(
    mb: &Mailbox,
    piece: &Piece,
    dest: Position,
    en_passant: Option<EnPassant>,
) -> bool {
    let mut next = *mb;
    if let Some(ep) = en_passant.filter(|ep| ep.target == dest && mb.is_empty(dest)) {
        next.set(ep.victim_square, None);
    }
    let index = mb.get(piece.position).map_or(usize::MAX, |o| o.index);
    next.set(piece.position, None);
    next.set(
        dest,
        Some(Occupant {
            index,
            kind: piece.kind,
            color: piece.color,
        }),
    );
    match next.king(piece.color) {
        Some(king) => !next.is_attacked(king, piece.color),
        None => true,
    }
}

// Simple display, rank 8 on top
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mb = self.mailbox();
        for row in 0..8u8 {
            write!(f, "{} ", 8 - row)?;
            for column in 0..8u8 {
                match mb.get(Position { row, column }) {
                    Some(o) => {
                        let ch = o.kind.letter();
                        let ch = match o.color {
                            Color::White => ch.to_ascii_uppercase(),
                            Color::Black => ch,
                        };
                        write!(f, "{} ", ch)?;
                    }
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}
