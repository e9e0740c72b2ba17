// Direction tables and the square-indexed occupancy snapshot used by move
// generation and attack detection.

use crate::piece::{Color, PieceKind, Position};

// (row, column) deltas
pub const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// What a rules query needs to know about a live piece on a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    /// Index into the board's piece list.
    pub index: usize,
    pub kind: PieceKind,
    pub color: Color,
}

/// Immutable-by-convention snapshot of the live pieces, one slot per square.
///
/// It is `Copy`, so a candidate move is tested by copying the snapshot and
/// moving pieces on the copy; the board itself is never touched.
#[derive(Debug, Clone, Copy)]
pub struct Mailbox {
    squares: [Option<Occupant>; 64],
}

impl Mailbox {
    pub fn empty() -> Self {
        Mailbox { squares: [None; 64] }
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<Occupant> {
        self.squares[pos.index()]
    }

    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos).is_none()
    }

    pub fn set(&mut self, pos: Position, occupant: Option<Occupant>) {
        self.squares[pos.index()] = occupant;
    }

    pub fn occupants(&self) -> impl Iterator<Item = (Position, Occupant)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.map(|o| (Position::from_index(idx), o)))
    }

    pub fn king(&self, color: Color) -> Option<Position> {
        self.occupants()
            .find(|(_, o)| o.kind == PieceKind::King && o.color == color)
            .map(|(pos, _)| pos)
    }

    /// True when any live piece of the side opposing `defender` has `target`
    /// in its attack set.
    pub fn is_attacked(&self, target: Position, defender: Color) -> bool {
        let attacker = defender.opposite();
        self.occupants()
            .filter(|(_, o)| o.color == attacker)
            .any(|(from, o)| self.attacks(from, o, target))
    }

    /// Attack-set membership. King and pawn attack their fixed offsets
    /// whatever stands there; the other pieces attack exactly the squares they
    /// could move to, so a square held by their own side is not attacked.
    pub fn attacks(&self, from: Position, occupant: Occupant, target: Position) -> bool {
        let dr = target.row as i8 - from.row as i8;
        let dc = target.column as i8 - from.column as i8;
        if dr == 0 && dc == 0 {
            return false;
        }
        let own_target = self.get(target).is_some_and(|o| o.color == occupant.color);
        match occupant.kind {
            PieceKind::Pawn => dr == occupant.color.forward() && dc.abs() == 1,
            PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
            PieceKind::Knight => !own_target && KNIGHT_OFFSETS.contains(&(dr, dc)),
            PieceKind::Rook => !own_target && (dr == 0 || dc == 0) && self.ray_clear(from, target),
            PieceKind::Bishop => {
                !own_target && dr.abs() == dc.abs() && self.ray_clear(from, target)
            }
            PieceKind::Queen => {
                !own_target
                    && (dr == 0 || dc == 0 || dr.abs() == dc.abs())
                    && self.ray_clear(from, target)
            }
        }
    }

    // Squares strictly between two aligned positions are empty.
    fn ray_clear(&self, from: Position, to: Position) -> bool {
        let step_r = (to.row as i8 - from.row as i8).signum();
        let step_c = (to.column as i8 - from.column as i8).signum();
        let mut current = from;
        loop {
            current = match current.offset(step_r, step_c) {
                Some(next) => next,
                None => return false,
            };
            if current == to {
                return true;
            }
            if !self.is_empty(current) {
                return false;
            }
        }
    }
}
