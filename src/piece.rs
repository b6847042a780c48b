use std::fmt;

use crate::types::{MoveCandidate, PlayerId, Position};

/// A checker on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub owner: PlayerId,
    /// Once set, stays set for the piece's lifetime.
    pub kinged: bool,
    pub position: Position,
    /// Slot in the owner's roster.
    pub roster_index: usize,
    /// Replaced wholesale by the move generator, never edited in place.
    pub moves: Vec<MoveCandidate>,
}

impl Piece {
    pub fn new(owner: PlayerId, position: Position) -> Self {
        Self {
            owner,
            kinged: false,
            position,
            roster_index: 0,
            moves: Vec::new(),
        }
    }

    pub fn has_jump(&self) -> bool {
        self.moves.iter().any(MoveCandidate::is_jump)
    }

    pub fn jumps(&self) -> impl Iterator<Item = &MoveCandidate> {
        self.moves.iter().filter(|mv| mv.is_jump())
    }

    /// Finds the candidate landing on `to`.
    pub fn move_to(&self, to: Position) -> Option<&MoveCandidate> {
        self.moves.iter().find(|mv| mv.to == to)
    }

    /// Numbered move listing, e.g. `Move1 = (3, 3), Move2 = (1, 3)`.
    pub fn moves_summary(&self) -> String {
        numbered(self.moves.iter())
    }

    /// Like [`Piece::moves_summary`] but only jumps, keeping their numbers.
    pub fn jumps_summary(&self) -> String {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, mv)| mv.is_jump())
            .map(|(idx, mv)| format!("Move{} = {mv}", idx + 1))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece at {}", self.position)?;
        if self.kinged {
            write!(f, " (king)")?;
        }
        Ok(())
    }
}

fn numbered<'a>(moves: impl Iterator<Item = &'a MoveCandidate>) -> String {
    moves
        .enumerate()
        .map(|(idx, mv)| format!("Move{} = {mv}", idx + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A seat and its live roster.
///
/// The roster stores positions; the pieces themselves live on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub(crate) roster: Vec<Position>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            roster: Vec::new(),
        }
    }

    pub fn roster(&self) -> &[Position] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }
}
