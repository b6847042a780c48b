//! Legal-move generation for a single piece.
//!
//! Generation is a pure function of the piece's owner, king flag, position
//! and the board's occupancy. Plain moves and jumps are reported side by
//! side; forced capture is left to the caller.

use crate::board::Board;
use crate::piece::Piece;
use crate::types::{Direction, MoveCandidate, PlayerId, Position};

/// Computes the complete candidate list for `piece` on `board`.
pub fn generate(board: &Board, piece: &Piece) -> Vec<MoveCandidate> {
    Direction::ALL
        .into_iter()
        .filter(|&dir| may_travel(piece.owner, piece.kinged, dir))
        .filter_map(|dir| candidate_toward(board, piece.position, piece.owner, dir))
        .collect()
}

/// Kings go anywhere; men only toward the opponent's home rank.
pub fn may_travel(owner: PlayerId, kinged: bool, dir: Direction) -> bool {
    kinged || owner.forward_directions().contains(&dir)
}

fn candidate_toward(
    board: &Board,
    from: Position,
    owner: PlayerId,
    dir: Direction,
) -> Option<MoveCandidate> {
    let adjacent = from.offset(dir, 1)?;
    match board.owner_at(adjacent) {
        None => Some(MoveCandidate::step(adjacent)),
        Some(occupant) if occupant != owner => {
            let landing = from.offset(dir, 2)?;
            if board.piece_at(landing).is_none() {
                Some(MoveCandidate::jump(landing, adjacent))
            } else {
                None
            }
        }
        Some(_) => None,
    }
}
