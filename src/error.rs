//! Error types for the rules engine.
//!
//! Every variant is a caller contract violation. The engine reports it and
//! leaves the current state untouched.

use crate::types::{PlayerId, Position};

/// Errors returned by state transitions and session lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The game has finished; route back to setup.
    #[error("game is already over")]
    GameOver,

    /// A player acted out of turn.
    #[error("it is not {player}'s turn")]
    NotYourTurn { player: PlayerId },

    /// No piece sits on the selected square.
    #[error("no piece at {position}")]
    NoPieceAt { position: Position },

    /// The selected piece belongs to the other player.
    #[error("piece at {position} belongs to {owner}")]
    NotYourPiece { position: Position, owner: PlayerId },

    /// The selected piece cannot move anywhere.
    #[error("piece at {position} has no legal moves")]
    NoLegalMoves { position: Position },

    /// The requested destination is not in the piece's move list.
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Position, to: Position },

    /// A layout placed two pieces on the same square.
    #[error("square {position} is already occupied")]
    SquareOccupied { position: Position },

    /// The active player must keep jumping with the chained piece.
    #[error("the piece at {position} must continue jumping")]
    ChainInProgress { position: Position },

    /// Coordinates outside the 8x8 grid.
    #[error("({x}, {y}) is off the board")]
    OffBoard { x: i32, y: i32 },

    /// No game has been started, or the previous one was lost.
    #[error("no game in progress, start a new game first")]
    NoActiveGame,

    /// Setup parameters could not be read.
    #[error("invalid game configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
