//! Turn controller sitting between a front end and [`GameState`].
//!
//! A turn is one plain move or one full jump chain. The session tracks the
//! chain lock so the front end only has to pass coordinates around.

use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{EngineError, EngineResult};
use crate::game::GameState;
use crate::piece::Piece;
use crate::types::{GameSnapshot, MoveCandidate, PlayerId, Position};

/// What happened after [`Session::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The turn moved on to `next`.
    TurnPassed { next: PlayerId },
    /// The piece now on `at` must jump again.
    ContinueJump { at: Position },
    GameOver { winner: PlayerId, loser: PlayerId },
}

#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    chain: Option<Position>,
}

impl Session {
    pub fn new(config: &GameConfig) -> Self {
        Self::from_state(GameState::new(config))
    }

    pub fn from_state(state: GameState) -> Self {
        Self { state, chain: None }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn active_player(&self) -> PlayerId {
        self.state.current_player()
    }

    /// Square of the piece locked into a jump chain, if any.
    pub fn pending_chain(&self) -> Option<Position> {
        self.chain
    }

    /// True when the active player has nothing to move.
    pub fn active_player_stuck(&self) -> bool {
        !self.state.is_terminal()
            && self
                .state
                .movable_pieces(self.active_player())
                .next()
                .is_none()
    }

    /// Returns the piece on `pos` if the active player may move it now.
    /// While a chain is open only the chained piece qualifies.
    pub fn select(&self, pos: Position) -> EngineResult<&Piece> {
        if let Some(at) = self.chain
            && at != pos
        {
            return Err(EngineError::ChainInProgress { position: at });
        }
        self.state.select_piece(pos)
    }

    /// Candidates offered for the piece on `pos`; jumps only mid-chain.
    pub fn options(&self, pos: Position) -> EngineResult<Vec<MoveCandidate>> {
        let piece = self.select(pos)?;
        Ok(if self.chain.is_some() {
            piece.jumps().copied().collect()
        } else {
            piece.moves.clone()
        })
    }

    /// Moves the piece on `from` to `to` and settles the turn.
    ///
    /// The new state replaces the current one only after the whole
    /// transition succeeded.
    pub fn play(&mut self, from: Position, to: Position) -> EngineResult<TurnOutcome> {
        let chained = self.chain.is_some();
        let candidate = *self
            .select(from)?
            .move_to(to)
            .filter(|mv| !chained || mv.is_jump())
            .ok_or(EngineError::IllegalMove { from, to })?;
        let player = self.active_player();
        let moved = self.state.apply_move(player, from, &candidate)?;

        if let Some(loser) = moved.loser() {
            info!(winner = %player, "game finished");
            self.state = moved;
            self.chain = None;
            return Ok(TurnOutcome::GameOver {
                winner: player,
                loser,
            });
        }

        if candidate.is_jump() && moved.board().piece_at(to).is_some_and(Piece::has_jump) {
            debug!(at = %to, "jump chain continues");
            self.state = moved;
            self.chain = Some(to);
            return Ok(TurnOutcome::ContinueJump { at: to });
        }

        let next = moved.advance_turn()?;
        let next_player = next.current_player();
        self.state = next;
        self.chain = None;
        Ok(TurnOutcome::TurnPassed { next: next_player })
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.to_snapshot(self.chain)
    }
}
