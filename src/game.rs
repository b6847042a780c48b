use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use crate::board::{Board, square_color};
use crate::config::GameConfig;
use crate::error::{EngineError, EngineResult};
use crate::movegen;
use crate::piece::{Piece, Player};
use crate::types::{BOARD_SIZE, GameSnapshot, MoveCandidate, PieceView, PlayerId, Position};

const FIRST_HOME_ROWS: std::ops::RangeInclusive<usize> = 0..=2;
const SECOND_HOME_ROWS: std::ops::RangeInclusive<usize> = 5..=7;

/// Whether moves may still be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    /// One-way: a finished game never resumes.
    Finished { loser: PlayerId },
}

/// The current situation: both rosters, the board, whose turn it is.
///
/// Transitions take `&self` and return a fresh state, so a reader never
/// observes a half-applied move and earlier states stay valid for retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    players: [Player; 2],
    board: Board,
    current_player: PlayerId,
    status: GameStatus,
}

impl GameState {
    /// Standard layout: twelve men per side on the configured color,
    /// rows 0-2 for the first player and rows 5-7 for the second.
    pub fn new(config: &GameConfig) -> Self {
        let mut board = Board::new();
        for y in 0..BOARD_SIZE {
            let owner = if FIRST_HOME_ROWS.contains(&y) {
                PlayerId::First
            } else if SECOND_HOME_ROWS.contains(&y) {
                PlayerId::Second
            } else {
                continue;
            };
            for x in 0..BOARD_SIZE {
                if square_color(x as i32, y as i32) != config.start_color {
                    continue;
                }
                board.put(Piece::new(owner, Position::at(x, y)));
            }
        }

        Self::assemble(config.first_player, board)
    }

    /// Builds an arbitrary layout of `(position, owner, kinged)` entries.
    /// A side left without pieces makes the state finished.
    pub fn from_pieces(
        current_player: PlayerId,
        pieces: impl IntoIterator<Item = (Position, PlayerId, bool)>,
    ) -> EngineResult<Self> {
        let mut board = Board::new();
        for (position, owner, kinged) in pieces {
            if board.piece_at(position).is_some() {
                return Err(EngineError::SquareOccupied { position });
            }
            let mut piece = Piece::new(owner, position);
            piece.kinged = kinged;
            board.put(piece);
        }

        Ok(Self::assemble(current_player, board))
    }

    fn assemble(current_player: PlayerId, board: Board) -> Self {
        let mut state = Self {
            players: [Player::new(PlayerId::First), Player::new(PlayerId::Second)],
            board,
            current_player,
            status: GameStatus::InProgress,
        };
        for id in PlayerId::ALL {
            state.reindex(id);
        }
        state.recompute_all();
        if let Some(loser) = state.eliminated_player() {
            state.status = GameStatus::Finished { loser };
        }
        state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, GameStatus::Finished { .. })
    }

    /// The player whose roster emptied.
    pub fn loser(&self) -> Option<PlayerId> {
        match self.status {
            GameStatus::Finished { loser } => Some(loser),
            GameStatus::InProgress => None,
        }
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.loser().map(PlayerId::opponent)
    }

    /// `id`'s pieces in roster order.
    pub fn pieces_of(&self, id: PlayerId) -> impl Iterator<Item = &Piece> {
        self.player(id)
            .roster()
            .iter()
            .filter_map(|&pos| self.board.piece_at(pos))
    }

    /// Pieces of `id` with at least one candidate.
    pub fn movable_pieces(&self, id: PlayerId) -> impl Iterator<Item = &Piece> {
        self.pieces_of(id).filter(|piece| !piece.moves.is_empty())
    }

    /// Looks up the piece on `pos` for the active player, explaining why
    /// it cannot be selected otherwise.
    pub fn select_piece(&self, pos: Position) -> EngineResult<&Piece> {
        if self.is_terminal() {
            return Err(EngineError::GameOver);
        }
        let piece = self
            .board
            .piece_at(pos)
            .ok_or(EngineError::NoPieceAt { position: pos })?;
        if piece.owner != self.current_player {
            return Err(EngineError::NotYourPiece {
                position: pos,
                owner: piece.owner,
            });
        }
        if piece.moves.is_empty() {
            return Err(EngineError::NoLegalMoves { position: pos });
        }
        Ok(piece)
    }

    /// Move list of the active player's piece on `pos`, or `None` when no
    /// selectable piece sits there.
    pub fn legal_moves(&self, pos: Position) -> Option<&[MoveCandidate]> {
        self.select_piece(pos)
            .ok()
            .map(|piece| piece.moves.as_slice())
    }

    /// Jumps still open to the piece on `pos`. Non-empty right after a jump
    /// means the chain must continue with that piece.
    pub fn follow_up_jumps(&self, pos: Position) -> Vec<MoveCandidate> {
        self.board
            .piece_at(pos)
            .map(|piece| piece.jumps().copied().collect())
            .unwrap_or_default()
    }

    /// Applies `candidate` to the piece on `from` and returns the new state.
    ///
    /// Fails without side effects unless the game is running, `player` is
    /// active, owns the piece, and `candidate` is in the piece's list.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_move(
        &self,
        player: PlayerId,
        from: Position,
        candidate: &MoveCandidate,
    ) -> EngineResult<GameState> {
        if self.is_terminal() {
            return Err(EngineError::GameOver);
        }
        if player != self.current_player {
            return Err(EngineError::NotYourTurn { player });
        }
        let piece = self
            .board
            .piece_at(from)
            .ok_or(EngineError::NoPieceAt { position: from })?;
        if piece.owner != player {
            return Err(EngineError::NotYourPiece {
                position: from,
                owner: piece.owner,
            });
        }
        if !piece.moves.contains(candidate) {
            return Err(EngineError::IllegalMove {
                from,
                to: candidate.to,
            });
        }

        let mut next = self.clone();
        let mut moving = next
            .detach(from)
            .ok_or(EngineError::NoPieceAt { position: from })?;
        moving.position = candidate.to;
        if candidate.to.y() == player.king_row() && !moving.kinged {
            debug!(at = %candidate.to, "piece crowned");
            moving.kinged = true;
        }
        next.attach(moving);

        let mut changed = vec![from, candidate.to];
        if let Some(over) = candidate.captured {
            let captured = next
                .detach(over)
                .ok_or(EngineError::NoPieceAt { position: over })?;
            changed.push(over);
            debug!(at = %over, owner = %captured.owner, "piece captured");
            if next.player(captured.owner).is_empty() {
                info!(loser = %captured.owner, "roster empty, game over");
                next.status = GameStatus::Finished {
                    loser: captured.owner,
                };
            }
        }

        next.recompute_around(&changed);
        Ok(next)
    }

    /// Hands the turn to the next player.
    pub fn advance_turn(&self) -> EngineResult<GameState> {
        if self.is_terminal() {
            return Err(EngineError::GameOver);
        }
        let mut next = self.clone();
        next.current_player = self.current_player.opponent();
        debug!(player = %next.current_player, "turn passed");
        Ok(next)
    }

    /// Copy of this state with every move list regenerated from scratch.
    /// Always equal to `self`, since stored lists never go stale.
    pub fn refreshed(&self) -> GameState {
        let mut next = self.clone();
        next.recompute_all();
        next
    }

    pub fn to_snapshot(&self, chain: Option<Position>) -> GameSnapshot {
        GameSnapshot {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player,
            first_count: self.player(PlayerId::First).len() as u8,
            second_count: self.player(PlayerId::Second).len() as u8,
            is_game_over: self.is_terminal(),
            loser: self.loser(),
            chain,
            pieces: self
                .board
                .pieces()
                .map(|piece| PieceView {
                    position: piece.position,
                    owner: piece.owner,
                    kinged: piece.kinged,
                    moves: piece.moves.clone(),
                })
                .collect(),
        }
    }

    fn eliminated_player(&self) -> Option<PlayerId> {
        PlayerId::ALL
            .into_iter()
            .find(|&id| self.player(id).is_empty())
    }

    /// Lifts the piece off `pos` and renumbers its owner's roster.
    fn detach(&mut self, pos: Position) -> Option<Piece> {
        let piece = self.board.take(pos)?;
        self.reindex(piece.owner);
        Some(piece)
    }

    /// Sets the piece down on its position at the end of its owner's roster.
    fn attach(&mut self, mut piece: Piece) {
        let roster = &mut self.players[piece.owner.index()].roster;
        piece.roster_index = roster.len();
        roster.push(piece.position);
        self.board.put(piece);
    }

    /// Rebuilds `id`'s roster from a row-by-row board scan.
    fn reindex(&mut self, id: PlayerId) {
        let roster: Vec<Position> = self.board.positions_of(id).collect();
        for (idx, &pos) in roster.iter().enumerate() {
            if let Some(piece) = self.board.piece_at_mut(pos) {
                piece.roster_index = idx;
            }
        }
        self.players[id.index()].roster = roster;
    }

    fn recompute_all(&mut self) {
        let everywhere: Vec<Position> = self.board.pieces().map(|piece| piece.position).collect();
        for pos in everywhere {
            self.recompute(pos);
        }
    }

    /// A piece's jumps look two squares out, so every piece within two
    /// diagonal steps of a changed square may need a new list.
    fn recompute_around(&mut self, changed: &[Position]) {
        let affected: BTreeSet<Position> = changed
            .iter()
            .flat_map(|&pos| std::iter::once(pos).chain(pos.neighborhood()))
            .collect();
        debug!(squares = affected.len(), "recomputing move lists");
        for pos in affected {
            self.recompute(pos);
        }
    }

    fn recompute(&mut self, pos: Position) {
        let Some(moves) = self
            .board
            .piece_at(pos)
            .map(|piece| movegen::generate(&self.board, piece))
        else {
            return;
        };
        if let Some(piece) = self.board.piece_at_mut(pos) {
            piece.moves = moves;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SquareColor;
    use crate::types::Direction;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    fn layout(current: PlayerId, pieces: &[(i32, i32, PlayerId, bool)]) -> GameState {
        GameState::from_pieces(
            current,
            pieces
                .iter()
                .map(|&(x, y, owner, kinged)| (pos(x, y), owner, kinged)),
        )
        .unwrap()
    }

    fn assert_consistent(state: &GameState) {
        assert_eq!(state, &state.refreshed(), "stored move lists went stale");
        for id in PlayerId::ALL {
            for (idx, &at) in state.player(id).roster().iter().enumerate() {
                let piece = state.board().piece_at(at).expect("roster points at a piece");
                assert_eq!(piece.owner, id);
                assert_eq!(piece.position, at);
                assert_eq!(piece.roster_index, idx);
            }
            assert_eq!(
                state.player(id).len(),
                state.board().positions_of(id).count()
            );
        }
        let any_empty = PlayerId::ALL.iter().any(|&id| state.player(id).is_empty());
        assert_eq!(state.is_terminal(), any_empty);
    }

    #[test]
    fn initial_layout_has_twelve_men_each_on_start_color() {
        for color in [SquareColor::Black, SquareColor::Red] {
            let state = GameState::new(&GameConfig::new(color, PlayerId::Second));

            assert_eq!(state.player(PlayerId::First).len(), 12);
            assert_eq!(state.player(PlayerId::Second).len(), 12);
            assert_eq!(state.current_player(), PlayerId::Second);
            assert_eq!(state.status(), GameStatus::InProgress);
            for piece in state.board().pieces() {
                assert!(!piece.kinged);
                assert_eq!(state.board().square(piece.position).color, color);
                let rows = match piece.owner {
                    PlayerId::First => FIRST_HOME_ROWS,
                    PlayerId::Second => SECOND_HOME_ROWS,
                };
                assert!(rows.contains(&(piece.position.y() as usize)));
            }
            assert_consistent(&state);
        }
    }

    #[test]
    fn only_front_rows_can_move_at_start() {
        let state = GameState::new(&GameConfig::default());

        assert!(
            state
                .movable_pieces(PlayerId::First)
                .all(|piece| piece.position.y() == 2)
        );
        assert_eq!(state.movable_pieces(PlayerId::First).count(), 4);
        assert!(
            state
                .board()
                .pieces()
                .flat_map(|piece| piece.moves.iter())
                .all(|mv| !mv.is_jump())
        );
    }

    #[test]
    fn scenario_a_opening_steps_are_plain_moves() {
        let state = GameState::new(&GameConfig::new(SquareColor::Red, PlayerId::First));

        assert_eq!(
            state.legal_moves(pos(2, 2)),
            Some(
                &[
                    MoveCandidate::step(pos(3, 3)),
                    MoveCandidate::step(pos(1, 3)),
                ][..]
            )
        );
    }

    #[test]
    fn legal_moves_reports_unselectable_squares() {
        let state = GameState::new(&GameConfig::new(SquareColor::Red, PlayerId::First));

        assert_eq!(state.legal_moves(pos(3, 3)), None); // empty
        assert_eq!(state.legal_moves(pos(1, 5)), None); // opponent
        assert_eq!(state.legal_moves(pos(1, 1)), None); // blocked
        assert_eq!(
            state.select_piece(pos(1, 5)).unwrap_err(),
            EngineError::NotYourPiece {
                position: pos(1, 5),
                owner: PlayerId::Second,
            }
        );
        assert_eq!(
            state.select_piece(pos(1, 1)).unwrap_err(),
            EngineError::NoLegalMoves { position: pos(1, 1) }
        );
    }

    #[test]
    fn scenario_b_jump_captures_and_shrinks_roster() {
        let state = layout(
            PlayerId::First,
            &[
                (2, 2, PlayerId::First, false),
                (3, 3, PlayerId::Second, false),
                (7, 7, PlayerId::Second, false),
            ],
        );
        let jump = MoveCandidate::jump(pos(4, 4), pos(3, 3));
        assert!(state.legal_moves(pos(2, 2)).unwrap().contains(&jump));

        let next = state.apply_move(PlayerId::First, pos(2, 2), &jump).unwrap();

        assert!(next.board().piece_at(pos(3, 3)).is_none());
        assert!(next.board().piece_at(pos(2, 2)).is_none());
        assert_eq!(next.board().owner_at(pos(4, 4)), Some(PlayerId::First));
        assert_eq!(next.player(PlayerId::Second).len(), 1);
        assert_eq!(next.player(PlayerId::First).len(), 1);
        assert!(!next.is_terminal());
        assert_consistent(&next);
        // The prior state is untouched.
        assert_eq!(state.player(PlayerId::Second).len(), 2);
    }

    #[test]
    fn plain_move_keeps_roster_sizes_and_appends_mover() {
        let state = GameState::new(&GameConfig::new(SquareColor::Red, PlayerId::First));
        let before_first = state.player(PlayerId::First).len();
        let before_second = state.player(PlayerId::Second).len();

        let next = state
            .apply_move(PlayerId::First, pos(2, 2), &MoveCandidate::step(pos(3, 3)))
            .unwrap();

        assert_eq!(next.player(PlayerId::First).len(), before_first);
        assert_eq!(next.player(PlayerId::Second).len(), before_second);
        let moved = next.board().piece_at(pos(3, 3)).unwrap();
        assert_eq!(moved.roster_index, before_first - 1);
        assert_eq!(next.current_player(), PlayerId::First);
        assert_consistent(&next);
    }

    #[test]
    fn moving_reopens_paths_behind_the_mover() {
        let state = GameState::new(&GameConfig::new(SquareColor::Red, PlayerId::First));
        assert_eq!(state.legal_moves(pos(3, 1)), None);

        let next = state
            .apply_move(PlayerId::First, pos(2, 2), &MoveCandidate::step(pos(3, 3)))
            .unwrap();

        assert_eq!(
            next.legal_moves(pos(3, 1)),
            Some(&[MoveCandidate::step(pos(2, 2))][..])
        );
        assert_consistent(&next);
    }

    #[test]
    fn scenario_c_far_rank_crowns_and_unlocks_backward_moves() {
        let state = layout(
            PlayerId::First,
            &[
                (3, 6, PlayerId::First, false),
                (0, 1, PlayerId::Second, false),
            ],
        );

        let next = state
            .apply_move(PlayerId::First, pos(3, 6), &MoveCandidate::step(pos(2, 7)))
            .unwrap();
        let king = next.board().piece_at(pos(2, 7)).unwrap();

        assert!(king.kinged);
        assert_eq!(
            king.moves,
            vec![
                MoveCandidate::step(pos(1, 6)),
                MoveCandidate::step(pos(3, 6)),
            ]
        );
        assert!(Direction::ALL.iter().all(|&dir| movegen::may_travel(king.owner, king.kinged, dir)));
        assert_consistent(&next);
    }

    #[test]
    fn second_player_crowns_on_row_zero_and_turns_south() {
        let state = layout(
            PlayerId::Second,
            &[
                (0, 6, PlayerId::First, false),
                (4, 1, PlayerId::Second, false),
            ],
        );
        let man = state.board().piece_at(pos(4, 1)).unwrap();
        assert_eq!(
            man.moves,
            vec![
                MoveCandidate::step(pos(3, 0)),
                MoveCandidate::step(pos(5, 0)),
            ]
        );

        let next = state
            .apply_move(PlayerId::Second, pos(4, 1), &MoveCandidate::step(pos(3, 0)))
            .unwrap();
        let king = next.board().piece_at(pos(3, 0)).unwrap();

        assert!(king.kinged);
        assert_eq!(
            king.moves,
            vec![
                MoveCandidate::step(pos(4, 1)),
                MoveCandidate::step(pos(2, 1)),
            ]
        );
        assert!(!state.board().piece_at(pos(4, 1)).unwrap().kinged);
        assert_consistent(&next);
    }

    #[test]
    fn kings_stay_kinged_when_leaving_the_far_rank() {
        let state = layout(
            PlayerId::Second,
            &[
                (2, 7, PlayerId::First, false),
                (4, 1, PlayerId::Second, true),
            ],
        );

        let next = state
            .apply_move(PlayerId::Second, pos(4, 1), &MoveCandidate::step(pos(5, 2)))
            .unwrap();
        let king = next.board().piece_at(pos(5, 2)).unwrap();

        assert!(king.kinged);
        assert_eq!(king.moves.len(), 4);
    }

    #[test]
    fn scenario_d_eliminating_a_side_finishes_the_game() {
        let state = layout(
            PlayerId::First,
            &[
                (2, 2, PlayerId::First, false),
                (0, 0, PlayerId::First, false),
                (3, 3, PlayerId::Second, false),
                (5, 5, PlayerId::Second, false),
            ],
        );

        let first_jump = MoveCandidate::jump(pos(4, 4), pos(3, 3));
        let mid = state.apply_move(PlayerId::First, pos(2, 2), &first_jump).unwrap();
        let follow_ups = mid.follow_up_jumps(pos(4, 4));
        assert_eq!(follow_ups, vec![MoveCandidate::jump(pos(6, 6), pos(5, 5))]);
        assert!(!mid.is_terminal());

        let end = mid
            .apply_move(PlayerId::First, pos(4, 4), &follow_ups[0])
            .unwrap();

        assert!(end.is_terminal());
        assert_eq!(end.loser(), Some(PlayerId::Second));
        assert_eq!(end.winner(), Some(PlayerId::First));
        assert!(end.player(PlayerId::Second).is_empty());
        assert_consistent(&end);

        let err = end
            .apply_move(PlayerId::First, pos(6, 6), &MoveCandidate::step(pos(7, 7)))
            .unwrap_err();
        assert_eq!(err, EngineError::GameOver);
        assert_eq!(end.advance_turn().unwrap_err(), EngineError::GameOver);
        assert_eq!(end.legal_moves(pos(0, 0)), None);
    }

    #[test]
    fn contract_violations_are_rejected_without_changes() {
        let state = GameState::new(&GameConfig::new(SquareColor::Red, PlayerId::First));
        let snapshot = state.clone();

        assert_eq!(
            state
                .apply_move(PlayerId::Second, pos(1, 5), &MoveCandidate::step(pos(0, 4)))
                .unwrap_err(),
            EngineError::NotYourTurn {
                player: PlayerId::Second
            }
        );
        assert_eq!(
            state
                .apply_move(PlayerId::First, pos(3, 3), &MoveCandidate::step(pos(4, 4)))
                .unwrap_err(),
            EngineError::NoPieceAt { position: pos(3, 3) }
        );
        assert!(matches!(
            state.apply_move(PlayerId::First, pos(1, 5), &MoveCandidate::step(pos(0, 4))),
            Err(EngineError::NotYourPiece { .. })
        ));
        assert_eq!(
            state
                .apply_move(PlayerId::First, pos(2, 2), &MoveCandidate::step(pos(2, 3)))
                .unwrap_err(),
            EngineError::IllegalMove {
                from: pos(2, 2),
                to: pos(2, 3),
            }
        );
        assert_eq!(
            state
                .apply_move(
                    PlayerId::First,
                    pos(2, 2),
                    &MoveCandidate::jump(pos(4, 4), pos(3, 3))
                )
                .unwrap_err(),
            EngineError::IllegalMove {
                from: pos(2, 2),
                to: pos(4, 4),
            }
        );
        assert_eq!(state, snapshot);
    }

    #[test]
    fn advance_turn_is_round_robin() {
        let state = GameState::new(&GameConfig::default());

        let second = state.advance_turn().unwrap();
        let first = second.advance_turn().unwrap();

        assert_eq!(second.current_player(), PlayerId::Second);
        assert_eq!(first.current_player(), PlayerId::First);
    }

    #[test]
    fn from_pieces_rejects_stacked_squares_and_flags_empty_sides() {
        let err = GameState::from_pieces(
            PlayerId::First,
            [
                (pos(1, 1), PlayerId::First, false),
                (pos(1, 1), PlayerId::Second, false),
            ],
        )
        .unwrap_err();
        assert_eq!(err, EngineError::SquareOccupied { position: pos(1, 1) });

        let lonely = layout(PlayerId::First, &[(1, 1, PlayerId::First, false)]);
        assert_eq!(lonely.loser(), Some(PlayerId::Second));
    }

    /// Plays a deterministic game, preferring captures, and checks the
    /// engine's invariants after every transition.
    #[test]
    fn invariants_hold_across_a_full_playthrough() {
        let mut state = GameState::new(&GameConfig::default());
        let mut plies = 0;

        while !state.is_terminal() && plies < 400 {
            let player = state.current_player();
            let Some((from, candidate)) = state
                .movable_pieces(player)
                .flat_map(|piece| piece.moves.iter().map(move |mv| (piece.position, *mv)))
                .max_by_key(|(from, mv)| (mv.is_jump(), std::cmp::Reverse(*from)))
            else {
                break;
            };

            let mut at = from;
            let mut step = candidate;
            loop {
                let before = state.clone();
                let was_king = before.board().piece_at(at).unwrap().kinged;
                state = state.apply_move(player, at, &step).unwrap();
                plies += 1;

                let mover = state.board().piece_at(step.to).unwrap();
                assert!(!was_king || mover.kinged, "king lost its crown");
                assert_eq!(state.player(player).len(), before.player(player).len());
                let opponent = player.opponent();
                let shrink = usize::from(step.is_jump());
                assert_eq!(
                    state.player(opponent).len() + shrink,
                    before.player(opponent).len()
                );
                assert_consistent(&state);

                if !step.is_jump() || state.is_terminal() {
                    break;
                }
                match state.follow_up_jumps(step.to).first() {
                    Some(&next) => {
                        at = step.to;
                        step = next;
                    }
                    None => break,
                }
            }

            if !state.is_terminal() {
                state = state.advance_turn().unwrap();
            }
        }

        assert!(plies > 10);
    }
}
