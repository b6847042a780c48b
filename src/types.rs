use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 8;

/// A board coordinate. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    x: u8,
    y: u8,
}

impl Position {
    /// Returns `None` when `(x, y)` lies off the board.
    pub fn new(x: i32, y: i32) -> Option<Self> {
        in_bounds(x, y).then(|| Self::at(x as usize, y as usize))
    }

    /// Caller contract: both coordinates are below `BOARD_SIZE`.
    pub(crate) const fn at(x: usize, y: usize) -> Self {
        debug_assert!(x < BOARD_SIZE && y < BOARD_SIZE);
        Self {
            x: x as u8,
            y: y as u8,
        }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    /// The square `steps` diagonal steps away, if it is on the board.
    pub fn offset(self, direction: Direction, steps: i32) -> Option<Self> {
        let (dx, dy) = direction.delta();
        Self::new(self.x as i32 + dx * steps, self.y as i32 + dy * steps)
    }

    /// Every on-board square within two diagonal steps, excluding `self`.
    pub fn neighborhood(self) -> impl Iterator<Item = Position> {
        Direction::ALL
            .into_iter()
            .flat_map(move |dir| (1..=2).filter_map(move |steps| self.offset(dir, steps)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub(crate) fn in_bounds(x: i32, y: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&x) && (0..BOARD_SIZE as i32).contains(&y)
}

/// Diagonal direction of travel. North is toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    NorthWest = 0,
    NorthEast = 1,
    SouthEast = 2,
    SouthWest = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }
}

/// One of the two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    First = 0,
    Second = 1,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::First, PlayerId::Second];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Next player in round-robin order.
    pub fn opponent(self) -> Self {
        match self {
            PlayerId::First => PlayerId::Second,
            PlayerId::Second => PlayerId::First,
        }
    }

    /// Directions a man of this player may travel.
    /// First heads toward increasing `y`, Second toward decreasing `y`.
    pub fn forward_directions(self) -> [Direction; 2] {
        match self {
            PlayerId::First => [Direction::SouthEast, Direction::SouthWest],
            PlayerId::Second => [Direction::NorthWest, Direction::NorthEast],
        }
    }

    /// Row on which this player's pieces are crowned.
    pub fn king_row(self) -> u8 {
        match self {
            PlayerId::First => (BOARD_SIZE - 1) as u8,
            PlayerId::Second => 0,
        }
    }

    /// One-based number shown to people.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// A legal destination for one piece.
///
/// Contract:
/// - Plain move: `captured` is `None`.
/// - Jump: `captured` is the square passed over, which held an opposing piece
///   when the candidate was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveCandidate {
    pub to: Position,
    pub captured: Option<Position>,
}

impl MoveCandidate {
    pub fn step(to: Position) -> Self {
        Self { to, captured: None }
    }

    pub fn jump(to: Position, over: Position) -> Self {
        Self {
            to,
            captured: Some(over),
        }
    }

    pub fn is_jump(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for MoveCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.captured {
            Some(over) => write!(f, "{} jumping over {}", self.to, over),
            None => write!(f, "{}", self.to),
        }
    }
}

/// One occupied square in a [`GameSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub position: Position,
    pub owner: PlayerId,
    pub kinged: bool,
    pub moves: Vec<MoveCandidate>,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Row-major, 0=empty, 1=first player, 2=second player, +2 when kinged.
    pub board: Vec<u8>,
    pub current_player: PlayerId,
    pub first_count: u8,
    pub second_count: u8,
    pub is_game_over: bool,
    pub loser: Option<PlayerId>,
    /// Contract:
    /// - `Some` while the active player must keep jumping with that piece.
    /// - `None` otherwise.
    pub chain: Option<Position>,
    pub pieces: Vec<PieceView>,
}
