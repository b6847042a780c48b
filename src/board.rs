use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::types::{BOARD_SIZE, PlayerId, Position, in_bounds};

const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Display color of a square. Has no bearing on legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquareColor {
    Red,
    Black,
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Square {
    pub color: SquareColor,
    pub piece: Option<Piece>,
}

/// Checkers board as an 8x8 grid indexed `[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Square; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty, painted board.
    pub fn new() -> Self {
        Self {
            squares: std::array::from_fn(|y| {
                std::array::from_fn(|x| Square {
                    color: square_color(x as i32, y as i32),
                    piece: None,
                })
            }),
        }
    }

    pub fn square(&self, pos: Position) -> &Square {
        &self.squares[pos.y() as usize][pos.x() as usize]
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.square(pos).piece.as_ref()
    }

    pub(crate) fn piece_at_mut(&mut self, pos: Position) -> Option<&mut Piece> {
        self.squares[pos.y() as usize][pos.x() as usize].piece.as_mut()
    }

    /// Returns the owner of the piece on `pos`, if any.
    pub fn owner_at(&self, pos: Position) -> Option<PlayerId> {
        self.piece_at(pos).map(|piece| piece.owner)
    }

    /// True iff `(x, y)` is on the board and holds a piece.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        Position::new(x, y).is_some_and(|pos| self.piece_at(pos).is_some())
    }

    /// Removes and returns the piece on `pos`. The square keeps its color.
    pub(crate) fn take(&mut self, pos: Position) -> Option<Piece> {
        self.squares[pos.y() as usize][pos.x() as usize].piece.take()
    }

    /// Puts `piece` on its own position.
    /// Caller contract: the square is empty.
    pub(crate) fn put(&mut self, piece: Piece) {
        let pos = piece.position;
        let square = &mut self.squares[pos.y() as usize][pos.x() as usize];
        debug_assert!(square.piece.is_none(), "put() onto occupied {pos}");
        square.piece = Some(piece);
    }

    /// Positions holding `player`'s pieces, scanned row by row.
    pub fn positions_of(&self, player: PlayerId) -> impl Iterator<Item = Position> + '_ {
        self.pieces()
            .filter(move |piece| piece.owner == player)
            .map(|piece| piece.position)
    }

    /// All pieces, scanned row by row.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.squares
            .iter()
            .flat_map(|row| row.iter().filter_map(|square| square.piece.as_ref()))
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=first, 2=second, +2 for kings.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut cells = [0u8; NUM_SQUARES];
        for piece in self.pieces() {
            let idx = piece.position.y() as usize * BOARD_SIZE + piece.position.x() as usize;
            let base = piece.owner.number();
            cells[idx] = if piece.kinged { base + 2 } else { base };
        }
        cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// True iff `0 <= x < 8` and `0 <= y < 8`.
pub fn is_on_board(x: i32, y: i32) -> bool {
    in_bounds(x, y)
}

/// Checkerboard coloring: red when `x + y` is even.
pub fn square_color(x: i32, y: i32) -> SquareColor {
    if x.rem_euclid(2) == y.rem_euclid(2) {
        SquareColor::Red
    } else {
        SquareColor::Black
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y).unwrap()
    }

    #[test]
    fn bounds_are_total_over_integers() {
        assert!(is_on_board(0, 0));
        assert!(is_on_board(7, 7));
        assert!(!is_on_board(8, 0));
        assert!(!is_on_board(0, -1));
        assert!(!is_on_board(i32::MAX, i32::MIN));
    }

    #[test]
    fn coloring_alternates_and_handles_negatives() {
        assert_eq!(square_color(0, 0), SquareColor::Red);
        assert_eq!(square_color(1, 0), SquareColor::Black);
        assert_eq!(square_color(1, 1), SquareColor::Red);
        assert_eq!(square_color(-1, 0), SquareColor::Black);

        let board = Board::new();
        assert_eq!(board.square(pos(2, 5)).color, SquareColor::Black);
        assert_eq!(board.square(pos(3, 5)).color, SquareColor::Red);
    }

    #[test]
    fn put_and_take_keep_square_color() {
        let mut board = Board::new();
        let at = pos(2, 3);
        let color = board.square(at).color;

        board.put(Piece::new(PlayerId::Second, at));
        assert!(board.is_occupied(2, 3));
        assert!(!board.is_occupied(3, 3));
        assert!(!board.is_occupied(-1, 3));
        assert_eq!(board.owner_at(at), Some(PlayerId::Second));

        let taken = board.take(at).unwrap();
        assert_eq!(taken.position, at);
        assert!(!board.is_occupied(2, 3));
        assert_eq!(board.square(at).color, color);
    }

    #[test]
    fn to_array_encodes_owner_and_king() {
        let mut board = Board::new();
        board.put(Piece::new(PlayerId::First, pos(0, 0)));
        let mut king = Piece::new(PlayerId::Second, pos(1, 0));
        king.kinged = true;
        board.put(king);

        let cells = board.to_array();
        assert_eq!(cells[0], 1);
        assert_eq!(cells[1], 4);
        assert_eq!(cells[2], 0);
    }

    #[test]
    fn scans_run_row_by_row() {
        let mut board = Board::new();
        board.put(Piece::new(PlayerId::First, pos(5, 0)));
        board.put(Piece::new(PlayerId::First, pos(1, 2)));
        board.put(Piece::new(PlayerId::Second, pos(0, 1)));
        board.put(Piece::new(PlayerId::First, pos(3, 0)));

        let first: Vec<_> = board.positions_of(PlayerId::First).collect();
        assert_eq!(first, vec![pos(3, 0), pos(5, 0), pos(1, 2)]);
    }
}
