//! Text console front end.
//!
//! Owns its input and output streams so it can be driven from stdin or from
//! an in-memory buffer. All rules questions go through [`Session`].

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::board::{Board, SquareColor};
use crate::config::{GameConfig, parse_player};
use crate::game::GameState;
use crate::piece::Piece;
use crate::session::{Session, TurnOutcome};
use crate::types::{BOARD_SIZE, PlayerId, Position};

const RED_BG: &str = "\x1b[41m";
const BLACK_BG: &str = "\x1b[40m";
const RESET: &str = "\x1b[0m";
const RULE: &str = "---------------------------";

const RULES: &str = "\
Welcome to a fun game of Checkers!
-- The goal is to capture every one of the other player's
-- pieces by jumping over them with your own.
-- A piece MOVES one square diagonally. At the start of play
-- Player 1's pieces travel toward the bottom of the board and
-- Player 2's pieces travel toward the top. A piece that reaches
-- the far end of the board is crowned and may then travel in
-- any diagonal direction. Crowned pieces are drawn as [1] or [2].
-- A JUMP is possible when an enemy piece sits where your piece
-- could otherwise move and the square just beyond it is open.
-- Your piece lands on that open square and the enemy piece is
-- removed. If the same piece can jump again, it must keep going.";

enum Reply {
    Coords(Position),
    Malformed,
    Closed,
}

enum Step {
    Moved(TurnOutcome),
    Back,
    Quit,
}

/// Interactive console game bound to one pair of streams.
pub struct ConsoleSession<R, W> {
    input: R,
    output: W,
    config: GameConfig,
}

impl<R: BufRead, W: Write> ConsoleSession<R, W> {
    pub fn new(input: R, output: W, config: GameConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the main menu until EXIT or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "   Digital Checkers")?;
        loop {
            writeln!(
                self.output,
                "\nYou can PLAY the game, learn the RULES, or EXIT"
            )?;
            let Some(answer) = self.ask("What would you like to do? > ")? else {
                break;
            };
            match answer.to_lowercase().as_str() {
                "play" => {
                    if !self.play()? {
                        break;
                    }
                }
                "rules" => writeln!(self.output, "{RULES}")?,
                "exit" => break,
                _ => writeln!(
                    self.output,
                    "That was not a valid command. Please input PLAY, RULES, or EXIT."
                )?,
            }
        }
        writeln!(self.output, "Thanks for playing.")
    }

    /// Returns `false` when input closed mid-game.
    fn play(&mut self) -> io::Result<bool> {
        let first = loop {
            let Some(answer) = self.ask("Which player would like to go first? > ")? else {
                return Ok(false);
            };
            match parse_player(&answer) {
                Ok(player) => break player,
                Err(_) => writeln!(
                    self.output,
                    "That is not a valid player. You must pick either 1 or 2."
                )?,
            }
        };
        let config = GameConfig {
            first_player: first,
            ..self.config
        };
        self.play_session(Session::new(&config))
    }

    pub(crate) fn play_session(&mut self, mut session: Session) -> io::Result<bool> {
        loop {
            let state = session.state();
            if let Some(winner) = state.winner() {
                writeln!(self.output, "{}", render_board(state.board()))?;
                writeln!(self.output, "Great Game! Congratulations {winner}")?;
                return Ok(true);
            }
            if session.active_player_stuck() {
                let stuck = session.active_player();
                writeln!(
                    self.output,
                    "{stuck} has no legal moves left. Congratulations {}",
                    stuck.opponent()
                )?;
                return Ok(true);
            }

            writeln!(self.output, "\nPLAYER {}:", session.active_player().number())?;
            writeln!(self.output, "{}", render_board(state.board()))?;
            writeln!(
                self.output,
                "{}",
                moves_listing(state, session.active_player())
            )?;
            if !self.take_turn(&mut session)? {
                return Ok(false);
            }
        }
    }

    /// Plays one plain move or one full jump chain.
    fn take_turn(&mut self, session: &mut Session) -> io::Result<bool> {
        let Some(mut from) = self.choose_piece(session)? else {
            return Ok(false);
        };
        loop {
            match self.choose_destination(session, from)? {
                Step::Quit => return Ok(false),
                Step::Back => match self.choose_piece(session)? {
                    Some(pos) => from = pos,
                    None => return Ok(false),
                },
                Step::Moved(TurnOutcome::ContinueJump { at }) => {
                    writeln!(self.output, "{}", render_board(session.state().board()))?;
                    from = at;
                }
                Step::Moved(TurnOutcome::TurnPassed { next }) => {
                    writeln!(self.output, "Current Player is now {next}")?;
                    return Ok(true);
                }
                Step::Moved(TurnOutcome::GameOver { .. }) => return Ok(true),
            }
        }
    }

    fn choose_piece(&mut self, session: &Session) -> io::Result<Option<Position>> {
        let preface = preface(session.active_player());
        loop {
            writeln!(self.output, "Format response like this -> pieceX, pieceY")?;
            match self.ask_coordinates(&format!("{preface}Which piece would you like to move? > "))? {
                Reply::Closed => return Ok(None),
                Reply::Coords(pos) => match session.select(pos) {
                    Ok(_) => return Ok(Some(pos)),
                    Err(err) => {
                        debug!(%err, "selection refused");
                        writeln!(
                            self.output,
                            "\nYou have not selected a piece to move ({err}). Please enter a valid piece."
                        )?;
                    }
                },
                Reply::Malformed => {
                    if self.try_or_back()?.is_none() {
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn choose_destination(&mut self, session: &mut Session, from: Position) -> io::Result<Step> {
        let preface = preface(session.active_player());
        let chained = session.pending_chain().is_some();
        loop {
            if let Ok(piece) = session.select(from) {
                let listing = if chained {
                    piece.jumps_summary()
                } else {
                    piece.moves_summary()
                };
                writeln!(self.output, "   Moves for {piece} : {listing}")?;
            }
            writeln!(self.output, "Format response like this -> targetX, targetY")?;
            let prompt =
                format!("{preface}Where would you like to move the piece currently at {from}? > ");
            match self.ask_coordinates(&prompt)? {
                Reply::Closed => return Ok(Step::Quit),
                Reply::Coords(to) => match session.play(from, to) {
                    Ok(outcome) => return Ok(Step::Moved(outcome)),
                    Err(err) => {
                        debug!(%err, "move refused");
                        writeln!(
                            self.output,
                            "\nYou cannot make that move with the piece at {from}. Please input a valid move to continue."
                        )?;
                    }
                },
                Reply::Malformed => match self.try_or_back()? {
                    None => return Ok(Step::Quit),
                    Some(true) if !chained => return Ok(Step::Back),
                    Some(true) => {
                        writeln!(self.output, "This piece must finish its jumps first.")?
                    }
                    Some(false) => {}
                },
            }
        }
    }

    /// `Some(true)` for BACK, `Some(false)` for TRY, `None` when input closed.
    fn try_or_back(&mut self) -> io::Result<Option<bool>> {
        let answer = self.ask(
            "That was not a valid response. Would you like to TRY again, or go BACK? > ",
        )?;
        Ok(answer.map(|text| text.eq_ignore_ascii_case("back")))
    }

    fn ask_coordinates(&mut self, prompt: &str) -> io::Result<Reply> {
        Ok(match self.ask(prompt)? {
            None => Reply::Closed,
            Some(text) => parse_coordinates(&text).map_or(Reply::Malformed, Reply::Coords),
        })
    }

    /// Prompts and reads one trimmed line; `None` at end of input.
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn preface(player: PlayerId) -> String {
    format!("PLAYER {}: ", player.number())
}

/// Parses `x, y` into an on-board position.
pub fn parse_coordinates(text: &str) -> Option<Position> {
    let mut parts = text.split(',').map(|part| part.trim().parse::<i32>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Position::new(x, y)
}

/// Draws the board with ANSI backgrounds, column numbers on top and row
/// numbers down the side.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\n   ");
    for x in 0..BOARD_SIZE {
        out.push_str(&format!(" {x} "));
    }
    for y in 0..BOARD_SIZE {
        out.push_str(&format!("\n {y} "));
        for x in 0..BOARD_SIZE {
            let square = board.square(Position::at(x, y));
            let bg = match square.color {
                SquareColor::Red => RED_BG,
                SquareColor::Black => BLACK_BG,
            };
            out.push_str(bg);
            out.push_str(&glyph(square.piece.as_ref()));
            out.push_str(RESET);
        }
    }
    out.push('\n');
    out.push_str(RULE);
    out
}

fn glyph(piece: Option<&Piece>) -> String {
    match piece {
        None => "   ".to_string(),
        Some(piece) if piece.kinged => format!("[{}]", piece.owner.number()),
        Some(piece) => format!(" {} ", piece.owner.number()),
    }
}

/// Lists every piece of `player` that can move, with its numbered moves.
pub fn moves_listing(state: &GameState, player: PlayerId) -> String {
    let mut out = format!(" PLAYER {} Moves:", player.number());
    for piece in state.movable_pieces(player) {
        out.push_str(&format!(
            "\n   Moves for {} : {}",
            piece,
            piece.moves_summary()
        ));
    }
    out
}
