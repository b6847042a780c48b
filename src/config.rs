use serde::{Deserialize, Serialize};

use crate::board::SquareColor;
use crate::error::{EngineError, EngineResult};
use crate::types::PlayerId;

/// Setup parameters for a new game.
///
/// Every field has a default so callers may pass a partial object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Square color both sides start on.
    pub start_color: SquareColor,
    pub first_player: PlayerId,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_color: SquareColor::Black,
            first_player: PlayerId::First,
        }
    }
}

impl GameConfig {
    pub fn new(start_color: SquareColor, first_player: PlayerId) -> Self {
        Self {
            start_color,
            first_player,
        }
    }
}

/// Accepts `red` or `black`, ignoring case and surrounding whitespace.
pub fn parse_start_color(input: &str) -> EngineResult<SquareColor> {
    match input.trim().to_lowercase().as_str() {
        "red" => Ok(SquareColor::Red),
        "black" => Ok(SquareColor::Black),
        other => Err(EngineError::InvalidConfig {
            message: format!("unknown start color {other:?}, expected red or black"),
        }),
    }
}

/// Accepts `1`/`one` or `2`/`two`, ignoring case and surrounding whitespace.
pub fn parse_player(input: &str) -> EngineResult<PlayerId> {
    match input.trim().to_lowercase().as_str() {
        "1" | "one" => Ok(PlayerId::First),
        "2" | "two" => Ok(PlayerId::Second),
        other => Err(EngineError::InvalidConfig {
            message: format!("unknown player {other:?}, expected 1 or 2"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_starts_on_black_with_first_player() {
        let config = GameConfig::default();

        assert_eq!(config.start_color, SquareColor::Black);
        assert_eq!(config.first_player, PlayerId::First);
    }

    #[test]
    fn parsers_accept_words_and_digits() {
        assert_eq!(parse_start_color(" RED "), Ok(SquareColor::Red));
        assert_eq!(parse_start_color("black"), Ok(SquareColor::Black));
        assert_eq!(parse_player("One"), Ok(PlayerId::First));
        assert_eq!(parse_player("2"), Ok(PlayerId::Second));
    }

    #[test]
    fn parsers_reject_unknown_values() {
        let err = parse_player("three").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
        assert!(parse_start_color("green").is_err());
    }
}
