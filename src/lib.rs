use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod console;
pub mod error;
pub mod game;
pub mod movegen;
pub mod piece;
pub mod session;
pub mod types;

use crate::config::GameConfig;
use crate::error::{EngineError, EngineResult};
use crate::session::{Session, TurnOutcome};
use crate::types::{GameSnapshot, MoveCandidate, Position};

static SESSION: Lazy<Mutex<Option<Session>>> = Lazy::new(|| Mutex::new(None));

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}

/// Starts a game. `config` may be `undefined` or a partial
/// `{ start_color: "red" | "black", first_player: "first" | "second" }`.
#[wasm_bindgen]
pub fn new_game(config: JsValue) -> Result<JsValue, JsValue> {
    let config: GameConfig = if config.is_undefined() || config.is_null() {
        GameConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|err| {
            to_js_error(EngineError::InvalidConfig {
                message: err.to_string(),
            })
        })?
    };
    to_js(&start(config))
}

#[wasm_bindgen]
pub fn get_state() -> Result<JsValue, JsValue> {
    let snapshot = with_session(|session| Ok(session.snapshot())).map_err(to_js_error)?;
    to_js(&snapshot)
}

/// Candidates for the piece on `(x, y)`; an empty list when nothing there
/// can be selected.
#[wasm_bindgen]
pub fn legal_moves(x: i32, y: i32) -> Result<JsValue, JsValue> {
    let moves = with_session(|session| Ok(options_at(session, x, y))).map_err(to_js_error)?;
    to_js(&moves)
}

/// Plays one step of the active player's turn and returns the new state.
#[wasm_bindgen]
pub fn play_move(x: i32, y: i32, to_x: i32, to_y: i32) -> Result<JsValue, JsValue> {
    let snapshot = with_session(|session| {
        step(session, x, y, to_x, to_y)?;
        Ok(session.snapshot())
    })
    .map_err(to_js_error)?;
    to_js(&snapshot)
}

fn start(config: GameConfig) -> GameSnapshot {
    let session = Session::new(&config);
    let snapshot = session.snapshot();
    *SESSION.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    snapshot
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> EngineResult<T>) -> EngineResult<T> {
    let mut slot = SESSION.lock().unwrap_or_else(PoisonError::into_inner);
    let session = slot.as_mut().ok_or(EngineError::NoActiveGame)?;
    f(session)
}

fn options_at(session: &Session, x: i32, y: i32) -> Vec<MoveCandidate> {
    Position::new(x, y)
        .and_then(|pos| session.options(pos).ok())
        .unwrap_or_default()
}

fn step(session: &mut Session, x: i32, y: i32, to_x: i32, to_y: i32) -> EngineResult<TurnOutcome> {
    let from = Position::new(x, y).ok_or(EngineError::OffBoard { x, y })?;
    let to = Position::new(to_x, to_y).ok_or(EngineError::OffBoard { x: to_x, y: to_y })?;
    session.play(from, to)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn to_js_error(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
