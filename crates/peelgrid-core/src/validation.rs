//! Client-side checks run before a peel or win claim, and form input checks.
//!
//! These are optimistic gates only. Word legality is decided by the server.

use crate::board::Board;
use crate::player::PlayerTiles;
use serde::Serialize;
use thiserror::Error;

/// Why the local board cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("You must use all tiles from your bench")]
    BenchNotEmpty,
    #[error("You must place tiles on the board")]
    EmptyBoard,
    #[error("All tiles must be connected")]
    Disconnected,
}

/// Result of the pre-submit board check, in the shape a UI consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<(), BoardError>> for BoardValidation {
    fn from(result: Result<(), BoardError>) -> Self {
        match result {
            Ok(()) => Self { valid: true, error: None },
            Err(e) => Self { valid: false, error: Some(e.to_string()) },
        }
    }
}

/// Check bench, occupancy and connectivity in that order; first failure wins.
pub fn check_board(board: &Board, tiles: &PlayerTiles) -> Result<(), BoardError> {
    if tiles.bench_len() > 0 {
        return Err(BoardError::BenchNotEmpty);
    }
    if board.is_empty() {
        return Err(BoardError::EmptyBoard);
    }
    if !board.is_connected() {
        return Err(BoardError::Disconnected);
    }
    Ok(())
}

pub fn validate_board(board: &Board, tiles: &PlayerTiles) -> BoardValidation {
    check_board(board, tiles).into()
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Game ID must be exactly 4 digits")]
    GameIdFormat,
    #[error("Player name must be 2-20 characters, letters, numbers, _ and - only")]
    PlayerNameFormat,
    #[error("HTML tags are not allowed")]
    Html,
}

pub const PLAYER_NAME_MIN: usize = 2;
pub const PLAYER_NAME_MAX: usize = 20;

/// A game id is exactly four ASCII digits.
pub fn validate_game_id(value: &str) -> Result<(), InputError> {
    if value.trim().is_empty() {
        return Err(InputError::Required("Game ID"));
    }
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::GameIdFormat);
    }
    if contains_html(value) {
        return Err(InputError::Html);
    }
    Ok(())
}

pub fn validate_player_name(value: &str) -> Result<(), InputError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(InputError::Required("Player name"));
    }
    let len = name.chars().count();
    let allowed = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !(PLAYER_NAME_MIN..=PLAYER_NAME_MAX).contains(&len) || !allowed {
        return Err(InputError::PlayerNameFormat);
    }
    if contains_html(value) {
        return Err(InputError::Html);
    }
    Ok(())
}

/// Trim, HTML-escape and collapse runs of whitespace.
pub fn sanitize_input(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for c in value.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

/// Whether the text holds something shaped like a tag (`<...>`).
fn contains_html(value: &str) -> bool {
    match value.find('<') {
        Some(start) => value[start + 1..].contains('>'),
        None => false,
    }
}
