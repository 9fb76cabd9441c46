//! Plain-text views of the session.

use peelgrid_core::{Board, GameSession, Position, Selection};
use std::fmt::Write;

/// Cells of empty margin drawn around the occupied area.
const MARGIN: i32 = 1;

/// Draw the occupied part of the board with row and column labels.
///
/// Selected tiles are shown in lowercase.
pub fn board_view(board: &Board, selection: &Selection) -> String {
    let Some(bounds) = board.bounds() else {
        return "(empty board)\n".to_string();
    };
    let last = board.size() - 1;
    let min_row = (bounds.min_row - MARGIN).max(0);
    let max_row = (bounds.max_row + MARGIN).min(last);
    let min_col = (bounds.min_col - MARGIN).max(0);
    let max_col = (bounds.max_col + MARGIN).min(last);

    let mut out = String::from("     ");
    for col in min_col..=max_col {
        let _ = write!(out, "{:>3}", col);
    }
    out.push('\n');

    for row in min_row..=max_row {
        let _ = write!(out, "{:>4} ", row);
        for col in min_col..=max_col {
            let cell = match board.tile_at(row, col) {
                Some(tile) if selection.is_selected(&tile.id) => tile.letter.to_ascii_lowercase(),
                Some(tile) => tile.letter,
                None => '.',
            };
            let _ = write!(out, "{:>3}", cell);
        }
        out.push('\n');
    }
    out
}

/// Numbered bench slots, matching the `b<N>` references commands accept.
pub fn bench_view(session: &GameSession) -> String {
    let bench = session.bench();
    if bench.is_empty() {
        return "Bench: (empty)".to_string();
    }
    let slots: Vec<String> = bench
        .iter()
        .enumerate()
        .map(|(i, tile)| {
            let mark = if session.selection().is_selected(&tile.id) { "*" } else { "" };
            format!("b{}:{}{}", i + 1, tile.letter, mark)
        })
        .collect();
    format!("Bench: {}", slots.join(" "))
}

pub fn status_line(session: &GameSession) -> String {
    let game = session.game();
    let mut line = format!(
        "Game {} [{:?}] bag: {} player: {}",
        if session.game_id().is_empty() { "-" } else { session.game_id() },
        game.status(),
        game.tiles_remaining(),
        session.player_id()
    );
    if let Some(drag) = session.drag() {
        let _ = write!(line, " dragging: {}", drag.tile_id);
    }
    if let Some(error) = game.last_error() {
        let _ = write!(line, "\nServer: {}", error);
    }
    if game.is_over() {
        let _ = write!(line, "\nWinner: {}", game.winner().unwrap_or("?"));
        for word in game.winning_words() {
            let verdict = match word.valid {
                Some(true) => " (valid)",
                Some(false) => " (invalid)",
                None => "",
            };
            let _ = write!(line, "\n  {}{}", word.word, verdict);
        }
    }
    line
}

pub fn full_view(session: &GameSession) -> String {
    format!(
        "{}\n{}{}\n",
        status_line(session),
        board_view(session.board(), session.selection()),
        bench_view(session)
    )
}

/// Format a cell the way commands accept it.
pub fn cell(pos: Position) -> String {
    format!("{},{}", pos.row, pos.col)
}
