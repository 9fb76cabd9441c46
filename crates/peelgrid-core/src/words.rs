//! Candidate word extraction from the board.

use crate::board::Board;
use std::collections::HashSet;

/// Collect every maximal horizontal and vertical run of two or more letters.
///
/// Rows are scanned first, then columns. Duplicates are dropped, keeping the
/// first occurrence. Single letters never count as words.
pub fn extract_words(board: &Board) -> Vec<String> {
    let Some(bounds) = board.bounds() else {
        return Vec::new();
    };

    let mut words = Vec::new();

    for row in bounds.min_row..=bounds.max_row {
        // One column past the edge flushes a word ending at max_col.
        let cells = (bounds.min_col..=bounds.max_col + 1).map(|col| board.tile_at(row, col));
        scan_line(cells.map(|t| t.map(|t| t.letter)), &mut words);
    }

    for col in bounds.min_col..=bounds.max_col {
        let cells = (bounds.min_row..=bounds.max_row + 1).map(|row| board.tile_at(row, col));
        scan_line(cells.map(|t| t.map(|t| t.letter)), &mut words);
    }

    let mut seen = HashSet::new();
    words.retain(|w| seen.insert(w.clone()));
    words
}

fn scan_line(cells: impl Iterator<Item = Option<char>>, out: &mut Vec<String>) {
    let mut current = String::new();
    for cell in cells {
        match cell {
            Some(letter) => current.push(letter.to_ascii_uppercase()),
            None => {
                if current.chars().count() > 1 {
                    out.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
}
