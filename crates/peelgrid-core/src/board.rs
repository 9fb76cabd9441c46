//! Sparse tile grid and its query/mutation operations.

use crate::tile::{Position, Tile, TileId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// Default edge length of the square grid.
pub const DEFAULT_BOARD_SIZE: i32 = 40;

/// Inclusive bounding box of all occupied cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardBounds {
    pub min_row: i32,
    pub max_row: i32,
    pub min_col: i32,
    pub max_col: i32,
}

impl BoardBounds {
    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= self.min_row
            && pos.row <= self.max_row
            && pos.col >= self.min_col
            && pos.col <= self.max_col
    }
}

/// The local player's grid. Only occupied cells have entries.
#[derive(Debug, Clone)]
pub struct Board {
    size: i32,
    cells: HashMap<Position, Tile>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board of the default size.
    pub fn new() -> Self {
        Self::with_size(DEFAULT_BOARD_SIZE)
    }

    /// Create an empty board with a custom edge length.
    pub fn with_size(size: i32) -> Self {
        Self {
            size: size.max(1),
            cells: HashMap::new(),
        }
    }

    /// Edge length of the grid.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Whether a coordinate lies inside the grid.
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.size && col >= 0 && col < self.size
    }

    pub fn tile_at(&self, row: i32, col: i32) -> Option<&Tile> {
        self.cells.get(&Position::new(row, col))
    }

    pub fn is_cell_empty(&self, row: i32, col: i32) -> bool {
        !self.cells.contains_key(&Position::new(row, col))
    }

    /// Put a tile in a cell, replacing any occupant.
    ///
    /// Callers check `is_cell_empty` first; overwriting is not rejected here.
    pub fn place_tile(&mut self, tile: Tile, row: i32, col: i32) {
        self.cells.insert(Position::new(row, col), tile);
    }

    /// Remove and return the occupant of a cell.
    pub fn remove_tile(&mut self, row: i32, col: i32) -> Option<Tile> {
        self.cells.remove(&Position::new(row, col))
    }

    /// Move a tile between cells.
    ///
    /// Succeeds only when the source is occupied and the destination is empty;
    /// otherwise the board is left untouched and `false` is returned.
    pub fn move_tile(&mut self, from_row: i32, from_col: i32, to_row: i32, to_col: i32) -> bool {
        if !self.is_cell_empty(to_row, to_col) {
            return false;
        }
        match self.remove_tile(from_row, from_col) {
            Some(tile) => {
                self.place_tile(tile, to_row, to_col);
                true
            }
            None => false,
        }
    }

    /// Occupied positions in row-major order.
    pub fn occupied_cells(&self) -> Vec<Position> {
        let mut cells: Vec<Position> = self.cells.keys().copied().collect();
        cells.sort();
        cells
    }

    /// Every placed tile with its position, in row-major order.
    pub fn all_tiles(&self) -> Vec<(&Tile, Position)> {
        let mut tiles: Vec<(&Tile, Position)> =
            self.cells.iter().map(|(pos, tile)| (tile, *pos)).collect();
        tiles.sort_by_key(|(_, pos)| *pos);
        tiles
    }

    /// Find where a tile currently sits.
    pub fn position_of(&self, id: &TileId) -> Option<Position> {
        self.cells
            .iter()
            .find(|(_, tile)| &tile.id == id)
            .map(|(pos, _)| *pos)
    }

    /// Find a placed tile by id.
    pub fn find(&self, id: &TileId) -> Option<&Tile> {
        self.cells.values().find(|tile| &tile.id == id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding box of the occupied cells, `None` when the board is empty.
    pub fn bounds(&self) -> Option<BoardBounds> {
        let mut iter = self.cells.keys();
        let first = iter.next()?;
        let init = BoardBounds {
            min_row: first.row,
            max_row: first.row,
            min_col: first.col,
            max_col: first.col,
        };
        Some(iter.fold(init, |b, pos| BoardBounds {
            min_row: b.min_row.min(pos.row),
            max_row: b.max_row.max(pos.row),
            min_col: b.min_col.min(pos.col),
            max_col: b.max_col.max(pos.col),
        }))
    }

    /// Whether all occupied cells form a single orthogonally connected group.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.cells.keys().next().copied() else {
            return true;
        };
        if self.cells.len() == 1 {
            return true;
        }

        let mut visited = HashSet::with_capacity(self.cells.len());
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for next in current.neighbors() {
                if self.cells.contains_key(&next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited.len() == self.cells.len()
    }

    /// Empty the grid (game reset).
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str, letter: char) -> Tile {
        Tile::new(id, letter)
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new();
        assert!(board.is_empty());
        assert_eq!(board.size(), DEFAULT_BOARD_SIZE);
        assert!(board.bounds().is_none());
    }

    #[test]
    fn test_place_then_remove_round_trip() {
        let mut board = Board::new();
        let t = tile("a", 'A');
        board.place_tile(t.clone(), 3, 4);
        assert_eq!(board.tile_at(3, 4), Some(&t));

        let removed = board.remove_tile(3, 4);
        assert_eq!(removed, Some(t));
        assert!(board.is_cell_empty(3, 4));
        assert!(board.remove_tile(3, 4).is_none());
    }

    #[test]
    fn test_place_overwrites() {
        let mut board = Board::new();
        board.place_tile(tile("a", 'A'), 0, 0);
        board.place_tile(tile("b", 'B'), 0, 0);
        assert_eq!(board.len(), 1);
        assert_eq!(board.tile_at(0, 0).unwrap().letter, 'B');
    }

    #[test]
    fn test_move_tile() {
        let mut board = Board::new();
        board.place_tile(tile("a", 'A'), 0, 0);
        board.place_tile(tile("b", 'B'), 0, 1);

        // Destination occupied
        assert!(!board.move_tile(0, 0, 0, 1));
        assert_eq!(board.tile_at(0, 0).unwrap().letter, 'A');
        assert_eq!(board.tile_at(0, 1).unwrap().letter, 'B');

        // Source empty
        assert!(!board.move_tile(5, 5, 6, 6));
        assert_eq!(board.len(), 2);

        assert!(board.move_tile(0, 0, 1, 0));
        assert!(board.is_cell_empty(0, 0));
        assert_eq!(board.tile_at(1, 0).unwrap().letter, 'A');
    }

    #[test]
    fn test_bounds() {
        let mut board = Board::new();
        board.place_tile(tile("a", 'A'), 2, 7);
        board.place_tile(tile("b", 'B'), 5, 1);
        board.place_tile(tile("c", 'C'), 3, 3);

        let bounds = board.bounds().unwrap();
        assert_eq!(
            bounds,
            BoardBounds { min_row: 2, max_row: 5, min_col: 1, max_col: 7 }
        );
        // Idempotent without mutation
        assert_eq!(board.bounds(), Some(bounds));
    }

    #[test]
    fn test_connectivity() {
        let mut board = Board::new();
        assert!(board.is_connected());

        board.place_tile(tile("a", 'A'), 0, 0);
        assert!(board.is_connected());

        board.place_tile(tile("b", 'B'), 0, 1);
        assert!(board.is_connected());

        board.place_tile(tile("c", 'C'), 5, 5);
        assert!(!board.is_connected());
    }

    #[test]
    fn test_diagonal_is_not_connected() {
        let mut board = Board::new();
        board.place_tile(tile("a", 'A'), 0, 0);
        board.place_tile(tile("b", 'B'), 1, 1);
        assert!(!board.is_connected());

        board.place_tile(tile("c", 'C'), 0, 1);
        assert!(board.is_connected());
    }

    #[test]
    fn test_occupied_and_all_tiles() {
        let mut board = Board::new();
        board.place_tile(tile("b", 'B'), 1, 0);
        board.place_tile(tile("a", 'A'), 0, 2);

        assert_eq!(board.occupied_cells(), vec![Position::new(0, 2), Position::new(1, 0)]);

        let all = board.all_tiles();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0.letter, 'A');
        assert_eq!(all[1].1, Position::new(1, 0));

        assert_eq!(board.position_of(&TileId::new("b")), Some(Position::new(1, 0)));
        assert_eq!(board.position_of(&TileId::new("zzz")), None);
    }

    #[test]
    fn test_in_bounds() {
        let board = Board::with_size(35);
        assert!(board.in_bounds(0, 0));
        assert!(board.in_bounds(34, 34));
        assert!(!board.in_bounds(35, 0));
        assert!(!board.in_bounds(0, -1));
    }

    #[test]
    fn test_clear() {
        let mut board = Board::new();
        board.place_tile(tile("a", 'A'), 0, 0);
        board.clear();
        assert!(board.is_empty());
    }
}
