//! The local player's tiles and the bench view derived from them.

use crate::tile::{Tile, TileId};
use std::collections::HashSet;

/// Outcome of reconciling held tiles against an authoritative letter list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Tiles created for letters that matched nothing held.
    pub added: Vec<TileId>,
    /// Held tiles the server no longer lists; they have been dropped.
    /// Tiles retired while on the board must also be lifted off the board.
    pub retired: Vec<Tile>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.retired.is_empty()
    }
}

/// Every tile dealt to the local player, on the board or not.
///
/// The bench is never stored: it is the subset with `on_board == false`.
#[derive(Debug, Clone, Default)]
pub struct PlayerTiles {
    tiles: Vec<Tile>,
}

impl PlayerTiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tiles not currently on the board.
    pub fn bench_tiles(&self) -> Vec<&Tile> {
        self.tiles.iter().filter(|t| !t.on_board).collect()
    }

    pub fn bench_len(&self) -> usize {
        self.tiles.iter().filter(|t| !t.on_board).count()
    }

    pub fn find(&self, id: &TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| &t.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &TileId> {
        self.tiles.iter().map(|t| &t.id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Flip a tile's placement flag. Returns false if the tile is unknown.
    pub fn mark_on_board(&mut self, id: &TileId, on_board: bool) -> bool {
        match self.tiles.iter_mut().find(|t| &t.id == id) {
            Some(tile) => {
                tile.on_board = on_board;
                true
            }
            None => false,
        }
    }

    pub fn add_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    pub fn remove_tile(&mut self, id: &TileId) -> Option<Tile> {
        let index = self.tiles.iter().position(|t| &t.id == id)?;
        Some(self.tiles.remove(index))
    }

    /// Replace the tile list wholesale.
    pub fn set_tiles(&mut self, tiles: Vec<Tile>) {
        log::debug!("Replacing {} held tiles with {}", self.tiles.len(), tiles.len());
        self.tiles = tiles;
    }

    /// Append only the tiles whose ids are not already held.
    /// Appended tiles start on the bench. Returns how many were appended.
    pub fn merge_tiles(&mut self, tiles: Vec<Tile>) -> usize {
        let mut known: HashSet<TileId> = self.tiles.iter().map(|t| t.id.clone()).collect();
        let before = self.tiles.len();
        for mut tile in tiles {
            if known.insert(tile.id.clone()) {
                tile.on_board = false;
                self.tiles.push(tile);
            }
        }
        self.tiles.len() - before
    }

    /// Bring held tiles in line with the server's letter list for this player.
    ///
    /// Each letter claims one held tile with the same letter, preferring tiles
    /// already on the board so local placements survive. Unclaimed letters
    /// become new bench tiles; unclaimed held tiles are dropped.
    pub fn reconcile_letters(&mut self, owner: &str, letters: &[char]) -> Reconciliation {
        let mut claimed = vec![false; self.tiles.len()];
        let mut fresh = Vec::new();

        for &letter in letters {
            let letter = letter.to_ascii_uppercase();
            let slot = self
                .unclaimed_index(&claimed, letter, true)
                .or_else(|| self.unclaimed_index(&claimed, letter, false));
            match slot {
                Some(i) => claimed[i] = true,
                None => fresh.push(Tile::dealt(owner, letter)),
            }
        }

        let mut outcome = Reconciliation::default();
        let held = std::mem::take(&mut self.tiles);
        for (tile, keep) in held.into_iter().zip(claimed) {
            if keep {
                self.tiles.push(tile);
            } else {
                outcome.retired.push(tile);
            }
        }
        outcome.added = fresh.iter().map(|t| t.id.clone()).collect();
        self.tiles.extend(fresh);

        if !outcome.is_empty() {
            log::debug!(
                "Reconciled tiles for {}: {} added, {} retired, {} held",
                owner,
                outcome.added.len(),
                outcome.retired.len(),
                self.tiles.len()
            );
        }
        outcome
    }

    fn unclaimed_index(&self, claimed: &[bool], letter: char, on_board: bool) -> Option<usize> {
        self.tiles
            .iter()
            .zip(claimed)
            .position(|(t, &taken)| !taken && t.letter == letter && t.on_board == on_board)
    }

    pub fn reset(&mut self) {
        self.tiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(specs: &[(&str, char, bool)]) -> PlayerTiles {
        let mut tiles = PlayerTiles::new();
        for &(id, letter, on_board) in specs {
            let mut t = Tile::new(id, letter);
            t.on_board = on_board;
            tiles.add_tile(t);
        }
        tiles
    }

    #[test]
    fn test_bench_is_derived_from_flag() {
        let mut tiles = held(&[("a", 'A', false), ("b", 'B', true)]);
        assert_eq!(tiles.bench_len(), 1);
        assert_eq!(tiles.bench_tiles()[0].id, TileId::new("a"));

        assert!(tiles.mark_on_board(&TileId::new("a"), true));
        assert!(tiles.bench_tiles().is_empty());

        assert!(!tiles.mark_on_board(&TileId::new("missing"), true));
    }

    #[test]
    fn test_merge_only_appends_unknown_ids() {
        let mut tiles = held(&[("a", 'A', true)]);
        let added = tiles.merge_tiles(vec![
            Tile::new("a", 'A'),
            Tile::new("b", 'B'),
            Tile::new("b", 'B'),
        ]);
        assert_eq!(added, 1);
        assert_eq!(tiles.len(), 2);
        // Existing tile untouched
        assert!(tiles.find(&TileId::new("a")).unwrap().on_board);
    }

    #[test]
    fn test_merged_tiles_land_on_bench() {
        let mut tiles = PlayerTiles::new();
        let mut incoming = Tile::new("z", 'Z');
        incoming.on_board = true;
        assert_eq!(tiles.merge_tiles(vec![incoming]), 1);
        assert!(!tiles.find(&TileId::new("z")).unwrap().on_board);
        assert_eq!(tiles.bench_len(), 1);
    }

    #[test]
    fn test_reconcile_keeps_known_tiles() {
        let mut tiles = held(&[("a", 'A', true), ("b", 'B', false)]);
        let outcome = tiles.reconcile_letters("p1", &['A', 'B', 'C']);

        assert_eq!(outcome.added.len(), 1);
        assert!(outcome.retired.is_empty());
        assert_eq!(tiles.len(), 3);
        assert!(tiles.find(&TileId::new("a")).unwrap().on_board);
        let new_tile = tiles.find(&outcome.added[0]).unwrap();
        assert_eq!(new_tile.letter, 'C');
        assert!(!new_tile.on_board);
    }

    #[test]
    fn test_reconcile_prefers_placed_tiles() {
        let mut tiles = held(&[("bench-e", 'E', false), ("board-e", 'E', true)]);
        let outcome = tiles.reconcile_letters("p1", &['E']);

        assert_eq!(outcome.retired.len(), 1);
        assert_eq!(outcome.retired[0].id, TileId::new("bench-e"));
        assert!(tiles.find(&TileId::new("board-e")).is_some());
    }

    #[test]
    fn test_reconcile_is_stable_for_same_letters() {
        let mut tiles = held(&[("x", 'X', false), ("y", 'Y', true)]);
        let outcome = tiles.reconcile_letters("p1", &['Y', 'X']);
        assert!(outcome.is_empty());
        assert_eq!(tiles.len(), 2);
    }

    #[test]
    fn test_remove_and_reset() {
        let mut tiles = held(&[("a", 'A', false)]);
        assert!(tiles.remove_tile(&TileId::new("a")).is_some());
        assert!(tiles.remove_tile(&TileId::new("a")).is_none());
        tiles.add_tile(Tile::new("b", 'B'));
        tiles.reset();
        assert!(tiles.is_empty());
    }
}
