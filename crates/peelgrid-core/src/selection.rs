//! Tile selection for group moves.

use crate::tile::TileId;

/// Tiles currently marked for a group operation, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<TileId>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile to the selection.
    pub fn select(&mut self, id: TileId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    /// Remove a tile from the selection.
    pub fn deselect(&mut self, id: &TileId) {
        self.ids.retain(|selected| selected != id);
    }

    /// Flip a tile's selection state. Returns whether it is now selected.
    pub fn toggle(&mut self, id: TileId) -> bool {
        if self.is_selected(&id) {
            self.deselect(&id);
            false
        } else {
            self.select(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Select every id yielded by `ids` (on top of the current selection).
    pub fn select_all<I: IntoIterator<Item = TileId>>(&mut self, ids: I) {
        for id in ids {
            self.select(id);
        }
    }

    pub fn is_selected(&self, id: &TileId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileId> {
        self.ids.iter()
    }
}
