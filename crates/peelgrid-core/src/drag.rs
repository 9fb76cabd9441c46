//! Drag-and-drop move planning.
//!
//! A drag starts on a tile (from the board or the bench) and ends either with a
//! drop on a board cell, a drop on the bench, or a cancel. Drops on a cell may
//! carry the whole selection along with the dragged tile; such group moves are
//! applied all-or-nothing.

use crate::board::Board;
use crate::player::PlayerTiles;
use crate::selection::Selection;
use crate::tile::{Position, Tile, TileId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Where a drag started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Board(Position),
    Bench,
}

/// An in-flight drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragContext {
    pub tile_id: TileId,
    pub source: DragSource,
}

impl DragContext {
    pub fn from_board(tile_id: TileId, row: i32, col: i32) -> Self {
        Self {
            tile_id,
            source: DragSource::Board(Position::new(row, col)),
        }
    }

    pub fn from_bench(tile_id: TileId) -> Self {
        Self {
            tile_id,
            source: DragSource::Bench,
        }
    }

    pub fn is_from_bench(&self) -> bool {
        self.source == DragSource::Bench
    }
}

/// Why a drop left the board untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("No drag in progress")]
    NoDrag,
    #[error("Tile {0} no longer exists")]
    UnknownTile(TileId),
    #[error("Only one tile can be placed from the bench at a time ({0} selected)")]
    BenchGroupMove(usize),
    #[error("Move would take a tile off the board at {0}")]
    OutOfBounds(Position),
    #[error("Two moving tiles would land on {0}")]
    SelfCollision(Position),
    #[error("Cell {0} is already occupied")]
    Occupied(Position),
    #[error("Tile was not dragged from the board")]
    NotFromBoard,
    #[error("Move failed part way and was rolled back")]
    RolledBack,
}

/// A mutation that was applied to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    /// A bench tile was put on the board.
    Placed { tile_id: TileId, to: Position },
    /// A board tile changed cells.
    Moved { tile_id: TileId, from: Position, to: Position },
    /// A board tile went back to the bench.
    Returned { tile_id: TileId, from: Position },
}

/// One tile's part of a planned drop.
#[derive(Debug, Clone)]
struct PlannedMove {
    tile: Tile,
    from: Option<Position>,
    to: Position,
}

/// Owns the drag lifecycle and turns drops into board mutations.
#[derive(Debug, Clone, Default)]
pub struct MovePlanner {
    drag: Option<DragContext>,
}

impl MovePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging a tile. Replaces any drag already in progress.
    ///
    /// The selection is left as is; dragging does not select.
    pub fn begin_drag(&mut self, context: DragContext) {
        log::trace!("Drag start: {:?}", context);
        self.drag = Some(context);
    }

    /// Abandon the current drag without touching anything.
    pub fn cancel_drag(&mut self) -> Option<DragContext> {
        self.drag.take()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn context(&self) -> Option<&DragContext> {
        self.drag.as_ref()
    }

    /// Drop the dragged tile (and its selected companions) on a board cell.
    ///
    /// Ends the drag. On success the selection is cleared and every applied
    /// placement or move is returned in execution order.
    pub fn drop_on_cell(
        &mut self,
        board: &mut Board,
        tiles: &mut PlayerTiles,
        selection: &mut Selection,
        target: Position,
    ) -> Result<Vec<Committed>, MoveRejection> {
        let context = self.drag.take().ok_or(MoveRejection::NoDrag)?;
        let dragged = resolve(board, tiles, &context.tile_id)
            .ok_or_else(|| MoveRejection::UnknownTile(context.tile_id.clone()))?;

        let group: Vec<Tile> = if !selection.is_empty() && selection.is_selected(&context.tile_id) {
            selection
                .iter()
                .filter_map(|id| resolve(board, tiles, id))
                .collect()
        } else {
            vec![dragged]
        };

        // The board decides where the dragged tile really is.
        let source = match board.position_of(&context.tile_id) {
            Some(pos) => DragSource::Board(pos),
            None => DragSource::Bench,
        };
        if source != context.source {
            log::debug!(
                "Drag of {} recorded {:?}, board says {:?}",
                context.tile_id,
                context.source,
                source
            );
        }

        if group.len() > 1 && source == DragSource::Bench {
            return Err(MoveRejection::BenchGroupMove(group.len()));
        }
        if !board.in_bounds(target.row, target.col) {
            return Err(MoveRejection::OutOfBounds(target));
        }

        let offset = match source {
            DragSource::Board(from) => target
                .row
                .checked_sub(from.row)
                .zip(target.col.checked_sub(from.col))
                .ok_or(MoveRejection::OutOfBounds(target))?,
            DragSource::Bench => (0, 0),
        };

        let plan = plan_moves(board, &group, source, target, offset)?;
        let committed = execute(board, tiles, plan)?;

        selection.clear();
        Ok(committed)
    }

    /// Drop the dragged tile on the bench.
    ///
    /// A tile dragged from the bench is left where it is. A board tile is
    /// lifted off the board and the selection is cleared.
    pub fn drop_on_bench(
        &mut self,
        board: &mut Board,
        tiles: &mut PlayerTiles,
        selection: &mut Selection,
    ) -> Result<Option<Committed>, MoveRejection> {
        let context = self.drag.take().ok_or(MoveRejection::NoDrag)?;
        if context.is_from_bench() {
            return Err(MoveRejection::NotFromBoard);
        }
        if resolve(board, tiles, &context.tile_id).is_none() {
            return Err(MoveRejection::UnknownTile(context.tile_id));
        }

        let mut returned = None;
        if let Some(from) = board.position_of(&context.tile_id) {
            if let Some(tile) = board.remove_tile(from.row, from.col) {
                tiles.mark_on_board(&tile.id, false);
                log::debug!("Returned {} from {} to the bench", tile.id, from);
                returned = Some(Committed::Returned { tile_id: tile.id, from });
            }
        }

        selection.clear();
        Ok(returned)
    }
}

/// Look a tile up among the player's tiles, then on the board.
fn resolve(board: &Board, tiles: &PlayerTiles, id: &TileId) -> Option<Tile> {
    tiles.find(id).or_else(|| board.find(id)).cloned()
}

fn plan_moves(
    board: &Board,
    group: &[Tile],
    source: DragSource,
    target: Position,
    (row_offset, col_offset): (i32, i32),
) -> Result<Vec<PlannedMove>, MoveRejection> {
    let mut plan = Vec::with_capacity(group.len());

    for tile in group {
        match board.position_of(&tile.id) {
            Some(from) => {
                let to = match from.checked_offset(row_offset, col_offset) {
                    Some(to) if board.in_bounds(to.row, to.col) => to,
                    Some(to) => return Err(MoveRejection::OutOfBounds(to)),
                    None => return Err(MoveRejection::OutOfBounds(target)),
                };
                plan.push(PlannedMove { tile: tile.clone(), from: Some(from), to });
            }
            None if source == DragSource::Bench => {
                plan.push(PlannedMove { tile: tile.clone(), from: None, to: target });
            }
            // Selected bench tiles do not ride along with a board drag.
            None => {}
        }
    }

    let moving: HashSet<&TileId> = plan.iter().map(|m| &m.tile.id).collect();
    let mut destinations = HashSet::with_capacity(plan.len());
    for planned in &plan {
        if !destinations.insert(planned.to) {
            return Err(MoveRejection::SelfCollision(planned.to));
        }
    }
    for planned in &plan {
        if let Some(occupant) = board.tile_at(planned.to.row, planned.to.col) {
            if !moving.contains(&occupant.id) {
                return Err(MoveRejection::Occupied(planned.to));
            }
        }
    }

    // Tiles that would not move are dropped from the plan.
    plan.retain(|m| m.from != Some(m.to));
    Ok(plan)
}

/// Apply a validated plan: every removal happens before any placement.
fn execute(
    board: &mut Board,
    tiles: &mut PlayerTiles,
    plan: Vec<PlannedMove>,
) -> Result<Vec<Committed>, MoveRejection> {
    let mut lifted: HashMap<TileId, (Tile, Position)> = HashMap::new();

    for planned in &plan {
        let Some(from) = planned.from else { continue };
        match board.remove_tile(from.row, from.col) {
            Some(tile) if tile.id == planned.tile.id => {
                lifted.insert(tile.id.clone(), (tile, from));
            }
            other => {
                if let Some(stranger) = other {
                    board.place_tile(stranger, from.row, from.col);
                }
                log::warn!("Tile {} was not at {} during move; rolling back", planned.tile.id, from);
                rollback(board, &lifted, &[]);
                return Err(MoveRejection::RolledBack);
            }
        }
    }

    let mut placed: Vec<Position> = Vec::with_capacity(plan.len());
    let mut committed = Vec::with_capacity(plan.len());

    for planned in plan {
        if !board.in_bounds(planned.to.row, planned.to.col)
            || !board.is_cell_empty(planned.to.row, planned.to.col)
        {
            log::warn!("Placement at {} failed; rolling back {} tiles", planned.to, lifted.len());
            rollback(board, &lifted, &placed);
            for committed_move in &committed {
                if let Committed::Placed { tile_id, .. } = committed_move {
                    tiles.mark_on_board(tile_id, false);
                }
            }
            return Err(MoveRejection::RolledBack);
        }

        match planned.from {
            Some(from) => {
                let tile = lifted
                    .get(&planned.tile.id)
                    .map(|(tile, _)| tile.clone())
                    .unwrap_or(planned.tile);
                let tile_id = tile.id.clone();
                board.place_tile(tile, planned.to.row, planned.to.col);
                log::debug!("Moved {} from {} to {}", tile_id, from, planned.to);
                committed.push(Committed::Moved { tile_id, from, to: planned.to });
            }
            None => {
                let mut tile = planned.tile;
                tile.on_board = true;
                let tile_id = tile.id.clone();
                board.place_tile(tile, planned.to.row, planned.to.col);
                tiles.mark_on_board(&tile_id, true);
                log::debug!("Placed {} at {}", tile_id, planned.to);
                committed.push(Committed::Placed { tile_id, to: planned.to });
            }
        }
        placed.push(planned.to);
    }

    Ok(committed)
}

/// Undo a partially executed plan: clear placed cells, restore lifted tiles.
fn rollback(board: &mut Board, lifted: &HashMap<TileId, (Tile, Position)>, placed: &[Position]) {
    for pos in placed {
        board.remove_tile(pos.row, pos.col);
    }
    for (tile, origin) in lifted.values() {
        board.place_tile(tile.clone(), origin.row, origin.col);
    }
}
