//! The local player's view of one game.
//!
//! `GameSession` owns the board, the player's tiles, the selection and the
//! drag planner. Local gestures mutate that state immediately and queue the
//! matching [`ClientEvent`]s; the caller drains them with
//! [`GameSession::take_outgoing`] and hands them to the socket. Server events
//! go the other way through [`GameSession::handle_event`].

use crate::board::Board;
use crate::drag::{Committed, DragContext, MovePlanner, MoveRejection};
use crate::game::{GameSnapshot, GameState, PlayerSummary};
use crate::player::PlayerTiles;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::selection::Selection;
use crate::tile::{Position, Tile, TileId};
use crate::validation::{self, BoardError, BoardValidation, InputError};
use crate::words::extract_words;
use thiserror::Error;

/// Fewest tiles the bag must hold for a swap.
pub const MIN_TILES_FOR_SWAP: u32 = 3;

/// Why a player command was refused. Nothing is queued or changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Join a game first")]
    NotJoined,
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Move(#[from] MoveRejection),
    #[error("Not enough tiles left to swap ({0} remaining)")]
    BagTooSmall(u32),
    #[error("Unknown tile {0}")]
    UnknownTile(TileId),
}

pub struct GameSession {
    player_id: String,
    board: Board,
    tiles: PlayerTiles,
    selection: Selection,
    planner: MovePlanner,
    game: GameState,
    /// Events waiting to be sent, oldest first.
    outgoing: Vec<ClientEvent>,
}

impl GameSession {
    pub fn new(player_id: impl Into<String>, board_size: i32) -> Self {
        Self {
            player_id: player_id.into(),
            board: Board::with_size(board_size),
            tiles: PlayerTiles::new(),
            selection: Selection::new(),
            planner: MovePlanner::new(),
            game: GameState::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn game_id(&self) -> &str {
        self.game.game_id()
    }

    // --- Reads ---

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tiles(&self) -> &PlayerTiles {
        &self.tiles
    }

    pub fn bench(&self) -> Vec<&Tile> {
        self.tiles.bench_tiles()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn players(&self) -> Vec<PlayerSummary> {
        self.game.players()
    }

    pub fn words(&self) -> Vec<String> {
        extract_words(&self.board)
    }

    pub fn validate(&self) -> BoardValidation {
        validation::validate_board(&self.board, &self.tiles)
    }

    pub fn drag(&self) -> Option<&DragContext> {
        self.planner.context()
    }

    // --- Lobby ---

    /// Join (creating if needed) the game with the given four-digit id.
    pub fn join(&mut self, game_id: &str, test_mode: bool) -> Result<(), ActionError> {
        validation::validate_game_id(game_id)?;
        validation::validate_player_name(&self.player_id)?;
        log::info!("Joining game {} as {}", game_id, self.player_id);

        self.game.set_game_id(game_id);
        let name = game_id.to_string();
        self.outgoing.push(ClientEvent::Join { name: name.clone() });
        self.outgoing.push(ClientEvent::LoadGame { name: name.clone(), test_mode });
        self.outgoing.push(ClientEvent::PlayerJoin {
            name,
            player_id: self.player_id.clone(),
        });
        Ok(())
    }

    /// Create a game with a small bag and join it in one step.
    pub fn create_test_game(&mut self, game_id: &str) -> Result<(), ActionError> {
        validation::validate_game_id(game_id)?;
        validation::validate_player_name(&self.player_id)?;
        log::info!("Creating test game {} as {}", game_id, self.player_id);

        self.game.set_game_id(game_id);
        let name = game_id.to_string();
        self.outgoing.push(ClientEvent::Join { name: name.clone() });
        self.outgoing.push(ClientEvent::CreateTestGame {
            name,
            player_id: self.player_id.clone(),
        });
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), ActionError> {
        let name = self.joined_game()?;
        self.outgoing.push(ClientEvent::StartGame { name });
        Ok(())
    }

    pub fn split(&mut self) -> Result<(), ActionError> {
        let name = self.joined_game()?;
        self.outgoing.push(ClientEvent::Split { name });
        Ok(())
    }

    // --- Dragging ---

    /// Start dragging a tile from wherever it currently is.
    pub fn begin_drag(&mut self, tile_id: TileId) -> Result<(), ActionError> {
        let context = match self.board.position_of(&tile_id) {
            Some(pos) => DragContext::from_board(tile_id, pos.row, pos.col),
            None if self.tiles.find(&tile_id).is_some() => DragContext::from_bench(tile_id),
            None => return Err(ActionError::UnknownTile(tile_id)),
        };
        self.planner.begin_drag(context);
        Ok(())
    }

    pub fn cancel_drag(&mut self) {
        self.planner.cancel_drag();
    }

    /// Drop the dragged tile, and any selected companions, on a cell.
    pub fn drop_on_cell(&mut self, row: i32, col: i32) -> Result<Vec<Committed>, ActionError> {
        let committed = self.planner.drop_on_cell(
            &mut self.board,
            &mut self.tiles,
            &mut self.selection,
            Position::new(row, col),
        )?;
        for change in &committed {
            self.queue_committed(change);
        }
        Ok(committed)
    }

    /// Drop the dragged tile on the bench.
    pub fn drop_on_bench(&mut self) -> Result<Option<Committed>, ActionError> {
        let returned = self
            .planner
            .drop_on_bench(&mut self.board, &mut self.tiles, &mut self.selection)?;
        if let Some(change) = &returned {
            self.queue_committed(change);
        }
        Ok(returned)
    }

    fn queue_committed(&mut self, change: &Committed) {
        let game_id = self.game.game_id().to_string();
        let event = match change {
            Committed::Placed { tile_id, to } => ClientEvent::PlaceTile {
                game_id,
                tile_id: tile_id.to_string(),
                row: to.row,
                col: to.col,
            },
            Committed::Moved { from, to, .. } => ClientEvent::MoveTile {
                game_id,
                from_row: from.row,
                from_col: from.col,
                to_row: to.row,
                to_col: to.col,
            },
            Committed::Returned { tile_id, from } => ClientEvent::RemoveTile {
                game_id,
                tile_id: tile_id.to_string(),
                row: from.row,
                col: from.col,
            },
        };
        self.outgoing.push(event);
    }

    // --- Selection ---

    pub fn select(&mut self, tile_id: TileId) {
        self.selection.select(tile_id);
    }

    pub fn toggle_selection(&mut self, tile_id: TileId) -> bool {
        self.selection.toggle(tile_id)
    }

    /// Select every tile the player holds, placed or not.
    pub fn select_all(&mut self) {
        self.selection.select_all(self.tiles.ids().cloned());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- Gated actions ---

    /// Ask for a new tile for everyone. Requires a complete, connected board.
    pub fn peel(&mut self) -> Result<(), ActionError> {
        let name = self.joined_game()?;
        validation::check_board(&self.board, &self.tiles)?;
        self.outgoing.push(ClientEvent::Peel { name });
        Ok(())
    }

    /// Claim the win. Returns the words submitted for review.
    pub fn bananagrams(&mut self) -> Result<Vec<String>, ActionError> {
        let name = self.joined_game()?;
        validation::check_board(&self.board, &self.tiles)?;
        let words = extract_words(&self.board);
        log::info!("Calling bananagrams with {} words", words.len());
        self.outgoing.push(ClientEvent::Bananagrams {
            name,
            player_id: self.player_id.clone(),
            words: words.clone(),
        });
        Ok(words)
    }

    /// Return one tile to the bag in exchange for three.
    ///
    /// The tile leaves the board or bench locally right away.
    pub fn swap(&mut self, tile_id: &TileId) -> Result<char, ActionError> {
        let name = self.joined_game()?;
        let remaining = self.game.tiles_remaining();
        if remaining < MIN_TILES_FOR_SWAP {
            return Err(ActionError::BagTooSmall(remaining));
        }
        let tile = self
            .tiles
            .remove_tile(tile_id)
            .ok_or_else(|| ActionError::UnknownTile(tile_id.clone()))?;

        if let Some(pos) = self.board.position_of(tile_id) {
            self.board.remove_tile(pos.row, pos.col);
        }
        self.selection.deselect(tile_id);
        if self.planner.context().is_some_and(|c| &c.tile_id == tile_id) {
            self.planner.cancel_drag();
        }

        log::debug!("Swapping {} ({})", tile.id, tile.letter);
        self.outgoing.push(ClientEvent::Swap {
            name,
            player_id: self.player_id.clone(),
            letter: tile.letter.to_string(),
        });
        Ok(tile.letter)
    }

    /// Report which of the claimed words the reviewers accepted.
    pub fn validate_words(&mut self, valid_words: Vec<String>) -> Result<(), ActionError> {
        let game_id = self.joined_game()?;
        self.outgoing.push(ClientEvent::ValidateWords {
            game_id,
            player_id: self.player_id.clone(),
            valid_words,
        });
        Ok(())
    }

    /// Resume play after a rejected win claim.
    pub fn continue_game(&mut self) -> Result<(), ActionError> {
        let name = self.joined_game()?;
        self.outgoing.push(ClientEvent::ContinueGame { name });
        Ok(())
    }

    /// Reset the game on the server and clear everything held locally.
    pub fn reset(&mut self) -> Result<(), ActionError> {
        let name = self.joined_game()?;
        self.outgoing.push(ClientEvent::Reset { name: name.clone() });

        self.board.clear();
        self.tiles.reset();
        self.selection.clear();
        self.planner.cancel_drag();
        self.game.reset();
        self.game.set_game_id(name);
        Ok(())
    }

    fn joined_game(&self) -> Result<String, ActionError> {
        match self.game.game_id() {
            "" => Err(ActionError::NotJoined),
            id => Ok(id.to_string()),
        }
    }

    // --- Transport ---

    /// Drain queued events in the order they were produced.
    pub fn take_outgoing(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Apply an event from the server.
    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::RenderGame(envelope) => match envelope.snapshot() {
                Ok(Some(snapshot)) => self.apply_snapshot(snapshot),
                Ok(None) if envelope.status_code == 400 => {
                    log::warn!("Server rejected request: {}", envelope.message);
                    self.game.set_error(Some(envelope.message));
                }
                Ok(None) => log::debug!("render_game without state: {}", envelope.message),
                Err(e) => log::warn!("Failed to parse game state: {}", e),
            },
            ServerEvent::GameState(snapshot) => self.apply_snapshot(snapshot),
            ServerEvent::PlayerTiles(tiles) => {
                self.tiles.set_tiles(tiles);
                self.sync_board_with_tiles();
            }
            ServerEvent::TileUpdate(tiles) => {
                let added = self.tiles.merge_tiles(tiles);
                log::debug!("tile_update added {} tiles", added);
            }
            ServerEvent::Error(message) => {
                log::warn!("Server error: {}", message);
                self.game.set_error(Some(message));
            }
            ServerEvent::GameOver { winner, words } => {
                log::info!("Game over, winner: {}", winner);
                self.game.finish(winner, words);
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        let letters = snapshot.letters_for(&self.player_id);
        log::debug!(
            "Game {} is {:?}, {} tiles in the bag",
            snapshot.id,
            snapshot.state,
            snapshot.tiles_remaining.unwrap_or(0)
        );
        self.game.apply_snapshot(snapshot);

        let Some(letters) = letters else { return };
        let outcome = self.tiles.reconcile_letters(&self.player_id, &letters);
        for tile in &outcome.retired {
            if let Some(pos) = self.board.position_of(&tile.id) {
                self.board.remove_tile(pos.row, pos.col);
            }
            self.selection.deselect(&tile.id);
            if self.planner.context().is_some_and(|c| c.tile_id == tile.id) {
                self.planner.cancel_drag();
            }
        }
    }

    /// After a wholesale tile replacement, drop board tiles no longer held and
    /// fix each held tile's flag to match the board.
    fn sync_board_with_tiles(&mut self) {
        let stale: Vec<Position> = self
            .board
            .all_tiles()
            .into_iter()
            .filter(|(tile, _)| self.tiles.find(&tile.id).is_none())
            .map(|(_, pos)| pos)
            .collect();
        for pos in stale {
            self.board.remove_tile(pos.row, pos.col);
        }

        let ids: Vec<TileId> = self.tiles.ids().cloned().collect();
        for id in ids {
            let placed = self.board.position_of(&id).is_some();
            self.tiles.mark_on_board(&id, placed);
            if !placed {
                self.selection.deselect(&id);
            }
        }
        self.planner.cancel_drag();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameStatus, WinningWord};
    use crate::protocol::RenderGame;

    fn snapshot(letters: &[&str], remaining: u32) -> GameSnapshot {
        let mut snap = GameSnapshot {
            id: "1234".into(),
            state: GameStatus::Active,
            tiles_remaining: Some(remaining),
            ..Default::default()
        };
        snap.players
            .insert("alice".into(), letters.iter().map(|l| l.to_string()).collect());
        snap.players.insert("bob".into(), vec!["Q".into()]);
        snap
    }

    fn joined(letters: &[&str]) -> GameSession {
        let mut session = GameSession::new("alice", 10);
        session.join("1234", false).unwrap();
        session.take_outgoing();
        session.handle_event(ServerEvent::GameState(snapshot(letters, 50)));
        session
    }

    fn bench_id(session: &GameSession, letter: char) -> TileId {
        session
            .bench()
            .into_iter()
            .find(|t| t.letter == letter)
            .map(|t| t.id.clone())
            .unwrap()
    }

    fn place(session: &mut GameSession, letter: char, row: i32, col: i32) -> TileId {
        let id = bench_id(session, letter);
        session.begin_drag(id.clone()).unwrap();
        session.drop_on_cell(row, col).unwrap();
        id
    }

    #[test]
    fn test_join_queues_lobby_events() {
        let mut session = GameSession::new("alice", 10);
        session.join("1234", true).unwrap();
        let names: Vec<&str> = session.take_outgoing().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["join", "load_game", "player_join"]);
        assert_eq!(session.game_id(), "1234");
        assert!(!session.has_outgoing());
    }

    #[test]
    fn test_join_rejects_bad_input() {
        let mut session = GameSession::new("alice", 10);
        assert!(matches!(
            session.join("12", false),
            Err(ActionError::Input(InputError::GameIdFormat))
        ));
        let mut session = GameSession::new("a b", 10);
        assert!(session.join("1234", false).is_err());
        assert!(session.take_outgoing().is_empty());
    }

    #[test]
    fn test_commands_require_join() {
        let mut session = GameSession::new("alice", 10);
        assert_eq!(session.start(), Err(ActionError::NotJoined));
        assert_eq!(session.peel(), Err(ActionError::NotJoined));
    }

    #[test]
    fn test_create_test_game() {
        let mut session = GameSession::new("alice", 10);
        session.create_test_game("4321").unwrap();
        let events = session.take_outgoing();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[1],
            ClientEvent::CreateTestGame { name: "4321".into(), player_id: "alice".into() }
        );
    }

    #[test]
    fn test_snapshot_deals_bench() {
        let session = joined(&["C", "A", "T"]);
        assert_eq!(session.bench().len(), 3);
        assert!(session.board().is_empty());
        assert!(session.game().is_active());
        assert_eq!(session.players().len(), 2);
    }

    #[test]
    fn test_place_queues_place_tile() {
        let mut session = joined(&["C", "A", "T"]);
        let id = place(&mut session, 'C', 2, 3);

        assert_eq!(
            session.take_outgoing(),
            vec![ClientEvent::PlaceTile {
                game_id: "1234".into(),
                tile_id: id.to_string(),
                row: 2,
                col: 3,
            }]
        );
        assert_eq!(session.bench().len(), 2);
        assert!(session.tiles().find(&id).unwrap().on_board);
    }

    #[test]
    fn test_group_move_queues_each_tile() {
        let mut session = joined(&["C", "A", "T"]);
        let c = place(&mut session, 'C', 0, 0);
        let a = place(&mut session, 'A', 0, 1);
        session.take_outgoing();

        session.select(c.clone());
        session.select(a.clone());
        session.begin_drag(c.clone()).unwrap();
        let committed = session.drop_on_cell(1, 0).unwrap();
        assert_eq!(committed.len(), 2);

        let events = session.take_outgoing();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.name() == "move_tile"));
        assert!(session.selection().is_empty());
        assert_eq!(session.board().position_of(&a), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_rejected_drop_queues_nothing() {
        let mut session = joined(&["C", "A"]);
        place(&mut session, 'C', 0, 0);
        session.take_outgoing();

        let a = bench_id(&session, 'A');
        session.begin_drag(a).unwrap();
        assert!(matches!(
            session.drop_on_cell(0, 0),
            Err(ActionError::Move(MoveRejection::Occupied(_)))
        ));
        assert!(!session.has_outgoing());
        assert_eq!(session.bench().len(), 1);
    }

    #[test]
    fn test_drop_far_off_board_is_rejected() {
        let mut session = joined(&["C", "A"]);
        let c = place(&mut session, 'C', 5, 5);
        let a = place(&mut session, 'A', 5, 6);
        session.take_outgoing();
        session.select_all();

        session.begin_drag(c.clone()).unwrap();
        assert!(matches!(
            session.drop_on_cell(i32::MIN, 0),
            Err(ActionError::Move(MoveRejection::OutOfBounds(_)))
        ));
        assert_eq!(session.board().position_of(&c), Some(Position::new(5, 5)));
        assert_eq!(session.board().position_of(&a), Some(Position::new(5, 6)));
        assert!(!session.has_outgoing());
    }

    #[test]
    fn test_drop_on_bench_queues_remove() {
        let mut session = joined(&["C"]);
        let c = place(&mut session, 'C', 4, 4);
        session.take_outgoing();

        session.begin_drag(c.clone()).unwrap();
        assert!(session.drop_on_bench().unwrap().is_some());
        assert_eq!(
            session.take_outgoing(),
            vec![ClientEvent::RemoveTile {
                game_id: "1234".into(),
                tile_id: c.to_string(),
                row: 4,
                col: 4,
            }]
        );
        assert_eq!(session.bench().len(), 1);
    }

    #[test]
    fn test_begin_drag_unknown_tile() {
        let mut session = joined(&["C"]);
        assert_eq!(
            session.begin_drag(TileId::new("ghost")),
            Err(ActionError::UnknownTile(TileId::new("ghost")))
        );
        assert!(session.drag().is_none());
    }

    #[test]
    fn test_peel_gated_by_validation() {
        let mut session = joined(&["C", "A", "T"]);
        assert_eq!(session.peel(), Err(ActionError::Board(BoardError::BenchNotEmpty)));

        place(&mut session, 'C', 0, 0);
        place(&mut session, 'A', 0, 1);
        place(&mut session, 'T', 5, 5);
        assert_eq!(session.peel(), Err(ActionError::Board(BoardError::Disconnected)));
        session.take_outgoing();

        let t = session.board().tile_at(5, 5).unwrap().id.clone();
        session.begin_drag(t).unwrap();
        session.drop_on_cell(0, 2).unwrap();
        session.take_outgoing();

        session.peel().unwrap();
        assert_eq!(session.take_outgoing(), vec![ClientEvent::Peel { name: "1234".into() }]);
    }

    #[test]
    fn test_bananagrams_sends_words() {
        let mut session = joined(&["C", "A", "T"]);
        place(&mut session, 'C', 0, 0);
        place(&mut session, 'A', 0, 1);
        place(&mut session, 'T', 0, 2);
        session.take_outgoing();

        assert_eq!(session.words(), vec!["CAT".to_string()]);
        assert!(session.validate().valid);
        let words = session.bananagrams().unwrap();
        assert_eq!(words, vec!["CAT".to_string()]);
        assert_eq!(
            session.take_outgoing(),
            vec![ClientEvent::Bananagrams {
                name: "1234".into(),
                player_id: "alice".into(),
                words: vec!["CAT".into()],
            }]
        );
    }

    #[test]
    fn test_swap() {
        let mut session = joined(&["C", "A"]);
        let c = place(&mut session, 'C', 1, 1);
        session.take_outgoing();

        assert_eq!(session.swap(&c), Ok('C'));
        assert!(session.board().is_empty());
        assert!(session.tiles().find(&c).is_none());
        assert_eq!(
            session.take_outgoing(),
            vec![ClientEvent::Swap {
                name: "1234".into(),
                player_id: "alice".into(),
                letter: "C".into(),
            }]
        );
        assert_eq!(
            session.swap(&TileId::new("ghost")),
            Err(ActionError::UnknownTile(TileId::new("ghost")))
        );
    }

    #[test]
    fn test_swap_needs_full_bag() {
        let mut session = joined(&["C"]);
        session.handle_event(ServerEvent::GameState(snapshot(&["C"], 2)));
        let c = bench_id(&session, 'C');
        assert_eq!(session.swap(&c), Err(ActionError::BagTooSmall(2)));
        assert_eq!(session.bench().len(), 1);
    }

    #[test]
    fn test_snapshot_keeps_placed_tiles() {
        let mut session = joined(&["C", "A"]);
        let c = place(&mut session, 'C', 3, 3);

        // Peel dealt one more letter
        session.handle_event(ServerEvent::GameState(snapshot(&["C", "A", "E"], 40)));
        assert_eq!(session.tiles().len(), 3);
        assert_eq!(session.board().position_of(&c), Some(Position::new(3, 3)));
        assert_eq!(session.bench().len(), 2);
        assert_eq!(session.game().tiles_remaining(), 40);
    }

    #[test]
    fn test_snapshot_retires_board_tiles() {
        let mut session = joined(&["C", "A"]);
        let c = place(&mut session, 'C', 3, 3);
        session.select(c.clone());

        session.handle_event(ServerEvent::GameState(snapshot(&["A"], 40)));
        assert!(session.board().is_empty());
        assert!(session.tiles().find(&c).is_none());
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_render_game_envelopes() {
        let mut session = GameSession::new("alice", 10);
        let payload = serde_json::to_string(&snapshot(&["Z"], 10)).unwrap();
        session.handle_event(ServerEvent::RenderGame(RenderGame {
            status_code: 200,
            message: "ok".into(),
            payload: Some(payload),
        }));
        assert_eq!(session.game_id(), "1234");
        assert_eq!(session.bench().len(), 1);

        session.handle_event(ServerEvent::RenderGame(RenderGame {
            status_code: 400,
            message: "Game is full".into(),
            payload: None,
        }));
        assert_eq!(session.game().last_error(), Some("Game is full"));
    }

    #[test]
    fn test_player_tiles_replace_and_sync_board() {
        let mut session = joined(&["C", "A"]);
        let c = place(&mut session, 'C', 0, 0);

        let mut kept = session.tiles().find(&c).unwrap().clone();
        kept.on_board = false;
        session.handle_event(ServerEvent::PlayerTiles(vec![kept, Tile::new("srv-1", 'X')]));

        assert_eq!(session.tiles().len(), 2);
        // Still on the board, so the flag is restored
        assert!(session.tiles().find(&c).unwrap().on_board);
        assert_eq!(session.bench().len(), 1);
    }

    #[test]
    fn test_tile_update_merges() {
        let mut session = joined(&["C"]);
        let c = bench_id(&session, 'C');
        session.handle_event(ServerEvent::TileUpdate(vec![
            Tile::new(c.clone(), 'C'),
            Tile::new("srv-2", 'Y'),
        ]));
        assert_eq!(session.tiles().len(), 2);
    }

    #[test]
    fn test_tile_update_flagged_on_board_goes_to_bench() {
        let mut session = joined(&["C"]);
        place(&mut session, 'C', 0, 0);
        assert!(session.validate().valid);

        let mut incoming = Tile::new("srv-9", 'Z');
        incoming.on_board = true;
        session.handle_event(ServerEvent::TileUpdate(vec![incoming]));

        let z = TileId::new("srv-9");
        assert!(session.board().position_of(&z).is_none());
        assert_eq!(session.bench().len(), 1);
        assert!(!session.validate().valid);
    }

    #[test]
    fn test_game_over_and_error() {
        let mut session = joined(&["C"]);
        session.handle_event(ServerEvent::Error("bad move".into()));
        assert_eq!(session.game().last_error(), Some("bad move"));

        session.handle_event(ServerEvent::GameOver {
            winner: "bob".into(),
            words: vec![WinningWord { word: "QI".into(), valid: None }],
        });
        assert!(session.game().is_over());
        assert_eq!(session.game().winner(), Some("bob"));
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut session = joined(&["C", "A", "T"]);
        place(&mut session, 'C', 0, 0);
        session.select_all();
        assert_eq!(session.selection().len(), 3);
        let first = session.tiles().tiles()[0].id.clone();
        assert!(!session.toggle_selection(first));
        session.clear_selection();
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_reset_clears_local_state() {
        let mut session = joined(&["C", "A"]);
        place(&mut session, 'C', 0, 0);
        session.take_outgoing();

        session.reset().unwrap();
        assert_eq!(session.take_outgoing(), vec![ClientEvent::Reset { name: "1234".into() }]);
        assert!(session.board().is_empty());
        assert!(session.tiles().is_empty());
        assert_eq!(session.game_id(), "1234");
        assert_eq!(session.game().status(), GameStatus::Idle);
    }

    #[test]
    fn test_lobby_and_review_commands() {
        let mut session = joined(&[]);
        session.start().unwrap();
        session.split().unwrap();
        session.continue_game().unwrap();
        session.validate_words(vec!["CAT".into()]).unwrap();
        let names: Vec<&str> = session.take_outgoing().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["start_game", "split", "continue_game", "validate_words"]);
    }
}
