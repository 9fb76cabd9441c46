//! peelgrid Core Library
//!
//! Platform-agnostic client model for a Bananagrams-style word game: the
//! player's board and bench, drag-and-drop move planning, local validation,
//! and the socket.io transport to the game server.

pub mod board;
pub mod config;
pub mod drag;
pub mod game;
pub mod player;
pub mod protocol;
pub mod selection;
pub mod session;
pub mod storage;
pub mod sync;
pub mod tile;
pub mod validation;
pub mod words;

#[cfg(not(target_arch = "wasm32"))]
pub mod api;

#[cfg(not(target_arch = "wasm32"))]
pub use api::{ApiClient, ApiError};
pub use board::{Board, BoardBounds, DEFAULT_BOARD_SIZE};
pub use config::{ClientConfig, ConfigError};
pub use drag::{Committed, DragContext, DragSource, MovePlanner, MoveRejection};
pub use game::{GameSnapshot, GameState, GameStatus, PlayerSummary, WinningWord};
pub use player::PlayerTiles;
pub use protocol::{ClientEvent, ProtocolError, ServerEvent};
pub use selection::Selection;
pub use session::{ActionError, GameSession};
pub use storage::{IdentityManager, SavedIdentity, StorageError};
pub use sync::{ConnectionState, PlatformWebSocket, SyncError, SyncEvent};
pub use tile::{Position, Tile, TileId};
pub use validation::{BoardError, BoardValidation, InputError, validate_board};
pub use words::extract_words;
