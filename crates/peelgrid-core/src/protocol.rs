//! Game events and their socket.io v4 wire framing.
//!
//! Every frame is an Engine.IO packet. Game traffic travels in Engine.IO
//! `message` packets carrying a Socket.IO packet, e.g.
//! `42["place_tile",{"game_id":"1234","tile_id":"p-1","row":3,"col":4}]`.

use crate::game::{GameSnapshot, WinningWord};
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Socket.IO namespace connect, sent once the Engine.IO handshake is in.
pub const CONNECT_FRAME: &str = "40";
/// Engine.IO pong, the answer to every server ping.
pub const PONG_FRAME: &str = "3";

/// Events sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Join the socket room for a game.
    Join { name: String },
    /// Load the game, creating it if needed.
    LoadGame { name: String, test_mode: bool },
    PlayerJoin { name: String, player_id: String },
    /// Create a game with a small bag and join it.
    CreateTestGame { name: String, player_id: String },
    StartGame { name: String },
    Split { name: String },
    PlaceTile {
        game_id: String,
        tile_id: String,
        row: i32,
        col: i32,
    },
    MoveTile {
        game_id: String,
        from_row: i32,
        from_col: i32,
        to_row: i32,
        to_col: i32,
    },
    RemoveTile {
        game_id: String,
        tile_id: String,
        row: i32,
        col: i32,
    },
    /// Trade one letter back into the bag for three.
    Swap {
        name: String,
        player_id: String,
        letter: String,
    },
    Peel { name: String },
    /// Claim the win with the words on the board.
    Bananagrams {
        name: String,
        player_id: String,
        words: Vec<String>,
    },
    ContinueGame { name: String },
    ValidateWords {
        game_id: String,
        player_id: String,
        valid_words: Vec<String>,
    },
    Reset { name: String },
}

impl ClientEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::LoadGame { .. } => "load_game",
            Self::PlayerJoin { .. } => "player_join",
            Self::CreateTestGame { .. } => "create_test_game",
            Self::StartGame { .. } => "start_game",
            Self::Split { .. } => "split",
            Self::PlaceTile { .. } => "place_tile",
            Self::MoveTile { .. } => "move_tile",
            Self::RemoveTile { .. } => "remove_tile",
            Self::Swap { .. } => "swap",
            Self::Peel { .. } => "peel",
            Self::Bananagrams { .. } => "bananagrams",
            Self::ContinueGame { .. } => "continue_game",
            Self::ValidateWords { .. } => "validate_words",
            Self::Reset { .. } => "reset",
        }
    }

    /// Encode as a Socket.IO event frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let tagged = serde_json::to_value(self)?;
        let data = tagged.get("data").cloned().unwrap_or(Value::Null);
        let array = Value::Array(vec![Value::String(self.name().to_string()), data]);
        Ok(format!("42{}", array))
    }
}

/// Envelope of the `render_game` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RenderGame {
    pub status_code: u16,
    #[serde(default)]
    pub message: String,
    /// Game state as a JSON document inside a string.
    #[serde(default)]
    pub payload: Option<String>,
}

impl RenderGame {
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }

    /// Parse the embedded game state, if this envelope carries one.
    pub fn snapshot(&self) -> Result<Option<GameSnapshot>, ProtocolError> {
        match (&self.payload, self.is_ok()) {
            (Some(payload), true) if !payload.is_empty() => Ok(Some(serde_json::from_str(payload)?)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TileList {
    #[serde(default)]
    tiles: Vec<Tile>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GameOverBody {
    #[serde(default)]
    winner: String,
    #[serde(default)]
    words: Vec<WinningWord>,
}

/// Events received from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    RenderGame(RenderGame),
    GameState(GameSnapshot),
    /// Full replacement of the local player's tiles.
    PlayerTiles(Vec<Tile>),
    /// Tiles to merge by id.
    TileUpdate(Vec<Tile>),
    Error(String),
    GameOver { winner: String, words: Vec<WinningWord> },
}

impl ServerEvent {
    /// Build an event from its wire name and JSON body.
    pub fn from_parts(name: &str, body: Value) -> Result<Self, ProtocolError> {
        Ok(match name {
            "render_game" => Self::RenderGame(serde_json::from_value(body)?),
            "game_state" => Self::GameState(serde_json::from_value(body)?),
            "player_tiles" => Self::PlayerTiles(serde_json::from_value::<TileList>(body)?.tiles),
            "tile_update" => Self::TileUpdate(serde_json::from_value::<TileList>(body)?.tiles),
            "error" => Self::Error(serde_json::from_value::<ErrorBody>(body)?.message),
            "game_over" => {
                let GameOverBody { winner, words } = serde_json::from_value(body)?;
                Self::GameOver { winner, words }
            }
            other => return Err(ProtocolError::UnknownEvent(other.to_string())),
        })
    }
}

/// A decoded Engine.IO frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO handshake; the body holds the session parameters.
    Open(Value),
    Close,
    Ping,
    Pong,
    /// Namespace connect acknowledged.
    Connected,
    Disconnected,
    ConnectError(String),
    Event(ServerEvent),
    /// Packet types this client has no use for (upgrade, noop, acks).
    Ignored,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Empty frame")]
    Empty,
    #[error("Unknown packet type in frame: {0}")]
    UnknownPacket(String),
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
    #[error("Malformed event frame: {0}")]
    Malformed(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a single text frame received from the socket.
pub fn decode_frame(frame: &str) -> Result<Packet, ProtocolError> {
    let mut chars = frame.chars();
    let engine = chars.next().ok_or(ProtocolError::Empty)?;
    let rest = chars.as_str();

    match engine {
        '0' => Ok(Packet::Open(if rest.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(rest)?
        })),
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_socket_packet(rest),
        '5' | '6' => Ok(Packet::Ignored),
        _ => Err(ProtocolError::UnknownPacket(frame.to_string())),
    }
}

fn decode_socket_packet(packet: &str) -> Result<Packet, ProtocolError> {
    let mut chars = packet.chars();
    let kind = chars.next().ok_or(ProtocolError::Empty)?;
    let body = strip_namespace(chars.as_str());

    match kind {
        '0' => Ok(Packet::Connected),
        '1' => Ok(Packet::Disconnected),
        '2' => {
            let array: Vec<Value> = serde_json::from_str(strip_ack_id(body))?;
            let mut parts = array.into_iter();
            let name = match parts.next() {
                Some(Value::String(name)) => name,
                _ => return Err(ProtocolError::Malformed(packet.to_string())),
            };
            let payload = parts.next().unwrap_or(Value::Null);
            Ok(Packet::Event(ServerEvent::from_parts(&name, payload)?))
        }
        '3' => Ok(Packet::Ignored),
        '4' => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.to_string());
            Ok(Packet::ConnectError(message))
        }
        _ => Err(ProtocolError::UnknownPacket(packet.to_string())),
    }
}

/// Drop a leading `/nsp,` prefix if the packet targets a namespace.
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(comma) => &body[comma + 1..],
            None => "",
        }
    } else {
        body
    }
}

/// Drop the numeric ack id that may precede an event array.
fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameStatus;

    #[test]
    fn test_encode_place_tile() {
        let event = ClientEvent::PlaceTile {
            game_id: "1234".into(),
            tile_id: "alice-1".into(),
            row: 3,
            col: 4,
        };
        assert_eq!(
            event.encode().unwrap(),
            r#"42["place_tile",{"game_id":"1234","tile_id":"alice-1","row":3,"col":4}]"#
        );
    }

    #[test]
    fn test_encode_names_match_serde() {
        let events = [
            ClientEvent::LoadGame { name: "1".into(), test_mode: false },
            ClientEvent::CreateTestGame { name: "1".into(), player_id: "p".into() },
            ClientEvent::ValidateWords {
                game_id: "1".into(),
                player_id: "p".into(),
                valid_words: vec![],
            },
        ];
        for event in events {
            let frame = event.encode().unwrap();
            assert!(frame.starts_with(&format!("42[\"{}\"", event.name())), "{}", frame);
        }
    }

    #[test]
    fn test_decode_control_frames() {
        assert_eq!(decode_frame("2").unwrap(), Packet::Ping);
        assert_eq!(decode_frame("3").unwrap(), Packet::Pong);
        assert_eq!(decode_frame("1").unwrap(), Packet::Close);
        assert_eq!(decode_frame("40").unwrap(), Packet::Connected);
        assert_eq!(decode_frame(r#"40{"sid":"abc"}"#).unwrap(), Packet::Connected);
        match decode_frame(r#"0{"sid":"x","pingInterval":25000}"#).unwrap() {
            Packet::Open(v) => assert_eq!(v["sid"], "x"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(decode_frame(""), Err(ProtocolError::Empty)));
        assert!(matches!(decode_frame("9"), Err(ProtocolError::UnknownPacket(_))));
    }

    #[test]
    fn test_decode_connect_error() {
        assert_eq!(
            decode_frame(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::ConnectError("Not authorized".into())
        );
    }

    #[test]
    fn test_decode_render_game() {
        let frame = r#"42["render_game",{"status_code":200,"message":"ok","payload":"{\"id\":\"1234\",\"state\":\"ACTIVE\",\"players\":{\"alice\":[\"A\"]}}"}]"#;
        let Packet::Event(ServerEvent::RenderGame(envelope)) = decode_frame(frame).unwrap() else {
            panic!("expected render_game");
        };
        let snapshot = envelope.snapshot().unwrap().unwrap();
        assert_eq!(snapshot.id, "1234");
        assert_eq!(snapshot.state, GameStatus::Active);
    }

    #[test]
    fn test_render_game_error_has_no_snapshot() {
        let envelope = RenderGame {
            status_code: 400,
            message: "Game is full".into(),
            payload: None,
        };
        assert!(!envelope.is_ok());
        assert!(envelope.snapshot().unwrap().is_none());
    }

    #[test]
    fn test_decode_tile_events() {
        let frame = r#"42["player_tiles",{"tiles":[{"id":"t1","letter":"a"},{"id":"t2","letter":"B","onBoard":true}]}]"#;
        let Packet::Event(ServerEvent::PlayerTiles(tiles)) = decode_frame(frame).unwrap() else {
            panic!("expected player_tiles");
        };
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].letter, 'A');
        assert!(tiles[1].on_board);

        let frame = r#"42["tile_update",{"tiles":[]}]"#;
        assert_eq!(
            decode_frame(frame).unwrap(),
            Packet::Event(ServerEvent::TileUpdate(vec![]))
        );
    }

    #[test]
    fn test_decode_game_over_and_error() {
        let frame = r#"42["game_over",{"winner":"bob","words":["CAT","TAB"]}]"#;
        let Packet::Event(ServerEvent::GameOver { winner, words }) = decode_frame(frame).unwrap() else {
            panic!("expected game_over");
        };
        assert_eq!(winner, "bob");
        assert_eq!(words[1].word, "TAB");

        assert_eq!(
            decode_frame(r#"42["error",{"message":"nope"}]"#).unwrap(),
            Packet::Event(ServerEvent::Error("nope".into()))
        );
    }

    #[test]
    fn test_decode_namespace_and_ack() {
        let frame = r#"42/game,7["error",{"message":"x"}]"#;
        assert_eq!(
            decode_frame(frame).unwrap(),
            Packet::Event(ServerEvent::Error("x".into()))
        );
    }

    #[test]
    fn test_unknown_event() {
        assert!(matches!(
            decode_frame(r#"42["mystery",{}]"#),
            Err(ProtocolError::UnknownEvent(name)) if name == "mystery"
        ));
        assert!(matches!(decode_frame(r#"42[1,2]"#), Err(ProtocolError::Malformed(_))));
    }
}
