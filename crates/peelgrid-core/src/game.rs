//! Read-only mirror of the server's game state.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Coarse game phase as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    /// Waiting for players to join.
    #[default]
    Idle,
    /// Tiles dealt but not yet revealed.
    Hidden,
    /// Peels allowed.
    Active,
    /// Bag too small for a full peel; play continues.
    Endgame,
    Over,
}

/// A word from a win claim with the server's verdict, if one was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WinningWordRepr", into = "WinningWordRepr")]
pub struct WinningWord {
    pub word: String,
    pub valid: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WinningWordRepr {
    Checked(String, bool),
    Plain(String),
}

impl From<WinningWordRepr> for WinningWord {
    fn from(repr: WinningWordRepr) -> Self {
        match repr {
            WinningWordRepr::Checked(word, valid) => Self { word, valid: Some(valid) },
            WinningWordRepr::Plain(word) => Self { word, valid: None },
        }
    }
}

impl From<WinningWord> for WinningWordRepr {
    fn from(w: WinningWord) -> Self {
        match w.valid {
            Some(valid) => WinningWordRepr::Checked(w.word, valid),
            None => WinningWordRepr::Plain(w.word),
        }
    }
}

/// Full authoritative state as carried by a snapshot message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    /// Player id to that player's letters.
    #[serde(default)]
    pub players: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub state: GameStatus,
    #[serde(default)]
    pub num_players: Option<u32>,
    #[serde(default)]
    pub tiles_remaining: Option<u32>,
    #[serde(default, alias = "winner")]
    pub winning_player: Option<String>,
    #[serde(default, alias = "winningWords")]
    pub winning_words: Option<Vec<WinningWord>>,
}

impl GameSnapshot {
    /// The letters dealt to one player, first character of each entry.
    pub fn letters_for(&self, player_id: &str) -> Option<Vec<char>> {
        self.players.get(player_id).map(|letters| {
            letters
                .iter()
                .filter_map(|l| l.chars().next())
                .map(|c| c.to_ascii_uppercase())
                .collect()
        })
    }
}

/// What a client knows about another player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    pub ready: bool,
    pub tile_count: usize,
}

/// Client-side mirror of the last known game state.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    game_id: String,
    snapshot: Option<GameSnapshot>,
    last_error: Option<String>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn set_game_id(&mut self, id: impl Into<String>) {
        self.game_id = id.into();
    }

    pub fn snapshot(&self) -> Option<&GameSnapshot> {
        self.snapshot.as_ref()
    }

    /// Replace the mirror with a fresh snapshot.
    pub fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        if self.game_id.is_empty() && !snapshot.id.is_empty() {
            self.game_id = snapshot.id.clone();
        }
        self.last_error = None;
        self.snapshot = Some(snapshot);
    }

    /// Record the end of the game announced outside a full snapshot.
    pub fn finish(&mut self, winner: String, words: Vec<WinningWord>) {
        let snapshot = self.snapshot.get_or_insert_with(GameSnapshot::default);
        snapshot.state = GameStatus::Over;
        snapshot.winning_player = Some(winner);
        snapshot.winning_words = Some(words);
    }

    pub fn set_error(&mut self, message: Option<String>) {
        self.last_error = message;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status(&self) -> GameStatus {
        self.snapshot.as_ref().map(|s| s.state).unwrap_or_default()
    }

    pub fn players(&self) -> Vec<PlayerSummary> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        snapshot
            .players
            .iter()
            .map(|(id, tiles)| PlayerSummary {
                id: id.clone(),
                // Player ids double as display names.
                name: id.clone(),
                ready: snapshot.state != GameStatus::Idle,
                tile_count: tiles.len(),
            })
            .collect()
    }

    pub fn tiles_remaining(&self) -> u32 {
        self.snapshot
            .as_ref()
            .and_then(|s| s.tiles_remaining)
            .unwrap_or(0)
    }

    pub fn winner(&self) -> Option<&str> {
        self.snapshot.as_ref()?.winning_player.as_deref()
    }

    pub fn winning_words(&self) -> &[WinningWord] {
        self.snapshot
            .as_ref()
            .and_then(|s| s.winning_words.as_deref())
            .unwrap_or(&[])
    }

    pub fn is_active(&self) -> bool {
        self.status() == GameStatus::Active
    }

    pub fn is_endgame(&self) -> bool {
        self.status() == GameStatus::Endgame
    }

    pub fn is_over(&self) -> bool {
        self.status() == GameStatus::Over
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Game ids arrive as either JSON strings or numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
        Missing(()),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
        Id::Missing(()) => String::new(),
    })
}
