//! Letter tiles and grid positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, stable identifier of a tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    /// Wrap an existing identifier (e.g. one assigned by the server).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for a locally dealt tile.
    pub fn generate(owner: &str) -> Self {
        Self(format!("{}-{}", owner, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single letter tile held by the local player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Always stored uppercase.
    #[serde(with = "letter_serde")]
    pub letter: char,
    /// True iff the tile currently occupies a board cell.
    #[serde(default, rename = "onBoard")]
    pub on_board: bool,
}

impl Tile {
    /// Create a bench tile.
    pub fn new(id: impl Into<TileId>, letter: char) -> Self {
        Self {
            id: id.into(),
            letter: letter.to_ascii_uppercase(),
            on_board: false,
        }
    }

    /// Create a bench tile with a freshly generated id.
    pub fn dealt(owner: &str, letter: char) -> Self {
        Self::new(TileId::generate(owner), letter)
    }
}

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Translate by a row/column offset.
    pub const fn offset(self, rows: i32, cols: i32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }

    /// Translate by an offset, or `None` if a coordinate would overflow.
    pub fn checked_offset(self, rows: i32, cols: i32) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add(rows)?,
            col: self.col.checked_add(cols)?,
        })
    }

    /// The four orthogonal neighbours.
    pub fn neighbors(self) -> [Position; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Letters travel as one-character strings on the wire.
mod letter_serde {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(letter: &char, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 4];
        serializer.serialize_str(letter.encode_utf8(&mut buf))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<char, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c.to_ascii_uppercase()),
            _ => Err(D::Error::custom(format!("expected a single letter, got {:?}", s))),
        }
    }
}
