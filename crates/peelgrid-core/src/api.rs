//! Lookups against the game server's small REST surface.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http client: {0}")]
    Client(String),
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

#[derive(Debug, Deserialize)]
struct ReservedIds {
    #[serde(default)]
    reserved_ids: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct GameNames {
    #[serde(default)]
    ids: Vec<Value>,
}

/// Blocking client for `/api/*`.
pub struct ApiClient {
    base: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    /// `base` is the server origin, e.g. `http://localhost:5000`.
    pub fn new(base: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("peelgrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Game ids that are already taken.
    pub fn reserved_game_ids(&self) -> Result<Vec<String>, ApiError> {
        let body: ReservedIds = self.get_json("/api/games/reserved")?;
        Ok(id_strings(body.reserved_ids))
    }

    /// Ids of every game the server knows about.
    pub fn game_names(&self) -> Result<Vec<String>, ApiError> {
        let body: GameNames = self.get_json("/api/get_names")?;
        Ok(id_strings(body.ids))
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base, path);
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| ApiError::Request { url: url.clone(), message: e.to_string() })?;

        if !resp.status().is_success() {
            return Err(ApiError::Status { url, status: resp.status().as_u16() });
        }

        resp.json::<T>()
            .map_err(|e| ApiError::Decode { url, message: e.to_string() })
    }
}

/// Ids come back as strings or numbers; anything else is skipped.
fn id_strings(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}
