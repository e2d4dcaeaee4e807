use crate::Song;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message carried by a wrapped random-song response
pub const SELECTED_MESSAGE: &str = "Random song selected successfully";

/// Outcome marker used by the wrapped and hello payloads
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Server -> Client: `GET /api/hello`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HelloResponse {
    pub message: String,
    pub status: Status,
    pub api_version: String,
}

impl Default for HelloResponse {
    fn default() -> Self {
        Self {
            message: "Hello from Flask!".to_string(),
            status: Status::Success,
            api_version: API_VERSION.to_string(),
        }
    }
}

/// Version string reported by the hello endpoint
pub const API_VERSION: &str = "1.0";

/// Server -> Client: random song in the wrapped layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WrappedSong {
    pub song: Song,
    pub status: Status,
    pub message: String,
}

impl WrappedSong {
    pub fn new(song: Song) -> Self {
        Self {
            song,
            status: Status::Success,
            message: SELECTED_MESSAGE.to_string(),
        }
    }
}

/// Server -> Client: body of a successful `GET /random_song`.
///
/// Untagged so a client can read whichever layout the server is
/// configured with. `Wrapped` is tried first because a flat record never
/// carries a `status` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RandomSongResponse {
    Wrapped(WrappedSong),
    Flat(Song),
}

impl RandomSongResponse {
    pub fn song(&self) -> &Song {
        match self {
            RandomSongResponse::Wrapped(wrapped) => &wrapped.song,
            RandomSongResponse::Flat(song) => song,
        }
    }

    pub fn into_song(self) -> Song {
        match self {
            RandomSongResponse::Wrapped(wrapped) => wrapped.song,
            RandomSongResponse::Flat(song) => song,
        }
    }
}

/// Server -> Client: error body, `{"error": ...}` or `{"error": ..., "status": "error"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Which JSON layout the random-song endpoint speaks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Record fields at the top level, errors as `{"error"}`
    #[default]
    Flat,
    /// `{"song", "status", "message"}`, errors as `{"error", "status"}`
    Wrapped,
}

impl ResponseShape {
    pub fn song(self, song: Song) -> RandomSongResponse {
        match self {
            ResponseShape::Flat => RandomSongResponse::Flat(song),
            ResponseShape::Wrapped => RandomSongResponse::Wrapped(WrappedSong::new(song)),
        }
    }

    pub fn error(self, message: impl Into<String>) -> ErrorBody {
        ErrorBody {
            error: message.into(),
            status: match self {
                ResponseShape::Flat => None,
                ResponseShape::Wrapped => Some(Status::Error),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown response shape '{0}' (expected 'flat' or 'wrapped')")]
pub struct UnknownShape(pub String);

impl FromStr for ResponseShape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(ResponseShape::Flat),
            "wrapped" => Ok(ResponseShape::Wrapped),
            _ => Err(UnknownShape(s.to_string())),
        }
    }
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseShape::Flat => f.write_str("flat"),
            ResponseShape::Wrapped => f.write_str("wrapped"),
        }
    }
}
