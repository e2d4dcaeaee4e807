use serde::{Deserialize, Serialize};
use std::fmt;

/// Substring every YouTube link in the catalog must carry
pub const YOUTUBE_WATCH: &str = "youtube.com/watch";

/// A single entry of the song catalog.
///
/// Only `artist` and `song` are required. Optional metadata is skipped
/// when absent, so a record loaded with exactly `artist`, `song` and
/// `youtube_link` serializes back to exactly those three keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Song {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub artist: String,

    /// Song title (older data files call this `title`)
    #[serde(alias = "title")]
    pub song: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_link: Option<String>,
}

/// Release year, stored either as a number or as free text ("1975", "c. 1969")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SongError {
    #[error("artist must be a non-empty string")]
    EmptyArtist,

    #[error("song title must be a non-empty string")]
    EmptyTitle,

    #[error("invalid YouTube link format: {0}")]
    InvalidYoutubeLink(String),
}

impl Song {
    pub fn new(artist: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            id: None,
            artist: artist.into(),
            song: song.into(),
            album: None,
            year: None,
            genre: None,
            youtube_link: None,
        }
    }

    pub fn with_youtube_link(mut self, link: impl Into<String>) -> Self {
        self.youtube_link = Some(link.into());
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Check the catalog invariants for this record
    pub fn validate(&self) -> Result<(), SongError> {
        if self.artist.trim().is_empty() {
            return Err(SongError::EmptyArtist);
        }
        if self.song.trim().is_empty() {
            return Err(SongError::EmptyTitle);
        }
        if let Some(link) = &self.youtube_link {
            if !link.contains(YOUTUBE_WATCH) {
                return Err(SongError::InvalidYoutubeLink(link.clone()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.song)
    }
}
