use anyhow::{Context, Result};
use shared::ResponseShape;
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which catalog backs `/random_song`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Built-in list, loaded once
    Memory,
    /// `data_file`, read on every request
    File,
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SourceKind::Memory),
            "file" => Ok(SourceKind::File),
            other => anyhow::bail!(
                "unknown catalog source '{}' (expected 'file' or 'memory')",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
    pub source: SourceKind,
    pub data_file: PathBuf,
    pub shape: ResponseShape,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            static_dir: crate_dir.join("static"),
            source: SourceKind::File,
            data_file: crate_dir.join("data").join("mock_songs.json"),
            shape: ResponseShape::Flat,
        }
    }
}

impl ServerConfig {
    /// Defaults, with optional operator overrides from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(bind) = lookup("SONGS_BIND") {
            config.bind = bind
                .parse::<SocketAddr>()
                .with_context(|| format!("Invalid SONGS_BIND address: {}", bind))?;
        }
        if let Some(dir) = lookup("SONGS_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("SONGS_DATA_FILE") {
            config.data_file = PathBuf::from(file);
        }
        if let Some(source) = lookup("SONGS_SOURCE") {
            config.source = source.parse::<SourceKind>().context("Invalid SONGS_SOURCE")?;
        }
        if let Some(shape) = lookup("SONGS_RESPONSE_SHAPE") {
            config.shape = shape
                .parse::<ResponseShape>()
                .context("Invalid SONGS_RESPONSE_SHAPE")?;
        }

        Ok(config)
    }
}
