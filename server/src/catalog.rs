use crate::error::CatalogError;
use rand::Rng;
use shared::Song;
use std::path::PathBuf;
use std::sync::Arc;

/// A non-empty, read-only list of songs.
///
/// Construction is the only place emptiness and record validity are
/// checked, so selecting from a `Catalog` cannot fail.
#[derive(Debug, Clone)]
pub struct Catalog {
    songs: Arc<[Song]>,
}

impl Catalog {
    pub fn new(songs: Vec<Song>) -> Result<Self, CatalogError> {
        if songs.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, song) in songs.iter().enumerate() {
            song.validate()
                .map_err(|source| CatalogError::InvalidRecord { index, source })?;
        }
        Ok(Self {
            songs: songs.into(),
        })
    }

    /// Parse a JSON array of song records
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let songs: Vec<Song> = serde_json::from_slice(bytes)?;
        Self::new(songs)
    }

    /// Pick one song, each with probability 1/len
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &Song {
        let index = rng.gen_range(0..self.songs.len());
        &self.songs[index]
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true once constructed
        self.songs.is_empty()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }
}

/// Where the random-song endpoint gets its catalog from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Fixed list built once at startup
    InMemory(Catalog),

    /// JSON file re-read on every request
    File(PathBuf),
}

impl CatalogSource {
    pub fn builtin() -> Self {
        CatalogSource::InMemory(builtin_catalog())
    }

    pub async fn load(&self) -> Result<Catalog, CatalogError> {
        match self {
            CatalogSource::InMemory(catalog) => Ok(catalog.clone()),
            CatalogSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| CatalogError::from_io(e, path.clone()))?;
                let catalog = Catalog::from_json(&bytes)?;
                tracing::debug!("Loaded {} songs from {}", catalog.len(), path.display());
                Ok(catalog)
            }
        }
    }
}

const BUILTIN_SONGS: &[(&str, &str, &str)] = &[
    ("Queen", "Bohemian Rhapsody", "https://www.youtube.com/watch?v=fJ9rUzIMcZQ"),
    ("Led Zeppelin", "Stairway to Heaven", "https://www.youtube.com/watch?v=QkF3oxziUI4"),
    ("The Beatles", "Hey Jude", "https://www.youtube.com/watch?v=A_MjCqQoLLA"),
    ("Nirvana", "Smells Like Teen Spirit", "https://www.youtube.com/watch?v=hTWKbfoikeg"),
    ("Michael Jackson", "Billie Jean", "https://www.youtube.com/watch?v=Zi_XLOBDo_Y"),
    ("Eagles", "Hotel California", "https://www.youtube.com/watch?v=09839DpTctU"),
    ("John Lennon", "Imagine", "https://www.youtube.com/watch?v=YkgkThdzX-8"),
    ("Guns N' Roses", "Sweet Child O' Mine", "https://www.youtube.com/watch?v=1w7OgIMMRc4"),
    ("Bob Dylan", "Like a Rolling Stone", "https://www.youtube.com/watch?v=IwOfCgkyEj0"),
    ("Pink Floyd", "Comfortably Numb", "https://www.youtube.com/watch?v=_FrOQC-zEog"),
];

/// The in-process catalog used when no data file is configured
pub fn builtin_catalog() -> Catalog {
    let songs = BUILTIN_SONGS
        .iter()
        .map(|&(artist, song, link)| Song::new(artist, song).with_youtube_link(link))
        .collect::<Vec<_>>();

    Catalog {
        songs: songs.into(),
    }
}
