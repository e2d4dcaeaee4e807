use anyhow::{Context, Result};
use serde_json::Value;
use shared::{ErrorBody, Song, YOUTUBE_WATCH};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Keys a flat song record must carry, and no others
const REQUIRED_FIELDS: [&str; 3] = ["artist", "song", "youtube_link"];

pub struct Probe {
    server_url: String,
    http_client: reqwest::Client,
}

/// Outcome of a randomness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomnessReport {
    pub calls: usize,
    pub unique: usize,
    pub most_frequent: usize,
}

impl Probe {
    pub fn new(server_url: &str) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Poll `/api/hello` until the server answers 200
    pub async fn wait_until_ready(&self, retries: u32, delay: Duration) -> Result<()> {
        let url = format!("{}/api/hello", self.server_url);

        for attempt in 1..=retries {
            match self.http_client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!("Server is up at {}", self.server_url);
                    return Ok(());
                }
                Ok(response) => {
                    tracing::debug!("Attempt {}: status {}", attempt, response.status())
                }
                Err(e) => tracing::debug!("Attempt {}: {}", attempt, e),
            }
            tokio::time::sleep(delay).await;
        }

        anyhow::bail!("Server at {} did not become ready", self.server_url)
    }

    /// Fetch one random song, checking the body's structure before decoding it
    pub async fn random_song(&self) -> Result<Song> {
        let url = format!("{}/random_song", self.server_url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to call {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            if let Ok(error) = response.json::<ErrorBody>().await {
                anyhow::bail!("Server returned {}: {}", status, error.error);
            }
            anyhow::bail!("Request failed with status: {}", status);
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse random song response")?;

        song_from_body(body)
    }

    /// Every response must be a complete, valid record
    pub async fn check_consistency(&self, calls: usize) -> Result<()> {
        for i in 0..calls {
            self.random_song()
                .await
                .with_context(|| format!("Consistency check {}/{} failed", i + 1, calls))?;
        }
        Ok(())
    }

    /// Call the endpoint `calls` times and fail if every answer was the same
    pub async fn check_randomness(&self, calls: usize) -> Result<RandomnessReport> {
        let mut songs = Vec::with_capacity(calls);
        for _ in 0..calls {
            let song = self.random_song().await?;
            tracing::info!("Got: {}", song);
            songs.push(song);
        }

        let report = tally(&songs);
        report.verdict()?;
        Ok(report)
    }
}

impl RandomnessReport {
    /// Several calls that all returned one song point at a broken selector
    pub fn verdict(&self) -> Result<()> {
        if self.calls > 1 && self.unique == 1 {
            anyhow::bail!(
                "All {} calls returned the same song; selection is not random",
                self.calls
            );
        }
        Ok(())
    }
}

/// Pull the record out of a flat or wrapped body and decode it
pub fn song_from_body(body: Value) -> Result<Song> {
    let record = match body {
        Value::Object(mut map) if map.contains_key("status") => {
            if map.get("status").and_then(Value::as_str) != Some("success") {
                anyhow::bail!("Wrapped response status is not 'success'");
            }
            map.remove("song").context("Wrapped response has no song")?
        }
        other => other,
    };

    validate_structure(&record)?;
    let song: Song = serde_json::from_value(record).context("Failed to decode song record")?;
    Ok(song)
}

/// Exactly `artist`, `song` and `youtube_link`, all non-blank strings, with a watch link
pub fn validate_structure(record: &Value) -> Result<()> {
    let map = record.as_object().context("Song record is not a JSON object")?;

    let keys: BTreeSet<&str> = map.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = REQUIRED_FIELDS.iter().copied().collect();
    if keys != expected {
        anyhow::bail!("Expected fields {:?}, got {:?}", expected, keys);
    }

    for (field, value) in map {
        match value.as_str() {
            Some(text) if !text.trim().is_empty() => {}
            _ => anyhow::bail!("Field '{}' should be a non-empty string, got: {}", field, value),
        }
    }

    let link = map
        .get("youtube_link")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !link.contains(YOUTUBE_WATCH) {
        anyhow::bail!("Invalid YouTube link format: {}", link);
    }

    Ok(())
}

fn tally(songs: &[Song]) -> RandomnessReport {
    let mut counts: HashMap<&Song, usize> = HashMap::new();
    for song in songs {
        *counts.entry(song).or_default() += 1;
    }

    RandomnessReport {
        calls: songs.len(),
        unique: counts.len(),
        most_frequent: counts.values().copied().max().unwrap_or(0),
    }
}

/// Wait for the server, then run the consistency and randomness checks
pub async fn run(server_url: &str) -> Result<()> {
    let probe = Probe::new(server_url)?;

    probe
        .wait_until_ready(20, Duration::from_millis(500))
        .await?;

    probe.check_consistency(3).await?;
    tracing::info!("Consistency check passed");

    let report = probe.check_randomness(5).await?;
    tracing::info!(
        "Randomness check passed: {} different songs out of {} calls (most frequent: {})",
        report.unique,
        report.calls,
        report.most_frequent
    );

    Ok(())
}
