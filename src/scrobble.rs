//! Scrobble records and history loading.
//!
//! A history is always ordered most recent first, which is how listening
//! services page it out. The earliest scrobble is therefore the *last*
//! element; the window policies rely on that, so every entry point that
//! accepts a history checks it with [`ensure_recent_first`].

use anyhow::{bail, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One recorded play event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scrobble {
    pub artist: String,
    pub track: String,
    /// Empty when the album is unknown.
    #[serde(default)]
    pub album: String,
    /// Seconds since the Unix epoch, UTC.
    pub timestamp: i64,
}

impl Scrobble {
    pub fn new(artist: &str, track: &str, album: &str, timestamp: i64) -> Self {
        Self {
            artist: artist.to_string(),
            track: track.to_string(),
            album: album.to_string(),
            timestamp,
        }
    }
}

/// A scrobble paired with its resolved play length in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedScrobble {
    pub scrobble: Scrobble,
    pub length: u32,
}

impl TimedScrobble {
    pub fn new(scrobble: Scrobble, length: u32) -> Self {
        Self { scrobble, length }
    }

    pub fn timestamp(&self) -> i64 {
        self.scrobble.timestamp
    }

    pub fn artist(&self) -> &str {
        &self.scrobble.artist
    }
}

/// Checks that timestamps never increase from one element to the next.
///
/// Equal timestamps are allowed, as services happily record two plays in the
/// same second.
///
/// # Errors
///
/// Returns the position of the first out-of-order pair.
pub fn ensure_recent_first<I>(timestamps: I) -> Result<()>
where
    I: IntoIterator<Item = i64>,
{
    let mut previous: Option<i64> = None;
    for (index, ts) in timestamps.into_iter().enumerate() {
        if let Some(prev) = previous {
            if ts > prev {
                bail!(
                    "History must be ordered most recent first, but entry {index} ({ts}) \
                     is newer than entry {} ({prev})",
                    index - 1
                );
            }
        }
        previous = Some(ts);
    }
    Ok(())
}

/// Reads a JSON array of scrobbles from `path` and validates its ordering.
///
/// # Errors
///
/// Fails if the file cannot be read, is not valid JSON, or is not ordered
/// most recent first.
pub fn load_history(path: &Path) -> Result<Vec<Scrobble>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    let history: Vec<Scrobble> = serde_json::from_str(&raw)
        .with_context(|| format!("History file {} is not a JSON scrobble list", path.display()))?;

    ensure_recent_first(history.iter().map(|s| s.timestamp))
        .with_context(|| format!("Invalid history in {}", path.display()))?;

    debug!("Loaded {} scrobbles from {}", history.len(), path.display());
    Ok(history)
}
