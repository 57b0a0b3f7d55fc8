//! # Track-Length Catalog
//!
//! The catalog answers one question: which play lengths are recorded for a
//! track, given its title and optionally its artist and album. Matching is
//! approximate:
//!
//! - title and artist compare case-insensitively;
//! - album compares case-insensitively, or as a prefix of the other when both
//!   names are longer than [`ALBUM_PREFIX_MIN_CHARS`] characters, so
//!   `"Disintegration"` still finds `"Disintegration (Deluxe Edition)"`.
//!
//! [`Catalog`] is the seam the resolver talks to. [`SqliteCatalog`] is the
//! persistent store, [`MemoryCatalog`] a small in-process one.

use anyhow::{Context, Result};
use log::trace;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Albums must be strictly longer than this to match by prefix.
pub const ALBUM_PREFIX_MIN_CHARS: usize = 5;

/// A lookup against the catalog. `None` disables that constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogQuery<'a> {
    pub title: &'a str,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
}

/// Read-only source of track lengths.
pub trait Catalog {
    /// Returns the length in seconds of every row matching `query`,
    /// duplicates included.
    ///
    /// # Errors
    ///
    /// Backend failures are returned as-is; the caller does not retry.
    fn find(&self, query: &CatalogQuery<'_>) -> Result<Vec<u32>>;
}

/// One catalog row, as imported from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub artist: String,
    #[serde(default)]
    pub album: String,
    pub title: String,
    /// Seconds.
    pub length: u32,
}

impl CatalogTrack {
    pub fn new(artist: &str, album: &str, title: &str, length: u32) -> Self {
        Self {
            artist: artist.to_string(),
            album: album.to_string(),
            title: title.to_string(),
            length,
        }
    }
}

/// Lowercased form used for every comparison.
fn match_key(s: &str) -> String {
    s.to_lowercase()
}

/// Album rule on already-lowercased names.
fn album_keys_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let long_enough = a.chars().count() > ALBUM_PREFIX_MIN_CHARS
        && b.chars().count() > ALBUM_PREFIX_MIN_CHARS;
    long_enough && (a.starts_with(b) || b.starts_with(a))
}

/// Case-insensitive album comparison with the prefix rule.
#[must_use]
pub fn album_matches(a: &str, b: &str) -> bool {
    album_keys_match(&match_key(a), &match_key(b))
}

/// SQLite-backed catalog.
///
/// Match keys are lowercased in Rust on insert so non-ASCII names compare the
/// same way as in [`MemoryCatalog`]; SQLite's own `lower()` only folds ASCII.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens (creating if needed) the catalog database at `path`, along with
    /// any missing parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!(
                    "Failed to create catalog directory at {}. Please check file permissions.",
                    parent.display()
                )
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog database at {}", path.display()))?;
        let catalog = Self { conn };
        catalog.init()?;
        Ok(catalog)
    }

    /// Opens a throwaway catalog that lives only as long as the value.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory catalog")?;
        let catalog = Self { conn };
        catalog.init()?;
        Ok(catalog)
    }

    /// Creates the `track` table and its title index. Idempotent.
    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS track (
                    id         INTEGER PRIMARY KEY,
                    artist     TEXT    NOT NULL,
                    album      TEXT    NOT NULL,
                    title      TEXT    NOT NULL,
                    length     INTEGER NOT NULL,
                    artist_key TEXT    NOT NULL,
                    album_key  TEXT    NOT NULL,
                    title_key  TEXT    NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_track_title_key ON track(title_key);",
            )
            .context("Invalid SQL when creating the track table")
    }

    /// Inserts all `tracks` in a single transaction.
    pub fn insert_tracks(&mut self, tracks: &[CatalogTrack]) -> Result<()> {
        let tx = self.conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO track (artist, album, title, length, artist_key, album_key, title_key)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;

            for track in tracks {
                stmt.execute(params![
                    track.artist,
                    track.album,
                    track.title,
                    track.length,
                    match_key(&track.artist),
                    match_key(&track.album),
                    match_key(&track.title),
                ])
                .with_context(|| format!("Failed to INSERT track {track:?}"))?;
            }
        }

        tx.commit().context("Committing catalog transaction failed")?;
        Ok(())
    }

    /// Removes every row.
    pub fn clear(&self) -> Result<()> {
        self.conn
            .execute("DELETE FROM track", [])
            .context("Failed to clear the track table")?;
        Ok(())
    }

    pub fn track_count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM track", [], |row| row.get(0))
            .context("Could not count catalog entries")
    }
}

impl Catalog for SqliteCatalog {
    fn find(&self, query: &CatalogQuery<'_>) -> Result<Vec<u32>> {
        let title = match_key(query.title);
        let artist = query.artist.map(match_key);
        let album = query.album.map(match_key);

        let mut stmt = self
            .conn
            .prepare_cached(
                "SELECT length FROM track
                 WHERE title_key = ?1
                   AND (?2 IS NULL OR artist_key = ?2)
                   AND (?3 IS NULL
                        OR album_key = ?3
                        OR (length(album_key) > ?4 AND length(?3) > ?4
                            AND (substr(album_key, 1, length(?3)) = ?3
                                 OR substr(?3, 1, length(album_key)) = album_key)))",
            )
            .context("Invalid SQL when querying track lengths")?;

        let rows = stmt
            .query_map(
                params![title, artist, album, ALBUM_PREFIX_MIN_CHARS as i64],
                |row| row.get::<_, u32>(0),
            )
            .context("Cannot query track lengths")?;

        let mut lengths = Vec::new();
        for length in rows {
            lengths.push(length.context("Queried track length unwrap failed")?);
        }

        trace!("{query:?} -> {lengths:?}");
        Ok(lengths)
    }
}

/// Catalog held in a `Vec`, scanned linearly.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tracks: Vec<CatalogTrack>,
}

impl MemoryCatalog {
    pub fn new(tracks: Vec<CatalogTrack>) -> Self {
        Self { tracks }
    }

    pub fn push(&mut self, track: CatalogTrack) {
        self.tracks.push(track);
    }
}

impl Catalog for MemoryCatalog {
    fn find(&self, query: &CatalogQuery<'_>) -> Result<Vec<u32>> {
        let title = match_key(query.title);
        let artist = query.artist.map(match_key);
        let album = query.album.map(match_key);

        Ok(self
            .tracks
            .iter()
            .filter(|t| match_key(&t.title) == title)
            .filter(|t| artist.as_deref().map_or(true, |a| match_key(&t.artist) == a))
            .filter(|t| album.as_deref().map_or(true, |a| album_keys_match(&match_key(&t.album), a)))
            .map(|t| t.length)
            .collect())
    }
}
