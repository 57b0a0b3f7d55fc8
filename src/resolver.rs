//! # Track-Length Resolution
//!
//! Scrobbles carry no play length, so each one is looked up in a [`Catalog`].
//! Tagging data is noisy: scrobbling services "correct" artist names and
//! albums come back as deluxe editions or remasters. Resolution therefore
//! starts strict and relaxes one constraint at a time:
//!
//! ```text
//! ArtistAndAlbum ──empty──▶ AlbumOnly ──empty──▶ ArtistOnly ──empty──▶ default
//! ```
//!
//! The first level with any rows wins. Duplicate rows collapse to one value;
//! if the catalog still disagrees with itself the mean of the distinct values
//! is used, truncated to whole seconds.

use crate::catalog::{Catalog, CatalogQuery};
use crate::scrobble::{Scrobble, TimedScrobble};
use anyhow::Result;
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Four minutes, used when nothing in the catalog matches.
pub const DEFAULT_TRACK_LENGTH: u32 = 240;

/// Which constraints a catalog lookup applies besides the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchLevel {
    ArtistAndAlbum,
    AlbumOnly,
    ArtistOnly,
}

impl MatchLevel {
    /// The strictest level, where every resolution starts.
    pub const FIRST: Self = Self::ArtistAndAlbum;

    /// Level to try after this one returned nothing.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ArtistAndAlbum => Some(Self::AlbumOnly),
            Self::AlbumOnly => Some(Self::ArtistOnly),
            Self::ArtistOnly => None,
        }
    }

    #[must_use]
    pub const fn matches_artist(self) -> bool {
        matches!(self, Self::ArtistAndAlbum | Self::ArtistOnly)
    }

    #[must_use]
    pub const fn matches_album(self) -> bool {
        matches!(self, Self::ArtistAndAlbum | Self::AlbumOnly)
    }

    /// Builds the catalog query for `scrobble` at this level.
    pub fn query<'a>(self, scrobble: &'a Scrobble) -> CatalogQuery<'a> {
        CatalogQuery {
            title: &scrobble.track,
            artist: self.matches_artist().then_some(scrobble.artist.as_str()),
            album: self.matches_album().then_some(scrobble.album.as_str()),
        }
    }
}

/// Reduces raw catalog rows to one length.
///
/// Returns `None` for no rows, otherwise the floor of the mean of the
/// distinct values (which is the value itself when they all agree).
#[must_use]
pub fn collapse_lengths(lengths: &[u32]) -> Option<u32> {
    let distinct: BTreeSet<u32> = lengths.iter().copied().collect();
    if distinct.is_empty() {
        return None;
    }

    let sum: u64 = distinct.iter().map(|&l| u64::from(l)).sum();
    let mean = sum / distinct.len() as u64;
    // Mean of u32 values always fits in u32.
    Some(u32::try_from(mean).unwrap_or(u32::MAX))
}

/// Resolves scrobbles to play lengths against a catalog.
pub struct TrackLengthResolver<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    default_length: u32,
}

impl<'c, C: Catalog + ?Sized> TrackLengthResolver<'c, C> {
    pub fn new(catalog: &'c C) -> Self {
        Self {
            catalog,
            default_length: DEFAULT_TRACK_LENGTH,
        }
    }

    /// Overrides the length used when every level comes back empty.
    #[must_use]
    pub fn with_default_length(mut self, default_length: u32) -> Self {
        self.default_length = default_length;
        self
    }

    pub fn default_length(&self) -> u32 {
        self.default_length
    }

    /// Looks `scrobble` up at a single level without relaxing.
    ///
    /// # Errors
    ///
    /// Propagates catalog failures.
    pub fn resolve_at_level(&self, scrobble: &Scrobble, level: MatchLevel) -> Result<Option<u32>> {
        let rows = self.catalog.find(&level.query(scrobble))?;
        Ok(collapse_lengths(&rows))
    }

    /// Walks the relaxation levels and reports the first hit with its level.
    ///
    /// # Errors
    ///
    /// Propagates catalog failures.
    pub fn lookup(&self, scrobble: &Scrobble) -> Result<Option<(MatchLevel, u32)>> {
        let mut level = Some(MatchLevel::FIRST);
        while let Some(current) = level {
            if let Some(length) = self.resolve_at_level(scrobble, current)? {
                debug!(
                    "{} - {}: {length}s at {current:?}",
                    scrobble.artist, scrobble.track
                );
                return Ok(Some((current, length)));
            }
            level = current.next();
        }
        Ok(None)
    }

    /// Play length of `scrobble` in seconds, falling back to the default.
    ///
    /// # Errors
    ///
    /// Only catalog failures; an unknown track is not an error.
    pub fn resolve(&self, scrobble: &Scrobble) -> Result<u32> {
        match self.lookup(scrobble)? {
            Some((_, length)) => Ok(length),
            None => {
                warn!(
                    "No catalog entry for {} - {} [{}], assuming {}s",
                    scrobble.artist, scrobble.track, scrobble.album, self.default_length
                );
                Ok(self.default_length)
            }
        }
    }

    /// Resolves every scrobble, keeping the input order.
    ///
    /// # Errors
    ///
    /// Stops at the first catalog failure.
    pub fn resolve_history(&self, history: &[Scrobble]) -> Result<Vec<TimedScrobble>> {
        let timed = history
            .iter()
            .map(|scrobble| Ok(TimedScrobble::new(scrobble.clone(), self.resolve(scrobble)?)))
            .collect::<Result<Vec<_>>>()?;

        info!("Resolved lengths for {} scrobbles", timed.len());
        Ok(timed)
    }
}
