//! # Hyped Artist Detection
//!
//! An artist is "hyped" in a window when they were listened to for more than
//! an absolute floor *and* took more than a given share of the window's total
//! listening time. At most one artist per window qualifies: the one with the
//! most time, ties going to the alphabetically first name.

use crate::partition::{partition, Window, WindowPolicy};
use crate::scrobble::TimedScrobble;
use anyhow::{ensure, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Thresholds an artist must clear to count as hyped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HypeThresholds {
    /// Share of the window's total time that must be exceeded, in `[0, 1]`.
    pub significant_ratio: f64,
    /// Seconds an artist must exceed before the share is even considered.
    pub significant_length: u64,
}

impl Default for HypeThresholds {
    fn default() -> Self {
        Self {
            significant_ratio: 0.5,
            significant_length: 3_600,
        }
    }
}

impl HypeThresholds {
    /// # Errors
    ///
    /// `significant_ratio` must be a number in `[0, 1]`.
    pub fn new(significant_ratio: f64, significant_length: u64) -> Result<Self> {
        let thresholds = Self {
            significant_ratio,
            significant_length,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// # Errors
    ///
    /// `significant_ratio` must be a number in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.significant_ratio),
            "Significant ratio must be within [0, 1], got {}",
            self.significant_ratio
        );
        Ok(())
    }
}

/// The dominant artist of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypedArtist {
    pub artist: String,
    /// Seconds listened to this artist in the window.
    pub length: u64,
    /// `length` over the window's total, in `(0, 1]`.
    pub share: f64,
}

/// Finds the hyped artist among one window's scrobbles, if any.
#[must_use]
pub fn detect(members: &[&TimedScrobble], thresholds: &HypeThresholds) -> Option<HypedArtist> {
    let total: u64 = members.iter().map(|t| u64::from(t.length)).sum();
    if total == 0 {
        return None;
    }

    let mut per_artist: BTreeMap<&str, u64> = BTreeMap::new();
    for t in members {
        *per_artist.entry(t.artist()).or_default() += u64::from(t.length);
    }

    // BTreeMap iterates by name; on equal time keep the earlier name.
    let (artist, length) = per_artist
        .into_iter()
        .filter(|&(_, length)| length > thresholds.significant_length)
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;

    #[allow(clippy::cast_precision_loss)]
    let share = length as f64 / total as f64;
    trace!("Top artist {artist}: {length}s of {total}s ({share:.3})");

    match share.partial_cmp(&thresholds.significant_ratio) {
        Some(Ordering::Greater) => Some(HypedArtist {
            artist: artist.to_string(),
            length,
            share,
        }),
        _ => None,
    }
}

/// Hyped artist per window of `policy`.
///
/// # Errors
///
/// Fails on invalid thresholds, an out-of-order history or a failing policy.
pub fn hyped_artists<P>(
    history: &[TimedScrobble],
    policy: &P,
    now: i64,
    thresholds: &HypeThresholds,
) -> Result<Vec<Window<Option<HypedArtist>>>>
where
    P: WindowPolicy + ?Sized,
{
    thresholds.validate()?;
    partition(history, policy, now, |members| detect(members, thresholds))
}
