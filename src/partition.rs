//! # Interval Partitioning
//!
//! Splits a history into contiguous half-open windows and reduces each one to
//! a summary. The partitioner has no idea what a month or a season is: a
//! [`WindowPolicy`] supplies the boundaries, a closure supplies the reduction.
//!
//! ```text
//! first_boundary ──next──▶ b1 ──next──▶ b2 ── … ──▶ bn   (while b < now)
//! [first, b1) [b1, b2) … [bn, now)
//! ```
//!
//! The last window always ends at `now`, even if the policy's next boundary
//! would lie beyond it.

use crate::scrobble::{ensure_recent_first, TimedScrobble};
use anyhow::{anyhow, Context, Result};
use log::{debug, trace};
use serde::Serialize;

/// A half-open `[start, end)` interval with its reduced summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Window<T> {
    pub start: i64,
    pub end: i64,
    pub summary: T,
}

impl<T> Window<T> {
    #[must_use]
    pub fn contains(&self, timestamp: i64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

/// Where windows start.
pub trait WindowPolicy {
    /// Start of the first window, given the earliest scrobble's timestamp.
    ///
    /// # Errors
    ///
    /// Implementations fail only on timestamps they cannot place on a calendar.
    fn first_boundary(&self, earliest: i64) -> Result<i64>;

    /// Start of the window following the one starting at `boundary`.
    /// Must be strictly greater than `boundary`.
    ///
    /// # Errors
    ///
    /// Implementations fail only on timestamps they cannot place on a calendar.
    fn next_boundary(&self, boundary: i64) -> Result<i64>;
}

/// Lazily walks the `(start, end)` pairs of a policy from `first` up to `now`.
struct Boundaries<'p, P: ?Sized> {
    policy: &'p P,
    next_start: i64,
    now: i64,
}

impl<P> Iterator for Boundaries<'_, P>
where
    P: WindowPolicy + ?Sized,
{
    type Item = Result<(i64, i64)>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start;
        if start >= self.now {
            return None;
        }
        let next = match self.policy.next_boundary(start) {
            Ok(next) => next,
            Err(e) => {
                self.next_start = self.now;
                return Some(Err(e));
            }
        };
        if next <= start {
            self.next_start = self.now;
            return Some(Err(anyhow!(
                "Window boundary did not advance: {start} -> {next}"
            )));
        }
        self.next_start = next;
        Some(Ok((start, next.min(self.now))))
    }
}

fn walk<P>(policy: &P, first: i64, now: i64) -> Boundaries<'_, P>
where
    P: WindowPolicy + ?Sized,
{
    Boundaries {
        policy,
        next_start: first,
        now,
    }
}

/// Generates `(start, end)` pairs from `first` up to `now`.
///
/// Empty when `first >= now`.
///
/// # Errors
///
/// Fails if the policy errors or does not advance.
pub fn boundaries<P>(policy: &P, first: i64, now: i64) -> Result<Vec<(i64, i64)>>
where
    P: WindowPolicy + ?Sized,
{
    let pairs = walk(policy, first, now).collect::<Result<Vec<_>>>()?;
    trace!("{} windows in [{first}, {now})", pairs.len());
    Ok(pairs)
}

/// Partitions `history` into windows and applies `reduce` to each.
///
/// `history` must be ordered most recent first; the last element decides where
/// the first window starts. Scrobbles at or after `now` belong to no window.
///
/// Runs in one pass over the history plus one step per window. Each window's
/// members are handed to `reduce` oldest first.
///
/// # Errors
///
/// Fails if `history` is out of order, or the policy errors or stalls.
pub fn partition<P, T, F>(
    history: &[TimedScrobble],
    policy: &P,
    now: i64,
    mut reduce: F,
) -> Result<Vec<Window<T>>>
where
    P: WindowPolicy + ?Sized,
    F: FnMut(&[&TimedScrobble]) -> T,
{
    let Some(earliest) = history.last() else {
        debug!("Empty history, no windows");
        return Ok(Vec::new());
    };
    ensure_recent_first(history.iter().map(TimedScrobble::timestamp))?;

    let first = policy
        .first_boundary(earliest.timestamp())
        .context("Failed to compute the first window boundary")?;

    let oldest_first: Vec<&TimedScrobble> = history.iter().rev().collect();
    let mut cursor = 0;
    let mut windows = Vec::new();

    for pair in walk(policy, first, now) {
        let (start, end) = pair?;
        while cursor < oldest_first.len() && oldest_first[cursor].timestamp() < start {
            cursor += 1;
        }
        let begin = cursor;
        while cursor < oldest_first.len() && oldest_first[cursor].timestamp() < end {
            cursor += 1;
        }
        windows.push(Window {
            start,
            end,
            summary: reduce(&oldest_first[begin..cursor]),
        });
    }

    debug!("Partitioned {} scrobbles into {} windows", history.len(), windows.len());
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrobble::Scrobble;

    /// Boundaries every `step` seconds from the earliest scrobble.
    struct Every(i64);

    impl WindowPolicy for Every {
        fn first_boundary(&self, earliest: i64) -> Result<i64> {
            Ok(earliest)
        }

        fn next_boundary(&self, boundary: i64) -> Result<i64> {
            Ok(boundary + self.0)
        }
    }

    struct Stuck;

    impl WindowPolicy for Stuck {
        fn first_boundary(&self, earliest: i64) -> Result<i64> {
            Ok(earliest)
        }

        fn next_boundary(&self, boundary: i64) -> Result<i64> {
            Ok(boundary)
        }
    }

    fn timed(timestamps: &[i64]) -> Vec<TimedScrobble> {
        timestamps
            .iter()
            .map(|&ts| TimedScrobble::new(Scrobble::new("a", "t", "", ts), 10))
            .collect()
    }

    fn count(members: &[&TimedScrobble]) -> usize {
        members.len()
    }

    #[test]
    fn test_empty_history_yields_no_windows() -> Result<()> {
        let windows = partition(&[], &Every(10), 1_000, count)?;
        assert!(windows.is_empty());
        Ok(())
    }

    #[test]
    fn test_first_boundary_at_or_after_now_yields_no_windows() -> Result<()> {
        let history = timed(&[100]);
        assert!(partition(&history, &Every(10), 100, count)?.is_empty());
        assert!(partition(&history, &Every(10), 50, count)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_last_window_is_clamped_to_now() -> Result<()> {
        let history = timed(&[25, 0]);
        let windows = partition(&history, &Every(10), 27, count)?;

        let spans: Vec<(i64, i64)> = windows.iter().map(|w| (w.start, w.end)).collect();
        assert_eq!(spans, vec![(0, 10), (10, 20), (20, 27)]);
        assert_eq!(windows.last().map(|w| w.end), Some(27));
        Ok(())
    }

    #[test]
    fn test_half_open_membership() -> Result<()> {
        let history = timed(&[30, 20, 19, 10, 10, 0]);
        let windows = partition(&history, &Every(10), 31, count)?;

        let counts: Vec<usize> = windows.iter().map(|w| w.summary).collect();
        // [0,10) [10,20) [20,30) [30,31)
        assert_eq!(counts, vec![1, 3, 1, 1]);
        Ok(())
    }

    #[test]
    fn test_every_scrobble_before_now_in_exactly_one_window() -> Result<()> {
        let history = timed(&[99, 73, 72, 50, 41, 40, 13, 3]);
        let now = 95;
        let windows = partition(&history, &Every(7), now, |m| {
            m.iter().map(|t| t.timestamp()).collect::<Vec<_>>()
        })?;

        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "windows must be contiguous");
            assert!(pair[0].start < pair[1].start, "windows must increase");
        }

        for t in &history {
            let holders = windows.iter().filter(|w| w.summary.contains(&t.timestamp())).count();
            let expected = usize::from(t.timestamp() < now);
            assert_eq!(holders, expected, "timestamp {}", t.timestamp());
        }
        Ok(())
    }

    #[test]
    fn test_out_of_order_history_is_rejected() {
        let history = timed(&[0, 10]);
        assert!(partition(&history, &Every(10), 100, count).is_err());
    }

    #[test]
    fn test_stalled_policy_is_an_error() {
        let history = timed(&[0]);
        let err = partition(&history, &Stuck, 100, count).unwrap_err();
        assert!(err.to_string().contains("did not advance"));
    }

    #[test]
    fn test_members_are_oldest_first() -> Result<()> {
        let history = timed(&[9, 5, 5, 1]);
        let windows = partition(&history, &Every(10), 10, |m| {
            m.iter().map(|t| t.timestamp()).collect::<Vec<_>>()
        })?;
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].summary, vec![1, 5, 5, 9]);
        Ok(())
    }

    #[test]
    fn test_many_small_windows_over_long_history() -> Result<()> {
        // 20,000 scrobbles half an hour apart, one-minute windows: ~600k windows.
        let scrobbles = 20_000_i64;
        let gap = 1_800;
        let newest = scrobbles * gap;
        let timestamps: Vec<i64> = (1..=scrobbles).rev().map(|i| i * gap).collect();
        let history = timed(&timestamps);
        let now = newest + 1;

        let started = std::time::Instant::now();
        let mut calls = 0_usize;
        let windows = partition(&history, &Every(60), now, |m| {
            calls += 1;
            m.len()
        })?;
        let elapsed = started.elapsed();

        let expected_windows = usize::try_from((now - gap + 59) / 60)?;
        assert_eq!(windows.len(), expected_windows);
        assert_eq!(calls, windows.len(), "reduce runs once per window");
        assert_eq!(windows.first().map(|w| w.start), Some(gap));
        assert_eq!(windows.last().map(|w| w.end), Some(now));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "windows must be contiguous");
        }

        let counted: usize = windows.iter().map(|w| w.summary).sum();
        assert_eq!(counted, history.len());
        let occupied = windows.iter().filter(|w| w.summary == 1).count();
        assert_eq!(occupied, history.len(), "one scrobble per occupied minute");
        assert!(
            elapsed.as_secs() < 10,
            "partitioning took {elapsed:?}, expected linear time"
        );
        Ok(())
    }

    #[test]
    fn test_boundaries_direct() -> Result<()> {
        assert_eq!(boundaries(&Every(5), 0, 12)?, vec![(0, 5), (5, 10), (10, 12)]);
        assert_eq!(boundaries(&Every(5), 0, 10)?, vec![(0, 5), (5, 10)]);
        assert!(boundaries(&Every(5), 10, 10)?.is_empty());
        Ok(())
    }
}
