//! # Window Policies
//!
//! Boundary rules for the partitioner, plus the listening-time reductions
//! built on them:
//!
//! - [`FixedStep`]: every `step` seconds from the earliest scrobble
//! - [`Monthly`]: first window starts at the earliest scrobble, then the
//!   first of each calendar month
//! - [`Seasonal`]: astronomical season starts, fixed to
//!   [`SEASON_STARTS`] every year

use crate::calendar::{from_calendar, to_calendar};
use crate::partition::{partition, Window, WindowPolicy};
use crate::scrobble::TimedScrobble;
use anyhow::{ensure, Result};

/// `(month, day)` of each season start: spring, summer, autumn, winter.
/// Not adjusted for leap years.
pub const SEASON_STARTS: [(u32, u32); 4] = [(3, 20), (6, 21), (9, 22), (12, 21)];

/// Windows of a constant length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    step: i64,
}

impl FixedStep {
    /// # Errors
    ///
    /// `step` must be positive.
    pub fn new(step: i64) -> Result<Self> {
        ensure!(step > 0, "Window step must be positive, got {step}");
        Ok(Self { step })
    }

    pub fn step(&self) -> i64 {
        self.step
    }
}

impl WindowPolicy for FixedStep {
    fn first_boundary(&self, earliest: i64) -> Result<i64> {
        Ok(earliest)
    }

    fn next_boundary(&self, boundary: i64) -> Result<i64> {
        Ok(boundary.saturating_add(self.step))
    }
}

/// Calendar months, UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Monthly;

impl WindowPolicy for Monthly {
    fn first_boundary(&self, earliest: i64) -> Result<i64> {
        Ok(earliest)
    }

    fn next_boundary(&self, boundary: i64) -> Result<i64> {
        let (year, month, _) = to_calendar(boundary)?;
        match month {
            12 => from_calendar(year + 1, 1, 1),
            _ => from_calendar(year, month + 1, 1),
        }
    }
}

/// Astronomical seasons, UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seasonal;

impl WindowPolicy for Seasonal {
    fn first_boundary(&self, earliest: i64) -> Result<i64> {
        let (year, month, day) = to_calendar(earliest)?;
        match SEASON_STARTS.iter().rev().find(|&&start| start <= (month, day)) {
            Some(&(m, d)) => from_calendar(year, m, d),
            None => {
                let (m, d) = SEASON_STARTS[SEASON_STARTS.len() - 1];
                from_calendar(year - 1, m, d)
            }
        }
    }

    fn next_boundary(&self, boundary: i64) -> Result<i64> {
        let (year, month, day) = to_calendar(boundary)?;
        match SEASON_STARTS.iter().find(|&&start| start > (month, day)) {
            Some(&(m, d)) => from_calendar(year, m, d),
            None => {
                let (m, d) = SEASON_STARTS[0];
                from_calendar(year + 1, m, d)
            }
        }
    }
}

/// Total seconds listened across `members`.
pub fn sum_lengths(members: &[&TimedScrobble]) -> u64 {
    members.iter().map(|t| u64::from(t.length)).sum()
}

/// Listening time per `step`-second window.
///
/// # Errors
///
/// Fails on a non-positive step or an out-of-order history.
pub fn listening_time_fixed(history: &[TimedScrobble], step: i64, now: i64) -> Result<Vec<Window<u64>>> {
    partition(history, &FixedStep::new(step)?, now, sum_lengths)
}

/// Listening time per calendar month.
///
/// # Errors
///
/// Fails on an out-of-order history.
pub fn listening_time_monthly(history: &[TimedScrobble], now: i64) -> Result<Vec<Window<u64>>> {
    partition(history, &Monthly, now, sum_lengths)
}

/// Listening time per season.
///
/// # Errors
///
/// Fails on an out-of-order history.
pub fn listening_time_seasonal(history: &[TimedScrobble], now: i64) -> Result<Vec<Window<u64>>> {
    partition(history, &Seasonal, now, sum_lengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrobble::Scrobble;

    fn at(year: i32, month: u32, day: u32) -> i64 {
        from_calendar(year, month, day).unwrap()
    }

    fn timed(entries: &[(i64, u32)]) -> Vec<TimedScrobble> {
        entries
            .iter()
            .map(|&(ts, len)| TimedScrobble::new(Scrobble::new("a", "t", "", ts), len))
            .collect()
    }

    #[test]
    fn test_fixed_step_rejects_non_positive() {
        assert!(FixedStep::new(0).is_err());
        assert!(FixedStep::new(-5).is_err());
        assert_eq!(FixedStep::new(60).unwrap().step(), 60);
    }

    #[test]
    fn test_month_wrap() -> Result<()> {
        let mid_december = at(2023, 12, 14) + 3_600;
        assert_eq!(Monthly.next_boundary(mid_december)?, at(2024, 1, 1));
        assert_eq!(Monthly.next_boundary(at(2024, 1, 31))?, at(2024, 2, 1));
        Ok(())
    }

    #[test]
    fn test_season_wrap() -> Result<()> {
        assert_eq!(Seasonal.next_boundary(at(2023, 12, 25))?, at(2024, 3, 20));
        assert_eq!(Seasonal.next_boundary(at(2023, 12, 21))?, at(2024, 3, 20));
        assert_eq!(Seasonal.next_boundary(at(2023, 3, 20))?, at(2023, 6, 21));
        assert_eq!(Seasonal.next_boundary(at(2023, 1, 5))?, at(2023, 3, 20));
        Ok(())
    }

    #[test]
    fn test_season_first_boundary() -> Result<()> {
        assert_eq!(Seasonal.first_boundary(at(2023, 7, 4) + 500)?, at(2023, 6, 21));
        assert_eq!(Seasonal.first_boundary(at(2023, 9, 22) + 500)?, at(2023, 9, 22));
        assert_eq!(Seasonal.first_boundary(at(2023, 2, 1))?, at(2022, 12, 21));
        assert_eq!(Seasonal.first_boundary(at(2023, 12, 31))?, at(2023, 12, 21));
        Ok(())
    }

    #[test]
    fn test_monthly_listening_time() -> Result<()> {
        let history = timed(&[
            (at(2024, 3, 2), 100),
            (at(2024, 2, 10), 50),
            (at(2024, 2, 1), 25),
            (at(2024, 1, 15) + 60, 200),
        ]);
        let now = at(2024, 3, 10);

        let windows = listening_time_monthly(&history, now)?;
        let got: Vec<(i64, i64, u64)> = windows.iter().map(|w| (w.start, w.end, w.summary)).collect();
        assert_eq!(
            got,
            vec![
                (at(2024, 1, 15) + 60, at(2024, 2, 1), 200),
                (at(2024, 2, 1), at(2024, 3, 1), 75),
                (at(2024, 3, 1), now, 100),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_seasonal_listening_time_across_new_year() -> Result<()> {
        let history = timed(&[
            (at(2024, 4, 1), 10),
            (at(2024, 1, 2), 20),
            (at(2023, 12, 22), 40),
        ]);
        let now = at(2024, 4, 2);

        let windows = listening_time_seasonal(&history, now)?;
        let got: Vec<(i64, i64, u64)> = windows.iter().map(|w| (w.start, w.end, w.summary)).collect();
        assert_eq!(
            got,
            vec![
                (at(2023, 12, 21), at(2024, 3, 20), 60),
                (at(2024, 3, 20), now, 10),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_fixed_listening_time_ends_at_now() -> Result<()> {
        let history = timed(&[(250, 30), (120, 20), (100, 10)]);
        let windows = listening_time_fixed(&history, 100, 260)?;

        let sums: Vec<u64> = windows.iter().map(|w| w.summary).collect();
        assert_eq!(sums, vec![20 + 10, 30]);
        assert_eq!(windows.last().map(|w| w.end), Some(260));
        Ok(())
    }

    #[test]
    fn test_policies_produce_contiguous_windows() -> Result<()> {
        let history = timed(&[(at(2024, 5, 5), 1), (at(2021, 11, 30) + 7, 1)]);
        let now = at(2024, 5, 6) + 42;

        let fixed = FixedStep::new(86_400 * 11)?;
        let policies: [&dyn WindowPolicy; 3] = [&fixed, &Monthly, &Seasonal];
        for policy in policies {
            let windows = partition(&history, policy, now, sum_lengths)?;
            assert!(!windows.is_empty());
            for pair in windows.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
                assert!(pair[0].start < pair[0].end);
            }
            assert_eq!(windows.last().map(|w| w.end), Some(now));
            assert_eq!(windows.iter().map(|w| w.summary).sum::<u64>(), 2);
        }
        Ok(())
    }
}
