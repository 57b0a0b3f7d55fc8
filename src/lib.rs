//! Listening-time statistics from a scrobble history.
//!
//! Core modules:
//! - [`resolver`] - Track-length resolution with a relaxing catalog match
//! - [`partition`] - Splitting a history into contiguous windows
//! - [`policies`] - Fixed-step, monthly and seasonal windows
//! - [`hyped`] - Dominant ("hyped") artist per window
//!
//! ### Supporting Modules
//!
//! - [`calendar`] - UTC timestamp / calendar date conversion
//! - [`catalog`] - Catalog trait and its SQLite and in-memory stores
//! - [`scrobble`] - Scrobble records and history loading
//! - [`config`] - Data directory and tunable thresholds
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`report`] - Text rendering of results
//!
//! ## Quick Start Example
//!
//! ```
//! use scrobbletime::catalog::{CatalogTrack, SqliteCatalog};
//! use scrobbletime::resolver::TrackLengthResolver;
//! use scrobbletime::scrobble::Scrobble;
//! use scrobbletime::{hyped, policies};
//!
//! let mut catalog = SqliteCatalog::open_in_memory()?;
//! catalog.insert_tracks(&[CatalogTrack::new("Grouper", "Ruins", "Holding", 360)])?;
//!
//! // Most recent first.
//! let history = vec![
//!     Scrobble::new("Grouper", "Holding", "Ruins", 1_700_003_600),
//!     Scrobble::new("Grouper", "Unknown Song", "Ruins", 1_700_000_000),
//! ];
//!
//! let timed = TrackLengthResolver::new(&catalog).resolve_history(&history)?;
//! assert_eq!(timed[0].length, 360);
//! assert_eq!(timed[1].length, 240); // not in the catalog
//!
//! let months = policies::listening_time_monthly(&timed, 1_700_100_000)?;
//! assert_eq!(months[0].summary, 600);
//!
//! let hype = hyped::HypeThresholds::new(0.5, 300)?;
//! let windows = hyped::hyped_artists(&timed, &policies::Monthly, 1_700_100_000, &hype)?;
//! assert_eq!(windows[0].summary.as_ref().map(|h| h.artist.as_str()), Some("Grouper"));
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Ordering
//!
//! Histories are ordered most recent first, as listening services return
//! them. Every function taking a history checks this and returns an error
//! otherwise.
//!
//! ## Error Handling
//!
//! All fallible functions return `anyhow::Result`. A track missing from the
//! catalog is not an error: it is counted with the default length of four
//! minutes.

pub mod calendar;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod hyped;
pub mod partition;
pub mod policies;
pub mod report;
pub mod resolver;
pub mod scrobble;
