//! # Command-Line Interface Module
//!
//! Clap definitions for the `scrobbletime` binary.
//!
//! ## Commands
//!
//! - `import-catalog`: load track lengths from a JSON file into the catalog
//! - `length`: resolve the play length of one track
//! - `total`: listening time per fixed-size window
//! - `monthly` / `seasonal`: listening time per calendar month / season
//! - `hyped`: dominant artist per month or season
//!
//! ## Examples
//!
//! ```bash
//! scrobbletime import-catalog tracks.json
//! scrobbletime monthly history.json
//! scrobbletime hyped history.json --period season --ratio 0.4
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Calendar period used to bucket hyped artists.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Period {
    Month,
    Season,
}

/// Main application arguments structure.
#[derive(Parser)]
#[command(name = "scrobbletime")]
#[command(about = "Scrobbletime: listening time per month, season and hyped artists from your scrobbles")]
#[command(version)]
pub struct Args {
    /// Catalog database to use instead of the one in the data directory
    #[arg(long, global = true, env = "SCROBBLETIME_DB", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Import track lengths into the catalog
    ///
    /// Reads a JSON array of `{"artist", "album", "title", "length"}` objects,
    /// `length` in seconds. Rows are appended unless --force is given.
    ImportCatalog {
        /// JSON file with catalog rows
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,

        /// Empty the catalog before importing
        #[arg(long)]
        force: bool,
    },

    /// Resolve the play length of one track
    ///
    /// Tries artist+album, then album only, then artist only, and falls back
    /// to the default length when nothing matches.
    Length {
        #[arg(long)]
        artist: String,

        #[arg(long)]
        track: String,

        #[arg(long, default_value = "")]
        album: String,
    },

    /// Listening time per fixed-size window
    Total {
        #[command(flatten)]
        input: HistoryArgs,

        /// Window length in seconds
        #[arg(long, default_value = "604800")]
        step: i64,
    },

    /// Listening time per calendar month
    Monthly {
        #[command(flatten)]
        input: HistoryArgs,
    },

    /// Listening time per season
    ///
    /// Seasons start on March 20, June 21, September 22 and December 21.
    Seasonal {
        #[command(flatten)]
        input: HistoryArgs,
    },

    /// Find the artist dominating each month or season
    Hyped {
        #[command(flatten)]
        input: HistoryArgs,

        #[arg(long, value_enum, default_value = "month")]
        period: Period,

        /// Share of the window an artist must exceed (0 to 1)
        #[arg(long)]
        ratio: Option<f64>,

        /// Seconds an artist must exceed in the window
        #[arg(long)]
        min_length: Option<u64>,
    },

    /// Generate shell completions
    ///
    /// Usage: scrobbletime completion bash > ~/.local/share/bash-completion/completions/scrobbletime
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Arguments shared by every command reading a history.
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// JSON array of scrobbles, most recent first
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub history: PathBuf,

    /// End of the last window as a Unix timestamp (defaults to now)
    #[arg(long)]
    pub now: Option<i64>,
}
