//! # Scrobbletime
//!
//! Listening-time statistics from a scrobble history.
//!
//! ## Usage
//!
//! ```bash
//! # Fill the track-length catalog
//! scrobbletime import-catalog tracks.json
//!
//! # Listening time per month / season / week
//! scrobbletime monthly history.json
//! scrobbletime seasonal history.json
//! scrobbletime total history.json --step 604800
//!
//! # Who dominated each season
//! scrobbletime hyped history.json --period season
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use scrobbletime::catalog::{CatalogTrack, SqliteCatalog};
use scrobbletime::cli::{self, Command, HistoryArgs, Period};
use scrobbletime::config::RuntimeConfig;
use scrobbletime::hyped::{self, HypeThresholds};
use scrobbletime::resolver::TrackLengthResolver;
use scrobbletime::scrobble::{self, Scrobble, TimedScrobble};
use scrobbletime::{completion, policies, report};
use std::fs;
use std::path::Path;

fn open_catalog(config: &RuntimeConfig) -> Result<SqliteCatalog> {
    SqliteCatalog::open(&config.db_path)
        .with_context(|| format!("Cannot open catalog at {}", config.db_path.display()))
}

/// Loads the history and resolves every scrobble's length.
fn load_timed(input: &HistoryArgs, config: &RuntimeConfig) -> Result<Vec<TimedScrobble>> {
    let history = scrobble::load_history(&input.history)?;
    let catalog = open_catalog(config)?;
    TrackLengthResolver::new(&catalog)
        .with_default_length(config.default_length)
        .resolve_history(&history)
}

fn now_or(now: Option<i64>) -> i64 {
    now.unwrap_or_else(|| chrono::Utc::now().timestamp())
}

fn import_catalog(file: &Path, force: bool, config: &RuntimeConfig) -> Result<()> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read catalog file {}", file.display()))?;
    let tracks: Vec<CatalogTrack> = serde_json::from_str(&raw)
        .with_context(|| format!("Catalog file {} is not a JSON track list", file.display()))?;

    let mut catalog = open_catalog(config)?;
    if force {
        info!("Clearing existing catalog");
        catalog.clear()?;
    }
    catalog.insert_tracks(&tracks)?;

    println!(
        "Imported {} tracks, catalog now holds {}",
        tracks.len(),
        catalog.track_count()?
    );
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    if lines.is_empty() {
        println!("No listening history in range");
    }
    for line in lines {
        println!("{line}");
    }
}

/// Main entry point.
///
/// Logging goes through `env_logger`, controlled by `RUST_LOG`:
/// - `RUST_LOG=debug scrobbletime monthly history.json`
/// - `RUST_LOG=scrobbletime::resolver=trace scrobbletime length ...`
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    // Needs neither config nor catalog.
    if let Command::Completion { shell } = args.command {
        let mut cmd = cli::Args::command();
        completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        return Ok(());
    }

    let mut config = RuntimeConfig::load()?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    debug!("Using catalog at {}", config.db_path.display());

    match args.command {
        Command::ImportCatalog { file, force } => {
            info!("Importing catalog from: {}", file.display());
            import_catalog(&file, force, &config)?;
        }
        Command::Length { artist, track, album } => {
            let catalog = open_catalog(&config)?;
            let resolver =
                TrackLengthResolver::new(&catalog).with_default_length(config.default_length);
            let scrobble = Scrobble::new(&artist, &track, &album, 0);

            match resolver.lookup(&scrobble)? {
                Some((level, length)) => {
                    println!("{} ({level:?})", report::format_duration(u64::from(length)));
                }
                None => println!(
                    "{} (default)",
                    report::format_duration(u64::from(resolver.default_length()))
                ),
            }
        }
        Command::Total { input, step } => {
            let timed = load_timed(&input, &config)?;
            let windows = policies::listening_time_fixed(&timed, step, now_or(input.now))?;
            print_lines(report::listening_time_lines(&windows));
        }
        Command::Monthly { input } => {
            let timed = load_timed(&input, &config)?;
            let windows = policies::listening_time_monthly(&timed, now_or(input.now))?;
            print_lines(report::listening_time_lines(&windows));
        }
        Command::Seasonal { input } => {
            let timed = load_timed(&input, &config)?;
            let windows = policies::listening_time_seasonal(&timed, now_or(input.now))?;
            print_lines(report::listening_time_lines(&windows));
        }
        Command::Hyped { input, period, ratio, min_length } => {
            let defaults = config.hype_thresholds();
            let thresholds = HypeThresholds::new(
                ratio.unwrap_or(defaults.significant_ratio),
                min_length.unwrap_or(defaults.significant_length),
            )?;

            let timed = load_timed(&input, &config)?;
            let now = now_or(input.now);
            let windows = match period {
                Period::Month => hyped::hyped_artists(&timed, &policies::Monthly, now, &thresholds)?,
                Period::Season => hyped::hyped_artists(&timed, &policies::Seasonal, now, &thresholds)?,
            };
            print_lines(report::hyped_lines(&windows));
        }
        Command::Completion { .. } => {}
    }

    Ok(())
}
