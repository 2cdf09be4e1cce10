//! Playlist Minder - keeps Spotify playlists in step with radio station
//! "now playing" feeds.
//!
//! Each configured playlist mirrors a show: new tracks from the feed are
//! matched to Spotify, added to a rolling history, and the playlist is
//! reconciled with that history. Intended to run from a scheduler once per
//! show.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod model;
pub mod settings;
pub mod sync;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("playlist_minder=info".parse()?))
        .init();

    if !cli::run_command(&args)? {
        // Some playlist failed; let the scheduler see it
        std::process::exit(1);
    }
    Ok(())
}
