//! Command-line interface for playlist-minder.
//!
//! This module provides CLI commands for syncing station playlists,
//! authorizing against Spotify and inspecting stored history.

mod commands;

pub use commands::{Cli, Commands, run_command};
