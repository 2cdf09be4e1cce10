//! CLI command definitions and dispatch.
//!
//! This module provides the command-line interface for Playlist Minder.
//! Each group of subcommands lives in its own submodule:
//! - `sync`: scheduled runs, the test row and one-off playlists
//! - `auth`: Spotify authorization and connection check
//! - `history`: inspecting stored playlist history

mod auth;
mod history;
mod sync;

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use auth::{cmd_authorize, cmd_check_connection};
pub use history::cmd_history;
pub use sync::{cmd_new, cmd_run, cmd_test};

/// Playlist Minder CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Spotify user that owns the playlists
    #[arg(long, global = true, env = "SPOTIFY_USERNAME")]
    pub username: Option<String>,
    /// Spotify application client id
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,
    /// Spotify application client secret
    #[arg(long, global = true, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
    /// Redirect URI registered for the application
    #[arg(long, global = true, env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: Option<String>,
    /// Directory for history files and the token cache
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Playlist settings table
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Sync every playlist in the settings table (the default)
    Run {
        /// Start every playlist from an empty history
        #[arg(long)]
        reset: bool,
    },
    /// Sync a single settings row using its test URL
    Test {
        /// Zero-based settings row (default from config, usually 1)
        #[arg(long)]
        row: Option<usize>,
    },
    /// Build a one-off playlist from a feed URL, prompting for details
    New,
    /// Authorize this tool against your Spotify account
    Authorize,
    /// Check that the Spotify session works
    CheckConnection,
    /// Show the stored history of a playlist
    History {
        /// Playlist name as it appears on Spotify
        playlist_name: String,
    },
}

/// Configuration resolved from the config file and command-line overrides.
pub(crate) struct AppContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl AppContext {
    fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::load();

        let creds = &mut config.credentials;
        let overrides = [
            (&mut creds.username, &cli.username),
            (&mut creds.client_id, &cli.client_id),
            (&mut creds.client_secret, &cli.client_secret),
            (&mut creds.redirect_uri, &cli.redirect_uri),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        if let Some(dir) = &cli.data_dir {
            config.paths.data_dir = Some(dir.clone());
        }
        if let Some(file) = &cli.settings {
            config.paths.settings_file = Some(file.clone());
        }

        let data_dir = config
            .paths
            .data_dir()
            .ok_or_else(|| anyhow::anyhow!("No data directory; pass --data-dir"))?;
        let settings_file = config
            .paths
            .settings_file()
            .ok_or_else(|| anyhow::anyhow!("No settings file; pass --settings"))?;

        Ok(Self {
            config,
            data_dir,
            settings_file,
        })
    }

    /// Fail early when Spotify credentials are incomplete.
    pub fn require_credentials(&self) -> anyhow::Result<()> {
        let missing = self.config.credentials.missing_fields();
        if !missing.is_empty() {
            anyhow::bail!(
                "Missing Spotify credentials: {} (set them in {} or via SPOTIFY_* env vars)",
                missing.join(", "),
                config::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "config.toml".to_string())
            );
        }
        Ok(())
    }
}

/// Run the specified CLI command.
///
/// Returns `Ok(false)` if the command ran but some playlist failed to sync.
pub fn run_command(cli: &Cli) -> anyhow::Result<bool> {
    let rt = Runtime::new()?;
    let ctx = AppContext::from_cli(cli)?;

    match &cli.command {
        None => cmd_run(&rt, &ctx, false),
        Some(Commands::Run { reset }) => cmd_run(&rt, &ctx, *reset),
        Some(Commands::Test { row }) => cmd_test(&rt, &ctx, *row),
        Some(Commands::New) => cmd_new(&rt, &ctx),
        Some(Commands::Authorize) => {
            cmd_authorize(&rt, &ctx)?;
            Ok(true)
        }
        Some(Commands::CheckConnection) => {
            cmd_check_connection(&rt, &ctx)?;
            Ok(true)
        }
        Some(Commands::History { playlist_name }) => {
            cmd_history(&rt, &ctx, playlist_name)?;
            Ok(true)
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Ask a question on stdout and read one trimmed line from stdin
pub(crate) fn prompt(question: &str) -> anyhow::Result<String> {
    print!("{question} >>  ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["playlist-minder"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "playlist-minder",
            "test",
            "--row",
            "0",
            "--data-dir",
            "/tmp/pm",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Test { row: Some(0) })));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/pm")));
    }

    #[test]
    fn test_history_requires_name() {
        assert!(Cli::try_parse_from(["playlist-minder", "history"]).is_err());
    }
}
