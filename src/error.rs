//! Error types for the sync core.
//!
//! Subsystems keep their own `thiserror` enums ([`CatalogError`] for Spotify,
//! `FeedError` for the station feed). [`Error`] collects what can abort a
//! sync cycle; the CLI wraps everything in `anyhow`.
//!
//! # Example
//!
//! ```ignore
//! use playlist_minder::error::{Error, Result};
//!
//! fn load_state(path: &Path) -> Result<HistoryFile> {
//!     let raw = std::fs::read_to_string(path)?; // IO errors auto-convert
//!     Ok(serde_json::from_str(&raw)?)          // JSON errors auto-convert
//! }
//! ```

use std::path::PathBuf;

use crate::catalog::CatalogError;

/// Result of a sync-core operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Anything that can abort a sync cycle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// History file (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spotify catalog error
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Malformed row in the playlist settings table
    #[error("Settings error on line {line}: {message}")]
    Settings { line: usize, message: String },

    /// History file written by a newer version of this tool
    #[error("History file {path} has schema version {found}, this build supports up to {supported}")]
    UnsupportedHistoryVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    /// History file stored under one playlist's name but written for another
    #[error("History file {path} belongs to playlist {found}, not {expected}")]
    HistoryMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// Another error plus what we were doing at the time
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a settings error.
    pub fn settings(line: usize, message: impl Into<String>) -> Self {
        Self::Settings {
            line,
            message: message.into(),
        }
    }

    /// Wrap with a description of the failed step.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Authentication failures end the whole run: nothing can be synced
    /// without a session.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Catalog(e) => e.is_auth(),
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// `.with_context(..)` on results from this crate, std IO and serde_json.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with a step description.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serde_json::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Json(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = Error::settings(3, "track_limit is not a number");
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("track_limit"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::settings(2, "playlist_name is empty").context("reading playlist_settings.txt");
        let msg = err.to_string();
        assert!(msg.contains("reading playlist_settings.txt"));
        assert!(msg.contains("line 2"));
    }

    #[test]
    fn test_auth_errors_are_fatal_through_context() {
        let err = Error::from(CatalogError::Auth("no token".to_string())).context("KCRW Eclectic 24");
        assert!(err.is_fatal());

        let err = Error::from(CatalogError::Network("reset".to_string()));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(Error::settings(1, "test"));
        let with_ctx = result.with_context("additional context");
        assert!(with_ctx.unwrap_err().to_string().contains("additional context"));
    }
}
