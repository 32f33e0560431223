use std::path::PathBuf;

use thiserror::Error;

/// Failure to parse a single `.env` line.
///
/// Parse errors are recovered by the loader: the offending line is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing delimiter")]
    MissingDelimiter,

    #[error("empty key")]
    EmptyKey,

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum Error {
    /// The target file was not found in the start directory or any searched parent.
    #[error("env file not found: {}", .filename.display())]
    NotFound { filename: PathBuf },

    #[error("cannot get current dir: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stream failed mid-read. `loaded` variables were already applied.
    #[error("read error after {loaded} variables: {source}")]
    Read {
        loaded: usize,
        #[source]
        source: std::io::Error,
    },

    /// The target environment rejected a variable. `loaded` variables were already applied.
    #[error("failed to set {key}: {reason}")]
    Set {
        key: String,
        loaded: usize,
        reason: &'static str,
    },
}

impl Error {
    /// Number of variables applied before the load aborted.
    pub fn loaded(&self) -> usize {
        match self {
            Self::Read { loaded, .. } | Self::Set { loaded, .. } => *loaded,
            Self::NotFound { .. } | Self::CurrentDir(_) | Self::Open { .. } => 0,
        }
    }
}
