use std::io;
use std::path::PathBuf;

use crate::fetch::FetchError;

pub type Result<T, E = TldrError> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    MirrorCorrupt,
    FetchFailure,
    IoFailure,
    DecodeFailure,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum TldrError {
    /// No candidate directory held the page. Callers may fall back to
    /// fuzzy suggestions.
    #[error("failed to find {page}: no page found")]
    NotFound { page: String },

    #[error("tldr mirror is broken: {} is missing after refresh", index_path.display())]
    MirrorCorrupt { index_path: PathBuf },

    #[error("failed to update tldr mirror from {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode index file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `origin` names the config file or environment variable.
    #[error("invalid config {origin}: {message}")]
    Config { origin: String, message: String },
}

impl TldrError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MirrorCorrupt { .. } => ErrorKind::MirrorCorrupt,
            Self::Fetch { .. } => ErrorKind::FetchFailure,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::Decode { .. } => ErrorKind::DecodeFailure,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
