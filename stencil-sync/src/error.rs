//! Error types for stencil-sync.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from workspace filesystem operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A relocation target is already occupied; the move is refused rather
    /// than overwriting another file.
    #[error("refusing to move onto existing file {path}")]
    DestinationExists { path: PathBuf },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
