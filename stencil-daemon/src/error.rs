use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the session runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("remote error: {0}")]
    Remote(#[from] stencil_remote::RemoteError),

    #[error("workspace error: {0}")]
    Sync(#[from] stencil_sync::SyncError),

    #[error("render error: {0}")]
    Render(#[from] stencil_renderer::RenderError),

    #[error("invalid ignore pattern '{pattern}': {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("task join error: {0}")]
    Join(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
