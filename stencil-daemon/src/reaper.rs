//! Session teardown.

use std::sync::atomic::Ordering;
use std::sync::PoisonError;

use stencil_core::ShutdownMode;

use crate::error::DaemonError;
use crate::session::Session;

impl Session {
    /// End the session and delete the workspace.
    ///
    /// The first call raises the shutdown flag, drains pending work
    /// according to [`ShutdownMode`], and reaps the root. Later calls return
    /// `Ok(false)` without doing anything.
    pub async fn shutdown(&self) -> Result<bool, DaemonError> {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            tracing::debug!("shutdown already in progress");
            return Ok(false);
        }

        match self.options.shutdown {
            ShutdownMode::Discard => {
                let discarded = self.pushes.cancel_all();
                if discarded > 0 {
                    tracing::warn!(discarded, "discarding pending pushes");
                }
                let handlers = std::mem::take(
                    &mut *self.handlers.lock().unwrap_or_else(PoisonError::into_inner),
                );
                for handler in handlers {
                    handler.abort();
                }
                // A push already in the backend may still rewrite its file.
                self.pushes.wait_idle().await;
            }
            ShutdownMode::Flush => {
                tracing::info!(pending = self.pushes.pending(), "flushing pending pushes");
                self.pushes.flush().await;
                self.wait_idle().await;
            }
        }

        if self.fs_call(stencil_sync::reap).await? {
            tracing::info!(root = %self.root().display(), "workspace removed");
        } else {
            tracing::debug!(root = %self.root().display(), "workspace already gone");
        }
        Ok(true)
    }
}
