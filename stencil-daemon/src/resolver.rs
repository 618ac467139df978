//! Remote-wins recovery after a rejected push.

use stencil_core::RelPath;

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The local file now holds the remote version.
    Restored,
    Untracked,
    /// The remote version could not be fetched; the local file is untouched.
    FetchFailed,
    /// The index was refreshed but the file could not be rewritten.
    WriteFailed,
}

impl Session {
    /// Overwrite `path` with a fresh fetch of the record tracked there.
    ///
    /// The index is updated before the file is written so the watcher event
    /// caused by the write compares equal and pushes nothing.
    pub async fn resolve_conflict(&self, path: &RelPath) -> ResolveOutcome {
        let Some(id) = self.record_id_at(path).await else {
            tracing::warn!(path = %path, "conflicting file is not tracked; nothing to restore");
            return ResolveOutcome::Untracked;
        };

        let fetch_id = id.clone();
        let record = match self.remote_call(move |remote| remote.get(&fetch_id)).await {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(path = %path, id = %id, error = %err, "failed to fetch remote version; local file left as is");
                return ResolveOutcome::FetchFailed;
            }
        };

        let content = record.content.clone();
        self.map.write().await.insert(path.clone(), record);

        let write_path = path.clone();
        let written = self
            .fs_call(move |root| stencil_sync::atomic_write(&write_path.to_path(root), &content))
            .await;
        match written {
            Ok(()) => {
                tracing::info!(path = %path, id = %id, "restored remote version");
                ResolveOutcome::Restored
            }
            Err(err) => {
                tracing::error!(path = %path, id = %id, error = %err, "failed to write remote version");
                ResolveOutcome::WriteFailed
            }
        }
    }
}
