//! Debounced pushes of local edits.

use std::sync::Arc;

use stencil_core::{RecordId, RelPath};

use crate::session::Session;

/// What a fired push did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    /// On-disk content matched the last known record.
    Unchanged,
    /// The id is no longer in the path index.
    Untracked,
    /// The local file could not be read.
    Unreadable,
    /// The backend refused the update; the remote version was restored.
    Rejected,
}

impl Session {
    /// Arm (or re-arm) the push for the record tracked at `path`.
    pub async fn on_modified(self: &Arc<Self>, path: &RelPath) {
        if self.is_shutting_down() {
            return;
        }
        let Some(id) = self.record_id_at(path).await else {
            tracing::warn!(path = %path, "modified file is not tracked; ignoring");
            return;
        };

        let session = Arc::clone(self);
        let push_id = id.clone();
        let replaced = self.pushes.arm(id.clone(), async move {
            session.push_now(&push_id).await;
        });
        tracing::debug!(path = %path, id = %id, replaced, "push armed");
    }

    /// Push the on-disk content of `id` if it differs from the last known
    /// record. The path is looked up again here since it may have changed
    /// while the push was armed.
    pub async fn push_now(&self, id: &RecordId) -> PushOutcome {
        let located = self
            .map
            .read()
            .await
            .locate(id)
            .map(|(path, record)| (path.clone(), record.clone()));
        let Some((path, record)) = located else {
            tracing::warn!(id = %id, "record is no longer tracked; push skipped");
            return PushOutcome::Untracked;
        };

        let read_path = path.clone();
        let content = match self
            .fs_call(move |root| stencil_sync::read_local(root, &read_path))
            .await
        {
            Ok(content) => content,
            Err(err) => {
                tracing::error!(path = %path, id = %id, error = %err, "failed to read local file; push skipped");
                return PushOutcome::Unreadable;
            }
        };

        if content == record.content {
            tracing::debug!(path = %path, id = %id, "content unchanged; nothing to push");
            return PushOutcome::Unchanged;
        }

        let call_id = id.clone();
        let marker = record.updated_at;
        let pushed = self
            .remote_call(move |remote| remote.update(&call_id, &content, marker.as_deref()))
            .await;

        match pushed {
            Ok(updated) => {
                let mut map = self.map.write().await;
                let current = map
                    .locate(id)
                    .map(|(current, _)| current.clone())
                    .unwrap_or(path);
                tracing::info!(path = %current, id = %id, "pushed");
                map.insert(current, updated);
                PushOutcome::Pushed
            }
            Err(err) => {
                tracing::error!(path = %path, id = %id, error = %err, "push failed; restoring the remote version");
                self.resolve_conflict(&path).await;
                PushOutcome::Rejected
            }
        }
    }
}
