//! Remote records for new local files.

use tokio::time::Instant;

use stencil_core::RelPath;
use stencil_remote::RemoteError;

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The file is tracked at `path`, which the backend chose.
    Tracked { path: RelPath },
    /// Provisioning or the follow-up fetch failed; the local file was removed.
    Discarded,
    /// The record exists remotely but the file could not be moved to its
    /// canonical path. It stays where it is, untracked.
    Stranded { canonical: RelPath },
}

impl Session {
    /// Provision a record for the new file at `path` and move the file to
    /// the path the backend assigns.
    ///
    /// Runs to completion once started, so a flushing shutdown can await it.
    pub async fn on_created(&self, path: &RelPath) -> ProvisionOutcome {
        let requested = path.clone();
        let provisioned = self
            .remote_call(move |remote| {
                let receipt = remote.provision(&requested)?;
                let id = receipt
                    .primary_id()
                    .cloned()
                    .ok_or_else(|| RemoteError::MissingPrimary {
                        path: requested.to_string(),
                    })?;
                remote.get(&id)
            })
            .await;

        let record = match provisioned {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(path = %path, error = %err, "provisioning failed; removing local file");
                let doomed = path.clone();
                if let Err(err) = self
                    .fs_call(move |root| stencil_sync::remove_local(root, &doomed))
                    .await
                {
                    tracing::error!(path = %path, error = %err, "failed to remove unprovisioned file");
                }
                return ProvisionOutcome::Discarded;
            }
        };

        let canonical = record.rel_path().unwrap_or_else(|| path.clone());
        if canonical != *path {
            let moved = [path.clone(), canonical.clone()];
            self.gate.pause(&moved);
            let (from, to) = (path.clone(), canonical.clone());
            let relocated = self
                .fs_call(move |root| stencil_sync::relocate(root, &from, &to))
                .await;
            self.gate.resume(&moved, Instant::now());

            if let Err(err) = relocated {
                tracing::error!(from = %path, to = %canonical, error = %err, "failed to move file to its canonical path");
                return ProvisionOutcome::Stranded { canonical };
            }
            tracing::info!(from = %path, to = %canonical, "moved to canonical path");
        }

        tracing::info!(path = %canonical, id = %record.id, "provisioned");
        self.map.write().await.insert(canonical.clone(), record);
        ProvisionOutcome::Tracked { path: canonical }
    }
}
