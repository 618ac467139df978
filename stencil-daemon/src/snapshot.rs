//! Initial workspace population from a full listing.

use stencil_renderer::{ReferenceContext, Renderer, REFERENCE_DOC_NAME};

use crate::error::DaemonError;
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    /// Files written and indexed.
    pub tracked: usize,
    /// Listed records that were not materialized.
    pub skipped: usize,
    /// The listing call failed and the session started empty.
    pub listing_failed: bool,
}

impl Session {
    /// Fetch every record, write it under the workspace root and index it,
    /// then drop the reference document at the root.
    ///
    /// A failed listing degrades to an empty workspace. Only failing to
    /// create the workspace directory is an error.
    pub async fn populate(&self) -> Result<PopulateReport, DaemonError> {
        let mut listing_failed = false;
        let records = match self.remote_call(|remote| remote.list()).await {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = %err, "failed to list templates; starting with an empty workspace");
                listing_failed = true;
                Vec::new()
            }
        };

        let snapshot = self
            .fs_call(move |root| stencil_sync::materialize(root, records, &[REFERENCE_DOC_NAME]))
            .await?;
        let report = PopulateReport {
            tracked: snapshot.map.len(),
            skipped: snapshot.skipped.len(),
            listing_failed,
        };
        *self.map.write().await = snapshot.map;

        if let Err(err) = self.write_reference_doc().await {
            tracing::warn!(error = %err, "failed to write {REFERENCE_DOC_NAME}");
        }

        tracing::info!(
            root = %self.root().display(),
            tracked = report.tracked,
            skipped = report.skipped,
            "workspace populated",
        );
        Ok(report)
    }

    async fn write_reference_doc(&self) -> Result<(), DaemonError> {
        let ctx = {
            let map = self.map.read().await;
            ReferenceContext::new(
                self.options.environment,
                self.options.base_url.clone(),
                self.root().display().to_string(),
                &map,
                u64::try_from(self.options.debounce.as_millis()).unwrap_or(u64::MAX),
            )
        };
        let override_dir = self.options.template_override_dir.clone();
        let target = self.root().join(REFERENCE_DOC_NAME);

        tokio::task::spawn_blocking(move || -> Result<(), DaemonError> {
            let doc = Renderer::with_override_dir(override_dir.as_deref())?.render(&ctx)?;
            stencil_sync::atomic_write(&target, &doc)?;
            Ok(())
        })
        .await
        .map_err(|e| DaemonError::Join(e.to_string()))?
    }
}
