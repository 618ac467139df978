//! Backend operations used by a session.

use stencil_core::{ProvisionReceipt, Record, RecordId, RelPath};

use crate::error::RemoteError;

/// Backend operations.
///
/// Implementations are blocking and shared across tasks; the session runtime
/// calls them from `tokio::task::spawn_blocking`. Tests substitute in-memory
/// fakes.
pub trait RemoteClient: Send + Sync {
    /// Full snapshot of every record visible to the token.
    fn list(&self) -> Result<Vec<Record>, RemoteError>;

    /// Fetch one record.
    fn get(&self, id: &RecordId) -> Result<Record, RemoteError>;

    /// Push new content. `updated_at` is the last marker seen for the record;
    /// the backend may reject the update if it no longer matches.
    fn update(
        &self,
        id: &RecordId,
        content: &str,
        updated_at: Option<&str>,
    ) -> Result<Record, RemoteError>;

    /// Ask the backend to create a record for a new local file.
    fn provision(&self, path: &RelPath) -> Result<ProvisionReceipt, RemoteError>;
}
