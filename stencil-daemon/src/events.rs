//! Events the watcher delivers to the session loop.

use stencil_core::RelPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// Content of an existing file changed.
    Modified(RelPath),
    /// A file appeared, either newly written or renamed into place.
    Created(RelPath),
}

impl WorkspaceEvent {
    pub fn path(&self) -> &RelPath {
        match self {
            WorkspaceEvent::Modified(path) | WorkspaceEvent::Created(path) => path,
        }
    }
}
