//! Workspace-level operations, all addressed by [`RelPath`] under a root.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use stencil_core::{Record, RecordId, RelPath, SyncMap};

use crate::error::{io_err, SyncError};
use crate::writer::atomic_write;

/// Why a listed record was not materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The record declares no path.
    NoPath,
    /// The declared path is empty or escapes the workspace.
    InvalidPath(String),
    /// The path is reserved for a file the session writes itself.
    Reserved(RelPath),
    /// An earlier record in the listing already claimed this path.
    Duplicate(RelPath),
    /// Writing the file failed.
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: RecordId,
    pub reason: SkipReason,
}

/// Outcome of [`materialize`].
#[derive(Debug, Default)]
pub struct SnapshotReport {
    /// One entry per file written.
    pub map: SyncMap,
    pub skipped: Vec<SkippedRecord>,
}

/// Write every record that declares a path under `root` and index it.
///
/// Creates `root` and intermediate directories. Individual write failures
/// are reported in [`SnapshotReport::skipped`]; only failing to create the
/// root itself is an error. `reserved` names workspace-relative paths that
/// records may not occupy.
pub fn materialize(
    root: &Path,
    records: Vec<Record>,
    reserved: &[&str],
) -> Result<SnapshotReport, SyncError> {
    std::fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

    let reserved: HashSet<&str> = reserved.iter().copied().collect();
    let mut report = SnapshotReport::default();

    for record in records {
        let id = record.id.clone();
        let path = match (&record.file_path, record.rel_path()) {
            (None, _) => {
                tracing::debug!(id = %id, "record has no path; not materialized");
                report.skipped.push(SkippedRecord {
                    id,
                    reason: SkipReason::NoPath,
                });
                continue;
            }
            (Some(raw), None) => {
                tracing::warn!(id = %id, path = %raw, "record path is invalid; not materialized");
                report.skipped.push(SkippedRecord {
                    id,
                    reason: SkipReason::InvalidPath(raw.clone()),
                });
                continue;
            }
            (Some(_), Some(path)) => path,
        };

        if reserved.contains(path.as_str()) {
            tracing::warn!(id = %id, path = %path, "record path is reserved; not materialized");
            report.skipped.push(SkippedRecord {
                id,
                reason: SkipReason::Reserved(path),
            });
            continue;
        }
        if report.map.contains(&path) {
            tracing::warn!(id = %id, path = %path, "duplicate record path; keeping the first");
            report.skipped.push(SkippedRecord {
                id,
                reason: SkipReason::Duplicate(path),
            });
            continue;
        }

        match atomic_write(&path.to_path(root), &record.content) {
            Ok(()) => {
                report.map.insert(path, record);
            }
            Err(err) => {
                tracing::error!(id = %id, path = %path, error = %err, "failed to write record");
                report.skipped.push(SkippedRecord {
                    id,
                    reason: SkipReason::Io(err.to_string()),
                });
            }
        }
    }

    Ok(report)
}

/// Current on-disk content of `path`.
pub fn read_local(root: &Path, path: &RelPath) -> Result<String, SyncError> {
    let abs = path.to_path(root);
    std::fs::read_to_string(&abs).map_err(|e| io_err(abs, e))
}

/// Move a file within the workspace, creating the destination's parent
/// directories. Refuses to overwrite an existing destination.
pub fn relocate(root: &Path, from: &RelPath, to: &RelPath) -> Result<(), SyncError> {
    let source = from.to_path(root);
    let dest = to.to_path(root);
    if dest.exists() {
        return Err(SyncError::DestinationExists { path: dest });
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::rename(&source, &dest).map_err(|e| io_err(&source, e))?;
    tracing::debug!(from = %from, to = %to, "relocated");
    Ok(())
}

/// Delete one file. A file that is already gone is not an error.
pub fn remove_local(root: &Path, path: &RelPath) -> Result<(), SyncError> {
    let abs = path.to_path(root);
    match std::fs::remove_file(&abs) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(abs, err)),
    }
}

/// Recursively delete the workspace. Returns `false` when there was nothing
/// to delete.
pub fn reap(root: &Path) -> Result<bool, SyncError> {
    match std::fs::remove_dir_all(root) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(root, err)),
    }
}
