//! Filesystem watcher for a session workspace.

use std::path::Path;
use std::sync::Arc;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;

use stencil_core::RelPath;

use crate::error::DaemonError;
use crate::events::WorkspaceEvent;
use crate::gate::PathGate;
use crate::ignore::IgnoreRules;

/// Keeps the watch alive; dropping it stops event delivery.
pub struct WorkspaceWatcher {
    _watcher: RecommendedWatcher,
}

/// Watch `root` recursively and send classified events on `tx`.
///
/// Call after the workspace is populated; files written before the watch
/// starts are never reported.
pub fn watch(
    root: &Path,
    ignore: Arc<IgnoreRules>,
    gate: Arc<PathGate>,
    tx: mpsc::UnboundedSender<WorkspaceEvent>,
) -> Result<WorkspaceWatcher, DaemonError> {
    // Events arrive with resolved paths (/private/var/... on macOS).
    let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let event_root = root.clone();

    let mut watcher = recommended_watcher(move |event: notify::Result<Event>| match event {
        Ok(event) => {
            for classified in classify(&event, &event_root, &ignore, &gate, Instant::now()) {
                let _ = tx.send(classified);
            }
        }
        Err(err) => tracing::warn!(error = %err, "watcher event error"),
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;

    tracing::debug!(root = %root.display(), "watch started");
    Ok(WorkspaceWatcher { _watcher: watcher })
}

/// Map one raw notification onto workspace events.
///
/// Creations and renames into place become `Created` when a regular file is
/// present at the path. Content changes become `Modified`. Directory events,
/// rename sources, metadata-only changes, removals and accesses are dropped,
/// as are ignored paths and paths the gate holds.
pub fn classify(
    event: &Event,
    root: &Path,
    ignore: &IgnoreRules,
    gate: &PathGate,
    now: Instant,
) -> Vec<WorkspaceEvent> {
    let created = match event.kind {
        EventKind::Create(CreateKind::Folder) => return Vec::new(),
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => true,
        EventKind::Modify(ModifyKind::Name(_) | ModifyKind::Metadata(_)) => return Vec::new(),
        EventKind::Modify(_) => false,
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|path| if created { path.is_file() } else { !path.is_dir() })
        .filter_map(|path| RelPath::from_workspace(root, path))
        .filter(|path| !ignore.is_ignored(path))
        .filter(|path| !gate.is_paused(path, now))
        .map(|path| {
            if created {
                WorkspaceEvent::Created(path)
            } else {
                WorkspaceEvent::Modified(path)
            }
        })
        .collect()
}
