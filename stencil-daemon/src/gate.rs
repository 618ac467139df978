//! Suppression of watcher output for paths the session is moving itself.
//!
//! A relocation pauses both its source and destination. Notifications for
//! the move can arrive after the rename returns, so `resume` keeps the paths
//! paused for a short settle window instead of releasing them at once.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use stencil_core::RelPath;

pub const RELOCATION_SETTLE: Duration = Duration::from_millis(500);

pub struct PathGate {
    settle: Duration,
    /// `None` while the relocation is running, then the release deadline.
    paused: Mutex<HashMap<RelPath, Option<Instant>>>,
}

impl Default for PathGate {
    fn default() -> Self {
        Self::new(RELOCATION_SETTLE)
    }
}

impl PathGate {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            paused: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RelPath, Option<Instant>>> {
        self.paused.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn pause(&self, paths: &[RelPath]) {
        let mut paused = self.lock();
        for path in paths {
            paused.insert(path.clone(), None);
        }
    }

    pub fn resume(&self, paths: &[RelPath], now: Instant) {
        let release_at = now + self.settle;
        let mut paused = self.lock();
        for path in paths {
            paused.insert(path.clone(), Some(release_at));
        }
    }

    pub fn is_paused(&self, path: &RelPath, now: Instant) -> bool {
        let mut paused = self.lock();
        paused.retain(|_, release_at| release_at.map_or(true, |at| now < at));
        paused.contains_key(path)
    }
}
