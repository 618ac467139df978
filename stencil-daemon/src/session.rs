//! Session context: every piece of state one sync session shares between
//! the event loop, debounced pushes, and provisioning tasks.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use stencil_core::config::DEFAULT_DEBOUNCE_MS;
use stencil_core::{Config, Environment, RecordId, RelPath, ShutdownMode, SyncMap};
use stencil_remote::{RemoteClient, RemoteError};
use stencil_sync::SyncError;

use crate::debounce::Debouncer;
use crate::error::DaemonError;
use crate::events::WorkspaceEvent;
use crate::gate::PathGate;
use crate::ignore::IgnoreRules;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Workspace directory; created by the snapshot, deleted at shutdown.
    pub root: PathBuf,
    pub environment: Environment,
    pub base_url: String,
    /// Quiet period before a modified file is pushed.
    pub debounce: Duration,
    pub shutdown: ShutdownMode,
    /// Extra ignore globs, relative to the workspace root.
    pub ignore: Vec<String>,
    /// Directory searched for a reference document template override.
    pub template_override_dir: Option<PathBuf>,
}

impl SessionOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let environment = Environment::default();
        Self {
            root: root.into(),
            environment,
            base_url: environment.default_base_url().to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            shutdown: ShutdownMode::default(),
            ignore: Vec::new(),
            template_override_dir: None,
        }
    }

    pub fn from_config(root: impl Into<PathBuf>, environment: Environment, config: &Config) -> Self {
        Self {
            root: root.into(),
            environment,
            base_url: config.base_url(environment),
            debounce: config.debounce(),
            shutdown: config.shutdown,
            ignore: config.ignore.clone(),
            template_override_dir: None,
        }
    }
}

pub struct Session {
    pub(crate) options: SessionOptions,
    pub(crate) remote: Arc<dyn RemoteClient>,
    pub(crate) map: RwLock<SyncMap>,
    pub(crate) pushes: Debouncer<RecordId>,
    pub(crate) gate: Arc<PathGate>,
    pub(crate) ignore: Arc<IgnoreRules>,
    pub(crate) shutting_down: AtomicBool,
    /// Spawned provisioning tasks, awaited by a flushing shutdown.
    pub(crate) handlers: Mutex<Vec<JoinHandle<()>>>,
}

impl Session {
    pub fn new(
        options: SessionOptions,
        remote: Arc<dyn RemoteClient>,
    ) -> Result<Arc<Self>, DaemonError> {
        let ignore = IgnoreRules::new(&options.ignore)?;
        Ok(Arc::new(Self {
            pushes: Debouncer::new(options.debounce),
            options,
            remote,
            map: RwLock::new(SyncMap::new()),
            gate: Arc::new(PathGate::default()),
            ignore: Arc::new(ignore),
            shutting_down: AtomicBool::new(false),
            handlers: Mutex::new(Vec::new()),
        }))
    }

    pub fn root(&self) -> &Path {
        &self.options.root
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn gate(&self) -> Arc<PathGate> {
        Arc::clone(&self.gate)
    }

    pub fn ignore_rules(&self) -> Arc<IgnoreRules> {
        Arc::clone(&self.ignore)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Copy of the current path index.
    pub async fn snapshot_map(&self) -> SyncMap {
        self.map.read().await.clone()
    }

    pub async fn record_id_at(&self, path: &RelPath) -> Option<RecordId> {
        self.map.read().await.get(path).map(|record| record.id.clone())
    }

    /// Route one watcher event. Modifications are handled inline; creations
    /// of untracked paths are spawned so provisioning calls may complete in
    /// any order.
    pub async fn dispatch(self: &Arc<Self>, event: WorkspaceEvent) {
        if self.is_shutting_down() {
            return;
        }
        match event {
            WorkspaceEvent::Modified(path) => self.on_modified(&path).await,
            WorkspaceEvent::Created(path) => {
                if self.map.read().await.contains(&path) {
                    tracing::debug!(path = %path, "created over a tracked path; treating as modified");
                    self.on_modified(&path).await;
                    return;
                }
                let session = Arc::clone(self);
                let handle = tokio::spawn(async move {
                    session.on_created(&path).await;
                });
                let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
                handlers.retain(|task| !task.is_finished());
                handlers.push(handle);
            }
        }
    }

    /// Wait for every spawned provisioning task and every running push.
    pub async fn wait_idle(&self) {
        loop {
            let handlers = std::mem::take(
                &mut *self.handlers.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if handlers.is_empty() {
                break;
            }
            for handler in handlers {
                let _ = handler.await;
            }
        }
        self.pushes.wait_idle().await;
    }

    /// Run a backend call on the blocking pool.
    pub(crate) async fn remote_call<T, F>(&self, call: F) -> Result<T, DaemonError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RemoteClient) -> Result<T, RemoteError> + Send + 'static,
    {
        let remote = Arc::clone(&self.remote);
        let result = tokio::task::spawn_blocking(move || call(remote.as_ref()))
            .await
            .map_err(|e| DaemonError::Join(e.to_string()))?;
        Ok(result?)
    }

    /// Run a workspace filesystem operation on the blocking pool.
    pub(crate) async fn fs_call<T, F>(&self, op: F) -> Result<T, DaemonError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, SyncError> + Send + 'static,
    {
        let root = self.options.root.clone();
        let result = tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|e| DaemonError::Join(e.to_string()))?;
        Ok(result?)
    }
}
