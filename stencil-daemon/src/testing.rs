//! In-memory backend and session fixtures for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use tempfile::TempDir;
use tokio::sync::oneshot;

use stencil_core::{ProvisionReceipt, Record, RecordId, RelPath};
use stencil_remote::{RemoteClient, RemoteError};

use crate::session::{Session, SessionOptions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Get(RecordId),
    Update {
        id: RecordId,
        content: String,
        updated_at: Option<String>,
    },
    Provision(RelPath),
}

#[derive(Default)]
struct State {
    records: BTreeMap<RecordId, Record>,
    calls: Vec<Call>,
    fail_list: bool,
    fail_update: bool,
    fail_provision: bool,
    /// Requested path -> path the backend assigns.
    canonical: HashMap<String, String>,
    next_id: u64,
    revision: u64,
    /// Next update reports its start, then blocks until released.
    update_hold: Option<(oneshot::Sender<()>, mpsc::Receiver<()>)>,
    updates_in_flight: usize,
    peak_updates_in_flight: usize,
}

#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<State>,
}

pub fn rel(path: &str) -> RelPath {
    RelPath::parse(path).unwrap()
}

pub fn record(id: &str, path: &str, content: &str) -> Record {
    Record {
        id: RecordId::from(id),
        file_path: Some(path.to_string()),
        content: content.to_string(),
        updated_at: Some("rev-0".to_string()),
    }
}

fn status(method: &'static str, url: String, status: u16) -> RemoteError {
    RemoteError::Status {
        method,
        url,
        status,
        body: String::new(),
    }
}

impl FakeRemote {
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let remote = Self::default();
        {
            let mut state = remote.lock();
            state.next_id = 1000;
            for record in records {
                state.records.insert(record.id.clone(), record);
            }
        }
        remote
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Update { .. }))
            .collect()
    }

    pub fn stored(&self, id: &RecordId) -> Option<Record> {
        self.lock().records.get(id).cloned()
    }

    pub fn set_content(&self, id: &RecordId, content: &str) {
        if let Some(record) = self.lock().records.get_mut(id) {
            record.content = content.to_string();
        }
    }

    pub fn forget(&self, id: &RecordId) {
        self.lock().records.remove(id);
    }

    pub fn fail_list(&self) {
        self.lock().fail_list = true;
    }

    pub fn fail_update(&self) {
        self.lock().fail_update = true;
    }

    pub fn fail_provision(&self) {
        self.lock().fail_provision = true;
    }

    /// Make the next update block inside the backend. Returns a receiver
    /// that resolves once that update has started and a sender that lets
    /// it finish.
    pub fn hold_next_update(&self) -> (oneshot::Receiver<()>, mpsc::Sender<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel();
        self.lock().update_hold = Some((started_tx, release_rx));
        (started_rx, release_tx)
    }

    pub fn peak_updates_in_flight(&self) -> usize {
        self.lock().peak_updates_in_flight
    }

    pub fn assign_path(&self, requested: &str, canonical: &str) {
        self.lock()
            .canonical
            .insert(requested.to_string(), canonical.to_string());
    }
}

impl RemoteClient for FakeRemote {
    fn list(&self) -> Result<Vec<Record>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(Call::List);
        if state.fail_list {
            return Err(status("GET", "/".into(), 503));
        }
        Ok(state.records.values().cloned().collect())
    }

    fn get(&self, id: &RecordId) -> Result<Record, RemoteError> {
        let mut state = self.lock();
        state.calls.push(Call::Get(id.clone()));
        state
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| status("GET", format!("/{id}"), 404))
    }

    fn update(
        &self,
        id: &RecordId,
        content: &str,
        updated_at: Option<&str>,
    ) -> Result<Record, RemoteError> {
        let hold = {
            let mut state = self.lock();
            state.calls.push(Call::Update {
                id: id.clone(),
                content: content.to_string(),
                updated_at: updated_at.map(str::to_string),
            });
            state.updates_in_flight += 1;
            state.peak_updates_in_flight = state
                .peak_updates_in_flight
                .max(state.updates_in_flight);
            state.update_hold.take()
        };
        if let Some((started, release)) = hold {
            let _ = started.send(());
            let _ = release.recv();
        }

        let mut state = self.lock();
        state.updates_in_flight -= 1;
        if state.fail_update {
            return Err(status("PATCH", format!("/{id}"), 409));
        }
        state.revision += 1;
        let revision = format!("rev-{}", state.revision);
        let record = state
            .records
            .get_mut(id)
            .ok_or_else(|| status("PATCH", format!("/{id}"), 404))?;
        record.content = content.to_string();
        record.updated_at = Some(revision);
        Ok(record.clone())
    }

    fn provision(&self, path: &RelPath) -> Result<ProvisionReceipt, RemoteError> {
        let mut state = self.lock();
        state.calls.push(Call::Provision(path.clone()));
        if state.fail_provision {
            return Err(status("POST", "/cli".into(), 500));
        }
        state.next_id += 1;
        let id = RecordId::from(state.next_id);
        let assigned = state
            .canonical
            .get(path.as_str())
            .cloned()
            .unwrap_or_else(|| path.to_string());
        state.records.insert(
            id.clone(),
            Record {
                id: id.clone(),
                file_path: Some(assigned),
                content: String::new(),
                updated_at: Some("rev-0".to_string()),
            },
        );
        Ok(ProvisionReceipt::new(id))
    }
}

/// A workspace root inside a temporary directory, so reaping the root does
/// not fight the directory guard.
pub struct TestWorkspace {
    _tmp: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("workspace");
        Self { _tmp: tmp, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

/// Populated session over a fake backend holding `(id, path, content)`.
pub async fn seeded_session(
    records: &[(&str, &str, &str)],
) -> (TestWorkspace, Arc<FakeRemote>, Arc<Session>) {
    seeded_session_with(records, |_| {}).await
}

pub async fn seeded_session_with(
    records: &[(&str, &str, &str)],
    configure: impl FnOnce(&mut SessionOptions),
) -> (TestWorkspace, Arc<FakeRemote>, Arc<Session>) {
    let ws = TestWorkspace::new();
    let remote = Arc::new(FakeRemote::with_records(
        records
            .iter()
            .map(|(id, path, content)| record(id, path, content)),
    ));
    let mut options = SessionOptions::new(ws.path());
    configure(&mut options);
    let session = Session::new(options, remote.clone()).unwrap();
    session.populate().await.unwrap();
    (ws, remote, session)
}
