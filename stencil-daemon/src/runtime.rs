//! Session runtime: tokio wiring of the initial populate, the watcher,
//! signal handling and teardown.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use stencil_remote::RemoteClient;

use crate::error::{io_err, DaemonError};
use crate::events::WorkspaceEvent;
use crate::session::{Session, SessionOptions};
use crate::watcher::watch;

/// Start a session on a current-thread runtime and block until it ends.
pub fn start_blocking(
    options: SessionOptions,
    remote: Arc<dyn RemoteClient>,
) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(options, remote))
}

/// Run one session: populate, watch, handle events until a termination
/// signal, then tear down.
pub async fn run(options: SessionOptions, remote: Arc<dyn RemoteClient>) -> Result<(), DaemonError> {
    let session = Session::new(options, remote)?;
    session.populate().await?;

    let (events_tx, events_rx) = mpsc::unbounded_channel::<WorkspaceEvent>();
    let watcher = match watch(session.root(), session.ignore_rules(), session.gate(), events_tx) {
        Ok(watcher) => watcher,
        Err(err) => {
            if let Err(teardown) = session.shutdown().await {
                tracing::error!(error = %teardown, "teardown after watcher failure failed");
            }
            return Err(err);
        }
    };
    tracing::info!(root = %session.root().display(), "watching for changes");

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);
    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = wait_for_signal().await;
            let _ = shutdown.send(());
            result
        })
    };

    event_loop(&session, events_rx, shutdown_rx).await;
    drop(watcher);

    let teardown = session.shutdown().await;
    if signal_handle.is_finished() {
        handle_join("signal_handler", signal_handle.await)?;
    } else {
        signal_handle.abort();
    }
    teardown.map(|_| ())
}

/// Feed watcher events to the session until shutdown is signalled or the
/// event channel closes.
pub async fn event_loop(
    session: &Arc<Session>,
    mut events_rx: mpsc::UnboundedReceiver<WorkspaceEvent>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = events_rx.recv() => {
                let Some(event) = event else { break };
                tracing::debug!(?event, "workspace event");
                session.dispatch(event).await;
            }
        }
    }
}

async fn wait_for_signal() -> Result<(), DaemonError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).map_err(|e| io_err("SIGTERM handler", e))?;
        let mut hangup = signal(SignalKind::hangup()).map_err(|e| io_err("SIGHUP handler", e))?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.map_err(|e| io_err("ctrl-c handler", e))?,
            _ = terminate.recv() => {}
            _ = hangup.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| io_err("ctrl-c handler", e))?;
    }

    tracing::info!("received termination signal, shutting down");
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Join(format!("{task} task join failure: {err}"))),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
