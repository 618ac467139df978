//! # stencil-daemon
//!
//! Session runtime for one synchronized workspace.
//!
//! A session populates the workspace from a full listing, watches it, and
//! reacts to each change:
//! - modified files are pushed after a quiet period ([`debounce`], [`pusher`])
//! - rejected pushes restore the remote version ([`resolver`])
//! - new files are provisioned remotely and moved to the path the backend
//!   assigns ([`provisioner`], [`gate`])
//! - on termination the workspace is deleted ([`reaper`])
//!
//! All shared state lives in [`Session`]; [`runtime`] wires it to the
//! watcher and process signals.

pub mod debounce;
pub mod error;
pub mod events;
pub mod gate;
pub mod ignore;
pub mod provisioner;
pub mod pusher;
pub mod reaper;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use debounce::Debouncer;
pub use error::DaemonError;
pub use events::WorkspaceEvent;
pub use gate::PathGate;
pub use ignore::IgnoreRules;
pub use provisioner::ProvisionOutcome;
pub use pusher::PushOutcome;
pub use resolver::ResolveOutcome;
pub use runtime::{event_loop, run, start_blocking};
pub use session::{Session, SessionOptions};
pub use snapshot::PopulateReport;
pub use watcher::{classify, watch, WorkspaceWatcher};
