//! # stencil-sync
//!
//! Blocking filesystem operations on a session workspace: materializing a
//! snapshot, atomic writes, reads, relocations, deletions and the final reap.
//!
//! Nothing here talks to the network or knows about timers; the session
//! runtime in `stencil-daemon` decides when each operation runs.

pub mod error;
pub mod workspace;
pub mod writer;

pub use error::SyncError;
pub use workspace::{
    materialize, read_local, reap, relocate, remove_local, SkipReason, SkippedRecord,
    SnapshotReport,
};
pub use writer::{atomic_write, TMP_SUFFIX};
