//! Stencil core library: domain types, sync map, environments, config, errors.
//!
//! Public API surface:
//! - [`types`]: record identity, workspace-relative paths, wire payloads
//! - [`sync_map`]: [`SyncMap`], the path → record index for one session
//! - [`environment`]: logical backend names and their base URLs
//! - [`config`]: optional `~/.stencil/config.yaml`
//! - [`paths`]: workspace root derivation
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod environment;
pub mod error;
pub mod paths;
pub mod sync_map;
pub mod types;

pub use config::{Config, ShutdownMode};
pub use environment::Environment;
pub use error::ConfigError;
pub use sync_map::SyncMap;
pub use types::{ProvisionReceipt, Record, RecordId, RelPath};
