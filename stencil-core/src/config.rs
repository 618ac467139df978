//! Optional user configuration at `~/.stencil/config.yaml`.
//!
//! # API pattern
//!
//! - `load_at(home)`: explicit home; used in tests with `TempDir`
//! - `load()`: derives home from `dirs::home_dir()`, delegates to `load_at`
//!
//! A missing file yields [`Config::default`]; every field is optional.
//!
//! ```yaml
//! environments:
//!   localhost: http://127.0.0.1:4000/templates
//! workspace_parent: /home/me/stencil
//! debounce_ms: 1000
//! request_timeout_secs: 30
//! shutdown: flush
//! ignore:
//!   - "**/*.bak"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::ConfigError;
use crate::paths::stencil_root;

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What happens to pending pushes when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownMode {
    /// Cancel armed debounce timers; their edits are lost.
    #[default]
    Discard,
    /// Fire armed timers immediately and wait for in-flight work.
    Flush,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL overrides keyed by environment name.
    pub environments: BTreeMap<String, String>,
    /// Parent directory for session workspaces.
    pub workspace_parent: Option<PathBuf>,
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub shutdown: ShutdownMode,
    /// Extra glob patterns excluded from watching, relative to the workspace.
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environments: BTreeMap::new(),
            workspace_parent: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            shutdown: ShutdownMode::Discard,
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Base URL for `env`, without a trailing slash.
    pub fn base_url(&self, env: Environment) -> String {
        let url = self
            .environments
            .get(env.name())
            .map(String::as_str)
            .unwrap_or_else(|| env.default_base_url());
        url.trim_end_matches('/').to_string()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `<home>/.stencil/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    stencil_root(home).join(CONFIG_FILE)
}

/// Load the config file under `home`, or defaults when it does not exist.
///
/// Returns `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
