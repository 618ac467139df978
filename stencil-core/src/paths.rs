//! Filesystem layout.
//!
//! ```text
//! ~/.stencil/
//!   config.yaml
//!   workspaces/
//!     <env>-<session hash>/     (one per session, deleted at session end)
//! ```

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::environment::Environment;

/// Number of hex characters of the session hash used in directory names.
pub const SESSION_HASH_LEN: usize = 12;

/// `<home>/.stencil/`
pub fn stencil_root(home: &Path) -> PathBuf {
    home.join(".stencil")
}

/// `<home>/.stencil/workspaces/`
pub fn default_workspace_parent(home: &Path) -> PathBuf {
    stencil_root(home).join("workspaces")
}

/// Directory name identifying a session: stable for one (environment, token)
/// pair, and never containing the token itself.
pub fn session_dir_name(env: Environment, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(env.name().as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}-{}", env.name(), &digest[..SESSION_HASH_LEN])
}

/// `<parent>/<env>-<session hash>`: pure, no I/O.
pub fn workspace_root(parent: &Path, env: Environment, token: &str) -> PathBuf {
    parent.join(session_dir_name(env, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_dir_is_deterministic_and_hides_token() {
        let a = session_dir_name(Environment::Development, "secret-token");
        let b = session_dir_name(Environment::Development, "secret-token");
        assert_eq!(a, b);
        assert!(a.starts_with("development-"));
        assert_eq!(a.len(), "development-".len() + SESSION_HASH_LEN);
        assert!(!a.contains("secret"));
    }

    #[test]
    fn session_dir_differs_per_environment_and_token() {
        let base = session_dir_name(Environment::Production, "t1");
        assert_ne!(base, session_dir_name(Environment::Localhost, "t1"));
        assert_ne!(base, session_dir_name(Environment::Production, "t2"));
    }
}
