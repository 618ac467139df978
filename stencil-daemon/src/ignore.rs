//! Paths the watcher never reports.

use globset::{Glob, GlobSet, GlobSetBuilder};

use stencil_core::RelPath;
use stencil_renderer::REFERENCE_DOC_NAME;
use stencil_sync::TMP_SUFFIX;

use crate::error::DaemonError;

/// Editor metadata directories and scratch files, at any depth.
pub const EDITOR_PATTERNS: &[&str] = &[
    "**/.git",
    "**/.git/**",
    "**/.vscode",
    "**/.vscode/**",
    "**/.idea",
    "**/.idea/**",
    "**/.history",
    "**/.history/**",
    "**/.DS_Store",
    "**/*.swp",
    "**/*.swo",
    "**/*.swx",
    "**/*~",
    "**/.#*",
    "**/#*#",
    "**/4913",
];

pub struct IgnoreRules {
    set: GlobSet,
}

impl IgnoreRules {
    /// Built-in patterns plus the session's own files plus `extra`.
    pub fn new(extra: &[String]) -> Result<Self, DaemonError> {
        let tmp_pattern = format!("**/*{TMP_SUFFIX}");
        let builtin = EDITOR_PATTERNS
            .iter()
            .copied()
            .chain([tmp_pattern.as_str(), REFERENCE_DOC_NAME]);

        let mut builder = GlobSetBuilder::new();
        for pattern in builtin.chain(extra.iter().map(String::as_str)) {
            let glob = Glob::new(pattern).map_err(|source| DaemonError::IgnorePattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| DaemonError::IgnorePattern {
            pattern: "<set>".to_string(),
            source,
        })?;
        Ok(Self { set })
    }

    pub fn is_ignored(&self, path: &RelPath) -> bool {
        self.set.is_match(path.as_str())
    }
}
