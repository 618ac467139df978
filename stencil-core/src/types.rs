//! Domain types shared by the remote client, the workspace writer and the
//! session runtime.
//!
//! Wire payloads use the backend's field names (`file_path`, `code`,
//! `updated_at`); the Rust names describe what the fields mean locally.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of a remote record.
///
/// The backend emits ids either as JSON strings or integers; both are kept
/// as their decimal/string form so equality never depends on the encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawRecordId")]
pub struct RecordId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawRecordId> for RecordId {
    fn from(raw: RawRecordId) -> Self {
        match raw {
            RawRecordId::Text(s) => Self(s),
            RawRecordId::Signed(n) => Self(n.to_string()),
            RawRecordId::Unsigned(n) => Self(n.to_string()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// A workspace-relative path in canonical form: forward slashes, no leading
/// `./` or `/`, no empty, `.` or `..` segments.
///
/// This is the only normalization used when comparing paths, so every key of
/// the [`SyncMap`](crate::SyncMap) and every watcher event goes through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RelPath(String);

impl RelPath {
    /// Parse a path as declared by the backend or typed by a user.
    ///
    /// Returns `None` for empty paths and for paths that would escape the
    /// workspace root.
    pub fn parse(raw: &str) -> Option<Self> {
        let unified = raw.replace('\\', "/");
        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return None,
                other => segments.push(other),
            }
        }
        if segments.is_empty() {
            return None;
        }
        Some(Self(segments.join("/")))
    }

    /// Relativize an absolute path observed under `root`.
    pub fn from_workspace(root: &Path, path: &Path) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        let mut segments = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str()?.to_owned()),
                Component::CurDir => continue,
                _ => return None,
            }
        }
        if segments.is_empty() {
            return None;
        }
        Some(Self(segments.join("/")))
    }

    /// Absolute location of this path under `root`.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.0.split('/') {
            path.push(segment);
        }
        path
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// A remote-owned content template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Path the backend assigns to the record; absent for records that are
    /// not projected into the workspace.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Template source. A null `code` (an empty template) decodes as "".
    #[serde(rename = "code", default, deserialize_with = "null_as_empty")]
    pub content: String,
    /// Opaque last-modified marker echoed back on update for optimistic
    /// concurrency.
    #[serde(default)]
    pub updated_at: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// The declared path in canonical form, if any and if it stays inside the
    /// workspace.
    pub fn rel_path(&self) -> Option<RelPath> {
        self.file_path.as_deref().and_then(RelPath::parse)
    }
}

/// Response of the provisioning endpoint.
///
/// Accepts `{"id": …}`, `{"primary_id": …}` and `{"primary": {"id": …}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionReceipt {
    #[serde(default, alias = "primary_id")]
    id: Option<RecordId>,
    #[serde(default)]
    primary: Option<PrimaryRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct PrimaryRef {
    id: RecordId,
}

impl ProvisionReceipt {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: Some(id.into()),
            primary: None,
        }
    }

    /// Id of the record the backend designates as primary for the new file.
    pub fn primary_id(&self) -> Option<&RecordId> {
        self.primary
            .as_ref()
            .map(|primary| &primary.id)
            .or(self.id.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_path_normalizes_separators_and_prefixes() {
        let p = RelPath::parse("./emails\\welcome//intro.liquid").unwrap();
        assert_eq!(p.as_str(), "emails/welcome/intro.liquid");
        assert_eq!(p.file_name(), "intro.liquid");
        assert_eq!(RelPath::parse("/a/b").unwrap().as_str(), "a/b");
    }

    #[test]
    fn rel_path_rejects_escapes_and_empty() {
        assert!(RelPath::parse("../etc/passwd").is_none());
        assert!(RelPath::parse("a/../../b").is_none());
        assert!(RelPath::parse("").is_none());
        assert!(RelPath::parse("./").is_none());
    }

    #[test]
    fn rel_path_from_workspace_strips_root() {
        let root = Path::new("/tmp/ws");
        let p = RelPath::from_workspace(root, Path::new("/tmp/ws/a/b.html")).unwrap();
        assert_eq!(p.as_str(), "a/b.html");
        assert_eq!(p.to_path(root), PathBuf::from("/tmp/ws/a/b.html"));
        assert!(RelPath::from_workspace(root, Path::new("/tmp/other/x")).is_none());
        assert!(RelPath::from_workspace(root, root).is_none());
    }

    #[test]
    fn record_decodes_wire_names_and_numeric_ids() {
        let record: Record = serde_json::from_str(
            r#"{"id": 42, "file_path": "a.html", "code": "<p>hi</p>", "updated_at": "2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.id, RecordId::from("42"));
        assert_eq!(record.rel_path().unwrap().as_str(), "a.html");
        assert_eq!(record.content, "<p>hi</p>");
        assert_eq!(record.updated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn record_without_path_has_no_rel_path() {
        let record: Record = serde_json::from_str(r#"{"id": "abc", "code": "x"}"#).unwrap();
        assert!(record.rel_path().is_none());
        assert!(record.updated_at.is_none());
    }

    #[test]
    fn null_code_and_marker_decode_as_empty_template() {
        let records: Vec<Record> = serde_json::from_str(
            r#"[{"id": 1, "file_path": "a.html", "code": "a", "updated_at": "m1"},
                {"id": 2, "file_path": "b.html", "code": null, "updated_at": null}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].content, "");
        assert!(records[1].updated_at.is_none());
        assert_eq!(records[1].rel_path().unwrap().as_str(), "b.html");
    }

    #[test]
    fn missing_code_decodes_as_empty_template() {
        let record: Record = serde_json::from_str(r#"{"id": 3, "file_path": "c.html"}"#).unwrap();
        assert_eq!(record.content, "");
    }

    #[test]
    fn provision_receipt_accepts_all_shapes() {
        let flat: ProvisionReceipt = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        let named: ProvisionReceipt = serde_json::from_str(r#"{"primary_id": "7"}"#).unwrap();
        let nested: ProvisionReceipt =
            serde_json::from_str(r#"{"primary": {"id": 7}, "created": [7, 8]}"#).unwrap();
        for receipt in [flat, named, nested] {
            assert_eq!(receipt.primary_id(), Some(&RecordId::from("7")));
        }
        let empty: ProvisionReceipt = serde_json::from_str("{}").unwrap();
        assert!(empty.primary_id().is_none());
    }
}
