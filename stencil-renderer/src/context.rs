//! Template context: serializable rendering payload for the reference document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stencil_core::{Environment, SyncMap};

use crate::engine::REFERENCE_DOC_NAME;
use crate::error::RenderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceContext {
    pub environment: String,
    pub base_url: String,
    pub workspace: String,
    pub generated_at: DateTime<Utc>,
    pub debounce_ms: u64,
    pub doc_name: String,
    /// One entry per synchronized file, sorted by path.
    pub records: Vec<RecordCtx>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCtx {
    pub path: String,
    pub id: String,
}

impl ReferenceContext {
    pub fn new(
        environment: Environment,
        base_url: impl Into<String>,
        workspace: impl Into<String>,
        map: &SyncMap,
        debounce_ms: u64,
    ) -> Self {
        let records = map
            .paths()
            .into_iter()
            .filter_map(|path| {
                map.get(&path).map(|record| RecordCtx {
                    path: path.to_string(),
                    id: record.id.to_string(),
                })
            })
            .collect();

        Self {
            environment: environment.to_string(),
            base_url: base_url.into(),
            workspace: workspace.into(),
            generated_at: Utc::now(),
            debounce_ms,
            doc_name: REFERENCE_DOC_NAME.to_string(),
            records,
        }
    }

    /// Convert to a [`tera::Context`].
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
