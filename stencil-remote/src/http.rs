//! `ureq` implementation of [`RemoteClient`].
//!
//! | Operation | Request                                   |
//! |-----------|-------------------------------------------|
//! | list      | `GET {base}/`                             |
//! | get       | `GET {base}/{id}`                         |
//! | update    | `PATCH {base}/{id}` `{code, updated_at}`  |
//! | provision | `POST {base}/cli` `{file_path}`           |

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use stencil_core::{ProvisionReceipt, Record, RecordId, RelPath};

use crate::client::RemoteClient;
use crate::error::RemoteError;

/// Longest response body kept in a [`RemoteError::Status`].
const MAX_ERROR_BODY: usize = 512;

pub struct HttpRemote {
    base_url: String,
    token: String,
    agent: ureq::Agent,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url,
            token: token.into(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, tail: &str) -> String {
        format!("{}/{}", self.base_url, tail)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<T, RemoteError> {
        tracing::debug!(method, url = %url, "remote request");
        let request = self
            .agent
            .request(method, &url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json");

        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        let response = result.map_err(|err| match err {
            ureq::Error::Status(status, response) => {
                let mut body = response.into_string().unwrap_or_default();
                if body.len() > MAX_ERROR_BODY {
                    let cut = (0..=MAX_ERROR_BODY)
                        .rev()
                        .find(|i| body.is_char_boundary(*i))
                        .unwrap_or(0);
                    body.truncate(cut);
                }
                RemoteError::Status {
                    method,
                    url: url.clone(),
                    status,
                    body,
                }
            }
            ureq::Error::Transport(transport) => RemoteError::Transport {
                method,
                url: url.clone(),
                message: transport.to_string(),
            },
        })?;

        response
            .into_json::<T>()
            .map_err(|source| RemoteError::Decode {
                method,
                url,
                source,
            })
    }
}

impl RemoteClient for HttpRemote {
    fn list(&self) -> Result<Vec<Record>, RemoteError> {
        self.send("GET", self.url(""), None)
    }

    fn get(&self, id: &RecordId) -> Result<Record, RemoteError> {
        self.send("GET", self.url(&id.0), None)
    }

    fn update(
        &self,
        id: &RecordId,
        content: &str,
        updated_at: Option<&str>,
    ) -> Result<Record, RemoteError> {
        let body = json!({ "code": content, "updated_at": updated_at });
        self.send("PATCH", self.url(&id.0), Some(body))
    }

    fn provision(&self, path: &RelPath) -> Result<ProvisionReceipt, RemoteError> {
        let body = json!({ "file_path": path.as_str() });
        let receipt: ProvisionReceipt = self.send("POST", self.url("cli"), Some(body))?;
        if receipt.primary_id().is_none() {
            return Err(RemoteError::MissingPrimary {
                path: path.to_string(),
            });
        }
        Ok(receipt)
    }
}
