//! Mock transport for working without network access or an application id.
//!
//! Serves canned responses per operation, either loaded from XML files or
//! set up in code, and records every URL it was asked for.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::TrimetError;
use super::request::Operation;
use super::transport::{RawResponse, Transport};

/// Transport that answers from canned responses.
///
/// Clones share the same responses and request log, so a test can hand one
/// clone to a client and inspect the requests through another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Responses keyed by operation.
    responses: Arc<RwLock<HashMap<Operation, RawResponse>>>,
    /// URLs requested so far, oldest first.
    requests: Arc<Mutex<Vec<Url>>>,
}

impl MockTransport {
    /// Create a mock with no responses; every request gets a 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load responses from a directory.
    ///
    /// Expects files named after the operation (`arrivals.xml`,
    /// `detours.xml`); each is served with status 200. At least one must exist.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, TrimetError> {
        let responses = load_dir(data_dir.as_ref())?;
        Ok(Self {
            responses: Arc::new(RwLock::new(responses)),
            requests: Arc::default(),
        })
    }

    /// Serve `body` with `status` for every request to `operation`.
    pub fn with_response(self, operation: Operation, status: u16, body: impl Into<String>) -> Self {
        // Builders run before any request is made, so the lock is uncontended.
        if let Ok(mut responses) = self.responses.try_write() {
            responses.insert(operation, RawResponse::new(status, body));
        }
        self
    }

    /// Replace the response for an operation.
    pub async fn set_response(&self, operation: Operation, response: RawResponse) {
        self.responses.write().await.insert(operation, response);
    }

    /// Operations that have a canned response.
    pub async fn available_operations(&self) -> Vec<Operation> {
        let responses = self.responses.read().await;
        Operation::ALL
            .into_iter()
            .filter(|op| responses.contains_key(op))
            .collect()
    }

    /// Every URL requested so far.
    pub async fn requests(&self) -> Vec<Url> {
        self.requests.lock().await.clone()
    }

    /// Reload responses from disk (useful during development).
    pub async fn reload(&self, data_dir: impl AsRef<Path>) -> Result<(), TrimetError> {
        let fresh = load_dir(data_dir.as_ref())?;
        *self.responses.write().await = fresh;
        Ok(())
    }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<Operation, RawResponse>, TrimetError> {
    let mut responses = HashMap::new();

    for operation in Operation::ALL {
        let path = data_dir.join(format!("{}.xml", operation.key()));
        if !path.is_file() {
            continue;
        }

        let body = std::fs::read_to_string(&path)
            .map_err(|e| TrimetError::MockData(format!("failed to read {:?}: {}", path, e)))?;

        responses.insert(operation, RawResponse::ok(body));
    }

    if responses.is_empty() {
        return Err(TrimetError::MockData(format!(
            "no mock response files found in {:?}",
            data_dir
        )));
    }

    Ok(responses)
}

/// The operation a URL is addressed to, from its last path segment.
fn operation_for(url: &Url) -> Option<Operation> {
    let last = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Operation::ALL.into_iter().find(|op| op.key() == last)
}

impl Transport for MockTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TrimetError> {
        self.requests.lock().await.push(url.clone());

        let operation = operation_for(url)
            .ok_or_else(|| TrimetError::MockData(format!("no operation for URL {url}")))?;

        let responses = self.responses.read().await;
        Ok(responses
            .get(&operation)
            .cloned()
            .unwrap_or_else(|| RawResponse::new(404, "")))
    }
}
