//! HTTP transport for TriMet requests.

use std::future::Future;

use url::Url;

use super::error::TrimetError;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// Something that can perform a single GET.
///
/// Implementations make exactly one attempt per call. Any status code is a
/// successful exchange at this level; deciding what a status means is the
/// client's job.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> impl Future<Output = Result<RawResponse, TrimetError>> + Send;
}

/// Transport backed by a `reqwest` client.
///
/// Uses reqwest's defaults for redirects and timeouts.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh HTTP client.
    pub fn new() -> Result<Self, TrimetError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("trimet-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http })
    }

    /// Wrap an existing HTTP client, e.g. one shared with other code.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, TrimetError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status().as_u16();

        // The body of a failed request is never parsed, so a broken read
        // there shouldn't hide the status.
        let body = if status == 200 {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };

        Ok(RawResponse { status, body })
    }
}
