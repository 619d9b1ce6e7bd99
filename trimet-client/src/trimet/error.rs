//! TriMet client error types.

use super::parse::ParseError;

/// Errors from a TriMet web service request.
///
/// Every variant is terminal for the request that produced it; nothing is
/// retried. A well-formed response carrying an `<errorMessage>` is not an
/// error at this level, see [`ServiceResponse`](super::ServiceResponse).
#[derive(Debug, thiserror::Error)]
pub enum TrimetError {
    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with something other than 200 OK.
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// The response body is not a document we understand.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The configured base URL can't be used to build request URLs.
    #[error("invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request was rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// Mock data could not be loaded or has no response for a request.
    #[error("mock data: {0}")]
    MockData(String),
}

impl TrimetError {
    /// True for failures at the HTTP layer (no response, or a non-200 status).
    pub fn is_http(&self) -> bool {
        matches!(self, TrimetError::Http(_) | TrimetError::Status { .. })
    }

    /// True when the response arrived but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, TrimetError::Parse(_))
    }

    /// The HTTP status code, if the service answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrimetError::Status { status } => Some(*status),
            TrimetError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
