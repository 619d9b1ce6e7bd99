//! TriMet web service client.
//!
//! Each call builds one URL, performs one GET and parses the reply. There is
//! no retrying, caching or shared state between calls; the client only
//! holds its configuration and transport, so it can be cloned freely and
//! used from several tasks at once.

use std::fmt;

use tracing::{debug, warn};
use url::Url;

use crate::domain::{LocationId, RouteId, join_ids};

use super::error::TrimetError;
use super::parse::{parse_arrivals, parse_detours};
use super::request::{Operation, RequestParams, arrivals_params, build_url, detours_params};
use super::transport::{HttpTransport, Transport};
use super::types::{ArrivalsResult, DetoursResult, ServiceResponse};

/// Default base URL for the TriMet web services.
const DEFAULT_BASE_URL: &str = "https://developer.trimet.org/ws/V1";

/// Configuration for the TriMet client.
#[derive(Clone, PartialEq, Eq)]
pub struct TrimetConfig {
    /// Application id issued by TriMet, sent as `appID`
    pub app_id: String,
    /// Base URL for the web services (defaults to production)
    pub base_url: String,
}

impl TrimetConfig {
    /// Create a new config with the given application id.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl fmt::Debug for TrimetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrimetConfig")
            .field("app_id", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// TriMet arrivals and detours client.
#[derive(Debug, Clone)]
pub struct TrimetClient<T = HttpTransport> {
    config: TrimetConfig,
    transport: T,
}

impl TrimetClient<HttpTransport> {
    /// Create a client that talks to the web service over HTTP.
    pub fn new(config: TrimetConfig) -> Result<Self, TrimetError> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> TrimetClient<T> {
    /// Create a client on top of any transport.
    pub fn with_transport(config: TrimetConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &TrimetConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The URL a request would be sent to, credential included.
    pub fn request_url(
        &self,
        operation: Operation,
        params: &RequestParams,
    ) -> Result<Url, TrimetError> {
        build_url(&self.config.base_url, operation, &self.config.app_id, params)
    }

    /// Get upcoming arrivals at one or more stops.
    ///
    /// At least one location id is required; an empty slice is rejected
    /// without contacting the service.
    pub async fn arrivals(
        &self,
        location_ids: &[LocationId],
    ) -> Result<ArrivalsResult, TrimetError> {
        if location_ids.is_empty() {
            return Err(TrimetError::InvalidRequest(
                "at least one location id is required",
            ));
        }

        debug!(
            locations = %join_ids(location_ids.iter().map(LocationId::as_str)),
            "fetching arrivals"
        );

        let body = self
            .fetch(Operation::Arrivals, &arrivals_params(location_ids))
            .await?;
        let result = parse_arrivals(&body)?;

        match &result {
            ServiceResponse::Data(arrivals) => debug!(
                locations = arrivals.locations.len(),
                arrivals = arrivals.arrivals.len(),
                route_statuses = arrivals.route_statuses.len(),
                "parsed arrivals"
            ),
            ServiceResponse::ServiceError { message } => {
                warn!(operation = "arrivals", %message, "service reported an error")
            }
        }

        Ok(result)
    }

    /// Get current detours, optionally limited to some routes.
    ///
    /// An empty slice asks for detours on every route.
    pub async fn detours(&self, routes: &[RouteId]) -> Result<DetoursResult, TrimetError> {
        debug!(
            routes = %join_ids(routes.iter().map(RouteId::as_str)),
            "fetching detours"
        );

        let body = self
            .fetch(Operation::Detours, &detours_params(routes))
            .await?;
        let result = parse_detours(&body)?;

        match &result {
            ServiceResponse::Data(detours) => {
                debug!(detours = detours.detours.len(), "parsed detours")
            }
            ServiceResponse::ServiceError { message } => {
                warn!(operation = "detours", %message, "service reported an error")
            }
        }

        Ok(result)
    }

    /// Perform the GET and hand back the body of a 200 response.
    async fn fetch(
        &self,
        operation: Operation,
        params: &RequestParams,
    ) -> Result<String, TrimetError> {
        let url = self.request_url(operation, params)?;

        // The query string carries the credential; log the path only.
        debug!(%operation, path = url.path(), "sending request");

        let response = self.transport.get(&url).await?;

        if response.status != 200 {
            debug!(%operation, status = response.status, "request failed");
            return Err(TrimetError::Status {
                status: response.status,
            });
        }

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trimet::MockTransport;

    fn mock_client(mock: MockTransport) -> TrimetClient<MockTransport> {
        TrimetClient::with_transport(
            TrimetConfig::new("test-key").with_base_url("http://localhost/ws/V1"),
            mock,
        )
    }

    #[test]
    fn config_builder() {
        let config = TrimetConfig::new("test-key").with_base_url("http://localhost:8080");

        assert_eq!(config.app_id, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn config_defaults() {
        let config = TrimetConfig::new("test-key");

        assert_eq!(config.app_id, "test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn config_debug_hides_app_id() {
        let debug = format!("{:?}", TrimetConfig::new("s3cret"));
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("developer.trimet.org"));
    }

    #[test]
    fn client_creation() {
        let client = TrimetClient::new(TrimetConfig::new("test-key"));
        assert!(client.is_ok());
    }

    #[test]
    fn request_url_includes_credential() {
        let client = mock_client(MockTransport::new());
        let url = client
            .request_url(Operation::Arrivals, &arrivals_params(&[LocationId::from(6849)]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost/ws/V1/arrivals?appID=test-key&locIDs=6849"
        );
    }

    #[tokio::test]
    async fn arrivals_from_mock_data() {
        let mock = MockTransport::from_dir("data/mock").unwrap();
        let client = mock_client(mock.clone());

        let result = client
            .arrivals(&[LocationId::from(6849), LocationId::from(6850)])
            .await
            .unwrap();

        let arrivals = result.data().unwrap();
        assert_eq!(arrivals.locations.len(), 2);
        assert_eq!(arrivals.arrivals.len(), 3);

        let requests = mock.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path(), "/ws/V1/arrivals");
        assert_eq!(
            requests[0].query(),
            Some("appID=test-key&locIDs=6849%2C6850")
        );
    }

    #[tokio::test]
    async fn detours_from_mock_data() {
        let mock = MockTransport::from_dir("data/mock").unwrap();
        let client = mock_client(mock.clone());

        let result = client.detours(&[]).await.unwrap();
        assert_eq!(result.data().unwrap().detours.len(), 2);

        let requests = mock.requests().await;
        assert_eq!(requests[0].query(), Some("appID=test-key"));
    }

    #[tokio::test]
    async fn empty_arrivals_request_is_rejected() {
        let mock = MockTransport::from_dir("data/mock").unwrap();
        let client = mock_client(mock.clone());

        let result = client.arrivals(&[]).await;
        assert!(matches!(result, Err(TrimetError::InvalidRequest(_))));
        assert!(mock.requests().await.is_empty());
    }

    #[tokio::test]
    async fn non_200_status_skips_parsing() {
        let mock = MockTransport::new()
            .with_response(Operation::Arrivals, 500, "<not xml")
            .with_response(Operation::Detours, 201, "<resultSet/>");
        let client = mock_client(mock);

        let err = client.arrivals(&[LocationId::from(1)]).await.unwrap_err();
        assert!(matches!(err, TrimetError::Status { status: 500 }));
        assert_eq!(err.status(), Some(500));

        let err = client.detours(&[]).await.unwrap_err();
        assert!(matches!(err, TrimetError::Status { status: 201 }));
    }

    #[tokio::test]
    async fn missing_mock_response_is_404() {
        let client = mock_client(MockTransport::new());
        let err = client.detours(&[RouteId::from(44)]).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn service_error_is_not_an_err() {
        let mock = MockTransport::new().with_response(
            Operation::Arrivals,
            200,
            "<resultSet><errorMessage>Location id not found 99999</errorMessage></resultSet>",
        );
        let client = mock_client(mock);

        let result = client.arrivals(&[LocationId::from(99999)]).await.unwrap();
        assert_eq!(result.error_message(), Some("Location id not found 99999"));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mock = MockTransport::new().with_response(Operation::Detours, 200, "<resultSet>");
        let client = mock_client(mock);

        let err = client.detours(&[]).await.unwrap_err();
        assert!(err.is_parse());
    }
}
