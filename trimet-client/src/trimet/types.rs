//! Records parsed from TriMet `<resultSet>` documents.
//!
//! Attribute values are kept as the strings the service sent, with `None`
//! for attributes it left out. The only fields converted while parsing are
//! the epoch-millisecond instants, which become UTC `DateTime`s.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a request that returned a well-formed document.
///
/// The service reports some failures (unknown stop, bad credential) inside
/// an otherwise normal 200 response. Those come back as `ServiceError`
/// rather than as a `TrimetError`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ServiceResponse<T> {
    /// The document carried data.
    Data(T),
    /// The document carried a single `<errorMessage>` and nothing else was read.
    ServiceError { message: String },
}

impl<T> ServiceResponse<T> {
    /// True if the service reported an error message.
    pub fn is_service_error(&self) -> bool {
        matches!(self, ServiceResponse::ServiceError { .. })
    }

    /// The parsed data, if the service didn't report an error.
    pub fn data(&self) -> Option<&T> {
        match self {
            ServiceResponse::Data(data) => Some(data),
            ServiceResponse::ServiceError { .. } => None,
        }
    }

    /// Consume the response, keeping only the data.
    pub fn into_data(self) -> Option<T> {
        match self {
            ServiceResponse::Data(data) => Some(data),
            ServiceResponse::ServiceError { .. } => None,
        }
    }

    /// The service's error message, if there was one.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ServiceResponse::Data(_) => None,
            ServiceResponse::ServiceError { message } => Some(message),
        }
    }
}

/// Response to an arrivals request.
pub type ArrivalsResult = ServiceResponse<Arrivals>;

/// Response to a detours request.
pub type DetoursResult = ServiceResponse<Detours>;

/// Body of a successful arrivals response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Arrivals {
    /// When the service answered the query (`queryTime`).
    pub query_time: Option<DateTime<Utc>>,
    /// The stops that were asked about.
    pub locations: Vec<Location>,
    /// Predicted and scheduled arrivals, in document order.
    pub arrivals: Vec<Arrival>,
    /// Per-route prediction status (e.g. `estimatedOnly`, `off`).
    pub route_statuses: Vec<RouteStatus>,
}

/// Body of a successful detours response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Detours {
    pub detours: Vec<Detour>,
}

/// A stop (`<location>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Location {
    /// `desc`
    pub description: Option<String>,
    /// `lat`
    pub latitude: Option<String>,
    /// `lng`
    pub longitude: Option<String>,
    /// `dir`, e.g. "Westbound".
    pub traffic_direction: Option<String>,
    /// `locid`
    pub location_id: Option<String>,
}

impl Location {
    /// Latitude and longitude as numbers, when both are present and valid.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude.as_deref()?.trim().parse().ok()?;
        let lng = self.longitude.as_deref()?.trim().parse().ok()?;
        Some((lat, lng))
    }
}

/// A single vehicle arrival at a stop (`<arrival>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Arrival {
    pub block: Option<String>,
    /// `departed`, "true" once the vehicle has left its origin.
    pub departed: Option<String>,
    /// `detour`, "true" if the trip is affected by a detour.
    pub detour: Option<String>,
    /// `dir`
    pub direction: Option<String>,
    /// `fullSign`, the full headsign text.
    pub full_sign: Option<String>,
    /// `shortSign`
    pub short_sign: Option<String>,
    /// `locid`
    pub location_id: Option<String>,
    pub piece: Option<String>,
    /// `route`
    pub route_number: Option<String>,
    /// `status`: "estimated", "scheduled", "delayed", "canceled" or "drop".
    pub status: Option<String>,
    /// `scheduled`
    pub scheduled: Option<DateTime<Utc>>,
    /// `estimated`, present only when the vehicle is being tracked.
    pub estimated: Option<DateTime<Utc>>,
    /// Real-time position of the vehicle serving this arrival.
    pub block_position: Option<BlockPosition>,
}

impl Arrival {
    /// Whether the vehicle has already departed.
    pub fn is_departed(&self) -> bool {
        flag(self.departed.as_deref())
    }

    /// Whether the trip is running on a detour.
    pub fn is_detoured(&self) -> bool {
        flag(self.detour.as_deref())
    }

    /// Whether the arrival time is a real-time estimate.
    pub fn is_estimated(&self) -> bool {
        self.status.as_deref() == Some("estimated")
    }

    /// The estimated time if known, otherwise the scheduled time.
    pub fn best_time(&self) -> Option<DateTime<Utc>> {
        self.estimated.or(self.scheduled)
    }
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Vehicle position and trip progress for an arrival (`<blockPosition>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockPosition {
    /// `lat`
    pub latitude: Option<String>,
    /// `lng`
    pub longitude: Option<String>,
    pub heading: Option<String>,
    /// `at`, when the position was recorded (epoch ms, unconverted).
    pub at: Option<String>,
    /// `feet` away from the stop.
    pub feet: Option<String>,
    pub trips: Vec<Trip>,
    pub layovers: Vec<Layover>,
}

/// A trip the vehicle runs before reaching the stop (`<trip>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trip {
    /// `desc`
    pub description: Option<String>,
    /// `destDist`
    pub destination_distance: Option<String>,
    /// `dir`
    pub direction: Option<String>,
    pub pattern: Option<String>,
    pub progress: Option<String>,
    pub route: Option<String>,
    /// `tripNum`
    pub trip_number: Option<String>,
}

/// A layover between trips (`<layover>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layover {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Prediction status of a route (`<routeStatus>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteStatus {
    pub route: Option<String>,
    pub status: Option<String>,
}

/// Vehicle classification of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    /// Type code `B`.
    Bus,
    /// Any other type code: light rail, streetcar, commuter rail, aerial tram.
    Rail,
}

impl RouteType {
    /// Classify a TriMet route type code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("B") => RouteType::Bus,
            _ => RouteType::Rail,
        }
    }
}

/// A route affected by a detour (`<route>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Route {
    /// `desc`, e.g. "44-Capitol Hwy" or "MAX Blue Line".
    pub description: Option<String>,
    /// `route`
    pub route_id: Option<String>,
    /// `type`, `B` for bus and `R` for rail or aerial tram.
    pub type_code: Option<String>,
}

impl Route {
    pub fn route_type(&self) -> RouteType {
        RouteType::from_code(self.type_code.as_deref())
    }

    pub fn is_bus(&self) -> bool {
        self.route_type() == RouteType::Bus
    }
}

/// A service disruption (`<detour>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Detour {
    pub begin: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// `desc`
    pub description: Option<String>,
    /// `id`
    pub detour_id: Option<String>,
    /// Text written for speech synthesis.
    pub phonetic: Option<String>,
    pub routes: Vec<Route>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_type_from_code() {
        assert_eq!(RouteType::from_code(Some("B")), RouteType::Bus);
        assert_eq!(RouteType::from_code(Some("R")), RouteType::Rail);
        assert_eq!(RouteType::from_code(Some("b")), RouteType::Rail);
        assert_eq!(RouteType::from_code(None), RouteType::Rail);
    }

    #[test]
    fn route_is_bus() {
        let bus = Route {
            type_code: Some("B".into()),
            ..Default::default()
        };
        let rail = Route {
            type_code: Some("R".into()),
            ..Default::default()
        };
        assert!(bus.is_bus());
        assert!(!rail.is_bus());
        assert_eq!(rail.route_type(), RouteType::Rail);
    }

    #[test]
    fn arrival_flags() {
        let arrival = Arrival {
            departed: Some("true".into()),
            detour: Some("false".into()),
            status: Some("estimated".into()),
            ..Default::default()
        };
        assert!(arrival.is_departed());
        assert!(!arrival.is_detoured());
        assert!(arrival.is_estimated());

        let arrival = Arrival::default();
        assert!(!arrival.is_departed());
        assert!(!arrival.is_detoured());
        assert!(!arrival.is_estimated());
    }

    #[test]
    fn best_time_prefers_estimate() {
        let scheduled = DateTime::from_timestamp(1_300_000_000, 0);
        let estimated = DateTime::from_timestamp(1_300_000_120, 0);

        let arrival = Arrival {
            scheduled,
            estimated,
            ..Default::default()
        };
        assert_eq!(arrival.best_time(), estimated);

        let arrival = Arrival {
            scheduled,
            ..Default::default()
        };
        assert_eq!(arrival.best_time(), scheduled);
    }

    #[test]
    fn location_coordinates() {
        let loc = Location {
            latitude: Some("45.5122".into()),
            longitude: Some("-122.6587".into()),
            ..Default::default()
        };
        assert_eq!(loc.coordinates(), Some((45.5122, -122.6587)));

        let loc = Location {
            latitude: Some("45.5122".into()),
            ..Default::default()
        };
        assert_eq!(loc.coordinates(), None);

        let loc = Location {
            latitude: Some("north".into()),
            longitude: Some("-122.6587".into()),
            ..Default::default()
        };
        assert_eq!(loc.coordinates(), None);
    }

    #[test]
    fn service_response_accessors() {
        let ok: ServiceResponse<Detours> = ServiceResponse::Data(Detours::default());
        assert!(!ok.is_service_error());
        assert!(ok.data().is_some());
        assert_eq!(ok.error_message(), None);
        assert!(ok.into_data().is_some());

        let err: ServiceResponse<Detours> = ServiceResponse::ServiceError {
            message: "Invalid appID".into(),
        };
        assert!(err.is_service_error());
        assert!(err.data().is_none());
        assert_eq!(err.error_message(), Some("Invalid appID"));
        assert!(err.into_data().is_none());
    }

    #[test]
    fn service_response_serializes_tagged() {
        let err: ServiceResponse<Detours> = ServiceResponse::ServiceError {
            message: "Invalid appID".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "service_error");
        assert_eq!(json["message"], "Invalid appID");
    }
}
