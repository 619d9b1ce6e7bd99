//! TriMet web services client.
//!
//! This module provides an HTTP client for the TriMet developer web
//! services (`developer.trimet.org/ws/V1`), which publish real-time
//! arrivals and service detours as XML.
//!
//! Key characteristics of the service:
//! - Every request carries an application id in the `appID` parameter
//! - Stop and route lists are sent comma-joined in a single parameter
//! - Times are milliseconds since the Unix epoch
//! - Some failures (unknown stop, bad application id) come back as a
//!   200 response with an `<errorMessage>` element instead of data

mod client;
mod error;
mod mock;
mod parse;
mod request;
mod transport;
mod types;

pub use client::{TrimetClient, TrimetConfig};
pub use error::TrimetError;
pub use mock::MockTransport;
pub use parse::{ParseError, parse_arrivals, parse_detours};
pub use request::{
    APP_ID_PARAM, Operation, QueryValue, RequestParams, arrivals_params, build_url,
    detours_params,
};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{
    Arrival, Arrivals, ArrivalsResult, BlockPosition, Detour, Detours, DetoursResult, Layover,
    Location, Route, RouteStatus, RouteType, ServiceResponse, Trip,
};
