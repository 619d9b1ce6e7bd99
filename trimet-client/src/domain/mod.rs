//! Domain types for the TriMet client.
//!
//! Identifiers are validated at construction time so that anything reaching
//! the URL builder can be sent as-is, and epoch-millisecond timestamps are
//! converted into UTC instants in one place.

mod ids;
mod time;

pub use ids::{InvalidId, LocationId, RouteId};
pub(crate) use ids::join_ids;
pub use time::{TimestampError, parse_epoch_millis, parse_optional_epoch_millis};
