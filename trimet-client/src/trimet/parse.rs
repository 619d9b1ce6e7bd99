//! Parsing of TriMet `<resultSet>` XML documents.
//!
//! Elements are matched on their local name only, so documents are read the
//! same whether the service qualifies them with `urn:trimet:arrivals`, some
//! other namespace, a prefix, or nothing at all. Only direct children are
//! considered at each level, mirroring the shape of the documents:
//!
//! ```text
//! resultSet[@queryTime]
//! ├── errorMessage            (at most one; short-circuits everything else)
//! ├── location*
//! ├── arrival*
//! │   └── blockPosition?      (at most one)
//! │       ├── trip*
//! │       └── layover*
//! ├── routeStatus*
//! └── detour*
//!     └── route*
//! ```

use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};

use crate::domain::{TimestampError, parse_optional_epoch_millis};

use super::types::{
    Arrival, Arrivals, ArrivalsResult, BlockPosition, Detour, Detours, DetoursResult, Layover,
    Location, Route, RouteStatus, ServiceResponse, Trip,
};

/// Error while turning a response body into records.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    /// An element that may appear at most once appeared several times.
    #[error("too many <{element}> elements in <{parent}>")]
    TooMany {
        element: &'static str,
        parent: &'static str,
    },

    /// An epoch-millisecond attribute holds something else.
    #[error("invalid {attribute} on <{element}>: {source}")]
    InvalidTimestamp {
        element: &'static str,
        attribute: &'static str,
        #[source]
        source: TimestampError,
    },
}

/// Parse the body of an arrivals response.
///
/// # Examples
///
/// ```
/// use trimet_client::trimet::parse_arrivals;
///
/// let xml = r#"<resultSet xmlns="urn:trimet:arrivals" queryTime="1300000000000">
///   <location desc="SE Hawthorne &amp; 12th" locid="6849"/>
///   <arrival route="14" scheduled="1300000300000" status="scheduled"/>
/// </resultSet>"#;
///
/// let result = parse_arrivals(xml).unwrap();
/// let arrivals = result.data().unwrap();
/// assert_eq!(arrivals.locations.len(), 1);
/// assert_eq!(arrivals.arrivals[0].route_number.as_deref(), Some("14"));
/// ```
pub fn parse_arrivals(xml: &str) -> Result<ArrivalsResult, ParseError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    if let Some(message) = error_message(root)? {
        return Ok(ServiceResponse::ServiceError { message });
    }

    let query_time = timestamp(root, "resultSet", "queryTime")?;

    let locations = children(root, "location").map(parse_location).collect();
    let arrivals = children(root, "arrival")
        .map(parse_arrival)
        .collect::<Result<_, _>>()?;
    let route_statuses = children(root, "routeStatus")
        .map(parse_route_status)
        .collect();

    Ok(ServiceResponse::Data(Arrivals {
        query_time,
        locations,
        arrivals,
        route_statuses,
    }))
}

/// Parse the body of a detours response.
pub fn parse_detours(xml: &str) -> Result<DetoursResult, ParseError> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    if let Some(message) = error_message(root)? {
        return Ok(ServiceResponse::ServiceError { message });
    }

    let detours = children(root, "detour")
        .map(parse_detour)
        .collect::<Result<_, _>>()?;

    Ok(ServiceResponse::Data(Detours { detours }))
}

/// Direct child elements with the given local name, in document order.
fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

/// The single child element with the given local name, if any.
fn at_most_one<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
    parent: &'static str,
) -> Result<Option<Node<'a, 'input>>, ParseError> {
    let mut matches = children(node, name);
    let first = matches.next();
    if matches.next().is_some() {
        return Err(ParseError::TooMany {
            element: name,
            parent,
        });
    }
    Ok(first)
}

fn error_message(root: Node<'_, '_>) -> Result<Option<String>, ParseError> {
    let node = at_most_one(root, "errorMessage", "resultSet")?;
    Ok(node.map(|n| n.text().unwrap_or_default().trim().to_string()))
}

fn attr(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn timestamp(
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<Option<DateTime<Utc>>, ParseError> {
    parse_optional_epoch_millis(node.attribute(attribute)).map_err(|source| {
        ParseError::InvalidTimestamp {
            element,
            attribute,
            source,
        }
    })
}

fn parse_location(node: Node<'_, '_>) -> Location {
    Location {
        description: attr(node, "desc"),
        latitude: attr(node, "lat"),
        longitude: attr(node, "lng"),
        traffic_direction: attr(node, "dir"),
        location_id: attr(node, "locid"),
    }
}

fn parse_arrival(node: Node<'_, '_>) -> Result<Arrival, ParseError> {
    let block_position = at_most_one(node, "blockPosition", "arrival")?.map(parse_block_position);

    Ok(Arrival {
        block: attr(node, "block"),
        departed: attr(node, "departed"),
        detour: attr(node, "detour"),
        direction: attr(node, "dir"),
        full_sign: attr(node, "fullSign"),
        short_sign: attr(node, "shortSign"),
        location_id: attr(node, "locid"),
        piece: attr(node, "piece"),
        route_number: attr(node, "route"),
        status: attr(node, "status"),
        scheduled: timestamp(node, "arrival", "scheduled")?,
        estimated: timestamp(node, "arrival", "estimated")?,
        block_position,
    })
}

fn parse_block_position(node: Node<'_, '_>) -> BlockPosition {
    BlockPosition {
        latitude: attr(node, "lat"),
        longitude: attr(node, "lng"),
        heading: attr(node, "heading"),
        at: attr(node, "at"),
        feet: attr(node, "feet"),
        trips: children(node, "trip").map(parse_trip).collect(),
        layovers: children(node, "layover").map(parse_layover).collect(),
    }
}

fn parse_trip(node: Node<'_, '_>) -> Trip {
    Trip {
        description: attr(node, "desc"),
        destination_distance: attr(node, "destDist"),
        direction: attr(node, "dir"),
        pattern: attr(node, "pattern"),
        progress: attr(node, "progress"),
        route: attr(node, "route"),
        trip_number: attr(node, "tripNum"),
    }
}

fn parse_layover(node: Node<'_, '_>) -> Layover {
    Layover {
        start: attr(node, "start"),
        end: attr(node, "end"),
    }
}

fn parse_route_status(node: Node<'_, '_>) -> RouteStatus {
    RouteStatus {
        route: attr(node, "route"),
        status: attr(node, "status"),
    }
}

fn parse_detour(node: Node<'_, '_>) -> Result<Detour, ParseError> {
    Ok(Detour {
        begin: timestamp(node, "detour", "begin")?,
        end: timestamp(node, "detour", "end")?,
        description: attr(node, "desc"),
        detour_id: attr(node, "id"),
        phonetic: attr(node, "phonetic"),
        routes: children(node, "route").map(parse_route).collect(),
    })
}

fn parse_route(node: Node<'_, '_>) -> Route {
    Route {
        description: attr(node, "desc"),
        route_id: attr(node, "route"),
        type_code: attr(node, "type"),
    }
}
