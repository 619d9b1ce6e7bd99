//! Stop and route identifier types.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Error returned when an identifier cannot be used in a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

fn validate(kind: &'static str, s: &str) -> Result<(), InvalidId> {
    if s.is_empty() {
        return Err(InvalidId {
            kind,
            reason: "cannot be empty",
        });
    }

    // Ids are sent comma-joined in a single query parameter.
    if s.contains(',') {
        return Err(InvalidId {
            kind,
            reason: "cannot contain ','",
        });
    }

    if s.trim() != s {
        return Err(InvalidId {
            kind,
            reason: "cannot have leading or trailing whitespace",
        });
    }

    Ok(())
}

/// A TriMet stop identifier (`locid`).
///
/// # Examples
///
/// ```
/// use trimet_client::domain::LocationId;
///
/// let id = LocationId::new("6849").unwrap();
/// assert_eq!(id.as_str(), "6849");
/// assert_eq!(LocationId::from(6850).as_str(), "6850");
///
/// assert!(LocationId::new("").is_err());
/// assert!(LocationId::new("6849,6850").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    /// Create a location id, rejecting values that can't be sent in a list.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidId> {
        let s = s.into();
        validate("location id", &s)?;
        Ok(LocationId(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for LocationId {
    fn from(id: u32) -> Self {
        LocationId(id.to_string())
    }
}

impl FromStr for LocationId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocationId({})", self.0)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A TriMet route identifier, e.g. `"44"` or `"90"` (MAX Red Line).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Create a route id, rejecting values that can't be sent in a list.
    pub fn new(s: impl Into<String>) -> Result<Self, InvalidId> {
        let s = s.into();
        validate("route id", &s)?;
        Ok(RouteId(s))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for RouteId {
    fn from(id: u32) -> Self {
        RouteId(id.to_string())
    }
}

impl FromStr for RouteId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join ids into the comma-separated form the web service expects.
pub(crate) fn join_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    ids.into_iter().collect::<Vec<_>>().join(",")
}
