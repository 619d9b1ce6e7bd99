//! Request URL construction.
//!
//! Every request goes to `{base_url}/{operation}` with the application id
//! in `appID` followed by the operation's own parameters. Values are
//! form-encoded, so ids and credentials containing reserved characters are
//! sent intact.

use std::fmt;

use url::Url;

use crate::domain::{LocationId, RouteId, join_ids};

use super::error::TrimetError;

/// Query parameter carrying the application id.
pub const APP_ID_PARAM: &str = "appID";

/// Which web service endpoint a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Arrivals,
    Detours,
}

impl Operation {
    /// Path segment of the endpoint, also used to key mock responses.
    pub fn key(&self) -> &'static str {
        match self {
            Operation::Arrivals => "arrivals",
            Operation::Detours => "detours",
        }
    }

    /// All operations, in a fixed order.
    pub const ALL: [Operation; 2] = [Operation::Arrivals, Operation::Detours];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value of a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Sent once: `name=value`.
    Single(String),
    /// Sent once per element: `name=a&name=b`. An empty list sends nothing.
    List(Vec<String>),
}

/// Ordered request parameters, excluding the application id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: Vec<(String, QueryValue)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter sent once.
    pub fn single(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .push((name.into(), QueryValue::Single(value.into())));
        self
    }

    /// Add a parameter repeated for every value.
    pub fn list<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.params.push((name.into(), QueryValue::List(values)));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Parameters for an arrivals request: one comma-joined `locIDs`.
pub fn arrivals_params(location_ids: &[LocationId]) -> RequestParams {
    RequestParams::new().single(
        "locIDs",
        join_ids(location_ids.iter().map(LocationId::as_str)),
    )
}

/// Parameters for a detours request: one comma-joined `routes`.
///
/// No routes means "every route", in which case the parameter is left out.
pub fn detours_params(routes: &[RouteId]) -> RequestParams {
    if routes.is_empty() {
        return RequestParams::new();
    }
    RequestParams::new().single("routes", join_ids(routes.iter().map(RouteId::as_str)))
}

/// Build the full request URL for an operation.
///
/// The application id always comes first. A caller-supplied `appID`
/// parameter is dropped so the configured credential can't be overridden.
pub fn build_url(
    base_url: &str,
    operation: Operation,
    app_id: &str,
    params: &RequestParams,
) -> Result<Url, TrimetError> {
    let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), operation.key());
    let mut url = Url::parse(&endpoint)?;

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query.append_pair(APP_ID_PARAM, app_id);

        for (name, value) in params.iter() {
            if name == APP_ID_PARAM {
                continue;
            }
            match value {
                QueryValue::Single(v) => {
                    query.append_pair(name, v);
                }
                QueryValue::List(values) => {
                    for v in values {
                        query.append_pair(name, v);
                    }
                }
            }
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://developer.trimet.org/ws/V1";

    fn pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn ids(raw: &[u32]) -> Vec<LocationId> {
        raw.iter().copied().map(LocationId::from).collect()
    }

    #[test]
    fn single_location() {
        let url = build_url(BASE, Operation::Arrivals, "KEY", &arrivals_params(&ids(&[6849])))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://developer.trimet.org/ws/V1/arrivals?appID=KEY&locIDs=6849"
        );
    }

    #[test]
    fn multiple_locations_are_comma_joined() {
        let url = build_url(
            BASE,
            Operation::Arrivals,
            "KEY",
            &arrivals_params(&ids(&[6849, 6850])),
        )
        .unwrap();

        assert_eq!(
            pairs(&url),
            vec![
                ("appID".to_string(), "KEY".to_string()),
                ("locIDs".to_string(), "6849,6850".to_string()),
            ]
        );
        assert_eq!(url.query(), Some("appID=KEY&locIDs=6849%2C6850"));
    }

    #[test]
    fn list_values_are_repeated() {
        let params = RequestParams::new()
            .list("streets", ["Hawthorne", "Belmont"])
            .single("arrivals", "2");
        let url = build_url(BASE, Operation::Arrivals, "KEY", &params).unwrap();

        assert_eq!(
            url.query(),
            Some("appID=KEY&streets=Hawthorne&streets=Belmont&arrivals=2")
        );
    }

    #[test]
    fn empty_list_sends_nothing() {
        let params = RequestParams::new().list("routes", Vec::<String>::new());
        let url = build_url(BASE, Operation::Detours, "KEY", &params).unwrap();
        assert_eq!(url.query(), Some("appID=KEY"));
    }

    #[test]
    fn values_are_encoded() {
        let params = RequestParams::new().single("q", "SE 12th & Hawthorne");
        let url = build_url(BASE, Operation::Arrivals, "a&b=c", &params).unwrap();

        assert_eq!(
            url.query(),
            Some("appID=a%26b%3Dc&q=SE+12th+%26+Hawthorne")
        );
        assert_eq!(pairs(&url)[0].1, "a&b=c");
        assert_eq!(pairs(&url)[1].1, "SE 12th & Hawthorne");
    }

    #[test]
    fn caller_app_id_is_ignored() {
        let params = RequestParams::new()
            .single("appID", "SPOOF")
            .single("locIDs", "1");
        let url = build_url(BASE, Operation::Arrivals, "REAL", &params).unwrap();

        let app_ids: Vec<_> = pairs(&url)
            .into_iter()
            .filter(|(k, _)| k == "appID")
            .collect();
        assert_eq!(app_ids, vec![("appID".to_string(), "REAL".to_string())]);
    }

    #[test]
    fn detours_for_routes() {
        let routes = [RouteId::from(44), RouteId::from(100)];
        let url = build_url(BASE, Operation::Detours, "KEY", &detours_params(&routes)).unwrap();
        assert_eq!(
            url.as_str(),
            "https://developer.trimet.org/ws/V1/detours?appID=KEY&routes=44%2C100"
        );
    }

    #[test]
    fn detours_for_all_routes() {
        assert!(detours_params(&[]).is_empty());
        let url = build_url(BASE, Operation::Detours, "KEY", &detours_params(&[])).unwrap();
        assert_eq!(url.query(), Some("appID=KEY"));
    }

    #[test]
    fn trailing_slash_on_base() {
        let url = build_url(
            "http://localhost:8080/ws/V1/",
            Operation::Detours,
            "KEY",
            &RequestParams::new(),
        )
        .unwrap();
        assert_eq!(url.path(), "/ws/V1/detours");
    }

    #[test]
    fn invalid_base_url() {
        let result = build_url("not a url", Operation::Arrivals, "KEY", &RequestParams::new());
        assert!(matches!(result, Err(TrimetError::InvalidUrl(_))));
    }

    #[test]
    fn operation_keys() {
        assert_eq!(Operation::Arrivals.key(), "arrivals");
        assert_eq!(Operation::Detours.to_string(), "detours");
        assert_eq!(Operation::ALL.len(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// However many stops are asked for, exactly one locIDs parameter is sent
        #[test]
        fn one_loc_ids_param(raw in prop::collection::vec(1u32..100_000, 1..20)) {
            let ids: Vec<LocationId> = raw.iter().copied().map(LocationId::from).collect();
            let url = build_url(
                "https://developer.trimet.org/ws/V1",
                Operation::Arrivals,
                "KEY",
                &arrivals_params(&ids),
            )
            .unwrap();

            let loc_ids: Vec<String> = url
                .query_pairs()
                .filter(|(k, _)| k == "locIDs")
                .map(|(_, v)| v.into_owned())
                .collect();

            let expected = raw.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
            prop_assert_eq!(loc_ids, vec![expected]);
        }

        /// Any credential survives encoding unchanged
        #[test]
        fn app_id_roundtrips(app_id in "\\PC{0,40}") {
            let url = build_url(
                "https://developer.trimet.org/ws/V1",
                Operation::Detours,
                &app_id,
                &RequestParams::new(),
            )
            .unwrap();

            let (name, value) = url.query_pairs().next().unwrap();
            prop_assert_eq!(&*name, "appID");
            prop_assert_eq!(&*value, app_id.as_str());
        }

        /// List parameters expand into one pair per element, in order
        #[test]
        fn list_expands_in_order(values in prop::collection::vec("[a-z0-9]{1,8}", 0..10)) {
            let params = RequestParams::new().list("v", values.clone());
            let url = build_url(
                "https://developer.trimet.org/ws/V1",
                Operation::Arrivals,
                "KEY",
                &params,
            )
            .unwrap();

            let sent: Vec<String> = url
                .query_pairs()
                .filter(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
                .collect();
            prop_assert_eq!(sent, values);
        }
    }
}
