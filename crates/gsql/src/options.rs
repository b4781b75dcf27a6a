//! Compile-time options for queries.

use serde::Deserialize;

/// Options applied when compiling a query.
///
/// Deserializable so it can live in an application's config file:
///
/// ```
/// use gsql::QueryOptions;
///
/// let options: QueryOptions = serde_json::from_str(r#"{ "max_limit": 500 }"#).unwrap();
/// assert_eq!(options.max_limit, 500);
/// assert_eq!(options.default_limit, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Limits at or above this value are rejected.
    pub max_limit: usize,
    /// Limit used when the query's limit is not a number.
    pub default_limit: usize,
    /// Compare strings case-sensitively even without `match-case`.
    pub match_case: bool,
}

impl QueryOptions {
    pub const DEFAULT_MAX_LIMIT: usize = 1000;
    pub const DEFAULT_LIMIT: usize = 10;
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            max_limit: Self::DEFAULT_MAX_LIMIT,
            default_limit: Self::DEFAULT_LIMIT,
            match_case: false,
        }
    }
}
