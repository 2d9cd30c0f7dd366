use crate::Instant;

/// The lifecycle of a query.
///
/// Each variant corresponds to a phase of a query, from creation through
/// loading, success, failure and invalidation.
#[derive(Clone, PartialEq, Eq)]
pub enum QueryState<V, E> {
    /// The initial state of a Query upon its creation.
    ///
    /// No fetch has been started yet.
    Created,

    /// Query is fetching for the first time, or after a failure.
    Loading,

    /// A Query is fetching again. The previous data is retained.
    Fetching(QueryData<V>),

    /// The last fetch succeeded.
    Loaded(QueryData<V>),

    /// The data was marked as invalid. It will be refetched on next use.
    Invalid(QueryData<V>),

    /// The last fetch failed after exhausting its retries.
    Failed(QueryFailure<E>),
}

// Not derived, so `V` and `E` need not implement `Default`.
impl<V, E> Default for QueryState<V, E> {
    fn default() -> Self {
        QueryState::Created
    }
}

impl<V, E> QueryState<V, E> {
    /// Returns the QueryData for the current QueryState, if present.
    pub fn query_data(&self) -> Option<&QueryData<V>> {
        match self {
            QueryState::Loading | QueryState::Created | QueryState::Failed(_) => None,
            QueryState::Fetching(data) | QueryState::Loaded(data) | QueryState::Invalid(data) => {
                Some(data)
            }
        }
    }

    /// Returns the data contained within the QueryState, if present.
    pub fn data(&self) -> Option<&V> {
        self.query_data().map(|s| &s.data)
    }

    /// Returns the error of a failed query.
    pub fn error(&self) -> Option<&E> {
        match self {
            QueryState::Failed(failure) => Some(&failure.error),
            _ => None,
        }
    }

    /// Returns the last updated timestamp for the QueryState, if present.
    pub fn updated_at(&self) -> Option<Instant> {
        self.query_data().map(|s| s.updated_at)
    }

    /// No data or error yet. A created query counts, since its first reader
    /// starts the fetch.
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Created | QueryState::Loading)
    }

    /// Any fetch in progress.
    pub fn is_fetching(&self) -> bool {
        matches!(self, QueryState::Loading | QueryState::Fetching(_))
    }
}

impl<V, E> std::fmt::Debug for QueryState<V, E>
where
    V: std::fmt::Debug,
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Loading => write!(f, "Loading"),
            Self::Fetching(arg0) => f.debug_tuple("Fetching").field(arg0).finish(),
            Self::Loaded(arg0) => f.debug_tuple("Loaded").field(arg0).finish(),
            Self::Invalid(arg0) => f.debug_tuple("Invalid").field(arg0).finish(),
            Self::Failed(arg0) => f.debug_tuple("Failed").field(arg0).finish(),
        }
    }
}

/// The latest data for a Query.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QueryData<V> {
    /// The Data.
    pub data: V,
    /// The instant this data was retrieved.
    pub updated_at: Instant,
}

impl<V> QueryData<V> {
    /// Creates a new QueryData stamped with the current time.
    pub fn now(data: V) -> Self {
        Self {
            data,
            updated_at: Instant::now(),
        }
    }
}

/// The terminal error of a fetch.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QueryFailure<E> {
    /// Error returned by the last attempt.
    pub error: E,
    /// Number of attempts made, including the first.
    pub attempts: u32,
    /// The instant the last attempt failed.
    pub failed_at: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(error: &str) -> QueryState<u32, String> {
        QueryState::Failed(QueryFailure {
            error: error.to_string(),
            attempts: 1,
            failed_at: Instant::now(),
        })
    }

    #[test]
    fn data_only_present_when_loaded() {
        assert_eq!(QueryState::<u32, String>::Created.data(), None);
        assert_eq!(QueryState::<u32, String>::Loading.data(), None);
        assert_eq!(failed("boom").data(), None);

        let loaded: QueryState<u32, String> = QueryState::Loaded(QueryData::now(7));
        assert_eq!(loaded.data(), Some(&7));
        assert!(loaded.updated_at().is_some());

        let fetching: QueryState<u32, String> = QueryState::Fetching(QueryData::now(8));
        assert_eq!(fetching.data(), Some(&8));
    }

    #[test]
    fn error_only_present_when_failed() {
        assert_eq!(failed("boom").error().map(String::as_str), Some("boom"));
        assert_eq!(QueryState::<u32, String>::Loading.error(), None);
    }

    #[test]
    fn loading_is_first_fetch_only() {
        assert!(QueryState::<u32, String>::Created.is_loading());
        assert!(!QueryState::<u32, String>::Created.is_fetching());
        assert!(QueryState::<u32, String>::Loading.is_loading());
        assert!(QueryState::<u32, String>::Loading.is_fetching());

        let refetching: QueryState<u32, String> = QueryState::Fetching(QueryData::now(1));
        assert!(!refetching.is_loading());
        assert!(refetching.is_fetching());

        assert!(!failed("boom").is_loading());
    }
}
