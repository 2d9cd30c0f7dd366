use crate::QueryState;
use leptos::*;

/// Reactive query result.
#[derive(Clone)]
pub struct QueryResult<V, E, R>
where
    V: 'static,
    E: 'static,
    R: RefetchFn,
{
    /// The current value of the query. None if it has not been fetched yet.
    pub data: Signal<Option<V>>,
    /// The error of the last fetch, if it failed.
    pub error: Signal<Option<E>>,
    /// The current state of the query.
    pub state: Signal<QueryState<V, E>>,
    /// No data or error yet, a first fetch is pending.
    pub is_loading: Signal<bool>,
    /// Any fetch is in progress.
    pub is_fetching: Signal<bool>,

    /// Refetch the query.
    pub refetch: R,
}

/// Convenience Trait alias for a Query Result's refetch function.
pub trait RefetchFn: Fn() + Clone {}
impl<R: Fn() + Clone> RefetchFn for R {}
