use crate::query_executor::boxed_fetcher;
use crate::query_result::QueryResult;
use crate::{use_query_client, QueryOptions, QueryState, RefetchFn};
use leptos::*;
use std::future::Future;

/// Reads a query from the [`QueryClient`](crate::QueryClient) in context, fetching it when needed.
///
/// A fetch starts on mount when the query was never fetched, failed, was
/// invalidated, or is older than `options.stale_time`. A fetch already in
/// flight for the same key is shared. Failed attempts are retried
/// `options.retry` times before the query settles in
/// [`QueryState::Failed`].
///
/// Example
/// ```no_run
/// use leptos::*;
/// use fetch_query::*;
///
/// async fn get_greeting(name: &'static str) -> Result<String, String> {
///     Ok(format!("Hello, {name}"))
/// }
///
/// #[component]
/// fn Greeting() -> impl IntoView {
///     let QueryResult { data, is_loading, .. } = use_query(
///         "world",
///         get_greeting,
///         QueryOptions::default().set_retry(0),
///     );
///
///     view! {
///         <p>
///             {move || if is_loading.get() { "Loading...".to_string() } else { data.get().unwrap_or_default() }}
///         </p>
///     }
/// }
/// ```
pub fn use_query<K, V, E, Fu>(
    key: K,
    fetcher: impl Fn(K) -> Fu + 'static,
    options: QueryOptions,
) -> QueryResult<V, E, impl RefetchFn>
where
    K: crate::QueryKey + 'static,
    V: crate::QueryValue + 'static,
    E: crate::QueryError + 'static,
    Fu: Future<Output = Result<V, E>> + 'static,
{
    let query = use_query_client().cache.get_or_create_query::<K, V, E>(key);
    let fetcher = boxed_fetcher(fetcher);

    let state = RwSignal::new(query.get_state());
    let listener = query.add_listener(move |new_state| {
        // Late updates after unmount are dropped.
        if state.try_set(new_state.clone()).is_some() {
            logging::debug_warn!("Query state changed after its reader was disposed.");
        }
    });

    on_cleanup({
        let query = query.clone();
        move || {
            if !query.remove_listener(listener) {
                logging::debug_warn!("Failed to remove listener.");
            }
        }
    });

    let execute = {
        let query = query.clone();
        move || {
            let query = query.clone();
            let fetcher = fetcher.clone();
            spawn_local(async move { query.execute(fetcher, options).await });
        }
    };

    if query.needs_fetch(options.stale_time) {
        execute();
    }

    QueryResult {
        data: Signal::derive(move || state.with(|state| state.data().cloned())),
        error: Signal::derive(move || state.with(|state| state.error().cloned())),
        state: state.into(),
        is_loading: Signal::derive(move || state.with(QueryState::is_loading)),
        is_fetching: Signal::derive(move || state.with(QueryState::is_fetching)),
        refetch: execute,
    }
}
