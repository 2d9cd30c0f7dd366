use crate::{query_cache::QueryCache, query_executor::boxed_fetcher, *};
use leptos::*;
use std::{borrow::Borrow, future::Future};

/// Provides a Query Client to the current scope with custom options.
pub fn provide_query_client_with_options(options: DefaultQueryOptions) {
    provide_context(QueryClient::new(options));
}

/// Retrieves a Query Client from the current scope.
pub fn use_query_client() -> QueryClient {
    use_context::<QueryClient>().expect("Query Client Missing.")
}

/// The Cache Client to store query data.
/// Exposes utility functions to manage queries.
///
/// Queries are stored per `(K, V, E)` type triple and key, so the same key
/// can be used with different value types.
///
/// Queries can be:
/// - [Fetched](Self::fetch_query) outside of a component.
/// - [Invalidated](Self::invalidate_query), so the next reader refetches them.
/// - [Introspected](Self::peek_query_state).
/// - [Manually updated](Self::set_query_data).
/// - [Cancelled](Self::cancel_query) while in flight.
#[derive(Clone)]
pub struct QueryClient {
    pub(crate) cache: QueryCache,
    pub(crate) default_options: DefaultQueryOptions,
}

impl QueryClient {
    /// Creates a new Query Client.
    pub fn new(default_options: DefaultQueryOptions) -> Self {
        Self {
            cache: QueryCache::new(),
            default_options,
        }
    }

    /// The options queries fall back to.
    pub fn default_options(&self) -> DefaultQueryOptions {
        self.default_options
    }

    /// Fetch a query, store the outcome in cache and return the resulting state.
    ///
    /// If a fetch for the same key is already running, no second fetch is
    /// started and the current (in flight) state is returned.
    pub async fn fetch_query<K, V, E, Fu>(
        &self,
        key: K,
        fetcher: impl Fn(K) -> Fu + 'static,
        options: QueryOptions,
    ) -> QueryState<V, E>
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
        Fu: Future<Output = Result<V, E>> + 'static,
    {
        let query = self.cache.get_or_create_query::<K, V, E>(key);
        query.execute(boxed_fetcher(fetcher), options).await;
        query.get_state()
    }

    /// Retrieve the current state for an existing query.
    /// If the query does not exist, [`None`](Option::None) will be returned.
    pub fn peek_query_state<K, V, E>(&self, key: &K) -> Option<QueryState<V, E>>
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        self.cache.get_query::<K, V, E>(key).map(|q| q.get_state())
    }

    /// Attempts to invalidate an entry in the Query Cache.
    /// Loaded data is marked as invalid and will be refetched by the next reader.
    ///
    /// Returns true if the entry was successfully invalidated.
    pub fn invalidate_query<K, V, E>(&self, key: impl Borrow<K>) -> bool
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        self.cache
            .get_query::<K, V, E>(key.borrow())
            .map(|query| query.mark_invalid())
            .unwrap_or(false)
    }

    /// Immediately set a query's data. If the query does not exist, it will be created.
    /// A fetch in flight keeps running and will overwrite this value when it completes.
    pub fn set_query_data<K, V, E>(&self, key: K, data: V)
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        let query = self.cache.get_or_create_query::<K, V, E>(key);
        query.set_state(QueryState::Loaded(QueryData::now(data)));
    }

    /// Cancel any currently executing query.
    /// Returns whether the query was cancelled or not.
    pub fn cancel_query<K, V, E>(&self, key: K) -> bool
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        self.cache
            .get_query::<K, V, E>(&key)
            .map(|query| query.cancel())
            .unwrap_or(false)
    }

    /// Removes a query from the cache, cancelling it if in flight.
    pub fn evict_query<K, V, E>(&self, key: &K) -> bool
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        self.cache.evict_query::<K, V, E>(key)
    }

    /// Returns the number of queries in the cache.
    pub fn size(&self) -> usize {
        self.cache.size()
    }

    /// Clears the cache. All queries will be removed.
    pub fn clear(&self) {
        self.cache.clear_all_queries()
    }
}
