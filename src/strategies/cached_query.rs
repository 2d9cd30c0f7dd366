use fetch_query::{
    use_query, use_query_client, DefaultQueryOptions, QueryOptions, QueryResult, QueryState,
};
use leptos::*;

use crate::{FetchError, PokemonSummary, Rendered, Upstream};

/// Cache key of the Pokemon list.
pub const POKEMON_QUERY_KEY: &str = "pokemon";

/// Message of the synthetic failure this strategy injects.
pub const REACT_QUERY_ERROR: &str = "React Query Error";

const TITLE: &str = "Pokemon React Query";

/// Query state of the Pokemon list.
pub type PokemonQueryState = QueryState<Vec<PokemonSummary>, FetchError>;

/// The query function registered under [`POKEMON_QUERY_KEY`].
pub async fn fetch_pokemon(upstream: Upstream) -> Result<Vec<PokemonSummary>, FetchError> {
    upstream.list_pokemon_unreliably(REACT_QUERY_ERROR).await
}

/// Client defaults with retries disabled: every failure is terminal.
pub fn pokemon_query_options(defaults: DefaultQueryOptions) -> QueryOptions {
    QueryOptions::from(defaults).set_retry(0)
}

/// What the component reads from the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedQueryResult {
    pub is_loading: bool,
    pub data: Option<Vec<PokemonSummary>>,
    pub error: Option<FetchError>,
}

impl CachedQueryResult {
    pub fn from_state(state: &PokemonQueryState) -> Self {
        Self {
            is_loading: state.is_loading(),
            data: state.data().cloned(),
            error: state.error().cloned(),
        }
    }

    pub fn render(&self) -> Rendered {
        if self.is_loading {
            return Rendered::Loading("Loading...");
        }
        match &self.error {
            Some(error) => Rendered::Error(format!("React Query Error: {error}")),
            None => Rendered::List {
                title: TITLE,
                items: self.data.clone().unwrap_or_default(),
            },
        }
    }
}

/// Leaves loading, error and data to the query cache.
#[component]
pub fn CachedQueryStrategy(upstream: Upstream) -> impl IntoView {
    let options = pokemon_query_options(use_query_client().default_options());
    let QueryResult {
        data,
        error,
        is_loading,
        ..
    } = use_query(
        POKEMON_QUERY_KEY,
        move |_| fetch_pokemon(upstream.clone()),
        options,
    );

    let result = move || CachedQueryResult {
        is_loading: is_loading.get(),
        data: data.get(),
        error: error.get(),
    };

    view! { <div class="strategy">{move || result().render()}</div> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{upstream, MockTransport, TWO_POKEMON},
        FailurePolicy,
    };
    use fetch_query::{provide_query_client_with_options, QueryClient};
    use futures::{executor::block_on, future::LocalBoxFuture, FutureExt};
    use std::{cell::Cell, rc::Rc};

    type PokemonFuture = LocalBoxFuture<'static, Result<Vec<PokemonSummary>, FetchError>>;

    /// The query function, counting its invocations.
    fn counted(
        upstream: Upstream,
    ) -> (Rc<Cell<usize>>, impl Fn(&'static str) -> PokemonFuture + Clone) {
        let invocations = Rc::new(Cell::new(0));
        let fetcher = {
            let invocations = invocations.clone();
            move |_: &'static str| {
                invocations.set(invocations.get() + 1);
                fetch_pokemon(upstream.clone()).boxed_local()
            }
        };
        (invocations, fetcher)
    }

    fn peek(client: &QueryClient) -> CachedQueryResult {
        let state = client
            .peek_query_state::<&'static str, Vec<PokemonSummary>, FetchError>(&POKEMON_QUERY_KEY)
            .unwrap_or_default();
        CachedQueryResult::from_state(&state)
    }

    #[test]
    fn retries_are_disabled() {
        let options = pokemon_query_options(DefaultQueryOptions::default());
        assert_eq!(options.retry, 0);
        assert_eq!(options.attempts(), 1);
    }

    #[test]
    fn unfetched_query_renders_loading() {
        let client = QueryClient::new(DefaultQueryOptions::default());
        assert_eq!(peek(&client).render(), Rendered::Loading("Loading..."));
    }

    #[test]
    fn shows_loading_before_the_fetch_settles() {
        let client = QueryClient::new(DefaultQueryOptions::default());
        let (transport, release) = MockTransport::ok(TWO_POKEMON).gated();
        let (_, fetcher) = counted(upstream(transport, FailurePolicy::never()));
        let options = pokemon_query_options(client.default_options());

        let mut fetch = Box::pin(client.fetch_query(POKEMON_QUERY_KEY, fetcher, options));
        assert!((&mut fetch).now_or_never().is_none());
        assert_eq!(peek(&client).render(), Rendered::Loading("Loading..."));

        release.send(()).unwrap();
        block_on(fetch);
        assert_eq!(peek(&client).render().keys(), ["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn renders_items_keyed_by_name_in_order() {
        let client = QueryClient::new(DefaultQueryOptions::default());
        let (_, fetcher) =
            counted(upstream(MockTransport::ok(TWO_POKEMON), FailurePolicy::never()));
        let options = pokemon_query_options(client.default_options());

        block_on(client.fetch_query(POKEMON_QUERY_KEY, fetcher, options));

        let rendered = peek(&client).render();
        assert!(matches!(rendered, Rendered::List { title: "Pokemon React Query", .. }));
        assert_eq!(rendered.keys(), ["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn forced_failure_is_terminal_after_one_call() {
        let client = QueryClient::new(DefaultQueryOptions::default());
        let (invocations, fetcher) =
            counted(upstream(MockTransport::ok(TWO_POKEMON), FailurePolicy::always()));
        let options = pokemon_query_options(client.default_options());

        block_on(client.fetch_query(POKEMON_QUERY_KEY, fetcher, options));

        assert_eq!(invocations.get(), 1);
        let result = peek(&client);
        assert!(!result.is_loading);
        assert_eq!(result.data, None);
        let message = result.render().message().map(str::to_string).unwrap();
        assert!(message.contains(REACT_QUERY_ERROR), "{message}");
    }

    #[test]
    fn refetch_runs_the_query_function_again() {
        let client = QueryClient::new(DefaultQueryOptions::default());
        let transport = MockTransport::ok(TWO_POKEMON);
        let calls = transport.calls();
        let (invocations, fetcher) = counted(upstream(transport, FailurePolicy::always()));
        let options = pokemon_query_options(client.default_options());

        block_on(client.fetch_query(POKEMON_QUERY_KEY, fetcher.clone(), options));
        block_on(client.fetch_query(POKEMON_QUERY_KEY, fetcher, options));

        assert_eq!(invocations.get(), 2);
        assert_eq!(calls.get(), 2);
    }

    #[cfg(not(feature = "csr"))]
    #[test]
    fn mounted_component_fetches_once_and_keeps_the_error() {
        let _ = create_runtime();
        // Client default allows retries; the component must still make one attempt.
        provide_query_client_with_options(DefaultQueryOptions::default());
        let transport = MockTransport::ok(TWO_POKEMON);
        let calls = transport.calls();
        let upstream = upstream(transport, FailurePolicy::always());

        let _ = view! { <CachedQueryStrategy upstream=upstream/> };

        assert_eq!(calls.get(), 1);
        let result = peek(&use_query_client());
        assert!(!result.is_loading);
        assert_eq!(result.error, Some(FetchError::synthetic(REACT_QUERY_ERROR)));
    }

    #[cfg(not(feature = "csr"))]
    #[test]
    fn mounted_component_caches_the_list() {
        let runtime = create_runtime();
        provide_query_client_with_options(DefaultQueryOptions::default());
        let upstream = upstream(MockTransport::ok(TWO_POKEMON), FailurePolicy::never());

        let _ = view! { <CachedQueryStrategy upstream=upstream/> };

        assert_eq!(
            peek(&use_query_client()).render().keys(),
            ["bulbasaur", "ivysaur"]
        );
        runtime.dispose();
    }

    #[test]
    fn stale_data_stays_visible_while_refetching() {
        let state: PokemonQueryState = QueryState::Fetching(fetch_query::QueryData::now(vec![
            PokemonSummary {
                name: "bulbasaur".into(),
                url: "u1".into(),
            },
        ]));

        assert_eq!(CachedQueryResult::from_state(&state).render().keys(), ["bulbasaur"]);
    }
}
