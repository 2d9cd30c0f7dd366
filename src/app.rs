use fetch_query::{provide_query_client_with_options, DefaultQueryOptions};
use leptos::*;

use crate::{
    CachedQueryStrategy, ManualFetchStrategy, PokemonResource, SuspendingResourceStrategy,
    Upstream, UpstreamOptions,
};

/// The three strategies side by side, each against the same upstream.
#[component]
pub fn App() -> impl IntoView {
    // Failures are meant to be seen, so queries are never retried.
    provide_query_client_with_options(DefaultQueryOptions {
        retry: 0,
        ..DefaultQueryOptions::default()
    });

    let upstream = Upstream::http(UpstreamOptions::default());

    // Started once at load, shared by every mount.
    let resource = PokemonResource::new(upstream.clone());
    resource.prefetch();

    view! {
        <div class="container">
            <ManualFetchStrategy upstream=upstream.clone()/>
            <CachedQueryStrategy upstream=upstream/>
            <SuspendingResourceStrategy resource=resource/>
        </div>
    }
}
