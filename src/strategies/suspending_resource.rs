use futures::future::{FutureExt, LocalBoxFuture, Shared};
use leptos::*;

use crate::{parse_pokemon, FetchError, PokemonSummary, Rendered, Upstream};

const TITLE: &str = "Pokemon Use Hook";

/// A settled resource that did not reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Pokemon(Vec<PokemonSummary>),
    /// The body could not be parsed. Returned as a value, not raised.
    Failed(FetchError),
}

/// `Err` is a rejection (the request itself failed), handled by the error boundary.
pub type Settled = Result<Resolved, FetchError>;

/// A single, memoized fetch of the Pokemon list shared by every reader.
///
/// Cloning the handle shares the same request. It is never re-fetched, so
/// every mount of [`SuspendingResourceStrategy`] sees the same outcome.
#[derive(Clone)]
pub struct PokemonResource {
    settled: Shared<LocalBoxFuture<'static, Settled>>,
}

impl PokemonResource {
    /// Builds the handle. Nothing is requested until the handle is first
    /// polled, by [`prefetch`](Self::prefetch) or a reader.
    pub fn new(upstream: Upstream) -> Self {
        let fetch = async move {
            let body = upstream.fetch_body().await?;
            let resolved = match parse_pokemon(&body) {
                Ok(pokemon) => Resolved::Pokemon(pokemon),
                Err(error) => Resolved::Failed(error),
            };
            Ok::<_, FetchError>(resolved)
        };

        Self {
            settled: fetch.boxed_local().shared(),
        }
    }

    /// Starts the request in the background.
    pub fn prefetch(&self) {
        let settled = self.settled.clone();
        spawn_local(async move {
            if let Err(error) = settled.await {
                logging::error!("{error}");
            }
        });
    }

    /// The outcome if settled, without waiting.
    pub fn peek(&self) -> Option<Settled> {
        self.settled.peek().cloned()
    }

    /// Waits for the outcome.
    pub async fn settled(&self) -> Settled {
        self.settled.clone().await
    }

    /// What a reader would show right now.
    pub fn render(&self) -> Result<Rendered, FetchError> {
        match self.peek() {
            Some(settled) => render_settled(settled),
            None => Ok(Rendered::Suspended),
        }
    }
}

impl std::fmt::Debug for PokemonResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokemonResource")
            .field("settled", &self.peek())
            .finish()
    }
}

/// An error value renders inline; a rejection is handed back to the caller.
pub fn render_settled(settled: Settled) -> Result<Rendered, FetchError> {
    match settled? {
        Resolved::Pokemon(items) => Ok(Rendered::List {
            title: TITLE,
            items,
        }),
        Resolved::Failed(_) => Ok(Rendered::Error("Error".to_string())),
    }
}

/// Suspends on a shared resource, with an error boundary around it.
#[component]
pub fn SuspendingResourceStrategy(resource: PokemonResource) -> impl IntoView {
    let settled = create_local_resource(
        || (),
        move |_| {
            let resource = resource.clone();
            async move { resource.settled().await }
        },
    );

    view! {
        <div class="strategy">
            <ErrorBoundary fallback=|_| view! { <div>"An error occurred"</div> }>
                <Suspense fallback=|| "Loading...">
                    {move || settled.get().map(render_settled)}
                </Suspense>
            </ErrorBoundary>
        </div>
    }
}
