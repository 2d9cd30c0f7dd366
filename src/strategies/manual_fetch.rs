use leptos::*;

use crate::{FetchError, PokemonSummary, Rendered, Upstream};

/// Message of the synthetic failure this strategy injects.
pub const USE_EFFECT_ERROR: &str = "Use Effect Error";

const TITLE: &str = "Pokemon Use Effect";

/// Component-owned fetch state.
///
/// `loading` and `error` are never set together, and `items` is empty
/// whenever `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchState {
    pub items: Vec<PokemonSummary>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

impl FetchState {
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn loaded(items: Vec<PokemonSummary>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn failed(error: FetchError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn render(&self) -> Rendered {
        if self.loading {
            return Rendered::Loading("Loading ...");
        }
        match &self.error {
            Some(error) => Rendered::Error(format!("An error has occurred: {error}")),
            None => Rendered::List {
                title: TITLE,
                items: self.items.clone(),
            },
        }
    }
}

/// Marks the state as loading, fetches, then stores the outcome.
///
/// Failures are logged and stored in the state; nothing is returned.
pub async fn run_manual_fetch(upstream: Upstream, set_state: impl Fn(FetchState)) {
    set_state(FetchState::loading());

    let state = match upstream.list_pokemon_unreliably(USE_EFFECT_ERROR).await {
        Ok(items) => FetchState::loaded(items),
        Err(error) => {
            logging::error!("{error}");
            FetchState::failed(error)
        }
    };

    set_state(state);
}

/// Keeps its own tri-state and fetches from a mount-time effect.
#[component]
pub fn ManualFetchStrategy(upstream: Upstream) -> impl IntoView {
    let state = create_rw_signal(FetchState::default());

    // Reads no signals, so it runs once per mount.
    create_effect(move |_| {
        spawn_local(run_manual_fetch(upstream.clone(), move |next| {
            // Dropped if the component unmounted mid-flight.
            let _ = state.try_set(next);
        }));
    });

    view! { <div class="strategy">{move || state.with(FetchState::render)}</div> }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{upstream, MockTransport, TWO_POKEMON},
        FailurePolicy,
    };
    use futures::{executor::block_on, FutureExt};
    use std::{cell::RefCell, rc::Rc};

    fn recorder() -> (Rc<RefCell<Vec<FetchState>>>, impl Fn(FetchState)) {
        let states = Rc::new(RefCell::new(Vec::<FetchState>::new()));
        let set_state = {
            let states = states.clone();
            move |state: FetchState| states.borrow_mut().push(state)
        };
        (states, set_state)
    }

    #[test]
    fn initial_state_is_idle_and_empty() {
        let state = FetchState::default();
        assert!(!state.loading);
        assert!(state.items.is_empty());
        assert_eq!(state.error, None);
    }

    #[test]
    fn shows_loading_before_the_fetch_settles() {
        let (transport, release) = MockTransport::ok(TWO_POKEMON).gated();
        let upstream = upstream(transport, FailurePolicy::never());
        let (states, set_state) = recorder();

        let mut fetch = Box::pin(run_manual_fetch(upstream, set_state));
        assert!((&mut fetch).now_or_never().is_none());

        assert_eq!(states.borrow().last(), Some(&FetchState::loading()));
        assert_eq!(
            states.borrow()[0].render(),
            Rendered::Loading("Loading ...")
        );

        release.send(()).unwrap();
        block_on(fetch);

        let last = states.borrow().last().cloned().unwrap();
        assert_eq!(last.render().keys(), ["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn renders_items_keyed_by_name_in_order() {
        let upstream = upstream(MockTransport::ok(TWO_POKEMON), FailurePolicy::never());
        let (states, set_state) = recorder();

        block_on(run_manual_fetch(upstream, set_state));

        let states = states.borrow();
        assert_eq!(states.len(), 2);
        let rendered = states[1].render();
        assert!(matches!(rendered, Rendered::List { title: "Pokemon Use Effect", .. }));
        assert_eq!(rendered.keys(), ["bulbasaur", "ivysaur"]);
    }

    #[test]
    fn forced_failure_renders_use_effect_error() {
        let upstream = upstream(MockTransport::ok(TWO_POKEMON), FailurePolicy::always());
        let (states, set_state) = recorder();

        block_on(run_manual_fetch(upstream, set_state));

        let last = states.borrow().last().cloned().unwrap();
        assert!(!last.loading);
        assert!(last.items.is_empty());
        assert_eq!(
            last.render(),
            Rendered::Error("An error has occurred: Use Effect Error".into())
        );
    }

    #[test]
    fn network_error_is_stored_not_propagated() {
        let transport = MockTransport::failing(FetchError::Network("offline".into()));
        let upstream = upstream(transport, FailurePolicy::never());
        let (states, set_state) = recorder();

        block_on(run_manual_fetch(upstream, set_state));

        let last = states.borrow().last().cloned().unwrap();
        assert_eq!(last, FetchState::failed(FetchError::Network("offline".into())));
        assert_eq!(
            last.render().message(),
            Some("An error has occurred: network error: offline")
        );
    }

    #[test]
    fn every_mount_fetches_once_from_loading() {
        let transport = MockTransport::ok(TWO_POKEMON);
        let calls = transport.calls();
        let upstream = upstream(transport, FailurePolicy::never());

        for mount in 1..=2 {
            let (states, set_state) = recorder();
            block_on(run_manual_fetch(upstream.clone(), set_state));

            assert_eq!(calls.get(), mount);
            assert_eq!(states.borrow()[0], FetchState::loading());
        }
    }

    #[cfg(not(feature = "csr"))]
    #[test]
    fn mounted_component_fetches_once_per_mount() {
        let runtime = create_runtime();
        let transport = MockTransport::ok(TWO_POKEMON);
        let calls = transport.calls();
        let upstream = upstream(transport, FailurePolicy::never());

        let _ = view! { <ManualFetchStrategy upstream=upstream.clone()/> };
        assert_eq!(calls.get(), 1);

        let _ = view! { <ManualFetchStrategy upstream=upstream/> };
        assert_eq!(calls.get(), 2);
        runtime.dispose();
    }
}
