//! Access to the Pokemon endpoint, with the artificial latency and failure
//! injection the demo uses to make loading and error states visible.
//!
//! Every piece is injectable: the [`Transport`] performing the request, the
//! [`FailurePolicy`] deciding synthetic failures, and the [`UpstreamOptions`]
//! carrying endpoint and delay.

use std::{fmt, rc::Rc, time::Duration};

use async_trait::async_trait;
use leptos::logging;

use crate::{parse_pokemon, FetchError, PokemonSummary, POKEMON_ENDPOINT};

/// Performs a GET request and returns the raw body.
#[async_trait(?Send)]
pub trait Transport {
    /// Fetch `url` and return the body as text.
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Transport`] backed by `reqwest` (the browser `fetch` API on wasm).
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        Ok(response.text().await?)
    }
}

/// Decides whether a successful fetch is replaced by a synthetic error.
#[derive(Clone)]
pub struct FailurePolicy(Rc<dyn Fn() -> bool>);

impl FailurePolicy {
    pub fn new(should_fail: impl Fn() -> bool + 'static) -> Self {
        FailurePolicy(Rc::new(should_fail))
    }

    /// Fails with probability `rate`.
    pub fn random(rate: f64) -> Self {
        Self::new(move || random_unit() < rate)
    }

    pub fn always() -> Self {
        Self::new(|| true)
    }

    pub fn never() -> Self {
        Self::new(|| false)
    }

    pub fn should_fail(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FailurePolicy").field(&"...").finish()
    }
}

/// Uniform sample in `[0, 1)`.
fn random_unit() -> f64 {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            js_sys::Math::random()
        } else {
            rand::random::<f64>()
        }
    }
}

/// Sleeps for `duration` without blocking the event loop.
pub async fn delay(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            gloo_timers::future::sleep(duration).await;
        } else {
            logging::debug_warn!(
                "No timer on this target, skipping a {}ms delay.",
                duration.as_millis()
            );
        }
    }
}

/// Where to fetch from, and how unreliable to be about it.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamOptions {
    pub endpoint: String,
    /// Artificial latency added after a successful fetch.
    pub delay: Duration,
    /// Probability of a synthetic failure, between 0 and 1.
    pub failure_rate: f64,
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            endpoint: POKEMON_ENDPOINT.to_string(),
            delay: DEFAULT_DELAY,
            failure_rate: DEFAULT_FAILURE_RATE,
        }
    }
}

const DEFAULT_DELAY: Duration = Duration::from_secs(3);
const DEFAULT_FAILURE_RATE: f64 = 0.3;

/// The upstream Pokemon list, shared by every strategy on the page.
#[derive(Clone)]
pub struct Upstream {
    transport: Rc<dyn Transport>,
    failure: FailurePolicy,
    options: UpstreamOptions,
}

impl Upstream {
    pub fn new(
        transport: impl Transport + 'static,
        failure: FailurePolicy,
        options: UpstreamOptions,
    ) -> Self {
        Self {
            transport: Rc::new(transport),
            failure,
            options,
        }
    }

    /// Real HTTP with random failures at `options.failure_rate`.
    pub fn http(options: UpstreamOptions) -> Self {
        let failure = FailurePolicy::random(options.failure_rate);
        Self::new(HttpTransport::default(), failure, options)
    }

    pub fn options(&self) -> &UpstreamOptions {
        &self.options
    }

    /// The raw response body.
    pub async fn fetch_body(&self) -> Result<String, FetchError> {
        self.transport.get(&self.options.endpoint).await
    }

    /// The parsed `results` of the response.
    pub async fn list_pokemon(&self) -> Result<Vec<PokemonSummary>, FetchError> {
        let body = self.fetch_body().await?;
        parse_pokemon(&body)
    }

    /// Like [`list_pokemon`](Self::list_pokemon), followed by the artificial
    /// delay and a roll of the failure policy. A failed roll discards the
    /// list and returns `FetchError::Synthetic(failure_message)`.
    pub async fn list_pokemon_unreliably(
        &self,
        failure_message: &str,
    ) -> Result<Vec<PokemonSummary>, FetchError> {
        let pokemon = self.list_pokemon().await?;
        delay(self.options.delay).await;
        if self.failure.should_fail() {
            return Err(FetchError::synthetic(failure_message));
        }
        Ok(pokemon)
    }
}

impl fmt::Debug for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upstream")
            .field("failure", &self.failure)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
