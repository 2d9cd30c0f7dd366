#![forbid(unsafe_code)]

//! # Pokemon Fetch Demo
//!
//! One page, three ways of fetching and rendering the same five Pokemon:
//!
//! - [`ManualFetchStrategy`] owns its loading and error state, and fetches once per mount.
//! - [`CachedQueryStrategy`] leaves that state to a [`fetch_query`] cache, with retries disabled.
//! - [`SuspendingResourceStrategy`] reads a [`PokemonResource`] started once at load,
//!   suspending until it settles and handing rejections to an error boundary.
//!
//! The first two go through [`Upstream::list_pokemon_unreliably`], which adds a
//! delay and random failures so loading and error states can be seen.
//!
//! Rendering decisions are made on plain values ([`FetchState`], [`CachedQueryResult`],
//! [`Rendered`]), so they can be tested without a browser.

mod app;
mod error;
mod pokemon;
mod render;
mod strategies;
mod upstream;

#[cfg(test)]
mod testing;

pub use app::App;
pub use error::FetchError;
pub use pokemon::*;
pub use render::Rendered;
pub use strategies::*;
pub use upstream::*;
