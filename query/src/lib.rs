#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # About Fetch Query
//!
//! A small asynchronous query cache for [Leptos](https://github.com/leptos-rs/leptos),
//! in the spirit of [Tanstack Query](https://tanstack.com/query/latest/).
//!
//! A Query provides:
//! - caching by key
//! - de-duplication of in-flight fetches
//! - a configurable retry count (`retry: 0` means a single attempt)
//! - error state, so failed fetches can be rendered
//! - invalidation and refetch on mount when stale
//! - cancellation
//!
//! ## The main entry points are:
//! - [`provide_query_client_with_options`] to put a [`QueryClient`] in context.
//! - [`use_query`][crate::use_query::use_query()] to read a query from a component.
//! - [`QueryClient`] methods to fetch, peek, set, invalidate and cancel queries outside of components.
//!
//! # Feature Flags
//! - `csr` Client-side rendering: Use queries in the browser.
//!
//! # Example
//!
//! ```
//! use fetch_query::*;
//! use futures::executor::block_on;
//!
//! let client = QueryClient::new(DefaultQueryOptions::default());
//!
//! let state = block_on(client.fetch_query(
//!     "answer",
//!     |_| async { Ok::<u32, String>(42) },
//!     QueryOptions::from(client.default_options()).set_retry(0),
//! ));
//!
//! assert_eq!(state.data(), Some(&42));
//! ```

mod instant;
mod query;
mod query_cache;
mod query_client;
mod query_executor;
mod query_options;
mod query_result;
mod query_state;
mod use_query;

pub use instant::*;
pub use query_client::*;
pub use query_options::*;
pub use query_result::*;
pub use query_state::*;
pub use use_query::*;

/// Convenience trait for query key requirements.
pub trait QueryKey: std::fmt::Debug + Clone + std::hash::Hash + Eq {}
impl<K> QueryKey for K where K: std::fmt::Debug + Clone + std::hash::Hash + Eq {}

/// Convenience trait for query value requirements.
pub trait QueryValue: std::fmt::Debug + Clone {}
impl<V> QueryValue for V where V: std::fmt::Debug + Clone {}

/// Convenience trait for query error requirements.
pub trait QueryError: std::fmt::Display + std::fmt::Debug + Clone {}
impl<E> QueryError for E where E: std::fmt::Display + std::fmt::Debug + Clone {}
