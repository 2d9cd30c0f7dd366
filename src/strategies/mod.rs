//! The three ways the page fetches and renders the same list.
//!
//! Each strategy is independent: no state is shared between them, and each
//! renders its own loading and error states.

mod cached_query;
mod manual_fetch;
mod suspending_resource;

pub use cached_query::*;
pub use manual_fetch::*;
pub use suspending_resource::*;
