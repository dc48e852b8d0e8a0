//! Pagination and filter state synchronization.
//!
//! [`FilterState`] is what the catalog-list view filters by; the encoded
//! query string held by [`Location`] is its authoritative form.

mod location;
mod state;

pub use location::*;
pub use state::*;
