//! Authentication against the catalog service.
//!
//! The service issues a JWT on login. The token is kept in the session store
//! and attached to every request by [`ApiClient`](crate::http::ApiClient);
//! its payload carries the user's role.

mod http;
mod login;
mod traits;
mod types;

pub use http::*;
pub use login::*;
pub use traits::*;
pub use types::*;
