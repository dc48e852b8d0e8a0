//! Command handlers, one module per command group.

pub mod auth;
pub mod browse;
pub mod config;
pub mod favorites;
pub mod import;
pub mod movie;
pub mod profiles;
pub mod watchlist;
