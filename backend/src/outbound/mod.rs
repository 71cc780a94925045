//! Outbound adapters: persistence, OAuth providers, and the summary source.

pub mod oauth;
pub mod persistence;
pub mod security;
pub mod summary;
