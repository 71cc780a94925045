//! Outbound OAuth2 adapter.

mod dto;
mod http_gateway;

pub use http_gateway::{OAuthHttpGateway, ProviderCredentials};
