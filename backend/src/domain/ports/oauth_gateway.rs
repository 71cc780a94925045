//! Driving port for OAuth2 code exchange and profile retrieval.
//!
//! Inbound handlers call this port to turn a provider callback code into a
//! [`SocialProfile`] without knowing transport details. Handler tests
//! substitute a stub gateway instead of wiring HTTP.

use async_trait::async_trait;

use crate::domain::oauth::{Provider, SocialProfile};

/// Errors raised by OAuth gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OAuthGatewayError {
    /// The provider endpoint could not be reached or returned a server error.
    #[error("{provider} endpoint unreachable: {message}")]
    Unreachable {
        /// Provider that failed.
        provider: Provider,
        /// Underlying failure description.
        message: String,
    },
    /// The provider rejected the authorization code.
    #[error("{provider} rejected the authorization code")]
    CodeRejected {
        /// Provider that rejected the exchange.
        provider: Provider,
    },
    /// The provider responded with a payload we could not interpret.
    #[error("{provider} returned a malformed payload: {message}")]
    Malformed {
        /// Provider whose payload was malformed.
        provider: Provider,
        /// Underlying failure description.
        message: String,
    },
}

/// Port for provider-specific OAuth2 plumbing.
#[async_trait]
pub trait OAuthGateway: Send + Sync {
    /// Build the provider consent page URL embedding the CSRF `state` nonce.
    fn consent_url(&self, provider: Provider, state: &str) -> String;

    /// Exchange the callback `code` and fetch the provider profile.
    async fn fetch_profile(
        &self,
        provider: Provider,
        code: &str,
    ) -> Result<SocialProfile, OAuthGatewayError>;
}
