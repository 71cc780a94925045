//! Wire payloads exchanged with OAuth providers.

use serde::Deserialize;

/// Token endpoint response; only the access token is used.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseDto {
    /// Bearer token for the userinfo request.
    pub access_token: String,
}
