//! Reqwest-backed OAuth gateway adapter.
//!
//! This adapter owns transport details only: consent URL construction, the
//! code-for-token exchange, and the userinfo fetch. Attribute extraction
//! stays in the domain (`SocialProfile::from_attributes`) so provider payload
//! quirks are testable without HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::domain::oauth::{Provider, SocialProfile};
use crate::domain::ports::{OAuthGateway, OAuthGatewayError};

use super::dto::TokenResponseDto;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client credentials registered with one provider.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI registered for the callback.
    pub redirect_uri: String,
}

struct Endpoints {
    authorize: &'static str,
    token: &'static str,
    userinfo: &'static str,
    scope: &'static str,
}

fn endpoints(provider: Provider) -> Endpoints {
    match provider {
        Provider::Google => Endpoints {
            authorize: "https://accounts.google.com/o/oauth2/v2/auth",
            token: "https://oauth2.googleapis.com/token",
            userinfo: "https://openidconnect.googleapis.com/v1/userinfo",
            scope: "openid email profile",
        },
        Provider::Kakao => Endpoints {
            authorize: "https://kauth.kakao.com/oauth/authorize",
            token: "https://kauth.kakao.com/oauth/token",
            userinfo: "https://kapi.kakao.com/v2/user/me",
            scope: "account_email profile_nickname",
        },
        Provider::Naver => Endpoints {
            authorize: "https://nid.naver.com/oauth2.0/authorize",
            token: "https://nid.naver.com/oauth2.0/token",
            userinfo: "https://openapi.naver.com/v1/nid/me",
            scope: "",
        },
    }
}

/// OAuth gateway performing real HTTP exchanges against the providers.
pub struct OAuthHttpGateway {
    client: Client,
    google: ProviderCredentials,
    kakao: ProviderCredentials,
    naver: ProviderCredentials,
}

impl OAuthHttpGateway {
    /// Build a gateway with one credential set per provider.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        google: ProviderCredentials,
        kakao: ProviderCredentials,
        naver: ProviderCredentials,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            google,
            kakao,
            naver,
        })
    }

    fn credentials(&self, provider: Provider) -> &ProviderCredentials {
        match provider {
            Provider::Google => &self.google,
            Provider::Kakao => &self.kakao,
            Provider::Naver => &self.naver,
        }
    }
}

/// Build the consent URL for a provider; pure so it is testable without HTTP.
pub(crate) fn build_consent_url(
    provider: Provider,
    credentials: &ProviderCredentials,
    state: &str,
) -> String {
    let urls = endpoints(provider);
    let mut params = vec![
        ("response_type", "code"),
        ("client_id", credentials.client_id.as_str()),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("state", state),
    ];
    if !urls.scope.is_empty() {
        params.push(("scope", urls.scope));
    }
    // The authorize endpoints are compile-time constants; parsing cannot fail.
    let url = Url::parse_with_params(urls.authorize, params)
        .unwrap_or_else(|err| panic!("authorize endpoint must parse: {err}"));
    url.into()
}

#[async_trait]
impl OAuthGateway for OAuthHttpGateway {
    fn consent_url(&self, provider: Provider, state: &str) -> String {
        build_consent_url(provider, self.credentials(provider), state)
    }

    async fn fetch_profile(
        &self,
        provider: Provider,
        code: &str,
    ) -> Result<SocialProfile, OAuthGatewayError> {
        let urls = endpoints(provider);
        let credentials = self.credentials(provider);

        let token_response = self
            .client
            .post(urls.token)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("redirect_uri", credentials.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|err| OAuthGatewayError::Unreachable {
                provider,
                message: err.to_string(),
            })?;

        if token_response.status() == StatusCode::BAD_REQUEST
            || token_response.status() == StatusCode::UNAUTHORIZED
        {
            return Err(OAuthGatewayError::CodeRejected { provider });
        }
        if !token_response.status().is_success() {
            return Err(OAuthGatewayError::Unreachable {
                provider,
                message: format!("token endpoint returned {}", token_response.status()),
            });
        }

        let token: TokenResponseDto =
            token_response
                .json()
                .await
                .map_err(|err| OAuthGatewayError::Malformed {
                    provider,
                    message: err.to_string(),
                })?;

        let userinfo_response = self
            .client
            .get(urls.userinfo)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|err| OAuthGatewayError::Unreachable {
                provider,
                message: err.to_string(),
            })?;

        if !userinfo_response.status().is_success() {
            return Err(OAuthGatewayError::Unreachable {
                provider,
                message: format!("userinfo endpoint returned {}", userinfo_response.status()),
            });
        }

        let attributes: Value =
            userinfo_response
                .json()
                .await
                .map_err(|err| OAuthGatewayError::Malformed {
                    provider,
                    message: err.to_string(),
                })?;

        SocialProfile::from_attributes(provider, &attributes).map_err(|err| {
            OAuthGatewayError::Malformed {
                provider,
                message: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for consent URL construction.
    use super::*;
    use rstest::rstest;

    fn credentials() -> ProviderCredentials {
        ProviderCredentials {
            client_id: "client-123".to_owned(),
            client_secret: "secret".to_owned(),
            redirect_uri: "https://portal.example/oauth2/google/callback".to_owned(),
        }
    }

    #[rstest]
    #[case(Provider::Google, "accounts.google.com")]
    #[case(Provider::Kakao, "kauth.kakao.com")]
    #[case(Provider::Naver, "nid.naver.com")]
    fn consent_url_targets_the_provider(#[case] provider: Provider, #[case] host: &str) {
        let url = build_consent_url(provider, &credentials(), "state-abc");
        assert!(url.contains(host), "{url} should contain {host}");
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=state-abc"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn naver_consent_url_omits_empty_scope() {
        let url = build_consent_url(Provider::Naver, &credentials(), "s");
        assert!(!url.contains("scope="));
    }

    #[test]
    fn consent_url_escapes_redirect_uri() {
        let url = build_consent_url(Provider::Google, &credentials(), "s");
        assert!(url.contains("redirect_uri=https%3A%2F%2Fportal.example%2Foauth2%2Fgoogle%2Fcallback"));
    }
}
