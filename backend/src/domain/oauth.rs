//! OAuth2 provider dispatch and profile extraction.
//!
//! Each supported provider returns its own attribute payload shape from the
//! userinfo endpoint. The provider is a tagged variant so the extraction
//! logic lives in one place and adding a provider means adding one arm, not
//! another service class.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Supported social login providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google OpenID Connect.
    Google,
    /// Kakao REST login.
    Kakao,
    /// Naver login.
    Naver,
}

impl Provider {
    /// Stable lowercase registration id used in routes and usernames.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Kakao => "kakao",
            Self::Naver => "naver",
        }
    }

    /// Uppercase form persisted on the user row.
    pub fn as_persisted(self) -> &'static str {
        match self {
            Self::Google => "GOOGLE",
            Self::Kakao => "KAKAO",
            Self::Naver => "NAVER",
        }
    }

    /// Parse either the route or the persisted spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "google" | "GOOGLE" => Some(Self::Google),
            "kakao" | "KAKAO" => Some(Self::Kakao),
            "naver" | "NAVER" => Some(Self::Naver),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while extracting a profile from provider attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileExtractError {
    /// The provider payload was missing its subject identifier.
    #[error("{provider} payload is missing the subject identifier")]
    MissingSubject {
        /// Provider whose payload was malformed.
        provider: Provider,
    },
}

/// Identity attributes extracted from a provider userinfo payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialProfile {
    /// Originating provider.
    pub provider: Provider,
    /// Provider-issued subject identifier.
    pub provider_id: String,
    /// Email address, when the provider shares one.
    pub email: Option<String>,
    /// Display name, when the provider shares one.
    pub name: Option<String>,
}

impl SocialProfile {
    /// Extract a profile from the provider's raw userinfo JSON.
    ///
    /// Payload shapes differ per provider: Google exposes `sub`/`email` at the
    /// top level, Kakao nests under `kakao_account.profile`, and Naver wraps
    /// everything in a `response` object.
    pub fn from_attributes(provider: Provider, attributes: &Value) -> Result<Self, ProfileExtractError> {
        let missing = || ProfileExtractError::MissingSubject { provider };
        match provider {
            Provider::Google => {
                let provider_id = attributes
                    .get("sub")
                    .and_then(Value::as_str)
                    .ok_or_else(missing)?
                    .to_owned();
                Ok(Self {
                    provider,
                    provider_id,
                    email: string_at(attributes, &["email"]),
                    name: string_at(attributes, &["name"]),
                })
            }
            Provider::Kakao => {
                // Kakao subject ids are numeric in JSON.
                let provider_id = attributes
                    .get("id")
                    .and_then(Value::as_i64)
                    .ok_or_else(missing)?
                    .to_string();
                Ok(Self {
                    provider,
                    provider_id,
                    email: string_at(attributes, &["kakao_account", "email"]),
                    name: string_at(attributes, &["kakao_account", "profile", "nickname"]),
                })
            }
            Provider::Naver => {
                let response = attributes.get("response").ok_or_else(missing)?;
                let provider_id = response
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(missing)?
                    .to_owned();
                Ok(Self {
                    provider,
                    provider_id,
                    email: string_at(response, &["email"]),
                    name: string_at(response, &["name"]),
                })
            }
        }
    }

    /// Local account username derived from the provider identity.
    pub fn username(&self) -> String {
        format!("{}_{}", self.provider, self.provider_id)
    }
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(key)?;
    }
    current.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("google", Some(Provider::Google))]
    #[case("KAKAO", Some(Provider::Kakao))]
    #[case("naver", Some(Provider::Naver))]
    #[case("github", None)]
    fn provider_parse(#[case] raw: &str, #[case] expected: Option<Provider>) {
        assert_eq!(Provider::parse(raw), expected);
    }

    #[test]
    fn google_profile_extracts_top_level_fields() {
        let payload = json!({
            "sub": "108341992345",
            "email": "reader@example.com",
            "name": "Reader",
            "picture": "https://example.com/p.png",
        });
        let profile =
            SocialProfile::from_attributes(Provider::Google, &payload).expect("valid payload");
        assert_eq!(profile.provider_id, "108341992345");
        assert_eq!(profile.email.as_deref(), Some("reader@example.com"));
        assert_eq!(profile.name.as_deref(), Some("Reader"));
        assert_eq!(profile.username(), "google_108341992345");
    }

    #[test]
    fn kakao_profile_extracts_nested_account() {
        let payload = json!({
            "id": 4125_3349,
            "kakao_account": {
                "email": "reader@kakao.example",
                "profile": { "nickname": "독자" },
            },
        });
        let profile =
            SocialProfile::from_attributes(Provider::Kakao, &payload).expect("valid payload");
        assert_eq!(profile.provider_id, "41253349");
        assert_eq!(profile.email.as_deref(), Some("reader@kakao.example"));
        assert_eq!(profile.name.as_deref(), Some("독자"));
    }

    #[test]
    fn naver_profile_extracts_response_object() {
        let payload = json!({
            "resultcode": "00",
            "message": "success",
            "response": {
                "id": "ab12-cd34",
                "email": "reader@naver.example",
                "name": "Reader",
            },
        });
        let profile =
            SocialProfile::from_attributes(Provider::Naver, &payload).expect("valid payload");
        assert_eq!(profile.provider_id, "ab12-cd34");
        assert_eq!(profile.username(), "naver_ab12-cd34");
    }

    #[rstest]
    #[case(Provider::Google, json!({ "email": "x@y.z" }))]
    #[case(Provider::Kakao, json!({ "id": "not-a-number" }))]
    #[case(Provider::Naver, json!({ "response": {} }))]
    fn missing_subject_is_rejected(#[case] provider: Provider, #[case] payload: Value) {
        let err = SocialProfile::from_attributes(provider, &payload)
            .expect_err("missing subject must fail");
        assert_eq!(err, ProfileExtractError::MissingSubject { provider });
    }

    #[test]
    fn optional_fields_default_to_none() {
        let payload = json!({ "sub": "9" });
        let profile =
            SocialProfile::from_attributes(Provider::Google, &payload).expect("valid payload");
        assert!(profile.email.is_none());
        assert!(profile.name.is_none());
    }
}
