//! User account model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::oauth::Provider;

/// Validation errors returned by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was zero or negative.
    #[error("user id must be a positive integer")]
    InvalidId,
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username exceeded the storage limit.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Nickname was missing or blank once trimmed.
    #[error("nickname must not be empty")]
    EmptyNickname,
    /// Nickname exceeded the storage limit.
    #[error("nickname must be at most {max} characters")]
    NicknameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Email did not look like an address.
    #[error("email must contain '@'")]
    InvalidEmail,
}

/// Maximum allowed length for usernames and nicknames.
pub const NAME_MAX: usize = 64;

/// Stable numeric user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(raw: i64) -> Result<Self, UserValidationError> {
        if raw <= 0 {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Access the raw identifier for persistence.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access level attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular reader account.
    User,
    /// Editorial account allowed to publish portal news.
    Admin,
}

impl Role {
    /// Stable string form used in persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "USER" => Some(Self::User),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Application user.
///
/// Soft-deleted rows never surface here; repositories filter them out, so a
/// `User` value always refers to a live account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stable numeric identifier.
    pub id: UserId,
    /// Unique login name. Social accounts use `{provider}_{provider_id}`.
    pub username: String,
    /// Contact address, unique per account.
    pub email: String,
    /// Display name shown on polls and articles.
    pub nickname: String,
    /// Profile image URL, if one was set.
    pub image: Option<String>,
    /// Access level.
    pub role: Role,
    /// OAuth provider for social accounts.
    pub provider: Option<Provider>,
    /// Provider-issued subject identifier for social accounts.
    pub provider_id: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a user record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Hashed password material (never the raw password).
    pub password_hash: String,
    /// Contact address.
    pub email: String,
    /// Display name.
    pub nickname: String,
    /// Profile image URL.
    pub image: Option<String>,
    /// Access level.
    pub role: Role,
    /// OAuth provider for social accounts.
    pub provider: Option<Provider>,
    /// Provider-issued subject identifier.
    pub provider_id: Option<String>,
}

impl NewUser {
    /// Validate the fields that have storage-level limits.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        validate_name(&self.username).map_err(|err| match err {
            NameError::Empty => UserValidationError::EmptyUsername,
            NameError::TooLong => UserValidationError::UsernameTooLong { max: NAME_MAX },
        })?;
        validate_name(&self.nickname).map_err(|err| match err {
            NameError::Empty => UserValidationError::EmptyNickname,
            NameError::TooLong => UserValidationError::NicknameTooLong { max: NAME_MAX },
        })?;
        if !self.email.contains('@') {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(())
    }
}

enum NameError {
    Empty,
    TooLong,
}

fn validate_name(raw: &str) -> Result<(), NameError> {
    if raw.trim().is_empty() {
        return Err(NameError::Empty);
    }
    if raw.chars().count() > NAME_MAX {
        return Err(NameError::TooLong);
    }
    Ok(())
}

/// Flattened account projection returned by profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Stable numeric identifier.
    pub user_id: UserId,
    /// Display name.
    pub nickname: String,
    /// Profile image URL, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Access level.
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            nickname: user.nickname.clone(),
            image: user.image.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn new_user(username: &str, nickname: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            password_hash: "digest".to_owned(),
            email: email.to_owned(),
            nickname: nickname.to_owned(),
            image: None,
            role: Role::User,
            provider: None,
            provider_id: None,
        }
    }

    #[rstest]
    #[case(0)]
    #[case(-7)]
    fn user_id_rejects_non_positive(#[case] raw: i64) {
        assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
    }

    #[test]
    fn user_id_round_trips() {
        let id = UserId::new(42).expect("positive id");
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[rstest]
    #[case("USER", Some(Role::User))]
    #[case("ADMIN", Some(Role::Admin))]
    #[case("root", None)]
    fn role_parses_persisted_form(#[case] raw: &str, #[case] expected: Option<Role>) {
        assert_eq!(Role::parse(raw), expected);
    }

    #[rstest]
    #[case("", "reader", "a@b.c", UserValidationError::EmptyUsername)]
    #[case("   ", "reader", "a@b.c", UserValidationError::EmptyUsername)]
    #[case("alice", "", "a@b.c", UserValidationError::EmptyNickname)]
    #[case("alice", "reader", "not-an-email", UserValidationError::InvalidEmail)]
    fn new_user_validation_rejects(
        #[case] username: &str,
        #[case] nickname: &str,
        #[case] email: &str,
        #[case] expected: UserValidationError,
    ) {
        let err = new_user(username, nickname, email)
            .validate()
            .expect_err("invalid input must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn new_user_validation_rejects_overlong_username() {
        let long = "a".repeat(NAME_MAX + 1);
        let err = new_user(&long, "reader", "a@b.c")
            .validate()
            .expect_err("overlong username must fail");
        assert_eq!(err, UserValidationError::UsernameTooLong { max: NAME_MAX });
    }

    #[test]
    fn new_user_validation_accepts_social_shape() {
        new_user("google_108341", "Social_User_9ab1c2", "a@b.c")
            .validate()
            .expect("social usernames are valid");
    }
}
