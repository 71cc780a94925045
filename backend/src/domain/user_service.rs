//! User account use-cases: registration, login, token resolution, and
//! OAuth provisioning.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;

use crate::domain::auth::{AccessToken, IssuedToken, LoginCredentials};
use crate::domain::error::Error;
use crate::domain::oauth::SocialProfile;
use crate::domain::ports::{
    PasswordHasher, TokenPersistenceError, TokenRepository, UserPersistenceError, UserRepository,
};
use crate::domain::user::{NewUser, Role, User, UserId, UserProfile};

/// Sentinel stored instead of a hash for social accounts; it can never verify.
const SOCIAL_LOGIN_PASSWORD: &str = "!social-login!";

/// Random suffix length for generated social nicknames.
const SOCIAL_NICKNAME_SUFFIX: usize = 6;

fn token_ttl() -> Duration {
    Duration::hours(12)
}

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateUsername => Error::conflict("username is already taken"),
        UserPersistenceError::DuplicateEmail => Error::conflict("email is already registered"),
    }
}

fn map_token_error(error: TokenPersistenceError) -> Error {
    match error {
        TokenPersistenceError::Connection { message } => Error::service_unavailable(message),
        TokenPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Orchestrates account reads and writes over the user and token ports.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Create a service over the given ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Register a password account. The nickname defaults to the username.
    pub async fn join(
        &self,
        credentials: &LoginCredentials,
        email: &str,
    ) -> Result<UserProfile, Error> {
        let new_user = NewUser {
            username: credentials.username().to_owned(),
            password_hash: self.hasher.hash(credentials.password()),
            email: email.trim().to_owned(),
            nickname: credentials.username().to_owned(),
            image: None,
            role: Role::User,
            provider: None,
            provider_id: None,
        };
        new_user
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let user = self
            .users
            .insert(&new_user)
            .await
            .map_err(map_user_persistence_error)?;
        Ok(UserProfile::from(&user))
    }

    /// Verify credentials against a live account and issue a bearer token.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<IssuedToken, Error> {
        let (user, stored_hash) = self
            .users
            .find_with_password(credentials.username())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        if !self.hasher.verify(credentials.password(), &stored_hash) {
            return Err(Error::unauthorized("invalid credentials"));
        }

        // Opportunistic cleanup keeps the token table from growing unbounded.
        let purged = self
            .tokens
            .purge_expired(Utc::now())
            .await
            .map_err(map_token_error)?;
        if purged > 0 {
            info!(purged, "removed expired bearer tokens");
        }

        self.issue_token(user.id).await
    }

    /// Issue a fresh bearer token for an already-authenticated user.
    pub async fn issue_token(&self, user: UserId) -> Result<IssuedToken, Error> {
        let token = AccessToken::generate();
        let expires_at = Utc::now() + token_ttl();
        self.tokens
            .insert(&token.digest(), user, expires_at)
            .await
            .map_err(map_token_error)?;
        Ok(IssuedToken {
            token: token.reveal().to_owned(),
            expires_at,
        })
    }

    /// Resolve a presented bearer token to its user id, if still valid.
    pub async fn resolve_token(&self, raw: &str) -> Result<Option<UserId>, Error> {
        let digest = AccessToken::from_raw(raw).digest();
        self.tokens
            .find_user(&digest, Utc::now())
            .await
            .map_err(map_token_error)
    }

    /// Fetch the flattened profile of a live account.
    pub async fn profile(&self, user: UserId) -> Result<UserProfile, Error> {
        let user = self
            .users
            .find_by_id(user)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(UserProfile::from(&user))
    }

    /// Look up or provision the local account for a social profile.
    ///
    /// The username is `{provider}_{provider_id}`, so an unseen pair creates
    /// exactly one record and a repeat login reuses it. A racing first login
    /// loses the unique-constraint race and falls back to the winner's row.
    pub async fn find_or_create_social(&self, profile: &SocialProfile) -> Result<User, Error> {
        let username = profile.username();
        if let Some(existing) = self
            .users
            .find_by_username(&username)
            .await
            .map_err(map_user_persistence_error)?
        {
            return Ok(existing);
        }

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SOCIAL_NICKNAME_SUFFIX)
            .map(char::from)
            .collect();
        let new_user = NewUser {
            username: username.clone(),
            password_hash: SOCIAL_LOGIN_PASSWORD.to_owned(),
            email: profile
                .email
                .clone()
                .unwrap_or_else(|| format!("{username}@social.invalid")),
            nickname: format!("Social_User_{suffix}"),
            image: None,
            role: Role::User,
            provider: Some(profile.provider),
            provider_id: Some(profile.provider_id.clone()),
        };

        match self.users.insert(&new_user).await {
            Ok(user) => {
                info!(provider = %profile.provider, user = %user.id, "provisioned social account");
                Ok(user)
            }
            Err(UserPersistenceError::DuplicateUsername) => self
                .users
                .find_by_username(&username)
                .await
                .map_err(map_user_persistence_error)?
                .ok_or_else(|| Error::internal("social account vanished after conflict")),
            Err(err) => Err(map_user_persistence_error(err)),
        }
    }

    /// Soft-delete the caller's account.
    pub async fn delete_account(&self, user: UserId) -> Result<(), Error> {
        let removed = self
            .users
            .soft_delete(user)
            .await
            .map_err(map_user_persistence_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("user not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for account use-cases over stub ports.
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::oauth::Provider;
    use async_trait::async_trait;
    use chrono::DateTime;

    struct StubUserState {
        users: Vec<(User, String)>,
        next_id: i64,
    }

    struct StubUserRepository {
        state: Mutex<StubUserState>,
        insert_calls: AtomicUsize,
        hide_next_find: AtomicBool,
    }

    impl StubUserRepository {
        fn empty() -> Self {
            Self {
                state: Mutex::new(StubUserState {
                    users: Vec::new(),
                    next_id: 0,
                }),
                insert_calls: AtomicUsize::new(0),
                hide_next_find: AtomicBool::new(false),
            }
        }

        fn insert_call_count(&self) -> usize {
            self.insert_calls.load(Ordering::Relaxed)
        }

        /// Make the next `find_by_username` miss, as if a racing login had
        /// not committed yet at lookup time.
        fn hide_next_find(&self) {
            self.hide_next_find.store(true, Ordering::Relaxed);
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
            self.insert_calls.fetch_add(1, Ordering::Relaxed);
            let mut state = self.state.lock().expect("state lock");
            if state
                .users
                .iter()
                .any(|(existing, _)| existing.username == user.username)
            {
                return Err(UserPersistenceError::DuplicateUsername);
            }
            if state
                .users
                .iter()
                .any(|(existing, _)| existing.email == user.email)
            {
                return Err(UserPersistenceError::DuplicateEmail);
            }
            state.next_id += 1;
            let stored = User {
                id: UserId::new(state.next_id).expect("positive id"),
                username: user.username.clone(),
                email: user.email.clone(),
                nickname: user.nickname.clone(),
                image: user.image.clone(),
                role: user.role,
                provider: user.provider,
                provider_id: user.provider_id.clone(),
                created_at: Utc::now(),
            };
            state.users.push((stored.clone(), user.password_hash.clone()));
            Ok(stored)
        }

        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .users
                .iter()
                .find(|(user, _)| user.id == id)
                .map(|(user, _)| user.clone()))
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<User>, UserPersistenceError> {
            if self.hide_next_find.swap(false, Ordering::Relaxed) {
                return Ok(None);
            }
            let state = self.state.lock().expect("state lock");
            Ok(state
                .users
                .iter()
                .find(|(user, _)| user.username == username)
                .map(|(user, _)| user.clone()))
        }

        async fn find_with_password(
            &self,
            username: &str,
        ) -> Result<Option<(User, String)>, UserPersistenceError> {
            let state = self.state.lock().expect("state lock");
            Ok(state
                .users
                .iter()
                .find(|(user, _)| user.username == username)
                .cloned())
        }

        async fn soft_delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
            let mut state = self.state.lock().expect("state lock");
            let before = state.users.len();
            state.users.retain(|(user, _)| user.id != id);
            Ok(state.users.len() < before)
        }
    }

    #[derive(Default)]
    struct StubTokenRepository {
        tokens: Mutex<HashMap<String, (UserId, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl TokenRepository for StubTokenRepository {
        async fn insert(
            &self,
            digest: &str,
            user: UserId,
            expires_at: DateTime<Utc>,
        ) -> Result<(), TokenPersistenceError> {
            self.tokens
                .lock()
                .expect("tokens lock")
                .insert(digest.to_owned(), (user, expires_at));
            Ok(())
        }

        async fn find_user(
            &self,
            digest: &str,
            now: DateTime<Utc>,
        ) -> Result<Option<UserId>, TokenPersistenceError> {
            Ok(self
                .tokens
                .lock()
                .expect("tokens lock")
                .get(digest)
                .filter(|(_, expires_at)| *expires_at > now)
                .map(|(user, _)| *user))
        }

        async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenPersistenceError> {
            let mut tokens = self.tokens.lock().expect("tokens lock");
            let before = tokens.len();
            tokens.retain(|_, (_, expires_at)| *expires_at > now);
            Ok(u64::try_from(before - tokens.len()).expect("count fits"))
        }
    }

    /// Reversible test hasher so stored hashes are visibly not plaintext.
    struct StubHasher;

    impl PasswordHasher for StubHasher {
        fn hash(&self, password: &str) -> String {
            format!("hashed:{password}")
        }

        fn verify(&self, password: &str, stored: &str) -> bool {
            stored == format!("hashed:{password}")
        }
    }

    struct Harness {
        users: Arc<StubUserRepository>,
        tokens: Arc<StubTokenRepository>,
        service: UserService,
    }

    fn harness() -> Harness {
        let users = Arc::new(StubUserRepository::empty());
        let tokens = Arc::new(StubTokenRepository::default());
        let service = UserService::new(users.clone(), tokens.clone(), Arc::new(StubHasher));
        Harness {
            users,
            tokens,
            service,
        }
    }

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("valid test credentials")
    }

    fn google_profile(provider_id: &str) -> SocialProfile {
        SocialProfile {
            provider: Provider::Google,
            provider_id: provider_id.to_owned(),
            email: Some("reader@example.com".to_owned()),
            name: Some("Reader".to_owned()),
        }
    }

    #[tokio::test]
    async fn join_then_login_round_trips() {
        let fixture = harness();
        let profile = fixture
            .service
            .join(&credentials("alice", "s3cret"), "alice@example.com")
            .await
            .expect("join succeeds");
        assert_eq!(profile.nickname, "alice");

        let issued = fixture
            .service
            .login(&credentials("alice", "s3cret"))
            .await
            .expect("login succeeds");
        let resolved = fixture
            .service
            .resolve_token(&issued.token)
            .await
            .expect("resolution succeeds");
        assert_eq!(resolved, Some(profile.user_id));
    }

    #[tokio::test]
    async fn join_rejects_duplicate_username() {
        let fixture = harness();
        fixture
            .service
            .join(&credentials("alice", "pw"), "alice@example.com")
            .await
            .expect("first join succeeds");
        let err = fixture
            .service
            .join(&credentials("alice", "pw2"), "other@example.com")
            .await
            .expect_err("duplicate username");
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn join_rejects_invalid_email() {
        let fixture = harness();
        let err = fixture
            .service
            .join(&credentials("alice", "pw"), "not-an-email")
            .await
            .expect_err("invalid email");
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let fixture = harness();
        fixture
            .service
            .join(&credentials("alice", "pw"), "alice@example.com")
            .await
            .expect("join succeeds");
        let err = fixture
            .service
            .login(&credentials("alice", "wrong"))
            .await
            .expect_err("wrong password");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn login_rejects_unknown_user() {
        let fixture = harness();
        let err = fixture
            .service
            .login(&credentials("ghost", "pw"))
            .await
            .expect_err("unknown user");
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn expired_tokens_do_not_authenticate() {
        let fixture = harness();
        let user = UserId::new(1).expect("positive id");
        let token = AccessToken::generate();
        fixture
            .tokens
            .insert(&token.digest(), user, Utc::now() - Duration::minutes(1))
            .await
            .expect("stub insert");
        let resolved = fixture
            .service
            .resolve_token(token.reveal())
            .await
            .expect("resolution succeeds");
        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn social_login_creates_exactly_one_record() {
        let fixture = harness();
        let first = fixture
            .service
            .find_or_create_social(&google_profile("108341"))
            .await
            .expect("first social login");
        assert_eq!(first.username, "google_108341");
        assert_eq!(first.provider, Some(Provider::Google));
        assert!(first.nickname.starts_with("Social_User_"));

        let second = fixture
            .service
            .find_or_create_social(&google_profile("108341"))
            .await
            .expect("repeat social login");
        assert_eq!(second.id, first.id);
        assert_eq!(fixture.users.insert_call_count(), 1);
    }

    #[tokio::test]
    async fn social_login_falls_back_to_winner_after_losing_the_insert_race() {
        let fixture = harness();
        let winner = fixture
            .service
            .find_or_create_social(&google_profile("42"))
            .await
            .expect("winner provisioned");

        // The racing login misses the winner's row on lookup, collides on
        // insert, and must land on the winner's record.
        fixture.users.hide_next_find();
        let reused = fixture
            .service
            .find_or_create_social(&google_profile("42"))
            .await
            .expect("loser falls back to winner's row");
        assert_eq!(reused.id, winner.id);
        assert_eq!(fixture.users.insert_call_count(), 2);
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_not_found() {
        let fixture = harness();
        let err = fixture
            .service
            .profile(UserId::new(9).expect("positive id"))
            .await
            .expect_err("unknown user");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_account_hides_user() {
        let fixture = harness();
        let profile = fixture
            .service
            .join(&credentials("alice", "pw"), "alice@example.com")
            .await
            .expect("join succeeds");
        fixture
            .service
            .delete_account(profile.user_id)
            .await
            .expect("delete succeeds");
        let err = fixture
            .service
            .profile(profile.user_id)
            .await
            .expect_err("deleted user is gone");
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
