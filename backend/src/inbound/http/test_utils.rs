//! In-memory backend used by HTTP adapter tests.
//!
//! Implements every domain port over `Mutex`-guarded collections so handler
//! tests exercise the real services and extractors without a database or
//! network. Seeding goes through the repository handles on [`TestBackend`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::domain::news::{GptSummary, News, NewsId};
use crate::domain::oauth::{Provider, SocialProfile};
use crate::domain::poll::{Poll, PollAuthor, PollDraft, PollId, PollOption, PollOptionId};
use crate::domain::ports::{
    FollowOutcome, FollowPersistenceError, FollowRepository, NewsPersistenceError, NewsRepository,
    OAuthGateway, OAuthGatewayError, PasswordHasher, PollPersistenceError, PollRepository,
    ScrapOutcome, ScrapPersistenceError, ScrapRepository, SummarySource, SummarySourceError,
    TokenPersistenceError, TokenRepository, UserPersistenceError, UserRepository, VoteOutcome,
};
use crate::domain::user::{NewUser, Role, User, UserId};
use crate::domain::{FollowService, NewsService, PollService, UserService};

use super::state::HttpState;

/// Cookie session middleware with a fixed key for tests.
pub(crate) fn test_session_middleware(
) -> actix_session::SessionMiddleware<actix_session::storage::CookieSessionStore> {
    actix_session::SessionMiddleware::builder(
        actix_session::storage::CookieSessionStore::default(),
        actix_web::cookie::Key::from(&[0u8; 64]),
    )
    .cookie_name("session".into())
    .cookie_secure(false)
    .build()
}

pub(crate) fn user_id(raw: i64) -> UserId {
    UserId::new(raw).expect("valid user id")
}

pub(crate) fn poll_id(raw: i64) -> PollId {
    PollId::new(raw).expect("valid poll id")
}

pub(crate) fn option_id(raw: i64) -> PollOptionId {
    PollOptionId::new(raw).expect("valid option id")
}

pub(crate) fn news_id(raw: i64) -> NewsId {
    NewsId::new(raw).expect("valid news id")
}

#[derive(Default)]
pub(crate) struct InMemoryUsers {
    state: Mutex<(Vec<(User, String)>, i64)>,
}

impl InMemoryUsers {
    pub fn seed(&self, id: i64, username: &str, role: Role) -> User {
        let user = User {
            id: user_id(id),
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            nickname: username.to_owned(),
            image: None,
            role,
            provider: None,
            provider_id: None,
            created_at: Utc::now(),
        };
        self.state
            .lock()
            .expect("state lock")
            .0
            .push((user.clone(), "seeded".to_owned()));
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state.0.iter().any(|(u, _)| u.username == user.username) {
            return Err(UserPersistenceError::DuplicateUsername);
        }
        if state.0.iter().any(|(u, _)| u.email == user.email) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        state.1 += 1;
        let next = state.1 + 1000;
        let stored = User {
            id: user_id(next),
            username: user.username.clone(),
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            image: user.image.clone(),
            role: user.role,
            provider: user.provider,
            provider_id: user.provider_id.clone(),
            created_at: Utc::now(),
        };
        state.0.push((stored.clone(), user.password_hash.clone()));
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .0
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .0
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.clone()))
    }

    async fn find_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, UserPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.0.iter().find(|(u, _)| u.username == username).cloned())
    }

    async fn soft_delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let before = state.0.len();
        state.0.retain(|(u, _)| u.id != id);
        Ok(state.0.len() < before)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryTokens {
    tokens: Mutex<HashMap<String, (UserId, DateTime<Utc>)>>,
}

#[async_trait]
impl TokenRepository for InMemoryTokens {
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

#[derive(Default)]
pub(crate) struct InMemoryPolls {
    state: Mutex<(Vec<Poll>, HashSet<(i64, i64)>, i64)>,
}

impl InMemoryPolls {
    pub fn seed_poll(&self, id: i64, author: &User, options: &[(i64, &str)]) -> Poll {
        let poll = Poll {
            id: poll_id(id),
            title: format!("Poll {id}"),
            created_at: Utc::now() - Duration::hours(2),
            expired_at: Utc::now() + Duration::days(3),
            author: PollAuthor {
                id: author.id,
                nickname: author.nickname.clone(),
                image: author.image.clone(),
            },
            options: options
                .iter()
                .map(|(option, content)| PollOption {
                    id: option_id(*option),
                    content: (*content).to_owned(),
                    vote_count: 0,
                })
                .collect(),
        };
        self.state.lock().expect("state lock").0.push(poll.clone());
        poll
    }

    pub fn poll(&self, id: i64) -> Option<Poll> {
        self.state
            .lock()
            .expect("state lock")
            .0
            .iter()
            .find(|poll| poll.id.get() == id)
            .cloned()
    }
}

#[async_trait]
impl PollRepository for InMemoryPolls {
    async fn create(&self, author: UserId, draft: &PollDraft) -> Result<Poll, PollPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.2 += 1;
        let id = state.2 + 500;
        let poll = Poll {
            id: poll_id(id),
            title: draft.title.clone(),
            created_at: Utc::now(),
            expired_at: draft.expired_at,
            author: PollAuthor {
                id: author,
                nickname: format!("user{author}"),
                image: None,
            },
            options: draft
                .options
                .iter()
                .enumerate()
                .map(|(index, content)| PollOption {
                    id: option_id(id * 10 + i64::try_from(index).expect("small index")),
                    content: content.clone(),
                    vote_count: 0,
                })
                .collect(),
        };
        state.0.push(poll.clone());
        Ok(poll)
    }

    async fn find(&self, id: PollId) -> Result<Option<Poll>, PollPersistenceError> {
        Ok(self.poll(id.get()))
    }

    async fn find_by_option(
        &self,
        option: PollOptionId,
    ) -> Result<Option<Poll>, PollPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .0
            .iter()
            .find(|poll| poll.options.iter().any(|candidate| candidate.id == option))
            .cloned())
    }

    async fn list_open(&self, now: DateTime<Utc>) -> Result<Vec<Poll>, PollPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .0
            .iter()
            .filter(|poll| poll.expired_at > now)
            .cloned()
            .collect())
    }

    async fn list_open_soonest(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Poll>, PollPersistenceError> {
        let mut open = self.list_open(now).await?;
        open.sort_by_key(|poll| poll.expired_at);
        open.truncate(usize::try_from(limit).expect("small limit"));
        Ok(open)
    }

    async fn replace(
        &self,
        id: PollId,
        title: &str,
        expired_at: DateTime<Utc>,
        options: &[String],
    ) -> Result<Poll, PollPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        state.1.retain(|(_, poll)| *poll != id.get());
        let poll = state
            .0
            .iter_mut()
            .find(|poll| poll.id == id)
            .ok_or_else(|| PollPersistenceError::query("poll vanished during update"))?;
        poll.title = title.to_owned();
        poll.expired_at = expired_at;
        poll.options = options
            .iter()
            .enumerate()
            .map(|(index, content)| PollOption {
                id: option_id(id.get() * 100 + i64::try_from(index).expect("small index")),
                content: content.clone(),
                vote_count: 0,
            })
            .collect();
        Ok(poll.clone())
    }

    async fn delete(&self, id: PollId) -> Result<bool, PollPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let before = state.0.len();
        state.0.retain(|poll| poll.id != id);
        state.1.retain(|(_, poll)| *poll != id.get());
        Ok(state.0.len() < before)
    }

    async fn insert_vote(
        &self,
        user: UserId,
        poll: PollId,
        option: PollOptionId,
    ) -> Result<VoteOutcome, PollPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if !state.1.insert((user.get(), poll.get())) {
            return Ok(VoteOutcome::Duplicate);
        }
        let stored = state
            .0
            .iter_mut()
            .find(|candidate| candidate.id == poll)
            .ok_or_else(|| PollPersistenceError::query("poll vanished during vote"))?;
        let target = stored
            .options
            .iter_mut()
            .find(|candidate| candidate.id == option)
            .ok_or_else(|| PollPersistenceError::query("option vanished during vote"))?;
        target.vote_count += 1;
        Ok(VoteOutcome::Applied)
    }

    async fn has_voted(&self, user: UserId, poll: PollId) -> Result<bool, PollPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.1.contains(&(user.get(), poll.get())))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryFollows {
    pairs: Mutex<HashSet<(i64, i64)>>,
}

#[async_trait]
impl FollowRepository for InMemoryFollows {
    async fn insert(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<FollowOutcome, FollowPersistenceError> {
        let inserted = self
            .pairs
            .lock()
            .expect("pairs lock")
            .insert((follower.get(), following.get()));
        Ok(if inserted {
            FollowOutcome::Applied
        } else {
            FollowOutcome::Duplicate
        })
    }

    async fn delete(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        Ok(self
            .pairs
            .lock()
            .expect("pairs lock")
            .remove(&(follower.get(), following.get())))
    }

    async fn exists(
        &self,
        follower: UserId,
        following: UserId,
    ) -> Result<bool, FollowPersistenceError> {
        Ok(self
            .pairs
            .lock()
            .expect("pairs lock")
            .contains(&(follower.get(), following.get())))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryNews {
    state: Mutex<(Vec<News>, HashMap<i64, GptSummary>)>,
}

impl InMemoryNews {
    pub fn seed_article(&self, id: i64, title: &str, author: &User) -> News {
        let article = News {
            id: news_id(id),
            title: title.to_owned(),
            content: format!("Body of {title}"),
            image: None,
            category: "general".to_owned(),
            author_id: author.id,
            author_nickname: author.nickname.clone(),
            created_at: Utc::now() - Duration::hours(4),
        };
        self.state
            .lock()
            .expect("state lock")
            .0
            .push(article.clone());
        article
    }
}

#[async_trait]
impl NewsRepository for InMemoryNews {
    async fn find(&self, id: NewsId) -> Result<Option<News>, NewsPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.0.iter().find(|news| news.id == id).cloned())
    }

    async fn recent_admin_news(
        &self,
        _since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<News>, NewsPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state
            .0
            .iter()
            .take(usize::try_from(limit).expect("small limit"))
            .cloned()
            .collect())
    }

    async fn find_summary(
        &self,
        news: NewsId,
    ) -> Result<Option<GptSummary>, NewsPersistenceError> {
        let state = self.state.lock().expect("state lock");
        Ok(state.1.get(&news.get()).cloned())
    }

    async fn store_summary(&self, summary: &GptSummary) -> Result<(), NewsPersistenceError> {
        self.state
            .lock()
            .expect("state lock")
            .1
            .insert(summary.news_id.get(), summary.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryScraps {
    state: Mutex<(HashSet<(i64, i64)>, Vec<News>)>,
}

#[async_trait]
impl ScrapRepository for InMemoryScraps {
    async fn insert(
        &self,
        user: UserId,
        news: NewsId,
    ) -> Result<ScrapOutcome, ScrapPersistenceError> {
        let inserted = self
            .state
            .lock()
            .expect("state lock")
            .0
            .insert((user.get(), news.get()));
        Ok(if inserted {
            ScrapOutcome::Applied
        } else {
            ScrapOutcome::Duplicate
        })
    }

    async fn delete(&self, user: UserId, news: NewsId) -> Result<bool, ScrapPersistenceError> {
        Ok(self
            .state
            .lock()
            .expect("state lock")
            .0
            .remove(&(user.get(), news.get())))
    }

    async fn list_news_for_user(&self, _user: UserId) -> Result<Vec<News>, ScrapPersistenceError> {
        Ok(self.state.lock().expect("state lock").1.clone())
    }
}

pub(crate) struct StubSummarySource;

#[async_trait]
impl SummarySource for StubSummarySource {
    async fn summarize(&self, title: &str, _content: &str) -> Result<String, SummarySourceError> {
        Ok(format!("Summary of {title}"))
    }
}

/// Stub gateway: `good-code` exchanges successfully, anything else is
/// rejected as an invalid authorization code.
pub(crate) struct StubOAuthGateway;

#[async_trait]
impl OAuthGateway for StubOAuthGateway {
    fn consent_url(&self, provider: Provider, state: &str) -> String {
        format!("https://consent.example/{provider}?state={state}")
    }

    async fn fetch_profile(
        &self,
        provider: Provider,
        code: &str,
    ) -> Result<SocialProfile, OAuthGatewayError> {
        if code != "good-code" {
            return Err(OAuthGatewayError::CodeRejected { provider });
        }
        Ok(SocialProfile {
            provider,
            provider_id: "108341".to_owned(),
            email: Some("reader@example.com".to_owned()),
            name: Some("Reader".to_owned()),
        })
    }
}

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> String {
        format!("hashed:{password}")
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        stored == format!("hashed:{password}")
    }
}

/// Repository handles plus the wired state, for seeding from tests.
pub(crate) struct TestBackend {
    pub users: Arc<InMemoryUsers>,
    pub polls: Arc<InMemoryPolls>,
    pub news: Arc<InMemoryNews>,
    pub state: HttpState,
}

pub(crate) fn test_backend() -> TestBackend {
    let users = Arc::new(InMemoryUsers::default());
    let tokens = Arc::new(InMemoryTokens::default());
    let polls = Arc::new(InMemoryPolls::default());
    let follows = Arc::new(InMemoryFollows::default());
    let news = Arc::new(InMemoryNews::default());
    let scraps = Arc::new(InMemoryScraps::default());

    let user_service = Arc::new(UserService::new(
        users.clone(),
        tokens.clone(),
        Arc::new(PlainHasher),
    ));
    let poll_service = Arc::new(PollService::new(
        polls.clone(),
        users.clone(),
        follows.clone(),
    ));
    let follow_service = Arc::new(FollowService::new(follows, users.clone()));
    let news_service = Arc::new(NewsService::new(
        news.clone(),
        scraps,
        Arc::new(StubSummarySource),
    ));

    let state = HttpState::new(
        user_service,
        poll_service,
        follow_service,
        news_service,
        Arc::new(StubOAuthGateway),
    );

    TestBackend {
        users,
        polls,
        news,
        state,
    }
}

pub(crate) async fn test_state() -> HttpState {
    test_backend().state
}

/// Issue a live bearer token for user `raw`. Seed the user separately when
/// the handler under test needs a stored profile.
pub(crate) async fn issue_token_for(state: &HttpState, raw: i64) -> String {
    let issued = state
        .users
        .issue_token(user_id(raw))
        .await
        .expect("token issue succeeds");
    issued.token
}
