//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Soft-deleted rows are filtered at this layer, so the domain only ever sees
//! live accounts. Duplicate usernames and emails are detected through the
//! UNIQUE constraint names rather than pre-flight existence checks.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::oauth::Provider;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{NewUser, Role, User, UserId};

use super::diesel_helpers::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> UserPersistenceError {
    match failure {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn map_insert_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        return match info.constraint_name() {
            Some(USERNAME_CONSTRAINT) => UserPersistenceError::DuplicateUsername,
            Some(EMAIL_CONSTRAINT) => UserPersistenceError::DuplicateEmail,
            _ => UserPersistenceError::query("unexpected unique violation"),
        };
    }
    map_failure(classify_diesel_error(error))
}

pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = UserId::new(row.id).map_err(|_| UserPersistenceError::query("corrupt user id"))?;
    let role = Role::parse(&row.role).unwrap_or_else(|| {
        warn!(value = %row.role, user = row.id, "unrecognised role value, defaulting to USER");
        Role::User
    });
    let provider = match row.provider.as_deref() {
        None => None,
        Some(raw) => match Provider::parse(raw) {
            Some(provider) => Some(provider),
            None => {
                warn!(value = raw, user = row.id, "unrecognised provider value, dropping");
                None
            }
        },
    };
    Ok(User {
        id,
        username: row.username,
        email: row.email,
        nickname: row.nickname,
        image: row.image,
        role,
        provider,
        provider_id: row.provider_id,
        created_at: row.created_at,
    })
}

impl DieselUserRepository {
    async fn find_row_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRow>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;
        users::table
            .filter(users::username.eq(username))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(classify_diesel_error(err)))
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let row = NewUserRow {
            username: &user.username,
            password: &user.password_hash,
            email: &user.email,
            nickname: &user.nickname,
            image: user.image.as_deref(),
            role: user.role.as_str(),
            provider: user.provider.map(Provider::as_persisted),
            provider_id: user.provider_id.as_deref(),
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_insert_error)?;
        row_to_user(inserted)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.get()))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_failure(classify_diesel_error(err)))?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        let row = self.find_row_by_username(username).await?;
        row.map(row_to_user).transpose()
    }

    async fn find_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, UserPersistenceError> {
        let row = self.find_row_by_username(username).await?;
        row.map(|row| {
            let password = row.password.clone();
            row_to_user(row).map(|user| (user, password))
        })
        .transpose()
    }

    async fn soft_delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_failure(classify_pool_error(err)))?;

        let updated = diesel::update(
            users::table
                .filter(users::id.eq(id.get()))
                .filter(users::is_deleted.eq(false)),
        )
        .set(users::is_deleted.eq(true))
        .execute(&mut conn)
        .await
        .map_err(|err| map_failure(classify_diesel_error(err)))?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn row(role: &str, provider: Option<&str>) -> UserRow {
        UserRow {
            id: 3,
            username: "google_1".to_owned(),
            password: "!social-login!".to_owned(),
            email: "x@y.z".to_owned(),
            nickname: "Social_User_abc123".to_owned(),
            image: None,
            role: role.to_owned(),
            provider: provider.map(str::to_owned),
            provider_id: provider.map(|_| "1".to_owned()),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    #[case("ADMIN", Role::Admin)]
    #[case("USER", Role::User)]
    #[case("banana", Role::User)]
    fn role_parsing_defaults_to_user(#[case] raw: &str, #[case] expected: Role) {
        let user = row_to_user(row(raw, None)).expect("conversion succeeds");
        assert_eq!(user.role, expected);
    }

    #[rstest]
    #[case(Some("GOOGLE"), Some(Provider::Google))]
    #[case(Some("myspace"), None)]
    #[case(None, None)]
    fn provider_parsing_drops_unknown_values(
        #[case] raw: Option<&str>,
        #[case] expected: Option<Provider>,
    ) {
        let user = row_to_user(row("USER", raw)).expect("conversion succeeds");
        assert_eq!(user.provider, expected);
    }

    #[test]
    fn corrupt_id_is_a_query_error() {
        let mut bad = row("USER", None);
        bad.id = 0;
        let err = row_to_user(bad).expect_err("non-positive id must fail");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
