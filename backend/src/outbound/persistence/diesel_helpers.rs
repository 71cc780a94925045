//! Shared classification of pool and Diesel failures.
//!
//! Each repository adapter maps [`DbFailure`] into its own port error so the
//! connection-versus-query distinction survives to the domain layer, where it
//! decides between `503` and `500` responses.

use tracing::debug;

use super::pool::PoolError;

/// Storage failure reduced to the two categories the domain cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The database could not be reached.
    Connection(String),
    /// The statement itself failed.
    Query(String),
}

pub(crate) fn classify_pool_error(error: PoolError) -> DbFailure {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            DbFailure::Connection(message)
        }
    }
}

pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> DbFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(_, _) => DbFailure::Query("database error".to_owned()),
        _ => DbFailure::Query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_classify_as_connection() {
        let failure = classify_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(
            failure,
            DbFailure::Connection("connection refused".to_owned())
        );
    }

    #[rstest]
    fn not_found_classifies_as_query() {
        let failure = classify_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(failure, DbFailure::Query("record not found".to_owned()));
    }
}
