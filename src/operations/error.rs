//! Failure taxonomy shared by every named operation.

use std::error::Error as StdError;

use diesel_async::pooled_connection::bb8::RunError;

/// Store-level failure behind [`OperationError::Unavailable`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A query or insert was rejected by the database.
    #[error(transparent)]
    Query(#[from] diesel::result::Error),
    /// No pooled connection could be checked out.
    #[error(transparent)]
    Pool(#[from] RunError),
}

/// Outcome of a failed operation, mapped to REST payloads and GraphQL errors
/// at the router.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// The addressed document does not exist.
    #[error("{0}")]
    NotFound(String),
    /// An identifier did not parse as a store id.
    #[error("Invalid ID format")]
    InvalidId,
    /// A field failed validation.
    #[error("{0}")]
    InvalidInput(String),
    /// The write would duplicate an existing document.
    #[error("{0}")]
    Conflict(String),
    /// The store could not be reached or rejected the statement.
    #[error("query failed")]
    Unavailable(#[source] StoreError),
    /// A third-party service failed.
    #[error("upstream service failed")]
    Upstream(#[source] Box<dyn StdError + Send + Sync>),
}

impl OperationError {
    /// Machine-readable code reported in GraphQL error extensions.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidId | Self::InvalidInput(_) => "BAD_USER_INPUT",
            Self::Conflict(_) => "CONFLICT",
            Self::Unavailable(_) => "QUERY_FAILED",
            Self::Upstream(_) => "UPSTREAM_UNAVAILABLE",
        }
    }

    /// Whether the failure stems from the caller's input rather than the
    /// server or its dependencies.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidId | Self::InvalidInput(_) | Self::Conflict(_)
        )
    }
}

impl From<diesel::result::Error> for OperationError {
    fn from(err: diesel::result::Error) -> Self { Self::Unavailable(StoreError::Query(err)) }
}

impl From<RunError> for OperationError {
    fn from(err: RunError) -> Self { Self::Unavailable(StoreError::Pool(err)) }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(OperationError::NotFound("Record not found".into()), "NOT_FOUND", "Record not found")]
    #[case(OperationError::InvalidId, "BAD_USER_INPUT", "Invalid ID format")]
    #[case(
        OperationError::InvalidInput("Invalid password".into()),
        "BAD_USER_INPUT",
        "Invalid password"
    )]
    #[case(
        OperationError::Conflict("Email already exists".into()),
        "CONFLICT",
        "Email already exists"
    )]
    #[case(
        OperationError::from(diesel::result::Error::NotFound),
        "QUERY_FAILED",
        "query failed"
    )]
    fn codes_and_messages(
        #[case] err: OperationError,
        #[case] code: &str,
        #[case] message: &str,
    ) {
        assert_eq!(err.code(), code);
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    fn store_failures_are_not_client_errors() {
        assert!(!OperationError::from(diesel::result::Error::NotFound).is_client_error());
        assert!(OperationError::InvalidId.is_client_error());
    }
}
