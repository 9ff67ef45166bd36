//! Errors raised while creating or mutating user records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    /// A required field was missing or malformed. Raised before any write.
    #[error("{0}")]
    Validation(String),

    #[error("a user with email {email} already exists")]
    UniquenessViolation { email: String },

    #[error("user not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Any other storage failure, passed through untouched.
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub type AccountResult<T> = Result<T, AccountError>;

impl AccountError {
    pub fn email_required() -> Self {
        Self::Validation("Email Required".into())
    }
}

/// Translate a driver error, turning unique-index hits into
/// [`AccountError::UniquenessViolation`].
pub fn map_unique_violation(e: sqlx::Error, email: &str) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AccountError::UniquenessViolation {
                email: email.to_string(),
            };
        }
    }
    AccountError::Storage(e)
}
