use axum::http::StatusCode;
use tracing::error;

use crate::accounts::AccountError;

pub type Rejection = (StatusCode, String);

/// Map an account error onto the `(status, message)` pair handlers return.
pub fn reject(e: AccountError) -> Rejection {
    let status = match &e {
        AccountError::Validation(_) => StatusCode::BAD_REQUEST,
        AccountError::UniquenessViolation { .. } => StatusCode::CONFLICT,
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::Hashing(_) | AccountError::Storage(_) => {
            error!(error = %e, "account operation failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}
