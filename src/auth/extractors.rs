use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::{error, warn};
use uuid::Uuid;

use super::{claims::TokenKind, jwt::JwtKeys};
use crate::{
    accounts::{Permissioned, User},
    state::AppState,
};

/// Extracts and validates a bearer access token, returning the user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            (StatusCode::UNAUTHORIZED, "invalid or expired token".to_string())
        })?;

        if claims.kind != TokenKind::Access {
            return Err((StatusCode::UNAUTHORIZED, "access token required".into()));
        }

        Ok(AuthUser(claims.sub))
    }
}

/// Loads the token's user and rejects accounts that were deactivated
/// after the token was issued.
pub async fn load_active_user(state: &AppState, user_id: Uuid) -> Result<User, (StatusCode, String)> {
    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "user lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    if !user.is_active() {
        warn!(user_id = %user_id, "inactive account presented a token");
        return Err((StatusCode::UNAUTHORIZED, "account is inactive".into()));
    }
    Ok(user)
}

/// An authenticated user whose account is still active.
pub struct ActiveUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        load_active_user(state, user_id).await.map(ActiveUser)
    }
}

/// An authenticated user that is active and has staff access.
pub struct StaffUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_id) = AuthUser::from_request_parts(parts, state).await?;
        let user = load_active_user(state, user_id).await?;

        if !user.has_admin_access() {
            warn!(user_id = %user_id, "admin access denied");
            return Err((StatusCode::FORBIDDEN, "staff access required".into()));
        }

        Ok(StaffUser(user))
    }
}
