use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use super::{
    dto::{LoginRequest, PublicUser, RefreshRequest, TokenPair, UserListItem},
    extractors::{load_active_user, ActiveUser},
    jwt::JwtKeys,
    services::authenticate,
};
use crate::{
    rejection::{reject, Rejection},
    state::AppState,
};

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token/", post(obtain_token))
        .route("/token/refresh/", post(refresh_token))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/users/", get(list_users))
}

fn issue_pair(keys: &JwtKeys, user_id: Uuid) -> Result<(String, String), Rejection> {
    let access = keys.sign_access(user_id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    let refresh = keys.sign_refresh(user_id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok((access, refresh))
}

#[instrument(skip(state, payload))]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenPair>, Rejection> {
    let user = authenticate(state.users.as_ref(), &payload.email, &payload.password)
        .await
        .map_err(reject)?
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()))?;

    let keys = JwtKeys::from_ref(&state);
    let (access, refresh) = issue_pair(&keys, user.id)?;
    Ok(Json(TokenPair {
        access,
        refresh,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, Rejection> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await
        .map_err(reject)?
        .filter(|u| u.is_active)
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let (access, refresh) = issue_pair(&keys, user.id)?;
    Ok(Json(TokenPair {
        access,
        refresh,
        user: user.into(),
    }))
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(ActiveUser(user): ActiveUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    _user: ActiveUser,
) -> Result<Json<Vec<UserListItem>>, Rejection> {
    let users = state.users.search(None).await.map_err(reject)?;
    Ok(Json(users.into_iter().map(UserListItem::from).collect()))
}
