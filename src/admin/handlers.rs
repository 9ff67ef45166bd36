use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{PasswordChangeForm, SearchParams, UserCreationForm, UserDetail, UserRow};
use crate::{
    accounts::{
        normalize_email, AccountError, AccountFactory, PasswordDigest, Permissioned, User,
        UserChanges,
    },
    auth::extractors::StaffUser,
    rejection::{reject, Rejection},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(add_user))
        .route(
            "/admin/users/:id",
            get(user_detail).patch(change_user).delete(delete_user),
        )
        .route("/admin/users/:id/password", post(change_password))
}

fn superuser_required() -> Rejection {
    (StatusCode::FORBIDDEN, "superuser access required".into())
}

/// Loads the account an admin action targets, refusing superuser accounts
/// to staff who are not superusers themselves.
async fn managed_target(state: &AppState, actor: &User, id: Uuid) -> Result<User, Rejection> {
    let target = state
        .users
        .find_by_id(id)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(AccountError::NotFound))?;

    if !actor.can_manage(&target) {
        warn!(staff_id = %actor.id, user_id = %id, "superuser account is out of reach");
        return Err(superuser_required());
    }
    Ok(target)
}

#[instrument(skip(state, _staff))]
pub async fn list_users(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<UserRow>>, Rejection> {
    let users = state.users.search(params.term()).await.map_err(reject)?;
    Ok(Json(users.into_iter().map(UserRow::from).collect()))
}

#[instrument(skip(state, _staff))]
pub async fn user_detail(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetail>, Rejection> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(AccountError::NotFound))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, staff, form), fields(staff_id = %staff.0.id))]
pub async fn add_user(
    State(state): State<AppState>,
    staff: StaffUser,
    Json(form): Json<UserCreationForm>,
) -> Result<(StatusCode, Json<UserDetail>), Rejection> {
    form.validate().map_err(reject)?;
    if form.is_staff == Some(true) && !staff.0.can_grant_privileges() {
        warn!(staff_id = %staff.0.id, "staff flag grant refused");
        return Err(superuser_required());
    }

    let user = AccountFactory::new(state.users.as_ref())
        .create_user(&form.email, Some(&form.password), form.extra_fields())
        .await
        .map_err(reject)?;

    info!(user_id = %user.id, "user added from admin");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, staff, changes), fields(staff_id = %staff.0.id))]
pub async fn change_user(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(mut changes): Json<UserChanges>,
) -> Result<Json<UserDetail>, Rejection> {
    let grants = changes.is_staff.is_some() || changes.is_superuser.is_some();
    if grants && !staff.0.can_grant_privileges() {
        warn!(staff_id = %staff.0.id, user_id = %id, "privilege change refused");
        return Err(superuser_required());
    }
    managed_target(&state, &staff.0, id).await?;

    if let Some(email) = changes.email.take() {
        let email = normalize_email(&email);
        if email.is_empty() {
            return Err(reject(AccountError::email_required()));
        }
        changes.email = Some(email);
    }

    let user = state.users.update(id, changes).await.map_err(reject)?;
    info!(user_id = %user.id, "user changed from admin");
    Ok(Json(user.into()))
}

#[instrument(skip(state, staff, form), fields(staff_id = %staff.0.id))]
pub async fn change_password(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(form): Json<PasswordChangeForm>,
) -> Result<StatusCode, Rejection> {
    form.validate().map_err(reject)?;
    managed_target(&state, &staff.0, id).await?;
    let digest = PasswordDigest::hash(&form.password)
        .map_err(|e| reject(AccountError::Hashing(e.to_string())))?;
    state.users.set_password(id, &digest).await.map_err(reject)?;
    info!(user_id = %id, "password changed from admin");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, staff), fields(staff_id = %staff.0.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Rejection> {
    managed_target(&state, &staff.0, id).await?;
    state.users.delete(id).await.map_err(reject)?;
    info!(user_id = %id, "user deleted from admin");
    Ok(StatusCode::NO_CONTENT)
}
