use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::User;

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Response returned after login or refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub short_name: String,
    pub full_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_guest: bool,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            short_name: u.short_name().to_string(),
            email: u.email,
            full_name: u.full_name,
            is_staff: u.is_staff,
            is_superuser: u.is_superuser,
            is_guest: u.is_guest,
        }
    }
}

/// Entry of the user directory listing.
#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

impl From<User> for UserListItem {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
        }
    }
}
