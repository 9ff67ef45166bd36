use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    error::{AccountError, AccountResult},
    password::PasswordDigest,
    repo::UserStore,
    repo_types::{NewUser, User},
};

/// Optional attributes accepted at creation time.
///
/// | field          | default when `None`                      |
/// |----------------|------------------------------------------|
/// | `full_name`    | `""`                                     |
/// | `is_active`    | `true`                                   |
/// | `is_guest`     | `false`                                  |
/// | `is_staff`     | `false` (`true` on the superuser path)   |
/// | `is_superuser` | `false` (`true` on the superuser path)   |
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraFields {
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_guest: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
struct PrivilegeDefaults {
    is_staff: bool,
    is_superuser: bool,
}

const REGULAR: PrivilegeDefaults = PrivilegeDefaults {
    is_staff: false,
    is_superuser: false,
};

const ELEVATED: PrivilegeDefaults = PrivilegeDefaults {
    is_staff: true,
    is_superuser: true,
};

/// Trims the address and lowercases the domain part (after the last `@`).
/// The local part keeps its case. Input without `@` is only trimmed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// The only sanctioned way to create [`User`] records.
pub struct AccountFactory<'a> {
    store: &'a dyn UserStore,
}

impl<'a> AccountFactory<'a> {
    pub fn new(store: &'a dyn UserStore) -> Self {
        Self { store }
    }

    /// Standard account: staff and superuser flags default to false.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        extra: ExtraFields,
    ) -> AccountResult<User> {
        self.create(email, password, extra, REGULAR).await
    }

    /// Elevated account: staff and superuser flags default to true.
    /// Values passed explicitly in `extra` still win.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        extra: ExtraFields,
    ) -> AccountResult<User> {
        if extra.is_staff == Some(false) || extra.is_superuser == Some(false) {
            warn!(
                is_staff = ?extra.is_staff,
                is_superuser = ?extra.is_superuser,
                "superuser created with privilege flags overridden"
            );
        }
        self.create(email, password, extra, ELEVATED).await
    }

    #[instrument(skip(self, password, extra))]
    async fn create(
        &self,
        email: &str,
        password: Option<&str>,
        extra: ExtraFields,
        defaults: PrivilegeDefaults,
    ) -> AccountResult<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            warn!("user creation rejected: empty email");
            return Err(AccountError::email_required());
        }

        let password = PasswordDigest::from_optional(password)
            .map_err(|e| AccountError::Hashing(e.to_string()))?;
        let has_password = password.is_usable();

        let new = NewUser {
            email,
            full_name: extra.full_name.unwrap_or_default(),
            password,
            is_active: extra.is_active.unwrap_or(true),
            is_staff: extra.is_staff.unwrap_or(defaults.is_staff),
            is_superuser: extra.is_superuser.unwrap_or(defaults.is_superuser),
            is_guest: extra.is_guest.unwrap_or(false),
            date_joined: OffsetDateTime::now_utc(),
        };

        let user = self.store.insert(new).await?;
        info!(
            user_id = %user.id,
            email = %user.email,
            is_staff = user.is_staff,
            is_superuser = user.is_superuser,
            has_password,
            "user created"
        );
        Ok(user)
    }
}
