use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::password::{self, PasswordDigest};

/// User record in the database.
///
/// The password hash is private: records come out of a [`UserStore`]
/// and are created through the [`AccountFactory`], never by struct literal.
///
/// [`UserStore`]: super::repo::UserStore
/// [`AccountFactory`]: super::factory::AccountFactory
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub otp: Option<i32>,
    #[serde(skip_serializing)]
    password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_guest: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

impl User {
    /// Local part of the email, used where a short display name is needed.
    pub fn short_name(&self) -> &str {
        self.email.split('@').next().unwrap_or_default()
    }

    pub fn has_usable_password(&self) -> bool {
        password::is_usable(&self.password_hash)
    }

    /// Re-hash-and-compare against the stored digest. Unusable or
    /// malformed digests never match.
    pub fn check_password(&self, plain: &str) -> bool {
        if !self.has_usable_password() {
            return false;
        }
        password::verify_password(plain, &self.password_hash).unwrap_or(false)
    }

    /// Summary of the stored digest for display, e.g. `argon2id`; the hash
    /// itself is never shown.
    pub fn password_summary(&self) -> String {
        if !self.has_usable_password() {
            return "No password set.".to_string();
        }
        let algorithm = self
            .password_hash
            .trim_start_matches('$')
            .split('$')
            .next()
            .unwrap_or("unknown");
        format!("algorithm: {algorithm}")
    }

    #[cfg(test)]
    pub(super) fn from_new(id: Uuid, new: NewUser) -> Self {
        Self {
            id,
            email: new.email,
            full_name: new.full_name,
            otp: None,
            password_hash: new.password.into_inner(),
            is_active: new.is_active,
            is_staff: new.is_staff,
            is_superuser: new.is_superuser,
            is_guest: new.is_guest,
            date_joined: new.date_joined,
            last_login: None,
        }
    }

    #[cfg(test)]
    pub(super) fn replace_password(&mut self, digest: &PasswordDigest) {
        self.password_hash = digest.as_str().to_string();
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("otp", &self.otp)
            .field("password_hash", &"..")
            .field("is_active", &self.is_active)
            .field("is_staff", &self.is_staff)
            .field("is_superuser", &self.is_superuser)
            .field("is_guest", &self.is_guest)
            .field("date_joined", &self.date_joined)
            .field("last_login", &self.last_login)
            .finish()
    }
}

/// A validated, hashed record waiting to be inserted. Only the account
/// factory builds these.
#[derive(Debug)]
pub struct NewUser {
    pub(super) email: String,
    pub(super) full_name: String,
    pub(super) password: PasswordDigest,
    pub(super) is_active: bool,
    pub(super) is_staff: bool,
    pub(super) is_superuser: bool,
    pub(super) is_guest: bool,
    pub(super) date_joined: OffsetDateTime,
}

impl NewUser {
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Partial update applied by admin edits. `None` leaves a column as is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_guest: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_joined: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

impl UserChanges {
    #[cfg(test)]
    pub(super) fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(v) = self.is_active {
            user.is_active = v;
        }
        if let Some(v) = self.is_staff {
            user.is_staff = v;
        }
        if let Some(v) = self.is_superuser {
            user.is_superuser = v;
        }
        if let Some(v) = self.is_guest {
            user.is_guest = v;
        }
        if let Some(v) = self.date_joined {
            user.date_joined = v;
        }
        if let Some(v) = self.last_login {
            user.last_login = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(password: Option<&str>) -> User {
        let new = NewUser {
            email: "jane.doe@example.com".into(),
            full_name: String::new(),
            password: PasswordDigest::from_optional(password).unwrap(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            is_guest: false,
            date_joined: OffsetDateTime::now_utc(),
        };
        User::from_new(Uuid::new_v4(), new)
    }

    #[test]
    fn short_name_is_local_part() {
        assert_eq!(sample(None).short_name(), "jane.doe");
    }

    #[test]
    fn serialization_skips_password_hash() {
        let json = serde_json::to_value(sample(Some("secret"))).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "jane.doe@example.com");
        assert!(json["last_login"].is_null());
    }

    #[test]
    fn debug_redacts_password_hash() {
        let user = sample(Some("secret"));
        let out = format!("{user:?}");
        assert!(!out.contains("$argon2"));
        assert!(out.contains(r#"password_hash: "..""#));
        assert!(out.contains("jane.doe@example.com"));
    }

    #[test]
    fn unusable_password_never_matches() {
        let user = sample(None);
        assert!(!user.has_usable_password());
        assert!(!user.check_password(""));
        assert_eq!(user.password_summary(), "No password set.");
    }

    #[test]
    fn password_summary_names_algorithm() {
        let user = sample(Some("secret"));
        assert_eq!(user.password_summary(), "algorithm: argon2id");
    }

    #[test]
    fn changes_reject_unknown_fields() {
        let err = serde_json::from_str::<UserChanges>(r#"{"is_root": true}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn changes_leave_unset_columns() {
        let mut user = sample(None);
        UserChanges {
            is_staff: Some(true),
            ..Default::default()
        }
        .apply(&mut user);
        assert!(user.is_staff);
        assert!(user.is_active);
        assert_eq!(user.email, "jane.doe@example.com");
    }
}
