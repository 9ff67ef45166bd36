use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::{AccountError, AccountResult, ExtraFields, User};

/// `?q=` on the list view.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

impl SearchParams {
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// One row of the list view.
#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl From<User> for UserRow {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            is_staff: u.is_staff,
            is_active: u.is_active,
            is_superuser: u.is_superuser,
        }
    }
}

/// Detail view, grouped the way the edit form is laid out.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub id: Uuid,
    #[serde(rename = "Personal Info")]
    pub personal_info: PersonalInfo,
    #[serde(rename = "Permissions")]
    pub permissions: Permissions,
    #[serde(rename = "Important dates")]
    pub important_dates: ImportantDates,
}

#[derive(Debug, Serialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    /// Algorithm summary only, never the hash.
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Permissions {
    pub is_staff: bool,
    pub is_active: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportantDates {
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub date_joined: OffsetDateTime,
}

impl From<User> for UserDetail {
    fn from(u: User) -> Self {
        let password = u.password_summary();
        Self {
            id: u.id,
            personal_info: PersonalInfo {
                full_name: u.full_name,
                email: u.email,
                password,
            },
            permissions: Permissions {
                is_staff: u.is_staff,
                is_active: u.is_active,
                is_superuser: u.is_superuser,
            },
            important_dates: ImportantDates {
                last_login: u.last_login,
                date_joined: u.date_joined,
            },
        }
    }
}

fn matching_password(password: &str, password_2: &str) -> AccountResult<()> {
    if password.is_empty() {
        return Err(AccountError::Validation("Password Required".into()));
    }
    if password != password_2 {
        return Err(AccountError::Validation("Passwords don't match".into()));
    }
    Ok(())
}

/// Admin "add user" form. The password is entered twice.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserCreationForm {
    pub full_name: Option<String>,
    pub email: String,
    pub password: String,
    pub password_2: String,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

impl UserCreationForm {
    pub fn validate(&self) -> AccountResult<()> {
        matching_password(&self.password, &self.password_2)
    }

    pub fn extra_fields(&self) -> ExtraFields {
        ExtraFields {
            full_name: self.full_name.clone(),
            is_staff: self.is_staff,
            is_active: self.is_active,
            ..Default::default()
        }
    }
}

/// Admin "change password" form.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordChangeForm {
    pub password: String,
    pub password_2: String,
}

impl PasswordChangeForm {
    pub fn validate(&self) -> AccountResult<()> {
        matching_password(&self.password, &self.password_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_lists_everything() {
        assert_eq!(SearchParams { q: Some("  ".into()) }.term(), None);
        assert_eq!(SearchParams { q: Some(" ann ".into()) }.term(), Some("ann"));
        assert_eq!(SearchParams::default().term(), None);
    }

    #[test]
    fn creation_form_requires_matching_passwords() {
        let form: UserCreationForm = serde_json::from_str(
            r#"{"email": "a@x.com", "password": "one", "password_2": "two"}"#,
        )
        .unwrap();
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Passwords don't match");

        let form: UserCreationForm = serde_json::from_str(
            r#"{"email": "a@x.com", "password": "", "password_2": ""}"#,
        )
        .unwrap();
        assert_eq!(form.validate().unwrap_err().to_string(), "Password Required");
    }

    #[test]
    fn creation_form_rejects_privilege_escalation_fields() {
        let res = serde_json::from_str::<UserCreationForm>(
            r#"{"email": "a@x.com", "password": "p", "password_2": "p", "is_superuser": true}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn creation_form_maps_to_extra_fields() {
        let form: UserCreationForm = serde_json::from_str(
            r#"{"full_name": "Ann", "email": "a@x.com", "password": "p",
                "password_2": "p", "is_staff": true}"#,
        )
        .unwrap();
        let extra = form.extra_fields();
        assert_eq!(extra.full_name.as_deref(), Some("Ann"));
        assert_eq!(extra.is_staff, Some(true));
        assert_eq!(extra.is_active, None);
        assert_eq!(extra.is_superuser, None);
    }
}
