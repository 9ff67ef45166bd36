//! In-process [`UserStore`] used by tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    error::{AccountError, AccountResult},
    password::PasswordDigest,
    repo::UserStore,
    repo_types::{NewUser, User, UserChanges},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn with_user<T>(&self, id: Uuid, f: impl FnOnce(&mut User) -> T) -> AccountResult<T> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AccountError::NotFound)?;
        Ok(f(user))
    }
}

/// Full Unicode lowercasing, matching the `lower(email)` unique index.
fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
    users
        .iter()
        .any(|u| Some(u.id) != except && same_email(&u.email, email))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new: NewUser) -> AccountResult<User> {
        let mut users = self.users.lock().unwrap();
        if email_taken(&users, new.email(), None) {
            return Err(AccountError::UniquenessViolation {
                email: new.email().to_string(),
            });
        }
        let user = User::from_new(Uuid::new_v4(), new);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AccountResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| same_email(&u.email, email))
            .cloned())
    }

    async fn search(&self, term: Option<&str>) -> AccountResult<Vec<User>> {
        let needle = term.map(str::to_lowercase);
        let users = self.users.lock().unwrap();
        let mut found: Vec<User> = users
            .iter()
            .filter(|u| match &needle {
                None => true,
                Some(n) => {
                    u.email.to_lowercase().contains(n) || u.full_name.to_lowercase().contains(n)
                }
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(found)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AccountResult<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(AccountError::UniquenessViolation {
                    email: email.clone(),
                });
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AccountError::NotFound)?;
        changes.apply(user);
        Ok(user.clone())
    }

    async fn set_password(&self, id: Uuid, digest: &PasswordDigest) -> AccountResult<()> {
        self.with_user(id, |u| u.replace_password(digest))
    }

    async fn set_otp(&self, id: Uuid, otp: Option<i32>) -> AccountResult<()> {
        self.with_user(id, |u| u.otp = otp)
    }

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> AccountResult<()> {
        self.with_user(id, |u| u.last_login = Some(at))
    }

    async fn delete(&self, id: Uuid) -> AccountResult<()> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AccountError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountFactory, ExtraFields};

    async fn seeded() -> (MemoryUserStore, Vec<Uuid>) {
        let store = MemoryUserStore::new();
        let mut ids = Vec::new();
        {
            let factory = AccountFactory::new(&store);
            for (email, name) in [
                ("zoe@x.com", "Zoe Quinn"),
                ("adam@y.org", "Adam West"),
                ("mia@x.com", "Mia Wallace"),
            ] {
                let extra = ExtraFields {
                    full_name: Some(name.into()),
                    ..Default::default()
                };
                ids.push(factory.create_user(email, None, extra).await.unwrap().id);
            }
        }
        (store, ids)
    }

    #[tokio::test]
    async fn search_matches_email_or_name_ordered_by_email() {
        let (store, _) = seeded().await;

        let all: Vec<_> = store.search(None).await.unwrap();
        let emails: Vec<_> = all.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["adam@y.org", "mia@x.com", "zoe@x.com"]);

        let hits = store.search(Some("X.COM")).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = store.search(Some("wall")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "mia@x.com");
    }

    #[tokio::test]
    async fn find_by_email_ignores_case() {
        let (store, ids) = seeded().await;
        let found = store.find_by_email("ZOE@X.COM").await.unwrap().unwrap();
        assert_eq!(found.id, ids[0]);
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn uniqueness_folds_non_ascii_case() {
        let store = MemoryUserStore::new();
        let factory = AccountFactory::new(&store);
        factory
            .create_user("É@x.com", None, ExtraFields::default())
            .await
            .unwrap();

        let err = factory
            .create_user("é@x.com", None, ExtraFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::UniquenessViolation { .. }));
        assert!(store.find_by_email("é@X.COM").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_rejects_taken_email() {
        let (store, ids) = seeded().await;
        let changes = UserChanges {
            email: Some("Mia@x.com".into()),
            ..Default::default()
        };
        let err = store.update(ids[0], changes).await.unwrap_err();
        assert!(matches!(err, AccountError::UniquenessViolation { .. }));

        let same_owner = UserChanges {
            email: Some("ZOE@x.com".into()),
            ..Default::default()
        };
        let updated = store.update(ids[0], same_owner).await.unwrap();
        assert_eq!(updated.email, "ZOE@x.com");
    }

    #[tokio::test]
    async fn slot_mutations_and_delete() {
        let (store, ids) = seeded().await;
        let now = OffsetDateTime::now_utc();

        store.set_otp(ids[1], Some(482913)).await.unwrap();
        store.touch_last_login(ids[1], now).await.unwrap();
        store
            .set_password(ids[1], &PasswordDigest::hash("fresh").unwrap())
            .await
            .unwrap();

        let user = store.find_by_id(ids[1]).await.unwrap().unwrap();
        assert_eq!(user.otp, Some(482913));
        assert_eq!(user.last_login, Some(now));
        assert!(user.check_password("fresh"));

        store.delete(ids[1]).await.unwrap();
        assert_eq!(store.count(), 2);
        assert!(matches!(
            store.delete(ids[1]).await,
            Err(AccountError::NotFound)
        ));
        assert!(matches!(
            store.set_otp(ids[1], None).await,
            Err(AccountError::NotFound)
        ));
    }
}
