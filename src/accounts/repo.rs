use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use super::{
    error::{map_unique_violation, AccountError, AccountResult},
    password::PasswordDigest,
    repo_types::{NewUser, User, UserChanges},
};

/// Storage port for user records. Implementations enforce case-insensitive
/// email uniqueness and report it as [`AccountError::UniquenessViolation`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, new: NewUser) -> AccountResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AccountResult<Option<User>>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>>;

    /// Records whose email or full name contains `term` (ignoring case),
    /// ordered by email. `None` lists everything.
    async fn search(&self, term: Option<&str>) -> AccountResult<Vec<User>>;

    async fn update(&self, id: Uuid, changes: UserChanges) -> AccountResult<User>;

    async fn set_password(&self, id: Uuid, digest: &PasswordDigest) -> AccountResult<()>;

    async fn set_otp(&self, id: Uuid, otp: Option<i32>) -> AccountResult<()>;

    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> AccountResult<()>;

    async fn delete(&self, id: Uuid) -> AccountResult<()>;
}

const USER_COLUMNS: &str = "id, email, full_name, otp, password_hash, is_active, is_staff, \
                            is_superuser, is_guest, date_joined, last_login";

/// PostgreSQL-backed [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn expect_one(rows_affected: u64) -> AccountResult<()> {
    if rows_affected == 0 {
        return Err(AccountError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self, new), fields(email = %new.email()))]
    async fn insert(&self, new: NewUser) -> AccountResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, is_active, is_staff,
                               is_superuser, is_guest, date_joined)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.email)
            .bind(&new.full_name)
            .bind(new.password.as_str())
            .bind(new.is_active)
            .bind(new.is_staff)
            .bind(new.is_superuser)
            .bind(new.is_guest)
            .bind(new.date_joined)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &new.email))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> AccountResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn search(&self, term: Option<&str>) -> AccountResult<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE $1::text IS NULL OR email ILIKE $1 OR full_name ILIKE $1
            ORDER BY email
            "#
        );
        let pattern = term.map(like_pattern);
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: UserChanges) -> AccountResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                is_active = COALESCE($4, is_active),
                is_staff = COALESCE($5, is_staff),
                is_superuser = COALESCE($6, is_superuser),
                is_guest = COALESCE($7, is_guest),
                date_joined = COALESCE($8, date_joined),
                last_login = COALESCE($9, last_login)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let email = changes.email.clone().unwrap_or_default();
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.full_name)
            .bind(changes.is_active)
            .bind(changes.is_staff)
            .bind(changes.is_superuser)
            .bind(changes.is_guest)
            .bind(changes.date_joined)
            .bind(changes.last_login)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, &email))?
            .ok_or(AccountError::NotFound)
    }

    #[instrument(skip(self, digest))]
    async fn set_password(&self, id: Uuid, digest: &PasswordDigest) -> AccountResult<()> {
        let done = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(digest.as_str())
            .execute(&self.pool)
            .await?;
        expect_one(done.rows_affected())
    }

    #[instrument(skip(self, otp))]
    async fn set_otp(&self, id: Uuid, otp: Option<i32>) -> AccountResult<()> {
        let done = sqlx::query("UPDATE users SET otp = $2 WHERE id = $1")
            .bind(id)
            .bind(otp)
            .execute(&self.pool)
            .await?;
        expect_one(done.rows_affected())
    }

    #[instrument(skip(self))]
    async fn touch_last_login(&self, id: Uuid, at: OffsetDateTime) -> AccountResult<()> {
        let done = sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        expect_one(done.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> AccountResult<()> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_one(done.rows_affected())
    }
}
