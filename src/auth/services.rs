use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::accounts::{
    normalize_email, password, AccountResult, Authenticatable, Permissioned, User, UserStore,
};

/// Email/password check. Returns `None` for unknown emails, wrong or
/// unusable passwords and inactive accounts; on success `last_login` is
/// stamped.
#[instrument(skip(store, plain))]
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    plain: &str,
) -> AccountResult<Option<User>> {
    let email = normalize_email(email);
    let Some(mut user) = store.find_by_email(&email).await? else {
        // Hash anyway so unknown emails cost the same as wrong passwords.
        let _ = password::hash_password(plain);
        warn!(email = %email, "login unknown email");
        return Ok(None);
    };

    if !user.check_password(plain) {
        warn!(user_id = %user.id, "login invalid password");
        return Ok(None);
    }

    if !user.is_active() {
        warn!(user_id = %user.id, "login inactive account");
        return Ok(None);
    }

    let now = OffsetDateTime::now_utc();
    store.touch_last_login(user.id, now).await?;
    user.last_login = Some(now);
    info!(user_id = %user.id, email = %user.login_email(), "user logged in");
    Ok(Some(user))
}
