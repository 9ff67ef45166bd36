use tracing::{info, instrument};

use crate::{
    accounts::{AccountFactory, AccountResult, ExtraFields, UserStore},
    config::SuperuserConfig,
};

/// Creates the configured superuser unless an account with that email
/// already exists. Returns whether a record was created.
#[instrument(skip(store, cfg), fields(email = %cfg.email))]
pub async fn ensure_superuser(store: &dyn UserStore, cfg: &SuperuserConfig) -> AccountResult<bool> {
    if store.find_by_email(&cfg.email).await?.is_some() {
        info!("superuser already present");
        return Ok(false);
    }
    AccountFactory::new(store)
        .create_superuser(&cfg.email, Some(&cfg.password), ExtraFields::default())
        .await?;
    Ok(true)
}
