//! User records, their storage port, and the factory that creates them.

pub mod capabilities;
pub mod error;
pub mod factory;
#[cfg(test)]
pub(crate) mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use capabilities::{Authenticatable, Permissioned};
pub use error::{AccountError, AccountResult};
pub use factory::{normalize_email, AccountFactory, ExtraFields};
pub use password::PasswordDigest;
pub use repo::{PgUserStore, UserStore};
pub use repo_types::{User, UserChanges};
