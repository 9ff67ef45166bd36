use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::error;

/// Prefix marking a stored value that no plaintext will ever match.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';
const UNUSABLE_SUFFIX_LEN: usize = 40;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub fn is_usable(stored: &str) -> bool {
    !stored.is_empty() && !stored.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// A password value ready for storage: either an Argon2 PHC string or an
/// unusable marker. Plaintext never reaches this type.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn hash(plain: &str) -> anyhow::Result<Self> {
        hash_password(plain).map(Self)
    }

    pub fn unusable() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(UNUSABLE_SUFFIX_LEN)
            .map(char::from)
            .collect();
        Self(format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}"))
    }

    /// `None` produces an unusable digest, the way an account created
    /// without a password cannot log in until one is set.
    pub fn from_optional(plain: Option<&str>) -> anyhow::Result<Self> {
        match plain {
            Some(p) => Self::hash(p),
            None => Ok(Self::unusable()),
        }
    }

    pub fn is_usable(&self) -> bool {
        is_usable(&self.0)
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}
