use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Credentials for the superuser created at startup when none exists.
#[derive(Clone, Deserialize)]
pub struct SuperuserConfig {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SuperuserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuperuserConfig")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub superuser: Option<SuperuserConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "navai".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "navai-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let superuser = match (
            std::env::var("SUPERUSER_EMAIL"),
            std::env::var("SUPERUSER_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(SuperuserConfig { email, password }),
            _ => None,
        };
        Ok(Self {
            database_url,
            jwt,
            superuser,
        })
    }
}
