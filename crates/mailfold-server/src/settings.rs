//! Environment-driven server settings.

use mailfold_auth::AuthConfig;
use mailfold_core::MailfoldError;
use mailfold_db::DbConfig;

/// Runtime settings resolved from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthConfig,
    pub db: DbConfig,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// `MAILFOLD_MASTER_SECRET` is required and has no default; the
    /// server refuses to start without it. Everything else falls back
    /// to local-development defaults.
    pub fn from_env() -> Result<Self, MailfoldError> {
        let master_secret =
            std::env::var("MAILFOLD_MASTER_SECRET").map_err(|_| MailfoldError::Validation {
                message: "MAILFOLD_MASTER_SECRET must be set".into(),
            })?;
        if master_secret.is_empty() {
            return Err(MailfoldError::Validation {
                message: "MAILFOLD_MASTER_SECRET must not be empty".into(),
            });
        }

        let token_lifetime_days = match std::env::var("MAILFOLD_TOKEN_LIFETIME_DAYS") {
            Ok(raw) => raw.parse().map_err(|_| MailfoldError::Validation {
                message: format!("MAILFOLD_TOKEN_LIFETIME_DAYS is not a valid day count: {raw}"),
            })?,
            Err(_) => AuthConfig::default().token_lifetime_days,
        };

        let auth = AuthConfig {
            master_secret,
            issuer: env_or("MAILFOLD_ISSUER", &AuthConfig::default().issuer),
            token_lifetime_days,
        };

        let defaults = DbConfig::default();
        let db = DbConfig {
            url: env_or("MAILFOLD_DB_URL", &defaults.url),
            namespace: env_or("MAILFOLD_DB_NAMESPACE", &defaults.namespace),
            database: env_or("MAILFOLD_DB_NAME", &defaults.database),
            username: env_or("MAILFOLD_DB_USER", &defaults.username),
            password: env_or("MAILFOLD_DB_PASSWORD", &defaults.password),
        };

        Ok(Self { auth, db })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
