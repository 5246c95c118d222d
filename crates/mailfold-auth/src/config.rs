//! Authentication configuration.

/// Configuration for token issuance and verification.
///
/// The master secret is process-wide and immutable; per-client
/// signing keys are derived from it, never stored.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Master signing secret. Never logged, never serialized.
    pub master_secret: String,
    /// JWT issuer (`iss` claim).
    pub issuer: String,
    /// Default bearer token lifetime in days (default: 365).
    pub token_lifetime_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            master_secret: String::new(),
            issuer: "mailfold".into(),
            token_lifetime_days: 365,
        }
    }
}
