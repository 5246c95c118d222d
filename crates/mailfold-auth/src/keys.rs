//! Per-client signing-key derivation and credential generation.
//!
//! A single master secret plus a per-client salt yields a unique
//! HMAC signing key per client: `SHA-256("{master}:{salt}")`,
//! hex-encoded. The hash is one-way, so a leaked derived key exposes
//! neither the master secret nor any other client's key.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Prefix distinguishing public API keys from other opaque strings.
pub const PUBLIC_KEY_PREFIX: &str = "ak_";

/// Derive the per-client HMAC signing key.
///
/// Deterministic: the same (secret, salt) pair always yields the
/// same key, which is what lets verification re-derive it from the
/// registry instead of storing it.
pub fn derive_signing_key(master_secret: &str, client_salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{master_secret}:{client_salt}").as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a public client identifier: `ak_` + 32 random bytes,
/// base64url-encoded without padding (CSPRNG).
pub fn generate_public_key() -> String {
    format!("{PUBLIC_KEY_PREFIX}{}", random_urlsafe())
}

/// Generate a per-client signing salt (32 random bytes,
/// base64url-encoded without padding).
pub fn generate_client_salt() -> String {
    random_urlsafe()
}

fn random_urlsafe() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}
