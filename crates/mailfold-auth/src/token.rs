//! Bearer token claims, signing, and the two decode phases.
//!
//! Decoding is deliberately split in two: [`peek_api_key`] reads the
//! claim set *without* signature validation, because the signing key
//! itself depends on which client the token claims to belong to. The
//! unverified subject is only ever used as a registry lookup key;
//! [`verify_client_token`] is the sole authorization decision.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mailfold_core::models::app_client::AppClient;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// JWT claims embedded in every client bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientClaims {
    /// Public client identifier — the verification lookup key.
    pub api_key: String,
    /// Client record ID (UUID string).
    pub client_id: String,
    pub client_name: String,
    /// The client's subscriber partition.
    pub collection_name: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Issuer.
    pub iss: String,
    /// Subject — equals `api_key`.
    pub sub: String,
}

/// Build a fresh claim set for a client, expiring after its
/// configured token lifetime.
pub fn build_claims(client: &AppClient, issuer: &str) -> ClientClaims {
    let now = Utc::now();
    let exp = now + Duration::days(i64::from(client.token_lifetime_days));
    ClientClaims {
        api_key: client.public_key.clone(),
        client_id: client.id.to_string(),
        client_name: client.name.clone(),
        collection_name: client.collection_name.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
        iss: issuer.to_string(),
        sub: client.public_key.clone(),
    }
}

/// Sign a claim set with the client's derived key (HS256).
pub fn sign_claims(claims: &ClientClaims, signing_key: &str) -> Result<String, AuthError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(signing_key.as_bytes());
    jsonwebtoken::encode(&header, claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

#[derive(Debug, Deserialize)]
struct UnverifiedClaims {
    api_key: Option<String>,
}

/// Extract `api_key` from a token without verifying its signature.
///
/// The returned value is untrusted — it identifies which client's
/// salt to fetch, nothing more.
pub fn peek_api_key(token: &str) -> Result<String, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims = Default::default();

    let data =
        jsonwebtoken::decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| AuthError::TokenInvalid(e.to_string()))?;

    data.claims
        .api_key
        .ok_or_else(|| AuthError::TokenInvalid("missing API key".into()))
}

/// Verify a token against the client's derived key: signature,
/// expiry (no leeway), issuer, and required claims.
pub fn verify_client_token(
    token: &str,
    signing_key: &str,
    issuer: &str,
) -> Result<ClientClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
    validation.leeway = 0;

    let key = DecodingKey::from_secret(signing_key.as_bytes());
    jsonwebtoken::decode::<ClientClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_signing_key;
    use uuid::Uuid;

    fn test_client(name: &str, public_key: &str) -> AppClient {
        AppClient {
            id: Uuid::new_v4(),
            name: name.into(),
            website: format!("{name}.example"),
            email: format!("owner@{name}.example"),
            public_key: public_key.into(),
            client_salt: format!("{name}-salt"),
            collection_name: format!("{name}_subs"),
            is_active: true,
            token_lifetime_days: 365,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let client = test_client("acme", "ak_test_acme");
        let key = derive_signing_key("master", &client.client_salt);

        let claims = build_claims(&client, "mailfold-test");
        let token = sign_claims(&claims, &key).unwrap();
        let verified = verify_client_token(&token, &key, "mailfold-test").unwrap();

        assert_eq!(verified.api_key, "ak_test_acme");
        assert_eq!(verified.sub, "ak_test_acme");
        assert_eq!(verified.collection_name, "acme_subs");
        assert_eq!(verified.iss, "mailfold-test");
        assert!(verified.exp > verified.iat);
    }

    #[test]
    fn peek_reads_api_key_without_the_signing_key() {
        let client = test_client("acme", "ak_peek_me");
        let key = derive_signing_key("master", &client.client_salt);
        let token = sign_claims(&build_claims(&client, "mailfold-test"), &key).unwrap();

        assert_eq!(peek_api_key(&token).unwrap(), "ak_peek_me");
    }

    #[test]
    fn peek_rejects_garbage() {
        let err = peek_api_key("not-a-token").unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn tampered_signature_is_invalid_signature() {
        let client = test_client("acme", "ak_tamper");
        let key = derive_signing_key("master", &client.client_salt);
        let token = sign_claims(&build_claims(&client, "mailfold-test"), &key).unwrap();

        // Flip one character in the signature segment.
        let (head, sig) = token.rsplit_once('.').unwrap();
        let flipped = if sig.as_bytes()[0] == b'A' { "B" } else { "A" };
        let tampered = format!("{head}.{flipped}{}", &sig[1..]);

        let err = verify_client_token(&tampered, &key, "mailfold-test").unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn wrong_key_is_invalid_signature() {
        let client = test_client("acme", "ak_wrong_key");
        let key = derive_signing_key("master", &client.client_salt);
        let other = derive_signing_key("master", "someone-elses-salt");
        let token = sign_claims(&build_claims(&client, "mailfold-test"), &key).unwrap();

        let err = verify_client_token(&token, &other, "mailfold-test").unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn expired_token_is_token_expired() {
        let client = test_client("acme", "ak_expired");
        let key = derive_signing_key("master", &client.client_salt);

        let mut claims = build_claims(&client, "mailfold-test");
        claims.iat = Utc::now().timestamp() - 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = sign_claims(&claims, &key).unwrap();

        let err = verify_client_token(&token, &key, "mailfold-test").unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn near_future_expiry_still_verifies() {
        let client = test_client("acme", "ak_near");
        let key = derive_signing_key("master", &client.client_salt);

        let mut claims = build_claims(&client, "mailfold-test");
        claims.exp = Utc::now().timestamp() + 5;
        let token = sign_claims(&claims, &key).unwrap();

        assert!(verify_client_token(&token, &key, "mailfold-test").is_ok());
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let client = test_client("acme", "ak_issuer");
        let key = derive_signing_key("master", &client.client_salt);
        let token = sign_claims(&build_claims(&client, "someone-else"), &key).unwrap();

        let err = verify_client_token(&token, &key, "mailfold-test").unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }
}
