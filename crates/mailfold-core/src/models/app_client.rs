//! App client domain model.
//!
//! An app client is a registered tenant of the API. Each one owns a
//! dedicated subscriber collection and an analytics namespace; all
//! authenticated requests are scoped to that partition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered app client (tenant).
///
/// `public_key` is the token subject and verification lookup key; it
/// is immutable after creation. `client_salt` is the per-client input
/// to signing-key derivation — it never leaves the registry boundary
/// and is excluded from serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppClient {
    pub id: Uuid,
    /// Human-readable name, unique across all clients.
    pub name: String,
    pub website: String,
    pub email: String,
    /// Public identifier (`ak_` prefix), used as the `sub` claim.
    pub public_key: String,
    /// Per-client signing salt. Never serialized in any response.
    #[serde(skip_serializing)]
    pub client_salt: String,
    /// Name of this client's subscriber partition.
    pub collection_name: String,
    /// Inactive clients fail token verification.
    pub is_active: bool,
    /// Bearer token lifetime in days.
    pub token_lifetime_days: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// External registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppClient {
    pub name: String,
    pub website: String,
    pub email: String,
    pub collection_name: String,
}

/// Fully-populated record handed to the registry for persistence.
///
/// The issuer generates `public_key` and `client_salt` before the
/// insert; the registry assigns `id` and timestamps.
#[derive(Debug, Clone)]
pub struct NewAppClient {
    pub name: String,
    pub website: String,
    pub email: String,
    pub collection_name: String,
    pub public_key: String,
    pub client_salt: String,
    pub token_lifetime_days: u32,
}

/// Fields that can be updated on an existing app client.
///
/// `public_key`, `client_salt`, and `collection_name` are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAppClient {
    pub name: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}
