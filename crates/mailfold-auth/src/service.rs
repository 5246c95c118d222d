//! Client service — registration, token refresh, verification, and
//! guarded registry operations.

use chrono::{DateTime, TimeZone, Utc};
use mailfold_core::error::{MailfoldError, MailfoldResult};
use mailfold_core::models::app_client::{
    AppClient, CreateAppClient, NewAppClient, UpdateAppClient,
};
use mailfold_core::repository::{AppClientRepository, PaginatedResult, Pagination};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::ClientIdentity;
use crate::keys;
use crate::token;

const TOKEN_TYPE: &str = "Bearer";

/// Successful registration result.
///
/// The bearer token is returned exactly once; the salt it was signed
/// against never appears here or anywhere else.
#[derive(Debug)]
pub struct RegisteredClient {
    pub client_id: Uuid,
    pub name: String,
    pub public_key: String,
    pub access_token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Successful refresh result.
#[derive(Debug)]
pub struct RefreshedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Client service.
///
/// Generic over the registry implementation so this crate has no
/// dependency on the database crate.
pub struct ClientService<R: AppClientRepository> {
    registry: R,
    config: AuthConfig,
}

impl<R: AppClientRepository> ClientService<R> {
    pub fn new(registry: R, config: AuthConfig) -> Self {
        Self { registry, config }
    }

    /// Register a new app client and issue its first bearer token.
    pub async fn register(&self, input: CreateAppClient) -> MailfoldResult<RegisteredClient> {
        // Fast-path duplicate check; the registry's unique index
        // backs it up under concurrent registration.
        if self.registry.name_exists(&input.name).await? {
            return Err(MailfoldError::AlreadyExists {
                entity: "app_client".into(),
                key: format!("name={}", input.name),
            });
        }

        let client = self
            .registry
            .create(NewAppClient {
                name: input.name,
                website: input.website,
                email: input.email,
                collection_name: input.collection_name,
                public_key: keys::generate_public_key(),
                client_salt: keys::generate_client_salt(),
                token_lifetime_days: self.config.token_lifetime_days,
            })
            .await?;

        info!(
            name = %client.name,
            public_key = %client.public_key,
            collection = %client.collection_name,
            "Registered new app client"
        );

        let (access_token, claims) = self.issue_for(&client)?;

        Ok(RegisteredClient {
            client_id: client.id,
            name: client.name,
            public_key: client.public_key,
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: claims.exp - claims.iat,
            expires_at: timestamp_to_datetime(claims.exp)?,
        })
    }

    /// Verify a raw `Authorization` header value and return the
    /// authenticated identity.
    ///
    /// The sequence is strict: parse the header, peek the unsigned
    /// `api_key`, fetch the active client, re-derive its signing key
    /// from the current salt, then verify the full claim set. Nothing
    /// is cached across calls — deactivating a client or rotating its
    /// salt invalidates its outstanding tokens on the next check.
    pub async fn verify_bearer(
        &self,
        authorization: Option<&str>,
    ) -> MailfoldResult<ClientIdentity> {
        let header = authorization.ok_or(AuthError::MissingAuthorization)?;
        let raw_token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedAuthorization)?;

        // Untrusted: identifies which client's salt to fetch, nothing
        // more.
        let api_key = token::peek_api_key(raw_token)?;

        let client = self
            .registry
            .get_by_public_key(&api_key)
            .await
            .map_err(|e| match e {
                // Unknown key and inactive client collapse into one
                // rejection; storage failures pass through untouched
                // so an outage is never reported as bad credentials.
                MailfoldError::NotFound { .. } => AuthError::UnknownApiKey.into(),
                other => other,
            })?;

        let signing_key = keys::derive_signing_key(&self.config.master_secret, &client.client_salt);
        let claims = token::verify_client_token(raw_token, &signing_key, &self.config.issuer)?;

        Ok(ClientIdentity {
            client_id: client.id,
            name: client.name,
            website: client.website,
            email: client.email,
            collection_name: client.collection_name,
            public_key: client.public_key,
            claims,
        })
    }

    /// Issue a fresh token for an already-authenticated client.
    ///
    /// The client is re-fetched so the new token is signed against
    /// the current salt. The salt itself is not rotated here.
    pub async fn refresh(&self, identity: &ClientIdentity) -> MailfoldResult<RefreshedToken> {
        let client = self
            .registry
            .get_by_public_key(&identity.public_key)
            .await
            .map_err(|e| match e {
                MailfoldError::NotFound { .. } => AuthError::UnknownApiKey.into(),
                other => other,
            })?;

        let (access_token, claims) = self.issue_for(&client)?;

        info!(name = %client.name, "Refreshed client token");

        Ok(RefreshedToken {
            access_token,
            token_type: TOKEN_TYPE,
            expires_in: claims.exp - claims.iat,
            expires_at: timestamp_to_datetime(claims.exp)?,
        })
    }

    /// Fetch a client record by ID.
    pub async fn get_client(&self, id: Uuid) -> MailfoldResult<AppClient> {
        self.registry.get_by_id(id).await
    }

    /// List registered clients.
    pub async fn list_clients(
        &self,
        pagination: Pagination,
    ) -> MailfoldResult<PaginatedResult<AppClient>> {
        self.registry.list(pagination).await
    }

    /// Update a client record. A client may only update itself.
    pub async fn update_client(
        &self,
        identity: &ClientIdentity,
        id: Uuid,
        input: UpdateAppClient,
    ) -> MailfoldResult<AppClient> {
        if identity.client_id != id {
            return Err(MailfoldError::Forbidden {
                reason: "clients may only update their own record".into(),
            });
        }
        self.registry.update(id, input).await
    }

    /// Delete a client record. A client may only delete itself.
    pub async fn delete_client(&self, identity: &ClientIdentity, id: Uuid) -> MailfoldResult<()> {
        if identity.client_id != id {
            return Err(MailfoldError::Forbidden {
                reason: "clients may only delete their own record".into(),
            });
        }
        self.registry.delete(id).await
    }

    fn issue_for(&self, client: &AppClient) -> MailfoldResult<(String, token::ClientClaims)> {
        let signing_key = keys::derive_signing_key(&self.config.master_secret, &client.client_salt);
        let claims = token::build_claims(client, &self.config.issuer);
        let access_token = token::sign_claims(&claims, &signing_key)?;
        Ok((access_token, claims))
    }
}

fn timestamp_to_datetime(ts: i64) -> MailfoldResult<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or_else(|| MailfoldError::Internal(format!("invalid expiry timestamp: {ts}")))
}
