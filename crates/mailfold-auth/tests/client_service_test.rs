//! End-to-end tests for the client service against an in-memory
//! SurrealDB registry: registration, bearer verification, refresh,
//! and cross-client isolation.

use mailfold_auth::{AuthConfig, ClientService};
use mailfold_core::MailfoldError;
use mailfold_core::models::app_client::{CreateAppClient, UpdateAppClient};
use mailfold_core::repository::AppClientRepository;
use mailfold_db::repository::SurrealAppClientRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

type Registry = SurrealAppClientRepository<surrealdb::engine::local::Db>;

const MASTER_SECRET: &str = "test-master-secret";

/// Helper: in-memory registry plus a side handle for direct
/// inspection of stored records.
async fn setup() -> (ClientService<Registry>, Registry) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mailfold_db::run_migrations(&db).await.unwrap();

    let config = AuthConfig {
        master_secret: MASTER_SECRET.into(),
        ..Default::default()
    };
    let service = ClientService::new(SurrealAppClientRepository::new(db.clone()), config);
    (service, SurrealAppClientRepository::new(db))
}

fn registration(name: &str) -> CreateAppClient {
    CreateAppClient {
        name: name.into(),
        website: format!("{name}.example"),
        email: format!("owner@{name}.example"),
        collection_name: format!("{name}_subs"),
    }
}

#[tokio::test]
async fn register_issues_a_verifiable_token() {
    let (service, _) = setup().await;

    let registered = service.register(registration("acme")).await.unwrap();
    assert!(registered.public_key.starts_with("ak_"));
    assert_eq!(registered.token_type, "Bearer");
    assert!(registered.expires_in > 0);

    let header = format!("Bearer {}", registered.access_token);
    let identity = service.verify_bearer(Some(&header)).await.unwrap();

    assert_eq!(identity.client_id, registered.client_id);
    assert_eq!(identity.name, "acme");
    assert_eq!(identity.collection_name, "acme_subs");
    assert_eq!(identity.public_key, registered.public_key);
    assert_eq!(identity.claims.sub, registered.public_key);
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let (service, _) = setup().await;

    service.register(registration("acme")).await.unwrap();
    let err = service.register(registration("acme")).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AlreadyExists { .. }));
}

#[tokio::test]
async fn missing_and_malformed_headers_are_rejected() {
    let (service, _) = setup().await;

    let err = service.verify_bearer(None).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));

    let err = service.verify_bearer(Some("Basic abc123")).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));

    let err = service
        .verify_bearer(Some("Bearer not-a-jwt"))
        .await
        .unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn token_for_unknown_client_is_rejected() {
    let (service, registry) = setup().await;

    let registered = service.register(registration("acme")).await.unwrap();
    registry.delete(registered.client_id).await.unwrap();

    let header = format!("Bearer {}", registered.access_token);
    let err = service.verify_bearer(Some(&header)).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn swapped_api_key_cannot_cross_client_boundaries() {
    let (service, registry) = setup().await;

    let a = service.register(registration("acme")).await.unwrap();
    let b = service.register(registration("globex")).await.unwrap();

    // Forge a token signed with A's key but claiming to be B. The
    // verifier looks up B's record, derives B's key, and the
    // signature check fails.
    let a_record = registry.get_by_id(a.client_id).await.unwrap();
    let a_key = mailfold_auth::keys::derive_signing_key(MASTER_SECRET, &a_record.client_salt);

    let mut claims = mailfold_auth::token::build_claims(&a_record, "mailfold");
    claims.api_key = b.public_key.clone();
    claims.sub = b.public_key.clone();
    let forged = mailfold_auth::token::sign_claims(&claims, &a_key).unwrap();

    let header = format!("Bearer {forged}");
    let err = service.verify_bearer(Some(&header)).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));

    // Both legitimate tokens still verify.
    let a_header = format!("Bearer {}", a.access_token);
    let b_header = format!("Bearer {}", b.access_token);
    assert!(service.verify_bearer(Some(&a_header)).await.is_ok());
    assert!(service.verify_bearer(Some(&b_header)).await.is_ok());
}

#[tokio::test]
async fn deactivation_invalidates_outstanding_tokens() {
    let (service, registry) = setup().await;

    let a = service.register(registration("acme")).await.unwrap();
    let b = service.register(registration("globex")).await.unwrap();

    registry
        .update(
            a.client_id,
            UpdateAppClient {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let a_header = format!("Bearer {}", a.access_token);
    let err = service.verify_bearer(Some(&a_header)).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));

    // The other client is untouched.
    let b_header = format!("Bearer {}", b.access_token);
    assert!(service.verify_bearer(Some(&b_header)).await.is_ok());
}

#[tokio::test]
async fn refresh_preserves_identity() {
    let (service, _) = setup().await;

    let registered = service.register(registration("acme")).await.unwrap();
    let header = format!("Bearer {}", registered.access_token);
    let identity = service.verify_bearer(Some(&header)).await.unwrap();

    let refreshed = service.refresh(&identity).await.unwrap();
    assert_eq!(refreshed.token_type, "Bearer");
    assert!(refreshed.expires_at >= registered.expires_at);

    let new_header = format!("Bearer {}", refreshed.access_token);
    let new_identity = service.verify_bearer(Some(&new_header)).await.unwrap();
    assert_eq!(new_identity.client_id, identity.client_id);
    assert_eq!(new_identity.collection_name, identity.collection_name);
}

#[tokio::test]
async fn clients_may_only_modify_their_own_record() {
    let (service, _) = setup().await;

    let a = service.register(registration("acme")).await.unwrap();
    let b = service.register(registration("globex")).await.unwrap();

    let a_header = format!("Bearer {}", a.access_token);
    let a_identity = service.verify_bearer(Some(&a_header)).await.unwrap();

    let err = service
        .update_client(
            &a_identity,
            b.client_id,
            UpdateAppClient {
                website: Some("hijacked.example".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MailfoldError::Forbidden { .. }));

    let err = service
        .delete_client(&a_identity, b.client_id)
        .await
        .unwrap_err();
    assert!(matches!(err, MailfoldError::Forbidden { .. }));

    // Self-update is allowed.
    let updated = service
        .update_client(
            &a_identity,
            a.client_id,
            UpdateAppClient {
                website: Some("new.acme.example".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.website, "new.acme.example");
}

#[tokio::test]
async fn self_deletion_invalidates_the_token() {
    let (service, _) = setup().await;

    let a = service.register(registration("acme")).await.unwrap();
    let header = format!("Bearer {}", a.access_token);
    let identity = service.verify_bearer(Some(&header)).await.unwrap();

    service.delete_client(&identity, a.client_id).await.unwrap();

    let err = service.verify_bearer(Some(&header)).await.unwrap_err();
    assert!(matches!(err, MailfoldError::AuthenticationFailed { .. }));
}
