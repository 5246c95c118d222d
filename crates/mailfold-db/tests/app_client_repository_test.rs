//! Integration tests for the app client registry using in-memory
//! SurrealDB.

use mailfold_core::MailfoldError;
use mailfold_core::models::app_client::{NewAppClient, UpdateAppClient};
use mailfold_core::repository::{AppClientRepository, Pagination};
use mailfold_db::repository::SurrealAppClientRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    mailfold_db::run_migrations(&db).await.unwrap();
    db
}

fn new_client(name: &str) -> NewAppClient {
    NewAppClient {
        name: name.into(),
        website: format!("{name}.example"),
        email: format!("owner@{name}.example"),
        collection_name: format!("{name}_subs"),
        public_key: format!("ak_{name}_key"),
        client_salt: format!("{name}-salt"),
        token_lifetime_days: 365,
    }
}

#[tokio::test]
async fn create_and_get_app_client() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    let client = repo.create(new_client("acme")).await.unwrap();
    assert_eq!(client.name, "acme");
    assert_eq!(client.collection_name, "acme_subs");
    assert!(client.is_active);
    assert_eq!(client.token_lifetime_days, 365);

    let fetched = repo.get_by_id(client.id).await.unwrap();
    assert_eq!(fetched.id, client.id);
    assert_eq!(fetched.public_key, "ak_acme_key");
    assert_eq!(fetched.client_salt, "acme-salt");
}

#[tokio::test]
async fn duplicate_name_is_rejected_by_the_index() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    repo.create(new_client("acme")).await.unwrap();

    let mut second = new_client("acme");
    second.public_key = "ak_other_key".into();
    let err = repo.create(second).await.unwrap_err();

    assert!(
        matches!(err, MailfoldError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );

    // No second record was created.
    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn name_exists_reflects_registry_state() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    assert!(!repo.name_exists("acme").await.unwrap());
    repo.create(new_client("acme")).await.unwrap();
    assert!(repo.name_exists("acme").await.unwrap());
    assert!(!repo.name_exists("globex").await.unwrap());
}

#[tokio::test]
async fn public_key_lookup_only_returns_active_clients() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    let client = repo.create(new_client("acme")).await.unwrap();
    assert!(repo.get_by_public_key("ak_acme_key").await.is_ok());

    // Deactivate; the verification-path lookup must now miss.
    repo.update(
        client.id,
        UpdateAppClient {
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = repo.get_by_public_key("ak_acme_key").await.unwrap_err();
    assert!(matches!(err, MailfoldError::NotFound { .. }));

    // The record itself is still there.
    let fetched = repo.get_by_id(client.id).await.unwrap();
    assert!(!fetched.is_active);
}

#[tokio::test]
async fn unknown_public_key_is_not_found() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    let err = repo.get_by_public_key("ak_nobody").await.unwrap_err();
    assert!(matches!(err, MailfoldError::NotFound { .. }));
}

#[tokio::test]
async fn update_app_client() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    let client = repo.create(new_client("acme")).await.unwrap();

    let updated = repo
        .update(
            client.id,
            UpdateAppClient {
                website: Some("new.acme.example".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.website, "new.acme.example");
    assert_eq!(updated.name, "acme"); // unchanged
    assert_eq!(updated.public_key, client.public_key); // immutable
    assert!(updated.updated_at >= client.updated_at);
}

#[tokio::test]
async fn delete_app_client() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    let client = repo.create(new_client("acme")).await.unwrap();
    repo.delete(client.id).await.unwrap();

    let result = repo.get_by_id(client.id).await;
    assert!(result.is_err(), "should not find deleted client");
}

#[tokio::test]
async fn deleting_a_missing_client_is_not_found() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    let client = repo.create(new_client("acme")).await.unwrap();
    repo.delete(client.id).await.unwrap();

    // The second delete has nothing to remove.
    let err = repo.delete(client.id).await.unwrap_err();
    assert!(matches!(err, MailfoldError::NotFound { .. }));

    let err = repo.delete(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, MailfoldError::NotFound { .. }));
}

#[tokio::test]
async fn list_app_clients_with_pagination() {
    let db = setup().await;
    let repo = SurrealAppClientRepository::new(db);

    for i in 0..5 {
        repo.create(new_client(&format!("client-{i}"))).await.unwrap();
    }

    let page = repo
        .list(Pagination { skip: 0, limit: 2 })
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pages, 3); // ceil(5 / 2)

    let last = repo
        .list(Pagination { skip: 4, limit: 2 })
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
}
