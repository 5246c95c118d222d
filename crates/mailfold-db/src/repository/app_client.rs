//! SurrealDB implementation of [`AppClientRepository`].

use chrono::{DateTime, Utc};
use mailfold_core::error::MailfoldResult;
use mailfold_core::models::app_client::{AppClient, NewAppClient, UpdateAppClient};
use mailfold_core::repository::{AppClientRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AppClientRow {
    name: String,
    website: String,
    email: String,
    public_key: String,
    client_salt: String,
    collection_name: String,
    is_active: bool,
    token_lifetime_days: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AppClientRow {
    fn into_client(self, id: Uuid) -> AppClient {
        AppClient {
            id,
            name: self.name,
            website: self.website,
            email: self.email,
            public_key: self.public_key,
            client_salt: self.client_salt,
            collection_name: self.collection_name,
            is_active: self.is_active,
            token_lifetime_days: self.token_lifetime_days,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AppClientRowWithId {
    record_id: String,
    name: String,
    website: String,
    email: String,
    public_key: String,
    client_salt: String,
    collection_name: String,
    is_active: bool,
    token_lifetime_days: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AppClientRowWithId {
    fn try_into_client(self) -> Result<AppClient, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid record ID: {e}")))?;
        Ok(AppClient {
            id,
            name: self.name,
            website: self.website,
            email: self.email,
            public_key: self.public_key,
            client_salt: self.client_salt,
            collection_name: self.collection_name,
            is_active: self.is_active,
            token_lifetime_days: self.token_lifetime_days,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Translate a unique-index violation into a conflict error; other
/// failures stay generic.
fn map_check_error(e: surrealdb::Error, name: &str) -> DbError {
    let msg = e.to_string();
    if msg.contains("idx_app_client_name") {
        DbError::Conflict {
            entity: "app_client".into(),
            key: format!("name={name}"),
        }
    } else if msg.contains("idx_app_client_public_key") {
        DbError::Conflict {
            entity: "app_client".into(),
            key: "public_key".into(),
        }
    } else {
        DbError::Query(msg)
    }
}

/// SurrealDB implementation of the app client registry.
#[derive(Clone)]
pub struct SurrealAppClientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAppClientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AppClientRepository for SurrealAppClientRepository<C> {
    async fn create(&self, input: NewAppClient) -> MailfoldResult<AppClient> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let name = input.name.clone();

        let result = self
            .db
            .query(
                "CREATE type::record('app_client', $id) SET \
                 name = $name, website = $website, email = $email, \
                 public_key = $public_key, \
                 client_salt = $client_salt, \
                 collection_name = $collection_name, \
                 is_active = true, \
                 token_lifetime_days = $token_lifetime_days",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("website", input.website))
            .bind(("email", input.email))
            .bind(("public_key", input.public_key))
            .bind(("client_salt", input.client_salt))
            .bind(("collection_name", input.collection_name))
            .bind(("token_lifetime_days", input.token_lifetime_days))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| map_check_error(e, &name))?;

        let rows: Vec<AppClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "app_client".into(),
            id: id_str,
        })?;

        Ok(row.into_client(id))
    }

    async fn get_by_id(&self, id: Uuid) -> MailfoldResult<AppClient> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('app_client', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "app_client".into(),
            id: id_str,
        })?;

        Ok(row.into_client(id))
    }

    async fn get_by_public_key(&self, public_key: &str) -> MailfoldResult<AppClient> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM app_client \
                 WHERE public_key = $public_key AND is_active = true",
            )
            .bind(("public_key", public_key.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppClientRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "app_client".into(),
            id: format!("public_key={public_key}"),
        })?;

        Ok(row.try_into_client()?)
    }

    async fn get_by_name(&self, name: &str) -> MailfoldResult<AppClient> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM app_client \
                 WHERE name = $name",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppClientRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "app_client".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_client()?)
    }

    async fn name_exists(&self, name: &str) -> MailfoldResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM app_client \
                 WHERE name = $name GROUP ALL",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn update(&self, id: Uuid, input: UpdateAppClient) -> MailfoldResult<AppClient> {
        let id_str = id.to_string();
        let name_for_error = input.name.clone().unwrap_or_default();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.website.is_some() {
            sets.push("website = $website");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('app_client', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(website) = input.website {
            builder = builder.bind(("website", website));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| map_check_error(e, &name_for_error))?;

        let rows: Vec<AppClientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "app_client".into(),
            id: id_str,
        })?;

        Ok(row.into_client(id))
    }

    async fn delete(&self, id: Uuid) -> MailfoldResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record('app_client', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppClientRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "app_client".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> MailfoldResult<PaginatedResult<AppClient>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM app_client GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM app_client \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $skip",
            )
            .bind(("limit", pagination.limit))
            .bind(("skip", pagination.skip))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppClientRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_client())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult::new(items, total, &pagination))
    }
}
