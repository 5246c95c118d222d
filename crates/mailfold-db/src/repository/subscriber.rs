//! SurrealDB implementation of [`SubscriberStore`].
//!
//! Each store instance is bound to one collection (table) at
//! construction; every query targets that table via `type::table` /
//! `type::record`, so no operation can reach another client's
//! partition. Partition tables are defined on first use (SurrealDB
//! rejects queries against undefined tables).

use chrono::{DateTime, Utc};
use mailfold_core::error::MailfoldResult;
use mailfold_core::models::subscriber::{
    CampaignFlags, CreateSubscriber, Subscriber, UpdateSubscriber,
};
use mailfold_core::repository::{PaginatedResult, Pagination, SubscriberStore};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CampaignRow {
    updates: bool,
    marketing: bool,
    announcements: bool,
    newsletters: bool,
    seasonal: bool,
}

impl From<CampaignRow> for CampaignFlags {
    fn from(row: CampaignRow) -> Self {
        Self {
            updates: row.updates,
            marketing: row.marketing,
            announcements: row.announcements,
            newsletters: row.newsletters,
            seasonal: row.seasonal,
        }
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct SubscriberRow {
    email: String,
    campaigns: CampaignRow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriberRow {
    fn into_subscriber(self, id: Uuid) -> Subscriber {
        Subscriber {
            id,
            email: self.email,
            campaigns: self.campaigns.into(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct SubscriberRowWithId {
    record_id: String,
    email: String,
    campaigns: CampaignRow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubscriberRowWithId {
    fn try_into_subscriber(self) -> Result<Subscriber, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid record ID: {e}")))?;
        Ok(Subscriber {
            id,
            email: self.email,
            campaigns: self.campaigns.into(),
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

const CAMPAIGN_OBJECT: &str = "{ updates: $c_updates, marketing: $c_marketing, \
     announcements: $c_announcements, newsletters: $c_newsletters, \
     seasonal: $c_seasonal }";

/// SurrealDB subscriber store scoped to one collection.
#[derive(Clone)]
pub struct SurrealSubscriberStore<C: Connection> {
    db: Surreal<C>,
    collection: String,
}

impl<C: Connection> SurrealSubscriberStore<C> {
    /// Bind a store to the given partition. The collection name must
    /// come from a verified client identity, never from request
    /// input.
    pub fn new(db: Surreal<C>, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    /// The partition this store is bound to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Define the partition table if it does not exist yet. Partition
    /// tables are created on first use, and SurrealDB rejects queries
    /// against undefined tables, so every operation runs this first.
    /// The collection name comes from a verified identity; quoting it
    /// as an identifier is sufficient (DDL takes no bindings).
    async fn ensure_table(&self) -> Result<(), DbError> {
        self.db
            .query(format!(
                "DEFINE TABLE IF NOT EXISTS `{}` SCHEMALESS",
                self.collection
            ))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }
}

impl<C: Connection> SubscriberStore for SurrealSubscriberStore<C> {
    async fn create(&self, input: CreateSubscriber) -> MailfoldResult<Subscriber> {
        self.ensure_table().await?;

        // Per-partition email uniqueness. Check-then-act is accepted
        // here; partition tables are dynamic so no index predates the
        // first write.
        let mut existing = self
            .db
            .query(
                "SELECT count() AS total FROM type::table($tbl) \
                 WHERE email = $email GROUP ALL",
            )
            .bind(("tbl", self.collection.clone()))
            .bind(("email", input.email.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = existing.take(0).map_err(DbError::from)?;
        if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(DbError::Conflict {
                entity: "subscriber".into(),
                key: format!("email={}", input.email),
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let campaigns = input.campaigns.unwrap_or_default();

        // Dynamic tables have no schema defaults, so the timestamps
        // must be written explicitly.
        let query = format!(
            "CREATE type::record($tbl, $id) SET \
             email = $email, campaigns = {CAMPAIGN_OBJECT}, \
             created_at = time::now(), updated_at = time::now()"
        );

        let result = self
            .db
            .query(query)
            .bind(("tbl", self.collection.clone()))
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("c_updates", campaigns.updates))
            .bind(("c_marketing", campaigns.marketing))
            .bind(("c_announcements", campaigns.announcements))
            .bind(("c_newsletters", campaigns.newsletters))
            .bind(("c_seasonal", campaigns.seasonal))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SubscriberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "subscriber".into(),
            id: id_str,
        })?;

        Ok(row.into_subscriber(id))
    }

    async fn get_by_id(&self, id: Uuid) -> MailfoldResult<Subscriber> {
        self.ensure_table().await?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record($tbl, $id)")
            .bind(("tbl", self.collection.clone()))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "subscriber".into(),
            id: id_str,
        })?;

        Ok(row.into_subscriber(id))
    }

    async fn get_by_email(&self, email: &str) -> MailfoldResult<Subscriber> {
        self.ensure_table().await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::table($tbl) \
                 WHERE email = $email",
            )
            .bind(("tbl", self.collection.clone()))
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriberRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "subscriber".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_subscriber()?)
    }

    async fn update(&self, id: Uuid, input: UpdateSubscriber) -> MailfoldResult<Subscriber> {
        self.ensure_table().await?;
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email".to_string());
        }
        if input.campaigns.is_some() {
            sets.push(format!("campaigns = {CAMPAIGN_OBJECT}"));
        }
        sets.push("updated_at = time::now()".to_string());

        let query = format!(
            "UPDATE type::record($tbl, $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(query)
            .bind(("tbl", self.collection.clone()))
            .bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(campaigns) = input.campaigns {
            builder = builder
                .bind(("c_updates", campaigns.updates))
                .bind(("c_marketing", campaigns.marketing))
                .bind(("c_announcements", campaigns.announcements))
                .bind(("c_newsletters", campaigns.newsletters))
                .bind(("c_seasonal", campaigns.seasonal));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SubscriberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "subscriber".into(),
            id: id_str,
        })?;

        Ok(row.into_subscriber(id))
    }

    async fn delete(&self, id: Uuid) -> MailfoldResult<()> {
        self.ensure_table().await?;
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record($tbl, $id) RETURN BEFORE")
            .bind(("tbl", self.collection.clone()))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriberRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "subscriber".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> MailfoldResult<PaginatedResult<Subscriber>> {
        self.ensure_table().await?;

        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM type::table($tbl) GROUP ALL")
            .bind(("tbl", self.collection.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::table($tbl) \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $skip",
            )
            .bind(("tbl", self.collection.clone()))
            .bind(("limit", pagination.limit))
            .bind(("skip", pagination.skip))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SubscriberRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_subscriber())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult::new(items, total, &pagination))
    }

    async fn count(&self) -> MailfoldResult<u64> {
        self.ensure_table().await?;

        let mut result = self
            .db
            .query("SELECT count() AS total FROM type::table($tbl) GROUP ALL")
            .bind(("tbl", self.collection.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
