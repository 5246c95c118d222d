//! SurrealDB implementation of [`VisitCounterStore`].
//!
//! Each record is one day of counters for one namespace, keyed
//! `{namespace}_{YYYY-MM-DD}`. Increments use a single UPSERT so the
//! read-modify-write happens inside one atomic document operation.

use chrono::NaiveDate;
use mailfold_core::error::MailfoldResult;
use mailfold_core::models::analytics::DailyVisits;
use mailfold_core::repository::VisitCounterStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

const TABLE: &str = "daily_visits";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Counters are written lazily, so either field may be absent on a
/// record that has only seen the other kind of visit.
#[derive(Debug, SurrealValue)]
struct VisitRow {
    visits: Option<u64>,
    raw_visits: Option<u64>,
}

#[derive(Debug, SurrealValue)]
struct VisitRowWithKey {
    key: String,
    visits: Option<u64>,
    raw_visits: Option<u64>,
}

impl VisitRowWithKey {
    fn into_daily(self) -> DailyVisits {
        DailyVisits {
            key: self.key,
            visits: self.visits.unwrap_or(0),
            raw_visits: self.raw_visits.unwrap_or(0),
        }
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB visit-counter store scoped to one namespace.
#[derive(Clone)]
pub struct SurrealVisitCounterStore<C: Connection> {
    db: Surreal<C>,
    namespace: String,
}

impl<C: Connection> SurrealVisitCounterStore<C> {
    /// Bind a store to the given namespace (key prefix). The
    /// namespace must come from a verified client identity.
    pub fn new(db: Surreal<C>, namespace: impl Into<String>) -> Self {
        Self {
            db,
            namespace: namespace.into(),
        }
    }

    /// The namespace this store is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn day_key(&self, date: NaiveDate) -> String {
        format!("{}_{}", self.namespace, date.format(DATE_FORMAT))
    }

    fn today_key(&self) -> String {
        self.day_key(chrono::Utc::now().date_naive())
    }

    async fn increment(&self, field: &'static str) -> MailfoldResult<u64> {
        let key = self.today_key();

        let mut result = self
            .db
            .query(format!(
                "UPSERT type::record('{TABLE}', $key) \
                 SET {field} = ({field} ?? 0) + 1 RETURN AFTER"
            ))
            .bind(("key", key.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VisitRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: TABLE.into(),
            id: key,
        })?;

        let value = match field {
            "visits" => row.visits,
            _ => row.raw_visits,
        };
        Ok(value.unwrap_or(0))
    }

    async fn read_today(&self) -> MailfoldResult<(u64, u64)> {
        let key = self.today_key();

        let mut result = self
            .db
            .query(format!("SELECT * FROM type::record('{TABLE}', $key)"))
            .bind(("key", key))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VisitRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .first()
            .map(|r| (r.visits.unwrap_or(0), r.raw_visits.unwrap_or(0)))
            .unwrap_or((0, 0)))
    }

    fn range_keys(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> (String, String) {
        // Open bounds cover the full representable calendar, matching
        // the key format so string comparison orders by date.
        let from = from.unwrap_or_else(|| NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default());
        let to = to.unwrap_or_else(|| NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or_default());
        (self.day_key(from), self.day_key(to))
    }
}

impl<C: Connection> VisitCounterStore for SurrealVisitCounterStore<C> {
    async fn record_visit(&self) -> MailfoldResult<u64> {
        self.increment("visits").await
    }

    async fn record_raw_visit(&self) -> MailfoldResult<u64> {
        self.increment("raw_visits").await
    }

    async fn visit_count(&self) -> MailfoldResult<u64> {
        Ok(self.read_today().await?.0)
    }

    async fn raw_visit_count(&self) -> MailfoldResult<u64> {
        Ok(self.read_today().await?.1)
    }

    async fn days_with_visits(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> MailfoldResult<Vec<DailyVisits>> {
        let (start, end) = self.range_keys(from, to);
        let prefix = format!("{}_", self.namespace);

        // The prefix guard keeps foreign namespaces out even if a key
        // range were ever crafted to straddle them.
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS key, visits, raw_visits \
                 FROM {TABLE} \
                 WHERE meta::id(id) >= $start AND meta::id(id) <= $end \
                 AND string::starts_with(meta::id(id), $prefix) \
                 ORDER BY key ASC"
            ))
            .bind(("start", start))
            .bind(("end", end))
            .bind(("prefix", prefix))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<VisitRowWithKey> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(VisitRowWithKey::into_daily).collect())
    }

    async fn active_day_count(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> MailfoldResult<u64> {
        let (start, end) = self.range_keys(from, to);
        let prefix = format!("{}_", self.namespace);

        let mut result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {TABLE} \
                 WHERE meta::id(id) >= $start AND meta::id(id) <= $end \
                 AND string::starts_with(meta::id(id), $prefix) \
                 GROUP ALL"
            ))
            .bind(("start", start))
            .bind(("end", end))
            .bind(("prefix", prefix))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
