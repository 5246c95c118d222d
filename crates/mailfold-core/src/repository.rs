//! Repository trait definitions for data access abstraction.
//!
//! The app client registry is partition-agnostic. The subscriber and
//! visit-counter stores are constructed bound to exactly one
//! partition and expose no operation that can address another
//! client's data.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::MailfoldResult;
use crate::models::analytics::DailyVisits;
use crate::models::app_client::{AppClient, NewAppClient, UpdateAppClient};
use crate::models::subscriber::{CreateSubscriber, Subscriber, UpdateSubscriber};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: 50 }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    /// `ceil(total / limit)`.
    pub pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        let limit = pagination.limit.max(1);
        Self {
            items,
            total,
            skip: pagination.skip,
            limit,
            pages: total.div_ceil(limit),
        }
    }
}

/// Registry of app clients (tenants). Global scope — there is a
/// single client table regardless of how many partitions exist.
pub trait AppClientRepository: Send + Sync {
    /// Persist a new client. Fails with `AlreadyExists` when a client
    /// with the same name is present. The application-level name
    /// check is a fast path; the storage layer's unique index is the
    /// real guarantee under concurrent registration.
    fn create(&self, input: NewAppClient) -> impl Future<Output = MailfoldResult<AppClient>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MailfoldResult<AppClient>> + Send;

    /// Look up an *active* client by its public key. Inactive clients
    /// are treated as absent — this is the verification-path lookup.
    fn get_by_public_key(
        &self,
        public_key: &str,
    ) -> impl Future<Output = MailfoldResult<AppClient>> + Send;

    fn get_by_name(&self, name: &str) -> impl Future<Output = MailfoldResult<AppClient>> + Send;

    fn name_exists(&self, name: &str) -> impl Future<Output = MailfoldResult<bool>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateAppClient,
    ) -> impl Future<Output = MailfoldResult<AppClient>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = MailfoldResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = MailfoldResult<PaginatedResult<AppClient>>> + Send;
}

/// Subscriber store bound to a single collection at construction.
pub trait SubscriberStore: Send + Sync {
    /// Insert a subscriber. Fails with `AlreadyExists` when the email
    /// is already present in this collection.
    fn create(
        &self,
        input: CreateSubscriber,
    ) -> impl Future<Output = MailfoldResult<Subscriber>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MailfoldResult<Subscriber>> + Send;

    fn get_by_email(&self, email: &str)
    -> impl Future<Output = MailfoldResult<Subscriber>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateSubscriber,
    ) -> impl Future<Output = MailfoldResult<Subscriber>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = MailfoldResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = MailfoldResult<PaginatedResult<Subscriber>>> + Send;

    fn count(&self) -> impl Future<Output = MailfoldResult<u64>> + Send;
}

/// Daily visit counters bound to a single namespace at construction.
///
/// Increments are atomic single-document operations; the two counters
/// are independent (see [`DailyVisits`]).
pub trait VisitCounterStore: Send + Sync {
    /// Increment today's `visits` counter; returns the new value.
    fn record_visit(&self) -> impl Future<Output = MailfoldResult<u64>> + Send;

    /// Increment today's `raw_visits` counter; returns the new value.
    fn record_raw_visit(&self) -> impl Future<Output = MailfoldResult<u64>> + Send;

    /// Today's `visits` counter, zero if no record exists yet.
    fn visit_count(&self) -> impl Future<Output = MailfoldResult<u64>> + Send;

    /// Today's `raw_visits` counter, zero if no record exists yet.
    fn raw_visit_count(&self) -> impl Future<Output = MailfoldResult<u64>> + Send;

    /// Daily records within the inclusive date range. Open bounds
    /// default to the earliest/latest representable day.
    fn days_with_visits(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Future<Output = MailfoldResult<Vec<DailyVisits>>> + Send;

    /// Number of days with at least one recorded visit in the range.
    fn active_day_count(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> impl Future<Output = MailfoldResult<u64>> + Send;
}
