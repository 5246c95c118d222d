//! SurrealDB store implementations.

mod analytics;
mod app_client;
mod subscriber;

pub use analytics::SurrealVisitCounterStore;
pub use app_client::SurrealAppClientRepository;
pub use subscriber::SurrealSubscriberStore;
