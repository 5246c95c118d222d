//! Subscriber domain model.
//!
//! Subscribers live inside one app client's collection; email
//! uniqueness is enforced per collection, not globally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Campaign opt-in flags. New subscribers opt in to everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignFlags {
    pub updates: bool,
    pub marketing: bool,
    pub announcements: bool,
    pub newsletters: bool,
    pub seasonal: bool,
}

impl Default for CampaignFlags {
    fn default() -> Self {
        Self {
            updates: true,
            marketing: true,
            announcements: true,
            newsletters: true,
            seasonal: true,
        }
    }
}

/// A newsletter subscriber within one client's collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub campaigns: CampaignFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriber {
    pub email: String,
    pub campaigns: Option<CampaignFlags>,
}

/// Fields that can be updated on an existing subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateSubscriber {
    pub email: Option<String>,
    pub campaigns: Option<CampaignFlags>,
}
