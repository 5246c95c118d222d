//! Visit-counter analytics model.

use serde::{Deserialize, Serialize};

/// One day's visit counters for a client namespace.
///
/// `key` is `{namespace}_{YYYY-MM-DD}`. The two counters are
/// incremented independently — `visits` carries the "unique" label in
/// the client-facing API but no deduplication happens anywhere, so it
/// behaves exactly like `raw_visits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyVisits {
    pub key: String,
    pub visits: u64,
    pub raw_visits: u64,
}
