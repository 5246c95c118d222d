//! Authenticated client identity and partition resolution.

use mailfold_core::error::{MailfoldError, MailfoldResult};

use crate::token::ClientClaims;

/// An authenticated client — proof that a bearer token passed the
/// full verification sequence.
///
/// Carries the registry record's fields alongside the verified
/// claims so downstream accessors need no second lookup.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub client_id: uuid::Uuid,
    pub name: String,
    pub website: String,
    pub email: String,
    pub collection_name: String,
    pub public_key: String,
    pub claims: ClientClaims,
}

impl ClientIdentity {
    /// The subscriber collection this identity is scoped to.
    ///
    /// Checked defensively even though a verified identity always
    /// carries a collection name — the identity crosses a crate
    /// boundary.
    pub fn subscriber_partition(&self) -> MailfoldResult<&str> {
        if self.collection_name.is_empty() {
            return Err(MailfoldError::Validation {
                message: "collection name missing from client identity".into(),
            });
        }
        Ok(&self.collection_name)
    }

    /// The key prefix for this client's visit counters.
    pub fn analytics_namespace(&self) -> MailfoldResult<String> {
        if self.name.is_empty() {
            return Err(MailfoldError::Validation {
                message: "client name missing from client identity".into(),
            });
        }
        Ok(format!("{}_tracking_and_analytics", self.name))
    }
}
