//! Mailfold Auth — per-client signing-key derivation, bearer token
//! issuance/verification, and tenant-scoped partition resolution.

pub mod config;
pub mod error;
pub mod identity;
pub mod keys;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use identity::ClientIdentity;
pub use service::{ClientService, RefreshedToken, RegisteredClient};
pub use token::ClientClaims;
