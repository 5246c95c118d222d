//! Mailfold Core — domain models, repository traits, and shared
//! error types for the multi-tenant newsletter backend.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{MailfoldError, MailfoldResult};
