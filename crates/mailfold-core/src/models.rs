//! Domain models for Mailfold.
//!
//! These are the core types shared across all crates.

pub mod analytics;
pub mod app_client;
pub mod subscriber;
