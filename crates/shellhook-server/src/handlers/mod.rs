//! HTTP handler modules for the shellhook API.
//!
//! The hook handler orchestrates resolve, authorize, serialize and execute.
//! Health and metrics are unauthenticated and independent of the registry.

pub mod health;
pub mod hook;
pub mod metrics;
