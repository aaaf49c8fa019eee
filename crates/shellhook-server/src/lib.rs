//! HTTP gateway that runs pre-registered shell scripts on authenticated
//! webhook requests.
//!
//! A request to `/hook?script=<uuid>` is resolved against the
//! [`shellhook_core::Registry`], authorized, serialized through the
//! [`concurrency::LockTable`] when the script is not concurrent, executed by
//! the [`launcher::Launcher`], and answered with the script's stdout.

pub mod auth;
pub mod concurrency;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod launcher;
pub mod metrics;
pub mod router;
pub mod state;
pub mod telemetry;
