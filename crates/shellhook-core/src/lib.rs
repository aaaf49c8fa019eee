//! Script registry for the shellhook gateway.
//!
//! Holds the immutable, startup-loaded table of scripts that the HTTP layer
//! resolves requests against, plus the YAML configuration loader that builds
//! it. Nothing in this crate is mutated after [`Registry`] construction.

pub mod error;
pub mod id;
pub mod registry;
pub mod script;

// Re-export commonly used types
pub use error::CoreError;
pub use id::ScriptId;
pub use registry::Registry;
pub use script::{EnvVar, Script, ScriptSource};
