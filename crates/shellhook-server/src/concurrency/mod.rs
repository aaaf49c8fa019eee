//! Per-script mutual exclusion.
//!
//! - [`lock_table::LockTable`] holds one exclusive lock per non-concurrent
//!   script, built once from the registry.

pub mod lock_table;

pub use lock_table::{LockTable, ScriptLease};
