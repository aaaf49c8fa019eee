//! Fixed table of per-script exclusive locks.
//!
//! [`LockTable`] is derived from the [`Registry`] at startup and never
//! resized. Scripts with `concurrent: false` get an entry; every other
//! script is absent and runs with unlimited concurrency.
//!
//! Locks are `tokio::sync::Mutex`, which hands the lock out in FIFO order,
//! so executions of a serialized script run in acquisition order.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use shellhook_core::{Registry, ScriptId};

/// Exclusive hold on a serialized script. Dropping it releases the lock.
#[derive(Debug)]
pub struct ScriptLease {
    id: ScriptId,
    _guard: OwnedMutexGuard<()>,
}

impl ScriptLease {
    pub fn script_id(&self) -> ScriptId {
        self.id
    }
}

/// Immutable mapping from script id to its exclusion lock.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: HashMap<ScriptId, Arc<Mutex<()>>>,
}

impl LockTable {
    /// Builds a lock for every script whose `concurrent` flag is false.
    pub fn from_registry(registry: &Registry) -> Self {
        let locks = registry
            .scripts()
            .iter()
            .filter(|script| !script.concurrent)
            .map(|script| (script.id, Arc::new(Mutex::new(()))))
            .collect();
        LockTable { locks }
    }

    /// Waits for the script's lock and returns the lease.
    ///
    /// Returns `None` immediately for scripts that are not serialized.
    pub async fn acquire(&self, id: &ScriptId) -> Option<ScriptLease> {
        let lock = self.locks.get(id)?;
        let guard = Arc::clone(lock).lock_owned().await;
        Some(ScriptLease {
            id: *id,
            _guard: guard,
        })
    }

    /// Whether executions of `id` are serialized.
    pub fn is_serialized(&self, id: &ScriptId) -> bool {
        self.locks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shellhook_core::Script;

    use super::*;

    fn registry() -> (Registry, ScriptId, ScriptId) {
        let serial = ScriptId::new_v4();
        let parallel = ScriptId::new_v4();
        let registry = Registry::new(
            "token",
            Vec::new(),
            vec![
                Script::inline(serial, "echo serial"),
                Script::inline(parallel, "echo parallel").with_concurrent(true),
            ],
        )
        .unwrap();
        (registry, serial, parallel)
    }

    #[test]
    fn only_non_concurrent_scripts_get_locks() {
        let (registry, serial, parallel) = registry();
        let table = LockTable::from_registry(&registry);
        assert_eq!(table.len(), 1);
        assert!(table.is_serialized(&serial));
        assert!(!table.is_serialized(&parallel));
    }

    #[test]
    fn empty_registry_has_empty_table() {
        assert!(LockTable::from_registry(&Registry::empty()).is_empty());
    }

    #[tokio::test]
    async fn absent_scripts_never_block() {
        let (registry, _, parallel) = registry();
        let table = LockTable::from_registry(&registry);
        assert!(table.acquire(&parallel).await.is_none());
        assert!(table.acquire(&ScriptId::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn second_acquire_waits_for_release() {
        let (registry, serial, _) = registry();
        let table = Arc::new(LockTable::from_registry(&registry));

        let lease = table.acquire(&serial).await.unwrap();
        assert_eq!(lease.script_id(), serial);

        let waiter = {
            let table = Arc::clone(&table);
            tokio::spawn(async move { table.acquire(&serial).await.is_some() })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(lease);
        let acquired = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(acquired);
    }

    #[tokio::test]
    async fn waiters_are_served_in_acquisition_order() {
        let (registry, serial, _) = registry();
        let table = Arc::new(LockTable::from_registry(&registry));
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let first = table.acquire(&serial).await.unwrap();
        let mut handles = Vec::new();
        for n in 0..4 {
            let table = Arc::clone(&table);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let _lease = table.acquire(&serial).await;
                order.lock().unwrap().push(n);
            }));
            // Let each waiter enqueue before spawning the next.
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        drop(first);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }
}
