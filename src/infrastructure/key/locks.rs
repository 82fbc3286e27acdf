//! Per-address critical sections
//!
//! Every decide-and-act sequence on one address (get-or-create, verify,
//! override, revoke, and the reaper's per-record handling) runs under the
//! same lock, so a sweep can never undo an in-flight recreation. Locks are
//! held only for the duration of one such sequence.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::key::ClientAddr;

/// Registry of per-address async locks
#[derive(Debug, Default)]
pub struct AddressLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AddressLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the critical section for one address
    pub async fn acquire(&self, address: &ClientAddr) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(address.as_str().to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Drop lock entries nobody currently holds or waits on
    pub async fn prune(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> ClientAddr {
        ClientAddr::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_acquire_serializes_same_address() {
        let locks = Arc::new(AddressLocks::new());
        let counter = Arc::new(Mutex::new(0u32));

        let mut handles = Vec::new();

        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();

            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(&addr("10.0.0.1")).await;
                let mut count = counter.lock().await;
                *count += 1;
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*counter.lock().await, 8);
    }

    #[tokio::test]
    async fn test_different_addresses_do_not_block() {
        let locks = AddressLocks::new();

        let _first = locks.acquire(&addr("10.0.0.1")).await;
        // Must not deadlock while the first guard is held.
        let _second = locks.acquire(&addr("10.0.0.2")).await;
    }

    #[tokio::test]
    async fn test_prune_removes_idle_entries() {
        let locks = AddressLocks::new();

        {
            let _guard = locks.acquire(&addr("10.0.0.1")).await;
            locks.prune().await;
            assert_eq!(locks.len().await, 1);
        }

        locks.prune().await;
        assert_eq!(locks.len().await, 0);
    }
}
