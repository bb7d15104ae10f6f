//! Per-aggregate mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::AggregateId;
use tokio::sync::OwnedMutexGuard;

type Slot = Arc<tokio::sync::Mutex<()>>;
type Slots = Arc<Mutex<HashMap<AggregateId, Slot>>>;

/// A table of async locks keyed by aggregate id.
///
/// Holding the guard for an id excludes every other holder of the same id;
/// distinct ids never contend beyond the brief table lookup. A slot lives
/// only while some task holds or awaits it.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    slots: Slots,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    ///
    /// Dropping the returned future before it resolves gives up the wait and
    /// removes the slot if no other task uses it.
    pub async fn lock(&self, key: &AggregateId) -> KeyGuard {
        let release = Release {
            key: key.clone(),
            slots: Arc::clone(&self.slots),
        };
        // The slot reference lives only inside this block, so a cancelled
        // wait drops it before `release` runs.
        let guard = {
            let slot = Arc::clone(slots(&self.slots).entry(key.clone()).or_default());
            slot.lock_owned().await
        };
        KeyGuard {
            _guard: guard,
            release,
        }
    }

    /// Number of ids currently locked or awaited.
    pub fn len(&self) -> usize {
        slots(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// The table is only touched by non-panicking map operations, so a poisoned
// lock still holds a consistent map.
fn slots(slots: &Slots) -> MutexGuard<'_, HashMap<AggregateId, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive access to one aggregate id. Released on drop.
pub struct KeyGuard {
    // Dropped before `release`, which relies on the field order.
    _guard: OwnedMutexGuard<()>,
    release: Release,
}

impl KeyGuard {
    pub fn key(&self) -> &AggregateId {
        &self.release.key
    }
}

/// Removes an id's slot once nobody holds or awaits it.
struct Release {
    key: AggregateId,
    slots: Slots,
}

impl Drop for Release {
    fn drop(&mut self) {
        // Only the table's own reference left: nobody holds or awaits the slot.
        let mut table = slots(&self.slots);
        if table
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            table.remove(&self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_slot_removed_after_release() {
        let locks = KeyedLocks::new();
        let guard = locks.lock(&AggregateId::from("o1")).await;
        assert_eq!(guard.key().as_str(), "o1");
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _first = locks.lock(&AggregateId::from("o1")).await;

        let second = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(&AggregateId::from("o2")),
        )
        .await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_same_key_waits_for_release() {
        let locks = KeyedLocks::new();
        let first = locks.lock(&AggregateId::from("o1")).await;

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            locks.lock(&AggregateId::from("o1")),
        )
        .await;
        assert!(blocked.is_err());

        drop(first);
        let acquired = tokio::time::timeout(
            Duration::from_millis(100),
            locks.lock(&AggregateId::from("o1")),
        )
        .await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_abandoned_wait_does_not_leak_slot() {
        let locks = KeyedLocks::new();
        let key = AggregateId::from("o1");
        let holder = locks.lock(&key).await;

        let mut waiter = Box::pin(locks.lock(&key));
        assert!(futures_util::poll!(waiter.as_mut()).is_pending());

        drop(holder);
        drop(waiter);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_wait_keeps_slot_for_holder() {
        let locks = KeyedLocks::new();
        let key = AggregateId::from("o1");
        let holder = locks.lock(&key).await;

        let mut waiter = Box::pin(locks.lock(&key));
        assert!(futures_util::poll!(waiter.as_mut()).is_pending());
        drop(waiter);
        assert_eq!(locks.len(), 1);

        drop(holder);
        assert!(locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_holders_never_overlap() {
        let locks = KeyedLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let locks = locks.clone();
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                tokio::spawn(async move {
                    let _guard = locks.lock(&AggregateId::from("hot")).await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }
}
