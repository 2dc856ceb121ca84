//! Key-scoped mutual exclusion
//!
//! This module provides `KeyedLock`, which serializes critical sections that
//! share a key while letting critical sections on different keys run fully
//! in parallel. The ledger keys it by account id so that every
//! read-modify-write of one account's balance runs alone.
//!
//! # Design
//!
//! One `tokio::sync::Mutex<()>` is kept per key in a `DashMap`. A lock is
//! created the first time its key is touched; `DashMap::entry` makes that
//! create-if-absent step atomic, so two simultaneous first touches of the
//! same key always end up sharing a single mutex.
//!
//! The shard guard returned by `entry` is released before anything is
//! awaited: the caller only clones the `Arc` out of the map and then waits
//! on the mutex itself.
//!
//! # Guarantees
//!
//! - At most one `KeyGuard` exists per key at any instant
//! - Waiters for one key are granted the lock in FIFO order
//! - Dropping a pending `acquire` future gives up the wait without ever
//!   holding or leaking the lock
//! - Dropping a `KeyGuard` releases the lock on every exit path, including
//!   early returns through `?` and unwinding panics

use dashmap::DashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Proof that the holder has exclusive access to one key
///
/// The lock is released when the guard is dropped.
pub struct KeyGuard<K> {
    key: K,
    _permit: OwnedMutexGuard<()>,
}

impl<K> KeyGuard<K> {
    /// The key this guard holds
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyGuard").field("key", &self.key).finish()
    }
}

/// Map of per-key locks
///
/// Locks are retained for the lifetime of the map unless `prune_idle` is
/// called.
#[derive(Debug)]
pub struct KeyedLock<K>
where
    K: Eq + Hash,
{
    locks: DashMap<K, Arc<Mutex<()>>>,
}

impl<K> KeyedLock<K>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty lock map
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Return the lock for `key`, creating it on first use
    fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        // The entry guard is a temporary and is dropped at the end of this
        // statement, before the caller waits on the mutex.
        Arc::clone(
            self.locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Wait until no one else holds `key`, then take it
    ///
    /// This is the only point where an operation suspends behind another
    /// operation on the same key. Cancel-safe: if the returned future is
    /// dropped before completing, the lock is not granted to this caller.
    pub async fn acquire(&self, key: K) -> KeyGuard<K> {
        let lock = self.lock_for(&key);
        let permit = lock.lock_owned().await;

        KeyGuard {
            key,
            _permit: permit,
        }
    }

    /// Blocking variant of `acquire` for thread-per-request callers
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context, like
    /// `tokio::sync::Mutex::blocking_lock`.
    pub fn blocking_acquire(&self, key: K) -> KeyGuard<K> {
        let lock = self.lock_for(&key);
        let permit = lock.blocking_lock_owned();

        KeyGuard {
            key,
            _permit: permit,
        }
    }

    /// Take `key` only if it is free right now
    pub fn try_acquire(&self, key: K) -> Option<KeyGuard<K>> {
        let lock = self.lock_for(&key);
        let permit = lock.try_lock_owned().ok()?;

        Some(KeyGuard {
            key,
            _permit: permit,
        })
    }

    /// Number of keys that currently have a lock allocated
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock has been allocated yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Whether a lock is allocated for `key`
    pub fn contains(&self, key: &K) -> bool {
        self.locks.contains_key(key)
    }

    /// Drop the locks nobody is holding or waiting for
    ///
    /// A lock is idle when the map owns the only reference to it: every
    /// guard and every pending waiter holds its own `Arc`. `retain` runs under
    /// each shard's write lock, the same lock `acquire` takes to clone an
    /// entry, so a lock can't gain a holder while it is being evicted.
    ///
    /// # Returns
    ///
    /// The number of locks removed.
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.locks.len())
    }
}

impl<K> Default for KeyedLock<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_acquire_creates_lock_lazily() {
        let locks: KeyedLock<i64> = KeyedLock::new();
        assert!(locks.is_empty());

        let guard = locks.acquire(1).await;

        assert_eq!(*guard.key(), 1);
        assert_eq!(locks.len(), 1);
        assert!(locks.contains(&1));
        assert!(!locks.contains(&2));
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks: KeyedLock<i64> = KeyedLock::new();

        let guard = locks.acquire(1).await;
        assert!(locks.try_acquire(1).is_none());

        drop(guard);
        assert!(locks.try_acquire(1).is_some());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks: KeyedLock<i64> = KeyedLock::new();

        let _first = locks.acquire(1).await;
        let second = timeout(Duration::from_millis(100), locks.acquire(2)).await;

        assert!(second.is_ok(), "key 2 should not wait for key 1");
    }

    #[tokio::test]
    async fn test_cancelled_wait_does_not_take_lock() {
        let locks: KeyedLock<i64> = KeyedLock::new();

        let guard = locks.acquire(1).await;
        let waited = timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(waited.is_err(), "wait should time out while the key is held");

        drop(guard);

        // The cancelled waiter left nothing behind: the key is free again
        let regained = timeout(Duration::from_millis(100), locks.acquire(1)).await;
        assert!(regained.is_ok());
    }

    #[tokio::test]
    async fn test_guard_released_on_error_path() {
        let locks: KeyedLock<i64> = KeyedLock::new();

        async fn fails_inside(locks: &KeyedLock<i64>) -> Result<(), String> {
            let _guard = locks.acquire(1).await;
            Err::<(), _>("boom".to_string())?;
            Ok(())
        }

        assert!(fails_inside(&locks).await.is_err());
        assert!(locks.try_acquire(1).is_some());
    }

    #[tokio::test]
    async fn test_waiters_are_granted_in_fifo_order() {
        let locks = Arc::new(KeyedLock::<i64>::new());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let guard = locks.acquire(1).await;

        let mut tasks = Vec::new();
        for i in 0..5 {
            let locks = Arc::clone(&locks);
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
                order.lock().unwrap().push(i);
            }));
            // Let the task reach the mutex queue before spawning the next one
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        drop(guard);
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_touch_creates_single_lock() {
        let locks = Arc::new(KeyedLock::<i64>::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let locks = Arc::clone(&locks);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            tasks.push(tokio::spawn(async move {
                let _guard = locks.acquire(42).await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(locks.len(), 1);
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blocking_acquire_serializes_threads() {
        use std::thread;

        let locks = Arc::new(KeyedLock::<i64>::new());
        let counter = Arc::new(std::sync::Mutex::new(0u64));
        let mut handles = vec![];

        // Non-atomic read-modify-write protected only by the keyed lock
        for _ in 0..8 {
            let locks = Arc::clone(&locks);
            let counter = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let _guard = locks.blocking_acquire(7);
                    let current = *counter.lock().unwrap();
                    thread::yield_now();
                    *counter.lock().unwrap() = current + 1;
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*counter.lock().unwrap(), 800);
    }

    #[tokio::test]
    async fn test_prune_idle_keeps_held_locks() {
        let locks: KeyedLock<i64> = KeyedLock::new();

        let held = locks.acquire(1).await;
        drop(locks.acquire(2).await);
        drop(locks.acquire(3).await);

        assert_eq!(locks.prune_idle(), 2);
        assert_eq!(locks.len(), 1);
        assert!(locks.contains(&1));

        // The surviving lock is still the one being held
        assert!(locks.try_acquire(1).is_none());

        drop(held);
        assert_eq!(locks.prune_idle(), 1);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_prune_idle_keeps_locks_with_waiters() {
        let locks = Arc::new(KeyedLock::<i64>::new());

        let guard = locks.acquire(1).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(locks.prune_idle(), 0);

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(locks.prune_idle(), 1);
    }
}
