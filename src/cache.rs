use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::iter::Iter;
use crate::listener::EvictionReason;
use crate::metrics::MetricsSnapshot;
use crate::resource::Resource;
use crate::shared::CacheShared;
use crate::task::scavenger::shrink_to_budget;

use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLockUpgradableReadGuard;

/// A thread-safe, size-bounded LRU cache for values that own heavyweight
/// external resources.
///
/// Entries are ordered by recency of access; when admitting a new entry
/// would exceed the byte budget, victims are taken from the
/// least-recently-used end. A background scavenger expires aged entries.
/// Every payload's [`release`](crate::Resource::release) hook is invoked
/// exactly once, on whichever path removes it from the cache.
///
/// Built via [`CacheBuilder`](crate::CacheBuilder).
#[derive(Debug)]
pub struct Cache<K: Send, V: Resource, H = ahash::RandomState> {
  pub(crate) shared: Arc<CacheShared<K, V, H>>,
}

impl<K, V, H> Cache<K, V, H>
where
  K: Eq + Hash + Clone + Send + Sync,
  V: Resource,
  H: BuildHasher,
{
  /// Inserts a key-value pair, sampling the payload's byte size once.
  ///
  /// Fails with [`CacheError::DuplicateKey`] when the key is already
  /// present and [`CacheError::Disposed`] after disposal. A failed insert
  /// has no effect on cache state and never invokes the candidate's
  /// release hook; the value is dropped like any other Rust value.
  ///
  /// When admitting the entry would push the cumulative size over the
  /// budget, an inline scavenge pass first evicts from the
  /// least-recently-used end until the entry fits. An entry larger than
  /// the whole budget empties the cache and is admitted anyway; the
  /// overflow lasts until the entry is displaced.
  pub fn insert(&self, key: K, value: V) -> Result<(), CacheError> {
    let size = value.size();

    let core = self.shared.core.upgradable_read();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    if core.list.contains(&key) {
      return Err(CacheError::DuplicateKey);
    }

    let mut core = RwLockUpgradableReadGuard::upgrade(core);
    let mut evicted = Vec::new();
    let capacity = self.shared.config.capacity;
    if capacity > 0 && core.list.current_size() + size > capacity {
      // Inline scavenge: make room for exactly this entry, walking from
      // the least-recently-used end. Expiry is never consulted here. The
      // write lock held across the walk is what keeps this pass and the
      // timer's from overlapping.
      let deadline = Instant::now() + self.shared.config.scavenge_time_bound;
      shrink_to_budget(
        &mut core.list,
        capacity.saturating_sub(size),
        deadline,
        false,
        &mut evicted,
      );
    }
    core.list.push_front(key, CacheEntry::new(value, size));
    drop(core);

    self.shared.metrics.inserts.fetch_add(1, Ordering::Relaxed);
    if !evicted.is_empty() {
      self
        .shared
        .metrics
        .evicted_by_capacity
        .fetch_add(evicted.len() as u64, Ordering::Relaxed);
    }
    self
      .shared
      .finish_removals(evicted, EvictionReason::Capacity);
    Ok(())
  }

  /// Retrieves a value, promoting it to the front of the recency order.
  ///
  /// Promotion mutates the recency list, so a lookup is serialized with
  /// every other mutation by taking the lock in write mode. The promotion
  /// is observable to subsequent lookups and to iteration order.
  pub fn get(&self, key: &K) -> Result<Option<Arc<V>>, CacheError> {
    let mut core = self.shared.core.write();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    let found = core.list.promote(key).map(CacheEntry::value);
    drop(core);

    match found {
      Some(value) => {
        self.shared.metrics.hits.fetch_add(1, Ordering::Relaxed);
        Ok(Some(value))
      }
      None => {
        self.shared.metrics.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
      }
    }
  }

  /// Whether `key` is present.
  ///
  /// Delegates to [`get`](Self::get), so a hit promotes the entry; the
  /// side effect is observable in iteration order.
  pub fn contains_key(&self, key: &K) -> Result<bool, CacheError> {
    Ok(self.get(key)?.is_some())
  }

  /// Removes the entry for `key`, releasing its payload. Returns whether
  /// the key was present; removing an absent key is not an error.
  pub fn remove(&self, key: &K) -> Result<bool, CacheError> {
    let mut core = self.shared.core.write();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    let removed = core.list.remove(key);
    drop(core);

    match removed {
      Some(pair) => {
        self.shared.metrics.removals.fetch_add(1, Ordering::Relaxed);
        self
          .shared
          .finish_removals(vec![pair], EvictionReason::Removed);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Removes the entry for `key` only when the resident value is the same
  /// allocation as `value` (the handle returned by a previous lookup).
  pub fn remove_pair(&self, key: &K, value: &Arc<V>) -> Result<bool, CacheError> {
    let mut core = self.shared.core.write();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    let is_same = core
      .list
      .get(key)
      .map_or(false, |entry| Arc::ptr_eq(&entry.value, value));
    let removed = if is_same { core.list.remove(key) } else { None };
    drop(core);

    match removed {
      Some(pair) => {
        self.shared.metrics.removals.fetch_add(1, Ordering::Relaxed);
        self
          .shared
          .finish_removals(vec![pair], EvictionReason::Removed);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Swaps in a new value for an existing key, releasing the displaced
  /// payload and promoting the entry to the front.
  ///
  /// Fails with [`CacheError::AbsentKey`] when the key is not present; the
  /// candidate value is then dropped without its release hook running. If
  /// the new value is larger than the old one the byte budget is
  /// re-enforced, evicting from the tail; the replacement itself is never
  /// a victim of that pass.
  pub fn replace(&self, key: &K, value: V) -> Result<(), CacheError> {
    let size = value.size();

    let mut core = self.shared.core.write();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    let Some(displaced) = core.list.replace(key, CacheEntry::new(value, size)) else {
      return Err(CacheError::AbsentKey);
    };

    let mut evicted = Vec::new();
    let capacity = self.shared.config.capacity;
    if capacity > 0 && core.list.current_size() > capacity {
      let deadline = Instant::now() + self.shared.config.scavenge_time_bound;
      shrink_to_budget(&mut core.list, capacity, deadline, true, &mut evicted);
    }
    drop(core);

    self
      .shared
      .metrics
      .replacements
      .fetch_add(1, Ordering::Relaxed);
    self
      .shared
      .finish_removals(vec![(key.clone(), displaced)], EvictionReason::Removed);
    if !evicted.is_empty() {
      self
        .shared
        .metrics
        .evicted_by_capacity
        .fetch_add(evicted.len() as u64, Ordering::Relaxed);
      self
        .shared
        .finish_removals(evicted, EvictionReason::Capacity);
    }
    Ok(())
  }

  /// Removes every entry, releasing each payload exactly once.
  pub fn clear(&self) -> Result<(), CacheError> {
    let mut core = self.shared.core.write();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    let drained = core.list.drain();
    drop(core);

    self
      .shared
      .metrics
      .removals
      .fetch_add(drained.len() as u64, Ordering::Relaxed);
    self
      .shared
      .finish_removals(drained, EvictionReason::Removed);
    Ok(())
  }

  /// Stops the scavenger, releases every resident payload, flushes the
  /// eviction listener, and marks the cache disposed.
  ///
  /// Idempotent: a second call is a no-op. Every subsequent operation
  /// other than `dispose` itself fails with [`CacheError::Disposed`].
  /// Dropping the last cache handle without calling this performs the same
  /// teardown.
  pub fn dispose(&self) {
    self.shared.shut_down();
  }

  /// Returns a snapshot of the cache's entries in recency order, most
  /// recent first.
  ///
  /// The snapshot is taken under the read lock, so it never observes
  /// partially-linked state; mutations made after the call are not
  /// reflected, and iterating does not promote.
  pub fn iter(&self) -> Result<Iter<K, V>, CacheError> {
    let core = self.shared.core.read();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    let snapshot: Vec<(K, Arc<V>)> = core
      .list
      .iter()
      .map(|(key, entry)| (key.clone(), entry.value()))
      .collect();
    Ok(Iter::new(snapshot))
  }

  /// The keys of all live entries, in recency order.
  pub fn keys(&self) -> Result<Vec<K>, CacheError> {
    let core = self.shared.core.read();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    Ok(core.list.iter().map(|(key, _)| key.clone()).collect())
  }

  /// The values of all live entries, in recency order.
  pub fn values(&self) -> Result<Vec<Arc<V>>, CacheError> {
    let core = self.shared.core.read();
    if core.disposed {
      return Err(CacheError::Disposed);
    }
    Ok(core.list.iter().map(|(_, entry)| entry.value()).collect())
  }

  /// The number of live entries. Reflects committed state and reads zero
  /// once the cache is disposed.
  pub fn len(&self) -> usize {
    self.shared.core.read().list.len()
  }

  pub fn is_empty(&self) -> bool {
    self.shared.core.read().list.is_empty()
  }

  /// The cumulative byte size of all live entries.
  pub fn current_size(&self) -> u64 {
    self.shared.core.read().list.current_size()
  }

  /// The configured byte budget. Zero means unbounded.
  pub fn capacity(&self) -> u64 {
    self.shared.config.capacity
  }

  /// A point-in-time snapshot of the cache's counters.
  pub fn metrics(&self) -> MetricsSnapshot {
    let (count, current_size) = {
      let core = self.shared.core.read();
      (core.list.len(), core.list.current_size())
    };
    self.shared.metrics.snapshot(count, current_size)
  }
}
