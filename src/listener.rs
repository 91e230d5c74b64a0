use std::fmt;
use std::sync::Arc;

/// Describes the reason an entry was removed from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
  /// The entry was removed because admitting a newer entry would have
  /// exceeded the cache's byte budget.
  Capacity,
  /// The entry was removed because it outlived the configured element
  /// lifetime.
  Expired,
  /// The entry was removed explicitly: `remove`, `remove_pair`, `replace`,
  /// `clear`, or `dispose`.
  Removed,
}

impl fmt::Display for EvictionReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EvictionReason::Capacity => write!(f, "evicted due to capacity"),
      EvictionReason::Expired => write!(f, "evicted due to expiration"),
      EvictionReason::Removed => write!(f, "explicitly removed"),
    }
  }
}

/// A listener that can be registered with the cache to receive
/// notifications when entries leave it.
///
/// `on_evict` runs on a dedicated background worker so user callbacks never
/// execute under the cache's lock.  By the time a listener observes a
/// value, its release hook has already run; the listener sees the
/// surrendered payload.  Do not call back into the cache from a listener
/// that the disposing thread is waiting to flush.
pub trait EvictionListener<K, V>: Send + Sync {
  fn on_evict(&self, key: K, value: Arc<V>, reason: EvictionReason);
}
