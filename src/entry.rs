use std::sync::Arc;
use std::time::{Duration, Instant};

/// A container for a value in the cache, holding all necessary metadata.
///
/// The size is sampled from the payload once, when the entry is created;
/// the creation timestamp is used only for expiry.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
  /// The user's value, wrapped in an Arc for shared ownership.
  pub(crate) value: Arc<V>,
  size: u64,
  created_at: Instant,
}

impl<V> CacheEntry<V> {
  pub(crate) fn new(value: V, size: u64) -> Self {
    Self {
      value: Arc::new(value),
      size,
      created_at: Instant::now(),
    }
  }

  /// Returns a clone of the `Arc` containing the value.
  #[inline]
  pub(crate) fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  #[inline]
  pub(crate) fn size(&self) -> u64 {
    self.size
  }

  /// Whether the entry had already outlived `lifetime` at instant `now`.
  #[inline]
  pub(crate) fn is_expired(&self, lifetime: Duration, now: Instant) -> bool {
    now.saturating_duration_since(self.created_at) > lifetime
  }
}
